//! Mock HandRoyal node for integration tests.
//!
//! Serves GraphQL over HTTP (`POST /graphql`), `graphql-transport-ws`
//! subscriptions (`GET /graphql`) and the glove asset endpoints, all on an
//! ephemeral local port.

#![allow(dead_code)]

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Multipart, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};

use handroyal_client::ClientConfig;

/// A request the mock received over HTTP.
#[derive(Debug, Clone)]
pub struct Received {
    pub operation: String,
    pub variables: Value,
    pub authorization: Option<String>,
}

/// A multipart upload the mock received.
#[derive(Debug, Clone, Default)]
pub struct Upload {
    pub address: Option<String>,
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
enum Push {
    Next { field: String, value: Value },
    Error { field: String, message: String },
}

pub struct MockNode {
    replies: Mutex<HashMap<String, VecDeque<Value>>>,
    received: Mutex<Vec<Received>>,
    uploads: Mutex<Vec<Upload>>,
    image_queries: Mutex<Vec<HashMap<String, String>>>,
    pushes: broadcast::Sender<Push>,
    active: AtomicUsize,
    completed: Mutex<Vec<String>>,
    ack: AtomicBool,
    hang_ups: broadcast::Sender<()>,
}

impl MockNode {
    /// Queue the `data` object returned for the next `operation` request.
    pub fn reply(&self, operation: &str, data: Value) {
        self.replies
            .lock()
            .unwrap()
            .entry(operation.to_string())
            .or_default()
            .push_back(data);
    }

    pub fn received(&self, operation: &str) -> Vec<Received> {
        self.received
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.operation == operation)
            .cloned()
            .collect()
    }

    pub fn uploads(&self) -> Vec<Upload> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn image_queries(&self) -> Vec<HashMap<String, String>> {
        self.image_queries.lock().unwrap().clone()
    }

    /// Stop answering `connection_init`.
    pub fn withhold_ack(&self) {
        self.ack.store(false, Ordering::SeqCst);
    }

    /// Close every open WebSocket from the server side.
    pub fn drop_connections(&self) {
        let _ = self.hang_ups.send(());
    }

    pub fn push_tip(&self, height: u64, hash: &str) {
        self.push("onTipChanged", json!({ "height": height, "hash": hash }));
    }

    pub fn push(&self, field: &str, value: Value) {
        let _ = self.pushes.send(Push::Next {
            field: field.to_string(),
            value,
        });
    }

    pub fn push_error(&self, field: &str, message: &str) {
        let _ = self.pushes.send(Push::Error {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn active_subscriptions(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }

    /// Wait until exactly `count` subscriptions are live.
    pub async fn wait_for_subscriptions(&self, count: usize) {
        for _ in 0..500 {
            if self.active_subscriptions() == count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!(
            "expected {count} active subscriptions, have {}",
            self.active_subscriptions()
        );
    }
}

/// Start the mock node on an ephemeral port.
pub async fn start_mock_node() -> (Arc<MockNode>, SocketAddr) {
    let (pushes, _) = broadcast::channel(64);
    let node = Arc::new(MockNode {
        replies: Mutex::new(HashMap::new()),
        received: Mutex::new(Vec::new()),
        uploads: Mutex::new(Vec::new()),
        image_queries: Mutex::new(Vec::new()),
        pushes,
        active: AtomicUsize::new(0),
        completed: Mutex::new(Vec::new()),
        ack: AtomicBool::new(true),
        hang_ups: broadcast::channel(4).0,
    });

    let app = Router::new()
        .route("/graphql", post(graphql).get(subscriptions))
        .route("/register-glove", post(register_glove))
        .route("/get-glove-image", get(glove_image))
        .with_state(node.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (node, addr)
}

/// Client configuration pointing every endpoint at the mock.
pub fn config_for(addr: SocketAddr) -> ClientConfig {
    let mut config = ClientConfig::default();
    config.graphql.http_url = format!("http://{addr}/graphql");
    config.graphql.ws_url = format!("ws://{addr}/graphql");
    config.graphql.connection_ack_timeout_secs = 2;
    config.assets.base_url = format!("http://{addr}/");
    config.transaction.poll_interval_ms = 10;
    config.transaction.timeout_ms = 2_000;
    config
}

async fn graphql(
    State(node): State<Arc<MockNode>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let operation = body["operationName"].as_str().unwrap_or_default().to_string();
    node.received.lock().unwrap().push(Received {
        operation: operation.clone(),
        variables: body.get("variables").cloned().unwrap_or(Value::Null),
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    });

    let reply = node
        .replies
        .lock()
        .unwrap()
        .get_mut(&operation)
        .and_then(VecDeque::pop_front);
    match reply {
        Some(data) => Json(json!({ "data": data })),
        None => Json(json!({
            "data": null,
            "errors": [{ "message": format!("no mock for {operation}") }]
        })),
    }
}

async fn register_glove(State(node): State<Arc<MockNode>>, mut multipart: Multipart) -> Response {
    let mut upload = Upload::default();
    while let Some(field) = multipart.next_field().await.unwrap() {
        match field.name().unwrap_or_default() {
            "address" => upload.address = Some(field.text().await.unwrap()),
            "file" => {
                upload.file_name = field.file_name().map(str::to_string);
                upload.bytes = field.bytes().await.unwrap().to_vec();
            }
            _ => {}
        }
    }
    if upload.address.is_none() || upload.bytes.is_empty() {
        return (StatusCode::BAD_REQUEST, "address and file are required").into_response();
    }
    node.uploads.lock().unwrap().push(upload);
    "registered".into_response()
}

async fn glove_image(
    State(node): State<Arc<MockNode>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    node.image_queries.lock().unwrap().push(params.clone());
    match (params.get("gloveAddress"), params.get("hand")) {
        (Some(glove), Some(hand)) => format!("image:{}:{}", glove.to_lowercase(), hand).into_response(),
        _ => (StatusCode::NOT_FOUND, "unknown glove").into_response(),
    }
}

async fn subscriptions(ws: WebSocketUpgrade, State(node): State<Arc<MockNode>>) -> Response {
    ws.protocols(["graphql-transport-ws"])
        .on_upgrade(move |socket| serve_socket(socket, node))
}

/// Decrements the live-subscription count when a forwarder ends or is aborted.
struct Live(Arc<MockNode>);

impl Drop for Live {
    fn drop(&mut self) {
        self.0.active.fetch_sub(1, Ordering::SeqCst);
    }
}

async fn serve_socket(socket: WebSocket, node: Arc<MockNode>) {
    let (mut sink, mut stream) = socket.split();
    let (out, mut pending) = mpsc::unbounded_channel::<Value>();
    let writer = tokio::spawn(async move {
        while let Some(frame) = pending.recv().await {
            if sink.send(Message::Text(frame.to_string().into())).await.is_err() {
                return;
            }
        }
        let _ = sink.send(Message::Close(None)).await;
    });

    let mut hang_ups = node.hang_ups.subscribe();
    let mut forwarders = HashMap::new();
    loop {
        let message = tokio::select! {
            message = stream.next() => message,
            _ = hang_ups.recv() => break,
        };
        let Some(Ok(message)) = message else { break };
        let Message::Text(text) = message else { continue };
        let frame: Value = serde_json::from_str(text.as_str()).unwrap();
        let id = frame["id"].as_str().unwrap_or_default().to_string();
        match frame["type"].as_str().unwrap_or_default() {
            "connection_init" => {
                if node.ack.load(Ordering::SeqCst) {
                    let _ = out.send(json!({ "type": "connection_ack" }));
                }
            }
            "ping" => {
                let _ = out.send(json!({ "type": "pong" }));
            }
            "subscribe" => {
                let operation = frame["payload"]["operationName"].as_str().unwrap_or_default();
                let field = lower_first(operation);
                let mut events = node.pushes.subscribe();
                node.active.fetch_add(1, Ordering::SeqCst);
                let live = Live(node.clone());
                let out = out.clone();
                let sub_id = id.clone();
                let task = tokio::spawn(async move {
                    let _live = live;
                    while let Ok(push) = events.recv().await {
                        match push {
                            Push::Next { field: f, value } if f == field => {
                                let mut data = serde_json::Map::new();
                                data.insert(f, value);
                                let _ = out.send(json!({
                                    "type": "next",
                                    "id": sub_id,
                                    "payload": { "data": data }
                                }));
                            }
                            Push::Error { field: f, message } if f == field => {
                                let _ = out.send(json!({
                                    "type": "error",
                                    "id": sub_id,
                                    "payload": [{ "message": message }]
                                }));
                                break;
                            }
                            _ => {}
                        }
                    }
                });
                forwarders.insert(id, task);
            }
            "complete" => {
                if let Some(task) = forwarders.remove(&id) {
                    node.completed.lock().unwrap().push(id);
                    task.abort();
                }
            }
            _ => {}
        }
    }

    for (_, task) in forwarders {
        task.abort();
    }
    // The writer sends a close frame once every sender is gone.
    drop(out);
    let abort = writer.abort_handle();
    if tokio::time::timeout(Duration::from_secs(1), writer).await.is_err() {
        abort.abort();
    }
}

fn lower_first(operation: &str) -> String {
    let mut chars = operation.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
