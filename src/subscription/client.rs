//! WebSocket connection and per-subscription routing.

use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use uuid::Uuid;

use crate::config::schema::GraphqlConfig;
use crate::graphql::types::{join_messages, GraphqlResponse};
use crate::graphql::GraphqlRequest;
use crate::subscription::protocol::{ClientMessage, ServerMessage, GRAPHQL_TRANSPORT_WS};
use crate::subscription::stream::Subscription;
use crate::subscription::{SubscriptionError, SubscriptionResult};

type Socket = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// What the reader task forwards to a single subscription.
#[derive(Debug)]
pub(crate) enum Event {
    Next(GraphqlResponse),
    Error(String),
    Complete,
    Closed,
}

pub(crate) type Routes = Arc<DashMap<String, mpsc::UnboundedSender<Event>>>;

/// A live `graphql-transport-ws` connection.
pub struct SubscriptionClient {
    outgoing: mpsc::UnboundedSender<ClientMessage>,
    routes: Routes,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl SubscriptionClient {
    /// Open the socket and complete the `connection_init` handshake.
    pub async fn connect(config: &GraphqlConfig) -> SubscriptionResult<Self> {
        let mut request = config
            .ws_url
            .as_str()
            .into_client_request()
            .map_err(|e| SubscriptionError::Connect(e.to_string()))?;
        request.headers_mut().insert(
            "Sec-WebSocket-Protocol",
            HeaderValue::from_static(GRAPHQL_TRANSPORT_WS),
        );

        let (mut socket, _) = connect_async(request)
            .await
            .map_err(|e| SubscriptionError::Connect(e.to_string()))?;

        let ack_timeout = config.connection_ack_timeout();
        tokio::time::timeout(ack_timeout, handshake(&mut socket))
            .await
            .map_err(|_| SubscriptionError::AckTimeout(ack_timeout))??;
        tracing::info!(url = %config.ws_url, "Subscription channel established");

        let (mut sink, mut source) = socket.split();
        let (outgoing, mut pending) = mpsc::unbounded_channel::<ClientMessage>();
        let routes: Routes = Arc::new(DashMap::new());

        let writer = tokio::spawn(async move {
            while let Some(message) = pending.recv().await {
                if let Err(e) = sink.send(Message::Text(message.to_json().into())).await {
                    tracing::warn!(error = %e, "Failed to send subscription frame");
                    break;
                }
            }
            let _ = sink.close().await;
        });

        let reader = tokio::spawn({
            let routes = routes.clone();
            let outgoing = outgoing.clone();
            async move {
                while let Some(frame) = source.next().await {
                    let text = match frame {
                        Ok(Message::Text(text)) => text,
                        Ok(Message::Close(_)) => break,
                        Ok(_) => continue,
                        Err(e) => {
                            tracing::warn!(error = %e, "Subscription socket error");
                            break;
                        }
                    };
                    match serde_json::from_str::<ServerMessage>(text.as_str()) {
                        Ok(message) => route(&routes, &outgoing, message),
                        Err(e) => tracing::warn!(error = %e, "Ignoring malformed subscription frame"),
                    }
                }
                tracing::info!("Subscription channel closed");
                let ids: Vec<String> = routes.iter().map(|entry| entry.key().clone()).collect();
                for id in ids {
                    if let Some((_, tx)) = routes.remove(&id) {
                        let _ = tx.send(Event::Closed);
                    }
                }
            }
        });

        Ok(Self {
            outgoing,
            routes,
            reader,
            writer,
        })
    }

    /// Start a subscription whose events populate `field` of the payload.
    pub fn subscribe<T: DeserializeOwned>(
        &self,
        request: GraphqlRequest,
        field: &str,
    ) -> SubscriptionResult<Subscription<T>> {
        if self.reader.is_finished() {
            return Err(SubscriptionError::Closed);
        }
        let id = Uuid::new_v4().to_string();
        let (tx, rx) = mpsc::unbounded_channel();
        self.routes.insert(id.clone(), tx);

        let subscribe = ClientMessage::Subscribe {
            id: id.clone(),
            payload: request,
        };
        if self.outgoing.send(subscribe).is_err() {
            self.routes.remove(&id);
            return Err(SubscriptionError::Closed);
        }
        tracing::debug!(id = %id, field, "Subscribed");
        Ok(Subscription::new(
            id,
            field,
            rx,
            self.outgoing.clone(),
            self.routes.clone(),
        ))
    }

    /// Number of subscriptions still routed.
    pub fn active_subscriptions(&self) -> usize {
        self.routes.len()
    }

    pub fn is_closed(&self) -> bool {
        self.reader.is_finished()
    }
}

impl Drop for SubscriptionClient {
    fn drop(&mut self) {
        self.reader.abort();
        self.writer.abort();
    }
}

impl std::fmt::Debug for SubscriptionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionClient")
            .field("active_subscriptions", &self.routes.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

async fn handshake(socket: &mut Socket) -> SubscriptionResult<()> {
    let init = ClientMessage::ConnectionInit { payload: None };
    socket
        .send(Message::Text(init.to_json().into()))
        .await
        .map_err(|e| SubscriptionError::Connect(e.to_string()))?;

    while let Some(frame) = socket.next().await {
        match frame.map_err(|e| SubscriptionError::Connect(e.to_string()))? {
            Message::Text(text) => match serde_json::from_str::<ServerMessage>(text.as_str()) {
                Ok(ServerMessage::ConnectionAck { .. }) => return Ok(()),
                Ok(ServerMessage::Ping { .. }) => {
                    let pong = ClientMessage::Pong { payload: None };
                    socket
                        .send(Message::Text(pong.to_json().into()))
                        .await
                        .map_err(|e| SubscriptionError::Connect(e.to_string()))?;
                }
                Ok(other) => {
                    return Err(SubscriptionError::Protocol(format!(
                        "expected connection_ack, got {other:?}"
                    )))
                }
                Err(e) => return Err(SubscriptionError::Protocol(e.to_string())),
            },
            Message::Close(_) => return Err(SubscriptionError::Closed),
            _ => {}
        }
    }
    Err(SubscriptionError::Closed)
}

fn route(routes: &Routes, outgoing: &mpsc::UnboundedSender<ClientMessage>, message: ServerMessage) {
    match message {
        ServerMessage::Next { id, payload } => {
            if let Some(tx) = routes.get(&id) {
                let _ = tx.send(Event::Next(payload));
            }
        }
        ServerMessage::Error { id, payload } => {
            if let Some((_, tx)) = routes.remove(&id) {
                let _ = tx.send(Event::Error(join_messages(&payload)));
            }
        }
        ServerMessage::Complete { id } => {
            if let Some((_, tx)) = routes.remove(&id) {
                let _ = tx.send(Event::Complete);
            }
        }
        ServerMessage::Ping { .. } => {
            let _ = outgoing.send(ClientMessage::Pong { payload: None });
        }
        ServerMessage::Pong { .. } | ServerMessage::ConnectionAck { .. } => {}
    }
}
