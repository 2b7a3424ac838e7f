//! In-process test doubles shared by unit tests.

use futures_util::future::BoxFuture;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::account::{AuthSession, AuthSessionProvider, ProviderError, RequestArguments, WalletProvider};
use crate::graphql::{GraphqlError, GraphqlRequest, GraphqlResult, GraphqlTransport};

/// Anvil's first well-known account.
pub const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const TEST_ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

#[derive(Clone)]
enum Reply {
    Data(Value),
    GraphqlError(String),
    TransportError(String),
    Status(u16, String),
}

impl Reply {
    fn into_result(self) -> GraphqlResult<Value> {
        match self {
            Reply::Data(data) => Ok(data),
            Reply::GraphqlError(msg) => Err(GraphqlError::Response(msg)),
            Reply::TransportError(msg) => Err(GraphqlError::Transport(msg)),
            Reply::Status(status, body) => Err(GraphqlError::Status { status, body }),
        }
    }
}

#[derive(Default)]
struct Script {
    queue: VecDeque<Reply>,
    sticky: Option<Reply>,
}

/// Replies to requests by operation name from per-operation queues.
///
/// Once a queue is drained, the `repeat` reply (if any) is served forever.
#[derive(Default)]
pub struct ScriptedTransport {
    scripts: Mutex<HashMap<String, Script>>,
    log: Mutex<Vec<(GraphqlRequest, Option<String>)>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn enqueue(&self, operation: &str, reply: Reply) {
        self.scripts
            .lock()
            .unwrap()
            .entry(operation.to_string())
            .or_default()
            .queue
            .push_back(reply);
    }

    pub fn push(&self, operation: &str, data: Value) {
        self.enqueue(operation, Reply::Data(data));
    }

    pub fn push_error(&self, operation: &str, message: &str) {
        self.enqueue(operation, Reply::GraphqlError(message.to_string()));
    }

    pub fn push_transport_error(&self, operation: &str, message: &str) {
        self.enqueue(operation, Reply::TransportError(message.to_string()));
    }

    pub fn push_status(&self, operation: &str, status: u16, body: &str) {
        self.enqueue(operation, Reply::Status(status, body.to_string()));
    }

    pub fn repeat(&self, operation: &str, data: Value) {
        self.scripts
            .lock()
            .unwrap()
            .entry(operation.to_string())
            .or_default()
            .sticky = Some(Reply::Data(data));
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.requests(operation).len()
    }

    pub fn total_calls(&self) -> usize {
        self.log.lock().unwrap().len()
    }

    pub fn requests(&self, operation: &str) -> Vec<GraphqlRequest> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|(r, _)| r.operation_name.as_deref() == Some(operation))
            .map(|(r, _)| r.clone())
            .collect()
    }

    pub fn bearers(&self) -> Vec<Option<String>> {
        self.log.lock().unwrap().iter().map(|(_, b)| b.clone()).collect()
    }
}

impl GraphqlTransport for ScriptedTransport {
    async fn execute(&self, request: GraphqlRequest, bearer: Option<&str>) -> GraphqlResult<Value> {
        let operation = request.operation_name.clone().unwrap_or_default();
        self.log
            .lock()
            .unwrap()
            .push((request, bearer.map(str::to_string)));

        let reply = {
            let mut scripts = self.scripts.lock().unwrap();
            scripts.get_mut(&operation).and_then(|script| {
                script.queue.pop_front().or_else(|| script.sticky.clone())
            })
        };
        match reply {
            Some(reply) => reply.into_result(),
            None => Err(GraphqlError::Transport(format!("unscripted operation {operation}"))),
        }
    }
}

/// Wallet provider double answering by method name.
#[derive(Default)]
pub struct MockWallet {
    replies: Mutex<HashMap<String, VecDeque<Result<Value, ProviderError>>>>,
    log: Mutex<Vec<RequestArguments>>,
}

impl MockWallet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, method: &str, reply: Result<Value, ProviderError>) {
        self.replies
            .lock()
            .unwrap()
            .entry(method.to_string())
            .or_default()
            .push_back(reply);
    }

    pub fn methods(&self) -> Vec<String> {
        self.log.lock().unwrap().iter().map(|a| a.method.clone()).collect()
    }

    pub fn calls(&self, method: &str) -> Vec<RequestArguments> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.method == method)
            .cloned()
            .collect()
    }
}

impl WalletProvider for MockWallet {
    fn request(&self, args: RequestArguments) -> BoxFuture<'_, Result<Value, ProviderError>> {
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(&args.method)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Err(ProviderError::new(-32601, format!("unexpected {}", args.method))));
        self.log.lock().unwrap().push(args);
        Box::pin(async move { reply })
    }
}

/// Auth session provider double.
pub struct MockAuth {
    pub session: Mutex<Option<AuthSession>>,
    pub sign_outs: Mutex<u32>,
}

impl MockAuth {
    pub fn new(session: Option<AuthSession>) -> Self {
        Self {
            session: Mutex::new(session),
            sign_outs: Mutex::new(0),
        }
    }
}

impl AuthSessionProvider for MockAuth {
    fn session(&self) -> BoxFuture<'_, Result<Option<AuthSession>, ProviderError>> {
        let session = self.session.lock().unwrap().clone();
        Box::pin(async move { Ok(session) })
    }

    fn sign_out(&self) -> BoxFuture<'_, Result<(), ProviderError>> {
        *self.sign_outs.lock().unwrap() += 1;
        *self.session.lock().unwrap() = None;
        Box::pin(async { Ok(()) })
    }
}
