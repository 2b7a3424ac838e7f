//! Action definitions and their GraphQL documents.

use alloy::primitives::Address;
use serde_json::Value;

use crate::actions::validation::{self, ValidationError};
use crate::graphql::GraphqlRequest;
use crate::transaction::{PipelineResult, PlainValue, TransactionError, TxId};

/// Parameters of a new game session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSessionParams {
    pub session_id: Address,
    pub prize: Address,
    pub maximum_user: u32,
    pub minimum_user: u32,
    pub remaining_user: u32,
    pub start_after: u64,
    pub max_rounds: u32,
    pub round_length: u64,
    pub round_interval: u64,
    pub initial_health_point: u32,
    pub number_of_gloves: u32,
    /// Invited users. Empty means the session is open.
    pub users: Vec<Address>,
}

impl CreateSessionParams {
    /// Defaults used by the game UI for an open session.
    pub fn open(session_id: Address) -> Self {
        Self {
            session_id,
            prize: Address::ZERO,
            maximum_user: 8,
            minimum_user: 2,
            remaining_user: 1,
            start_after: 100,
            max_rounds: 5,
            round_length: 10,
            round_interval: 5,
            initial_health_point: 100,
            number_of_gloves: 5,
            users: Vec::new(),
        }
    }
}

/// A player action that ends up as a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    CreateUser { name: String },
    CreateSession(CreateSessionParams),
    JoinSession { session_id: Address, gloves: Vec<Address> },
    SubmitMove { session_id: Address, glove_index: u32 },
    RegisterGlove { glove_id: Address },
    PickUp,
    PickUpMany,
}

struct Arg {
    name: &'static str,
    ty: &'static str,
    value: Value,
}

fn arg(name: &'static str, ty: &'static str, value: impl Into<Value>) -> Arg {
    Arg {
        name,
        ty,
        value: value.into(),
    }
}

fn addresses(list: &[Address]) -> Value {
    Value::Array(list.iter().map(|a| Value::String(a.to_string())).collect())
}

impl Action {
    /// The schema field this action maps to, e.g. `createSession`.
    pub fn name(&self) -> &'static str {
        match self {
            Action::CreateUser { .. } => "createUser",
            Action::CreateSession(_) => "createSession",
            Action::JoinSession { .. } => "joinSession",
            Action::SubmitMove { .. } => "submitMove",
            Action::RegisterGlove { .. } => "registerGlove",
            Action::PickUp => "pickUp",
            Action::PickUpMany => "pickUpMany",
        }
    }

    fn operation(&self) -> &'static str {
        match self {
            Action::CreateUser { .. } => "CreateUser",
            Action::CreateSession(_) => "CreateSession",
            Action::JoinSession { .. } => "JoinSession",
            Action::SubmitMove { .. } => "SubmitMove",
            Action::RegisterGlove { .. } => "RegisterGlove",
            Action::PickUp => "PickUp",
            Action::PickUpMany => "PickUpMany",
        }
    }

    fn args(&self) -> Vec<Arg> {
        match self {
            Action::CreateUser { name } => vec![arg("name", "String!", name.as_str())],
            Action::CreateSession(p) => vec![
                arg("sessionId", "Address!", p.session_id.to_string()),
                arg("prize", "Address!", p.prize.to_string()),
                arg("maximumUser", "Int!", p.maximum_user),
                arg("minimumUser", "Int!", p.minimum_user),
                arg("remainingUser", "Int!", p.remaining_user),
                arg("startAfter", "Long!", p.start_after),
                arg("maxRounds", "Int!", p.max_rounds),
                arg("roundLength", "Long!", p.round_length),
                arg("roundInterval", "Long!", p.round_interval),
                arg("initialHealthPoint", "Int!", p.initial_health_point),
                arg("numberOfGloves", "Int!", p.number_of_gloves),
                arg("users", "[Address!]!", addresses(&p.users)),
            ],
            Action::JoinSession { session_id, gloves } => vec![
                arg("sessionId", "Address!", session_id.to_string()),
                arg("gloves", "[Address!]!", addresses(gloves)),
            ],
            Action::SubmitMove {
                session_id,
                glove_index,
            } => vec![
                arg("sessionId", "Address!", session_id.to_string()),
                arg("gloveIndex", "Int!", *glove_index),
            ],
            Action::RegisterGlove { glove_id } => {
                vec![arg("gloveId", "Address!", glove_id.to_string())]
            }
            Action::PickUp | Action::PickUpMany => Vec::new(),
        }
    }

    fn document(&self, kind: &str, operation: &str, wrap_in_action_query: bool) -> GraphqlRequest {
        let args = self.args();
        let (definitions, call) = if args.is_empty() {
            (String::new(), String::new())
        } else {
            let defs = args
                .iter()
                .map(|a| format!("${}: {}", a.name, a.ty))
                .collect::<Vec<_>>()
                .join(", ");
            let call = args
                .iter()
                .map(|a| format!("{}: ${}", a.name, a.name))
                .collect::<Vec<_>>()
                .join(", ");
            (format!("({defs})"), format!("({call})"))
        };

        let selection = if wrap_in_action_query {
            format!("actionQuery {{ {}{} }}", self.name(), call)
        } else {
            format!("{}{}", self.name(), call)
        };

        let mut request = GraphqlRequest::new(format!("{kind} {operation}{definitions} {{ {selection} }}"))
            .operation(operation);
        for a in args {
            request = request.var(a.name, a.value);
        }
        request
    }

    /// Query returning the action's plain value for signed submission.
    pub fn plain_value_request(&self) -> GraphqlRequest {
        let operation = format!("{}Action", self.operation());
        self.document("query", &operation, true)
    }

    /// Authenticated mutation that executes the action server-side.
    pub fn delegated_request(&self) -> GraphqlRequest {
        self.document("mutation", self.operation(), false)
    }

    /// Extract the plain value from a [`plain_value_request`](Self::plain_value_request) response.
    ///
    /// `None` when the node returned no executable payload.
    pub fn plain_value(&self, data: &Value) -> PipelineResult<Option<PlainValue>> {
        match data.get("actionQuery").and_then(|q| q.get(self.name())) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(hex)) if hex.is_empty() => Ok(None),
            Some(Value::String(hex)) => Ok(Some(PlainValue::new(hex.clone()))),
            Some(other) => Err(TransactionError::UnexpectedResponse(format!(
                "{} returned {other}",
                self.name()
            ))),
        }
    }

    /// Extract the transaction id from a [`delegated_request`](Self::delegated_request) response.
    ///
    /// Accepts either a bare id or an object carrying `txId`.
    pub fn delegated_tx_id(&self, data: &Value) -> PipelineResult<Option<TxId>> {
        let value = match data.get(self.name()) {
            Some(Value::Object(obj)) => obj.get("txId"),
            other => other,
        };
        match value {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(id)) if id.is_empty() => Ok(None),
            Some(Value::String(id)) => Ok(Some(TxId::new(id.clone()))),
            Some(other) => Err(TransactionError::UnexpectedResponse(format!(
                "{} returned {other}",
                self.name()
            ))),
        }
    }

    /// Client-side checks run before any network call.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Action::CreateUser { name } => validation::check_user_name(name),
            Action::CreateSession(params) => validation::check_create_session(params),
            Action::JoinSession { gloves, .. } => validation::check_gloves(gloves),
            Action::SubmitMove { .. }
            | Action::RegisterGlove { .. }
            | Action::PickUp
            | Action::PickUpMany => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_value_document() {
        let action = Action::JoinSession {
            session_id: Address::repeat_byte(1),
            gloves: vec![Address::repeat_byte(2)],
        };
        let request = action.plain_value_request();
        assert_eq!(request.operation_name.as_deref(), Some("JoinSessionAction"));
        assert_eq!(
            request.query,
            "query JoinSessionAction($sessionId: Address!, $gloves: [Address!]!) \
             { actionQuery { joinSession(sessionId: $sessionId, gloves: $gloves) } }"
        );
        assert_eq!(request.variables["gloves"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_delegated_document() {
        let request = Action::SubmitMove {
            session_id: Address::ZERO,
            glove_index: 3,
        }
        .delegated_request();
        assert_eq!(
            request.query,
            "mutation SubmitMove($sessionId: Address!, $gloveIndex: Int!) \
             { submitMove(sessionId: $sessionId, gloveIndex: $gloveIndex) }"
        );
        assert_eq!(request.variables["gloveIndex"], 3);
    }

    #[test]
    fn test_document_without_arguments() {
        let request = Action::PickUpMany.plain_value_request();
        assert_eq!(request.query, "query PickUpManyAction { actionQuery { pickUpMany } }");
        assert!(request.variables.is_empty());
    }

    #[test]
    fn test_plain_value_extraction() {
        let action = Action::PickUp;
        let some = action.plain_value(&json!({ "actionQuery": { "pickUp": "abcd" } })).unwrap();
        assert_eq!(some, Some(PlainValue::new("abcd")));
        assert!(action.plain_value(&json!({ "actionQuery": { "pickUp": "" } })).unwrap().is_none());
        assert!(action.plain_value(&json!({})).unwrap().is_none());
        assert!(action.plain_value(&json!({ "actionQuery": { "pickUp": 5 } })).is_err());
    }

    #[test]
    fn test_delegated_tx_id_shapes() {
        let action = Action::PickUp;
        assert_eq!(
            action.delegated_tx_id(&json!({ "pickUp": "tx" })).unwrap(),
            Some(TxId::new("tx"))
        );
        assert_eq!(
            action.delegated_tx_id(&json!({ "pickUp": { "txId": "tx2" } })).unwrap(),
            Some(TxId::new("tx2"))
        );
        assert!(action.delegated_tx_id(&json!({ "pickUp": null })).unwrap().is_none());
    }
}
