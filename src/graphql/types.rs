//! GraphQL wire types, errors and the game entities returned by queries.

use alloy::primitives::Address;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors from talking to the GraphQL endpoint.
#[derive(Debug, Error)]
pub enum GraphqlError {
    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The endpoint answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The server reported GraphQL errors.
    #[error("GraphQL error: {0}")]
    Response(String),

    /// The response carried no `data`.
    #[error("response contained no data")]
    MissingData,

    /// The response body or a field did not have the expected shape.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Result type for GraphQL operations.
pub type GraphqlResult<T> = Result<T, GraphqlError>;

/// A GraphQL request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub variables: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
}

impl GraphqlRequest {
    /// A request without variables.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            variables: Map::new(),
            operation_name: None,
        }
    }

    /// Attach a named operation.
    pub fn operation(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    /// Attach a variable.
    pub fn var(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.variables.insert(name.to_string(), value.into());
        self
    }
}

/// One entry of a GraphQL `errors` array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphqlErrorEntry {
    pub message: String,
}

/// The standard `{ data, errors }` envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphqlResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Vec<GraphqlErrorEntry>,
}

impl GraphqlResponse {
    /// Unwrap `data`, turning reported errors into [`GraphqlError::Response`].
    pub fn into_data(self) -> GraphqlResult<Value> {
        if !self.errors.is_empty() {
            return Err(GraphqlError::Response(join_messages(&self.errors)));
        }
        match self.data {
            Some(Value::Null) | None => Err(GraphqlError::MissingData),
            Some(data) => Ok(data),
        }
    }
}

/// Join error messages with `"; "`.
pub fn join_messages(errors: &[GraphqlErrorEntry]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Decode `data.<name>`; a missing or `null` field yields `None`.
pub fn field<T: DeserializeOwned>(data: &Value, name: &str) -> GraphqlResult<Option<T>> {
    match data.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| GraphqlError::Decode(format!("{name}: {e}"))),
    }
}

/// The most recently observed chain head.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tip {
    pub height: u64,
    pub hash: String,
}

/// A registered player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Address,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub reg_height: Option<u64>,
    #[serde(default)]
    pub owned_gloves: Vec<Address>,
    #[serde(default)]
    pub equipped_glove: Option<Address>,
    #[serde(default)]
    pub session_id: Option<Address>,
}

/// Lifecycle state of a game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    None,
    Ready,
    Active,
    Break,
    Ended,
}

/// Static parameters a session was created with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetadata {
    pub id: Address,
    pub organizer: Address,
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
    #[serde(default)]
    pub users: Vec<Address>,
}

/// A participant in a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: Address,
    #[serde(default)]
    pub gloves: Vec<Address>,
    #[serde(default)]
    pub state: Option<String>,
}

/// A game session as returned by `session` / `sessions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub metadata: SessionMetadata,
    pub state: SessionState,
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub creation_height: Option<u64>,
    #[serde(default)]
    pub start_height: Option<u64>,
}

/// An equippable glove.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Glove {
    pub id: Address,
    pub author: Address,
    #[serde(default)]
    pub glove_type: Option<String>,
    #[serde(default)]
    pub rarity: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serialization() {
        let request = GraphqlRequest::new("query { tip { height } }");
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body, json!({ "query": "query { tip { height } }" }));

        let request = GraphqlRequest::new("query Q($a: Int!) { x(a: $a) }")
            .operation("Q")
            .var("a", 3);
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["operationName"], "Q");
        assert_eq!(body["variables"]["a"], 3);
    }

    #[test]
    fn test_into_data() {
        let ok: GraphqlResponse = serde_json::from_value(json!({ "data": { "x": 1 } })).unwrap();
        assert_eq!(ok.into_data().unwrap()["x"], 1);

        let err: GraphqlResponse = serde_json::from_value(json!({
            "data": null,
            "errors": [{ "message": "bad nonce" }, { "message": "try again" }]
        }))
        .unwrap();
        match err.into_data() {
            Err(GraphqlError::Response(msg)) => assert_eq!(msg, "bad nonce; try again"),
            other => panic!("unexpected: {other:?}"),
        }

        let empty: GraphqlResponse = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(empty.into_data(), Err(GraphqlError::MissingData)));
    }

    #[test]
    fn test_field_decoding() {
        let data = json!({ "tip": { "height": 7, "hash": "ab" }, "gone": null });
        let tip: Option<Tip> = field(&data, "tip").unwrap();
        assert_eq!(tip, Some(Tip { height: 7, hash: "ab".into() }));
        assert!(field::<Tip>(&data, "gone").unwrap().is_none());
        assert!(field::<Tip>(&data, "missing").unwrap().is_none());
        assert!(matches!(field::<u64>(&data, "tip"), Err(GraphqlError::Decode(_))));
    }

    #[test]
    fn test_session_decoding() {
        let session: Session = serde_json::from_value(json!({
            "metadata": {
                "id": "0x0000000000000000000000000000000000000001",
                "organizer": "0x0000000000000000000000000000000000000002",
                "prize": "0x0000000000000000000000000000000000000003",
                "maximumUser": 8, "minimumUser": 2, "remainingUser": 1,
                "startAfter": 10, "maxRounds": 5, "roundLength": 10,
                "roundInterval": 5, "initialHealthPoint": 100, "numberOfGloves": 3
            },
            "state": "READY",
            "players": []
        }))
        .unwrap();
        assert_eq!(session.state, SessionState::Ready);
        assert_eq!(session.metadata.maximum_user, 8);
        assert!(session.metadata.users.is_empty());
    }
}
