//! `graphql-transport-ws` message frames.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::graphql::types::{GraphqlErrorEntry, GraphqlResponse};
use crate::graphql::GraphqlRequest;

/// WebSocket sub-protocol name sent during the handshake.
pub const GRAPHQL_TRANSPORT_WS: &str = "graphql-transport-ws";

/// Frames sent by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    ConnectionInit {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
    Subscribe {
        id: String,
        payload: GraphqlRequest,
    },
    Complete {
        id: String,
    },
    Ping {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
    Pong {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
}

/// Frames sent by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    ConnectionAck {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
    Next {
        id: String,
        payload: GraphqlResponse,
    },
    Error {
        id: String,
        payload: Vec<GraphqlErrorEntry>,
    },
    Complete {
        id: String,
    },
    Ping {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
    Pong {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
}

impl ClientMessage {
    pub fn to_json(&self) -> String {
        // Every field is a string, a map or a JSON value, so this cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_frames() {
        let init = serde_json::to_value(ClientMessage::ConnectionInit { payload: None }).unwrap();
        assert_eq!(init, json!({ "type": "connection_init" }));

        let subscribe = ClientMessage::Subscribe {
            id: "1".into(),
            payload: GraphqlRequest::new("subscription { onTipChanged { height hash } }"),
        };
        assert_eq!(
            serde_json::to_value(&subscribe).unwrap(),
            json!({
                "type": "subscribe",
                "id": "1",
                "payload": { "query": "subscription { onTipChanged { height hash } }" }
            })
        );
        assert_eq!(
            ClientMessage::Complete { id: "1".into() }.to_json(),
            r#"{"type":"complete","id":"1"}"#
        );
    }

    #[test]
    fn test_server_frames() {
        let ack: ServerMessage = serde_json::from_str(r#"{"type":"connection_ack"}"#).unwrap();
        assert!(matches!(ack, ServerMessage::ConnectionAck { payload: None }));

        let next: ServerMessage = serde_json::from_value(json!({
            "type": "next",
            "id": "7",
            "payload": { "data": { "onTipChanged": { "height": 3, "hash": "ab" } } }
        }))
        .unwrap();
        match next {
            ServerMessage::Next { id, payload } => {
                assert_eq!(id, "7");
                assert_eq!(payload.into_data().unwrap()["onTipChanged"]["height"], 3);
            }
            other => panic!("unexpected frame: {other:?}"),
        }

        let error: ServerMessage = serde_json::from_value(json!({
            "type": "error",
            "id": "7",
            "payload": [{ "message": "boom" }]
        }))
        .unwrap();
        assert!(matches!(error, ServerMessage::Error { ref payload, .. } if payload[0].message == "boom"));

        let ping: ServerMessage = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert!(matches!(ping, ServerMessage::Ping { .. }));
    }
}
