//! Randomised session id allocation.

use alloy::primitives::Address;
use rand::RngCore;

use crate::error::{ClientError, ClientResult};
use crate::graphql::{queries, GraphqlTransport};

/// A uniformly random 20-byte session id.
pub fn random_session_id() -> Address {
    let mut bytes = [0u8; 20];
    rand::thread_rng().fill_bytes(&mut bytes);
    Address::from(bytes)
}

/// Draw random ids until the node reports one as free.
///
/// A taken id is silently replaced; only transport failures or running out of
/// attempts surface as errors.
pub async fn generate_session_id<T: GraphqlTransport>(
    transport: &T,
    max_attempts: u32,
) -> ClientResult<Address> {
    for attempt in 1..=max_attempts {
        let candidate = random_session_id();
        if queries::is_valid_session_id(transport, candidate).await? {
            tracing::debug!(session_id = %candidate, attempt, "Allocated session id");
            return Ok(candidate);
        }
        tracing::debug!(session_id = %candidate, attempt, "Session id taken, regenerating");
    }
    Err(ClientError::SessionIdExhausted(max_attempts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;
    use serde_json::json;

    #[tokio::test]
    async fn test_taken_ids_are_regenerated() {
        let transport = ScriptedTransport::new();
        transport.push("IsValidSessionId", json!({ "isValidSessionId": false }));
        transport.push("IsValidSessionId", json!({ "isValidSessionId": false }));
        transport.push("IsValidSessionId", json!({ "isValidSessionId": true }));

        let id = generate_session_id(&transport, 5).await.unwrap();
        let requests = transport.requests("IsValidSessionId");
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[2].variables["sessionId"], id.to_string());
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let transport = ScriptedTransport::new();
        transport.repeat("IsValidSessionId", json!({ "isValidSessionId": false }));

        let err = generate_session_id(&transport, 3).await.unwrap_err();
        assert!(matches!(err, ClientError::SessionIdExhausted(3)));
        assert_eq!(transport.calls("IsValidSessionId"), 3);
    }

    #[test]
    fn test_random_ids_differ() {
        assert_ne!(random_session_id(), random_session_id());
    }
}
