//! GraphQL documents and typed helpers for the HandRoyal schema.

use alloy::primitives::Address;
use serde::Deserialize;

use crate::graphql::types::{field, GraphqlRequest, GraphqlResult, Glove, Session, SessionState, Tip, User};
use crate::graphql::GraphqlTransport;
use crate::transaction::types::{PlainValue, TransactionResult, TxId, TxStatus, UnsignedTransaction};

pub const TIP: &str = "query Tip { tip { height hash } }";

pub const USER: &str = "query User($userId: Address!) { \
    user(userId: $userId) { id name regHeight ownedGloves equippedGlove sessionId } }";

const SESSION_FIELDS: &str = "metadata { id organizer prize maximumUser minimumUser remainingUser \
    startAfter maxRounds roundLength roundInterval initialHealthPoint numberOfGloves users } \
    state players { id gloves state } creationHeight startHeight";

pub const GLOVE: &str = "query Glove($gloveId: Address!) { glove(gloveId: $gloveId) { id author gloveType rarity } }";

pub const IS_VALID_SESSION_ID: &str =
    "query IsValidSessionId($sessionId: Address!) { isValidSessionId(sessionId: $sessionId) }";

pub const IS_GLOVE_REGISTERED: &str =
    "query IsGloveRegistered($gloveId: Address!) { isGloveRegistered(gloveId: $gloveId) }";

pub const UNSIGNED_TRANSACTION: &str = "query UnsignedTransaction($address: Address!, $plainValue: Hex!) { \
    unsignedTransaction(address: $address, plainValue: $plainValue) }";

pub const STAGE_TRANSACTION: &str = "mutation StageTransaction($unsignedTransaction: Hex!, $signature: Hex!) { \
    stageTransaction(unsignedTransaction: $unsignedTransaction, signature: $signature) }";

pub const TRANSACTION_RESULT: &str = "query TransactionResult($txId: TxId!) { \
    transactionResult(txId: $txId) { txStatus blockIndex exceptionNames } }";

/// Fetch the current chain tip.
pub async fn tip<T: GraphqlTransport>(transport: &T) -> GraphqlResult<Option<Tip>> {
    let data = transport.execute(GraphqlRequest::new(TIP).operation("Tip"), None).await?;
    field(&data, "tip")
}

/// Look up a user by address.
pub async fn user<T: GraphqlTransport>(transport: &T, user_id: Address) -> GraphqlResult<Option<User>> {
    let request = GraphqlRequest::new(USER)
        .operation("User")
        .var("userId", user_id.to_string());
    let data = transport.execute(request, None).await?;
    field(&data, "user")
}

/// Look up a session by id.
pub async fn session<T: GraphqlTransport>(
    transport: &T,
    session_id: Address,
) -> GraphqlResult<Option<Session>> {
    let query = format!(
        "query Session($sessionId: Address!) {{ session(sessionId: $sessionId) {{ {SESSION_FIELDS} }} }}"
    );
    let request = GraphqlRequest::new(query)
        .operation("Session")
        .var("sessionId", session_id.to_string());
    let data = transport.execute(request, None).await?;
    field(&data, "session")
}

/// List sessions, optionally filtered by state.
pub async fn sessions<T: GraphqlTransport>(
    transport: &T,
    state: Option<SessionState>,
) -> GraphqlResult<Vec<Session>> {
    let query = format!(
        "query Sessions($state: SessionState) {{ sessions(state: $state) {{ {SESSION_FIELDS} }} }}"
    );
    let mut request = GraphqlRequest::new(query).operation("Sessions");
    if let Some(state) = state {
        let value = serde_json::to_value(state)
            .map_err(|e| crate::graphql::GraphqlError::Decode(e.to_string()))?;
        request = request.var("state", value);
    }
    let data = transport.execute(request, None).await?;
    Ok(field(&data, "sessions")?.unwrap_or_default())
}

/// Look up a glove by id.
pub async fn glove<T: GraphqlTransport>(transport: &T, glove_id: Address) -> GraphqlResult<Option<Glove>> {
    let request = GraphqlRequest::new(GLOVE)
        .operation("Glove")
        .var("gloveId", glove_id.to_string());
    let data = transport.execute(request, None).await?;
    field(&data, "glove")
}

/// Whether `session_id` is still free to be used for a new session.
pub async fn is_valid_session_id<T: GraphqlTransport>(
    transport: &T,
    session_id: Address,
) -> GraphqlResult<bool> {
    let request = GraphqlRequest::new(IS_VALID_SESSION_ID)
        .operation("IsValidSessionId")
        .var("sessionId", session_id.to_string());
    let data = transport.execute(request, None).await?;
    Ok(field(&data, "isValidSessionId")?.unwrap_or(false))
}

/// Whether a glove with this id has already been registered.
pub async fn is_glove_registered<T: GraphqlTransport>(
    transport: &T,
    glove_id: Address,
) -> GraphqlResult<bool> {
    let request = GraphqlRequest::new(IS_GLOVE_REGISTERED)
        .operation("IsGloveRegistered")
        .var("gloveId", glove_id.to_string());
    let data = transport.execute(request, None).await?;
    Ok(field(&data, "isGloveRegistered")?.unwrap_or(false))
}

/// Ask the node to wrap a plain action payload into an unsigned transaction.
///
/// An empty or `null` answer yields `None`.
pub async fn unsigned_transaction<T: GraphqlTransport>(
    transport: &T,
    address: Address,
    plain_value: &PlainValue,
) -> GraphqlResult<Option<UnsignedTransaction>> {
    let request = GraphqlRequest::new(UNSIGNED_TRANSACTION)
        .operation("UnsignedTransaction")
        .var("address", address.to_string())
        .var("plainValue", plain_value.as_str());
    let data = transport.execute(request, None).await?;
    let hex: Option<String> = field(&data, "unsignedTransaction")?;
    Ok(hex.filter(|h| !h.is_empty()).map(UnsignedTransaction::new))
}

/// Submit a signed transaction to the pending pool.
pub async fn stage_transaction<T: GraphqlTransport>(
    transport: &T,
    unsigned: &UnsignedTransaction,
    signature: &str,
) -> GraphqlResult<Option<TxId>> {
    let request = GraphqlRequest::new(STAGE_TRANSACTION)
        .operation("StageTransaction")
        .var("unsignedTransaction", unsigned.as_str())
        .var("signature", signature);
    let data = transport.execute(request, None).await?;
    let id: Option<String> = field(&data, "stageTransaction")?;
    Ok(id.filter(|id| !id.is_empty()).map(TxId::new))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionResultWire {
    tx_status: Option<TxStatus>,
    #[serde(default)]
    block_index: Option<u64>,
    #[serde(default)]
    exception_names: Option<Vec<Option<String>>>,
}

/// Fetch the execution status of a staged transaction.
///
/// `None` means the server returned no status at all.
pub async fn transaction_result<T: GraphqlTransport>(
    transport: &T,
    tx_id: &TxId,
) -> GraphqlResult<Option<TransactionResult>> {
    let request = GraphqlRequest::new(TRANSACTION_RESULT)
        .operation("TransactionResult")
        .var("txId", tx_id.as_str());
    let data = transport.execute(request, None).await?;
    let wire: Option<TransactionResultWire> = field(&data, "transactionResult")?;
    Ok(wire.and_then(|wire| {
        wire.tx_status.map(|status| TransactionResult {
            status,
            block_index: wire.block_index,
            exception_names: wire
                .exception_names
                .unwrap_or_default()
                .into_iter()
                .flatten()
                .collect(),
        })
    }))
}

/// Subscription documents. Each pairs with the response field it populates.
pub mod subscriptions {
    use super::*;

    pub const ON_TIP_CHANGED: &str = "onTipChanged";
    pub const ON_USER_CHANGED: &str = "onUserChanged";
    pub const ON_SESSION_CHANGED: &str = "onSessionChanged";
    pub const ON_GLOVE_REGISTERED: &str = "onGloveRegistered";
    pub const ON_TRANSACTION_CHANGED: &str = "onTransactionChanged";
    pub const ON_MATCH_MADE: &str = "onMatchMade";
    pub const ON_PICK_UP_RESULT: &str = "onPickUpResult";

    pub fn on_tip_changed() -> GraphqlRequest {
        GraphqlRequest::new("subscription OnTipChanged { onTipChanged { height hash } }")
            .operation("OnTipChanged")
    }

    pub fn on_user_changed(user_id: Address) -> GraphqlRequest {
        GraphqlRequest::new(
            "subscription OnUserChanged($userId: Address!) { \
             onUserChanged(userId: $userId) { id name regHeight ownedGloves equippedGlove sessionId } }",
        )
        .operation("OnUserChanged")
        .var("userId", user_id.to_string())
    }

    pub fn on_session_changed(session_id: Address, user_id: Address) -> GraphqlRequest {
        GraphqlRequest::new(format!(
            "subscription OnSessionChanged($sessionId: Address!, $userId: Address!) {{ \
             onSessionChanged(sessionId: $sessionId, userId: $userId) {{ session {{ {SESSION_FIELDS} }} }} }}"
        ))
        .operation("OnSessionChanged")
        .var("sessionId", session_id.to_string())
        .var("userId", user_id.to_string())
    }

    pub fn on_glove_registered(glove_id: Address) -> GraphqlRequest {
        GraphqlRequest::new(
            "subscription OnGloveRegistered($gloveId: Address!) { onGloveRegistered(gloveId: $gloveId) }",
        )
        .operation("OnGloveRegistered")
        .var("gloveId", glove_id.to_string())
    }

    pub fn on_transaction_changed(tx_id: &TxId) -> GraphqlRequest {
        GraphqlRequest::new(
            "subscription OnTransactionChanged($txId: TxId!) { \
             onTransactionChanged(txId: $txId) { status blockIndex exceptionNames } }",
        )
        .operation("OnTransactionChanged")
        .var("txId", tx_id.as_str())
    }

    pub fn on_match_made(session_id: Address, user_id: Address) -> GraphqlRequest {
        GraphqlRequest::new(
            "subscription OnMatchMade($sessionId: Address!, $userId: Address!) { \
             onMatchMade(sessionId: $sessionId, userId: $userId) { round opponent } }",
        )
        .operation("OnMatchMade")
        .var("sessionId", session_id.to_string())
        .var("userId", user_id.to_string())
    }

    pub fn on_pick_up_result(tx_id: &TxId) -> GraphqlRequest {
        GraphqlRequest::new(
            "subscription OnPickUpResult($txId: TxId!) { onPickUpResult(txId: $txId) { gloves } }",
        )
        .operation("OnPickUpResult")
        .var("txId", tx_id.as_str())
    }
}
