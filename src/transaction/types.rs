//! Transaction pipeline types and error definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::account::AccountError;
use crate::config::TransactionConfig;
use crate::graphql::GraphqlError;

/// Hex-encoded, server-constructed action payload prior to signing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlainValue(String);

/// Hex-encoded unsigned transaction. Single use.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnsignedTransaction(String);

/// Identifier of a staged transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(String);

macro_rules! hex_newtype {
    ($name:ident) => {
        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

hex_newtype!(PlainValue);
hex_newtype!(UnsignedTransaction);
hex_newtype!(TxId);

impl UnsignedTransaction {
    /// Raw bytes of the transaction, the message that gets signed.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TransactionError> {
        alloy::primitives::hex::decode(&self.0)
            .map_err(|e| TransactionError::InvalidHex(format!("unsigned transaction: {e}")))
    }
}

/// Execution status reported by `transactionResult`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxStatus {
    Staging,
    Included,
    Success,
    Failure,
    Invalid,
}

impl TxStatus {
    /// `Success`, `Failure` and `Invalid` end polling.
    pub fn is_terminal(self) -> bool {
        matches!(self, TxStatus::Success | TxStatus::Failure | TxStatus::Invalid)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TxStatus::Staging => "staging",
            TxStatus::Included => "included",
            TxStatus::Success => "success",
            TxStatus::Failure => "failure",
            TxStatus::Invalid => "invalid",
        }
    }
}

/// Status of a transaction as observed by one poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResult {
    pub status: TxStatus,
    pub block_index: Option<u64>,
    pub exception_names: Vec<String>,
}

/// Polling parameters for [`wait_for_transaction`](crate::transaction::wait_for_transaction).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(1000),
            timeout: Duration::from_millis(30_000),
        }
    }
}

impl From<&TransactionConfig> for PipelineConfig {
    fn from(config: &TransactionConfig) -> Self {
        Self {
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }
}

/// Errors that end a transaction attempt.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// The account holds no credential.
    #[error("account is not connected")]
    AccountNotConnected,

    /// The node did not produce an unsigned transaction.
    #[error("unsigned transaction unavailable")]
    UnsignedTransactionUnavailable,

    /// The account could not sign.
    #[error(transparent)]
    Account(#[from] AccountError),

    /// The node refused the signed transaction.
    #[error("failed to stage transaction: {0}")]
    StageFailed(String),

    /// A poll returned no status at all.
    #[error("transaction result unavailable for {0}")]
    ResultUnavailable(TxId),

    /// Execution failed on chain.
    #[error("transaction {tx_id} failed: {reason}")]
    TransactionFailed { tx_id: TxId, reason: String },

    /// The node marked the transaction invalid.
    #[error("transaction {0} is invalid")]
    TransactionInvalid(TxId),

    /// No terminal status within the time budget.
    #[error("timed out after {elapsed_ms} ms waiting for transaction {tx_id}")]
    Timeout { tx_id: TxId, elapsed_ms: u128 },

    /// A payload was not valid hex.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// The action response did not have the expected shape.
    #[error("unexpected action response: {0}")]
    UnexpectedResponse(String),

    /// Transport or GraphQL failure, propagated without retry.
    #[error(transparent)]
    Graphql(#[from] GraphqlError),
}

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, TransactionError>;
