//! Transaction submission and confirmation.
//!
//! # Data Flow
//! ```text
//! PlainValue (server-built action payload)
//!     → unsignedTransaction(address, plainValue)
//!     → Account::sign
//!     → stageTransaction(unsigned, signature) → TxId
//!     → transactionResult(txId) polled until SUCCESS | FAILURE | INVALID
//! ```
//!
//! Steps run strictly in order and never loop back. A failure at any step is
//! terminal for the user action; a fresh unsigned transaction is required to
//! try again.

pub mod pipeline;
pub mod types;

pub use pipeline::{execute_and_wait, execute_transaction, wait_for_transaction};
pub use types::{
    PipelineConfig, PipelineResult, PlainValue, TransactionError, TransactionResult, TxId, TxStatus,
    UnsignedTransaction,
};
