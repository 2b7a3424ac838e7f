//! Game actions and their client-side checks.
//!
//! # Data Flow
//! ```text
//! Action (typed parameters)
//!     → validation.rs (no network round-trip on bad input)
//!     → action.rs (plain-value query or delegated mutation)
//!     → Account::execute_action
//! ```

pub mod action;
pub mod session_id;
pub mod validation;

use serde_json::Value;

use crate::transaction::TxId;

pub use action::{Action, CreateSessionParams};
pub use session_id::{generate_session_id, random_session_id};
pub use validation::{parse_address, ValidationError};

/// What an executed action produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    /// Present when a transaction was staged.
    pub tx_id: Option<TxId>,
    /// The raw `data` of the action request.
    pub data: Value,
}
