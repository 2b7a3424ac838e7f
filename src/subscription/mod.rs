//! Push subscriptions over `graphql-transport-ws`.
//!
//! # Data Flow
//! ```text
//! SubscriptionClient::connect
//!     → connection_init / connection_ack handshake
//!     → reader task routes next/error/complete by subscription id
//!     → Subscription<T> (Stream, FIFO per subscription)
//!     → TipSync / refetch_on_tip (session glue)
//! ```
//!
//! # Design Decisions
//! - One socket, many subscriptions; ids are random UUIDs
//! - Dropping a `Subscription` sends `complete` right away
//! - No ordering guarantee across different subscriptions

pub mod client;
pub mod protocol;
pub mod stream;
pub mod sync;

use thiserror::Error;

use crate::storage::StorageError;

pub use client::SubscriptionClient;
pub use protocol::{ClientMessage, ServerMessage, GRAPHQL_TRANSPORT_WS};
pub use stream::Subscription;
pub use sync::{refetch_on_tip, TipSync};

/// Errors from the subscription channel.
#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("failed to connect: {0}")]
    Connect(String),

    #[error("no connection_ack within {0:?}")]
    AckTimeout(std::time::Duration),

    #[error("protocol violation: {0}")]
    Protocol(String),

    #[error("subscription error: {0}")]
    Server(String),

    #[error("connection closed")]
    Closed,

    #[error("failed to decode event: {0}")]
    Decode(String),

    #[error("subscription task failed: {0}")]
    Task(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result type for subscription operations.
pub type SubscriptionResult<T> = Result<T, SubscriptionError>;
