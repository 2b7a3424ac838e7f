//! Crate-level error type.

use thiserror::Error;

use crate::account::AccountError;
use crate::actions::ValidationError;
use crate::assets::AssetError;
use crate::config::ConfigError;
use crate::graphql::GraphqlError;
use crate::storage::StorageError;
use crate::subscription::SubscriptionError;
use crate::transaction::TransactionError;

/// Any failure surfaced by [`crate::HandRoyalClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Account(#[from] AccountError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error(transparent)]
    Graphql(#[from] GraphqlError),

    #[error(transparent)]
    Subscription(#[from] SubscriptionError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error("no free session id after {0} attempts")]
    SessionIdExhausted(u32),

    #[error("not logged in")]
    NotLoggedIn,
}

/// Result type for client-level operations.
pub type ClientResult<T> = Result<T, ClientError>;
