//! Glove asset service (REST).

pub mod client;

use thiserror::Error;

pub use client::{AssetClient, Hand};

/// Errors from the asset service.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("invalid asset URL: {0}")]
    InvalidUrl(String),

    #[error("asset request failed: {0}")]
    Transport(String),

    #[error("asset service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// Result type for asset operations.
pub type AssetResult<T> = Result<T, AssetError>;
