//! Local persistence of session identity.
//!
//! # Data Flow
//! ```text
//! account creators / TipSync / CLI
//!     → session.rs (fixed keys, typed accessors)
//!     → local.rs (string key/value map, flushed to a JSON file on every change)
//! ```
//!
//! Only credential references and UI preferences are stored here; server-side
//! state is never cached.

pub mod local;
pub mod session;

use thiserror::Error;

pub use local::LocalStorage;
pub use session::SessionStore;

/// Errors from the local key/value store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
