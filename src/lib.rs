//! HandRoyal client core.
//!
//! Account abstraction, the sign → stage → poll transaction pipeline,
//! push-subscription glue and local persistence of session identity for
//! applications talking to a HandRoyal node.
//!
//! # Architecture Overview
//!
//! ```text
//!   HandRoyalClient ──────────────┬──────────────────────────────┐
//!        │                        │                              │
//!        ▼                        ▼                              ▼
//!   account (RawKey |       transaction pipeline           subscription
//!   BrowserWallet |         unsignedTransaction →          graphql-transport-ws
//!   Delegated)              sign → stage → poll            TipSync, refetch_on_tip
//!        │                        │                              │
//!        └──────────┬─────────────┴───────────────┬──────────────┘
//!                   ▼                             ▼
//!           storage (SessionStore)         context (AppContext)
//! ```

// Core subsystems
pub mod account;
pub mod actions;
pub mod graphql;
pub mod subscription;
pub mod transaction;

// State
pub mod context;
pub mod storage;

// Auxiliary services
pub mod assets;

// Cross-cutting concerns
pub mod config;
pub mod error;
pub mod observability;

pub mod client;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{HandRoyalClient, Performed};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
