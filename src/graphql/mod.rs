//! GraphQL access to the HandRoyal node.
//!
//! # Data Flow
//! ```text
//! queries.rs (documents + typed helpers)
//!     → GraphqlTransport::execute (client.rs over HTTP, or a test double)
//!     → `data` object
//!     → serde decode into types.rs
//! ```
//!
//! Every network request is a suspension point; nothing here retries.

pub mod client;
pub mod queries;
pub mod types;

use serde_json::Value;
use std::future::Future;

pub use client::GraphqlClient;
pub use types::{GraphqlError, GraphqlRequest, GraphqlResult, Tip};

/// Executes a GraphQL document and yields its `data` object.
///
/// `bearer` adds an `Authorization: Bearer <token>` header.
pub trait GraphqlTransport: Send + Sync {
    fn execute(
        &self,
        request: GraphqlRequest,
        bearer: Option<&str>,
    ) -> impl Future<Output = GraphqlResult<Value>> + Send;
}
