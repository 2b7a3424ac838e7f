//! HTTP GraphQL client.
//!
//! # Responsibilities
//! - POST GraphQL documents as JSON
//! - Attach bearer tokens for delegated accounts
//! - Map transport, status and GraphQL-level failures onto [`GraphqlError`]
//!
//! Transport failures are returned immediately; there is no retry layer.

use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::config::GraphqlConfig;
use crate::graphql::types::{GraphqlError, GraphqlRequest, GraphqlResponse, GraphqlResult};
use crate::graphql::GraphqlTransport;

/// GraphQL-over-HTTP client.
#[derive(Clone)]
pub struct GraphqlClient {
    http: Client,
    endpoint: Url,
    timeout: Duration,
}

impl GraphqlClient {
    /// Create a client for the configured HTTP endpoint.
    pub fn new(config: &GraphqlConfig) -> GraphqlResult<Self> {
        let endpoint: Url = config.http_url.parse().map_err(|e| {
            GraphqlError::Transport(format!("Invalid GraphQL URL '{}': {}", config.http_url, e))
        })?;
        let http = Client::builder()
            .user_agent(format!("handroyal-client/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GraphqlError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            endpoint,
            timeout: config.request_timeout(),
        })
    }

    /// The endpoint this client posts to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl GraphqlTransport for GraphqlClient {
    async fn execute(&self, request: GraphqlRequest, bearer: Option<&str>) -> GraphqlResult<Value> {
        let operation = request.operation_name.clone().unwrap_or_default();
        let mut builder = self
            .http
            .post(self.endpoint.clone())
            .timeout(self.timeout)
            .json(&request);
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(operation = %operation, error = %e, "GraphQL request failed");
            GraphqlError::Transport(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(operation = %operation, status = status.as_u16(), "GraphQL endpoint returned error status");
            return Err(GraphqlError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: GraphqlResponse = response
            .json()
            .await
            .map_err(|e| GraphqlError::Decode(e.to_string()))?;

        tracing::debug!(operation = %operation, errors = envelope.errors.len(), "GraphQL response received");
        envelope.into_data()
    }
}

impl std::fmt::Debug for GraphqlClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphqlClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}
