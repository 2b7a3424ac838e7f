//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration for the HandRoyal client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// GraphQL endpoints (queries, mutations, subscriptions).
    pub graphql: GraphqlConfig,

    /// Chain definition used by browser-style wallets.
    pub chain: ChainConfig,

    /// Transaction confirmation polling.
    pub transaction: TransactionConfig,

    /// Local persistence of session identity.
    pub storage: StorageConfig,

    /// Glove asset service.
    pub assets: AssetConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// GraphQL endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GraphqlConfig {
    /// HTTP endpoint for queries and mutations.
    pub http_url: String,

    /// WebSocket endpoint for subscriptions (`graphql-transport-ws`).
    pub ws_url: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// How long to wait for `connection_ack` after opening the socket.
    pub connection_ack_timeout_secs: u64,
}

impl Default for GraphqlConfig {
    fn default() -> Self {
        Self {
            http_url: "http://localhost:5259/graphql".to_string(),
            ws_url: "ws://localhost:5259/graphql".to_string(),
            request_timeout_secs: 10,
            connection_ack_timeout_secs: 10,
        }
    }
}

impl GraphqlConfig {
    /// Request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Connection-ack timeout as a [`Duration`].
    pub fn connection_ack_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_ack_timeout_secs)
    }
}

/// Chain definition registered with wallet providers.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Chain ID. The only source of truth; hex encodings derive from it.
    pub chain_id: u64,

    /// Human readable chain name.
    pub chain_name: String,

    /// JSON-RPC URLs announced to the wallet.
    pub rpc_urls: Vec<String>,

    /// Native currency name.
    pub currency_name: String,

    /// Native currency symbol.
    pub currency_symbol: String,

    /// Native currency decimals.
    pub currency_decimals: u8,

    /// Block explorer URLs announced to the wallet.
    #[serde(default)]
    pub block_explorer_urls: Vec<String>,
}

impl ChainConfig {
    /// The chain id in the `0x`-prefixed lowercase hex form wallets expect.
    pub fn chain_id_hex(&self) -> String {
        format!("{:#x}", self.chain_id)
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            chain_id: 31337,
            chain_name: "HandRoyal Local".to_string(),
            rpc_urls: vec!["http://localhost:8545".to_string()],
            currency_name: "Ether".to_string(),
            currency_symbol: "ETH".to_string(),
            currency_decimals: 18,
            block_explorer_urls: Vec::new(),
        }
    }
}

/// Transaction confirmation polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransactionConfig {
    /// Delay between `transactionResult` polls in milliseconds.
    pub poll_interval_ms: u64,

    /// Wall-clock budget for reaching a terminal status in milliseconds.
    pub timeout_ms: u64,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            timeout_ms: 30_000,
        }
    }
}

/// Local storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file backing the key/value store. `None` keeps state in memory.
    pub path: Option<PathBuf>,
}

/// Glove asset service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Base URL of the asset service.
    pub base_url: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5260".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
