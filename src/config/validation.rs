//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate URLs and their schemes
//! - Validate value ranges (intervals > 0, timeout covers at least one poll)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;
use url::Url;

use crate::config::schema::ClientConfig;

/// A single semantic problem in a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid URL '{value}'")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{field}: unsupported scheme '{scheme}'")]
    UnsupportedScheme { field: &'static str, scheme: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("transaction.timeout_ms ({timeout_ms}) is shorter than poll_interval_ms ({poll_interval_ms})")]
    TimeoutShorterThanInterval { timeout_ms: u64, poll_interval_ms: u64 },

    #[error("chain.rpc_urls must list at least one URL")]
    NoRpcUrls,
}

/// Validate a configuration, returning every problem found.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_url(&mut errors, "graphql.http_url", &config.graphql.http_url, &["http", "https"]);
    check_url(&mut errors, "graphql.ws_url", &config.graphql.ws_url, &["ws", "wss"]);
    check_url(&mut errors, "assets.base_url", &config.assets.base_url, &["http", "https"]);

    if config.graphql.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "graphql.request_timeout_secs" });
    }
    if config.chain.chain_id == 0 {
        errors.push(ValidationError::Zero { field: "chain.chain_id" });
    }
    if config.chain.rpc_urls.is_empty() {
        errors.push(ValidationError::NoRpcUrls);
    }

    let tx = &config.transaction;
    if tx.poll_interval_ms == 0 {
        errors.push(ValidationError::Zero { field: "transaction.poll_interval_ms" });
    } else if tx.timeout_ms < tx.poll_interval_ms {
        errors.push(ValidationError::TimeoutShorterThanInterval {
            timeout_ms: tx.timeout_ms,
            poll_interval_ms: tx.poll_interval_ms,
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(
    errors: &mut Vec<ValidationError>,
    field: &'static str,
    value: &str,
    schemes: &[&str],
) {
    match Url::parse(value) {
        Ok(url) if schemes.contains(&url.scheme()) => {}
        Ok(url) => errors.push(ValidationError::UnsupportedScheme {
            field,
            scheme: url.scheme().to_string(),
        }),
        Err(_) => errors.push(ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ClientConfig::default()).is_ok());
    }

    #[test]
    fn test_timeout_shorter_than_interval() {
        let mut config = ClientConfig::default();
        config.transaction.timeout_ms = 100;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::TimeoutShorterThanInterval {
                timeout_ms: 100,
                poll_interval_ms: 1000,
            }]
        );
    }

    #[test]
    fn test_bad_urls() {
        let mut config = ClientConfig::default();
        config.graphql.http_url = "not a url".to_string();
        config.assets.base_url = "ftp://assets".to_string();
        config.chain.rpc_urls.clear();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::NoRpcUrls));
    }
}
