//! Account kinds and error definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::storage::StorageError;

/// The three ways a user can hold an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccountKind {
    /// Private key held by the client.
    RawKey,
    /// Signing delegated to an injected wallet provider.
    BrowserWallet,
    /// Signer held server-side behind a bearer-token session.
    DelegatedBackend,
}

impl AccountKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AccountKind::RawKey => "rawKey",
            AccountKind::BrowserWallet => "browserWallet",
            AccountKind::DelegatedBackend => "delegatedBackend",
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountKind {
    type Err = AccountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rawKey" => Ok(AccountKind::RawKey),
            "browserWallet" => Ok(AccountKind::BrowserWallet),
            "delegatedBackend" => Ok(AccountKind::DelegatedBackend),
            other => Err(AccountError::UnknownKind(other.to_string())),
        }
    }
}

/// Error reported by a wallet or auth provider (EIP-1193 style).
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("provider error {code}: {message}")]
pub struct ProviderError {
    pub code: i64,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Errors that can occur while connecting or using an account.
#[derive(Debug, Error)]
pub enum AccountError {
    /// No credential has been established, or it was cleared.
    #[error("account is not connected")]
    NotConnected,

    /// The account could not produce a signature.
    #[error("signing failed: {0}")]
    SigningFailed(String),

    /// Restore found nothing to restore.
    #[error("no stored credential for {0} account")]
    NoStoredCredential(AccountKind),

    /// The wallet refused to move to the configured chain.
    #[error("chain switch rejected: {0}")]
    ChainSwitchRejected(String),

    /// Invalid private key format.
    #[error("Invalid private key format: {0}")]
    InvalidPrivateKey(String),

    /// The auth session provider could not supply a session.
    #[error("auth session unavailable: {0}")]
    AuthUnavailable(String),

    /// No creator was supplied for the stored account kind.
    #[error("no creator available for {0} accounts")]
    CreatorUnavailable(AccountKind),

    /// Unrecognised account kind tag.
    #[error("unknown account kind '{0}'")]
    UnknownKind(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result type for account operations.
pub type AccountResult<T> = Result<T, AccountError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        for kind in [AccountKind::RawKey, AccountKind::BrowserWallet, AccountKind::DelegatedBackend] {
            assert_eq!(kind.as_str().parse::<AccountKind>().unwrap(), kind);
        }
        assert!(matches!("ledger".parse::<AccountKind>(), Err(AccountError::UnknownKind(_))));
    }

    #[test]
    fn test_error_display() {
        let err = AccountError::NoStoredCredential(AccountKind::RawKey);
        assert_eq!(err.to_string(), "no stored credential for rawKey account");

        let err = ProviderError::new(4001, "User rejected the request.");
        assert_eq!(err.to_string(), "provider error 4001: User rejected the request.");
    }
}
