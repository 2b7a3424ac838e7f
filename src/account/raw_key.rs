//! Accounts backed by a private key held in memory.
//!
//! # Security
//! - The key is persisted only through [`SessionStore`], as hex
//! - Keys and signatures are never logged
//! - `Debug` output shows the address only

use alloy::primitives::{hex, Address};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use arc_swap::ArcSwapOption;

use crate::account::creator::AccountCreator;
use crate::account::types::{AccountError, AccountKind, AccountResult};
use crate::account::Account;
use crate::storage::SessionStore;

/// Account signing locally with a secp256k1 key.
pub struct RawKeyAccount {
    /// The signer, absent once disconnected.
    signer: ArcSwapOption<PrivateKeySigner>,
    store: SessionStore,
}

impl RawKeyAccount {
    /// Wrap an existing signer.
    pub fn new(signer: PrivateKeySigner, store: SessionStore) -> Self {
        Self {
            signer: ArcSwapOption::from_pointee(signer),
            store,
        }
    }

    /// Create an account from a hex-encoded private key string.
    ///
    /// Accepts the key with or without a `0x` prefix.
    pub fn from_private_key(private_key_hex: &str, store: SessionStore) -> AccountResult<Self> {
        let key_hex = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| AccountError::InvalidPrivateKey(format!("{}", e)))?;

        Ok(Self::new(signer, store))
    }

    /// The account's address.
    pub fn address(&self) -> AccountResult<Address> {
        self.signer
            .load_full()
            .map(|s| s.address())
            .ok_or(AccountError::NotConnected)
    }

    pub fn is_connected(&self) -> bool {
        self.signer.load().is_some()
    }

    /// Private key as lowercase hex without prefix.
    pub fn private_key_hex(&self) -> AccountResult<String> {
        self.signer
            .load_full()
            .map(|s| hex::encode(s.to_bytes()))
            .ok_or(AccountError::NotConnected)
    }

    /// Personal-sign `message`, returning `r || s || v` as 130 hex characters.
    ///
    /// `v` is 27 or 28.
    pub async fn sign(&self, message: &[u8]) -> AccountResult<String> {
        let signer = self
            .signer
            .load_full()
            .ok_or_else(|| AccountError::SigningFailed("account is disconnected".to_string()))?;

        let signature = signer
            .sign_message(message)
            .await
            .map_err(|e| AccountError::SigningFailed(format!("Message signing failed: {}", e)))?;

        Ok(hex::encode(signature.as_bytes()))
    }

    /// Forget the key in memory and in storage. Safe to call repeatedly.
    pub fn disconnect(&self) -> AccountResult<()> {
        if let Some(signer) = self.signer.swap(None) {
            tracing::info!(address = %signer.address(), "Raw key account disconnected");
        }
        self.store.clear_raw_key()?;
        Ok(())
    }
}

impl std::fmt::Debug for RawKeyAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawKeyAccount")
            .field("address", &self.address().ok())
            .finish()
    }
}

/// Creates and restores [`RawKeyAccount`]s.
#[derive(Debug, Clone)]
pub struct RawKeyCreator {
    store: SessionStore,
}

impl RawKeyCreator {
    pub fn new(store: SessionStore) -> Self {
        Self { store }
    }

    fn persist(&self, account: &RawKeyAccount) -> AccountResult<()> {
        self.store
            .save_raw_key(&account.private_key_hex()?, account.address()?)?;
        Ok(())
    }
}

impl AccountCreator for RawKeyCreator {
    /// A private key to import, or `None` to generate a fresh one.
    type Param = Option<String>;

    fn kind(&self) -> AccountKind {
        AccountKind::RawKey
    }

    async fn create(&self, private_key: Option<String>) -> AccountResult<Account> {
        let account = match private_key {
            Some(key) => RawKeyAccount::from_private_key(&key, self.store.clone())?,
            None => RawKeyAccount::new(PrivateKeySigner::random(), self.store.clone()),
        };
        self.persist(&account)?;

        tracing::info!(address = %account.address()?, "Raw key account created");
        Ok(Account::RawKey(account))
    }

    async fn restore(&self) -> AccountResult<Account> {
        let (key, stored_address) = self
            .store
            .raw_key()
            .ok_or(AccountError::NoStoredCredential(AccountKind::RawKey))?;

        let account = RawKeyAccount::from_private_key(&key, self.store.clone())?;
        let address = account.address()?;
        if stored_address != Some(address) {
            tracing::warn!(address = %address, "Stored raw key address out of date, rewriting");
            self.persist(&account)?;
        }

        tracing::info!(address = %address, "Raw key account restored");
        Ok(Account::RawKey(account))
    }
}
