//! Typed view over [`LocalStorage`] with the client's fixed keys.

use alloy::primitives::Address;

use crate::account::AccountKind;
use crate::graphql::Tip;
use crate::storage::{LocalStorage, StorageResult};

pub const ACCOUNT_TYPE_KEY: &str = "accountType";
pub const RAW_KEY_PRIVATE_KEY: &str = "rawKey.privateKey";
pub const RAW_KEY_ADDRESS_KEY: &str = "rawKey.address";
pub const WALLET_ADDRESS_KEY: &str = "wallet.address";
pub const DELEGATED_USER_ID_KEY: &str = "delegated.userId";
pub const DELEGATED_ADDRESS_KEY: &str = "delegated.address";
pub const TIP_KEY: &str = "tip";
pub const LANGUAGE_KEY: &str = "language";
pub const EQUIPPED_GLOVE_KEY: &str = "equippedGlove";

/// Credential reference stored for a delegated account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegatedCredential {
    pub user_id: String,
    pub address: Option<Address>,
}

/// Session identity persisted between runs.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    storage: LocalStorage,
}

impl SessionStore {
    pub fn new(storage: LocalStorage) -> Self {
        Self { storage }
    }

    pub fn in_memory() -> Self {
        Self::new(LocalStorage::in_memory())
    }

    pub fn storage(&self) -> &LocalStorage {
        &self.storage
    }

    /// The account kind that was active when the session was last saved.
    pub fn active_kind(&self) -> Option<AccountKind> {
        self.storage.get(ACCOUNT_TYPE_KEY).and_then(|s| s.parse().ok())
    }

    pub fn set_active_kind(&self, kind: AccountKind) -> StorageResult<()> {
        self.storage.set(ACCOUNT_TYPE_KEY, kind.as_str())
    }

    fn clear_active_kind_if(&self, kind: AccountKind) -> StorageResult<()> {
        if self.active_kind() == Some(kind) {
            self.storage.remove(ACCOUNT_TYPE_KEY)?;
        }
        Ok(())
    }

    pub fn save_raw_key(&self, private_key_hex: &str, address: Address) -> StorageResult<()> {
        self.storage.set(RAW_KEY_PRIVATE_KEY, private_key_hex)?;
        self.storage.set(RAW_KEY_ADDRESS_KEY, address.to_string())?;
        self.set_active_kind(AccountKind::RawKey)
    }

    /// Stored private key hex and the address recorded alongside it.
    pub fn raw_key(&self) -> Option<(String, Option<Address>)> {
        let key = self.storage.get(RAW_KEY_PRIVATE_KEY)?;
        let address = self.storage.get(RAW_KEY_ADDRESS_KEY).and_then(|a| a.parse().ok());
        Some((key, address))
    }

    pub fn clear_raw_key(&self) -> StorageResult<()> {
        self.storage.remove(RAW_KEY_PRIVATE_KEY)?;
        self.storage.remove(RAW_KEY_ADDRESS_KEY)?;
        self.clear_active_kind_if(AccountKind::RawKey)
    }

    pub fn save_wallet_address(&self, address: Address) -> StorageResult<()> {
        self.storage.set(WALLET_ADDRESS_KEY, address.to_string())?;
        self.set_active_kind(AccountKind::BrowserWallet)
    }

    pub fn wallet_address(&self) -> Option<Address> {
        self.storage.get(WALLET_ADDRESS_KEY).and_then(|a| a.parse().ok())
    }

    pub fn clear_wallet(&self) -> StorageResult<()> {
        self.storage.remove(WALLET_ADDRESS_KEY)?;
        self.clear_active_kind_if(AccountKind::BrowserWallet)
    }

    pub fn save_delegated(&self, user_id: &str, address: Address) -> StorageResult<()> {
        self.storage.set(DELEGATED_USER_ID_KEY, user_id)?;
        self.storage.set(DELEGATED_ADDRESS_KEY, address.to_string())?;
        self.set_active_kind(AccountKind::DelegatedBackend)
    }

    pub fn delegated(&self) -> Option<DelegatedCredential> {
        let user_id = self.storage.get(DELEGATED_USER_ID_KEY)?;
        let address = self.storage.get(DELEGATED_ADDRESS_KEY).and_then(|a| a.parse().ok());
        Some(DelegatedCredential { user_id, address })
    }

    pub fn clear_delegated(&self) -> StorageResult<()> {
        self.storage.remove(DELEGATED_USER_ID_KEY)?;
        self.storage.remove(DELEGATED_ADDRESS_KEY)?;
        self.clear_active_kind_if(AccountKind::DelegatedBackend)
    }

    /// Drop every stored credential, whichever kind was active.
    pub fn forget_accounts(&self) -> StorageResult<()> {
        self.clear_raw_key()?;
        self.clear_wallet()?;
        self.clear_delegated()?;
        self.storage.remove(ACCOUNT_TYPE_KEY)
    }

    pub fn save_tip(&self, tip: &Tip) -> StorageResult<()> {
        self.storage.set(TIP_KEY, serde_json::to_string(tip)?)
    }

    /// Last known tip. An unreadable entry is treated as absent.
    pub fn tip(&self) -> Option<Tip> {
        self.storage
            .get(TIP_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
    }

    pub fn clear_tip(&self) -> StorageResult<()> {
        self.storage.remove(TIP_KEY)
    }

    pub fn language(&self) -> Option<String> {
        self.storage.get(LANGUAGE_KEY)
    }

    pub fn set_language(&self, language: &str) -> StorageResult<()> {
        self.storage.set(LANGUAGE_KEY, language)
    }

    pub fn equipped_glove(&self) -> Option<Address> {
        self.storage.get(EQUIPPED_GLOVE_KEY).and_then(|a| a.parse().ok())
    }

    pub fn set_equipped_glove(&self, glove: Option<Address>) -> StorageResult<()> {
        match glove {
            Some(glove) => self.storage.set(EQUIPPED_GLOVE_KEY, glove.to_string()),
            None => self.storage.remove(EQUIPPED_GLOVE_KEY),
        }
    }
}
