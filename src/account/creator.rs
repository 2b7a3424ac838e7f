//! Account factories and restore-on-load.

use std::future::Future;

use crate::account::delegated::DelegatedCreator;
use crate::account::raw_key::RawKeyCreator;
use crate::account::types::{AccountError, AccountKind, AccountResult};
use crate::account::wallet::BrowserWalletCreator;
use crate::account::Account;
use crate::storage::SessionStore;

/// Factory for one account kind.
pub trait AccountCreator {
    /// Input to interactive creation.
    type Param: Send;

    fn kind(&self) -> AccountKind;

    /// Establish a new credential and persist its reference.
    fn create(&self, param: Self::Param) -> impl Future<Output = AccountResult<Account>> + Send;

    /// Rebuild the account from its persisted credential reference.
    fn restore(&self) -> impl Future<Output = AccountResult<Account>> + Send;
}

/// The creators available in this process. Kinds without a creator cannot be restored.
#[derive(Clone)]
pub struct Creators {
    pub raw_key: RawKeyCreator,
    pub wallet: Option<BrowserWalletCreator>,
    pub delegated: Option<DelegatedCreator>,
}

impl Creators {
    /// Only raw-key accounts.
    pub fn raw_key_only(store: SessionStore) -> Self {
        Self {
            raw_key: RawKeyCreator::new(store),
            wallet: None,
            delegated: None,
        }
    }
}

/// Restore whichever account kind was last active.
pub async fn restore_active(store: &SessionStore, creators: &Creators) -> AccountResult<Account> {
    let kind = store
        .active_kind()
        .ok_or(AccountError::NoStoredCredential(AccountKind::RawKey))?;

    tracing::debug!(kind = %kind, "Restoring active account");
    match kind {
        AccountKind::RawKey => creators.raw_key.restore().await,
        AccountKind::BrowserWallet => match &creators.wallet {
            Some(creator) => creator.restore().await,
            None => Err(AccountError::CreatorUnavailable(kind)),
        },
        AccountKind::DelegatedBackend => match &creators.delegated {
            Some(creator) => creator.restore().await,
            None => Err(AccountError::CreatorUnavailable(kind)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TEST_PRIVATE_KEY;
    use alloy::primitives::Address;

    #[tokio::test]
    async fn test_restore_active_raw_key() {
        let store = SessionStore::in_memory();
        let creators = Creators::raw_key_only(store.clone());
        let created = creators
            .raw_key
            .create(Some(TEST_PRIVATE_KEY.to_string()))
            .await
            .unwrap();

        let restored = restore_active(&store, &creators).await.unwrap();
        assert_eq!(restored.kind(), AccountKind::RawKey);
        assert_eq!(restored.address().unwrap(), created.address().unwrap());
    }

    #[tokio::test]
    async fn test_restore_active_nothing_stored() {
        let store = SessionStore::in_memory();
        let err = restore_active(&store, &Creators::raw_key_only(store.clone()))
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::NoStoredCredential(_)));
    }

    #[tokio::test]
    async fn test_restore_active_missing_creator() {
        let store = SessionStore::in_memory();
        store.save_wallet_address(Address::ZERO).unwrap();
        let err = restore_active(&store, &Creators::raw_key_only(store.clone()))
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::CreatorUnavailable(AccountKind::BrowserWallet)));
    }
}
