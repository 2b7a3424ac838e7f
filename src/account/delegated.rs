//! Accounts whose signer lives server-side behind a bearer-token session.
//!
//! Signing is a stand-in: the node signs on the user's behalf, so actions go
//! straight to an authenticated mutation that returns the transaction id.

use alloy::primitives::Address;
use arc_swap::ArcSwapOption;
use futures_util::future::BoxFuture;
use std::sync::Arc;

use crate::account::creator::AccountCreator;
use crate::account::types::{AccountError, AccountKind, AccountResult, ProviderError};
use crate::account::Account;
use crate::actions::{Action, ActionOutcome};
use crate::graphql::GraphqlTransport;
use crate::storage::SessionStore;
use crate::transaction::PipelineResult;

/// An authenticated session issued by the external auth service.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub user_id: String,
    pub address: Address,
    pub access_token: String,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("user_id", &self.user_id)
            .field("address", &self.address)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Source of bearer-token sessions.
pub trait AuthSessionProvider: Send + Sync {
    /// The current session, if the user is signed in.
    fn session(&self) -> BoxFuture<'_, Result<Option<AuthSession>, ProviderError>>;

    /// End the session with the auth service.
    fn sign_out(&self) -> BoxFuture<'_, Result<(), ProviderError>>;
}

#[derive(Debug)]
struct DelegatedIdentity {
    user_id: String,
    address: Address,
}

/// Account backed by a server-held key.
pub struct DelegatedAccount {
    auth: Arc<dyn AuthSessionProvider>,
    identity: ArcSwapOption<DelegatedIdentity>,
    store: SessionStore,
}

impl DelegatedAccount {
    pub fn new(
        auth: Arc<dyn AuthSessionProvider>,
        user_id: String,
        address: Address,
        store: SessionStore,
    ) -> Self {
        Self {
            auth,
            identity: ArcSwapOption::from_pointee(DelegatedIdentity { user_id, address }),
            store,
        }
    }

    pub fn address(&self) -> AccountResult<Address> {
        self.identity
            .load_full()
            .map(|i| i.address)
            .ok_or(AccountError::NotConnected)
    }

    pub fn user_id(&self) -> AccountResult<String> {
        self.identity
            .load_full()
            .map(|i| i.user_id.clone())
            .ok_or(AccountError::NotConnected)
    }

    pub fn is_connected(&self) -> bool {
        self.identity.load().is_some()
    }

    /// Returns the opaque user id; the server holds the real signer.
    pub async fn sign(&self, _message: &[u8]) -> AccountResult<String> {
        self.user_id()
            .map_err(|_| AccountError::SigningFailed("account is disconnected".to_string()))
    }

    /// Fresh bearer token for the connected user.
    pub async fn bearer_token(&self) -> AccountResult<String> {
        let user_id = self.user_id()?;
        let session = self
            .auth
            .session()
            .await
            .map_err(|e| AccountError::AuthUnavailable(e.to_string()))?
            .ok_or(AccountError::NotConnected)?;
        if session.user_id != user_id {
            return Err(AccountError::AuthUnavailable(
                "auth session belongs to a different user".to_string(),
            ));
        }
        Ok(session.access_token)
    }

    /// Send the action's authenticated mutation and read the embedded tx id.
    pub async fn execute_action<T: GraphqlTransport>(
        &self,
        transport: &T,
        action: &Action,
    ) -> PipelineResult<ActionOutcome> {
        let token = self.bearer_token().await?;
        let data = transport
            .execute(action.delegated_request(), Some(&token))
            .await?;
        let tx_id = action.delegated_tx_id(&data)?;

        if let Some(tx_id) = &tx_id {
            tracing::info!(tx_id = %tx_id, action = action.name(), "Delegated action submitted");
        }
        Ok(ActionOutcome { tx_id, data })
    }

    /// Sign out and forget the identity. Sign-out runs only while connected.
    pub async fn disconnect(&self) -> AccountResult<()> {
        if let Some(identity) = self.identity.swap(None) {
            if let Err(e) = self.auth.sign_out().await {
                tracing::warn!(user_id = %identity.user_id, error = %e, "Sign-out call failed");
            }
            tracing::info!(user_id = %identity.user_id, "Delegated account disconnected");
        }
        self.store.clear_delegated()?;
        Ok(())
    }
}

impl std::fmt::Debug for DelegatedAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DelegatedAccount")
            .field("identity", &self.identity.load_full())
            .finish()
    }
}

/// Creates and restores [`DelegatedAccount`]s.
#[derive(Clone)]
pub struct DelegatedCreator {
    auth: Arc<dyn AuthSessionProvider>,
    store: SessionStore,
}

impl DelegatedCreator {
    pub fn new(auth: Arc<dyn AuthSessionProvider>, store: SessionStore) -> Self {
        Self { auth, store }
    }

    async fn current_session(&self) -> AccountResult<Option<AuthSession>> {
        self.auth
            .session()
            .await
            .map_err(|e| AccountError::AuthUnavailable(e.to_string()))
    }
}

impl AccountCreator for DelegatedCreator {
    type Param = ();

    fn kind(&self) -> AccountKind {
        AccountKind::DelegatedBackend
    }

    async fn create(&self, _param: ()) -> AccountResult<Account> {
        let session = self
            .current_session()
            .await?
            .ok_or_else(|| AccountError::AuthUnavailable("no active auth session".to_string()))?;

        self.store.save_delegated(&session.user_id, session.address)?;
        tracing::info!(user_id = %session.user_id, address = %session.address, "Delegated account connected");
        Ok(Account::Delegated(DelegatedAccount::new(
            self.auth.clone(),
            session.user_id,
            session.address,
            self.store.clone(),
        )))
    }

    async fn restore(&self) -> AccountResult<Account> {
        let credential = self
            .store
            .delegated()
            .ok_or(AccountError::NoStoredCredential(AccountKind::DelegatedBackend))?;
        let session = self
            .current_session()
            .await?
            .filter(|s| s.user_id == credential.user_id)
            .ok_or(AccountError::NoStoredCredential(AccountKind::DelegatedBackend))?;

        Ok(Account::Delegated(DelegatedAccount::new(
            self.auth.clone(),
            session.user_id,
            session.address,
            self.store.clone(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockAuth, ScriptedTransport};
    use crate::transaction::TxId;
    use serde_json::json;

    fn session() -> AuthSession {
        AuthSession {
            user_id: "user-1".into(),
            address: Address::repeat_byte(7),
            access_token: "token-abc".into(),
        }
    }

    #[tokio::test]
    async fn test_execute_action_uses_bearer_and_embedded_tx_id() {
        let auth = Arc::new(MockAuth::new(Some(session())));
        let account = DelegatedCreator::new(auth, SessionStore::in_memory())
            .create(())
            .await
            .unwrap();

        let transport = ScriptedTransport::new();
        transport.push("CreateUser", json!({ "createUser": "tx-9" }));

        let action = Action::CreateUser { name: "alice".into() };
        let outcome = account.execute_action(&transport, &action).await.unwrap();
        assert_eq!(outcome.tx_id, Some(TxId::new("tx-9")));
        assert_eq!(transport.bearers(), vec![Some("token-abc".to_string())]);
        assert_eq!(transport.calls("UnsignedTransaction"), 0);
        assert_eq!(transport.calls("StageTransaction"), 0);
    }

    #[tokio::test]
    async fn test_sign_returns_user_id() {
        let auth = Arc::new(MockAuth::new(Some(session())));
        let account = DelegatedAccount::new(auth, "user-1".into(), Address::ZERO, SessionStore::in_memory());
        assert_eq!(account.sign(b"anything").await.unwrap(), "user-1");
    }

    #[tokio::test]
    async fn test_disconnect_signs_out_once() {
        let auth = Arc::new(MockAuth::new(Some(session())));
        let store = SessionStore::in_memory();
        let account = DelegatedCreator::new(auth.clone(), store.clone())
            .create(())
            .await
            .unwrap();
        assert!(store.delegated().is_some());

        account.disconnect().await.unwrap();
        account.disconnect().await.unwrap();
        assert_eq!(*auth.sign_outs.lock().unwrap(), 1);
        assert!(store.storage().is_empty());
        assert!(matches!(account.address(), Err(AccountError::NotConnected)));
    }

    #[tokio::test]
    async fn test_restore_requires_matching_session() {
        let auth = Arc::new(MockAuth::new(Some(session())));
        let store = SessionStore::in_memory();
        store.save_delegated("someone-else", Address::ZERO).unwrap();

        let err = DelegatedCreator::new(auth, store).restore().await.unwrap_err();
        assert!(matches!(err, AccountError::NoStoredCredential(AccountKind::DelegatedBackend)));
    }

    #[tokio::test]
    async fn test_create_without_session() {
        let auth = Arc::new(MockAuth::new(None));
        let err = DelegatedCreator::new(auth, SessionStore::in_memory())
            .create(())
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::AuthUnavailable(_)));
    }
}
