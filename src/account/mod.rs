//! Account abstraction.
//!
//! # Data Flow
//! ```text
//! creator.rs (create / restore, one creator per kind)
//!     → Account { RawKey | BrowserWallet | Delegated }
//!     → sign / execute_action
//!     → transaction pipeline (RawKey, BrowserWallet)
//!        or authenticated mutation (Delegated)
//! ```
//!
//! # Security Constraints
//! - Never log private keys, bearer tokens or signatures
//! - `disconnect` clears credential references from storage only; server-side
//!   state is untouched

pub mod creator;
pub mod delegated;
pub mod raw_key;
pub mod types;
pub mod wallet;

use alloy::primitives::Address;

use crate::actions::{Action, ActionOutcome};
use crate::graphql::GraphqlTransport;
use crate::transaction::{pipeline, PipelineResult};

pub use creator::{restore_active, AccountCreator, Creators};
pub use delegated::{AuthSession, AuthSessionProvider, DelegatedAccount, DelegatedCreator};
pub use raw_key::{RawKeyAccount, RawKeyCreator};
pub use types::{AccountError, AccountKind, AccountResult, ProviderError};
pub use wallet::{BrowserWalletAccount, BrowserWalletCreator, RequestArguments, WalletProvider};

/// A connected identity, dispatched by kind.
#[derive(Debug)]
pub enum Account {
    RawKey(RawKeyAccount),
    BrowserWallet(BrowserWalletAccount),
    Delegated(DelegatedAccount),
}

impl Account {
    pub fn kind(&self) -> AccountKind {
        match self {
            Account::RawKey(_) => AccountKind::RawKey,
            Account::BrowserWallet(_) => AccountKind::BrowserWallet,
            Account::Delegated(_) => AccountKind::DelegatedBackend,
        }
    }

    /// Fails with [`AccountError::NotConnected`] once disconnected.
    pub fn address(&self) -> AccountResult<Address> {
        match self {
            Account::RawKey(a) => a.address(),
            Account::BrowserWallet(a) => a.address(),
            Account::Delegated(a) => a.address(),
        }
    }

    pub fn is_connected(&self) -> bool {
        match self {
            Account::RawKey(a) => a.is_connected(),
            Account::BrowserWallet(a) => a.is_connected(),
            Account::Delegated(a) => a.is_connected(),
        }
    }

    /// Sign `message`, returning hex without a `0x` prefix.
    pub async fn sign(&self, message: &[u8]) -> AccountResult<String> {
        match self {
            Account::RawKey(a) => a.sign(message).await,
            Account::BrowserWallet(a) => a.sign(message).await,
            Account::Delegated(a) => a.sign(message).await,
        }
    }

    /// Clear the credential in memory and in storage. Idempotent.
    pub async fn disconnect(&self) -> AccountResult<()> {
        match self {
            Account::RawKey(a) => a.disconnect(),
            Account::BrowserWallet(a) => a.disconnect(),
            Account::Delegated(a) => a.disconnect().await,
        }
    }

    /// Run `action` for this account.
    ///
    /// Raw-key and wallet accounts fetch the action's plain value and, when
    /// one is returned, sign and stage it. Delegated accounts send an
    /// authenticated mutation that yields the transaction id directly.
    pub async fn execute_action<T: GraphqlTransport>(
        &self,
        transport: &T,
        action: &Action,
    ) -> PipelineResult<ActionOutcome> {
        match self {
            Account::Delegated(account) => account.execute_action(transport, action).await,
            Account::BrowserWallet(account) => {
                account.ensure_chain().await?;
                self.execute_signed(transport, action).await
            }
            Account::RawKey(_) => self.execute_signed(transport, action).await,
        }
    }

    async fn execute_signed<T: GraphqlTransport>(
        &self,
        transport: &T,
        action: &Action,
    ) -> PipelineResult<ActionOutcome> {
        let data = transport.execute(action.plain_value_request(), None).await?;
        let tx_id = match action.plain_value(&data)? {
            Some(plain_value) => {
                Some(pipeline::execute_transaction(transport, self, &plain_value).await?)
            }
            None => None,
        };
        Ok(ActionOutcome { tx_id, data })
    }
}
