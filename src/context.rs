//! Shared client state.
//!
//! Holds the active account and the latest chain tip. Setters are the only
//! way to mutate either; readers take snapshots.

use arc_swap::ArcSwapOption;
use std::sync::Arc;
use tokio::sync::watch;

use crate::account::Account;
use crate::graphql::Tip;

pub struct AppContext {
    account: ArcSwapOption<Account>,
    tip: watch::Sender<Option<Tip>>,
}

impl AppContext {
    pub fn new() -> Self {
        let (tip, _) = watch::channel(None);
        Self {
            account: ArcSwapOption::empty(),
            tip,
        }
    }

    /// The current account, if logged in.
    pub fn account(&self) -> Option<Arc<Account>> {
        self.account.load_full()
    }

    pub fn set_account(&self, account: Option<Arc<Account>>) {
        if let Some(account) = &account {
            tracing::debug!(kind = %account.kind(), "Active account set");
        }
        self.account.store(account);
    }

    /// Remove and return the current account.
    pub fn take_account(&self) -> Option<Arc<Account>> {
        self.account.swap(None)
    }

    pub fn tip(&self) -> Option<Tip> {
        self.tip.borrow().clone()
    }

    /// Publish a tip to every watcher, even with no receivers alive.
    pub fn set_tip(&self, tip: Option<Tip>) {
        self.tip.send_replace(tip);
    }

    /// A receiver notified on every tip change.
    pub fn watch_tip(&self) -> watch::Receiver<Option<Tip>> {
        self.tip.subscribe()
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("account", &self.account.load_full().map(|a| a.kind()))
            .field("tip", &*self.tip.borrow())
            .finish()
    }
}
