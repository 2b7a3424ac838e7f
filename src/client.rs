//! Client facade.
//!
//! # Responsibilities
//! - Own the GraphQL transport, local session store, asset client and shared context
//! - Create, restore, log in and log out accounts
//! - Validate, execute and confirm game actions
//! - Keep the tip in step with the node while logged in
//!
//! # Design Decisions
//! - Generic over [`GraphqlTransport`] so the whole flow runs against a double
//! - Login opens the subscription socket; plain `use_account` does not

use alloy::primitives::Address;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::account::{
    restore_active, Account, AccountCreator, AccountError, AccountKind, AuthSessionProvider,
    BrowserWalletCreator, Creators, DelegatedCreator, WalletProvider,
};
use crate::actions::validation::check_create_session;
use crate::actions::{self, Action, ActionOutcome, CreateSessionParams};
use crate::assets::AssetClient;
use crate::config::ClientConfig;
use crate::context::AppContext;
use crate::error::{ClientError, ClientResult};
use crate::graphql::types::{Glove, Session, SessionState, User};
use crate::graphql::{queries, GraphqlClient, GraphqlTransport, Tip};
use crate::storage::{LocalStorage, SessionStore};
use crate::subscription::{SubscriptionClient, TipSync};
use crate::transaction::{pipeline, PipelineConfig, TransactionResult, TxId};

/// How many random session ids to try before giving up.
pub const SESSION_ID_ATTEMPTS: u32 = 16;

/// The result of [`HandRoyalClient::perform`].
#[derive(Debug, Clone, PartialEq)]
pub struct Performed {
    pub outcome: ActionOutcome,
    /// Terminal result, present when a transaction was staged.
    pub result: Option<TransactionResult>,
}

struct LiveSession {
    // Must outlive `tip_sync`; dropping it closes the socket.
    subscriptions: SubscriptionClient,
    tip_sync: TipSync,
}

/// Entry point for applications talking to a HandRoyal node.
pub struct HandRoyalClient<T: GraphqlTransport = GraphqlClient> {
    config: ClientConfig,
    transport: T,
    assets: AssetClient,
    store: SessionStore,
    ctx: Arc<AppContext>,
    creators: Creators,
    live: Mutex<Option<LiveSession>>,
}

impl HandRoyalClient<GraphqlClient> {
    /// Build a client over HTTP, opening the configured storage file if any.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let store = match &config.storage.path {
            Some(path) => SessionStore::new(LocalStorage::open(path)?),
            None => SessionStore::in_memory(),
        };
        let transport = GraphqlClient::new(&config.graphql)?;
        Self::with_transport(config, transport, store)
    }
}

impl<T: GraphqlTransport> HandRoyalClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T, store: SessionStore) -> ClientResult<Self> {
        let assets = AssetClient::new(&config.assets)?;
        // Show the last known tip until a live subscription replaces it.
        let ctx = AppContext::new();
        ctx.set_tip(store.tip());
        Ok(Self {
            creators: Creators::raw_key_only(store.clone()),
            config,
            transport,
            assets,
            store,
            ctx: Arc::new(ctx),
            live: Mutex::new(None),
        })
    }

    /// Enable browser-style wallet accounts.
    pub fn with_wallet(mut self, provider: Arc<dyn WalletProvider>) -> Self {
        self.creators.wallet = Some(BrowserWalletCreator::new(
            Some(provider),
            self.config.chain.clone(),
            self.store.clone(),
        ));
        self
    }

    /// Enable delegated-backend accounts.
    pub fn with_auth(mut self, provider: Arc<dyn AuthSessionProvider>) -> Self {
        self.creators.delegated = Some(DelegatedCreator::new(provider, self.store.clone()));
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn assets(&self) -> &AssetClient {
        &self.assets
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn context(&self) -> &Arc<AppContext> {
        &self.ctx
    }

    pub fn creators(&self) -> &Creators {
        &self.creators
    }

    fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::from(&self.config.transaction)
    }

    /// The logged-in account.
    pub fn account(&self) -> ClientResult<Arc<Account>> {
        self.ctx.account().ok_or(ClientError::NotLoggedIn)
    }

    /// Create (or import) a raw-key account and make it active.
    pub async fn create_raw_key(&self, private_key: Option<String>) -> ClientResult<Arc<Account>> {
        let account = self.creators.raw_key.create(private_key).await?;
        Ok(self.use_account(account))
    }

    /// Connect the configured wallet provider and make it active.
    pub async fn connect_wallet(&self) -> ClientResult<Arc<Account>> {
        let creator = self.creators.wallet.as_ref().ok_or_else(|| {
            AccountError::SigningFailed("wallet provider not available".to_string())
        })?;
        let account = creator.create(()).await?;
        Ok(self.use_account(account))
    }

    /// Adopt the auth provider's current session and make it active.
    pub async fn connect_delegated(&self) -> ClientResult<Arc<Account>> {
        let creator = self
            .creators
            .delegated
            .as_ref()
            .ok_or(AccountError::CreatorUnavailable(AccountKind::DelegatedBackend))?;
        let account = creator.create(()).await?;
        Ok(self.use_account(account))
    }

    /// Restore whichever account was active last time.
    pub async fn restore(&self) -> ClientResult<Arc<Account>> {
        let account = restore_active(&self.store, &self.creators).await?;
        Ok(self.use_account(account))
    }

    /// Make `account` active without opening a subscription channel.
    pub fn use_account(&self, account: Account) -> Arc<Account> {
        let account = Arc::new(account);
        self.ctx.set_account(Some(account.clone()));
        account
    }

    /// Make `account` active and start following the chain tip.
    pub async fn login(&self, account: Account) -> ClientResult<Arc<Account>> {
        let mut live = self.live.lock().await;
        if let Some(previous) = live.take() {
            if let Err(e) = previous.tip_sync.stop().await {
                tracing::warn!(error = %e, "Previous tip subscription ended with an error");
            }
        }
        let account = self.use_account(account);

        let started = async {
            let subscriptions = SubscriptionClient::connect(&self.config.graphql).await?;
            let tip_sync = TipSync::start(&subscriptions, self.ctx.clone(), self.store.clone())?;
            Ok::<_, ClientError>(LiveSession {
                subscriptions,
                tip_sync,
            })
        }
        .await;

        match started {
            Ok(session) => {
                *live = Some(session);
                tracing::info!(kind = %account.kind(), "Logged in");
                Ok(account)
            }
            Err(e) => {
                self.ctx.set_account(None);
                Err(e)
            }
        }
    }

    /// Whether the tip subscription started by [`login`](Self::login) is still running.
    pub async fn is_following_tip(&self) -> bool {
        self.live
            .lock()
            .await
            .as_ref()
            .is_some_and(|session| session.tip_sync.is_running())
    }

    /// Stop tip tracking, then disconnect and forget the active account.
    pub async fn logout(&self) -> ClientResult<()> {
        let stopped = match self.live.lock().await.take() {
            Some(session) => {
                let result = session.tip_sync.stop().await;
                drop(session.subscriptions);
                result
            }
            None => {
                self.ctx.set_tip(None);
                self.store.clear_tip().map_err(Into::into)
            }
        };

        if let Some(account) = self.ctx.take_account() {
            account.disconnect().await?;
            tracing::info!(kind = %account.kind(), "Logged out");
        }
        stopped.map_err(Into::into)
    }

    /// Validate `action`, run it for the active account and wait for its
    /// transaction to reach a terminal status.
    pub async fn perform(&self, action: Action) -> ClientResult<Performed> {
        action.validate()?;
        let account = self.account()?;
        tracing::debug!(action = action.name(), kind = %account.kind(), "Performing action");

        let outcome = account.execute_action(&self.transport, &action).await?;
        let result = match &outcome.tx_id {
            Some(tx_id) => Some(self.wait_for_transaction(tx_id).await?),
            None => None,
        };
        Ok(Performed { outcome, result })
    }

    /// Validate `params`, allocate a fresh session id and create the session.
    ///
    /// The `session_id` in `params` is replaced. Invalid input fails before
    /// any request is sent.
    pub async fn create_session(&self, mut params: CreateSessionParams) -> ClientResult<(Address, Performed)> {
        check_create_session(&params)?;
        self.account()?;
        let session_id = self.new_session_id().await?;
        params.session_id = session_id;
        let performed = self.perform(Action::CreateSession(params)).await?;
        Ok((session_id, performed))
    }

    pub async fn wait_for_transaction(&self, tx_id: &TxId) -> ClientResult<TransactionResult> {
        Ok(pipeline::wait_for_transaction(&self.transport, tx_id, self.pipeline_config()).await?)
    }

    /// A random session id that the node reports as unused.
    pub async fn new_session_id(&self) -> ClientResult<Address> {
        actions::generate_session_id(&self.transport, SESSION_ID_ATTEMPTS).await
    }

    /// Open a separate subscription channel for application-level streams.
    pub async fn subscriptions(&self) -> ClientResult<SubscriptionClient> {
        Ok(SubscriptionClient::connect(&self.config.graphql).await?)
    }

    pub async fn tip(&self) -> ClientResult<Option<Tip>> {
        Ok(queries::tip(&self.transport).await?)
    }

    pub async fn user(&self, address: Address) -> ClientResult<Option<User>> {
        Ok(queries::user(&self.transport, address).await?)
    }

    /// The user record of the active account.
    pub async fn me(&self) -> ClientResult<Option<User>> {
        let address = self.account()?.address()?;
        self.user(address).await
    }

    pub async fn session(&self, session_id: Address) -> ClientResult<Option<Session>> {
        Ok(queries::session(&self.transport, session_id).await?)
    }

    pub async fn sessions(&self, state: Option<SessionState>) -> ClientResult<Vec<Session>> {
        Ok(queries::sessions(&self.transport, state).await?)
    }

    pub async fn glove(&self, glove_id: Address) -> ClientResult<Option<Glove>> {
        Ok(queries::glove(&self.transport, glove_id).await?)
    }

    pub async fn is_glove_registered(&self, glove_id: Address) -> ClientResult<bool> {
        Ok(queries::is_glove_registered(&self.transport, glove_id).await?)
    }
}

impl<T: GraphqlTransport> std::fmt::Debug for HandRoyalClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandRoyalClient")
            .field("graphql", &self.config.graphql.http_url)
            .field("context", &self.ctx)
            .finish()
    }
}
