//! Accounts that delegate signing to an injected wallet provider.
//!
//! # Chain handling
//! Before signing or executing an action the provider's active chain is
//! compared with [`ChainConfig::chain_id`]. On mismatch the wallet is asked to
//! switch; if it does not know the chain (code `4902`) the chain definition is
//! registered once and the switch retried once.

use alloy::primitives::{hex, Address};
use arc_swap::ArcSwapOption;
use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::account::creator::AccountCreator;
use crate::account::types::{AccountError, AccountKind, AccountResult, ProviderError};
use crate::account::Account;
use crate::config::ChainConfig;
use crate::storage::SessionStore;

pub const ETH_REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
pub const ETH_CHAIN_ID: &str = "eth_chainId";
pub const WALLET_SWITCH_ETHEREUM_CHAIN: &str = "wallet_switchEthereumChain";
pub const WALLET_ADD_ETHEREUM_CHAIN: &str = "wallet_addEthereumChain";
pub const PERSONAL_SIGN: &str = "personal_sign";

/// Provider error code for a chain the wallet has never seen.
pub const UNRECOGNIZED_CHAIN_ERROR_CODE: i64 = 4902;

/// Arguments of a provider `request({ method, params })` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestArguments {
    pub method: String,
    pub params: Value,
}

impl RequestArguments {
    pub fn new(method: &str, params: Value) -> Self {
        Self {
            method: method.to_string(),
            params,
        }
    }
}

/// An injected wallet, treated as an opaque signer.
pub trait WalletProvider: Send + Sync {
    fn request(&self, args: RequestArguments) -> BoxFuture<'_, Result<Value, ProviderError>>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NativeCurrency<'a> {
    name: &'a str,
    symbol: &'a str,
    decimals: u8,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddChainParameter<'a> {
    chain_id: String,
    chain_name: &'a str,
    rpc_urls: &'a [String],
    native_currency: NativeCurrency<'a>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    block_explorer_urls: &'a [String],
}

/// Parse a chain id reply, accepting `0x` hex strings, decimal strings and numbers.
pub fn parse_chain_id(value: &Value) -> Option<u64> {
    match value {
        Value::String(s) => match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex_digits) => u64::from_str_radix(hex_digits, 16).ok(),
            None => s.parse().ok(),
        },
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

/// Account whose key lives in an external wallet.
pub struct BrowserWalletAccount {
    provider: Arc<dyn WalletProvider>,
    chain: ChainConfig,
    address: ArcSwapOption<Address>,
    store: SessionStore,
}

impl BrowserWalletAccount {
    pub fn new(
        provider: Arc<dyn WalletProvider>,
        chain: ChainConfig,
        address: Address,
        store: SessionStore,
    ) -> Self {
        Self {
            provider,
            chain,
            address: ArcSwapOption::from_pointee(address),
            store,
        }
    }

    pub fn address(&self) -> AccountResult<Address> {
        self.address
            .load_full()
            .map(|a| *a)
            .ok_or(AccountError::NotConnected)
    }

    pub fn is_connected(&self) -> bool {
        self.address.load().is_some()
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        self.provider.request(RequestArguments::new(method, params)).await
    }

    async fn switch_chain(&self) -> Result<(), ProviderError> {
        self.call(
            WALLET_SWITCH_ETHEREUM_CHAIN,
            json!([{ "chainId": self.chain.chain_id_hex() }]),
        )
        .await
        .map(|_| ())
    }

    async fn add_chain(&self) -> Result<(), ProviderError> {
        let parameter = AddChainParameter {
            chain_id: self.chain.chain_id_hex(),
            chain_name: &self.chain.chain_name,
            rpc_urls: &self.chain.rpc_urls,
            native_currency: NativeCurrency {
                name: &self.chain.currency_name,
                symbol: &self.chain.currency_symbol,
                decimals: self.chain.currency_decimals,
            },
            block_explorer_urls: &self.chain.block_explorer_urls,
        };
        self.call(WALLET_ADD_ETHEREUM_CHAIN, json!([parameter]))
            .await
            .map(|_| ())
    }

    /// Make sure the wallet is on the configured chain.
    pub async fn ensure_chain(&self) -> AccountResult<()> {
        let reply = self
            .call(ETH_CHAIN_ID, json!([]))
            .await
            .map_err(|e| AccountError::ChainSwitchRejected(e.to_string()))?;
        let current = parse_chain_id(&reply).ok_or_else(|| {
            AccountError::ChainSwitchRejected(format!("unreadable chain id {reply}"))
        })?;
        if current == self.chain.chain_id {
            return Ok(());
        }

        tracing::info!(current, expected = self.chain.chain_id, "Switching wallet chain");
        match self.switch_chain().await {
            Ok(()) => Ok(()),
            Err(e) if e.code == UNRECOGNIZED_CHAIN_ERROR_CODE => {
                tracing::info!(chain_id = self.chain.chain_id, "Wallet does not know chain, registering it");
                self.add_chain()
                    .await
                    .map_err(|e| AccountError::ChainSwitchRejected(e.to_string()))?;
                self.switch_chain()
                    .await
                    .map_err(|e| AccountError::ChainSwitchRejected(e.to_string()))
            }
            Err(e) => Err(AccountError::ChainSwitchRejected(e.to_string())),
        }
    }

    /// Ask the wallet to personal-sign `message`. Returns hex without `0x`.
    pub async fn sign(&self, message: &[u8]) -> AccountResult<String> {
        let address = self
            .address()
            .map_err(|_| AccountError::SigningFailed("account is disconnected".to_string()))?;
        self.ensure_chain()
            .await
            .map_err(|e| AccountError::SigningFailed(e.to_string()))?;

        let reply = self
            .call(
                PERSONAL_SIGN,
                json!([format!("0x{}", hex::encode(message)), address.to_string()]),
            )
            .await
            .map_err(|e| AccountError::SigningFailed(e.to_string()))?;
        let signature = reply.as_str().ok_or_else(|| {
            AccountError::SigningFailed("wallet returned a non-string signature".to_string())
        })?;

        Ok(signature.strip_prefix("0x").unwrap_or(signature).to_string())
    }

    /// Forget the address in memory and in storage. Safe to call repeatedly.
    pub fn disconnect(&self) -> AccountResult<()> {
        if let Some(address) = self.address.swap(None) {
            tracing::info!(address = %address, "Wallet account disconnected");
        }
        self.store.clear_wallet()?;
        Ok(())
    }
}

impl std::fmt::Debug for BrowserWalletAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserWalletAccount")
            .field("address", &self.address().ok())
            .field("chain_id", &self.chain.chain_id)
            .finish()
    }
}

/// Creates and restores [`BrowserWalletAccount`]s.
#[derive(Clone)]
pub struct BrowserWalletCreator {
    provider: Option<Arc<dyn WalletProvider>>,
    chain: ChainConfig,
    store: SessionStore,
}

impl BrowserWalletCreator {
    /// `provider` is `None` when no wallet is installed.
    pub fn new(
        provider: Option<Arc<dyn WalletProvider>>,
        chain: ChainConfig,
        store: SessionStore,
    ) -> Self {
        Self {
            provider,
            chain,
            store,
        }
    }

    fn provider(&self) -> AccountResult<Arc<dyn WalletProvider>> {
        self.provider
            .clone()
            .ok_or_else(|| AccountError::SigningFailed("wallet provider not available".to_string()))
    }
}

impl AccountCreator for BrowserWalletCreator {
    type Param = ();

    fn kind(&self) -> AccountKind {
        AccountKind::BrowserWallet
    }

    async fn create(&self, _param: ()) -> AccountResult<Account> {
        let provider = self.provider()?;
        let accounts = provider
            .request(RequestArguments::new(ETH_REQUEST_ACCOUNTS, json!([])))
            .await
            .map_err(|e| AccountError::SigningFailed(e.to_string()))?;
        let first = accounts
            .as_array()
            .and_then(|a| a.first())
            .and_then(Value::as_str)
            .ok_or_else(|| AccountError::SigningFailed("wallet returned no accounts".to_string()))?;
        let address: Address = first
            .parse()
            .map_err(|e| AccountError::SigningFailed(format!("wallet returned bad address: {e}")))?;

        let account =
            BrowserWalletAccount::new(provider, self.chain.clone(), address, self.store.clone());
        account.ensure_chain().await?;
        self.store.save_wallet_address(address)?;

        tracing::info!(address = %address, "Wallet account connected");
        Ok(Account::BrowserWallet(account))
    }

    async fn restore(&self) -> AccountResult<Account> {
        let address = self
            .store
            .wallet_address()
            .ok_or(AccountError::NoStoredCredential(AccountKind::BrowserWallet))?;
        let provider = self.provider()?;

        tracing::info!(address = %address, "Wallet account restored");
        Ok(Account::BrowserWallet(BrowserWalletAccount::new(
            provider,
            self.chain.clone(),
            address,
            self.store.clone(),
        )))
    }
}
