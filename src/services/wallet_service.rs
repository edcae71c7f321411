use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use ethers::{
    providers::{Http, Middleware, Provider, ProviderError, RpcError},
    signers::{LocalWallet, Signer},
    types::Address,
};
use log::info;
use serde::Serialize;

use crate::{
    errors::{CustomError, WalletError},
    models::wallet::{AddChainParams, WalletInfo},
    services::network_config::find_by_chain_id,
};

const INVALID_PARAMS: i64 = -32602;

/// How write calls get signed.
#[derive(Clone, Debug)]
pub enum TxSigner {
    /// Key held in-process; transactions are signed locally and broadcast to the network RPC.
    Local(LocalWallet),
    /// External wallet reachable over JSON-RPC; it signs `eth_sendTransaction` requests itself.
    Remote { url: String, from: Address },
}

/// The connected wallet as seen by the panel.
#[async_trait]
pub trait WalletSession: Send + Sync {
    fn is_connected(&self) -> bool;

    fn address(&self) -> Option<Address>;

    fn chain_id(&self) -> Option<u64>;

    fn signer(&self) -> Option<TxSigner>;

    /// `wallet_switchEthereumChain` with a `0x`-prefixed chain id.
    async fn switch_chain(&self, chain_id: &str) -> Result<(), WalletError>;

    /// `wallet_addEthereumChain`.
    async fn add_chain(&self, params: &AddChainParams) -> Result<(), WalletError>;

    fn info(&self) -> WalletInfo {
        let chain_id = self.chain_id();
        WalletInfo {
            connected: self.is_connected(),
            address: self.address(),
            chain_id,
            network: chain_id
                .and_then(|chain_id| find_by_chain_id(chain_id).ok())
                .map(|network| network.id),
        }
    }
}

fn parse_chain_id(chain_id: &str) -> Result<u64, WalletError> {
    let digits = chain_id.trim_start_matches("0x");
    u64::from_str_radix(digits, 16).map_err(|_| WalletError::Rpc {
        code: Some(INVALID_PARAMS),
        message: format!("Invalid chain id: {chain_id}"),
    })
}

/// Used when no wallet is configured.
pub struct DisconnectedWallet;

#[async_trait]
impl WalletSession for DisconnectedWallet {
    fn is_connected(&self) -> bool {
        false
    }

    fn address(&self) -> Option<Address> {
        None
    }

    fn chain_id(&self) -> Option<u64> {
        None
    }

    fn signer(&self) -> Option<TxSigner> {
        None
    }

    async fn switch_chain(&self, _chain_id: &str) -> Result<(), WalletError> {
        Err(WalletError::Rpc {
            code: None,
            message: CustomError::NoWallet.to_string(),
        })
    }

    async fn add_chain(&self, _params: &AddChainParams) -> Result<(), WalletError> {
        Err(WalletError::Rpc {
            code: None,
            message: CustomError::NoWallet.to_string(),
        })
    }
}

struct LocalChains {
    active: u64,
    known: HashSet<u64>,
}

/// In-process wallet backed by a private key.
///
/// It only knows the chain it started on plus chains added through `add_chain`. Adding a chain
/// also makes it the active one.
pub struct LocalWalletSession {
    wallet: LocalWallet,
    chains: RwLock<LocalChains>,
}

impl LocalWalletSession {
    pub fn new(wallet: LocalWallet, start_chain: u64) -> Self {
        Self {
            wallet,
            chains: RwLock::new(LocalChains {
                active: start_chain,
                known: HashSet::from([start_chain]),
            }),
        }
    }

    pub fn from_private_key(private_key: &str, start_chain: u64) -> Result<Self, CustomError> {
        let wallet = private_key
            .parse::<LocalWallet>()
            .map_err(|e| CustomError::ValidationError(format!("Failed to create wallet: {e}")))?;
        Ok(Self::new(wallet, start_chain))
    }
}

#[async_trait]
impl WalletSession for LocalWalletSession {
    fn is_connected(&self) -> bool {
        true
    }

    fn address(&self) -> Option<Address> {
        Some(self.wallet.address())
    }

    fn chain_id(&self) -> Option<u64> {
        let chains = self.chains.read().unwrap_or_else(PoisonError::into_inner);
        Some(chains.active)
    }

    fn signer(&self) -> Option<TxSigner> {
        Some(TxSigner::Local(self.wallet.clone()))
    }

    async fn switch_chain(&self, chain_id: &str) -> Result<(), WalletError> {
        let id = parse_chain_id(chain_id)?;
        let mut chains = self.chains.write().unwrap_or_else(PoisonError::into_inner);
        if !chains.known.contains(&id) {
            return Err(WalletError::UnrecognizedChain(format!(
                "Unrecognized chain ID \"{chain_id}\". Try adding the chain using wallet_addEthereumChain first."
            )));
        }
        chains.active = id;
        info!("Local wallet switched to chain {id}");
        Ok(())
    }

    async fn add_chain(&self, params: &AddChainParams) -> Result<(), WalletError> {
        let id = parse_chain_id(&params.chain_id)?;
        if params.rpc_urls.is_empty() {
            return Err(WalletError::Rpc {
                code: Some(INVALID_PARAMS),
                message: "rpcUrls must contain at least one URL".to_string(),
            });
        }
        let mut chains = self.chains.write().unwrap_or_else(PoisonError::into_inner);
        chains.known.insert(id);
        chains.active = id;
        info!("Local wallet added {} ({id})", params.chain_name);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SwitchChainParams<'a> {
    chain_id: &'a str,
}

#[derive(Default)]
struct RemoteState {
    address: Option<Address>,
    chain_id: Option<u64>,
}

/// External wallet (e.g. a desktop wallet exposing a local JSON-RPC endpoint).
pub struct RpcWalletSession {
    url: String,
    provider: Provider<Http>,
    state: RwLock<RemoteState>,
}

impl RpcWalletSession {
    pub async fn connect(url: &str) -> Result<Self, CustomError> {
        let provider = Provider::<Http>::try_from(url)
            .map_err(|e| CustomError::ValidationError(format!("Invalid wallet url {url}: {e}")))?;
        let session = Self {
            url: url.to_string(),
            provider,
            state: RwLock::new(RemoteState::default()),
        };
        session.sync().await?;
        Ok(session)
    }

    /// Re-read the selected account and active chain from the wallet.
    pub async fn sync(&self) -> Result<(), CustomError> {
        let accounts = self
            .provider
            .get_accounts()
            .await
            .map_err(|e| CustomError::ChainError(format!("Failed to read wallet accounts: {e}")))?;
        let chain_id = self
            .provider
            .get_chainid()
            .await
            .map_err(|e| CustomError::ChainError(format!("Failed to read wallet chain: {e}")))?;

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.address = accounts.first().copied();
        state.chain_id = Some(chain_id.as_u64());
        Ok(())
    }

    fn set_chain(&self, chain_id: u64) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.chain_id = Some(chain_id);
    }
}

fn wallet_error(err: ProviderError) -> WalletError {
    match err.as_error_response() {
        Some(response) => WalletError::from_rpc(response.code, &response.message),
        None => WalletError::Rpc {
            code: None,
            message: err.to_string(),
        },
    }
}

#[async_trait]
impl WalletSession for RpcWalletSession {
    fn is_connected(&self) -> bool {
        self.address().is_some()
    }

    fn address(&self) -> Option<Address> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.address
    }

    fn chain_id(&self) -> Option<u64> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.chain_id
    }

    fn signer(&self) -> Option<TxSigner> {
        self.address().map(|from| TxSigner::Remote {
            url: self.url.clone(),
            from,
        })
    }

    async fn switch_chain(&self, chain_id: &str) -> Result<(), WalletError> {
        let id = parse_chain_id(chain_id)?;
        self.provider
            .request::<_, serde_json::Value>(
                "wallet_switchEthereumChain",
                [SwitchChainParams { chain_id }],
            )
            .await
            .map_err(wallet_error)?;
        self.set_chain(id);
        info!("Wallet switched to chain {id}");
        Ok(())
    }

    async fn add_chain(&self, params: &AddChainParams) -> Result<(), WalletError> {
        self.provider
            .request::<_, serde_json::Value>("wallet_addEthereumChain", [params])
            .await
            .map_err(wallet_error)?;

        // Whether the wallet also switched is up to the wallet; ask it.
        let active = self.provider.get_chainid().await.map_err(wallet_error)?;
        self.set_chain(active.as_u64());
        info!(
            "Wallet added {} and is on chain {}",
            params.chain_name,
            active.as_u64()
        );
        Ok(())
    }
}
