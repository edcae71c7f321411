use ethers::types::Address;
use serde::{Deserialize, Serialize};

use crate::models::network_config::{NetworkConfig, NetworkId};

/// Currency block of a `wallet_addEthereumChain` request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddChainCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Parameters of a `wallet_addEthereumChain` request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddChainParams {
    pub chain_id: String,
    pub chain_name: String,
    pub native_currency: AddChainCurrency,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

impl From<&NetworkConfig> for AddChainParams {
    fn from(network: &NetworkConfig) -> Self {
        Self {
            chain_id: network.chain_id_hex(),
            chain_name: network.name.to_string(),
            native_currency: AddChainCurrency {
                name: network.native_currency.name.to_string(),
                symbol: network.native_currency.symbol.to_string(),
                decimals: network.native_currency.decimals,
            },
            rpc_urls: vec![network.rpc_url.to_string()],
            block_explorer_urls: vec![network.block_explorer.to_string()],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WalletInfo {
    pub connected: bool,
    pub address: Option<Address>,
    pub chain_id: Option<u64>,
    /// Supported network matching the active chain, if any.
    pub network: Option<NetworkId>,
}
