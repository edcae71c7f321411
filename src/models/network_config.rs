use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CustomError;

/// Networks the panel can target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkId {
    #[serde(rename = "arbitrum-sepolia")]
    ArbitrumSepolia,
    #[serde(rename = "arbitrum")]
    Arbitrum,
    #[serde(rename = "superposition")]
    Superposition,
    #[serde(rename = "superposition-testnet")]
    SuperpositionTestnet,
}

impl NetworkId {
    pub const ALL: [NetworkId; 4] = [
        NetworkId::ArbitrumSepolia,
        NetworkId::Arbitrum,
        NetworkId::Superposition,
        NetworkId::SuperpositionTestnet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkId::ArbitrumSepolia => "arbitrum-sepolia",
            NetworkId::Arbitrum => "arbitrum",
            NetworkId::Superposition => "superposition",
            NetworkId::SuperpositionTestnet => "superposition-testnet",
        }
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkId {
    type Err = CustomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NetworkId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| CustomError::UnsupportedNetwork(s.to_string()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NativeCurrency {
    pub name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NetworkConfig {
    pub id: NetworkId,
    pub chain_id: u64,
    pub name: &'static str,
    pub rpc_url: &'static str,
    pub block_explorer: &'static str,
    pub native_currency: NativeCurrency,
    /// Token contract deployed by the project on this network, if any.
    pub default_contract: Option<&'static str>,
}

impl NetworkConfig {
    /// Chain id in the `0x`-prefixed form wallets expect.
    pub fn chain_id_hex(&self) -> String {
        format!("{:#x}", self.chain_id)
    }

    pub fn tx_url(&self, hash: &str) -> String {
        format!("{}/tx/{}", self.block_explorer, hash)
    }

    pub fn address_url(&self, address: &str) -> String {
        format!("{}/address/{}", self.block_explorer, address)
    }
}
