use crate::{
    errors::CustomError,
    models::network_config::{NativeCurrency, NetworkConfig, NetworkId},
};

const ETHER: NativeCurrency = NativeCurrency {
    name: "Ether",
    symbol: "ETH",
    decimals: 18,
};

static NETWORKS: [NetworkConfig; 4] = [
    NetworkConfig {
        id: NetworkId::ArbitrumSepolia,
        chain_id: 421614,
        name: "Arbitrum Sepolia",
        rpc_url: "https://sepolia-rollup.arbitrum.io/rpc",
        block_explorer: "https://sepolia.arbiscan.io",
        native_currency: NativeCurrency {
            name: "Arbitrum Sepolia Ether",
            symbol: "ETH",
            decimals: 18,
        },
        default_contract: Some("0x5af02ab1d47cc700c1ec4578618df15b8c9c565e"),
    },
    NetworkConfig {
        id: NetworkId::Arbitrum,
        chain_id: 42161,
        name: "Arbitrum One",
        rpc_url: "https://arb1.arbitrum.io/rpc",
        block_explorer: "https://arbiscan.io",
        native_currency: ETHER,
        default_contract: None,
    },
    NetworkConfig {
        id: NetworkId::Superposition,
        chain_id: 55244,
        name: "Superposition",
        rpc_url: "https://rpc.superposition.so",
        block_explorer: "https://explorer.superposition.so",
        native_currency: ETHER,
        default_contract: None,
    },
    NetworkConfig {
        id: NetworkId::SuperpositionTestnet,
        chain_id: 98985,
        name: "Superposition Testnet",
        rpc_url: "https://testnet-rpc.superposition.so",
        block_explorer: "https://testnet-explorer.superposition.so",
        native_currency: NativeCurrency {
            name: "SPN",
            symbol: "SPN",
            decimals: 18,
        },
        default_contract: Some("0x88be27d855cb563bfcb18fa466f67d32d62fd0af"),
    },
];

/// Get network configuration for one of the supported networks
pub fn get_network_config(id: NetworkId) -> &'static NetworkConfig {
    match id {
        NetworkId::ArbitrumSepolia => &NETWORKS[0],
        NetworkId::Arbitrum => &NETWORKS[1],
        NetworkId::Superposition => &NETWORKS[2],
        NetworkId::SuperpositionTestnet => &NETWORKS[3],
    }
}

/// Get network configuration based on chain ID
pub fn find_by_chain_id(chain_id: u64) -> Result<&'static NetworkConfig, CustomError> {
    NETWORKS
        .iter()
        .find(|network| network.chain_id == chain_id)
        .ok_or(CustomError::UnsupportedChainError(chain_id))
}

pub fn all_networks() -> &'static [NetworkConfig] {
    &NETWORKS
}
