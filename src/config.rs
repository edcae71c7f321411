use std::env;
use std::str::FromStr;
use std::time::Duration;

use ethers::types::Address;

use crate::{
    errors::CustomError,
    models::{contract::parse_address, network_config::NetworkId},
    services::{network_config::get_network_config, transaction_service::DEFAULT_STATUS_DISPLAY},
};

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:8080,http://localhost:5173";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub network: NetworkId,
    pub contract_address: Option<Address>,
    pub private_key: Option<String>,
    pub wallet_rpc_url: Option<String>,
    pub wallet_chain_id: u64,
    pub status_display: Duration,
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, CustomError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CustomError> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let network = match var("NETWORK") {
            Some(network) => NetworkId::from_str(network.trim())?,
            None => NetworkId::ArbitrumSepolia,
        };
        let contract_address = var("CONTRACT_ADDRESS")
            .map(|address| parse_address(&address))
            .transpose()?;
        let wallet_chain_id = match var("WALLET_CHAIN_ID") {
            Some(chain_id) => parse_number("WALLET_CHAIN_ID", &chain_id)?,
            None => get_network_config(network).chain_id,
        };
        let status_display = match var("STATUS_DISPLAY_SECS") {
            Some(secs) => Duration::from_secs(parse_number("STATUS_DISPLAY_SECS", &secs)?),
            None => DEFAULT_STATUS_DISPLAY,
        };
        let cors_origins = var("CORS_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            port: match var("PORT") {
                Some(port) => parse_number("PORT", &port)?,
                None => 8080,
            },
            network,
            contract_address,
            private_key: var("PRIVATE_KEY"),
            wallet_rpc_url: var("WALLET_RPC_URL"),
            wallet_chain_id,
            status_display,
            cors_origins,
        })
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T, CustomError> {
    value
        .trim()
        .parse()
        .map_err(|_| CustomError::ValidationError(format!("Failed to parse {key}: {value}")))
}
