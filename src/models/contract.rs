use std::str::FromStr;

use ethers::types::Address;
use serde::Serialize;

use crate::{
    errors::CustomError,
    models::network_config::{NetworkConfig, NetworkId},
    services::network_config::get_network_config,
};

/// A contract address bound to the network it lives on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractTarget {
    pub network: &'static NetworkConfig,
    pub address: Address,
}

impl ContractTarget {
    pub fn new(network: &'static NetworkConfig, address: Address) -> Self {
        Self { network, address }
    }
}

pub fn parse_address(address: &str) -> Result<Address, CustomError> {
    Address::from_str(address.trim())
        .map_err(|_| CustomError::InvalidAddressError(address.to_string()))
}

/// The contract the panel is currently pointed at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ContractSelection {
    pub network: NetworkId,
    pub address: Option<Address>,
    pub is_default: bool,
    /// Set when the address was supplied at startup; pinned addresses survive network switches.
    pub pinned: bool,
}

impl ContractSelection {
    pub fn new(network: NetworkId, initial: Option<Address>) -> Self {
        let mut selection = Self {
            network,
            address: initial.or_else(|| default_address(network)),
            is_default: false,
            pinned: initial.is_some(),
        };
        selection.recompute_default();
        selection
    }

    pub fn switch_network(&mut self, network: NetworkId) {
        let was_default = self.is_default;
        self.network = network;

        match default_address(network) {
            Some(default) if was_default || !self.pinned => self.address = Some(default),
            None if !self.pinned => self.address = None,
            _ => {}
        }
        self.recompute_default();
    }

    pub fn use_custom(&mut self, address: Address) {
        self.address = Some(address);
        self.recompute_default();
    }

    pub fn use_default(&mut self) {
        self.address = default_address(self.network);
        self.recompute_default();
    }

    pub fn network_config(&self) -> &'static NetworkConfig {
        get_network_config(self.network)
    }

    pub fn target(&self) -> Result<ContractTarget, CustomError> {
        let address = self.address.ok_or(CustomError::NoContractSelected)?;
        Ok(ContractTarget::new(self.network_config(), address))
    }

    fn recompute_default(&mut self) {
        self.is_default = self.address.is_some() && self.address == default_address(self.network);
    }
}

fn default_address(network: NetworkId) -> Option<Address> {
    get_network_config(network)
        .default_contract
        .and_then(|address| Address::from_str(address).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom() -> Address {
        Address::from_str("0x1111111111111111111111111111111111111111").unwrap()
    }

    #[test]
    fn starts_on_network_default() {
        let selection = ContractSelection::new(NetworkId::ArbitrumSepolia, None);
        assert!(selection.is_default);
        assert_eq!(selection.address, default_address(NetworkId::ArbitrumSepolia));
    }

    #[test]
    fn switching_follows_defaults_when_nothing_pinned() {
        let mut selection = ContractSelection::new(NetworkId::ArbitrumSepolia, None);

        selection.switch_network(NetworkId::Arbitrum);
        assert_eq!(selection.address, None);
        assert!(!selection.is_default);

        selection.switch_network(NetworkId::SuperpositionTestnet);
        assert_eq!(
            selection.address,
            default_address(NetworkId::SuperpositionTestnet)
        );
        assert!(selection.is_default);
    }

    #[test]
    fn pinned_address_survives_switch() {
        let mut selection = ContractSelection::new(NetworkId::Arbitrum, Some(custom()));
        assert!(!selection.is_default);

        selection.switch_network(NetworkId::Superposition);
        assert_eq!(selection.address, Some(custom()));

        selection.switch_network(NetworkId::ArbitrumSepolia);
        assert_eq!(selection.address, Some(custom()));
    }

    #[test]
    fn pinned_default_moves_to_new_default() {
        let mut selection = ContractSelection::new(NetworkId::ArbitrumSepolia, None);
        selection.pinned = true;
        selection.switch_network(NetworkId::SuperpositionTestnet);
        assert!(selection.is_default);

        selection.switch_network(NetworkId::Arbitrum);
        assert_eq!(
            selection.address,
            default_address(NetworkId::SuperpositionTestnet)
        );
        assert!(!selection.is_default);
    }

    #[test]
    fn custom_and_default_toggle() {
        let mut selection = ContractSelection::new(NetworkId::SuperpositionTestnet, None);
        selection.use_custom(custom());
        assert!(!selection.is_default);

        selection.use_default();
        assert!(selection.is_default);
        assert!(selection.target().is_ok());
    }

    #[test]
    fn target_requires_an_address() {
        let selection = ContractSelection::new(NetworkId::Arbitrum, None);
        assert_eq!(selection.target(), Err(CustomError::NoContractSelected));
    }
}
