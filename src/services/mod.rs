pub mod blockchain_service;
pub mod chain_service;
pub mod network_config;
pub mod panel_service;
pub mod token_service;
pub mod transaction_service;
pub mod wallet_service;

#[cfg(test)]
pub mod testing;
