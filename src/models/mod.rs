pub mod api_response;
pub mod contract;
pub mod network_config;
pub mod token;
pub mod transaction;
pub mod wallet;
