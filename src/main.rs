use actix_cors::Cors;
use actix_web::http::header;
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use log::{info, warn};
use std::io;
use std::sync::Arc;

mod api;
mod config;
mod errors;
mod models;
mod services;
mod utils;

use config::Config;
use errors::CustomError;
use models::contract::ContractSelection;
use services::{
    blockchain_service::EthersGateway,
    panel_service::PanelService,
    wallet_service::{DisconnectedWallet, LocalWalletSession, RpcWalletSession, WalletSession},
};

async fn connect_wallet(config: &Config) -> Result<Arc<dyn WalletSession>, CustomError> {
    if let Some(url) = &config.wallet_rpc_url {
        let wallet = RpcWalletSession::connect(url).await?;
        info!("Connected to wallet at {url}: {:?}", wallet.info());
        return Ok(Arc::new(wallet));
    }
    if let Some(key) = &config.private_key {
        let wallet = LocalWalletSession::from_private_key(key, config.wallet_chain_id)?;
        info!("Using local wallet {:?}", wallet.address());
        return Ok(Arc::new(wallet));
    }
    warn!("No wallet configured, writes will be rejected");
    Ok(Arc::new(DisconnectedWallet))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let wallet = connect_wallet(&config)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let gateway = Arc::new(EthersGateway::new());
    let panel = web::Data::new(PanelService::new(
        ContractSelection::new(config.network, config.contract_address),
        wallet,
        gateway.clone(),
        gateway,
        config.status_display,
    ));
    if let Err(e) = panel.refresh_token().await {
        warn!("Initial token read failed: {e}");
    }

    info!("Starting server on port {}", config.port);
    let cors_origins = config.cors_origins.clone();
    HttpServer::new(move || {
        let cors = cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec![
                header::CONTENT_TYPE,
                header::AUTHORIZATION,
                header::ACCEPT,
            ])
            .supports_credentials();
        App::new()
            .app_data(panel.clone())
            .configure(api::config)
            .wrap(cors)
    })
    .bind(("127.0.0.1", config.port))?
    .run()
    .await
}
