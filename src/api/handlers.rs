use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;

use crate::{
    errors::CustomError,
    models::{api_response::success_response, network_config::NetworkId},
    services::panel_service::PanelService,
};

#[derive(Debug, Deserialize)]
pub struct SelectNetworkRequest {
    network: NetworkId,
}

#[derive(Debug, Deserialize)]
pub struct CustomContractRequest {
    address: String,
}

#[derive(Debug, Deserialize)]
pub struct AllowanceQuery {
    owner: String,
    spender: String,
}

#[get("/networks")]
async fn list_networks(panel: web::Data<PanelService>) -> HttpResponse {
    success_response(panel.networks())
}

#[get("/wallet")]
async fn get_wallet(panel: web::Data<PanelService>) -> HttpResponse {
    success_response(panel.wallet_info())
}

#[get("/selection")]
async fn get_selection(panel: web::Data<PanelService>) -> HttpResponse {
    success_response(panel.selection())
}

#[post("/selection/network")]
async fn select_network(
    panel: web::Data<PanelService>,
    request: web::Json<SelectNetworkRequest>,
) -> HttpResponse {
    success_response(panel.select_network(request.network).await)
}

#[post("/selection/custom")]
async fn use_custom_contract(
    panel: web::Data<PanelService>,
    request: web::Json<CustomContractRequest>,
) -> Result<HttpResponse, CustomError> {
    let selection = panel.use_custom_contract(&request.address).await?;
    Ok(success_response(selection))
}

#[post("/selection/default")]
async fn use_default_contract(panel: web::Data<PanelService>) -> HttpResponse {
    success_response(panel.use_default_contract().await)
}

#[get("/token")]
async fn get_token(panel: web::Data<PanelService>) -> HttpResponse {
    success_response(panel.token_state())
}

#[post("/token/refresh")]
async fn refresh_token(panel: web::Data<PanelService>) -> Result<HttpResponse, CustomError> {
    let snapshot = panel.refresh_token().await?;
    Ok(success_response(snapshot))
}

#[get("/token/balance/{address}")]
async fn check_balance(
    panel: web::Data<PanelService>,
    address: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let balance = panel.check_balance(&address).await?;
    Ok(success_response(balance))
}

#[get("/token/allowance")]
async fn check_allowance(
    panel: web::Data<PanelService>,
    query: web::Query<AllowanceQuery>,
) -> Result<HttpResponse, CustomError> {
    let allowance = panel.check_allowance(&query.owner, &query.spender).await?;
    Ok(success_response(allowance))
}
