use actix_web::{get, post, rt, web, HttpResponse};
use log::debug;
use serde::Serialize;

use crate::{
    models::{
        api_response::{accepted_response, success_response},
        transaction::{WriteKind, WriteRequest},
    },
    services::panel_service::PanelService,
};

#[derive(Debug, Serialize)]
struct Submission {
    kind: WriteKind,
}

/// Starts the write in the background; progress is read from `/transactions/status`.
#[post("/transactions")]
async fn submit_transaction(
    panel: web::Data<PanelService>,
    request: web::Json<WriteRequest>,
) -> HttpResponse {
    let request = request.into_inner();
    let kind = request.kind();
    debug!("Received {kind:?} request");

    let panel = panel.clone();
    rt::spawn(async move { panel.submit(request).await });

    accepted_response(Submission { kind })
}

#[get("/transactions/status")]
async fn get_status(panel: web::Data<PanelService>) -> HttpResponse {
    success_response(panel.status())
}
