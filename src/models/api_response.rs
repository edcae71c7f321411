use actix_web::{http::StatusCode, HttpResponse};
use serde::Serialize;

use crate::errors::ApiError;

// Generic API Response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub code: u16,
    pub result: Option<T>,
    pub error: Option<ApiError>,
}

// Success response helper
pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
    respond(StatusCode::OK, data)
}

// Accepted response helper, for work that continues in the background
pub fn accepted_response<T: Serialize>(data: T) -> HttpResponse {
    respond(StatusCode::ACCEPTED, data)
}

fn respond<T: Serialize>(code: StatusCode, data: T) -> HttpResponse {
    HttpResponse::build(code).json(ApiResponse {
        status: "SUCCESS".to_string(),
        code: code.as_u16(),
        result: Some(data),
        error: None,
    })
}
