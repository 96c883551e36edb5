//! Health check endpoint.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
    /// `connected`, `disconnected` or `disabled`.
    pub kvs: &'static str,
}

/// Health check endpoint - returns server status.
///
/// GET /v1/health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let kvs = match &state.kvs {
        None => "disabled",
        Some(kvs) if kvs.is_connected().await => "connected",
        Some(_) => "disconnected",
    };

    let response = HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
        kvs,
    };

    HttpResponse::Ok().json(response)
}
