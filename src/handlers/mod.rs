use actix_web::{get, web, HttpResponse};
use log::error;
use serde_json::json;

use crate::error::ApiError;
use crate::AppState;

pub mod admin;
pub mod auth;
pub mod categories;
pub mod favorites;
pub mod videos;

#[get("/api/status")]
async fn status() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "running"
    }))
}

#[get("/api/health")]
async fn health(state: web::Data<AppState>) -> HttpResponse {
    match sqlx::query("SELECT 1").execute(&state.db_pool).await {
        Ok(_) => HttpResponse::Ok().json(json!({
            "status": "ok",
            "database": "ok"
        })),
        Err(e) => {
            error!("Health check failed: {:?}", e);
            HttpResponse::ServiceUnavailable().json(json!({
                "status": "degraded",
                "database": "unreachable"
            }))
        }
    }
}

/// Extractor failures use the same JSON error body as handler errors.
fn extractor_errors(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|e, _| ApiError::BadRequest(format!("Invalid request body: {}", e)).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|e, _| ApiError::BadRequest(format!("Invalid query string: {}", e)).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|e, _| ApiError::NotFound(format!("Invalid path: {}", e)).into()),
    );
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    extractor_errors(cfg);
    cfg.service(status).service(health);
    auth::configure(cfg);
    videos::configure(cfg);
    favorites::configure(cfg);
    categories::configure(cfg);
    admin::configure(cfg);
}
