pub mod cache;
pub mod commands;
pub mod config;
pub mod db;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod models;
pub mod openapi;
pub mod services;

use axum::{routing::get, Json, Router};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::errors::ServiceError;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
}

/// Uniform JSON envelope for API responses.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
        }
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ServiceError>;

/// Assembles the full application router.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(api_status))
        .route("/api/docs/openapi.json", get(openapi_spec))
        .nest(
            "/api/v1",
            Router::new()
                .nest("/purchase-requests", handlers::purchase_requests::routes())
                .nest("/purchase-orders", handlers::purchase_orders::routes())
                .nest("/goods-receipts", handlers::goods_receipts::routes())
                .nest("/dashboard", handlers::dashboard::routes())
                .merge(handlers::master_data::routes()),
        )
        .with_state(state)
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Result<Json<Value>, ServiceError> {
    if db::ping(&state.db).await {
        Ok(Json(json!({ "status": "ok" })))
    } else {
        Err(ServiceError::InternalError(
            "database unreachable".to_string(),
        ))
    }
}

async fn api_status() -> Json<ApiResponse<Value>> {
    Json(ApiResponse::success(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

async fn openapi_spec() -> Json<Value> {
    Json(json!(openapi::ApiDoc::openapi()))
}
