use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};

use crate::{errors::ServiceError, ApiResponse, AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(get_dashboard))
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    responses(
        (status = 200, description = "Procurement dashboard snapshot",
            body = crate::services::DashboardSnapshot),
    ),
    tag = "dashboard"
)]
pub async fn get_dashboard(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let snapshot = state.services.dashboard.snapshot().await?;
    Ok(Json(ApiResponse::success(snapshot)))
}
