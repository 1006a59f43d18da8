use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    commands::purchaserequests::CreatePurchaseRequestCommand,
    errors::ServiceError,
    models::purchase_request_entity::PurchaseRequestStatus,
    services::procurement::Pagination,
    ApiResponse, AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_purchase_request).get(list_purchase_requests))
        .route("/:id", get(get_purchase_request))
        .route("/:id/submit", post(submit_purchase_request))
        .route("/:id/approve", post(approve_purchase_request))
        .route("/:id/reject", post(reject_purchase_request))
}

#[derive(Debug, Deserialize)]
pub struct ListPurchaseRequestsQuery {
    pub status: Option<PurchaseRequestStatus>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

impl ListPurchaseRequestsQuery {
    fn pagination(&self) -> Pagination {
        let defaults = Pagination::default();
        Pagination {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApproveBody {
    pub approved_by: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RejectBody {
    pub rejected_by: Uuid,
    pub reason: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/purchase-requests",
    request_body = CreatePurchaseRequestCommand,
    responses(
        (status = 201, description = "Purchase request created"),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
    ),
    tag = "purchase-requests"
)]
pub async fn create_purchase_request(
    State(state): State<AppState>,
    Json(cmd): Json<CreatePurchaseRequestCommand>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.procurement.create_purchase_request(cmd).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

#[utoipa::path(
    get,
    path = "/api/v1/purchase-requests",
    params(
        ("status" = Option<String>, Query, description = "Filter by request status"),
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("per_page" = Option<u64>, Query, description = "Items per page (default: 20)"),
    ),
    responses((status = 200, description = "Purchase requests retrieved")),
    tag = "purchase-requests"
)]
pub async fn list_purchase_requests(
    State(state): State<AppState>,
    Query(query): Query<ListPurchaseRequestsQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let page = state
        .services
        .procurement
        .list_purchase_requests(query.status, query.pagination())
        .await?;
    Ok(Json(ApiResponse::success(page)))
}

#[utoipa::path(
    get,
    path = "/api/v1/purchase-requests/{id}",
    params(("id" = Uuid, Path, description = "Purchase request id")),
    responses(
        (status = 200, description = "Purchase request retrieved"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    tag = "purchase-requests"
)]
pub async fn get_purchase_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let request = state.services.procurement.get_purchase_request(id).await?;
    Ok(Json(ApiResponse::success(request)))
}

#[utoipa::path(
    post,
    path = "/api/v1/purchase-requests/{id}/submit",
    params(("id" = Uuid, Path, description = "Purchase request id")),
    responses(
        (status = 200, description = "Purchase request submitted"),
        (status = 409, description = "Not in a submittable state", body = crate::errors::ErrorResponse),
    ),
    tag = "purchase-requests"
)]
pub async fn submit_purchase_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state.services.procurement.submit_purchase_request(id).await?;
    Ok(Json(ApiResponse::success(updated)))
}

#[utoipa::path(
    post,
    path = "/api/v1/purchase-requests/{id}/approve",
    params(("id" = Uuid, Path, description = "Purchase request id")),
    request_body = ApproveBody,
    responses(
        (status = 200, description = "Purchase request approved"),
        (status = 409, description = "Not awaiting approval", body = crate::errors::ErrorResponse),
    ),
    tag = "purchase-requests"
)]
pub async fn approve_purchase_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ApproveBody>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state
        .services
        .procurement
        .approve_purchase_request(id, body.approved_by)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

#[utoipa::path(
    post,
    path = "/api/v1/purchase-requests/{id}/reject",
    params(("id" = Uuid, Path, description = "Purchase request id")),
    request_body = RejectBody,
    responses(
        (status = 200, description = "Purchase request rejected"),
        (status = 400, description = "Missing rejection reason", body = crate::errors::ErrorResponse),
    ),
    tag = "purchase-requests"
)]
pub async fn reject_purchase_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<RejectBody>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state
        .services
        .procurement
        .reject_purchase_request(id, body.rejected_by, body.reason)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}
