use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    commands::purchaseorders::{
        CreatePurchaseOrderCommand, CreatePurchaseOrderItem, UpdatePurchaseOrderCommand,
    },
    errors::ServiceError,
    models::purchase_order_entity::PurchaseOrderStatus,
    services::procurement::Pagination,
    ApiResponse, AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_purchase_order).get(list_purchase_orders))
        .route("/:id", get(get_purchase_order).put(update_purchase_order))
        .route("/:id/reject", post(reject_purchase_order))
        .route("/:id/receipts", get(list_order_receipts))
}

#[derive(Debug, Deserialize)]
pub struct ListPurchaseOrdersQuery {
    pub status: Option<PurchaseOrderStatus>,
    pub supplier_id: Option<Uuid>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

impl ListPurchaseOrdersQuery {
    fn pagination(&self) -> Pagination {
        let defaults = Pagination::default();
        Pagination {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

/// Body of a PUT; the path carries the order id.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePurchaseOrderBody {
    pub items: Option<Vec<CreatePurchaseOrderItem>>,
    pub expected_delivery_date: Option<NaiveDate>,
    pub payment_terms: Option<String>,
    pub delivery_terms: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RejectBody {
    pub rejected_by: Uuid,
    pub reason: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders",
    request_body = CreatePurchaseOrderCommand,
    responses(
        (status = 201, description = "Purchase order created"),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
        (status = 404, description = "Supplier or request not found", body = crate::errors::ErrorResponse),
    ),
    tag = "purchase-orders"
)]
pub async fn create_purchase_order(
    State(state): State<AppState>,
    Json(cmd): Json<CreatePurchaseOrderCommand>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.procurement.create_purchase_order(cmd).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders",
    params(
        ("status" = Option<String>, Query, description = "Filter by order status"),
        ("supplier_id" = Option<Uuid>, Query, description = "Filter by supplier"),
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("per_page" = Option<u64>, Query, description = "Items per page (default: 20)"),
    ),
    responses((status = 200, description = "Purchase orders retrieved")),
    tag = "purchase-orders"
)]
pub async fn list_purchase_orders(
    State(state): State<AppState>,
    Query(query): Query<ListPurchaseOrdersQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let page = state
        .services
        .procurement
        .list_purchase_orders(query.status, query.supplier_id, query.pagination())
        .await?;
    Ok(Json(ApiResponse::success(page)))
}

#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders/{id}",
    params(("id" = Uuid, Path, description = "Purchase order id")),
    responses(
        (status = 200, description = "Purchase order retrieved"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    tag = "purchase-orders"
)]
pub async fn get_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.procurement.get_purchase_order(id).await?;
    Ok(Json(ApiResponse::success(order)))
}

#[utoipa::path(
    put,
    path = "/api/v1/purchase-orders/{id}",
    params(("id" = Uuid, Path, description = "Purchase order id")),
    request_body = UpdatePurchaseOrderBody,
    responses(
        (status = 200, description = "Purchase order updated; status advanced one step"),
        (status = 409, description = "Order can no longer be updated", body = crate::errors::ErrorResponse),
    ),
    tag = "purchase-orders"
)]
pub async fn update_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdatePurchaseOrderBody>,
) -> Result<impl IntoResponse, ServiceError> {
    let result = state
        .services
        .procurement
        .update_purchase_order(UpdatePurchaseOrderCommand {
            purchase_order_id: id,
            items: body.items,
            expected_delivery_date: body.expected_delivery_date,
            payment_terms: body.payment_terms,
            delivery_terms: body.delivery_terms,
            notes: body.notes,
        })
        .await?;
    Ok(Json(ApiResponse::success(result)))
}

#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders/{id}/reject",
    params(("id" = Uuid, Path, description = "Purchase order id")),
    request_body = RejectBody,
    responses(
        (status = 200, description = "Purchase order rejected"),
        (status = 400, description = "Missing rejection reason", body = crate::errors::ErrorResponse),
        (status = 409, description = "Order is not awaiting approval", body = crate::errors::ErrorResponse),
    ),
    tag = "purchase-orders"
)]
pub async fn reject_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<RejectBody>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state
        .services
        .procurement
        .reject_purchase_order(id, body.rejected_by, body.reason)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders/{id}/receipts",
    params(("id" = Uuid, Path, description = "Purchase order id")),
    responses((status = 200, description = "Goods receipts for the order")),
    tag = "purchase-orders"
)]
pub async fn list_order_receipts(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let receipts = state
        .services
        .procurement
        .list_goods_receipts_for_order(id)
        .await?;
    Ok(Json(ApiResponse::success(receipts)))
}
