use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::{
    commands::goodsreceipts::CreateGoodsReceiptCommand, errors::ServiceError, ApiResponse,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_goods_receipt))
        .route("/:id", get(get_goods_receipt))
}

#[utoipa::path(
    post,
    path = "/api/v1/goods-receipts",
    request_body = CreateGoodsReceiptCommand,
    responses(
        (status = 201, description = "Goods receipt posted; stock, assets and order status updated"),
        (status = 400, description = "Invalid quantities", body = crate::errors::ErrorResponse),
        (status = 409, description = "Order not open for receiving or over-receipt", body = crate::errors::ErrorResponse),
    ),
    tag = "goods-receipts"
)]
pub async fn create_goods_receipt(
    State(state): State<AppState>,
    Json(cmd): Json<CreateGoodsReceiptCommand>,
) -> Result<impl IntoResponse, ServiceError> {
    let result = state.services.procurement.post_goods_receipt(cmd).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(result))))
}

#[utoipa::path(
    get,
    path = "/api/v1/goods-receipts/{id}",
    params(("id" = Uuid, Path, description = "Goods receipt id")),
    responses(
        (status = 200, description = "Goods receipt retrieved"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    tag = "goods-receipts"
)]
pub async fn get_goods_receipt(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let receipt = state.services.procurement.get_goods_receipt(id).await?;
    Ok(Json(ApiResponse::success(receipt)))
}
