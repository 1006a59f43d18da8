use axum::{
    extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router,
};

use crate::{
    errors::ServiceError,
    services::procurement::{CreateProductRequest, CreateSupplierRequest, CreateWarehouseRequest},
    ApiResponse, AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/suppliers", post(create_supplier))
        .route("/products", post(create_product))
        .route("/warehouses", post(create_warehouse))
}

#[utoipa::path(
    post,
    path = "/api/v1/suppliers",
    request_body = CreateSupplierRequest,
    responses(
        (status = 201, description = "Supplier created with a generated code"),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
    ),
    tag = "master-data"
)]
pub async fn create_supplier(
    State(state): State<AppState>,
    Json(req): Json<CreateSupplierRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let supplier = state.services.procurement.create_supplier(req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(supplier))))
}

#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created with a generated SKU"),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
    ),
    tag = "master-data"
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(req): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state.services.procurement.create_product(req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(product))))
}

#[utoipa::path(
    post,
    path = "/api/v1/warehouses",
    request_body = CreateWarehouseRequest,
    responses(
        (status = 201, description = "Warehouse created"),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
    ),
    tag = "master-data"
)]
pub async fn create_warehouse(
    State(state): State<AppState>,
    Json(req): Json<CreateWarehouseRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let warehouse = state.services.procurement.create_warehouse(req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(warehouse))))
}
