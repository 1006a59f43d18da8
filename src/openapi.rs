use utoipa::OpenApi;

use crate::commands::goodsreceipts::{CreateGoodsReceiptCommand, CreateGoodsReceiptLine};
use crate::commands::purchaseorders::{CreatePurchaseOrderCommand, CreatePurchaseOrderItem};
use crate::commands::purchaserequests::{CreatePurchaseRequestCommand, CreatePurchaseRequestItem};
use crate::errors::ErrorResponse;
use crate::services::procurement::{
    CreateProductRequest, CreateSupplierRequest, CreateWarehouseRequest,
};
use crate::services::DashboardSnapshot;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "NGS Procurement API",
        description = "Purchase request, purchase order and goods receipt lifecycle"
    ),
    paths(
        crate::handlers::purchase_requests::create_purchase_request,
        crate::handlers::purchase_requests::list_purchase_requests,
        crate::handlers::purchase_requests::get_purchase_request,
        crate::handlers::purchase_requests::submit_purchase_request,
        crate::handlers::purchase_requests::approve_purchase_request,
        crate::handlers::purchase_requests::reject_purchase_request,
        crate::handlers::purchase_orders::create_purchase_order,
        crate::handlers::purchase_orders::list_purchase_orders,
        crate::handlers::purchase_orders::get_purchase_order,
        crate::handlers::purchase_orders::update_purchase_order,
        crate::handlers::purchase_orders::reject_purchase_order,
        crate::handlers::purchase_orders::list_order_receipts,
        crate::handlers::goods_receipts::create_goods_receipt,
        crate::handlers::goods_receipts::get_goods_receipt,
        crate::handlers::master_data::create_supplier,
        crate::handlers::master_data::create_product,
        crate::handlers::master_data::create_warehouse,
        crate::handlers::dashboard::get_dashboard,
    ),
    components(schemas(
        CreatePurchaseRequestCommand,
        CreatePurchaseRequestItem,
        CreatePurchaseOrderCommand,
        CreatePurchaseOrderItem,
        CreateGoodsReceiptCommand,
        CreateGoodsReceiptLine,
        CreateSupplierRequest,
        CreateProductRequest,
        CreateWarehouseRequest,
        DashboardSnapshot,
        ErrorResponse,
    ))
)]
pub struct ApiDoc;
