use crate::{
    commands::{
        goodsreceipts::{CreateGoodsReceiptCommand, CreateGoodsReceiptResult},
        purchaseorders::{
            CreatePurchaseOrderCommand, RejectPurchaseOrderCommand, UpdatePurchaseOrderCommand,
            UpdatePurchaseOrderResult,
        },
        purchaserequests::{
            ApprovePurchaseRequestCommand, CreatePurchaseRequestCommand,
            RejectPurchaseRequestCommand, SubmitPurchaseRequestCommand,
        },
        Command,
    },
    db::DbPool,
    errors::ServiceError,
    events::EventSender,
    models::{
        goods_receipt_entity, goods_receipt_item_entity, product_entity, purchase_order_entity,
        purchase_order_item_entity, purchase_request_entity, purchase_request_item_entity,
        supplier_entity, warehouse_entity,
    },
    services::numbering,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    20
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl Pagination {
    fn clamp(self) -> (u64, u64) {
        (self.page.max(1) - 1, self.per_page.clamp(1, 100))
    }
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

#[derive(Debug, Serialize)]
pub struct PurchaseRequestWithItems {
    #[serde(flatten)]
    pub request: purchase_request_entity::Model,
    pub items: Vec<purchase_request_item_entity::Model>,
}

#[derive(Debug, Serialize)]
pub struct PurchaseOrderWithItems {
    #[serde(flatten)]
    pub order: purchase_order_entity::Model,
    pub items: Vec<purchase_order_item_entity::Model>,
}

#[derive(Debug, Serialize)]
pub struct GoodsReceiptWithItems {
    #[serde(flatten)]
    pub receipt: goods_receipt_entity::Model,
    pub items: Vec<goods_receipt_item_entity::Model>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSupplierRequest {
    #[validate(length(min = 1, message = "Supplier name is required"))]
    pub name: String,
    pub contact_person: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub tax_number: Option<String>,
    pub payment_terms: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, message = "Product name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Product code is required"))]
    pub code: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub unit_price: Decimal,
    pub cost_price: Decimal,
    pub min_stock_level: Option<i32>,
    pub max_stock_level: Option<i32>,
    pub unit_of_measure: Option<String>,
    #[serde(default)]
    pub is_service: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateWarehouseRequest {
    #[validate(length(min = 1, message = "Warehouse name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Warehouse code is required"))]
    pub code: String,
    pub location: Option<String>,
}

/// Single entry point for the procurement lifecycle. Mutations run through
/// the command layer; reads go straight to the database.
#[derive(Clone)]
pub struct ProcurementService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl ProcurementService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    // ---- purchase requests ----

    pub async fn create_purchase_request(
        &self,
        cmd: CreatePurchaseRequestCommand,
    ) -> Result<purchase_request_entity::Model, ServiceError> {
        cmd.execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    pub async fn submit_purchase_request(
        &self,
        purchase_request_id: Uuid,
    ) -> Result<purchase_request_entity::Model, ServiceError> {
        SubmitPurchaseRequestCommand {
            purchase_request_id,
        }
        .execute(self.db_pool.clone(), self.event_sender.clone())
        .await
    }

    pub async fn approve_purchase_request(
        &self,
        purchase_request_id: Uuid,
        approved_by: Uuid,
    ) -> Result<purchase_request_entity::Model, ServiceError> {
        ApprovePurchaseRequestCommand {
            purchase_request_id,
            approved_by,
        }
        .execute(self.db_pool.clone(), self.event_sender.clone())
        .await
    }

    pub async fn reject_purchase_request(
        &self,
        purchase_request_id: Uuid,
        rejected_by: Uuid,
        reason: String,
    ) -> Result<purchase_request_entity::Model, ServiceError> {
        RejectPurchaseRequestCommand {
            purchase_request_id,
            rejected_by,
            reason,
        }
        .execute(self.db_pool.clone(), self.event_sender.clone())
        .await
    }

    #[instrument(skip(self))]
    pub async fn get_purchase_request(
        &self,
        id: Uuid,
    ) -> Result<PurchaseRequestWithItems, ServiceError> {
        let request = purchase_request_entity::Entity::find_by_id(id)
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Purchase request {} not found", id)))?;
        let items = purchase_request_item_entity::Entity::find()
            .filter(purchase_request_item_entity::Column::PurchaseRequestId.eq(id))
            .all(self.db_pool.as_ref())
            .await?;
        Ok(PurchaseRequestWithItems { request, items })
    }

    #[instrument(skip(self))]
    pub async fn list_purchase_requests(
        &self,
        status: Option<purchase_request_entity::PurchaseRequestStatus>,
        pagination: Pagination,
    ) -> Result<Page<purchase_request_entity::Model>, ServiceError> {
        let (page, per_page) = pagination.clamp();
        let mut query = purchase_request_entity::Entity::find()
            .order_by_desc(purchase_request_entity::Column::CreatedAt);
        if let Some(status) = status {
            query = query.filter(purchase_request_entity::Column::Status.eq(status));
        }
        let paginator = query.paginate(self.db_pool.as_ref(), per_page);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page).await?;
        Ok(Page {
            items,
            total,
            page: page + 1,
            per_page,
        })
    }

    // ---- purchase orders ----

    pub async fn create_purchase_order(
        &self,
        cmd: CreatePurchaseOrderCommand,
    ) -> Result<purchase_order_entity::Model, ServiceError> {
        cmd.execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    pub async fn update_purchase_order(
        &self,
        cmd: UpdatePurchaseOrderCommand,
    ) -> Result<UpdatePurchaseOrderResult, ServiceError> {
        cmd.execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    pub async fn reject_purchase_order(
        &self,
        purchase_order_id: Uuid,
        rejected_by: Uuid,
        reason: String,
    ) -> Result<purchase_order_entity::Model, ServiceError> {
        RejectPurchaseOrderCommand {
            purchase_order_id,
            rejected_by,
            reason,
        }
        .execute(self.db_pool.clone(), self.event_sender.clone())
        .await
    }

    #[instrument(skip(self))]
    pub async fn get_purchase_order(
        &self,
        id: Uuid,
    ) -> Result<PurchaseOrderWithItems, ServiceError> {
        let order = purchase_order_entity::Entity::find_by_id(id)
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Purchase order {} not found", id)))?;
        let items = purchase_order_item_entity::Entity::find()
            .filter(purchase_order_item_entity::Column::PurchaseOrderId.eq(id))
            .all(self.db_pool.as_ref())
            .await?;
        Ok(PurchaseOrderWithItems { order, items })
    }

    #[instrument(skip(self))]
    pub async fn list_purchase_orders(
        &self,
        status: Option<purchase_order_entity::PurchaseOrderStatus>,
        supplier_id: Option<Uuid>,
        pagination: Pagination,
    ) -> Result<Page<purchase_order_entity::Model>, ServiceError> {
        let (page, per_page) = pagination.clamp();
        let mut query = purchase_order_entity::Entity::find()
            .order_by_desc(purchase_order_entity::Column::OrderDate);
        if let Some(status) = status {
            query = query.filter(purchase_order_entity::Column::Status.eq(status));
        }
        if let Some(supplier_id) = supplier_id {
            query = query.filter(purchase_order_entity::Column::SupplierId.eq(supplier_id));
        }
        let paginator = query.paginate(self.db_pool.as_ref(), per_page);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page).await?;
        Ok(Page {
            items,
            total,
            page: page + 1,
            per_page,
        })
    }

    // ---- goods receipts ----

    pub async fn post_goods_receipt(
        &self,
        cmd: CreateGoodsReceiptCommand,
    ) -> Result<CreateGoodsReceiptResult, ServiceError> {
        cmd.execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_goods_receipt(&self, id: Uuid) -> Result<GoodsReceiptWithItems, ServiceError> {
        let receipt = goods_receipt_entity::Entity::find_by_id(id)
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Goods receipt {} not found", id)))?;
        let items = goods_receipt_item_entity::Entity::find()
            .filter(goods_receipt_item_entity::Column::GoodsReceiptId.eq(id))
            .all(self.db_pool.as_ref())
            .await?;
        Ok(GoodsReceiptWithItems { receipt, items })
    }

    #[instrument(skip(self))]
    pub async fn list_goods_receipts_for_order(
        &self,
        purchase_order_id: Uuid,
    ) -> Result<Vec<goods_receipt_entity::Model>, ServiceError> {
        Ok(goods_receipt_entity::Entity::find()
            .filter(goods_receipt_entity::Column::PurchaseOrderId.eq(purchase_order_id))
            .order_by_desc(goods_receipt_entity::Column::CreatedAt)
            .all(self.db_pool.as_ref())
            .await?)
    }

    // ---- master data ----

    #[instrument(skip(self, req))]
    pub async fn create_supplier(
        &self,
        req: CreateSupplierRequest,
    ) -> Result<supplier_entity::Model, ServiceError> {
        req.validate()?;
        let code = numbering::next_supplier_code(self.db_pool.as_ref()).await?;
        let now = Utc::now();
        Ok(supplier_entity::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(req.name),
            code: Set(code),
            contact_person: Set(req.contact_person),
            email: Set(req.email),
            phone: Set(req.phone),
            address: Set(req.address),
            tax_number: Set(req.tax_number),
            payment_terms: Set(req.payment_terms),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db_pool.as_ref())
        .await?)
    }

    #[instrument(skip(self, req))]
    pub async fn create_product(
        &self,
        req: CreateProductRequest,
    ) -> Result<product_entity::Model, ServiceError> {
        req.validate()?;
        if req.unit_price < Decimal::ZERO || req.cost_price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Prices cannot be negative".to_string(),
            ));
        }
        let taken = product_entity::Entity::find()
            .filter(product_entity::Column::Code.eq(req.code.clone()))
            .count(self.db_pool.as_ref())
            .await?;
        if taken > 0 {
            return Err(ServiceError::Conflict(format!(
                "Product code {} is already in use",
                req.code
            )));
        }
        let sku = numbering::next_sku(self.db_pool.as_ref()).await?;
        let now = Utc::now();
        Ok(product_entity::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(req.name),
            code: Set(req.code),
            sku: Set(sku),
            description: Set(req.description),
            category: Set(req.category),
            unit_price: Set(req.unit_price),
            cost_price: Set(req.cost_price),
            min_stock_level: Set(req.min_stock_level.unwrap_or(0)),
            max_stock_level: Set(req.max_stock_level.unwrap_or(0)),
            unit_of_measure: Set(req.unit_of_measure.unwrap_or_else(|| "EA".to_string())),
            is_service: Set(req.is_service),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db_pool.as_ref())
        .await?)
    }

    #[instrument(skip(self, req))]
    pub async fn create_warehouse(
        &self,
        req: CreateWarehouseRequest,
    ) -> Result<warehouse_entity::Model, ServiceError> {
        req.validate()?;
        let taken = warehouse_entity::Entity::find()
            .filter(warehouse_entity::Column::Code.eq(req.code.clone()))
            .count(self.db_pool.as_ref())
            .await?;
        if taken > 0 {
            return Err(ServiceError::Conflict(format!(
                "Warehouse code {} is already in use",
                req.code
            )));
        }
        Ok(warehouse_entity::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(req.name),
            code: Set(req.code),
            location: Set(req.location),
            is_active: Set(true),
            created_at: Set(Utc::now()),
        }
        .insert(self.db_pool.as_ref())
        .await?)
    }
}
