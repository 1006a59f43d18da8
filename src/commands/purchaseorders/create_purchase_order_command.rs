use crate::{
    commands::Command,
    db::DbPool,
    errors::ServiceError,
    events::{Event, EventSender},
    models::{
        product_entity,
        purchase_order_entity::{self, PurchaseOrderStatus},
        purchase_order_item_entity,
        purchase_request_entity::{self, PurchaseRequestStatus},
        supplier_entity,
    },
    services::numbering,
};
use chrono::{NaiveDate, Utc};
use lazy_static::lazy_static;
use prometheus::IntCounter;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{Set, *};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

lazy_static! {
    static ref PO_CREATIONS: IntCounter = IntCounter::new(
        "purchase_order_creations_total",
        "Total number of purchase orders created"
    )
    .expect("metric can be created");
    static ref PO_CREATION_FAILURES: IntCounter = IntCounter::new(
        "purchase_order_creation_failures_total",
        "Total number of failed purchase order creations"
    )
    .expect("metric can be created");
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePurchaseOrderCommand {
    pub supplier_id: Uuid,
    /// When set, the source request is marked approved in the same
    /// transaction that creates the order.
    pub purchase_request_id: Option<Uuid>,
    pub expected_delivery_date: Option<NaiveDate>,
    pub payment_terms: Option<String>,
    pub delivery_terms: Option<String>,
    #[validate(length(min = 3, max = 3, message = "Currency must be an ISO 4217 code"))]
    pub currency: String,
    pub exchange_rate: Option<Decimal>,
    pub notes: Option<String>,
    pub created_by: Uuid,
    #[validate(length(min = 1, message = "At least one item is required"))]
    pub items: Vec<CreatePurchaseOrderItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePurchaseOrderItem {
    pub product_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i32,
    pub unit_price: Decimal,
    pub is_asset: bool,
    pub specifications: Option<String>,
}

impl CreatePurchaseOrderCommand {
    fn grand_total(&self) -> Decimal {
        self.items
            .iter()
            .map(|i| i.unit_price * Decimal::from(i.quantity))
            .sum()
    }
}

#[async_trait::async_trait]
impl Command for CreatePurchaseOrderCommand {
    type Result = purchase_order_entity::Model;

    #[instrument(skip(self, db_pool, event_sender))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate().map_err(|e| {
            PO_CREATION_FAILURES.inc();
            let msg = format!("Invalid input: {}", e);
            error!("{}", msg);
            ServiceError::ValidationError(msg)
        })?;
        if self.items.iter().any(|i| i.quantity < 1) {
            PO_CREATION_FAILURES.inc();
            return Err(ServiceError::ValidationError(
                "Item quantity must be at least 1".to_string(),
            ));
        }
        if self.items.iter().any(|i| i.unit_price < Decimal::ZERO) {
            PO_CREATION_FAILURES.inc();
            return Err(ServiceError::ValidationError(
                "Item unit price cannot be negative".to_string(),
            ));
        }

        let db = db_pool.as_ref();
        let saved = match self.create_order(db).await {
            Ok(saved) => saved,
            Err(e) => {
                PO_CREATION_FAILURES.inc();
                return Err(e);
            }
        };

        info!(
            purchase_order_id = %saved.id,
            po_number = %saved.po_number,
            supplier_id = %saved.supplier_id,
            grand_total = %saved.grand_total,
            "Purchase order created"
        );
        event_sender
            .send_or_log(Event::PurchaseOrderCreated(saved.id))
            .await;
        PO_CREATIONS.inc();

        Ok(saved)
    }
}

impl CreatePurchaseOrderCommand {
    async fn create_order(
        &self,
        db: &DatabaseConnection,
    ) -> Result<purchase_order_entity::Model, ServiceError> {
        let cmd = self.clone();
        let grand_total = self.grand_total();

        db.transaction::<_, purchase_order_entity::Model, ServiceError>(move |txn| {
            Box::pin(async move {
                let supplier = supplier_entity::Entity::find_by_id(cmd.supplier_id)
                    .one(txn)
                    .await
                    .map_err(ServiceError::db_error)?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("Supplier {} not found", cmd.supplier_id))
                    })?;
                if !supplier.is_active {
                    return Err(ServiceError::InvalidOperation(format!(
                        "Supplier {} is inactive",
                        supplier.code
                    )));
                }

                if let Some(pr_id) = cmd.purchase_request_id {
                    let request = purchase_request_entity::Entity::find_by_id(pr_id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!(
                                "Purchase request {} not found",
                                pr_id
                            ))
                        })?;
                    if !request.status.is_active() {
                        return Err(ServiceError::InvalidOperation(format!(
                            "Purchase request {} is {:?} and cannot be converted",
                            request.pr_number, request.status
                        )));
                    }
                    if request.status != PurchaseRequestStatus::Approved {
                        let mut active: purchase_request_entity::ActiveModel = request.into();
                        active.status = Set(PurchaseRequestStatus::Approved);
                        active.approved_by = Set(Some(cmd.created_by));
                        active.updated_at = Set(Utc::now());
                        active.update(txn).await.map_err(ServiceError::db_error)?;
                    }
                }

                for item in &cmd.items {
                    let exists = product_entity::Entity::find_by_id(item.product_id)
                        .count(txn)
                        .await
                        .map_err(ServiceError::db_error)?;
                    if exists == 0 {
                        return Err(ServiceError::NotFound(format!(
                            "Product {} not found",
                            item.product_id
                        )));
                    }
                }

                let po_number = numbering::next_po_number(txn).await?;
                let now = Utc::now();

                let order = purchase_order_entity::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    po_number: Set(po_number),
                    supplier_id: Set(cmd.supplier_id),
                    purchase_request_id: Set(cmd.purchase_request_id),
                    status: Set(PurchaseOrderStatus::Draft),
                    order_date: Set(now),
                    expected_delivery_date: Set(cmd.expected_delivery_date),
                    payment_terms: Set(cmd
                        .payment_terms
                        .clone()
                        .or_else(|| supplier.payment_terms.clone())),
                    delivery_terms: Set(cmd.delivery_terms.clone()),
                    currency: Set(cmd.currency.clone()),
                    exchange_rate: Set(cmd.exchange_rate.unwrap_or(dec!(1))),
                    grand_total: Set(grand_total),
                    notes: Set(cmd.notes.clone()),
                    rejection_reason: Set(None),
                    rejected_by: Set(None),
                    rejected_at: Set(None),
                    created_by: Set(cmd.created_by),
                    created_at: Set(now),
                    updated_at: Set(now),
                };
                let saved = order.insert(txn).await.map_err(|e| {
                    error!(
                        "Failed to create purchase order for supplier {}: {}",
                        cmd.supplier_id, e
                    );
                    ServiceError::db_error(e)
                })?;

                for item in &cmd.items {
                    purchase_order_item_entity::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        purchase_order_id: Set(saved.id),
                        product_id: Set(item.product_id),
                        quantity: Set(item.quantity),
                        unit_price: Set(item.unit_price),
                        total_price: Set(item.unit_price * Decimal::from(item.quantity)),
                        is_asset: Set(item.is_asset),
                        specifications: Set(item.specifications.clone()),
                        received_quantity: Set(0),
                        created_at: Set(now),
                    }
                    .insert(txn)
                    .await
                    .map_err(|e| {
                        error!(
                            "Failed to create item for purchase order {}: {}",
                            saved.id, e
                        );
                        ServiceError::db_error(e)
                    })?;
                }

                Ok(saved)
            })
        })
        .await
        .map_err(|e| match e {
            TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
            TransactionError::Transaction(service_err) => service_err,
        })
    }
}
