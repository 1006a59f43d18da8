use crate::{
    commands::Command,
    db::DbPool,
    errors::ServiceError,
    events::{Event, EventSender},
    models::{
        product_entity,
        purchase_order_entity::{self, PurchaseOrderStatus},
        purchase_order_item_entity,
    },
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{Set, *};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::create_purchase_order_command::CreatePurchaseOrderItem;

/// Revises an order and walks it one step along the approval chain.
///
/// Every successful update advances the status: a draft becomes submitted,
/// a submitted order approved, an approved order ordered. Once the order
/// is with the supplier (or terminal) it can no longer be updated here;
/// receiving drives the remaining statuses.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdatePurchaseOrderCommand {
    pub purchase_order_id: Uuid,
    /// Full replacement for the item list when present.
    pub items: Option<Vec<CreatePurchaseOrderItem>>,
    pub expected_delivery_date: Option<NaiveDate>,
    pub payment_terms: Option<String>,
    pub delivery_terms: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdatePurchaseOrderResult {
    pub purchase_order: purchase_order_entity::Model,
    pub previous_status: PurchaseOrderStatus,
}

#[async_trait::async_trait]
impl Command for UpdatePurchaseOrderCommand {
    type Result = UpdatePurchaseOrderResult;

    #[instrument(skip(self, db_pool, event_sender))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        if let Some(items) = &self.items {
            if items.is_empty() {
                return Err(ServiceError::ValidationError(
                    "Replacement item list cannot be empty".to_string(),
                ));
            }
            for item in items {
                item.validate()
                    .map_err(|e| ServiceError::ValidationError(format!("Invalid item: {}", e)))?;
                if item.unit_price < Decimal::ZERO {
                    return Err(ServiceError::ValidationError(
                        "Item unit price cannot be negative".to_string(),
                    ));
                }
            }
        }

        let db = db_pool.as_ref();
        let cmd = self.clone();

        let (updated, previous_status) = db
            .transaction::<_, (purchase_order_entity::Model, PurchaseOrderStatus), ServiceError>(
                move |txn| {
                    Box::pin(async move {
                        let order =
                            purchase_order_entity::Entity::find_by_id(cmd.purchase_order_id)
                                .one(txn)
                                .await
                                .map_err(ServiceError::db_error)?
                                .ok_or_else(|| {
                                    ServiceError::NotFound(format!(
                                        "Purchase order {} not found",
                                        cmd.purchase_order_id
                                    ))
                                })?;

                        if !order.status.is_editable() {
                            return Err(ServiceError::InvalidOperation(format!(
                                "Purchase order {} is {} and can no longer be updated",
                                order.po_number, order.status
                            )));
                        }

                        let previous_status = order.status;
                        let mut grand_total = order.grand_total;

                        if let Some(items) = &cmd.items {
                            for item in items {
                                let exists =
                                    product_entity::Entity::find_by_id(item.product_id)
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

                            purchase_order_item_entity::Entity::delete_many()
                                .filter(
                                    purchase_order_item_entity::Column::PurchaseOrderId
                                        .eq(order.id),
                                )
                                .exec(txn)
                                .await
                                .map_err(ServiceError::db_error)?;

                            grand_total = Decimal::ZERO;
                            for item in items {
                                let total_price =
                                    item.unit_price * Decimal::from(item.quantity);
                                grand_total += total_price;
                                purchase_order_item_entity::ActiveModel {
                                    id: Set(Uuid::new_v4()),
                                    purchase_order_id: Set(order.id),
                                    product_id: Set(item.product_id),
                                    quantity: Set(item.quantity),
                                    unit_price: Set(item.unit_price),
                                    total_price: Set(total_price),
                                    is_asset: Set(item.is_asset),
                                    specifications: Set(item.specifications.clone()),
                                    received_quantity: Set(0),
                                    created_at: Set(Utc::now()),
                                }
                                .insert(txn)
                                .await
                                .map_err(|e| {
                                    error!(
                                        "Failed to replace item on purchase order {}: {}",
                                        order.id, e
                                    );
                                    ServiceError::db_error(e)
                                })?;
                            }
                        }

                        let next_status = order.status.next();
                        let mut active: purchase_order_entity::ActiveModel = order.into();
                        active.status = Set(next_status);
                        active.grand_total = Set(grand_total);
                        if cmd.expected_delivery_date.is_some() {
                            active.expected_delivery_date = Set(cmd.expected_delivery_date);
                        }
                        if cmd.payment_terms.is_some() {
                            active.payment_terms = Set(cmd.payment_terms.clone());
                        }
                        if cmd.delivery_terms.is_some() {
                            active.delivery_terms = Set(cmd.delivery_terms.clone());
                        }
                        if cmd.notes.is_some() {
                            active.notes = Set(cmd.notes.clone());
                        }
                        active.updated_at = Set(Utc::now());

                        let updated = active.update(txn).await.map_err(|e| {
                            error!(
                                "Failed to update purchase order {}: {}",
                                cmd.purchase_order_id, e
                            );
                            ServiceError::db_error(e)
                        })?;

                        Ok((updated, previous_status))
                    })
                },
            )
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        info!(
            purchase_order_id = %updated.id,
            po_number = %updated.po_number,
            old_status = %previous_status,
            new_status = %updated.status,
            "Purchase order updated"
        );
        if updated.status != previous_status {
            event_sender
                .send_or_log(Event::PurchaseOrderStatusChanged {
                    purchase_order_id: updated.id,
                    old_status: previous_status,
                    new_status: updated.status,
                })
                .await;
        }

        Ok(UpdatePurchaseOrderResult {
            purchase_order: updated,
            previous_status,
        })
    }
}
