use crate::{
    commands::Command,
    db::DbPool,
    errors::ServiceError,
    events::{Event, EventSender},
    models::purchase_order_entity::{self, PurchaseOrderStatus},
};
use chrono::Utc;
use sea_orm::{Set, *};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Rejection only applies while the order is awaiting approval;
/// the reason is mandatory and stored on the order.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct RejectPurchaseOrderCommand {
    pub purchase_order_id: Uuid,
    pub rejected_by: Uuid,
    #[validate(length(min = 1, message = "Rejection reason is required"))]
    pub reason: String,
}

#[async_trait::async_trait]
impl Command for RejectPurchaseOrderCommand {
    type Result = purchase_order_entity::Model;

    #[instrument(skip(self, db_pool, event_sender))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let reason = self.reason.trim().to_string();
        if reason.is_empty() {
            return Err(ServiceError::ValidationError(
                "Rejection reason is required".to_string(),
            ));
        }

        let db = db_pool.as_ref();
        let id = self.purchase_order_id;
        let rejected_by = self.rejected_by;

        let updated = db
            .transaction::<_, purchase_order_entity::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let order = purchase_order_entity::Entity::find_by_id(id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Purchase order {} not found", id))
                        })?;

                    if order.status != PurchaseOrderStatus::Submitted {
                        return Err(ServiceError::InvalidOperation(format!(
                            "Purchase order {} is {} and cannot be rejected",
                            order.po_number, order.status
                        )));
                    }

                    let mut active: purchase_order_entity::ActiveModel = order.into();
                    active.status = Set(PurchaseOrderStatus::Rejected);
                    active.rejection_reason = Set(Some(reason));
                    active.rejected_by = Set(Some(rejected_by));
                    active.rejected_at = Set(Some(Utc::now()));
                    active.updated_at = Set(Utc::now());
                    active.update(txn).await.map_err(|e| {
                        error!("Failed to reject purchase order {}: {}", id, e);
                        ServiceError::db_error(e)
                    })
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        info!(
            purchase_order_id = %updated.id,
            po_number = %updated.po_number,
            rejected_by = %rejected_by,
            "Purchase order rejected"
        );
        event_sender
            .send_or_log(Event::PurchaseOrderRejected(updated.id))
            .await;

        Ok(updated)
    }
}
