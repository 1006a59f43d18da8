use crate::{
    commands::Command,
    db::DbPool,
    errors::ServiceError,
    events::{Event, EventSender},
    models::{
        purchase_request_entity::{self, PurchaseRequestStatus},
        purchase_request_item_entity,
    },
};
use chrono::Utc;
use sea_orm::{Set, *};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Moves a draft request into the approval queue. A request with no items
/// has nothing to approve and is rejected up front.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct SubmitPurchaseRequestCommand {
    pub purchase_request_id: Uuid,
}

#[async_trait::async_trait]
impl Command for SubmitPurchaseRequestCommand {
    type Result = purchase_request_entity::Model;

    #[instrument(skip(self, db_pool, event_sender))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let db = db_pool.as_ref();
        let id = self.purchase_request_id;

        let updated = db
            .transaction::<_, purchase_request_entity::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let request = purchase_request_entity::Entity::find_by_id(id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Purchase request {} not found", id))
                        })?;

                    if request.status != PurchaseRequestStatus::Draft {
                        return Err(ServiceError::InvalidOperation(format!(
                            "Purchase request {} is {:?} and cannot be submitted",
                            request.pr_number, request.status
                        )));
                    }

                    let item_count = purchase_request_item_entity::Entity::find()
                        .filter(
                            purchase_request_item_entity::Column::PurchaseRequestId.eq(id),
                        )
                        .count(txn)
                        .await
                        .map_err(ServiceError::db_error)?;
                    if item_count == 0 {
                        return Err(ServiceError::InvalidOperation(format!(
                            "Purchase request {} has no items",
                            request.pr_number
                        )));
                    }

                    let mut active: purchase_request_entity::ActiveModel = request.into();
                    active.status = Set(PurchaseRequestStatus::Submitted);
                    active.updated_at = Set(Utc::now());
                    active.update(txn).await.map_err(|e| {
                        error!("Failed to submit purchase request {}: {}", id, e);
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
            purchase_request_id = %updated.id,
            pr_number = %updated.pr_number,
            "Purchase request submitted for approval"
        );
        event_sender
            .send_or_log(Event::PurchaseRequestSubmitted(updated.id))
            .await;

        Ok(updated)
    }
}
