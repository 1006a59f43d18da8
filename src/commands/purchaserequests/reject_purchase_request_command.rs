use crate::{
    commands::Command,
    db::DbPool,
    errors::ServiceError,
    events::{Event, EventSender},
    models::purchase_request_entity::{self, PurchaseRequestStatus},
};
use chrono::Utc;
use sea_orm::{Set, *};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Rejection always carries a reason; a blank reason is useless to the
/// requester and is refused before anything is loaded.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct RejectPurchaseRequestCommand {
    pub purchase_request_id: Uuid,
    pub rejected_by: Uuid,
    #[validate(length(min = 1, message = "Rejection reason is required"))]
    pub reason: String,
}

#[async_trait::async_trait]
impl Command for RejectPurchaseRequestCommand {
    type Result = purchase_request_entity::Model;

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

                    if !request.status.is_pending_approval() {
                        return Err(ServiceError::InvalidOperation(format!(
                            "Purchase request {} is {:?} and cannot be rejected",
                            request.pr_number, request.status
                        )));
                    }

                    let mut active: purchase_request_entity::ActiveModel = request.into();
                    active.status = Set(PurchaseRequestStatus::Rejected);
                    active.rejection_reason = Set(Some(reason));
                    active.updated_at = Set(Utc::now());
                    active.update(txn).await.map_err(|e| {
                        error!("Failed to reject purchase request {}: {}", id, e);
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
            rejected_by = %self.rejected_by,
            "Purchase request rejected"
        );
        event_sender
            .send_or_log(Event::PurchaseRequestRejected(updated.id))
            .await;

        Ok(updated)
    }
}
