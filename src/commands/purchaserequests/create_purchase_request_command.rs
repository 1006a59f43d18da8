use crate::{
    commands::Command,
    db::DbPool,
    errors::ServiceError,
    events::{Event, EventSender},
    models::{
        product_entity,
        purchase_request_entity::{self, PurchaseRequestStatus, RequestPriority},
        purchase_request_item_entity::{self, ItemUrgency},
    },
    services::numbering,
};
use chrono::{NaiveDate, Utc};
use lazy_static::lazy_static;
use prometheus::IntCounter;
use rust_decimal::Decimal;
use sea_orm::{Set, *};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

lazy_static! {
    static ref PR_CREATIONS: IntCounter = IntCounter::new(
        "purchase_request_creations_total",
        "Total number of purchase requests created"
    )
    .expect("metric can be created");
    static ref PR_CREATION_FAILURES: IntCounter = IntCounter::new(
        "purchase_request_creation_failures_total",
        "Total number of failed purchase request creations"
    )
    .expect("metric can be created");
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePurchaseRequestCommand {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub description: Option<String>,
    pub priority: RequestPriority,
    pub required_date: NaiveDate,
    pub estimated_budget: Decimal,
    pub department: Option<String>,
    pub cost_center: Option<String>,
    pub requested_by: Uuid,
    #[validate(length(min = 1, message = "At least one item is required"))]
    pub items: Vec<CreatePurchaseRequestItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePurchaseRequestItem {
    pub product_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i32,
    pub unit_price: Option<Decimal>,
    pub specifications: Option<String>,
    pub urgency: ItemUrgency,
}

#[async_trait::async_trait]
impl Command for CreatePurchaseRequestCommand {
    type Result = purchase_request_entity::Model;

    #[instrument(skip(self, db_pool, event_sender))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate().map_err(|e| {
            PR_CREATION_FAILURES.inc();
            let msg = format!("Invalid input: {}", e);
            error!("{}", msg);
            ServiceError::ValidationError(msg)
        })?;
        if self.estimated_budget <= Decimal::ZERO {
            PR_CREATION_FAILURES.inc();
            return Err(ServiceError::ValidationError(
                "Estimated budget must be greater than zero".to_string(),
            ));
        }
        if self.items.iter().any(|i| i.quantity < 1) {
            PR_CREATION_FAILURES.inc();
            return Err(ServiceError::ValidationError(
                "Item quantity must be at least 1".to_string(),
            ));
        }

        let db = db_pool.as_ref();
        let saved = self.create_request(db).await.inspect_err(|_| {
            PR_CREATION_FAILURES.inc();
        })?;

        info!(
            purchase_request_id = %saved.id,
            pr_number = %saved.pr_number,
            items_count = %self.items.len(),
            "Purchase request created"
        );
        event_sender
            .send_or_log(Event::PurchaseRequestCreated(saved.id))
            .await;
        PR_CREATIONS.inc();

        Ok(saved)
    }
}

impl CreatePurchaseRequestCommand {
    async fn create_request(
        &self,
        db: &DatabaseConnection,
    ) -> Result<purchase_request_entity::Model, ServiceError> {
        let cmd = self.clone();

        db.transaction::<_, purchase_request_entity::Model, ServiceError>(move |txn| {
            Box::pin(async move {
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

                let pr_number = numbering::next_pr_number(txn).await?;
                let now = Utc::now();

                let request = purchase_request_entity::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    pr_number: Set(pr_number),
                    title: Set(cmd.title.clone()),
                    description: Set(cmd.description.clone()),
                    priority: Set(cmd.priority),
                    required_date: Set(cmd.required_date),
                    estimated_budget: Set(cmd.estimated_budget),
                    department: Set(cmd.department.clone()),
                    cost_center: Set(cmd.cost_center.clone()),
                    status: Set(PurchaseRequestStatus::Draft),
                    requested_by: Set(cmd.requested_by),
                    approved_by: Set(None),
                    rejection_reason: Set(None),
                    created_at: Set(now),
                    updated_at: Set(now),
                };
                let saved = request.insert(txn).await.map_err(|e| {
                    error!("Failed to create purchase request: {}", e);
                    ServiceError::db_error(e)
                })?;

                for item in &cmd.items {
                    purchase_request_item_entity::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        purchase_request_id: Set(saved.id),
                        product_id: Set(item.product_id),
                        quantity: Set(item.quantity),
                        unit_price: Set(item.unit_price),
                        specifications: Set(item.specifications.clone()),
                        urgency: Set(item.urgency),
                        created_at: Set(now),
                    }
                    .insert(txn)
                    .await
                    .map_err(|e| {
                        error!(
                            "Failed to create item for purchase request {}: {}",
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
