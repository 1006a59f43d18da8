use crate::{
    commands::Command,
    db::DbPool,
    errors::ServiceError,
    events::{Event, EventSender},
    models::{
        asset_entity,
        goods_receipt_entity::{self, QualityCheckStatus},
        goods_receipt_item_entity, inventory_item_entity,
        inventory_transaction_entity::{self, InventoryTransactionType},
        product_entity,
        purchase_order_entity::{self, PurchaseOrderStatus},
        purchase_order_item_entity, warehouse_entity,
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
    static ref GR_CREATIONS: IntCounter = IntCounter::new(
        "goods_receipt_creations_total",
        "Total number of goods receipts posted"
    )
    .expect("metric can be created");
    static ref GR_CREATION_FAILURES: IntCounter = IntCounter::new(
        "goods_receipt_creation_failures_total",
        "Total number of failed goods receipt postings"
    )
    .expect("metric can be created");
}

/// Posts a goods receipt against an ordered purchase order.
///
/// Everything the receipt touches happens in one transaction: the receipt
/// and its lines, stock and audit rows for accepted units, one asset
/// record per accepted unit of an asset line on top of the stock update,
/// the received counters on the order lines, and the order status rollup.
/// If any line fails, nothing is written.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateGoodsReceiptCommand {
    pub purchase_order_id: Uuid,
    pub warehouse_id: Uuid,
    pub receipt_date: NaiveDate,
    pub notes: Option<String>,
    pub received_by: Uuid,
    #[validate(length(min = 1, message = "At least one receipt line is required"))]
    pub lines: Vec<CreateGoodsReceiptLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateGoodsReceiptLine {
    pub purchase_order_item_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity_received: i32,
    #[validate(range(min = 0))]
    pub quantity_accepted: i32,
    #[validate(range(min = 0))]
    pub quantity_rejected: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateGoodsReceiptResult {
    pub goods_receipt: goods_receipt_entity::Model,
    pub purchase_order_status: PurchaseOrderStatus,
    pub assets_created: u32,
}

/// Accepted units of one asset line, ready to be capitalized. Each unit
/// becomes its own asset row so it can be tracked and retired separately.
struct AssetBatch {
    gr_number: String,
    po_number: String,
    goods_receipt_id: Uuid,
    product_id: Uuid,
    product_name: String,
    unit_cost: Decimal,
    count: i32,
}

impl AssetBatch {
    fn active_models(&self, first_sequence: u32) -> Vec<asset_entity::ActiveModel> {
        (0..self.count)
            .map(|offset| asset_entity::ActiveModel {
                id: Set(Uuid::new_v4()),
                asset_number: Set(format!(
                    "{}-A{:03}",
                    self.gr_number,
                    first_sequence + offset as u32
                )),
                name: Set(self.product_name.clone()),
                valuation: Set(self.unit_cost),
                goods_receipt_id: Set(self.goods_receipt_id),
                po_number: Set(self.po_number.clone()),
                product_id: Set(self.product_id),
                status: Set("ACTIVE".to_string()),
                created_at: Set(Utc::now()),
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl Command for CreateGoodsReceiptCommand {
    type Result = CreateGoodsReceiptResult;

    #[instrument(skip(self, db_pool, event_sender))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate().map_err(|e| {
            GR_CREATION_FAILURES.inc();
            let msg = format!("Invalid input: {}", e);
            error!("{}", msg);
            ServiceError::ValidationError(msg)
        })?;
        for line in &self.lines {
            if line.quantity_received < 1
                || line.quantity_accepted < 0
                || line.quantity_rejected < 0
            {
                GR_CREATION_FAILURES.inc();
                return Err(ServiceError::ValidationError(format!(
                    "Line for item {}: quantities must be non-negative and at least one unit received",
                    line.purchase_order_item_id
                )));
            }
            if line.quantity_accepted + line.quantity_rejected > line.quantity_received {
                GR_CREATION_FAILURES.inc();
                return Err(ServiceError::ValidationError(format!(
                    "Line for item {}: accepted {} + rejected {} exceeds received {}",
                    line.purchase_order_item_id,
                    line.quantity_accepted,
                    line.quantity_rejected,
                    line.quantity_received
                )));
            }
        }

        let db = db_pool.as_ref();
        let outcome = match self.post_receipt(db).await {
            Ok(outcome) => outcome,
            Err(e) => {
                GR_CREATION_FAILURES.inc();
                return Err(e);
            }
        };

        info!(
            goods_receipt_id = %outcome.receipt.id,
            gr_number = %outcome.receipt.gr_number,
            purchase_order_id = %outcome.receipt.purchase_order_id,
            po_status = %outcome.po_status,
            assets_created = %outcome.assets_created,
            "Goods receipt posted"
        );
        self.publish_events(&event_sender, &outcome).await;
        GR_CREATIONS.inc();

        Ok(CreateGoodsReceiptResult {
            goods_receipt: outcome.receipt,
            purchase_order_status: outcome.po_status,
            assets_created: outcome.assets_created,
        })
    }
}

struct ReceiptOutcome {
    receipt: goods_receipt_entity::Model,
    po_status: PurchaseOrderStatus,
    previous_po_status: PurchaseOrderStatus,
    stocked: Vec<(Uuid, Uuid, i32)>,
    assets_created: u32,
}

impl CreateGoodsReceiptCommand {
    async fn post_receipt(&self, db: &DatabaseConnection) -> Result<ReceiptOutcome, ServiceError> {
        let cmd = self.clone();

        db.transaction::<_, ReceiptOutcome, ServiceError>(move |txn| {
            Box::pin(async move {
                let order = purchase_order_entity::Entity::find_by_id(cmd.purchase_order_id)
                    .one(txn)
                    .await
                    .map_err(ServiceError::db_error)?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!(
                            "Purchase order {} not found",
                            cmd.purchase_order_id
                        ))
                    })?;
                if !matches!(
                    order.status,
                    PurchaseOrderStatus::Ordered | PurchaseOrderStatus::PartiallyReceived
                ) {
                    return Err(ServiceError::InvalidOperation(format!(
                        "Purchase order {} is {} and cannot receive goods",
                        order.po_number, order.status
                    )));
                }

                let warehouse = warehouse_entity::Entity::find_by_id(cmd.warehouse_id)
                    .one(txn)
                    .await
                    .map_err(ServiceError::db_error)?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!(
                            "Warehouse {} not found",
                            cmd.warehouse_id
                        ))
                    })?;
                if !warehouse.is_active {
                    return Err(ServiceError::InvalidOperation(format!(
                        "Warehouse {} is inactive",
                        warehouse.code
                    )));
                }

                let gr_number = numbering::next_gr_number(txn).await?;
                let any_rejected = cmd.lines.iter().any(|l| l.quantity_rejected > 0);
                let receipt = goods_receipt_entity::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    gr_number: Set(gr_number),
                    purchase_order_id: Set(order.id),
                    warehouse_id: Set(warehouse.id),
                    receipt_date: Set(cmd.receipt_date),
                    quality_check_status: Set(if any_rejected {
                        QualityCheckStatus::Failed
                    } else {
                        QualityCheckStatus::Passed
                    }),
                    notes: Set(cmd.notes.clone()),
                    received_by: Set(cmd.received_by),
                    created_at: Set(Utc::now()),
                }
                .insert(txn)
                .await
                .map_err(ServiceError::db_error)?;

                let mut stocked = Vec::new();
                let mut assets_created: u32 = 0;
                let mut asset_sequence: u32 = 1;

                for line in &cmd.lines {
                    let po_item =
                        purchase_order_item_entity::Entity::find_by_id(line.purchase_order_item_id)
                            .one(txn)
                            .await
                            .map_err(ServiceError::db_error)?
                            .ok_or_else(|| {
                                ServiceError::NotFound(format!(
                                    "Purchase order item {} not found",
                                    line.purchase_order_item_id
                                ))
                            })?;
                    if po_item.purchase_order_id != order.id {
                        return Err(ServiceError::InvalidOperation(format!(
                            "Item {} does not belong to purchase order {}",
                            po_item.id, order.po_number
                        )));
                    }

                    let outstanding = po_item.quantity - po_item.received_quantity;
                    if line.quantity_accepted > outstanding {
                        return Err(ServiceError::InvalidOperation(format!(
                            "Cannot accept {} of item {}: only {} outstanding",
                            line.quantity_accepted, po_item.id, outstanding
                        )));
                    }

                    let unit_cost = po_item.unit_price;
                    goods_receipt_item_entity::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        goods_receipt_id: Set(receipt.id),
                        purchase_order_item_id: Set(po_item.id),
                        product_id: Set(po_item.product_id),
                        quantity_received: Set(line.quantity_received),
                        quantity_accepted: Set(line.quantity_accepted),
                        quantity_rejected: Set(line.quantity_rejected),
                        unit_cost: Set(unit_cost),
                        total_cost: Set(unit_cost * Decimal::from(line.quantity_received)),
                        created_at: Set(Utc::now()),
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                    if line.quantity_accepted > 0 {
                        let product = product_entity::Entity::find_by_id(po_item.product_id)
                            .one(txn)
                            .await
                            .map_err(ServiceError::db_error)?
                            .ok_or_else(|| {
                                ServiceError::NotFound(format!(
                                    "Product {} not found",
                                    po_item.product_id
                                ))
                            })?;

                        if !product.is_service {
                            stock_in(
                                txn,
                                product.id,
                                warehouse.id,
                                line.quantity_accepted,
                                receipt.id,
                            )
                            .await?;
                            stocked.push((product.id, warehouse.id, line.quantity_accepted));
                        }

                        if po_item.is_asset {
                            let batch = AssetBatch {
                                gr_number: receipt.gr_number.clone(),
                                po_number: order.po_number.clone(),
                                goods_receipt_id: receipt.id,
                                product_id: product.id,
                                product_name: product.name.clone(),
                                unit_cost,
                                count: line.quantity_accepted,
                            };
                            for asset in batch.active_models(asset_sequence) {
                                asset.insert(txn).await.map_err(ServiceError::db_error)?;
                            }
                            asset_sequence += line.quantity_accepted as u32;
                            assets_created += line.quantity_accepted as u32;
                        }
                    }

                    let mut item_active: purchase_order_item_entity::ActiveModel =
                        po_item.clone().into();
                    item_active.received_quantity =
                        Set(po_item.received_quantity + line.quantity_accepted);
                    item_active.update(txn).await.map_err(ServiceError::db_error)?;
                }

                let po_status = rollup_status(txn, order.id).await?;
                let previous_po_status = order.status;
                if po_status != order.status {
                    let mut order_active: purchase_order_entity::ActiveModel = order.into();
                    order_active.status = Set(po_status);
                    order_active.updated_at = Set(Utc::now());
                    order_active.update(txn).await.map_err(ServiceError::db_error)?;
                }

                Ok(ReceiptOutcome {
                    receipt,
                    po_status,
                    previous_po_status,
                    stocked,
                    assets_created,
                })
            })
        })
        .await
        .map_err(|e| match e {
            TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
            TransactionError::Transaction(service_err) => service_err,
        })
    }

    async fn publish_events(&self, event_sender: &EventSender, outcome: &ReceiptOutcome) {
        event_sender
            .send_or_log(Event::GoodsReceiptCreated {
                goods_receipt_id: outcome.receipt.id,
                purchase_order_id: outcome.receipt.purchase_order_id,
            })
            .await;
        for (product_id, warehouse_id, quantity) in &outcome.stocked {
            event_sender
                .send_or_log(Event::InventoryReceived {
                    product_id: *product_id,
                    warehouse_id: *warehouse_id,
                    quantity: *quantity,
                })
                .await;
        }
        if outcome.assets_created > 0 {
            event_sender
                .send_or_log(Event::AssetsCapitalized {
                    goods_receipt_id: outcome.receipt.id,
                    count: outcome.assets_created,
                })
                .await;
        }
        if outcome.po_status != outcome.previous_po_status {
            event_sender
                .send_or_log(Event::PurchaseOrderStatusChanged {
                    purchase_order_id: outcome.receipt.purchase_order_id,
                    old_status: outcome.previous_po_status,
                    new_status: outcome.po_status,
                })
                .await;
        }
    }
}

/// Adds accepted stock to the warehouse bucket for the product, creating
/// the bucket on first receipt, and writes the matching audit row.
async fn stock_in<C: ConnectionTrait>(
    txn: &C,
    product_id: Uuid,
    warehouse_id: Uuid,
    quantity: i32,
    goods_receipt_id: Uuid,
) -> Result<(), ServiceError> {
    let existing = inventory_item_entity::Entity::find()
        .filter(inventory_item_entity::Column::ProductId.eq(product_id))
        .filter(inventory_item_entity::Column::WarehouseId.eq(warehouse_id))
        .one(txn)
        .await
        .map_err(ServiceError::db_error)?;

    let inventory_item_id = match existing {
        Some(item) => {
            let id = item.id;
            let mut active: inventory_item_entity::ActiveModel = item.clone().into();
            active.quantity = Set(item.quantity + quantity);
            active.available_quantity = Set(item.available_quantity + quantity);
            active.updated_at = Set(Utc::now());
            active.update(txn).await.map_err(ServiceError::db_error)?;
            id
        }
        None => {
            let created = inventory_item_entity::ActiveModel {
                id: Set(Uuid::new_v4()),
                product_id: Set(product_id),
                warehouse_id: Set(warehouse_id),
                quantity: Set(quantity),
                available_quantity: Set(quantity),
                reserved_quantity: Set(0),
                updated_at: Set(Utc::now()),
            }
            .insert(txn)
            .await
            .map_err(ServiceError::db_error)?;
            created.id
        }
    };

    inventory_transaction_entity::ActiveModel {
        id: Set(Uuid::new_v4()),
        inventory_item_id: Set(inventory_item_id),
        transaction_type: Set(InventoryTransactionType::In),
        quantity: Set(quantity),
        reference_type: Set("GOODS_RECEIPT".to_string()),
        reference_id: Set(goods_receipt_id),
        created_at: Set(Utc::now()),
    }
    .insert(txn)
    .await
    .map_err(ServiceError::db_error)?;

    Ok(())
}

/// Recomputes the order status from its lines after a receipt: fully
/// received when every line is complete, partially received when anything
/// has arrived at all.
async fn rollup_status<C: ConnectionTrait>(
    txn: &C,
    purchase_order_id: Uuid,
) -> Result<PurchaseOrderStatus, ServiceError> {
    let items = purchase_order_item_entity::Entity::find()
        .filter(purchase_order_item_entity::Column::PurchaseOrderId.eq(purchase_order_id))
        .all(txn)
        .await
        .map_err(ServiceError::db_error)?;

    if !items.is_empty() && items.iter().all(|i| i.received_quantity >= i.quantity) {
        Ok(PurchaseOrderStatus::Received)
    } else if items.iter().any(|i| i.received_quantity > 0) {
        Ok(PurchaseOrderStatus::PartiallyReceived)
    } else {
        Ok(PurchaseOrderStatus::Ordered)
    }
}
