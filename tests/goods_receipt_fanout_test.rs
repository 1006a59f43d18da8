mod common;

use assert_matches::assert_matches;
use chrono::Utc;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

use ngs_procurement::{
    commands::{
        goodsreceipts::{CreateGoodsReceiptCommand, CreateGoodsReceiptLine},
        purchaseorders::{
            CreatePurchaseOrderCommand, CreatePurchaseOrderItem, UpdatePurchaseOrderCommand,
        },
    },
    errors::ServiceError,
    models::{
        asset_entity,
        goods_receipt_entity::QualityCheckStatus,
        goods_receipt_item_entity, inventory_item_entity, inventory_transaction_entity,
        purchase_order_entity::{self, PurchaseOrderStatus},
        purchase_order_item_entity,
    },
};

use common::TestCtx;

/// Creates an order with the given lines and drives it to ORDERED.
async fn ordered_po(
    ctx: &TestCtx,
    supplier_id: Uuid,
    items: Vec<CreatePurchaseOrderItem>,
) -> purchase_order_entity::Model {
    let order = ctx
        .procurement
        .create_purchase_order(CreatePurchaseOrderCommand {
            supplier_id,
            purchase_request_id: None,
            expected_delivery_date: None,
            payment_terms: None,
            delivery_terms: None,
            currency: "USD".to_string(),
            exchange_rate: None,
            notes: None,
            created_by: Uuid::new_v4(),
            items,
        })
        .await
        .unwrap();
    for _ in 0..3 {
        ctx.procurement
            .update_purchase_order(UpdatePurchaseOrderCommand {
                purchase_order_id: order.id,
                items: None,
                expected_delivery_date: None,
                payment_terms: None,
                delivery_terms: None,
                notes: None,
            })
            .await
            .unwrap();
    }
    purchase_order_entity::Entity::find_by_id(order.id)
        .one(ctx.db.as_ref())
        .await
        .unwrap()
        .unwrap()
}

async fn order_items(
    ctx: &TestCtx,
    purchase_order_id: Uuid,
) -> Vec<purchase_order_item_entity::Model> {
    purchase_order_item_entity::Entity::find()
        .filter(purchase_order_item_entity::Column::PurchaseOrderId.eq(purchase_order_id))
        .all(ctx.db.as_ref())
        .await
        .unwrap()
}

#[tokio::test]
async fn partial_receipt_updates_stock_counters_and_order_status() {
    let ctx = TestCtx::new().await;
    let supplier = ctx.seed_supplier("NGSP-001", true).await;
    let product = ctx.seed_product("NGS-001", dec!(25), false).await;
    let warehouse = ctx.seed_warehouse("WH-01", true).await;

    let order = ordered_po(
        &ctx,
        supplier.id,
        vec![CreatePurchaseOrderItem {
            product_id: product.id,
            quantity: 10,
            unit_price: dec!(25),
            is_asset: false,
            specifications: None,
        }],
    )
    .await;
    assert_eq!(order.status, PurchaseOrderStatus::Ordered);
    let item = &order_items(&ctx, order.id).await[0];

    let result = ctx
        .procurement
        .post_goods_receipt(CreateGoodsReceiptCommand {
            purchase_order_id: order.id,
            warehouse_id: warehouse.id,
            receipt_date: Utc::now().date_naive(),
            notes: None,
            received_by: Uuid::new_v4(),
            lines: vec![CreateGoodsReceiptLine {
                purchase_order_item_id: item.id,
                quantity_received: 5,
                quantity_accepted: 4,
                quantity_rejected: 1,
            }],
        })
        .await
        .unwrap();

    assert!(result.goods_receipt.gr_number.starts_with("GR-"));
    assert_eq!(
        result.goods_receipt.quality_check_status,
        QualityCheckStatus::Failed
    );
    assert_eq!(result.purchase_order_status, PurchaseOrderStatus::PartiallyReceived);
    assert_eq!(result.assets_created, 0);

    // Receipt line records the delivered quantity at the order's price.
    let gr_item = goods_receipt_item_entity::Entity::find()
        .filter(goods_receipt_item_entity::Column::GoodsReceiptId.eq(result.goods_receipt.id))
        .one(ctx.db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(gr_item.quantity_accepted, 4);
    assert_eq!(gr_item.total_cost, dec!(125));

    // Only accepted units enter stock, with a matching audit row.
    let stock = inventory_item_entity::Entity::find()
        .filter(inventory_item_entity::Column::ProductId.eq(product.id))
        .one(ctx.db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stock.quantity, 4);
    assert_eq!(stock.available_quantity, 4);
    assert_eq!(stock.reserved_quantity, 0);

    let movement = inventory_transaction_entity::Entity::find()
        .filter(inventory_transaction_entity::Column::InventoryItemId.eq(stock.id))
        .one(ctx.db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(movement.quantity, 4);
    assert_eq!(movement.reference_id, result.goods_receipt.id);

    let item = &order_items(&ctx, order.id).await[0];
    assert_eq!(item.received_quantity, 4);
}

#[tokio::test]
async fn completing_all_lines_marks_the_order_received() {
    let ctx = TestCtx::new().await;
    let supplier = ctx.seed_supplier("NGSP-001", true).await;
    let product = ctx.seed_product("NGS-001", dec!(10), false).await;
    let warehouse = ctx.seed_warehouse("WH-01", true).await;

    let order = ordered_po(
        &ctx,
        supplier.id,
        vec![CreatePurchaseOrderItem {
            product_id: product.id,
            quantity: 6,
            unit_price: dec!(10),
            is_asset: false,
            specifications: None,
        }],
    )
    .await;
    let item_id = order_items(&ctx, order.id).await[0].id;

    for accepted in [4, 2] {
        ctx.procurement
            .post_goods_receipt(CreateGoodsReceiptCommand {
                purchase_order_id: order.id,
                warehouse_id: warehouse.id,
                receipt_date: Utc::now().date_naive(),
                notes: None,
                received_by: Uuid::new_v4(),
                lines: vec![CreateGoodsReceiptLine {
                    purchase_order_item_id: item_id,
                    quantity_received: accepted,
                    quantity_accepted: accepted,
                    quantity_rejected: 0,
                }],
            })
            .await
            .unwrap();
    }

    let reloaded = purchase_order_entity::Entity::find_by_id(order.id)
        .one(ctx.db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.status, PurchaseOrderStatus::Received);

    // Stock accumulated across both receipts into one bucket.
    let stock = inventory_item_entity::Entity::find()
        .filter(inventory_item_entity::Column::ProductId.eq(product.id))
        .all(ctx.db.as_ref())
        .await
        .unwrap();
    assert_eq!(stock.len(), 1);
    assert_eq!(stock[0].quantity, 6);
}

#[tokio::test]
async fn accepted_asset_units_are_capitalized_one_row_each() {
    let ctx = TestCtx::new().await;
    let supplier = ctx.seed_supplier("NGSP-001", true).await;
    let machine = ctx.seed_product("NGS-002", dec!(5000), false).await;
    let warehouse = ctx.seed_warehouse("WH-01", true).await;

    let order = ordered_po(
        &ctx,
        supplier.id,
        vec![CreatePurchaseOrderItem {
            product_id: machine.id,
            quantity: 3,
            unit_price: dec!(4800),
            is_asset: true,
            specifications: None,
        }],
    )
    .await;
    let item_id = order_items(&ctx, order.id).await[0].id;

    let result = ctx
        .procurement
        .post_goods_receipt(CreateGoodsReceiptCommand {
            purchase_order_id: order.id,
            warehouse_id: warehouse.id,
            receipt_date: Utc::now().date_naive(),
            notes: None,
            received_by: Uuid::new_v4(),
            lines: vec![CreateGoodsReceiptLine {
                purchase_order_item_id: item_id,
                quantity_received: 3,
                quantity_accepted: 3,
                quantity_rejected: 0,
            }],
        })
        .await
        .unwrap();
    assert_eq!(result.assets_created, 3);

    let assets = asset_entity::Entity::find()
        .filter(asset_entity::Column::GoodsReceiptId.eq(result.goods_receipt.id))
        .all(ctx.db.as_ref())
        .await
        .unwrap();
    assert_eq!(assets.len(), 3);
    for asset in &assets {
        assert_eq!(asset.valuation, dec!(4800));
        assert_eq!(asset.po_number, order.po_number);
        assert!(asset.asset_number.starts_with(&result.goods_receipt.gr_number));
    }

    // Capitalized units still enter warehouse stock like any other goods.
    let stock = inventory_item_entity::Entity::find()
        .filter(inventory_item_entity::Column::ProductId.eq(machine.id))
        .one(ctx.db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stock.quantity, 3);
    assert_eq!(stock.available_quantity, 3);
}

#[tokio::test]
async fn over_receipt_is_refused_and_nothing_is_written() {
    let ctx = TestCtx::new().await;
    let supplier = ctx.seed_supplier("NGSP-001", true).await;
    let product = ctx.seed_product("NGS-001", dec!(10), false).await;
    let warehouse = ctx.seed_warehouse("WH-01", true).await;

    let order = ordered_po(
        &ctx,
        supplier.id,
        vec![CreatePurchaseOrderItem {
            product_id: product.id,
            quantity: 5,
            unit_price: dec!(10),
            is_asset: false,
            specifications: None,
        }],
    )
    .await;
    let item_id = order_items(&ctx, order.id).await[0].id;

    let err = ctx
        .procurement
        .post_goods_receipt(CreateGoodsReceiptCommand {
            purchase_order_id: order.id,
            warehouse_id: warehouse.id,
            receipt_date: Utc::now().date_naive(),
            notes: None,
            received_by: Uuid::new_v4(),
            lines: vec![CreateGoodsReceiptLine {
                purchase_order_item_id: item_id,
                quantity_received: 8,
                quantity_accepted: 8,
                quantity_rejected: 0,
            }],
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidOperation(_));

    // The failed receipt rolled back entirely.
    let receipts = goods_receipt_item_entity::Entity::find()
        .count(ctx.db.as_ref())
        .await
        .unwrap();
    assert_eq!(receipts, 0);
    let item = &order_items(&ctx, order.id).await[0];
    assert_eq!(item.received_quantity, 0);
    let reloaded = purchase_order_entity::Entity::find_by_id(order.id)
        .one(ctx.db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.status, PurchaseOrderStatus::Ordered);
}

#[tokio::test]
async fn quantities_that_do_not_add_up_are_refused() {
    let ctx = TestCtx::new().await;
    let supplier = ctx.seed_supplier("NGSP-001", true).await;
    let product = ctx.seed_product("NGS-001", dec!(10), false).await;
    let warehouse = ctx.seed_warehouse("WH-01", true).await;

    let order = ordered_po(
        &ctx,
        supplier.id,
        vec![CreatePurchaseOrderItem {
            product_id: product.id,
            quantity: 5,
            unit_price: dec!(10),
            is_asset: false,
            specifications: None,
        }],
    )
    .await;
    let item_id = order_items(&ctx, order.id).await[0].id;

    let err = ctx
        .procurement
        .post_goods_receipt(CreateGoodsReceiptCommand {
            purchase_order_id: order.id,
            warehouse_id: warehouse.id,
            receipt_date: Utc::now().date_naive(),
            notes: None,
            received_by: Uuid::new_v4(),
            lines: vec![CreateGoodsReceiptLine {
                purchase_order_item_id: item_id,
                quantity_received: 3,
                quantity_accepted: 3,
                quantity_rejected: 1,
            }],
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn receiving_against_a_draft_order_is_refused() {
    let ctx = TestCtx::new().await;
    let supplier = ctx.seed_supplier("NGSP-001", true).await;
    let product = ctx.seed_product("NGS-001", dec!(10), false).await;
    let warehouse = ctx.seed_warehouse("WH-01", true).await;

    let order = ctx
        .procurement
        .create_purchase_order(CreatePurchaseOrderCommand {
            supplier_id: supplier.id,
            purchase_request_id: None,
            expected_delivery_date: None,
            payment_terms: None,
            delivery_terms: None,
            currency: "USD".to_string(),
            exchange_rate: None,
            notes: None,
            created_by: Uuid::new_v4(),
            items: vec![CreatePurchaseOrderItem {
                product_id: product.id,
                quantity: 5,
                unit_price: dec!(10),
                is_asset: false,
                specifications: None,
            }],
        })
        .await
        .unwrap();
    let item_id = order_items(&ctx, order.id).await[0].id;

    let err = ctx
        .procurement
        .post_goods_receipt(CreateGoodsReceiptCommand {
            purchase_order_id: order.id,
            warehouse_id: warehouse.id,
            receipt_date: Utc::now().date_naive(),
            notes: None,
            received_by: Uuid::new_v4(),
            lines: vec![CreateGoodsReceiptLine {
                purchase_order_item_id: item_id,
                quantity_received: 1,
                quantity_accepted: 1,
                quantity_rejected: 0,
            }],
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidOperation(_));
}

#[tokio::test]
async fn service_lines_never_touch_stock() {
    let ctx = TestCtx::new().await;
    let supplier = ctx.seed_supplier("NGSP-001", true).await;
    let install = ctx.seed_product("NGS-003", dec!(300), true).await;
    let warehouse = ctx.seed_warehouse("WH-01", true).await;

    let order = ordered_po(
        &ctx,
        supplier.id,
        vec![CreatePurchaseOrderItem {
            product_id: install.id,
            quantity: 1,
            unit_price: dec!(300),
            is_asset: false,
            specifications: None,
        }],
    )
    .await;
    let item_id = order_items(&ctx, order.id).await[0].id;

    ctx.procurement
        .post_goods_receipt(CreateGoodsReceiptCommand {
            purchase_order_id: order.id,
            warehouse_id: warehouse.id,
            receipt_date: Utc::now().date_naive(),
            notes: None,
            received_by: Uuid::new_v4(),
            lines: vec![CreateGoodsReceiptLine {
                purchase_order_item_id: item_id,
                quantity_received: 1,
                quantity_accepted: 1,
                quantity_rejected: 0,
            }],
        })
        .await
        .unwrap();

    let stock_count = inventory_item_entity::Entity::find()
        .count(ctx.db.as_ref())
        .await
        .unwrap();
    assert_eq!(stock_count, 0);

    let reloaded = purchase_order_entity::Entity::find_by_id(order.id)
        .one(ctx.db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.status, PurchaseOrderStatus::Received);
}
