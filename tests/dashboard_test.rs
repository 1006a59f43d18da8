mod common;

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use uuid::Uuid;

use ngs_procurement::{
    cache::InMemoryCache,
    commands::{
        purchaseorders::{
            CreatePurchaseOrderCommand, CreatePurchaseOrderItem, UpdatePurchaseOrderCommand,
        },
        purchaserequests::{CreatePurchaseRequestCommand, CreatePurchaseRequestItem},
    },
    models::{
        purchase_order_entity, purchase_request_entity::RequestPriority,
        purchase_request_item_entity::ItemUrgency,
    },
    services::DashboardService,
};

use common::TestCtx;

fn dashboard(ctx: &TestCtx, ttl: Duration) -> DashboardService {
    DashboardService::new(ctx.db.clone(), Arc::new(InMemoryCache::new()), ttl)
}

async fn seed_submitted_request(ctx: &TestCtx, product_id: Uuid) {
    let request = ctx
        .procurement
        .create_purchase_request(CreatePurchaseRequestCommand {
            title: "Office chairs".to_string(),
            description: None,
            priority: RequestPriority::Medium,
            required_date: chrono::Utc::now().date_naive(),
            estimated_budget: dec!(600),
            department: None,
            cost_center: None,
            requested_by: Uuid::new_v4(),
            items: vec![CreatePurchaseRequestItem {
                product_id,
                quantity: 4,
                unit_price: Some(dec!(150)),
                specifications: None,
                urgency: ItemUrgency::Normal,
            }],
        })
        .await
        .unwrap();
    ctx.procurement
        .submit_purchase_request(request.id)
        .await
        .unwrap();
}

async fn seed_order(ctx: &TestCtx, supplier_id: Uuid, product_id: Uuid, advance: usize) -> Uuid {
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
            items: vec![CreatePurchaseOrderItem {
                product_id,
                quantity: 2,
                unit_price: dec!(500),
                is_asset: false,
                specifications: None,
            }],
        })
        .await
        .unwrap();
    for _ in 0..advance {
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
    order.id
}

#[tokio::test]
async fn snapshot_counts_pending_work_and_monthly_spend() {
    let ctx = TestCtx::new().await;
    let supplier = ctx.seed_supplier("NGSP-001", true).await;
    ctx.seed_supplier("NGSP-002", false).await;
    let product = ctx.seed_product("NGS-001", dec!(500), false).await;

    seed_submitted_request(&ctx, product.id).await;
    // One draft order (no spend) and one approved order (counts).
    seed_order(&ctx, supplier.id, product.id, 0).await;
    seed_order(&ctx, supplier.id, product.id, 2).await;

    let snapshot = dashboard(&ctx, Duration::from_secs(60)).snapshot().await.unwrap();
    assert_eq!(snapshot.active_purchase_requests, 1);
    assert_eq!(snapshot.pending_purchase_requests, 1);
    assert_eq!(snapshot.rejected_purchase_requests, 0);
    assert_eq!(snapshot.open_purchase_orders, 2);
    assert_eq!(snapshot.pending_purchase_orders, 0);
    assert_eq!(snapshot.rejected_purchase_orders, 0);
    assert_eq!(snapshot.total_goods_receipts, 0);
    assert_eq!(snapshot.requests_this_month, 1);
    assert_eq!(snapshot.orders_this_month, 2);
    assert_eq!(snapshot.orders_previous_month, 0);
    assert_eq!(snapshot.total_spend, dec!(1000));
    assert_eq!(snapshot.spend_this_month, dec!(1000));
    assert_eq!(snapshot.spend_previous_month, Decimal::ZERO);
    // No prior month means no meaningful delta.
    assert_eq!(snapshot.spend_change_pct, Decimal::ZERO);
    assert_eq!(snapshot.order_change_pct, Decimal::ZERO);
    assert_eq!(snapshot.active_suppliers, 1);
}

#[tokio::test]
async fn total_spend_covers_orders_older_than_the_delta_windows() {
    let ctx = TestCtx::new().await;
    let supplier = ctx.seed_supplier("NGSP-001", true).await;
    let product = ctx.seed_product("NGS-001", dec!(500), false).await;

    // An approved order worth 1000, backdated well past both delta windows.
    let order_id = seed_order(&ctx, supplier.id, product.id, 2).await;
    let order = purchase_order_entity::Entity::find_by_id(order_id)
        .one(ctx.db.as_ref())
        .await
        .unwrap()
        .unwrap();
    let mut active: purchase_order_entity::ActiveModel = order.into();
    active.order_date = Set(chrono::Utc::now() - chrono::Duration::days(90));
    active.update(ctx.db.as_ref()).await.unwrap();

    let snapshot = dashboard(&ctx, Duration::from_secs(60)).snapshot().await.unwrap();
    assert_eq!(snapshot.total_spend, dec!(1000));
    assert_eq!(snapshot.spend_this_month, Decimal::ZERO);
    assert_eq!(snapshot.spend_previous_month, Decimal::ZERO);
    assert_eq!(snapshot.orders_this_month, 0);
}

#[tokio::test]
async fn converted_requests_drop_out_of_the_active_count() {
    let ctx = TestCtx::new().await;
    let supplier = ctx.seed_supplier("NGSP-001", true).await;
    let product = ctx.seed_product("NGS-001", dec!(500), false).await;

    let request = ctx
        .procurement
        .create_purchase_request(CreatePurchaseRequestCommand {
            title: "Rack servers".to_string(),
            description: None,
            priority: RequestPriority::High,
            required_date: chrono::Utc::now().date_naive(),
            estimated_budget: dec!(1000),
            department: None,
            cost_center: None,
            requested_by: Uuid::new_v4(),
            items: vec![CreatePurchaseRequestItem {
                product_id: product.id,
                quantity: 2,
                unit_price: Some(dec!(500)),
                specifications: None,
                urgency: ItemUrgency::Normal,
            }],
        })
        .await
        .unwrap();
    ctx.procurement
        .submit_purchase_request(request.id)
        .await
        .unwrap();

    ctx.procurement
        .create_purchase_order(CreatePurchaseOrderCommand {
            supplier_id: supplier.id,
            purchase_request_id: Some(request.id),
            expected_delivery_date: None,
            payment_terms: None,
            delivery_terms: None,
            currency: "USD".to_string(),
            exchange_rate: None,
            notes: None,
            created_by: Uuid::new_v4(),
            items: vec![CreatePurchaseOrderItem {
                product_id: product.id,
                quantity: 2,
                unit_price: dec!(500),
                is_asset: false,
                specifications: None,
            }],
        })
        .await
        .unwrap();

    let snapshot = dashboard(&ctx, Duration::from_secs(60)).snapshot().await.unwrap();
    assert_eq!(snapshot.active_purchase_requests, 0);
    assert_eq!(snapshot.open_purchase_orders, 1);
}

#[tokio::test]
async fn snapshot_is_served_from_cache_within_the_ttl() {
    let ctx = TestCtx::new().await;
    let supplier = ctx.seed_supplier("NGSP-001", true).await;
    let product = ctx.seed_product("NGS-001", dec!(500), false).await;
    let service = dashboard(&ctx, Duration::from_secs(60));

    let first = service.snapshot().await.unwrap();
    assert_eq!(first.open_purchase_orders, 0);

    seed_order(&ctx, supplier.id, product.id, 0).await;

    // Still the cached view; the new order is not visible yet.
    let second = service.snapshot().await.unwrap();
    assert_eq!(second.open_purchase_orders, 0);
    assert_eq!(second.generated_at, first.generated_at);
}

#[tokio::test]
async fn expired_cache_entries_trigger_a_fresh_compute() {
    let ctx = TestCtx::new().await;
    let supplier = ctx.seed_supplier("NGSP-001", true).await;
    let product = ctx.seed_product("NGS-001", dec!(500), false).await;
    let service = dashboard(&ctx, Duration::from_millis(20));

    let first = service.snapshot().await.unwrap();
    assert_eq!(first.open_purchase_orders, 0);

    seed_order(&ctx, supplier.id, product.id, 0).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    let second = service.snapshot().await.unwrap();
    assert_eq!(second.open_purchase_orders, 1);
}
