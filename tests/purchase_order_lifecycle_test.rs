mod common;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::EntityTrait;
use uuid::Uuid;

use ngs_procurement::{
    commands::{
        purchaseorders::{CreatePurchaseOrderCommand, CreatePurchaseOrderItem, UpdatePurchaseOrderCommand},
        purchaserequests::{CreatePurchaseRequestCommand, CreatePurchaseRequestItem},
    },
    errors::ServiceError,
    models::{
        purchase_order_entity::PurchaseOrderStatus,
        purchase_request_entity::{self, PurchaseRequestStatus, RequestPriority},
        purchase_request_item_entity::ItemUrgency,
    },
};

use common::TestCtx;

fn request_command(requested_by: Uuid, product_id: Uuid) -> CreatePurchaseRequestCommand {
    CreatePurchaseRequestCommand {
        title: "Replacement laptops".to_string(),
        description: None,
        priority: RequestPriority::High,
        required_date: (Utc::now() + Duration::days(14)).date_naive(),
        estimated_budget: dec!(3600),
        department: Some("IT".to_string()),
        cost_center: None,
        requested_by,
        items: vec![CreatePurchaseRequestItem {
            product_id,
            quantity: 3,
            unit_price: Some(dec!(1200)),
            specifications: None,
            urgency: ItemUrgency::High,
        }],
    }
}

fn order_command(
    supplier_id: Uuid,
    purchase_request_id: Option<Uuid>,
    product_id: Uuid,
) -> CreatePurchaseOrderCommand {
    CreatePurchaseOrderCommand {
        supplier_id,
        purchase_request_id,
        expected_delivery_date: None,
        payment_terms: None,
        delivery_terms: None,
        currency: "USD".to_string(),
        exchange_rate: None,
        notes: None,
        created_by: Uuid::new_v4(),
        items: vec![CreatePurchaseOrderItem {
            product_id,
            quantity: 3,
            unit_price: dec!(1150),
            is_asset: false,
            specifications: None,
        }],
    }
}

#[tokio::test]
async fn purchase_request_walks_draft_submit_approve() {
    let ctx = TestCtx::new().await;
    let product = ctx.seed_product("NGS-001", dec!(1200), false).await;
    let requester = Uuid::new_v4();

    let created = ctx
        .procurement
        .create_purchase_request(request_command(requester, product.id))
        .await
        .unwrap();
    assert_eq!(created.status, PurchaseRequestStatus::Draft);
    assert!(created.pr_number.starts_with("PR-"));
    assert_eq!(created.estimated_budget, dec!(3600));

    let submitted = ctx
        .procurement
        .submit_purchase_request(created.id)
        .await
        .unwrap();
    assert_eq!(submitted.status, PurchaseRequestStatus::Submitted);

    let approver = Uuid::new_v4();
    let approved = ctx
        .procurement
        .approve_purchase_request(created.id, approver)
        .await
        .unwrap();
    assert_eq!(approved.status, PurchaseRequestStatus::Approved);
    assert_eq!(approved.approved_by, Some(approver));
}

#[tokio::test]
async fn draft_request_cannot_be_approved_and_approval_cannot_repeat() {
    let ctx = TestCtx::new().await;
    let product = ctx.seed_product("NGS-001", dec!(100), false).await;
    let created = ctx
        .procurement
        .create_purchase_request(request_command(Uuid::new_v4(), product.id))
        .await
        .unwrap();

    let err = ctx
        .procurement
        .approve_purchase_request(created.id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidOperation(_));

    ctx.procurement.submit_purchase_request(created.id).await.unwrap();
    ctx.procurement
        .approve_purchase_request(created.id, Uuid::new_v4())
        .await
        .unwrap();
    let err = ctx
        .procurement
        .approve_purchase_request(created.id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidOperation(_));
}

#[tokio::test]
async fn request_rejection_requires_a_reason() {
    let ctx = TestCtx::new().await;
    let product = ctx.seed_product("NGS-001", dec!(100), false).await;
    let created = ctx
        .procurement
        .create_purchase_request(request_command(Uuid::new_v4(), product.id))
        .await
        .unwrap();
    ctx.procurement.submit_purchase_request(created.id).await.unwrap();

    let err = ctx
        .procurement
        .reject_purchase_request(created.id, Uuid::new_v4(), "   ".to_string())
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    let rejected = ctx
        .procurement
        .reject_purchase_request(created.id, Uuid::new_v4(), "over budget".to_string())
        .await
        .unwrap();
    assert_eq!(rejected.status, PurchaseRequestStatus::Rejected);
    assert_eq!(rejected.rejection_reason.as_deref(), Some("over budget"));
}

#[tokio::test]
async fn creating_an_order_marks_the_source_request_approved() {
    let ctx = TestCtx::new().await;
    let supplier = ctx.seed_supplier("NGSP-001", true).await;
    let product = ctx.seed_product("NGS-001", dec!(1200), false).await;

    let request = ctx
        .procurement
        .create_purchase_request(request_command(Uuid::new_v4(), product.id))
        .await
        .unwrap();
    ctx.procurement.submit_purchase_request(request.id).await.unwrap();

    let order = ctx
        .procurement
        .create_purchase_order(order_command(supplier.id, Some(request.id), product.id))
        .await
        .unwrap();
    assert_eq!(order.status, PurchaseOrderStatus::Draft);
    assert!(order.po_number.starts_with("PO-"));
    assert_eq!(order.grand_total, dec!(3450));
    // Supplier terms fill in when the order carries none.
    assert_eq!(order.payment_terms.as_deref(), Some("NET30"));

    let reloaded = purchase_request_entity::Entity::find_by_id(request.id)
        .one(ctx.db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.status, PurchaseRequestStatus::Approved);
}

#[tokio::test]
async fn request_budget_must_be_positive() {
    let ctx = TestCtx::new().await;
    let product = ctx.seed_product("NGS-001", dec!(100), false).await;

    let mut zero_budget = request_command(Uuid::new_v4(), product.id);
    zero_budget.estimated_budget = Decimal::ZERO;
    let err = ctx
        .procurement
        .create_purchase_request(zero_budget)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    let mut negative_budget = request_command(Uuid::new_v4(), product.id);
    negative_budget.estimated_budget = dec!(-500);
    let err = ctx
        .procurement
        .create_purchase_request(negative_budget)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    // The supplied figure is stored as given, not derived from the items.
    let mut odd_budget = request_command(Uuid::new_v4(), product.id);
    odd_budget.estimated_budget = dec!(500);
    let created = ctx
        .procurement
        .create_purchase_request(odd_budget)
        .await
        .unwrap();
    assert_eq!(created.estimated_budget, dec!(500));
}

#[tokio::test]
async fn rejected_request_cannot_be_converted() {
    let ctx = TestCtx::new().await;
    let supplier = ctx.seed_supplier("NGSP-001", true).await;
    let product = ctx.seed_product("NGS-001", dec!(100), false).await;

    let request = ctx
        .procurement
        .create_purchase_request(request_command(Uuid::new_v4(), product.id))
        .await
        .unwrap();
    ctx.procurement.submit_purchase_request(request.id).await.unwrap();
    ctx.procurement
        .reject_purchase_request(request.id, Uuid::new_v4(), "duplicate".to_string())
        .await
        .unwrap();

    let err = ctx
        .procurement
        .create_purchase_order(order_command(supplier.id, Some(request.id), product.id))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidOperation(_));
}

#[tokio::test]
async fn inactive_supplier_is_refused() {
    let ctx = TestCtx::new().await;
    let supplier = ctx.seed_supplier("NGSP-001", false).await;
    let product = ctx.seed_product("NGS-001", dec!(100), false).await;

    let err = ctx
        .procurement
        .create_purchase_order(order_command(supplier.id, None, product.id))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidOperation(_));
}

#[tokio::test]
async fn each_update_advances_the_order_one_step_until_ordered() {
    let ctx = TestCtx::new().await;
    let supplier = ctx.seed_supplier("NGSP-001", true).await;
    let product = ctx.seed_product("NGS-001", dec!(100), false).await;

    let order = ctx
        .procurement
        .create_purchase_order(order_command(supplier.id, None, product.id))
        .await
        .unwrap();

    let mut expected = [
        PurchaseOrderStatus::Submitted,
        PurchaseOrderStatus::Approved,
        PurchaseOrderStatus::Ordered,
    ]
    .into_iter();
    for want in expected.by_ref() {
        let result = ctx
            .procurement
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
        assert_eq!(result.purchase_order.status, want);
    }

    // Once ordered there is nothing left for the office to edit.
    let err = ctx
        .procurement
        .update_purchase_order(UpdatePurchaseOrderCommand {
            purchase_order_id: order.id,
            items: None,
            expected_delivery_date: None,
            payment_terms: None,
            delivery_terms: None,
            notes: None,
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidOperation(_));
}

#[tokio::test]
async fn replacing_items_recomputes_the_grand_total() {
    let ctx = TestCtx::new().await;
    let supplier = ctx.seed_supplier("NGSP-001", true).await;
    let product = ctx.seed_product("NGS-001", dec!(100), false).await;

    let order = ctx
        .procurement
        .create_purchase_order(order_command(supplier.id, None, product.id))
        .await
        .unwrap();

    let result = ctx
        .procurement
        .update_purchase_order(UpdatePurchaseOrderCommand {
            purchase_order_id: order.id,
            items: Some(vec![CreatePurchaseOrderItem {
                product_id: product.id,
                quantity: 10,
                unit_price: dec!(90),
                is_asset: false,
                specifications: None,
            }]),
            expected_delivery_date: None,
            payment_terms: None,
            delivery_terms: None,
            notes: Some("renegotiated".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(result.purchase_order.grand_total, dec!(900));
    assert_eq!(result.previous_status, PurchaseOrderStatus::Draft);
    assert_eq!(result.purchase_order.status, PurchaseOrderStatus::Submitted);
}

#[tokio::test]
async fn order_rejection_only_from_submitted_and_with_a_reason() {
    let ctx = TestCtx::new().await;
    let supplier = ctx.seed_supplier("NGSP-001", true).await;
    let product = ctx.seed_product("NGS-001", dec!(100), false).await;

    let order = ctx
        .procurement
        .create_purchase_order(order_command(supplier.id, None, product.id))
        .await
        .unwrap();

    // Draft orders are not in the approval queue yet.
    let err = ctx
        .procurement
        .reject_purchase_order(order.id, Uuid::new_v4(), "too expensive".to_string())
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidOperation(_));

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

    let err = ctx
        .procurement
        .reject_purchase_order(order.id, Uuid::new_v4(), "".to_string())
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    let rejector = Uuid::new_v4();
    let rejected = ctx
        .procurement
        .reject_purchase_order(order.id, rejector, "too expensive".to_string())
        .await
        .unwrap();
    assert_eq!(rejected.status, PurchaseOrderStatus::Rejected);
    assert_eq!(rejected.rejected_by, Some(rejector));
    assert!(rejected.rejected_at.is_some());
}

#[tokio::test]
async fn document_numbers_increase_within_the_year() {
    let ctx = TestCtx::new().await;
    let supplier = ctx.seed_supplier("NGSP-001", true).await;
    let product = ctx.seed_product("NGS-001", dec!(100), false).await;

    let first = ctx
        .procurement
        .create_purchase_order(order_command(supplier.id, None, product.id))
        .await
        .unwrap();
    let second = ctx
        .procurement
        .create_purchase_order(order_command(supplier.id, None, product.id))
        .await
        .unwrap();

    let year = Utc::now().format("%Y").to_string();
    assert_eq!(first.po_number, format!("PO-{}-0001", year));
    assert_eq!(second.po_number, format!("PO-{}-0002", year));
}
