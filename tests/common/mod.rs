use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, DbBackend, Schema, Set,
};
use uuid::Uuid;

use ngs_procurement::{
    events::{self, EventSender},
    models::{
        asset_entity, goods_receipt_entity, goods_receipt_item_entity, inventory_item_entity,
        inventory_transaction_entity, product_entity, purchase_order_entity,
        purchase_order_item_entity, purchase_request_entity, purchase_request_item_entity,
        supplier_entity, warehouse_entity,
    },
    services::ProcurementService,
};

/// Test harness over an in-memory SQLite database with the full schema.
pub struct TestCtx {
    pub db: Arc<DatabaseConnection>,
    pub procurement: ProcurementService,
    pub event_sender: Arc<EventSender>,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestCtx {
    pub async fn new() -> Self {
        let db = Arc::new(
            Database::connect("sqlite::memory:")
                .await
                .expect("in-memory sqlite"),
        );
        create_schema(&db).await;

        let (event_sender, receiver) = events::channel(256);
        let event_task = tokio::spawn(events::process_events(receiver));
        let event_sender = Arc::new(event_sender);
        let procurement = ProcurementService::new(db.clone(), event_sender.clone());

        Self {
            db,
            procurement,
            event_sender,
            _event_task: event_task,
        }
    }

    pub async fn seed_supplier(&self, code: &str, active: bool) -> supplier_entity::Model {
        let now = Utc::now();
        supplier_entity::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(format!("Supplier {}", code)),
            code: Set(code.to_string()),
            contact_person: Set(None),
            email: Set(None),
            phone: Set(None),
            address: Set(None),
            tax_number: Set(None),
            payment_terms: Set(Some("NET30".to_string())),
            is_active: Set(active),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db.as_ref())
        .await
        .expect("seed supplier")
    }

    pub async fn seed_product(
        &self,
        sku: &str,
        unit_price: Decimal,
        is_service: bool,
    ) -> product_entity::Model {
        let now = Utc::now();
        product_entity::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(format!("Product {}", sku)),
            code: Set(format!("P-{}", sku)),
            sku: Set(sku.to_string()),
            description: Set(None),
            category: Set(None),
            unit_price: Set(unit_price),
            cost_price: Set(unit_price),
            min_stock_level: Set(0),
            max_stock_level: Set(1000),
            unit_of_measure: Set("EA".to_string()),
            is_service: Set(is_service),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db.as_ref())
        .await
        .expect("seed product")
    }

    pub async fn seed_warehouse(&self, code: &str, active: bool) -> warehouse_entity::Model {
        warehouse_entity::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(format!("Warehouse {}", code)),
            code: Set(code.to_string()),
            location: Set(None),
            is_active: Set(active),
            created_at: Set(Utc::now()),
        }
        .insert(self.db.as_ref())
        .await
        .expect("seed warehouse")
    }
}

async fn create_schema(db: &DatabaseConnection) {
    let schema = Schema::new(DbBackend::Sqlite);
    let backend = db.get_database_backend();

    let statements = vec![
        schema.create_table_from_entity(supplier_entity::Entity),
        schema.create_table_from_entity(product_entity::Entity),
        schema.create_table_from_entity(warehouse_entity::Entity),
        schema.create_table_from_entity(purchase_request_entity::Entity),
        schema.create_table_from_entity(purchase_request_item_entity::Entity),
        schema.create_table_from_entity(purchase_order_entity::Entity),
        schema.create_table_from_entity(purchase_order_item_entity::Entity),
        schema.create_table_from_entity(goods_receipt_entity::Entity),
        schema.create_table_from_entity(goods_receipt_item_entity::Entity),
        schema.create_table_from_entity(inventory_item_entity::Entity),
        schema.create_table_from_entity(inventory_transaction_entity::Entity),
        schema.create_table_from_entity(asset_entity::Entity),
    ];
    for statement in statements {
        db.execute(backend.build(&statement))
            .await
            .expect("create table");
    }
}
