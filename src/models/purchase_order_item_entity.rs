use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchase_order_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub purchase_order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    /// quantity x unit_price, computed at write time.
    pub total_price: Decimal,
    pub is_asset: bool,
    pub specifications: Option<String>,
    /// Monotonically incremented by goods receipts, bounded by `quantity`.
    pub received_quantity: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::models::purchase_order_entity::Entity",
        from = "Column::PurchaseOrderId",
        to = "crate::models::purchase_order_entity::Column::Id"
    )]
    PurchaseOrder,
    #[sea_orm(
        belongs_to = "crate::models::product_entity::Entity",
        from = "Column::ProductId",
        to = "crate::models::product_entity::Column::Id"
    )]
    Product,
}

impl Related<crate::models::purchase_order_entity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseOrder.def()
    }
}

impl Related<crate::models::product_entity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
