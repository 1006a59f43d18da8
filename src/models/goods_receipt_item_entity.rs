use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "goods_receipt_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub goods_receipt_id: Uuid,
    pub purchase_order_item_id: Uuid,
    pub product_id: Uuid,
    pub quantity_received: i32,
    pub quantity_accepted: i32,
    pub quantity_rejected: i32,
    pub unit_cost: Decimal,
    /// quantity_received x unit_cost (received, not accepted, by contract).
    pub total_cost: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::models::goods_receipt_entity::Entity",
        from = "Column::GoodsReceiptId",
        to = "crate::models::goods_receipt_entity::Column::Id"
    )]
    GoodsReceipt,
    #[sea_orm(
        belongs_to = "crate::models::purchase_order_item_entity::Entity",
        from = "Column::PurchaseOrderItemId",
        to = "crate::models::purchase_order_item_entity::Column::Id"
    )]
    PurchaseOrderItem,
}

impl Related<crate::models::goods_receipt_entity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GoodsReceipt.def()
    }
}

impl Related<crate::models::purchase_order_item_entity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseOrderItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
