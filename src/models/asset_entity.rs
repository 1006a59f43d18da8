use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A capitalized unit created from a received order line flagged is-asset.
/// One row per accepted unit, valued at the receipt's unit cost.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "assets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub asset_number: String,
    pub name: String,
    pub valuation: Decimal,
    pub goods_receipt_id: Uuid,
    pub po_number: String,
    pub product_id: Uuid,
    pub status: String,
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
}

impl Related<crate::models::goods_receipt_entity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GoodsReceipt.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
