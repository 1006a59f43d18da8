use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per (product, warehouse) stock record. available = quantity - reserved.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub quantity: i32,
    pub available_quantity: i32,
    pub reserved_quantity: i32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::models::product_entity::Entity",
        from = "Column::ProductId",
        to = "crate::models::product_entity::Column::Id"
    )]
    Product,
    #[sea_orm(
        belongs_to = "crate::models::warehouse_entity::Entity",
        from = "Column::WarehouseId",
        to = "crate::models::warehouse_entity::Column::Id"
    )]
    Warehouse,
}

impl Related<crate::models::product_entity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<crate::models::warehouse_entity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Warehouse.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
