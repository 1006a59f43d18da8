use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum PurchaseOrderStatus {
    #[sea_orm(string_value = "DRAFT")]
    Draft,
    #[sea_orm(string_value = "SUBMITTED")]
    Submitted,
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "ORDERED")]
    Ordered,
    #[sea_orm(string_value = "PARTIALLY_RECEIVED")]
    PartiallyReceived,
    #[sea_orm(string_value = "RECEIVED")]
    Received,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

impl PurchaseOrderStatus {
    /// One step forward in the approval workflow. Statuses outside the
    /// DRAFT -> SUBMITTED -> APPROVED -> ORDERED chain stay where they are;
    /// receiving statuses are only driven by goods-receipt processing.
    pub fn next(self) -> PurchaseOrderStatus {
        match self {
            Self::Draft => Self::Submitted,
            Self::Submitted => Self::Approved,
            Self::Approved => Self::Ordered,
            other => other,
        }
    }

    /// Statuses still considered open for dashboard counts.
    pub fn is_open(self) -> bool {
        matches!(
            self,
            Self::Draft | Self::Submitted | Self::Approved | Self::Ordered | Self::PartiallyReceived
        )
    }

    /// Statuses whose grand total contributes to total spend.
    pub fn counts_toward_spend(self) -> bool {
        matches!(
            self,
            Self::Approved | Self::Ordered | Self::PartiallyReceived | Self::Received
        )
    }

    /// Edits-with-advance are only allowed before the order leaves the office.
    pub fn is_editable(self) -> bool {
        matches!(self, Self::Draft | Self::Submitted | Self::Approved)
    }
}

impl fmt::Display for PurchaseOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Draft => "DRAFT",
            Self::Submitted => "SUBMITTED",
            Self::Approved => "APPROVED",
            Self::Ordered => "ORDERED",
            Self::PartiallyReceived => "PARTIALLY_RECEIVED",
            Self::Received => "RECEIVED",
            Self::Cancelled => "CANCELLED",
            Self::Rejected => "REJECTED",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchase_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub po_number: String,
    pub supplier_id: Uuid,
    pub purchase_request_id: Option<Uuid>,
    pub status: PurchaseOrderStatus,
    pub order_date: DateTime<Utc>,
    pub expected_delivery_date: Option<chrono::NaiveDate>,
    pub payment_terms: Option<String>,
    pub delivery_terms: Option<String>,
    pub currency: String,
    pub exchange_rate: Decimal,
    pub grand_total: Decimal,
    pub notes: Option<String>,
    pub rejection_reason: Option<String>,
    pub rejected_by: Option<Uuid>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::models::supplier_entity::Entity",
        from = "Column::SupplierId",
        to = "crate::models::supplier_entity::Column::Id"
    )]
    Supplier,
    #[sea_orm(has_many = "crate::models::purchase_order_item_entity::Entity")]
    Items,
}

impl Related<crate::models::supplier_entity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

impl Related<crate::models::purchase_order_item_entity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::PurchaseOrderStatus::*;

    #[test]
    fn next_walks_the_approval_chain_one_step_at_a_time() {
        assert_eq!(Draft.next(), Submitted);
        assert_eq!(Submitted.next(), Approved);
        assert_eq!(Approved.next(), Ordered);
    }

    #[test]
    fn next_is_identity_beyond_ordered() {
        for status in [Ordered, PartiallyReceived, Received, Cancelled, Rejected] {
            assert_eq!(status.next(), status);
        }
    }

    #[test]
    fn spend_statuses_exclude_draft_and_terminal_failures() {
        assert!(Approved.counts_toward_spend());
        assert!(Ordered.counts_toward_spend());
        assert!(PartiallyReceived.counts_toward_spend());
        assert!(Received.counts_toward_spend());
        assert!(!Draft.counts_toward_spend());
        assert!(!Submitted.counts_toward_spend());
        assert!(!Cancelled.counts_toward_spend());
        assert!(!Rejected.counts_toward_spend());
    }

    #[test]
    fn open_statuses_for_dashboard_counts() {
        assert!(Draft.is_open());
        assert!(PartiallyReceived.is_open());
        assert!(!Received.is_open());
        assert!(!Cancelled.is_open());
        assert!(!Rejected.is_open());
    }
}
