//! Document and master-data number generation.
//!
//! Numbers are derived from the highest suffix already stored, so they stay
//! monotonic per prefix even after deletions. The scan runs on the caller's
//! connection, which inside a transaction makes the generated number part of
//! the same atomic write.

use chrono::{Datelike, Utc};
use sea_orm::{ConnectionTrait, EntityTrait, QuerySelect};

use crate::errors::ServiceError;
use crate::models::{
    goods_receipt_entity, product_entity, purchase_order_entity, purchase_request_entity,
    supplier_entity,
};

/// Next purchase request number, `PR-YYYY-NNNN` scoped to the current year.
pub async fn next_pr_number<C: ConnectionTrait>(db: &C) -> Result<String, ServiceError> {
    let prefix = format!("PR-{}-", Utc::now().year());
    let existing: Vec<String> = purchase_request_entity::Entity::find()
        .select_only()
        .column(purchase_request_entity::Column::PrNumber)
        .into_tuple()
        .all(db)
        .await
        .map_err(ServiceError::db_error)?;
    Ok(format!("{}{:04}", prefix, next_suffix(&existing, &prefix)))
}

/// Next purchase order number, `PO-YYYY-NNNN` scoped to the current year.
pub async fn next_po_number<C: ConnectionTrait>(db: &C) -> Result<String, ServiceError> {
    let prefix = format!("PO-{}-", Utc::now().year());
    let existing: Vec<String> = purchase_order_entity::Entity::find()
        .select_only()
        .column(purchase_order_entity::Column::PoNumber)
        .into_tuple()
        .all(db)
        .await
        .map_err(ServiceError::db_error)?;
    Ok(format!("{}{:04}", prefix, next_suffix(&existing, &prefix)))
}

/// Next goods receipt number, `GR-YYYY-NNNN` scoped to the current year.
pub async fn next_gr_number<C: ConnectionTrait>(db: &C) -> Result<String, ServiceError> {
    let prefix = format!("GR-{}-", Utc::now().year());
    let existing: Vec<String> = goods_receipt_entity::Entity::find()
        .select_only()
        .column(goods_receipt_entity::Column::GrNumber)
        .into_tuple()
        .all(db)
        .await
        .map_err(ServiceError::db_error)?;
    Ok(format!("{}{:04}", prefix, next_suffix(&existing, &prefix)))
}

/// Next supplier code, `NGSP-NNN`.
pub async fn next_supplier_code<C: ConnectionTrait>(db: &C) -> Result<String, ServiceError> {
    let existing: Vec<String> = supplier_entity::Entity::find()
        .select_only()
        .column(supplier_entity::Column::Code)
        .into_tuple()
        .all(db)
        .await
        .map_err(ServiceError::db_error)?;
    Ok(format!("NGSP-{:03}", next_suffix(&existing, "NGSP-")))
}

/// Next product SKU, `NGS-NNN`.
pub async fn next_sku<C: ConnectionTrait>(db: &C) -> Result<String, ServiceError> {
    let existing: Vec<String> = product_entity::Entity::find()
        .select_only()
        .column(product_entity::Column::Sku)
        .into_tuple()
        .all(db)
        .await
        .map_err(ServiceError::db_error)?;
    Ok(format!("NGS-{:03}", next_suffix(&existing, "NGS-")))
}

/// Highest numeric suffix under `prefix`, plus one. Numbers that do not
/// carry the prefix or whose suffix is not numeric are ignored.
fn next_suffix(numbers: &[String], prefix: &str) -> u32 {
    numbers
        .iter()
        .filter_map(|n| n.strip_prefix(prefix))
        .filter_map(|s| s.parse::<u32>().ok())
        .max()
        .unwrap_or(0)
        + 1
}

#[cfg(test)]
mod tests {
    use super::next_suffix;

    #[test]
    fn first_number_in_an_empty_sequence_is_one() {
        assert_eq!(next_suffix(&[], "PO-2026-"), 1);
    }

    #[test]
    fn suffix_follows_the_highest_existing_number() {
        let existing = vec![
            "PO-2026-0001".to_string(),
            "PO-2026-0007".to_string(),
            "PO-2026-0003".to_string(),
        ];
        assert_eq!(next_suffix(&existing, "PO-2026-"), 8);
    }

    #[test]
    fn other_years_and_malformed_numbers_are_ignored() {
        let existing = vec![
            "PO-2025-0042".to_string(),
            "PO-2026-0002".to_string(),
            "PO-2026-draft".to_string(),
        ];
        assert_eq!(next_suffix(&existing, "PO-2026-"), 3);
    }
}
