use crate::{
    cache::CacheBackend,
    db::DbPool,
    errors::ServiceError,
    models::{
        goods_receipt_entity,
        purchase_order_entity::{self, PurchaseOrderStatus},
        purchase_request_entity::{self, PurchaseRequestStatus},
        supplier_entity,
    },
};
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use std::sync::Arc;
use std::time::Duration;
use tracing::{instrument, warn};
use utoipa::ToSchema;

const CACHE_KEY: &str = "dashboard:snapshot";

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardSnapshot {
    /// Requests still in flight that no purchase order has picked up yet.
    pub active_purchase_requests: u64,
    pub pending_purchase_requests: u64,
    pub rejected_purchase_requests: u64,
    pub open_purchase_orders: u64,
    pub pending_purchase_orders: u64,
    pub rejected_purchase_orders: u64,
    pub total_goods_receipts: u64,
    pub receipts_this_month: u64,
    pub active_suppliers: u64,
    pub requests_this_month: u64,
    pub requests_previous_month: u64,
    pub request_change_pct: Decimal,
    pub orders_this_month: u64,
    pub orders_previous_month: u64,
    pub order_change_pct: Decimal,
    /// All-time committed spend over approved-or-later orders.
    pub total_spend: Decimal,
    pub spend_this_month: Decimal,
    pub spend_previous_month: Decimal,
    /// Month-over-month spend change in percent; zero when last month had
    /// no spend to compare against.
    pub spend_change_pct: Decimal,
    pub generated_at: DateTime<Utc>,
}

/// Read-side aggregator over the procurement tables. Results are cached
/// for a short TTL; the cache is an optimization only and every failure
/// falls back to a fresh query.
#[derive(Clone)]
pub struct DashboardService {
    db_pool: Arc<DbPool>,
    cache: Arc<dyn CacheBackend>,
    cache_ttl: Duration,
}

impl DashboardService {
    pub fn new(db_pool: Arc<DbPool>, cache: Arc<dyn CacheBackend>, cache_ttl: Duration) -> Self {
        Self {
            db_pool,
            cache,
            cache_ttl,
        }
    }

    #[instrument(skip(self))]
    pub async fn snapshot(&self) -> Result<DashboardSnapshot, ServiceError> {
        match self.cache.get(CACHE_KEY).await {
            Ok(Some(cached)) => {
                if let Ok(snapshot) = serde_json::from_str::<DashboardSnapshot>(&cached) {
                    return Ok(snapshot);
                }
                warn!("Discarding undecodable dashboard cache entry");
            }
            Ok(None) => {}
            Err(e) => warn!("Dashboard cache read failed: {}", e),
        }

        let snapshot = self.compute().await?;

        match serde_json::to_string(&snapshot) {
            Ok(serialized) => {
                if let Err(e) = self
                    .cache
                    .set(CACHE_KEY, &serialized, Some(self.cache_ttl))
                    .await
                {
                    warn!("Dashboard cache write failed: {}", e);
                }
            }
            Err(e) => warn!("Failed to serialize dashboard snapshot: {}", e),
        }

        Ok(snapshot)
    }

    async fn compute(&self) -> Result<DashboardSnapshot, ServiceError> {
        let db = self.db_pool.as_ref();
        let now = Utc::now();
        let (this_month_start, prev_month_start) = month_starts(now.date_naive());
        let this_month_start = start_of_day_utc(this_month_start);
        let prev_month_start_utc = start_of_day_utc(prev_month_start);

        let pending_purchase_requests = purchase_request_entity::Entity::find()
            .filter(purchase_request_entity::Column::Status.is_in([
                PurchaseRequestStatus::Submitted,
                PurchaseRequestStatus::UnderReview,
            ]))
            .count(db)
            .await?;

        let rejected_purchase_requests = purchase_request_entity::Entity::find()
            .filter(purchase_request_entity::Column::Status.eq(PurchaseRequestStatus::Rejected))
            .count(db)
            .await?;

        // Requests already picked up by an order no longer count as active
        // work, whatever their own status says.
        let converted: Vec<Uuid> = purchase_order_entity::Entity::find()
            .filter(purchase_order_entity::Column::PurchaseRequestId.is_not_null())
            .select_only()
            .column(purchase_order_entity::Column::PurchaseRequestId)
            .into_tuple::<Option<Uuid>>()
            .all(db)
            .await?
            .into_iter()
            .flatten()
            .collect();
        let mut active_requests_query = purchase_request_entity::Entity::find().filter(
            purchase_request_entity::Column::Status.is_not_in([
                PurchaseRequestStatus::Rejected,
                PurchaseRequestStatus::Cancelled,
            ]),
        );
        if !converted.is_empty() {
            active_requests_query = active_requests_query
                .filter(purchase_request_entity::Column::Id.is_not_in(converted));
        }
        let active_purchase_requests = active_requests_query.count(db).await?;

        let open_statuses = [
            PurchaseOrderStatus::Draft,
            PurchaseOrderStatus::Submitted,
            PurchaseOrderStatus::Approved,
            PurchaseOrderStatus::Ordered,
            PurchaseOrderStatus::PartiallyReceived,
        ];
        let open_purchase_orders = purchase_order_entity::Entity::find()
            .filter(purchase_order_entity::Column::Status.is_in(open_statuses))
            .count(db)
            .await?;

        let pending_purchase_orders = purchase_order_entity::Entity::find()
            .filter(purchase_order_entity::Column::Status.eq(PurchaseOrderStatus::Submitted))
            .count(db)
            .await?;

        let rejected_purchase_orders = purchase_order_entity::Entity::find()
            .filter(purchase_order_entity::Column::Status.eq(PurchaseOrderStatus::Rejected))
            .count(db)
            .await?;

        let requests_this_month = purchase_request_entity::Entity::find()
            .filter(purchase_request_entity::Column::CreatedAt.gte(this_month_start))
            .count(db)
            .await?;
        let requests_previous_month = purchase_request_entity::Entity::find()
            .filter(purchase_request_entity::Column::CreatedAt.gte(prev_month_start_utc))
            .filter(purchase_request_entity::Column::CreatedAt.lt(this_month_start))
            .count(db)
            .await?;

        let spend_statuses = [
            PurchaseOrderStatus::Approved,
            PurchaseOrderStatus::Ordered,
            PurchaseOrderStatus::PartiallyReceived,
            PurchaseOrderStatus::Received,
        ];
        let total_spend: Decimal = purchase_order_entity::Entity::find()
            .filter(purchase_order_entity::Column::Status.is_in(spend_statuses))
            .select_only()
            .column(purchase_order_entity::Column::GrandTotal)
            .into_tuple::<Decimal>()
            .all(db)
            .await?
            .into_iter()
            .sum();

        // Spend needs the status predicate, so the two windows are summed
        // in memory from one bounded scan; the order counts per window fall
        // out of the same scan.
        let recent_orders = purchase_order_entity::Entity::find()
            .filter(purchase_order_entity::Column::OrderDate.gte(prev_month_start_utc))
            .all(db)
            .await?;
        let mut orders_this_month: u64 = 0;
        let mut orders_previous_month: u64 = 0;
        let mut spend_this_month = Decimal::ZERO;
        let mut spend_previous_month = Decimal::ZERO;
        for order in &recent_orders {
            let current_window = order.order_date >= this_month_start;
            if current_window {
                orders_this_month += 1;
            } else {
                orders_previous_month += 1;
            }
            if !order.status.counts_toward_spend() {
                continue;
            }
            if current_window {
                spend_this_month += order.grand_total;
            } else {
                spend_previous_month += order.grand_total;
            }
        }

        let total_goods_receipts = goods_receipt_entity::Entity::find().count(db).await?;
        let receipts_this_month = goods_receipt_entity::Entity::find()
            .filter(
                goods_receipt_entity::Column::ReceiptDate.gte(this_month_start.date_naive()),
            )
            .count(db)
            .await?;

        let active_suppliers = supplier_entity::Entity::find()
            .filter(supplier_entity::Column::IsActive.eq(true))
            .count(db)
            .await?;

        Ok(DashboardSnapshot {
            active_purchase_requests,
            pending_purchase_requests,
            rejected_purchase_requests,
            open_purchase_orders,
            pending_purchase_orders,
            rejected_purchase_orders,
            total_goods_receipts,
            receipts_this_month,
            active_suppliers,
            requests_this_month,
            requests_previous_month,
            request_change_pct: count_delta(requests_this_month, requests_previous_month),
            orders_this_month,
            orders_previous_month,
            order_change_pct: count_delta(orders_this_month, orders_previous_month),
            total_spend,
            spend_this_month,
            spend_previous_month,
            spend_change_pct: percent_delta(spend_this_month, spend_previous_month),
            generated_at: now,
        })
    }
}

/// First day of the current month and of the month before it.
fn month_starts(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let this_month = today.with_day(1).unwrap_or(today);
    let prev_month = if this_month.month() == 1 {
        this_month
            .with_year(this_month.year() - 1)
            .and_then(|d| d.with_month(12))
            .unwrap_or(this_month)
    } else {
        this_month
            .with_month(this_month.month() - 1)
            .unwrap_or(this_month)
    };
    (this_month, prev_month)
}

fn start_of_day_utc(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap_or_default())
}

/// Percentage change from `prior` to `current`; zero when there is no
/// prior value to compare against.
fn percent_delta(current: Decimal, prior: Decimal) -> Decimal {
    if prior.is_zero() {
        Decimal::ZERO
    } else {
        (current - prior) / prior * Decimal::from(100)
    }
}

fn count_delta(current: u64, prior: u64) -> Decimal {
    percent_delta(Decimal::from(current), Decimal::from(prior))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn percent_delta_is_zero_without_a_prior_month() {
        assert_eq!(percent_delta(dec!(1500), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(percent_delta(Decimal::ZERO, Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn percent_delta_handles_growth_and_decline() {
        assert_eq!(percent_delta(dec!(150), dec!(100)), dec!(50));
        assert_eq!(percent_delta(dec!(50), dec!(100)), dec!(-50));
    }

    #[test]
    fn month_starts_roll_back_within_a_year() {
        let (this_month, prev_month) = month_starts(
            NaiveDate::from_ymd_opt(2026, 8, 29).unwrap(),
        );
        assert_eq!(this_month, NaiveDate::from_ymd_opt(2026, 8, 1).unwrap());
        assert_eq!(prev_month, NaiveDate::from_ymd_opt(2026, 7, 1).unwrap());
    }

    #[test]
    fn month_starts_cross_the_year_boundary() {
        let (this_month, prev_month) = month_starts(
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
        );
        assert_eq!(this_month, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert_eq!(prev_month, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
    }
}
