use crate::services::{DashboardService, ProcurementService};

pub mod dashboard;
pub mod goods_receipts;
pub mod master_data;
pub mod purchase_orders;
pub mod purchase_requests;

/// Service container handed to every handler through `AppState`.
#[derive(Clone)]
pub struct AppServices {
    pub procurement: ProcurementService,
    pub dashboard: DashboardService,
}
