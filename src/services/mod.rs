pub mod dashboard;
pub mod numbering;
pub mod procurement;

pub use dashboard::{DashboardService, DashboardSnapshot};
pub use procurement::ProcurementService;
