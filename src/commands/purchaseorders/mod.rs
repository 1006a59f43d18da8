pub mod create_purchase_order_command;
pub mod reject_purchase_order_command;
pub mod update_purchase_order_command;

pub use create_purchase_order_command::{CreatePurchaseOrderCommand, CreatePurchaseOrderItem};
pub use reject_purchase_order_command::RejectPurchaseOrderCommand;
pub use update_purchase_order_command::{UpdatePurchaseOrderCommand, UpdatePurchaseOrderResult};
