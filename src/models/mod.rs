pub mod asset_entity;
pub mod goods_receipt_entity;
pub mod goods_receipt_item_entity;
pub mod inventory_item_entity;
pub mod inventory_transaction_entity;
pub mod product_entity;
pub mod purchase_order_entity;
pub mod purchase_order_item_entity;
pub mod purchase_request_entity;
pub mod purchase_request_item_entity;
pub mod supplier_entity;
pub mod warehouse_entity;
