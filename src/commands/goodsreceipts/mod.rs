pub mod create_goods_receipt_command;

pub use create_goods_receipt_command::{
    CreateGoodsReceiptCommand, CreateGoodsReceiptLine, CreateGoodsReceiptResult,
};
