use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_catalog_tables::Migration),
            Box::new(m20250101_000002_create_purchase_request_tables::Migration),
            Box::new(m20250101_000003_create_purchase_order_tables::Migration),
            Box::new(m20250101_000004_create_receiving_tables::Migration),
        ]
    }
}

mod m20250101_000001_create_catalog_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000001_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Suppliers::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Suppliers::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Suppliers::Name).string().not_null())
                        .col(
                            ColumnDef::new(Suppliers::Code)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Suppliers::ContactPerson).string())
                        .col(ColumnDef::new(Suppliers::Email).string())
                        .col(ColumnDef::new(Suppliers::Phone).string())
                        .col(ColumnDef::new(Suppliers::Address).string())
                        .col(ColumnDef::new(Suppliers::TaxNumber).string())
                        .col(ColumnDef::new(Suppliers::PaymentTerms).string())
                        .col(ColumnDef::new(Suppliers::IsActive).boolean().not_null())
                        .col(
                            ColumnDef::new(Suppliers::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Suppliers::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Products::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Products::Name).string().not_null())
                        .col(
                            ColumnDef::new(Products::Code)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Products::Sku)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Products::Description).string())
                        .col(ColumnDef::new(Products::Category).string())
                        .col(ColumnDef::new(Products::UnitPrice).decimal().not_null())
                        .col(ColumnDef::new(Products::CostPrice).decimal().not_null())
                        .col(ColumnDef::new(Products::MinStockLevel).integer().not_null())
                        .col(ColumnDef::new(Products::MaxStockLevel).integer().not_null())
                        .col(ColumnDef::new(Products::UnitOfMeasure).string().not_null())
                        .col(ColumnDef::new(Products::IsService).boolean().not_null())
                        .col(
                            ColumnDef::new(Products::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Products::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Warehouses::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Warehouses::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Warehouses::Name).string().not_null())
                        .col(
                            ColumnDef::new(Warehouses::Code)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Warehouses::Location).string())
                        .col(ColumnDef::new(Warehouses::IsActive).boolean().not_null())
                        .col(
                            ColumnDef::new(Warehouses::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Warehouses::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Suppliers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Suppliers {
        Table,
        Id,
        Name,
        Code,
        ContactPerson,
        Email,
        Phone,
        Address,
        TaxNumber,
        PaymentTerms,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Products {
        Table,
        Id,
        Name,
        Code,
        Sku,
        Description,
        Category,
        UnitPrice,
        CostPrice,
        MinStockLevel,
        MaxStockLevel,
        UnitOfMeasure,
        IsService,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Warehouses {
        Table,
        Id,
        Name,
        Code,
        Location,
        IsActive,
        CreatedAt,
    }
}

mod m20250101_000002_create_purchase_request_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000002_create_purchase_request_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PurchaseRequests::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseRequests::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseRequests::PrNumber).string().not_null())
                        .col(ColumnDef::new(PurchaseRequests::Title).string().not_null())
                        .col(ColumnDef::new(PurchaseRequests::Description).string())
                        .col(
                            ColumnDef::new(PurchaseRequests::Priority)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseRequests::RequiredDate).date().not_null())
                        .col(
                            ColumnDef::new(PurchaseRequests::EstimatedBudget)
                                .decimal()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseRequests::Department).string())
                        .col(ColumnDef::new(PurchaseRequests::CostCenter).string())
                        .col(
                            ColumnDef::new(PurchaseRequests::Status)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseRequests::RequestedBy).uuid().not_null())
                        .col(ColumnDef::new(PurchaseRequests::ApprovedBy).uuid())
                        .col(ColumnDef::new(PurchaseRequests::RejectionReason).string())
                        .col(
                            ColumnDef::new(PurchaseRequests::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseRequests::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PurchaseRequestItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseRequestItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseRequestItems::PurchaseRequestId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseRequestItems::ProductId).uuid().not_null())
                        .col(ColumnDef::new(PurchaseRequestItems::Quantity).integer().not_null())
                        .col(ColumnDef::new(PurchaseRequestItems::UnitPrice).decimal())
                        .col(ColumnDef::new(PurchaseRequestItems::Specifications).string())
                        .col(
                            ColumnDef::new(PurchaseRequestItems::Urgency)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseRequestItems::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .from(
                                    PurchaseRequestItems::Table,
                                    PurchaseRequestItems::PurchaseRequestId,
                                )
                                .to(PurchaseRequests::Table, PurchaseRequests::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PurchaseRequestItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PurchaseRequests::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum PurchaseRequests {
        Table,
        Id,
        PrNumber,
        Title,
        Description,
        Priority,
        RequiredDate,
        EstimatedBudget,
        Department,
        CostCenter,
        Status,
        RequestedBy,
        ApprovedBy,
        RejectionReason,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum PurchaseRequestItems {
        Table,
        Id,
        PurchaseRequestId,
        ProductId,
        Quantity,
        UnitPrice,
        Specifications,
        Urgency,
        CreatedAt,
    }
}

mod m20250101_000003_create_purchase_order_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000003_create_purchase_order_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PurchaseOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseOrders::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseOrders::PoNumber).string().not_null())
                        .col(ColumnDef::new(PurchaseOrders::SupplierId).uuid().not_null())
                        .col(ColumnDef::new(PurchaseOrders::PurchaseRequestId).uuid())
                        .col(
                            ColumnDef::new(PurchaseOrders::Status)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::OrderDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseOrders::ExpectedDeliveryDate).date())
                        .col(ColumnDef::new(PurchaseOrders::PaymentTerms).string())
                        .col(ColumnDef::new(PurchaseOrders::DeliveryTerms).string())
                        .col(ColumnDef::new(PurchaseOrders::Currency).string_len(8).not_null())
                        .col(ColumnDef::new(PurchaseOrders::ExchangeRate).decimal().not_null())
                        .col(ColumnDef::new(PurchaseOrders::GrandTotal).decimal().not_null())
                        .col(ColumnDef::new(PurchaseOrders::Notes).string())
                        .col(ColumnDef::new(PurchaseOrders::RejectionReason).string())
                        .col(ColumnDef::new(PurchaseOrders::RejectedBy).uuid())
                        .col(
                            ColumnDef::new(PurchaseOrders::RejectedAt)
                                .timestamp_with_time_zone(),
                        )
                        .col(ColumnDef::new(PurchaseOrders::CreatedBy).uuid().not_null())
                        .col(
                            ColumnDef::new(PurchaseOrders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PurchaseOrderItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseOrderItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderItems::PurchaseOrderId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseOrderItems::ProductId).uuid().not_null())
                        .col(ColumnDef::new(PurchaseOrderItems::Quantity).integer().not_null())
                        .col(ColumnDef::new(PurchaseOrderItems::UnitPrice).decimal().not_null())
                        .col(ColumnDef::new(PurchaseOrderItems::TotalPrice).decimal().not_null())
                        .col(ColumnDef::new(PurchaseOrderItems::IsAsset).boolean().not_null())
                        .col(ColumnDef::new(PurchaseOrderItems::Specifications).string())
                        .col(
                            ColumnDef::new(PurchaseOrderItems::ReceivedQuantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderItems::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .from(
                                    PurchaseOrderItems::Table,
                                    PurchaseOrderItems::PurchaseOrderId,
                                )
                                .to(PurchaseOrders::Table, PurchaseOrders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PurchaseOrderItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PurchaseOrders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum PurchaseOrders {
        Table,
        Id,
        PoNumber,
        SupplierId,
        PurchaseRequestId,
        Status,
        OrderDate,
        ExpectedDeliveryDate,
        PaymentTerms,
        DeliveryTerms,
        Currency,
        ExchangeRate,
        GrandTotal,
        Notes,
        RejectionReason,
        RejectedBy,
        RejectedAt,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum PurchaseOrderItems {
        Table,
        Id,
        PurchaseOrderId,
        ProductId,
        Quantity,
        UnitPrice,
        TotalPrice,
        IsAsset,
        Specifications,
        ReceivedQuantity,
        CreatedAt,
    }
}

mod m20250101_000004_create_receiving_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000004_create_receiving_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(GoodsReceipts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(GoodsReceipts::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(GoodsReceipts::GrNumber).string().not_null())
                        .col(ColumnDef::new(GoodsReceipts::PurchaseOrderId).uuid().not_null())
                        .col(ColumnDef::new(GoodsReceipts::WarehouseId).uuid().not_null())
                        .col(ColumnDef::new(GoodsReceipts::ReceiptDate).date().not_null())
                        .col(
                            ColumnDef::new(GoodsReceipts::QualityCheckStatus)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(ColumnDef::new(GoodsReceipts::Notes).string())
                        .col(ColumnDef::new(GoodsReceipts::ReceivedBy).uuid().not_null())
                        .col(
                            ColumnDef::new(GoodsReceipts::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(GoodsReceiptItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(GoodsReceiptItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(GoodsReceiptItems::GoodsReceiptId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(GoodsReceiptItems::PurchaseOrderItemId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(GoodsReceiptItems::ProductId).uuid().not_null())
                        .col(
                            ColumnDef::new(GoodsReceiptItems::QuantityReceived)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(GoodsReceiptItems::QuantityAccepted)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(GoodsReceiptItems::QuantityRejected)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(GoodsReceiptItems::UnitCost).decimal().not_null())
                        .col(ColumnDef::new(GoodsReceiptItems::TotalCost).decimal().not_null())
                        .col(
                            ColumnDef::new(GoodsReceiptItems::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .from(
                                    GoodsReceiptItems::Table,
                                    GoodsReceiptItems::GoodsReceiptId,
                                )
                                .to(GoodsReceipts::Table, GoodsReceipts::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(InventoryItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryItems::ProductId).uuid().not_null())
                        .col(ColumnDef::new(InventoryItems::WarehouseId).uuid().not_null())
                        .col(ColumnDef::new(InventoryItems::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(InventoryItems::AvailableQuantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::ReservedQuantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .index(
                            Index::create()
                                .name("idx_inventory_product_warehouse")
                                .col(InventoryItems::ProductId)
                                .col(InventoryItems::WarehouseId)
                                .unique(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(InventoryTransactions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryTransactions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::InventoryItemId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::TransactionType)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::ReferenceType)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::ReferenceId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Assets::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Assets::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Assets::AssetNumber)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Assets::Name).string().not_null())
                        .col(ColumnDef::new(Assets::Valuation).decimal().not_null())
                        .col(ColumnDef::new(Assets::GoodsReceiptId).uuid().not_null())
                        .col(ColumnDef::new(Assets::PoNumber).string().not_null())
                        .col(ColumnDef::new(Assets::ProductId).uuid().not_null())
                        .col(ColumnDef::new(Assets::Status).string().not_null())
                        .col(
                            ColumnDef::new(Assets::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Assets::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(InventoryTransactions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(InventoryItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(GoodsReceiptItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(GoodsReceipts::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum GoodsReceipts {
        Table,
        Id,
        GrNumber,
        PurchaseOrderId,
        WarehouseId,
        ReceiptDate,
        QualityCheckStatus,
        Notes,
        ReceivedBy,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum GoodsReceiptItems {
        Table,
        Id,
        GoodsReceiptId,
        PurchaseOrderItemId,
        ProductId,
        QuantityReceived,
        QuantityAccepted,
        QuantityRejected,
        UnitCost,
        TotalCost,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum InventoryItems {
        Table,
        Id,
        ProductId,
        WarehouseId,
        Quantity,
        AvailableQuantity,
        ReservedQuantity,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum InventoryTransactions {
        Table,
        Id,
        InventoryItemId,
        TransactionType,
        Quantity,
        ReferenceType,
        ReferenceId,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Assets {
        Table,
        Id,
        AssetNumber,
        Name,
        Valuation,
        GoodsReceiptId,
        PoNumber,
        ProductId,
        Status,
        CreatedAt,
    }
}
