// The `MigrationTrait` methods take `&SchemaManager` with a late-bound elided
// lifetime; writing it as `&SchemaManager<'_>` makes the lifetime early-bound
// and fails the trait match (E0195), so allow the `rust_2018_idioms` lint here.
#![allow(elided_lifetimes_in_paths)]

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_users_table::Migration),
            Box::new(m20240601_000002_create_categories_table::Migration),
            Box::new(m20240601_000003_create_machines_table::Migration),
            Box::new(m20240601_000004_create_materials_table::Migration),
            Box::new(m20240601_000005_create_stock_records_table::Migration),
            Box::new(m20240601_000006_create_stock_transactions_table::Migration),
        ]
    }
}

mod m20240601_000001_create_users_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000001_create_users_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Users::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Users::Name).string().not_null())
                        .col(ColumnDef::new(Users::Email).string().not_null())
                        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                        .col(ColumnDef::new(Users::Role).string().not_null())
                        .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_users_email")
                        .table(Users::Table)
                        .col(Users::Email)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Users {
        Table,
        Id,
        Name,
        Email,
        PasswordHash,
        Role,
        CreatedAt,
    }
}

mod m20240601_000002_create_categories_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000002_create_categories_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Categories::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Categories::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Categories::Name).string().not_null())
                        .col(ColumnDef::new(Categories::CreatedBy).uuid().not_null())
                        .col(
                            ColumnDef::new(Categories::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Categories::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Categories {
        Table,
        Id,
        Name,
        CreatedBy,
        CreatedAt,
    }
}

mod m20240601_000003_create_machines_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000003_create_machines_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Machines::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Machines::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Machines::Name).string().not_null())
                        .col(ColumnDef::new(Machines::CreatedBy).uuid().not_null())
                        .col(ColumnDef::new(Machines::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Machines::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Machines {
        Table,
        Id,
        Name,
        CreatedBy,
        CreatedAt,
    }
}

mod m20240601_000004_create_materials_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000004_create_materials_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Materials::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Materials::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Materials::Name).string().not_null())
                        .col(ColumnDef::new(Materials::CategoryId).uuid().not_null())
                        .col(ColumnDef::new(Materials::MachineId).uuid().null())
                        .col(
                            ColumnDef::new(Materials::UnitPrice)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Materials::Location).string().not_null())
                        .col(ColumnDef::new(Materials::Cupboard).string().null())
                        .col(ColumnDef::new(Materials::Shelf).string().null())
                        .col(
                            ColumnDef::new(Materials::MinQuantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Materials::CreatedBy).uuid().not_null())
                        .col(ColumnDef::new(Materials::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Materials::UpdatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_materials_category_id")
                        .table(Materials::Table)
                        .col(Materials::CategoryId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Materials::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Materials {
        Table,
        Id,
        Name,
        CategoryId,
        MachineId,
        UnitPrice,
        Location,
        Cupboard,
        Shelf,
        MinQuantity,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240601_000005_create_stock_records_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000005_create_stock_records_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(StockRecords::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockRecords::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockRecords::MaterialId).uuid().not_null())
                        .col(
                            ColumnDef::new(StockRecords::MaterialName)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockRecords::CategoryId).uuid().not_null())
                        .col(
                            ColumnDef::new(StockRecords::CategoryName)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockRecords::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(StockRecords::OwnerName).string().not_null())
                        .col(ColumnDef::new(StockRecords::AssignedDate).date().not_null())
                        .col(
                            ColumnDef::new(StockRecords::Version)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(StockRecords::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockRecords::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // One record per material; the ledger relies on this to catch
            // first-insert races.
            manager
                .create_index(
                    Index::create()
                        .name("idx_stock_records_material_id")
                        .table(StockRecords::Table)
                        .col(StockRecords::MaterialId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StockRecords::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum StockRecords {
        Table,
        Id,
        MaterialId,
        MaterialName,
        CategoryId,
        CategoryName,
        Quantity,
        OwnerName,
        AssignedDate,
        Version,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240601_000006_create_stock_transactions_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000006_create_stock_transactions_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(StockTransactions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockTransactions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockTransactions::MaterialId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockTransactions::MaterialName)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockTransactions::CategoryId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockTransactions::CategoryName)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockTransactions::Action).string().not_null())
                        .col(
                            ColumnDef::new(StockTransactions::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockTransactions::NewQuantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockTransactions::OwnerName)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockTransactions::AssignedDate)
                                .date()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockTransactions::WorkType)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockTransactions::MachineId).uuid().null())
                        .col(
                            ColumnDef::new(StockTransactions::MachineName)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(StockTransactions::Remarks).string().null())
                        .col(
                            ColumnDef::new(StockTransactions::RecordedBy)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockTransactions::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_stock_transactions_material_id")
                        .table(StockTransactions::Table)
                        .col(StockTransactions::MaterialId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_stock_transactions_created_at")
                        .table(StockTransactions::Table)
                        .col(StockTransactions::CreatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StockTransactions::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum StockTransactions {
        Table,
        Id,
        MaterialId,
        MaterialName,
        CategoryId,
        CategoryName,
        Action,
        Quantity,
        NewQuantity,
        OwnerName,
        AssignedDate,
        WorkType,
        MachineId,
        MachineName,
        Remarks,
        RecordedBy,
        CreatedAt,
    }
}
