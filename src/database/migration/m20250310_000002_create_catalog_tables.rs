use super::{DynamicExtraCostTypes, ExtraCostTypes, Teams, UsageTypes, Warehouses};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Tables holding nothing but an id and a name
async fn create_named_table<T>(manager: &SchemaManager<'_>, table: T, id: T, name: T) -> Result<(), DbErr>
where
    T: Iden + 'static,
{
    manager
        .create_table(
            Table::create()
                .table(table)
                .if_not_exists()
                .col(
                    ColumnDef::new(id)
                        .integer()
                        .not_null()
                        .auto_increment()
                        .primary_key(),
                )
                .col(ColumnDef::new(name).string().not_null())
                .to_owned(),
        )
        .await
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Warehouses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Warehouses::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Warehouses::Name).string().not_null())
                    .col(
                        ColumnDef::new(Warehouses::ShowInReport)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UsageTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UsageTypes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UsageTypes::Name).string().not_null())
                    .col(
                        ColumnDef::new(UsageTypes::Kind)
                            .string_len(2)
                            .not_null()
                            .default("SU"),
                    )
                    .col(
                        ColumnDef::new(UsageTypes::IsManuallyType)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(UsageTypes::ByWarehouse)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(UsageTypes::ShowInReport)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(UsageTypes::ShowValuePercentage)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(UsageTypes::ShowPricePercentage)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        create_named_table(manager, Teams::Table, Teams::Id, Teams::Name).await?;
        create_named_table(
            manager,
            ExtraCostTypes::Table,
            ExtraCostTypes::Id,
            ExtraCostTypes::Name,
        )
        .await?;
        create_named_table(
            manager,
            DynamicExtraCostTypes::Table,
            DynamicExtraCostTypes::Id,
            DynamicExtraCostTypes::Name,
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DynamicExtraCostTypes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExtraCostTypes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Teams::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UsageTypes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Warehouses::Table).to_owned())
            .await
    }
}
