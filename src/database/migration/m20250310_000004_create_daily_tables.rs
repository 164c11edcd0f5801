use super::{DailyAssets, DailyUsages};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DailyUsages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DailyUsages::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DailyUsages::Date).date().not_null())
                    .col(
                        ColumnDef::new(DailyUsages::ServiceEnvironmentId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DailyUsages::TypeId).integer().not_null())
                    .col(ColumnDef::new(DailyUsages::WarehouseId).integer().null())
                    .col(
                        ColumnDef::new(DailyUsages::Value)
                            .decimal_len(16, 6)
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Report queries filter by usage type and date range
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_daily_usages_type_date")
                    .table(DailyUsages::Table)
                    .col(DailyUsages::TypeId)
                    .col(DailyUsages::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DailyAssets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DailyAssets::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DailyAssets::Date).date().not_null())
                    .col(
                        ColumnDef::new(DailyAssets::ServiceEnvironmentId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DailyAssets::AssetId).integer().not_null())
                    .col(
                        ColumnDef::new(DailyAssets::Price)
                            .decimal_len(16, 6)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DailyAssets::DailyCost)
                            .decimal_len(16, 6)
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_daily_assets_service_environment_date")
                    .table(DailyAssets::Table)
                    .col(DailyAssets::ServiceEnvironmentId)
                    .col(DailyAssets::Date)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DailyAssets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DailyUsages::Table).to_owned())
            .await
    }
}
