use super::{DynamicExtraCosts, ExtraCosts, TeamCosts, UsagePrices};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

fn money(column: impl IntoIden) -> ColumnDef {
    ColumnDef::new(column)
        .decimal_len(16, 6)
        .not_null()
        .default(0)
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UsagePrices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UsagePrices::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UsagePrices::TypeId).integer().not_null())
                    .col(ColumnDef::new(UsagePrices::WarehouseId).integer().null())
                    .col(ColumnDef::new(UsagePrices::StartDate).date().not_null())
                    .col(ColumnDef::new(UsagePrices::EndDate).date().not_null())
                    .col(money(UsagePrices::Price))
                    .col(money(UsagePrices::ForecastPrice))
                    .col(money(UsagePrices::Cost))
                    .col(money(UsagePrices::ForecastCost))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_usage_prices_type_period")
                    .table(UsagePrices::Table)
                    .col(UsagePrices::TypeId)
                    .col(UsagePrices::StartDate)
                    .col(UsagePrices::EndDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TeamCosts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TeamCosts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TeamCosts::TeamId).integer().not_null())
                    .col(ColumnDef::new(TeamCosts::StartDate).date().not_null())
                    .col(ColumnDef::new(TeamCosts::EndDate).date().not_null())
                    .col(
                        ColumnDef::new(TeamCosts::MembersCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(money(TeamCosts::Cost))
                    .col(money(TeamCosts::ForecastCost))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_team_costs_team_period")
                    .table(TeamCosts::Table)
                    .col(TeamCosts::TeamId)
                    .col(TeamCosts::StartDate)
                    .col(TeamCosts::EndDate)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DynamicExtraCosts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DynamicExtraCosts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DynamicExtraCosts::DynamicExtraCostTypeId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DynamicExtraCosts::StartDate)
                            .date()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DynamicExtraCosts::EndDate).date().not_null())
                    .col(money(DynamicExtraCosts::Cost))
                    .col(money(DynamicExtraCosts::ForecastCost))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_dynamic_extra_costs_type_period")
                    .table(DynamicExtraCosts::Table)
                    .col(DynamicExtraCosts::DynamicExtraCostTypeId)
                    .col(DynamicExtraCosts::StartDate)
                    .col(DynamicExtraCosts::EndDate)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ExtraCosts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExtraCosts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ExtraCosts::ExtraCostTypeId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExtraCosts::ServiceEnvironmentId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ExtraCosts::StartDate).date().not_null())
                    .col(ColumnDef::new(ExtraCosts::EndDate).date().not_null())
                    .col(money(ExtraCosts::Cost))
                    .col(money(ExtraCosts::ForecastCost))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_extra_costs_period")
                    .table(ExtraCosts::Table)
                    .col(ExtraCosts::StartDate)
                    .col(ExtraCosts::EndDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ExtraCosts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DynamicExtraCosts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TeamCosts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UsagePrices::Table).to_owned())
            .await
    }
}
