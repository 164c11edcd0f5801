use sea_orm_migration::prelude::*;

pub use sea_orm_migration::MigratorTrait;

mod m20250310_000001_create_services_tables;
mod m20250310_000002_create_catalog_tables;
mod m20250310_000003_create_allocation_tables;
mod m20250310_000004_create_daily_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250310_000001_create_services_tables::Migration),
            Box::new(m20250310_000002_create_catalog_tables::Migration),
            Box::new(m20250310_000003_create_allocation_tables::Migration),
            Box::new(m20250310_000004_create_daily_tables::Migration),
        ]
    }
}

/// Common table and column identifiers
#[derive(Iden)]
pub enum Services {
    Table,
    Id,
    Name,
    CiUid,
    ParentId,
    IsActive,
    Department,
    BusinessSegment,
    ProfitCenter,
}

#[derive(Iden)]
pub enum Environments {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
pub enum ServiceEnvironments {
    Table,
    Id,
    ServiceId,
    EnvironmentId,
}

#[derive(Iden)]
pub enum Warehouses {
    Table,
    Id,
    Name,
    ShowInReport,
}

#[derive(Iden)]
pub enum UsageTypes {
    Table,
    Id,
    Name,
    Kind,
    IsManuallyType,
    ByWarehouse,
    ShowInReport,
    ShowValuePercentage,
    ShowPricePercentage,
}

#[derive(Iden)]
pub enum Teams {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
pub enum ExtraCostTypes {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
pub enum DynamicExtraCostTypes {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
pub enum UsagePrices {
    Table,
    Id,
    TypeId,
    WarehouseId,
    StartDate,
    EndDate,
    Price,
    ForecastPrice,
    Cost,
    ForecastCost,
}

#[derive(Iden)]
pub enum TeamCosts {
    Table,
    Id,
    TeamId,
    StartDate,
    EndDate,
    MembersCount,
    Cost,
    ForecastCost,
}

#[derive(Iden)]
pub enum DynamicExtraCosts {
    Table,
    Id,
    DynamicExtraCostTypeId,
    StartDate,
    EndDate,
    Cost,
    ForecastCost,
}

#[derive(Iden)]
pub enum ExtraCosts {
    Table,
    Id,
    ExtraCostTypeId,
    ServiceEnvironmentId,
    StartDate,
    EndDate,
    Cost,
    ForecastCost,
}

#[derive(Iden)]
pub enum DailyUsages {
    Table,
    Id,
    Date,
    ServiceEnvironmentId,
    TypeId,
    WarehouseId,
    Value,
}

#[derive(Iden)]
pub enum DailyAssets {
    Table,
    Id,
    Date,
    ServiceEnvironmentId,
    AssetId,
    Price,
    DailyCost,
}
