//! Test harness: an in-memory server plus fixture inserts
//!
//! Shared by unit tests and the `tests/` integration suites.

use crate::{
    config::Config,
    database::entities::{
        DailyAssetRecord, DailyUsageRecord, DynamicExtraCostTypeRecord,
        EnvironmentRecord, ExtraCostRecord, ExtraCostTypeRecord, ServiceEnvironmentRecord,
        ServiceRecord, TeamRecord, UsagePriceRecord, UsageTypeRecord, WarehouseRecord,
        daily_assets, daily_usages, dynamic_extra_cost_types, environments, extra_cost_types,
        extra_costs, service_environments, services, teams, usage_prices, usage_types, warehouses,
    },
    period::Period,
    server::Server,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// Test server builder backed by a migrated in-memory SQLite database
pub struct TestServerBuilder {
    config: Config,
}

impl TestServerBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub async fn build(self) -> Server {
        let mut config = self.config;
        config.database.url = "sqlite::memory:".to_string();
        // every connection to sqlite::memory: is a separate database
        config.database.max_connections = 1;
        config.metrics.enabled = false;
        config.logging.log_request = false;

        let server = Server::new(config)
            .await
            .expect("Failed to create test server");
        server
            .database
            .migrate()
            .await
            .expect("Failed to migrate test database");
        server
    }
}

impl Default for TestServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

pub fn month(year: i32, month: u32) -> Period {
    Period::from_year_month(year, month).expect("valid test month")
}

pub async fn create_service(
    db: &DatabaseConnection,
    name: &str,
    ci_uid: Option<&str>,
    parent_id: Option<i32>,
) -> ServiceRecord {
    services::ActiveModel {
        name: Set(name.to_string()),
        ci_uid: Set(ci_uid.map(str::to_string)),
        parent_id: Set(parent_id),
        is_active: Set(true),
        department: Set(String::new()),
        business_segment: Set(String::new()),
        profit_center: Set(String::new()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert service")
}

pub async fn create_environment(db: &DatabaseConnection, name: &str) -> EnvironmentRecord {
    environments::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert environment")
}

pub async fn create_service_environment(
    db: &DatabaseConnection,
    service_id: i32,
    environment_id: i32,
) -> ServiceEnvironmentRecord {
    service_environments::ActiveModel {
        service_id: Set(service_id),
        environment_id: Set(environment_id),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert service environment")
}

/// Report-visible usage type with both percentage columns; `BU` types are manual
pub async fn create_usage_type(
    db: &DatabaseConnection,
    name: &str,
    kind: &str,
    by_warehouse: bool,
) -> UsageTypeRecord {
    usage_types::ActiveModel {
        name: Set(name.to_string()),
        kind: Set(kind.to_string()),
        is_manually_type: Set(kind == usage_types::BASE_USAGE_KIND),
        by_warehouse: Set(by_warehouse),
        show_in_report: Set(true),
        show_value_percentage: Set(true),
        show_price_percentage: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert usage type")
}

pub async fn create_warehouse(
    db: &DatabaseConnection,
    name: &str,
    show_in_report: bool,
) -> WarehouseRecord {
    warehouses::ActiveModel {
        name: Set(name.to_string()),
        show_in_report: Set(show_in_report),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert warehouse")
}

pub async fn create_team(db: &DatabaseConnection, name: &str) -> TeamRecord {
    teams::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert team")
}

pub async fn create_extra_cost_type(db: &DatabaseConnection, name: &str) -> ExtraCostTypeRecord {
    extra_cost_types::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert extra cost type")
}

pub async fn create_dynamic_extra_cost_type(
    db: &DatabaseConnection,
    name: &str,
) -> DynamicExtraCostTypeRecord {
    dynamic_extra_cost_types::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert dynamic extra cost type")
}

/// Price record with identical actual and forecast values
pub async fn create_usage_price(
    db: &DatabaseConnection,
    type_id: i32,
    warehouse_id: Option<i32>,
    period: &Period,
    price: Decimal,
    cost: Decimal,
) -> UsagePriceRecord {
    usage_prices::ActiveModel {
        type_id: Set(type_id),
        warehouse_id: Set(warehouse_id),
        start_date: Set(period.start),
        end_date: Set(period.end),
        price: Set(price),
        forecast_price: Set(price),
        cost: Set(cost),
        forecast_cost: Set(cost),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert usage price")
}

pub async fn create_extra_cost(
    db: &DatabaseConnection,
    extra_cost_type_id: i32,
    service_environment_id: i32,
    period: &Period,
    cost: Decimal,
    forecast_cost: Decimal,
) -> ExtraCostRecord {
    extra_costs::ActiveModel {
        extra_cost_type_id: Set(extra_cost_type_id),
        service_environment_id: Set(service_environment_id),
        start_date: Set(period.start),
        end_date: Set(period.end),
        cost: Set(cost),
        forecast_cost: Set(forecast_cost),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert extra cost")
}

pub async fn create_daily_usage(
    db: &DatabaseConnection,
    date: NaiveDate,
    service_environment_id: i32,
    type_id: i32,
    warehouse_id: Option<i32>,
    value: Decimal,
) -> DailyUsageRecord {
    daily_usages::ActiveModel {
        date: Set(date),
        service_environment_id: Set(service_environment_id),
        type_id: Set(type_id),
        warehouse_id: Set(warehouse_id),
        value: Set(value),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert daily usage")
}

pub async fn create_daily_asset(
    db: &DatabaseConnection,
    date: NaiveDate,
    service_environment_id: i32,
    asset_id: i32,
    price: Decimal,
    daily_cost: Decimal,
) -> DailyAssetRecord {
    daily_assets::ActiveModel {
        date: Set(date),
        service_environment_id: Set(service_environment_id),
        asset_id: Set(asset_id),
        price: Set(price),
        daily_cost: Set(daily_cost),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert daily asset")
}
