use crate::database::entities::{
    DailyAssetRecord, DailyUsageRecord, ExtraCostRecord, ServiceRecord, UsagePriceRecord,
    daily_assets, daily_usages, extra_costs, services, usage_prices,
};
use crate::database::{DatabaseError, DatabaseResult};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};

/// Usage filter shared by the per-unit and per-type queries
#[derive(Debug, Clone, Copy)]
pub struct UsageFilter {
    pub type_id: i32,
    pub warehouse_id: Option<i32>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Aggregation reads backing the venture report
pub struct ReportsDao {
    db: DatabaseConnection,
}

impl ReportsDao {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// All services in report order (name, then id)
    pub async fn services(&self) -> DatabaseResult<Vec<ServiceRecord>> {
        services::Entity::find()
            .order_by_asc(services::Column::Name)
            .order_by_asc(services::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }

    pub async fn daily_assets(
        &self,
        service_environment_ids: &[i32],
        start: NaiveDate,
        end: NaiveDate,
    ) -> DatabaseResult<Vec<DailyAssetRecord>> {
        if service_environment_ids.is_empty() {
            return Ok(Vec::new());
        }
        daily_assets::Entity::find()
            .filter(
                daily_assets::Column::ServiceEnvironmentId
                    .is_in(service_environment_ids.iter().copied()),
            )
            .filter(daily_assets::Column::Date.between(start, end))
            .all(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }

    pub async fn daily_usages(
        &self,
        service_environment_ids: &[i32],
        filter: UsageFilter,
    ) -> DatabaseResult<Vec<DailyUsageRecord>> {
        if service_environment_ids.is_empty() {
            return Ok(Vec::new());
        }
        daily_usages::Entity::find()
            .filter(
                daily_usages::Column::ServiceEnvironmentId
                    .is_in(service_environment_ids.iter().copied()),
            )
            .filter(usage_condition(&filter))
            .order_by_asc(daily_usages::Column::Date)
            .all(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }

    /// Sum of a usage type's daily values across every service environment
    pub async fn total_usage(&self, filter: UsageFilter) -> DatabaseResult<Decimal> {
        let values: Vec<Decimal> = daily_usages::Entity::find()
            .select_only()
            .column(daily_usages::Column::Value)
            .filter(usage_condition(&filter))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        Ok(values.into_iter().sum())
    }

    /// Price records of a type that overlap the range
    pub async fn usage_prices(&self, filter: UsageFilter) -> DatabaseResult<Vec<UsagePriceRecord>> {
        let mut query = usage_prices::Entity::find()
            .filter(usage_prices::Column::TypeId.eq(filter.type_id))
            .filter(usage_prices::Column::StartDate.lte(filter.end))
            .filter(usage_prices::Column::EndDate.gte(filter.start));
        query = match filter.warehouse_id {
            Some(warehouse_id) => query.filter(usage_prices::Column::WarehouseId.eq(warehouse_id)),
            None => query,
        };

        query
            .order_by_asc(usage_prices::Column::StartDate)
            .all(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }

    /// Extra costs of the given service environments overlapping the range
    pub async fn extra_costs(
        &self,
        service_environment_ids: &[i32],
        start: NaiveDate,
        end: NaiveDate,
    ) -> DatabaseResult<Vec<ExtraCostRecord>> {
        if service_environment_ids.is_empty() {
            return Ok(Vec::new());
        }
        extra_costs::Entity::find()
            .filter(
                extra_costs::Column::ServiceEnvironmentId
                    .is_in(service_environment_ids.iter().copied()),
            )
            .filter(extra_costs::Column::StartDate.lte(end))
            .filter(extra_costs::Column::EndDate.gte(start))
            .all(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }
}

fn usage_condition(filter: &UsageFilter) -> Condition {
    let condition = Condition::all()
        .add(daily_usages::Column::TypeId.eq(filter.type_id))
        .add(daily_usages::Column::Date.between(filter.start, filter.end));
    match filter.warehouse_id {
        Some(warehouse_id) => condition.add(daily_usages::Column::WarehouseId.eq(warehouse_id)),
        None => condition,
    }
}
