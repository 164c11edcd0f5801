use crate::database::entities::{
    DynamicExtraCostRecord, ExtraCostRecord, TeamCostRecord, UsagePriceRecord,
    dynamic_extra_costs, extra_costs, team_costs, usage_prices,
};
use crate::database::{DatabaseError, DatabaseResult};
use crate::period::Period;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

/// Allocation records keyed by exactly one period
pub struct AllocationsDao {
    db: DatabaseConnection,
}

impl AllocationsDao {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn usage_prices(&self, period: &Period) -> DatabaseResult<Vec<UsagePriceRecord>> {
        usage_prices::Entity::find()
            .filter(usage_prices::Column::StartDate.eq(period.start))
            .filter(usage_prices::Column::EndDate.eq(period.end))
            .order_by_asc(usage_prices::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }

    pub async fn team_costs(&self, period: &Period) -> DatabaseResult<Vec<TeamCostRecord>> {
        team_costs::Entity::find()
            .filter(team_costs::Column::StartDate.eq(period.start))
            .filter(team_costs::Column::EndDate.eq(period.end))
            .order_by_asc(team_costs::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }

    pub async fn dynamic_extra_costs(
        &self,
        period: &Period,
    ) -> DatabaseResult<Vec<DynamicExtraCostRecord>> {
        dynamic_extra_costs::Entity::find()
            .filter(dynamic_extra_costs::Column::StartDate.eq(period.start))
            .filter(dynamic_extra_costs::Column::EndDate.eq(period.end))
            .order_by_asc(dynamic_extra_costs::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }

    pub async fn extra_costs(&self, period: &Period) -> DatabaseResult<Vec<ExtraCostRecord>> {
        extra_costs::Entity::find()
            .filter(extra_costs::Column::StartDate.eq(period.start))
            .filter(extra_costs::Column::EndDate.eq(period.end))
            .order_by_asc(extra_costs::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }
}
