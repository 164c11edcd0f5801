use crate::database::entities::{
    DynamicExtraCostTypeRecord, ExtraCostTypeRecord, TeamRecord, UsageTypeRecord,
    WarehouseRecord, dynamic_extra_cost_types, extra_cost_types, teams, usage_types, warehouses,
};
use crate::database::{DatabaseError, DatabaseResult};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

/// Read access to the allocation dictionaries (usage types, warehouses, teams, cost types)
pub struct CatalogDao {
    db: DatabaseConnection,
}

impl CatalogDao {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Base usage types whose prices are entered by hand
    pub async fn manual_base_usage_types(&self) -> DatabaseResult<Vec<UsageTypeRecord>> {
        usage_types::Entity::find()
            .filter(usage_types::Column::Kind.eq(usage_types::BASE_USAGE_KIND))
            .filter(usage_types::Column::IsManuallyType.eq(true))
            .order_by_asc(usage_types::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }

    /// Usage types shown as report columns, in name order
    pub async fn report_usage_types(&self) -> DatabaseResult<Vec<UsageTypeRecord>> {
        usage_types::Entity::find()
            .filter(usage_types::Column::ShowInReport.eq(true))
            .order_by_asc(usage_types::Column::Name)
            .order_by_asc(usage_types::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }

    pub async fn report_warehouses(&self) -> DatabaseResult<Vec<WarehouseRecord>> {
        warehouses::Entity::find()
            .filter(warehouses::Column::ShowInReport.eq(true))
            .order_by_asc(warehouses::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }

    pub async fn teams(&self) -> DatabaseResult<Vec<TeamRecord>> {
        teams::Entity::find()
            .order_by_asc(teams::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }

    /// Extra cost types in name order
    pub async fn extra_cost_types(&self) -> DatabaseResult<Vec<ExtraCostTypeRecord>> {
        extra_cost_types::Entity::find()
            .order_by_asc(extra_cost_types::Column::Name)
            .order_by_asc(extra_cost_types::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }

    pub async fn dynamic_extra_cost_types(
        &self,
    ) -> DatabaseResult<Vec<DynamicExtraCostTypeRecord>> {
        dynamic_extra_cost_types::Entity::find()
            .order_by_asc(dynamic_extra_cost_types::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }
}
