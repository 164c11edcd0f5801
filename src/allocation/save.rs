use super::AllocationError;
use super::types::{
    BaseUsageRow, DynamicExtraCostRow, ExtraCostBatch, ServiceEnvironmentRef, TeamCostRow,
};
use crate::database::entities::{
    ServiceEnvironmentRecord, dynamic_extra_cost_types, dynamic_extra_costs, extra_cost_types,
    extra_costs, service_environments, team_costs, teams, usage_prices, usage_types, warehouses,
};
use crate::period::Period;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, Set,
};
use std::collections::HashSet;
use tracing::debug;

pub(super) async fn save_base_usages(
    txn: &DatabaseTransaction,
    period: &Period,
    rows: Vec<BaseUsageRow>,
) -> Result<(), AllocationError> {
    for row in rows {
        let usage_type = usage_types::Entity::find_by_id(row.usage_type.id)
            .one(txn)
            .await?
            .ok_or(AllocationError::NoUsageType(row.usage_type.id))?;

        let warehouse_id = match &row.warehouse {
            Some(warehouse) => Some(
                warehouses::Entity::find_by_id(warehouse.id)
                    .one(txn)
                    .await?
                    .ok_or(AllocationError::NoWarehouse(warehouse.id))?
                    .id,
            ),
            None => None,
        };

        let mut query = usage_prices::Entity::find()
            .filter(usage_prices::Column::TypeId.eq(usage_type.id))
            .filter(usage_prices::Column::StartDate.eq(period.start))
            .filter(usage_prices::Column::EndDate.eq(period.end));
        query = match warehouse_id {
            Some(id) => query.filter(usage_prices::Column::WarehouseId.eq(id)),
            None => query.filter(usage_prices::Column::WarehouseId.is_null()),
        };

        match query.one(txn).await? {
            Some(existing) => {
                let mut active: usage_prices::ActiveModel = existing.into();
                active.cost = Set(row.cost);
                active.forecast_cost = Set(row.forecast_cost);
                active.update(txn).await?;
            }
            None => {
                usage_prices::ActiveModel {
                    id: ActiveValue::NotSet,
                    type_id: Set(usage_type.id),
                    warehouse_id: Set(warehouse_id),
                    start_date: Set(period.start),
                    end_date: Set(period.end),
                    price: Set(Decimal::ZERO),
                    forecast_price: Set(Decimal::ZERO),
                    cost: Set(row.cost),
                    forecast_cost: Set(row.forecast_cost),
                }
                .insert(txn)
                .await?;
            }
        }
        debug!(usage_type = usage_type.id, ?warehouse_id, "Saved usage price");
    }

    Ok(())
}

pub(super) async fn save_team_costs(
    txn: &DatabaseTransaction,
    period: &Period,
    rows: Vec<TeamCostRow>,
) -> Result<(), AllocationError> {
    for row in rows {
        let team = teams::Entity::find_by_id(row.team.id)
            .one(txn)
            .await?
            .ok_or(AllocationError::TeamDoesNotExist(row.team.id))?;

        let existing = team_costs::Entity::find()
            .filter(team_costs::Column::TeamId.eq(team.id))
            .filter(team_costs::Column::StartDate.eq(period.start))
            .filter(team_costs::Column::EndDate.eq(period.end))
            .one(txn)
            .await?;

        match existing {
            Some(existing) => {
                let mut active: team_costs::ActiveModel = existing.into();
                active.cost = Set(row.cost);
                active.forecast_cost = Set(row.forecast_cost);
                active.members_count = Set(row.members);
                active.update(txn).await?;
            }
            None => {
                team_costs::ActiveModel {
                    id: ActiveValue::NotSet,
                    team_id: Set(team.id),
                    start_date: Set(period.start),
                    end_date: Set(period.end),
                    members_count: Set(row.members),
                    cost: Set(row.cost),
                    forecast_cost: Set(row.forecast_cost),
                }
                .insert(txn)
                .await?;
            }
        }
    }

    Ok(())
}

pub(super) async fn save_dynamic_extra_costs(
    txn: &DatabaseTransaction,
    period: &Period,
    rows: Vec<DynamicExtraCostRow>,
) -> Result<(), AllocationError> {
    for row in rows {
        let type_id = row.dynamic_extra_cost_type.id;
        let cost_type = dynamic_extra_cost_types::Entity::find_by_id(type_id)
            .one(txn)
            .await?
            .ok_or(AllocationError::NoDynamicExtraCostType(type_id))?;

        let existing = dynamic_extra_costs::Entity::find()
            .filter(dynamic_extra_costs::Column::DynamicExtraCostTypeId.eq(cost_type.id))
            .filter(dynamic_extra_costs::Column::StartDate.eq(period.start))
            .filter(dynamic_extra_costs::Column::EndDate.eq(period.end))
            .one(txn)
            .await?;

        match existing {
            Some(existing) => {
                let mut active: dynamic_extra_costs::ActiveModel = existing.into();
                active.cost = Set(row.cost);
                active.forecast_cost = Set(row.forecast_cost);
                active.update(txn).await?;
            }
            None => {
                dynamic_extra_costs::ActiveModel {
                    id: ActiveValue::NotSet,
                    dynamic_extra_cost_type_id: Set(cost_type.id),
                    start_date: Set(period.start),
                    end_date: Set(period.end),
                    cost: Set(row.cost),
                    forecast_cost: Set(row.forecast_cost),
                }
                .insert(txn)
                .await?;
            }
        }
    }

    Ok(())
}

async fn resolve_target(
    txn: &DatabaseTransaction,
    target: ServiceEnvironmentRef,
) -> Result<ServiceEnvironmentRecord, AllocationError> {
    match target {
        ServiceEnvironmentRef::Resolved(record) => Ok(record),
        ServiceEnvironmentRef::Lookup {
            service_id,
            environment_id,
        } => service_environments::Entity::find()
            .filter(service_environments::Column::ServiceId.eq(service_id))
            .filter(service_environments::Column::EnvironmentId.eq(environment_id))
            .one(txn)
            .await?
            .ok_or(AllocationError::ServiceEnvironmentDoesNotExist {
                service_id,
                environment_id,
            }),
    }
}

/// Upsert every targeted entry, then drop the period's extra costs that were
/// not part of the batch.
pub(super) async fn save_extra_costs(
    txn: &DatabaseTransaction,
    period: &Period,
    batches: Vec<ExtraCostBatch>,
) -> Result<(), AllocationError> {
    let mut saved_ids = HashSet::new();

    for batch in batches {
        let cost_type = extra_cost_types::Entity::find_by_id(batch.extra_cost_type_id)
            .one(txn)
            .await?
            .ok_or(AllocationError::NoExtraCostType(batch.extra_cost_type_id))?;

        for entry in batch.entries {
            let Some(target) = entry.target else {
                continue;
            };
            let service_environment = resolve_target(txn, target).await?;

            let saved = match entry.id {
                Some(id) => {
                    let existing = extra_costs::Entity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or(AllocationError::NoExtraCost(id))?;
                    let mut active: extra_costs::ActiveModel = existing.into();
                    active.service_environment_id = Set(service_environment.id);
                    active.cost = Set(entry.cost);
                    active.forecast_cost = Set(entry.forecast_cost);
                    active.update(txn).await?
                }
                None => {
                    extra_costs::ActiveModel {
                        id: ActiveValue::NotSet,
                        extra_cost_type_id: Set(cost_type.id),
                        service_environment_id: Set(service_environment.id),
                        start_date: Set(period.start),
                        end_date: Set(period.end),
                        cost: Set(entry.cost),
                        forecast_cost: Set(entry.forecast_cost),
                    }
                    .insert(txn)
                    .await?
                }
            };
            saved_ids.insert(saved.id);
        }
    }

    let mut delete = extra_costs::Entity::delete_many()
        .filter(extra_costs::Column::StartDate.eq(period.start))
        .filter(extra_costs::Column::EndDate.eq(period.end));
    if !saved_ids.is_empty() {
        delete = delete.filter(extra_costs::Column::Id.is_not_in(saved_ids));
    }
    let deleted = delete.exec(txn).await?;
    debug!(rows = deleted.rows_affected, "Removed extra costs missing from batch");

    Ok(())
}
