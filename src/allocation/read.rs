use super::AllocationError;
use super::types::{
    AllocationAdminContent, BaseUsageRow, Category, DynamicExtraCostRow, ExtraCostEntry,
    ExtraCostGroup, NamedRef, TeamCostRow,
};
use crate::database::DatabaseManager;
use crate::period::Period;
use rust_decimal::Decimal;
use std::collections::HashMap;

fn money(value: Decimal) -> Decimal {
    value.round_dp(2)
}

pub(super) async fn load_content(
    database: &dyn DatabaseManager,
    period: &Period,
) -> Result<AllocationAdminContent, AllocationError> {
    Ok(AllocationAdminContent {
        baseusages: Category::new(
            "Base Usages",
            "tabbaseusages.html",
            base_usages(database, period).await?,
        ),
        teamcosts: Category::new(
            "Team Costs",
            "tabteamcosts.html",
            team_costs(database, period).await?,
        ),
        dynamicextracosts: Category::new(
            "Dynamic Extra Costs",
            "tabdynamicextracosts.html",
            dynamic_extra_costs(database, period).await?,
        ),
        extracosts: Category::new(
            "Extra Costs",
            "tabextracostsadmin.html",
            extra_costs(database, period).await?,
        ),
    })
}

async fn base_usages(
    database: &dyn DatabaseManager,
    period: &Period,
) -> Result<Vec<BaseUsageRow>, AllocationError> {
    let catalog = database.catalog();
    let usage_types = catalog.manual_base_usage_types().await?;
    let warehouses = catalog.report_warehouses().await?;

    // first record wins when duplicates exist
    let mut prices = HashMap::new();
    let mut any_warehouse = HashMap::new();
    for price in database.allocations().usage_prices(period).await? {
        let amounts = (price.cost, price.forecast_cost);
        prices
            .entry((price.type_id, price.warehouse_id))
            .or_insert(amounts);
        any_warehouse.entry(price.type_id).or_insert(amounts);
    }
    let lookup = |type_id: i32, warehouse_id: Option<i32>| {
        prices
            .get(&(type_id, warehouse_id))
            .copied()
            .unwrap_or((Decimal::ZERO, Decimal::ZERO))
    };
    // types not split by warehouse still show a record saved with one
    let lookup_any = |type_id: i32| {
        prices
            .get(&(type_id, None))
            .or_else(|| any_warehouse.get(&type_id))
            .copied()
            .unwrap_or((Decimal::ZERO, Decimal::ZERO))
    };

    let mut rows = Vec::new();
    for usage_type in usage_types {
        let type_ref = NamedRef::new(usage_type.id, usage_type.name.clone());
        if !usage_type.by_warehouse {
            let (cost, forecast_cost) = lookup_any(usage_type.id);
            rows.push(BaseUsageRow {
                usage_type: type_ref,
                cost: money(cost),
                forecast_cost: money(forecast_cost),
                warehouse: None,
            });
            continue;
        }

        for warehouse in &warehouses {
            let (cost, forecast_cost) = lookup(usage_type.id, Some(warehouse.id));
            rows.push(BaseUsageRow {
                usage_type: type_ref.clone(),
                cost: money(cost),
                forecast_cost: money(forecast_cost),
                warehouse: Some(NamedRef::new(warehouse.id, warehouse.name.clone())),
            });
        }
    }

    Ok(rows)
}

async fn team_costs(
    database: &dyn DatabaseManager,
    period: &Period,
) -> Result<Vec<TeamCostRow>, AllocationError> {
    let teams = database.catalog().teams().await?;
    let mut costs = HashMap::new();
    for team_cost in database.allocations().team_costs(period).await? {
        costs.entry(team_cost.team_id).or_insert(team_cost);
    }

    Ok(teams
        .into_iter()
        .map(|team| {
            let (members, cost, forecast_cost) = costs
                .get(&team.id)
                .map(|c| (c.members_count, c.cost, c.forecast_cost))
                .unwrap_or((0, Decimal::ZERO, Decimal::ZERO));
            TeamCostRow {
                team: NamedRef::new(team.id, team.name),
                cost: money(cost),
                forecast_cost: money(forecast_cost),
                members,
            }
        })
        .collect())
}

async fn dynamic_extra_costs(
    database: &dyn DatabaseManager,
    period: &Period,
) -> Result<Vec<DynamicExtraCostRow>, AllocationError> {
    let types = database.catalog().dynamic_extra_cost_types().await?;
    let mut costs = HashMap::new();
    for cost in database.allocations().dynamic_extra_costs(period).await? {
        costs
            .entry(cost.dynamic_extra_cost_type_id)
            .or_insert((cost.cost, cost.forecast_cost));
    }

    Ok(types
        .into_iter()
        .map(|cost_type| {
            let (cost, forecast_cost) = costs
                .get(&cost_type.id)
                .copied()
                .unwrap_or((Decimal::ZERO, Decimal::ZERO));
            DynamicExtraCostRow {
                dynamic_extra_cost_type: NamedRef::new(cost_type.id, cost_type.name),
                cost: money(cost),
                forecast_cost: money(forecast_cost),
            }
        })
        .collect())
}

async fn extra_costs(
    database: &dyn DatabaseManager,
    period: &Period,
) -> Result<Vec<ExtraCostGroup>, AllocationError> {
    let types = database.catalog().extra_cost_types().await?;
    let records = database.allocations().extra_costs(period).await?;

    let service_environments = database.service_environments();
    let mut targets = HashMap::new();
    for record in &records {
        if targets.contains_key(&record.service_environment_id) {
            continue;
        }
        let target = service_environments
            .find_by_id(record.service_environment_id)
            .await?
            .map(|se| (se.service_id, se.environment_id));
        targets.insert(record.service_environment_id, target);
    }

    Ok(types
        .into_iter()
        .map(|cost_type| {
            let extra_costs = records
                .iter()
                .filter(|record| record.extra_cost_type_id == cost_type.id)
                .map(|record| {
                    let target = targets.get(&record.service_environment_id).copied().flatten();
                    ExtraCostEntry {
                        id: Some(record.id),
                        cost: money(record.cost),
                        forecast_cost: money(record.forecast_cost),
                        service: target.map(|(service_id, _)| service_id),
                        env: target.map(|(_, environment_id)| environment_id),
                    }
                })
                .collect();
            ExtraCostGroup {
                extra_cost_type: NamedRef::new(cost_type.id, cost_type.name),
                extra_costs,
            }
        })
        .collect())
}
