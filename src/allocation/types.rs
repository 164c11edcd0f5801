use crate::database::entities::ServiceEnvironmentRecord;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// `{ id, name }` reference to a dictionary entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NamedRef {
    pub id: i32,
    #[serde(default)]
    pub name: String,
}

impl NamedRef {
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BaseUsageRow {
    #[serde(rename = "type")]
    pub usage_type: NamedRef,
    #[serde(default)]
    #[schema(value_type = String)]
    pub cost: Decimal,
    #[serde(default)]
    #[schema(value_type = String)]
    pub forecast_cost: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warehouse: Option<NamedRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TeamCostRow {
    pub team: NamedRef,
    #[serde(default)]
    #[schema(value_type = String)]
    pub cost: Decimal,
    #[serde(default)]
    #[schema(value_type = String)]
    pub forecast_cost: Decimal,
    #[serde(default)]
    pub members: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DynamicExtraCostRow {
    pub dynamic_extra_cost_type: NamedRef,
    #[serde(default)]
    #[schema(value_type = String)]
    pub cost: Decimal,
    #[serde(default)]
    #[schema(value_type = String)]
    pub forecast_cost: Decimal,
}

/// One extra cost as exchanged with the admin UI; `service`/`env` are ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ExtraCostEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    #[serde(default)]
    #[schema(value_type = String)]
    pub cost: Decimal,
    #[serde(default)]
    #[schema(value_type = String)]
    pub forecast_cost: Decimal,
    #[serde(default)]
    pub service: Option<i32>,
    #[serde(default)]
    pub env: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ExtraCostGroup {
    pub extra_cost_type: NamedRef,
    #[serde(default)]
    pub extra_costs: Vec<ExtraCostEntry>,
}

/// A tab of the admin screen
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Category<T> {
    pub name: String,
    pub rows: Vec<T>,
    pub template: String,
}

impl<T> Category<T> {
    pub fn new(name: &str, template: &str, rows: Vec<T>) -> Self {
        Self {
            name: name.to_string(),
            rows,
            template: template.to_string(),
        }
    }
}

/// Everything the admin screen shows for one month
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AllocationAdminContent {
    pub baseusages: Category<BaseUsageRow>,
    pub teamcosts: Category<TeamCostRow>,
    pub dynamicextracosts: Category<DynamicExtraCostRow>,
    pub extracosts: Category<ExtraCostGroup>,
}

/// Target of an extra cost before it is written
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceEnvironmentRef {
    /// Already looked up (CSV import)
    Resolved(ServiceEnvironmentRecord),
    /// Ids sent by the UI, resolved inside the write transaction
    Lookup { service_id: i32, environment_id: i32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtraCostInput {
    pub id: Option<i32>,
    pub cost: Decimal,
    pub forecast_cost: Decimal,
    pub target: Option<ServiceEnvironmentRef>,
}

impl From<ExtraCostEntry> for ExtraCostInput {
    fn from(entry: ExtraCostEntry) -> Self {
        // zero ids mean "no target selected" in the UI
        let target = match (entry.service, entry.env) {
            (Some(service_id), Some(environment_id)) if service_id != 0 && environment_id != 0 => {
                Some(ServiceEnvironmentRef::Lookup {
                    service_id,
                    environment_id,
                })
            }
            _ => None,
        };

        Self {
            id: entry.id,
            cost: entry.cost,
            forecast_cost: entry.forecast_cost,
            target,
        }
    }
}

/// Every extra cost submitted for one extra cost type
#[derive(Debug, Clone, PartialEq)]
pub struct ExtraCostBatch {
    pub extra_cost_type_id: i32,
    pub entries: Vec<ExtraCostInput>,
}

impl From<ExtraCostGroup> for ExtraCostBatch {
    fn from(group: ExtraCostGroup) -> Self {
        Self {
            extra_cost_type_id: group.extra_cost_type.id,
            entries: group.extra_costs.into_iter().map(Into::into).collect(),
        }
    }
}

/// Result of parsing an uploaded extra-cost file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportOutcome {
    pub records: Vec<ExtraCostInput>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SaveResponse {
    pub status: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl SaveResponse {
    pub fn ok() -> Self {
        Self {
            status: true,
            errors: None,
        }
    }

    pub fn failed(errors: Vec<String>) -> Self {
        Self {
            status: false,
            errors: Some(errors),
        }
    }
}
