//! Monthly allocation inputs: base usage prices, team costs, dynamic extra
//! costs and per-service extra costs.
//!
//! Reads build the admin tree for one month. Writes replace one category for
//! one month inside a single transaction, so a failing row leaves the database
//! untouched.

use crate::csv_codec::{CsvDialect, CsvError};
use crate::database::{DatabaseError, DatabaseManager};
use crate::period::Period;
use sea_orm::{DbErr, TransactionTrait};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

pub mod importer;
mod read;
mod save;
pub mod types;

pub use types::{
    AllocationAdminContent, BaseUsageRow, Category, DynamicExtraCostRow, ExtraCostBatch,
    ExtraCostEntry, ExtraCostGroup, ExtraCostInput, ImportOutcome, NamedRef, SaveResponse,
    ServiceEnvironmentRef, TeamCostRow,
};

#[derive(Error, Debug)]
pub enum AllocationError {
    #[error("No usage type with id {0}")]
    NoUsageType(i32),
    #[error("No warehouse with id {0}")]
    NoWarehouse(i32),
    #[error("No extra cost type with id {0}")]
    NoExtraCostType(i32),
    #[error("Extra cost with id {0} does not exist")]
    NoExtraCost(i32),
    #[error("No dynamic extra cost type with id {0}")]
    NoDynamicExtraCostType(i32),
    #[error("Team with id {0} does not exist")]
    TeamDoesNotExist(i32),
    #[error(
        "Service environment does not exist for service with ID {service_id} and environment with ID {environment_id}"
    )]
    ServiceEnvironmentDoesNotExist {
        service_id: i32,
        environment_id: i32,
    },
    #[error("Unknown allocation type: {0}")]
    UnknownAllocateType(String),
    #[error("Invalid request body: {0}")]
    InvalidPayload(String),
    #[error(transparent)]
    Csv(#[from] CsvError),
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<DbErr> for AllocationError {
    fn from(err: DbErr) -> Self {
        AllocationError::Database(err.into())
    }
}

impl AllocationError {
    /// Whether the error was caused by the submitted data rather than storage
    pub fn is_client_error(&self) -> bool {
        !matches!(self, AllocationError::Database(_))
    }
}

/// The four editable categories, as named in URLs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllocateType {
    BaseUsages,
    ExtraCosts,
    DynamicExtraCosts,
    TeamCosts,
}

impl AllocateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AllocateType::BaseUsages => "baseusages",
            AllocateType::ExtraCosts => "extracosts",
            AllocateType::DynamicExtraCosts => "dynamicextracosts",
            AllocateType::TeamCosts => "teamcosts",
        }
    }
}

impl fmt::Display for AllocateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AllocateType {
    type Err = AllocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "baseusages" => Ok(AllocateType::BaseUsages),
            "extracosts" => Ok(AllocateType::ExtraCosts),
            "dynamicextracosts" => Ok(AllocateType::DynamicExtraCosts),
            "teamcosts" => Ok(AllocateType::TeamCosts),
            other => Err(AllocationError::UnknownAllocateType(other.to_string())),
        }
    }
}

/// A validated write for one category
#[derive(Debug, Clone, PartialEq)]
pub enum SaveRequest {
    BaseUsages(Vec<BaseUsageRow>),
    TeamCosts(Vec<TeamCostRow>),
    DynamicExtraCosts(Vec<DynamicExtraCostRow>),
    ExtraCosts(Vec<ExtraCostBatch>),
}

#[derive(Deserialize)]
struct RowsBody<T> {
    rows: Vec<T>,
}

fn parse_rows<T: DeserializeOwned>(body: serde_json::Value) -> Result<Vec<T>, AllocationError> {
    serde_json::from_value::<RowsBody<T>>(body)
        .map(|body| body.rows)
        .map_err(|e| AllocationError::InvalidPayload(e.to_string()))
}

impl SaveRequest {
    /// Interpret a `{ "rows": [...] }` body according to the category
    pub fn from_json(kind: AllocateType, body: serde_json::Value) -> Result<Self, AllocationError> {
        Ok(match kind {
            AllocateType::BaseUsages => SaveRequest::BaseUsages(parse_rows(body)?),
            AllocateType::TeamCosts => SaveRequest::TeamCosts(parse_rows(body)?),
            AllocateType::DynamicExtraCosts => SaveRequest::DynamicExtraCosts(parse_rows(body)?),
            AllocateType::ExtraCosts => SaveRequest::ExtraCosts(
                parse_rows::<ExtraCostGroup>(body)?
                    .into_iter()
                    .map(ExtraCostBatch::from)
                    .collect(),
            ),
        })
    }

    pub fn kind(&self) -> AllocateType {
        match self {
            SaveRequest::BaseUsages(_) => AllocateType::BaseUsages,
            SaveRequest::TeamCosts(_) => AllocateType::TeamCosts,
            SaveRequest::DynamicExtraCosts(_) => AllocateType::DynamicExtraCosts,
            SaveRequest::ExtraCosts(_) => AllocateType::ExtraCosts,
        }
    }
}

/// Reads and writes allocation inputs for a period
pub struct AllocationService {
    database: Arc<dyn DatabaseManager>,
    import_dialect: CsvDialect,
}

impl AllocationService {
    pub fn new(database: Arc<dyn DatabaseManager>, import_dialect: CsvDialect) -> Self {
        Self {
            database,
            import_dialect,
        }
    }

    pub async fn get_allocations(
        &self,
        period: &Period,
    ) -> Result<AllocationAdminContent, AllocationError> {
        read::load_content(self.database.as_ref(), period).await
    }

    /// Apply one category write atomically
    pub async fn save(&self, period: &Period, request: SaveRequest) -> Result<(), AllocationError> {
        let kind = request.kind();
        let txn = self.database.connection().begin().await?;

        let result = match request {
            SaveRequest::BaseUsages(rows) => save::save_base_usages(&txn, period, rows).await,
            SaveRequest::TeamCosts(rows) => save::save_team_costs(&txn, period, rows).await,
            SaveRequest::DynamicExtraCosts(rows) => {
                save::save_dynamic_extra_costs(&txn, period, rows).await
            }
            SaveRequest::ExtraCosts(batches) => {
                save::save_extra_costs(&txn, period, batches).await
            }
        };

        match result {
            Ok(()) => {
                txn.commit().await?;
                crate::metrics::track_allocation_save(kind.as_str(), true);
                info!(
                    allocate_type = %kind,
                    year = period.year(),
                    month = period.month(),
                    "Saved allocations"
                );
                Ok(())
            }
            Err(err) => {
                txn.rollback().await?;
                crate::metrics::track_allocation_save(kind.as_str(), false);
                warn!(allocate_type = %kind, error = %err, "Allocation save rolled back");
                Err(err)
            }
        }
    }

    /// Parse an extra-cost file and resolve every row's target
    pub async fn import_extra_costs(&self, bytes: &[u8]) -> Result<ImportOutcome, AllocationError> {
        importer::import_extra_costs(self.database.as_ref(), bytes, &self.import_dialect).await
    }

    /// CSV upload path: import, then save only when every row resolved
    pub async fn upload_extra_costs(
        &self,
        period: &Period,
        extra_cost_type_id: i32,
        bytes: &[u8],
    ) -> Result<SaveResponse, AllocationError> {
        let outcome = self.import_extra_costs(bytes).await?;
        if !outcome.errors.is_empty() {
            return Ok(SaveResponse::failed(outcome.errors));
        }

        let batch = ExtraCostBatch {
            extra_cost_type_id,
            entries: outcome.records,
        };
        self.save(period, SaveRequest::ExtraCosts(vec![batch])).await?;
        Ok(SaveResponse::ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_allocate_type_from_str() {
        assert_eq!(
            "baseusages".parse::<AllocateType>().unwrap(),
            AllocateType::BaseUsages
        );
        assert_eq!(
            "teamcosts".parse::<AllocateType>().unwrap(),
            AllocateType::TeamCosts
        );
        assert!(matches!(
            "salaries".parse::<AllocateType>(),
            Err(AllocationError::UnknownAllocateType(_))
        ));
    }

    #[test]
    fn test_save_request_from_json() {
        let body = json!({
            "rows": [{
                "extra_cost_type": {"id": 2, "name": "Licences"},
                "extra_costs": [
                    {"id": 5, "cost": "1.5", "forecast_cost": "2", "service": 1, "env": 3},
                    {"cost": "4", "forecast_cost": "4"}
                ]
            }]
        });
        let request = SaveRequest::from_json(AllocateType::ExtraCosts, body).unwrap();
        let SaveRequest::ExtraCosts(batches) = request else {
            panic!("expected extra costs");
        };
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].extra_cost_type_id, 2);
        assert_eq!(batches[0].entries[0].id, Some(5));
        assert!(batches[0].entries[1].target.is_none());
    }

    #[test]
    fn test_save_request_rejects_missing_rows() {
        let err = SaveRequest::from_json(AllocateType::TeamCosts, json!({"data": []})).unwrap_err();
        assert!(matches!(err, AllocationError::InvalidPayload(_)));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            AllocationError::NoUsageType(9).to_string(),
            "No usage type with id 9"
        );
        assert_eq!(
            AllocationError::ServiceEnvironmentDoesNotExist {
                service_id: 1,
                environment_id: 2
            }
            .to_string(),
            "Service environment does not exist for service with ID 1 and environment with ID 2"
        );
        assert!(!AllocationError::Database(DatabaseError::NotFound).is_client_error());
    }
}
