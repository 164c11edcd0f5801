//! Extra-cost CSV import
//!
//! Expected columns: `cost;forecast_cost` plus either `service_env_id` or
//! `service_uid`/`service_name` together with `environment`. An optional `id`
//! column names an existing extra cost to update.

use super::AllocationError;
use super::types::{ExtraCostInput, ImportOutcome, ServiceEnvironmentRef};
use crate::csv_codec::{self, CsvDialect, CsvRecord};
use crate::database::DatabaseManager;
use crate::database::entities::ServiceEnvironmentRecord;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::{debug, info};

fn non_empty<'a>(record: &'a CsvRecord, column: &str) -> Option<&'a str> {
    record
        .get(column)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

/// Parse a money column, accepting a decimal comma. Blank cells are zero.
pub fn parse_decimal(value: &str) -> Option<Decimal> {
    let value = value.trim();
    if value.is_empty() {
        return Some(Decimal::ZERO);
    }
    Decimal::from_str(&value.replace(',', ".")).ok()
}

async fn resolve(
    database: &dyn DatabaseManager,
    record: &CsvRecord,
) -> Result<Option<ServiceEnvironmentRecord>, AllocationError> {
    let dao = database.service_environments();

    if let Some(id) = non_empty(record, "service_env_id") {
        return match id.parse::<i32>() {
            Ok(id) => Ok(dao.find_by_id(id).await?),
            Err(_) => Ok(None),
        };
    }

    let environment = record.get("environment").map(String::as_str).unwrap_or("");
    if let Some(uid) = non_empty(record, "service_uid") {
        return Ok(dao.find_by_service_uid(uid, environment).await?);
    }
    match non_empty(record, "service_name") {
        Some(name) => Ok(dao.find_by_service_name(name, environment).await?),
        None => Ok(None),
    }
}

fn identifier(record: &CsvRecord) -> &str {
    non_empty(record, "service_env_id")
        .or_else(|| non_empty(record, "service_uid"))
        .or_else(|| non_empty(record, "service_name"))
        .unwrap_or("")
}

/// Turn uploaded bytes into extra-cost inputs. Lookup and value problems are
/// collected per row; only an unreadable file is an error.
pub async fn import_extra_costs(
    database: &dyn DatabaseManager,
    bytes: &[u8],
    dialect: &CsvDialect,
) -> Result<ImportOutcome, AllocationError> {
    let table = csv_codec::read_records(bytes, dialect)?;
    debug!(rows = table.records.len(), "Parsed extra cost file");

    let mut outcome = ImportOutcome::default();
    for (index, record) in table.records.iter().enumerate() {
        let line = index + 2;

        let service_environment = resolve(database, record).await?;
        if service_environment.is_none() {
            outcome.errors.push(format!(
                "Service environment for service: {}, environment: {} does not exist.",
                identifier(record),
                record.get("environment").map(String::as_str).unwrap_or(""),
            ));
        }

        let mut money = |column: &str| {
            let raw = record.get(column).map(String::as_str).unwrap_or("");
            parse_decimal(raw).unwrap_or_else(|| {
                outcome
                    .errors
                    .push(format!("Invalid {} value '{}' in line {}.", column, raw, line));
                Decimal::ZERO
            })
        };
        let cost = money("cost");
        let forecast_cost = money("forecast_cost");

        let id = match record.get("id").filter(|id| id.chars().count() > 1) {
            Some(raw) => match raw.parse::<i32>() {
                Ok(id) => Some(id),
                Err(_) => {
                    outcome
                        .errors
                        .push(format!("Invalid id value '{}' in line {}.", raw, line));
                    None
                }
            },
            None => None,
        };

        outcome.records.push(ExtraCostInput {
            id,
            cost,
            forecast_cost,
            target: service_environment.map(ServiceEnvironmentRef::Resolved),
        });
    }

    crate::metrics::track_csv_import(outcome.records.len(), outcome.errors.len());
    info!(
        records = outcome.records.len(),
        errors = outcome.errors.len(),
        "Imported extra cost file"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("10"), Some(Decimal::from(10)));
        assert_eq!(parse_decimal("12,5"), Some(Decimal::new(125, 1)));
        assert_eq!(parse_decimal(" 3.25 "), Some(Decimal::new(325, 2)));
        assert_eq!(parse_decimal(""), Some(Decimal::ZERO));
        assert_eq!(parse_decimal("ten"), None);
    }

    #[test]
    fn test_identifier_precedence() {
        let mut record = CsvRecord::new();
        record.insert("service_name".to_string(), "Payments".to_string());
        assert_eq!(identifier(&record), "Payments");

        record.insert("service_uid".to_string(), "sc-001".to_string());
        assert_eq!(identifier(&record), "sc-001");

        record.insert("service_env_id".to_string(), "".to_string());
        assert_eq!(identifier(&record), "sc-001");

        record.insert("service_env_id".to_string(), "42".to_string());
        assert_eq!(identifier(&record), "42");
    }
}
