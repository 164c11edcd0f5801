use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Serialize, Serializer};
use std::fmt;

/// A typed report value; rendering happens only at the edges (JSON, CSV)
#[derive(Debug, Clone, PartialEq)]
pub enum ReportCell {
    Text(String),
    Integer(i64),
    Bool(bool),
    /// Usage amount, rendered without trailing zeros
    Count(Decimal),
    /// Money, rendered with two decimal places
    Currency(Decimal),
    /// Usage with at least one day lacking a price
    NoPrice,
    /// Filled in after all rows are known; blank when the column total is zero
    Percent(Option<String>),
}

impl ReportCell {
    /// Numeric value feeding percentage columns
    pub fn amount(&self) -> Option<Decimal> {
        match self {
            ReportCell::Count(value) | ReportCell::Currency(value) => Some(*value),
            ReportCell::Integer(value) => Some(Decimal::from(*value)),
            _ => None,
        }
    }
}

pub fn format_percent(value: Decimal, total: Decimal) -> String {
    let percent = (value * Decimal::ONE_HUNDRED / total)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}%", percent)
}

impl fmt::Display for ReportCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportCell::Text(text) => f.write_str(text),
            ReportCell::Integer(value) => write!(f, "{}", value),
            ReportCell::Bool(true) => f.write_str("True"),
            ReportCell::Bool(false) => f.write_str("False"),
            ReportCell::Count(value) => write!(f, "{}", value.normalize()),
            ReportCell::Currency(value) => write!(
                f,
                "{:.2}",
                value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            ),
            ReportCell::NoPrice => f.write_str("NO PRICE"),
            ReportCell::Percent(Some(text)) => f.write_str(text),
            ReportCell::Percent(None) => Ok(()),
        }
    }
}

impl Serialize for ReportCell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ReportCell::Integer(value) => serializer.serialize_i64(*value),
            ReportCell::Bool(value) => serializer.serialize_bool(*value),
            other => serializer.collect_str(other),
        }
    }
}
