use super::cells::ReportCell;
use crate::database::entities::{ExtraCostTypeRecord, UsageTypeRecord};
use chrono::NaiveDate;

/// One report column; the layout is computed once per report run
#[derive(Debug, Clone, PartialEq)]
pub enum ReportColumn {
    Id,
    Path,
    Active,
    Department,
    BusinessSegment,
    ProfitCenter,
    AssetsCount,
    AssetsPrice,
    AssetsCost,
    UsageCount(UsageTypeRecord),
    UsageCountPercent(UsageTypeRecord),
    UsagePrice(UsageTypeRecord),
    UsagePricePercent(UsageTypeRecord),
    ExtraCost(ExtraCostTypeRecord),
}

impl ReportColumn {
    pub fn label(&self, today: NaiveDate) -> String {
        match self {
            ReportColumn::Id => "ID".to_string(),
            ReportColumn::Path => "Venture".to_string(),
            ReportColumn::Active => format!("Active at {}", today),
            ReportColumn::Department => "Department".to_string(),
            ReportColumn::BusinessSegment => "Business segment".to_string(),
            ReportColumn::ProfitCenter => "Profit center".to_string(),
            ReportColumn::AssetsCount => "Assets count".to_string(),
            ReportColumn::AssetsPrice => "Assets price".to_string(),
            ReportColumn::AssetsCost => "Assets cost".to_string(),
            ReportColumn::UsageCount(usage_type) => format!("{} count", usage_type.name),
            ReportColumn::UsageCountPercent(usage_type) => format!("{} count %", usage_type.name),
            ReportColumn::UsagePrice(usage_type) => format!("{} price", usage_type.name),
            ReportColumn::UsagePricePercent(usage_type) => format!("{} price %", usage_type.name),
            ReportColumn::ExtraCost(cost_type) => cost_type.name.clone(),
        }
    }

    pub fn is_percent(&self) -> bool {
        matches!(
            self,
            ReportColumn::UsageCountPercent(_) | ReportColumn::UsagePricePercent(_)
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportLayout {
    pub columns: Vec<ReportColumn>,
}

impl ReportLayout {
    /// Fixed columns, then per usage type count/price (with optional
    /// percentages), then one column per extra cost type.
    pub fn build(usage_types: &[UsageTypeRecord], extra_cost_types: &[ExtraCostTypeRecord]) -> Self {
        let mut columns = vec![
            ReportColumn::Id,
            ReportColumn::Path,
            ReportColumn::Active,
            ReportColumn::Department,
            ReportColumn::BusinessSegment,
            ReportColumn::ProfitCenter,
            ReportColumn::AssetsCount,
            ReportColumn::AssetsPrice,
            ReportColumn::AssetsCost,
        ];

        for usage_type in usage_types {
            columns.push(ReportColumn::UsageCount(usage_type.clone()));
            if usage_type.show_value_percentage {
                columns.push(ReportColumn::UsageCountPercent(usage_type.clone()));
            }
            columns.push(ReportColumn::UsagePrice(usage_type.clone()));
            if usage_type.show_price_percentage {
                columns.push(ReportColumn::UsagePricePercent(usage_type.clone()));
            }
        }

        columns.extend(extra_cost_types.iter().cloned().map(ReportColumn::ExtraCost));

        Self { columns }
    }

    pub fn header(&self, today: NaiveDate) -> Vec<String> {
        self.columns.iter().map(|column| column.label(today)).collect()
    }

    /// `(percent column, value column)` pairs; each percentage directly
    /// follows the column it is computed from.
    pub fn percent_sources(&self) -> Vec<(usize, usize)> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, column)| column.is_percent())
            .map(|(index, _)| (index, index - 1))
            .collect()
    }

    /// Fill every percentage column from its value column's total
    pub fn apply_percentages(&self, rows: &mut [Vec<ReportCell>]) {
        for (target, source) in self.percent_sources() {
            let total: rust_decimal::Decimal = rows
                .iter()
                .filter_map(|row| row.get(source).and_then(ReportCell::amount))
                .sum();

            for row in rows.iter_mut() {
                let value = row.get(source).and_then(ReportCell::amount);
                let percent = match value {
                    Some(value) if !total.is_zero() => {
                        Some(super::cells::format_percent(value, total))
                    }
                    _ => None,
                };
                if let Some(cell) = row.get_mut(target) {
                    *cell = ReportCell::Percent(percent);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::entities::usage_types;
    use rust_decimal::Decimal;

    fn usage_type(id: i32, name: &str, value_pct: bool, price_pct: bool) -> UsageTypeRecord {
        usage_types::Model {
            id,
            name: name.to_string(),
            kind: usage_types::SERVICE_USAGE_KIND.to_string(),
            is_manually_type: false,
            by_warehouse: false,
            show_in_report: true,
            show_value_percentage: value_pct,
            show_price_percentage: price_pct,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn test_header_layout() {
        let layout = ReportLayout::build(
            &[usage_type(1, "CPU", true, true), usage_type(2, "Disk", false, false)],
            &[ExtraCostTypeRecord {
                id: 1,
                name: "Licences".to_string(),
            }],
        );

        assert_eq!(
            layout.header(today()),
            vec![
                "ID",
                "Venture",
                "Active at 2024-03-15",
                "Department",
                "Business segment",
                "Profit center",
                "Assets count",
                "Assets price",
                "Assets cost",
                "CPU count",
                "CPU count %",
                "CPU price",
                "CPU price %",
                "Disk count",
                "Disk price",
                "Licences",
            ]
        );
        assert_eq!(layout.percent_sources(), vec![(10, 9), (12, 11)]);
    }

    #[test]
    fn test_apply_percentages() {
        let layout = ReportLayout {
            columns: vec![
                ReportColumn::UsageCount(usage_type(1, "CPU", true, false)),
                ReportColumn::UsageCountPercent(usage_type(1, "CPU", true, false)),
            ],
        };
        let mut rows = vec![
            vec![ReportCell::Count(Decimal::from(1)), ReportCell::Percent(None)],
            vec![ReportCell::Count(Decimal::from(3)), ReportCell::Percent(None)],
        ];
        layout.apply_percentages(&mut rows);

        assert_eq!(rows[0][1], ReportCell::Percent(Some("25.00%".to_string())));
        assert_eq!(rows[1][1], ReportCell::Percent(Some("75.00%".to_string())));
    }

    #[test]
    fn test_apply_percentages_zero_total_stays_blank() {
        let layout = ReportLayout {
            columns: vec![
                ReportColumn::UsagePrice(usage_type(1, "CPU", false, true)),
                ReportColumn::UsagePricePercent(usage_type(1, "CPU", false, true)),
            ],
        };
        let mut rows = vec![
            vec![ReportCell::Currency(Decimal::ZERO), ReportCell::Percent(None)],
            vec![ReportCell::NoPrice, ReportCell::Percent(None)],
        ];
        layout.apply_percentages(&mut rows);

        assert_eq!(rows[0][1], ReportCell::Percent(None));
        assert_eq!(rows[1][1], ReportCell::Percent(None));
    }
}
