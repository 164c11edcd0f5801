//! All-ventures report
//!
//! [`ReportGenerator::generate`] returns a lazy stream that advances one
//! service per poll, yielding the rows built so far together with a progress
//! percentage. One extra step is reserved for the percentage pass, so only the
//! last element reports 100.

use crate::database::entities::{
    DailyUsageRecord, ServiceRecord, UsagePriceRecord, UsageTypeRecord,
};
use crate::database::{DatabaseError, DatabaseManager, UsageFilter};
use crate::period::{Period, PeriodError};
use chrono::NaiveDate;
use futures_util::{Stream, StreamExt, stream};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};
use utoipa::{IntoParams, ToSchema};

pub mod cells;
pub mod columns;

pub use cells::ReportCell;
pub use columns::{ReportColumn, ReportLayout};

#[derive(Error, Debug)]
pub enum ReportError {
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Period(#[from] PeriodError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportParams {
    /// Warehouse applied to usage types priced per warehouse
    #[serde(default)]
    pub warehouse: Option<i32>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default)]
    pub show_only_active: bool,
    /// Use forecast prices and costs
    #[serde(default)]
    pub forecast: bool,
}

impl ReportParams {
    pub fn period(&self) -> Result<Period, PeriodError> {
        Period::new(self.start, self.end)
    }
}

/// Rows built so far; the snapshot is shared with the generator until it
/// appends the next row
#[derive(Debug, Clone, PartialEq)]
pub struct ReportProgress {
    pub percent: u8,
    pub rows: Arc<Vec<Vec<ReportCell>>>,
}

impl ReportProgress {
    /// Take the rows, copying only if the snapshot is still shared
    pub fn into_rows(self) -> Vec<Vec<ReportCell>> {
        Arc::unwrap_or_clone(self.rows)
    }
}

/// Header plus finished rows
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ReportTable {
    pub header: Vec<String>,
    #[schema(value_type = Vec<Vec<Object>>)]
    pub rows: Vec<Vec<ReportCell>>,
}

impl ReportTable {
    /// Header and rows rendered as text, ready for the CSV writer
    pub fn text_rows(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        std::iter::once(self.header.clone()).chain(
            self.rows
                .iter()
                .map(|row| row.iter().map(ToString::to_string).collect()),
        )
    }
}

/// Unit price of a usage type over one price record's period
#[derive(Debug, Clone)]
struct PriceWindow {
    period: Period,
    warehouse_id: Option<i32>,
    unit_price: Decimal,
}

impl PriceWindow {
    fn covers(&self, date: NaiveDate, warehouse_id: Option<i32>) -> bool {
        self.period.contains(date)
            && (self.warehouse_id.is_none() || self.warehouse_id == warehouse_id)
    }
}

struct ReportState {
    database: Arc<dyn DatabaseManager>,
    params: ReportParams,
    period: Option<Period>,
    layout: ReportLayout,
    services: Vec<ServiceRecord>,
    parents: HashMap<i32, (String, Option<i32>)>,
    prices: HashMap<i32, Vec<PriceWindow>>,
    rows: Arc<Vec<Vec<ReportCell>>>,
    next: usize,
    started: Option<Instant>,
    finished: bool,
}

impl ReportState {
    fn new(database: Arc<dyn DatabaseManager>, params: ReportParams) -> Self {
        Self {
            database,
            params,
            period: None,
            layout: ReportLayout::default(),
            services: Vec::new(),
            parents: HashMap::new(),
            prices: HashMap::new(),
            rows: Arc::default(),
            next: 0,
            started: None,
            finished: false,
        }
    }

    async fn prepare(&mut self) -> Result<(), ReportError> {
        let period = self.params.period()?;
        let catalog = self.database.catalog();
        let usage_types = catalog.report_usage_types().await?;
        let extra_cost_types = catalog.extra_cost_types().await?;
        self.layout = ReportLayout::build(&usage_types, &extra_cost_types);

        self.services = self.database.reports().services().await?;
        self.parents = self
            .services
            .iter()
            .map(|service| (service.id, (service.name.clone(), service.parent_id)))
            .collect();

        for usage_type in &usage_types {
            let windows = self.price_windows(usage_type, &period).await?;
            self.prices.insert(usage_type.id, windows);
        }

        self.period = Some(period);
        self.started = Some(Instant::now());
        debug!(
            units = self.services.len(),
            columns = self.layout.columns.len(),
            "Prepared venture report"
        );
        Ok(())
    }

    fn warehouse_for(&self, usage_type: &UsageTypeRecord) -> Option<i32> {
        if usage_type.by_warehouse {
            self.params.warehouse
        } else {
            None
        }
    }

    /// Per-unit prices; a zero price falls back to cost over total usage
    async fn price_windows(
        &self,
        usage_type: &UsageTypeRecord,
        period: &Period,
    ) -> Result<Vec<PriceWindow>, ReportError> {
        let reports = self.database.reports();
        let records: Vec<UsagePriceRecord> = reports
            .usage_prices(UsageFilter {
                type_id: usage_type.id,
                warehouse_id: self.warehouse_for(usage_type),
                start: period.start,
                end: period.end,
            })
            .await?;

        let mut windows = Vec::with_capacity(records.len());
        for record in records {
            let (price, cost) = if self.params.forecast {
                (record.forecast_price, record.forecast_cost)
            } else {
                (record.price, record.cost)
            };

            let unit_price = if price.is_zero() {
                let total = reports
                    .total_usage(UsageFilter {
                        type_id: usage_type.id,
                        warehouse_id: record.warehouse_id,
                        start: record.start_date,
                        end: record.end_date,
                    })
                    .await?;
                if total.is_zero() {
                    Decimal::ZERO
                } else {
                    cost / total
                }
            } else {
                price
            };

            windows.push(PriceWindow {
                period: Period::new(record.start_date, record.end_date)?,
                warehouse_id: record.warehouse_id,
                unit_price,
            });
        }
        Ok(windows)
    }

    /// Slash-joined names from the root ancestor down to the service
    fn path(&self, service: &ServiceRecord) -> String {
        let mut names = vec![service.name.clone()];
        let mut seen = HashSet::from([service.id]);
        let mut parent = service.parent_id;

        while let Some(parent_id) = parent {
            if !seen.insert(parent_id) {
                break;
            }
            match self.parents.get(&parent_id) {
                Some((name, grandparent)) => {
                    names.push(name.clone());
                    parent = *grandparent;
                }
                None => break,
            }
        }

        names.reverse();
        names.join("/")
    }

    async fn build_row(
        &self,
        service: &ServiceRecord,
        period: &Period,
    ) -> Result<Vec<ReportCell>, ReportError> {
        let environment_ids = self
            .database
            .service_environments()
            .ids_for_service(service.id)
            .await?;
        let reports = self.database.reports();

        let assets = reports
            .daily_assets(&environment_ids, period.start, period.end)
            .await?;
        let mut asset_prices: HashMap<i32, Decimal> = HashMap::new();
        let mut assets_cost = Decimal::ZERO;
        for asset in &assets {
            let highest = asset_prices.entry(asset.asset_id).or_insert(asset.price);
            if asset.price > *highest {
                *highest = asset.price;
            }
            assets_cost += asset.daily_cost;
        }

        let extra_costs = reports
            .extra_costs(&environment_ids, period.start, period.end)
            .await?;

        // count and price columns of a type share one query
        let mut usage_cache: HashMap<i32, Vec<DailyUsageRecord>> = HashMap::new();
        let mut row = Vec::with_capacity(self.layout.columns.len());
        for column in &self.layout.columns {
            let cell = match column {
                ReportColumn::Id => ReportCell::Integer(i64::from(service.id)),
                ReportColumn::Path => ReportCell::Text(self.path(service)),
                ReportColumn::Active => ReportCell::Bool(service.is_active),
                ReportColumn::Department => ReportCell::Text(service.department.clone()),
                ReportColumn::BusinessSegment => {
                    ReportCell::Text(service.business_segment.clone())
                }
                ReportColumn::ProfitCenter => ReportCell::Text(service.profit_center.clone()),
                ReportColumn::AssetsCount => ReportCell::Integer(asset_prices.len() as i64),
                ReportColumn::AssetsPrice => ReportCell::Currency(asset_prices.values().sum()),
                ReportColumn::AssetsCost => ReportCell::Currency(assets_cost),
                ReportColumn::UsageCount(usage_type) => {
                    let usages = self.usages(&environment_ids, usage_type, period).await?;
                    let count = usages.iter().map(|usage| usage.value).sum();
                    usage_cache.insert(usage_type.id, usages);
                    ReportCell::Count(count)
                }
                ReportColumn::UsagePrice(usage_type) => {
                    let usages = match usage_cache.remove(&usage_type.id) {
                        Some(usages) => usages,
                        None => self.usages(&environment_ids, usage_type, period).await?,
                    };
                    let windows = self.prices.get(&usage_type.id).map(Vec::as_slice).unwrap_or(&[]);
                    let mut total = Some(Decimal::ZERO);
                    for usage in &usages {
                        let window = windows
                            .iter()
                            .find(|window| window.covers(usage.date, usage.warehouse_id));
                        total = match (total, window) {
                            (Some(total), Some(window)) => {
                                Some(total + usage.value * window.unit_price)
                            }
                            _ => None,
                        };
                    }
                    match total {
                        Some(price) => ReportCell::Currency(price),
                        None => ReportCell::NoPrice,
                    }
                }
                ReportColumn::UsageCountPercent(_) | ReportColumn::UsagePricePercent(_) => {
                    ReportCell::Percent(None)
                }
                ReportColumn::ExtraCost(cost_type) => {
                    let mut total = Decimal::ZERO;
                    for extra_cost in extra_costs
                        .iter()
                        .filter(|extra_cost| extra_cost.extra_cost_type_id == cost_type.id)
                    {
                        let cost_period = Period::new(extra_cost.start_date, extra_cost.end_date)?;
                        let amount = if self.params.forecast {
                            extra_cost.forecast_cost
                        } else {
                            extra_cost.cost
                        };
                        total += amount * Decimal::from(period.overlap_days(&cost_period))
                            / Decimal::from(cost_period.days());
                    }
                    ReportCell::Currency(total)
                }
            };
            row.push(cell);
        }

        Ok(row)
    }

    async fn usages(
        &self,
        environment_ids: &[i32],
        usage_type: &UsageTypeRecord,
        period: &Period,
    ) -> Result<Vec<DailyUsageRecord>, ReportError> {
        Ok(self
            .database
            .reports()
            .daily_usages(
                environment_ids,
                UsageFilter {
                    type_id: usage_type.id,
                    warehouse_id: self.warehouse_for(usage_type),
                    start: period.start,
                    end: period.end,
                },
            )
            .await?)
    }

    fn progress(&self, percent: u8) -> ReportProgress {
        ReportProgress {
            percent,
            rows: Arc::clone(&self.rows),
        }
    }

    async fn step(&mut self) -> Result<Option<ReportProgress>, ReportError> {
        if self.finished {
            return Ok(None);
        }
        if self.period.is_none() {
            self.prepare().await?;
        }
        let Some(period) = self.period else {
            return Ok(None);
        };

        // one step reserved for the percentage pass
        let total = self.services.len() + 1;
        while self.next < self.services.len() {
            let index = self.next;
            self.next += 1;

            let service = &self.services[index];
            if self.params.show_only_active && !service.is_active {
                continue;
            }
            let row = self.build_row(service, &period).await?;
            Arc::make_mut(&mut self.rows).push(row);

            let percent = (100 * index / total).min(99) as u8;
            return Ok(Some(self.progress(percent)));
        }

        self.layout
            .apply_percentages(Arc::<Vec<Vec<ReportCell>>>::make_mut(&mut self.rows));
        self.finished = true;

        let elapsed = self.started.map(|s| s.elapsed()).unwrap_or_default();
        crate::metrics::track_report_generation(self.rows.len(), elapsed);
        info!(
            rows = self.rows.len(),
            duration_ms = elapsed.as_millis() as u64,
            forecast = self.params.forecast,
            "Venture report completed"
        );
        Ok(Some(self.progress(100)))
    }
}

#[derive(Clone)]
pub struct ReportGenerator {
    database: Arc<dyn DatabaseManager>,
}

impl ReportGenerator {
    pub fn new(database: Arc<dyn DatabaseManager>) -> Self {
        Self { database }
    }

    /// Column labels, with the activity column dated `today`
    pub async fn header(&self, today: NaiveDate) -> Result<Vec<String>, ReportError> {
        let catalog = self.database.catalog();
        let usage_types = catalog.report_usage_types().await?;
        let extra_cost_types = catalog.extra_cost_types().await?;
        Ok(ReportLayout::build(&usage_types, &extra_cost_types).header(today))
    }

    /// Fresh progress stream; ends after the 100% element or the first error
    pub fn generate(
        &self,
        params: ReportParams,
    ) -> impl Stream<Item = Result<ReportProgress, ReportError>> + Send + use<> {
        let state = ReportState::new(self.database.clone(), params);
        stream::unfold(state, |mut state| async move {
            match state.step().await {
                Ok(Some(progress)) => Some((Ok(progress), state)),
                Ok(None) => None,
                Err(err) => {
                    state.finished = true;
                    Some((Err(err), state))
                }
            }
        })
    }

    /// Drive the stream to completion and attach the header
    pub async fn run(&self, params: ReportParams) -> Result<ReportTable, ReportError> {
        let header = self.header(chrono::Local::now().date_naive()).await?;
        let mut stream = Box::pin(self.generate(params));

        let mut rows = Vec::new();
        while let Some(progress) = stream.next().await {
            let progress = progress?;
            if progress.percent == 100 {
                rows = progress.into_rows();
            }
        }
        Ok(ReportTable { header, rows })
    }
}
