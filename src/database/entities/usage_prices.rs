use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Price of a usage type over a period; `price`/`forecast_price` are per unit,
/// `cost`/`forecast_cost` are totals entered by administrators.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "usage_prices")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub type_id: i32,
    pub warehouse_id: Option<i32>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub price: Decimal,
    pub forecast_price: Decimal,
    pub cost: Decimal,
    pub forecast_cost: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
