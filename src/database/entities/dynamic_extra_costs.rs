use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "dynamic_extra_costs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub dynamic_extra_cost_type_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub cost: Decimal,
    pub forecast_cost: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
