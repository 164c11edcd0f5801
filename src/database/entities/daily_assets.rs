use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One asset assigned to a service environment on one day
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "daily_assets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub date: NaiveDate,
    pub service_environment_id: i32,
    pub asset_id: i32,
    pub price: Decimal,
    pub daily_cost: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
