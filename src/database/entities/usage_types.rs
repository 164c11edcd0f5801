use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// `kind` value of manually priced base usages
pub const BASE_USAGE_KIND: &str = "BU";
/// `kind` value of metered service usages
pub const SERVICE_USAGE_KIND: &str = "SU";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "usage_types")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub kind: String,
    pub is_manually_type: bool,
    pub by_warehouse: bool,
    pub show_in_report: bool,
    pub show_value_percentage: bool,
    pub show_price_percentage: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
