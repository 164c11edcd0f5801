use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Organizational unit being billed (a venture)
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "services")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub ci_uid: Option<String>,
    pub parent_id: Option<i32>,
    pub is_active: bool,
    pub department: String,
    pub business_segment: String,
    pub profit_center: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
