use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Singleton configuration row (id = 1). Collaborators assume it exists once
/// deployed; a missing row is a fatal load error, not a default.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "site_config")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub payment_disclaimer: Option<String>,
    pub accordion_title: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
