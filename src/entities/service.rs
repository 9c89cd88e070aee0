use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Service entity. Pricing configuration lives in the related
/// `service_prices` rows; `price` is the flat fallback used when no pricing
/// component is configured.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "services")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub title: String,
    pub category_id: String,
    pub price: i64,
    pub image: String,
    /// Bullet-point description list
    #[sea_orm(column_type = "Json")]
    pub description: Json,
    #[sea_orm(column_type = "Json", nullable)]
    pub service_points: Option<Json>,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
    #[sea_orm(has_many = "super::service_price::Entity")]
    ServicePrices,
    #[sea_orm(has_many = "super::service_game::Entity")]
    ServiceGames,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::service_price::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServicePrices.def()
    }
}

impl Related<super::service_game::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceGames.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
