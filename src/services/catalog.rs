//! Catalog access behind the [`ContentSource`] trait.
//!
//! Two interchangeable implementations exist: this row-store-backed one and
//! the flat-file one in [`crate::services::flatfile`]. Both must produce
//! identical entity shapes; the assembler is the single place where stored
//! component rows become a `Service`.

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use std::sync::Arc;
use tracing::instrument;

use crate::entities::{accordion_item, category, game, service, service_game, service_price};
use crate::entities::{AccordionItem, Category, Game, Service, ServiceGame, ServicePrice, SiteConfig};
use crate::errors::ServiceError;
use crate::models;
use crate::pricing::{assemble, RawComponentRow, RawServiceRecord};

/// Disclaimer used when the deployment has not customized one.
pub const DEFAULT_PAYMENT_DISCLAIMER: &str = "After completing your payment, please create a \
                                              ticket in our Discord server to start your order.";

const DEFAULT_ACCORDION_TITLE: &str = "Frequently Asked Questions";

/// Read interface every content source must provide.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn list_games(&self) -> Result<Vec<models::Game>, ServiceError>;
    async fn list_categories(&self) -> Result<Vec<models::Category>, ServiceError>;
    async fn get_service_by_id(&self, id: &str) -> Result<models::Service, ServiceError>;
    async fn list_services_by_category(
        &self,
        category_id: &str,
    ) -> Result<Vec<models::Service>, ServiceError>;
    async fn list_services_by_game(
        &self,
        game_id: &str,
    ) -> Result<Vec<models::Service>, ServiceError>;
    async fn payment_config(&self) -> Result<models::PaymentConfig, ServiceError>;
    async fn accordion_content(&self) -> Result<models::AccordionContent, ServiceError>;
}

/// Row-store-backed catalog.
#[derive(Clone)]
pub struct StoreCatalogService {
    db: Arc<DatabaseConnection>,
}

impl StoreCatalogService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Resolves one service row into the assembled domain shape. Component
    /// rows are read in ascending creation order; that order is what the
    /// render list preserves.
    async fn build_service(&self, row: service::Model) -> Result<models::Service, ServiceError> {
        let price_rows = ServicePrice::find()
            .filter(service_price::Column::ServiceId.eq(row.id.clone()))
            .order_by_asc(service_price::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        let games = ServiceGame::find()
            .filter(service_game::Column::ServiceId.eq(row.id.clone()))
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|link| link.game_id)
            .collect();

        let description: Vec<String> = serde_json::from_value(row.description)
            .map_err(|e| ServiceError::SerializationError(format!("service description: {e}")))?;
        let service_points = match row.service_points {
            Some(points) => {
                let points: Vec<String> = serde_json::from_value(points).map_err(|e| {
                    ServiceError::SerializationError(format!("service points: {e}"))
                })?;
                (!points.is_empty()).then_some(points)
            }
            None => None,
        };

        let record = RawServiceRecord {
            id: row.id,
            title: row.title,
            category_id: row.category_id,
            base_price: row.price,
            image: row.image,
            description,
            service_points,
            games,
        };
        let rows: Vec<RawComponentRow> = price_rows
            .into_iter()
            .map(|price| RawComponentRow {
                id: price.id,
                kind: price.kind,
                config: price.config,
            })
            .collect();

        Ok(assemble(record, &rows))
    }

    async fn build_services(
        &self,
        rows: Vec<service::Model>,
    ) -> Result<Vec<models::Service>, ServiceError> {
        let mut services = Vec::with_capacity(rows.len());
        for row in rows {
            services.push(self.build_service(row).await?);
        }
        Ok(services)
    }
}

#[async_trait]
impl ContentSource for StoreCatalogService {
    #[instrument(skip(self))]
    async fn list_games(&self) -> Result<Vec<models::Game>, ServiceError> {
        let rows = Game::find()
            .order_by_asc(game::Column::Id)
            .all(&*self.db)
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| models::Game {
                id: row.id,
                title: row.title,
                category: row.category,
                image: row.image,
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn list_categories(&self) -> Result<Vec<models::Category>, ServiceError> {
        let rows = Category::find()
            .order_by_asc(category::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| models::Category {
                id: row.id,
                name: row.name,
                description: row.description,
                icon: row.icon,
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn get_service_by_id(&self, id: &str) -> Result<models::Service, ServiceError> {
        let row = Service::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Service {} not found", id)))?;
        self.build_service(row).await
    }

    #[instrument(skip(self))]
    async fn list_services_by_category(
        &self,
        category_id: &str,
    ) -> Result<Vec<models::Service>, ServiceError> {
        let rows = Service::find()
            .filter(service::Column::CategoryId.eq(category_id))
            .order_by_asc(service::Column::DisplayOrder)
            .all(&*self.db)
            .await?;
        self.build_services(rows).await
    }

    #[instrument(skip(self))]
    async fn list_services_by_game(
        &self,
        game_id: &str,
    ) -> Result<Vec<models::Service>, ServiceError> {
        let service_ids: Vec<String> = ServiceGame::find()
            .filter(service_game::Column::GameId.eq(game_id))
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|link| link.service_id)
            .collect();

        let rows = Service::find()
            .filter(service::Column::Id.is_in(service_ids))
            .order_by_asc(service::Column::CategoryId)
            .order_by_asc(service::Column::DisplayOrder)
            .all(&*self.db)
            .await?;
        self.build_services(rows).await
    }

    /// The site configuration row is assumed deployed; a missing row is a
    /// fatal load error for the caller, not a default.
    #[instrument(skip(self))]
    async fn payment_config(&self) -> Result<models::PaymentConfig, ServiceError> {
        let row = SiteConfig::find_by_id(1)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::ConfigError("Site config not found".into()))?;
        Ok(models::PaymentConfig {
            disclaimer: row
                .payment_disclaimer
                .unwrap_or_else(|| DEFAULT_PAYMENT_DISCLAIMER.to_string()),
        })
    }

    #[instrument(skip(self))]
    async fn accordion_content(&self) -> Result<models::AccordionContent, ServiceError> {
        let title = SiteConfig::find_by_id(1)
            .one(&*self.db)
            .await?
            .and_then(|row| row.accordion_title)
            .unwrap_or_else(|| DEFAULT_ACCORDION_TITLE.to_string());

        let items = AccordionItem::find()
            .order_by_asc(accordion_item::Column::DisplayOrder)
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|row| models::AccordionItem {
                id: row.id,
                title: row.title,
                content: row.content,
            })
            .collect();

        Ok(models::AccordionContent { title, items })
    }
}
