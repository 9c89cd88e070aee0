//! Boostline API Library
//!
//! Backend for a gaming-services storefront: catalog of games, categories,
//! and boost services with composable pricing, plus the checkout session
//! flow that hands off to PayPal.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod checkout;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod models;
pub mod openapi;
pub mod pricing;
pub mod services;

use axum::{extract::State, response::Json, routing::get, Router};
use http::HeaderValue;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub catalog: Arc<dyn services::ContentSource>,
    pub checkout: Arc<services::CheckoutService>,
    /// Present in database mode only; flat-file deployments run without one.
    pub db: Option<Arc<db::DbPool>>,
}

/// Builds the application router with middleware applied.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = match &state.config.cors_allowed_origins {
        Some(origins) => {
            let allowed: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods(Any)
                .allow_headers(Any)
        }
        None => CorsLayer::permissive(),
    };

    Router::new()
        .route("/health", get(health))
        .nest(
            "/api/v1",
            handlers::catalog_routes().merge(handlers::checkout_routes()),
        )
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let database = match &state.db {
        Some(pool) => match db::ping(pool).await {
            Ok(()) => "up",
            Err(_) => "down",
        },
        None => "n/a",
    };
    Json(json!({
        "status": "ok",
        "database": database,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
