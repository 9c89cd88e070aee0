use crate::handlers::common::{map_service_error, success_response};
use crate::{errors::ApiError, AppState};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use std::sync::Arc;

/// Creates the router for catalog endpoints
pub fn catalog_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/games", get(list_games))
        .route("/games/:id/services", get(list_services_by_game))
        .route("/categories", get(list_categories))
        .route("/categories/:id/services", get(list_services_by_category))
        .route("/services/:id", get(get_service))
}

async fn list_games(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let games = state
        .catalog
        .list_games()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(games))
}

async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let categories = state
        .catalog
        .list_categories()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(categories))
}

/// Full service shape, ordered render list included.
async fn get_service(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let service = state
        .catalog
        .get_service_by_id(&id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(service))
}

async fn list_services_by_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let services = state
        .catalog
        .list_services_by_category(&id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(services))
}

async fn list_services_by_game(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let services = state
        .catalog
        .list_services_by_game(&id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(services))
}
