use crate::handlers::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
};
use crate::{
    checkout::PaymentMethod,
    errors::ApiError,
    models::{AccordionContent, Region},
    pricing::RangeHandle,
    AppState,
};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Creates the router for checkout endpoints
pub fn checkout_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/checkout", post(open_checkout))
        .route("/checkout/content", get(checkout_content))
        .route("/checkout/:id", get(get_session))
        .route("/checkout/:id", delete(close_session))
        .route("/checkout/:id/region", put(select_region))
        .route("/checkout/:id/terms/toggle", post(toggle_terms))
        .route("/checkout/:id/payment-method", put(choose_payment_method))
        .route("/checkout/:id/range", put(update_range))
        .route("/checkout/:id/boxes/:index/toggle", post(toggle_box))
        .route("/checkout/:id/custom-amount", put(update_custom_amount))
        .route("/checkout/:id/selectors", put(choose_selector))
        .route("/checkout/:id/options/:key/toggle", post(toggle_option))
        .route("/checkout/:id/pay", post(submit_payment))
}

/// Open a checkout session for a service
async fn open_checkout(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<OpenCheckoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let session = state
        .checkout
        .open(&payload.service_id, payload.replaces_session_id)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(session))
}

/// Static content shown on the checkout surface
async fn checkout_content(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = state
        .catalog
        .payment_config()
        .await
        .map_err(map_service_error)?;
    let accordion = state
        .catalog
        .accordion_content()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(CheckoutContentResponse {
        disclaimer: payment.disclaimer,
        accordion,
    }))
}

async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.checkout.snapshot(id).map_err(map_service_error)?;
    Ok(success_response(session))
}

/// Close the session from any state; an in-flight gateway call is detached,
/// not cancelled.
async fn close_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.checkout.close(id).await.map_err(map_service_error)?;
    Ok(no_content_response())
}

async fn select_region(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RegionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .checkout
        .select_region(id, payload.region)
        .map_err(map_service_error)?;
    Ok(success_response(session))
}

async fn toggle_terms(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.checkout.toggle_terms(id).map_err(map_service_error)?;
    Ok(success_response(session))
}

async fn choose_payment_method(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PaymentMethodRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .checkout
        .choose_payment_method(id, payload.method)
        .map_err(map_service_error)?;
    Ok(success_response(session))
}

/// Move a range handle, either by pointer fraction or by typed text.
async fn update_range(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RangeUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = match (payload.fraction, payload.text) {
        (Some(fraction), None) => state
            .checkout
            .range_pointer(id, fraction, payload.handle)
            .map_err(map_service_error)?,
        (None, Some(text)) => state
            .checkout
            .range_text(id, payload.handle, &text)
            .map_err(map_service_error)?,
        _ => {
            return Err(ApiError::BadRequest(
                "provide exactly one of 'fraction' or 'text'".into(),
            ));
        }
    };
    Ok(success_response(session))
}

async fn toggle_box(
    State(state): State<Arc<AppState>>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .checkout
        .toggle_box(id, index)
        .map_err(map_service_error)?;
    Ok(success_response(session))
}

/// Set the custom amount, either typed text or a preset pick. The two are
/// mutually exclusive: the last-touched one wins.
async fn update_custom_amount(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CustomAmountRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = match (payload.text, payload.preset) {
        (Some(text), None) => state
            .checkout
            .set_custom_text(id, &text)
            .map_err(map_service_error)?,
        (None, Some(preset)) => state
            .checkout
            .select_custom_preset(id, preset)
            .map_err(map_service_error)?,
        _ => {
            return Err(ApiError::BadRequest(
                "provide exactly one of 'text' or 'preset'".into(),
            ));
        }
    };
    Ok(success_response(session))
}

async fn choose_selector(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SelectorChoiceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .checkout
        .choose_selector(id, payload.set, payload.selector, payload.value)
        .map_err(map_service_error)?;
    Ok(success_response(session))
}

async fn toggle_option(
    State(state): State<Arc<AppState>>,
    Path((id, key)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .checkout
        .toggle_option(id, &key)
        .map_err(map_service_error)?;
    Ok(success_response(session))
}

/// Submit the payment. Guard failures come back as a resolution payload,
/// not an HTTP error.
async fn submit_payment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let resolution = state
        .checkout
        .submit_payment(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(resolution))
}

// Request/Response DTOs

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct OpenCheckoutRequest {
    #[validate(length(min = 1))]
    pub service_id: String,
    /// Session to discard before opening the new one.
    pub replaces_session_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutContentResponse {
    pub disclaimer: String,
    pub accordion: AccordionContent,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegionRequest {
    pub region: Region,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PaymentMethodRequest {
    pub method: PaymentMethod,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RangeUpdateRequest {
    pub handle: RangeHandle,
    /// 0..1 position along the track for pointer moves.
    pub fraction: Option<f64>,
    /// Raw field text for typed commits.
    pub text: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CustomAmountRequest {
    pub text: Option<String>,
    pub preset: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SelectorChoiceRequest {
    /// Which selector set, in render order.
    #[serde(default)]
    pub set: usize,
    /// Which selector inside the set.
    pub selector: usize,
    /// Chosen option value; 0 unchooses.
    pub value: i64,
}
