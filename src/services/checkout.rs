//! Checkout flow orchestration.
//!
//! Glues the content source, the session store, the event channel, and the
//! payment gateway together. Session mutations are synchronous single-turn
//! updates; the gateway call is awaited without holding the session entry,
//! so a session can be closed while a payment is in flight (the late
//! resolution then simply finds nothing to apply to).

use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::checkout::{
    CheckoutManager, CheckoutSession, CheckoutStage, PaymentMethod, PaymentSubmission,
    SubmitOutcome,
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::Region;
use crate::pricing::RangeHandle;
use crate::services::catalog::ContentSource;
use crate::services::payments::{PaymentGateway, PaymentOutcome};

/// Serializable view of a live session.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub service_id: String,
    pub service_title: String,
    pub stage: CheckoutStage,
    pub region: Region,
    pub terms_accepted: bool,
    pub payment_method: Option<PaymentMethod>,
    pub submission: PaymentSubmission,
    pub total: i64,
    pub description: String,
}

impl From<&CheckoutSession> for SessionSnapshot {
    fn from(session: &CheckoutSession) -> Self {
        Self {
            id: session.id,
            service_id: session.service.id.clone(),
            service_title: session.service.title.clone(),
            stage: session.stage(),
            region: session.region,
            terms_accepted: session.terms_accepted,
            payment_method: session.payment_method,
            submission: session.submission.clone(),
            total: session.total(),
            description: session.compose_description(),
        }
    }
}

/// What a payment submission resolved to, as surfaced to the caller.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PaymentResolution {
    /// Guard failed: user must accept the policies and pick a method.
    ValidationFailed { message: String },
    /// Card checkout is not available yet.
    CardUnavailable,
    Settled {
        order_id: String,
        captured_amount: Decimal,
    },
    Failed { message: String },
    Cancelled,
    /// The session was closed while the gateway call was in flight; the
    /// resolution was discarded.
    SessionClosed,
}

#[derive(Clone)]
pub struct CheckoutService {
    catalog: Arc<dyn ContentSource>,
    manager: Arc<CheckoutManager>,
    gateway: Arc<dyn PaymentGateway>,
    event_sender: EventSender,
}

impl CheckoutService {
    pub fn new(
        catalog: Arc<dyn ContentSource>,
        manager: Arc<CheckoutManager>,
        gateway: Arc<dyn PaymentGateway>,
        event_sender: EventSender,
    ) -> Self {
        Self {
            catalog,
            manager,
            gateway,
            event_sender,
        }
    }

    /// Opens a checkout session for a service. An unresolvable service id
    /// propagates as not-found and no session state is created. A previous
    /// session passed in `replaces` is discarded wholesale first.
    #[instrument(skip(self))]
    pub async fn open(
        &self,
        service_id: &str,
        replaces: Option<Uuid>,
    ) -> Result<SessionSnapshot, ServiceError> {
        let service = self.catalog.get_service_by_id(service_id).await?;
        let session = self.manager.open(Arc::new(service), replaces);

        self.event_sender
            .send_or_log(Event::CheckoutOpened {
                session_id: session.id,
                service_id: session.service.id.clone(),
            })
            .await;

        info!(session_id = %session.id, service_id, "checkout session opened");
        Ok(SessionSnapshot::from(&session))
    }

    pub fn snapshot(&self, id: Uuid) -> Result<SessionSnapshot, ServiceError> {
        self.manager
            .snapshot(id)
            .map(|session| SessionSnapshot::from(&session))
            .ok_or_else(|| session_not_found(id))
    }

    /// Closes from any state, including awaiting-gateway: the in-flight
    /// gateway call is not cancelled, only detached.
    pub async fn close(&self, id: Uuid) -> Result<(), ServiceError> {
        if !self.manager.close(id) {
            return Err(session_not_found(id));
        }
        self.event_sender
            .send_or_log(Event::CheckoutClosed { session_id: id })
            .await;
        Ok(())
    }

    pub fn select_region(&self, id: Uuid, region: Region) -> Result<SessionSnapshot, ServiceError> {
        self.mutate(id, |session| {
            session.select_region(region);
            Ok(())
        })
    }

    pub fn toggle_terms(&self, id: Uuid) -> Result<SessionSnapshot, ServiceError> {
        self.mutate(id, |session| {
            session.toggle_terms();
            Ok(())
        })
    }

    pub fn choose_payment_method(
        &self,
        id: Uuid,
        method: PaymentMethod,
    ) -> Result<SessionSnapshot, ServiceError> {
        self.mutate(id, |session| {
            session.choose_payment_method(method);
            Ok(())
        })
    }

    pub fn range_pointer(
        &self,
        id: Uuid,
        fraction: f64,
        handle: RangeHandle,
    ) -> Result<SessionSnapshot, ServiceError> {
        self.mutate(id, |session| {
            if !session.range_pointer(fraction, handle) {
                return Err(ServiceError::InvalidInput(
                    "service has no range component".into(),
                ));
            }
            Ok(())
        })
    }

    /// Typed range input commits on focus loss; malformed text reverts the
    /// field without touching state and is not an error.
    pub fn range_text(
        &self,
        id: Uuid,
        handle: RangeHandle,
        text: &str,
    ) -> Result<SessionSnapshot, ServiceError> {
        self.mutate(id, |session| {
            if session.selections.range.is_none() {
                return Err(ServiceError::InvalidInput(
                    "service has no range component".into(),
                ));
            }
            session.range_text(handle, text);
            Ok(())
        })
    }

    pub fn toggle_box(&self, id: Uuid, index: usize) -> Result<SessionSnapshot, ServiceError> {
        self.mutate(id, |session| {
            if !session.toggle_box(index) {
                return Err(ServiceError::InvalidInput(format!(
                    "no amount box at index {index}"
                )));
            }
            Ok(())
        })
    }

    /// Custom-amount typed input; malformed text is silently ignored.
    pub fn set_custom_text(&self, id: Uuid, text: &str) -> Result<SessionSnapshot, ServiceError> {
        self.mutate(id, |session| {
            if session.selections.custom_amount.is_none() {
                return Err(ServiceError::InvalidInput(
                    "service has no custom amount component".into(),
                ));
            }
            session.set_custom_text(text);
            Ok(())
        })
    }

    pub fn select_custom_preset(
        &self,
        id: Uuid,
        value: i64,
    ) -> Result<SessionSnapshot, ServiceError> {
        self.mutate(id, |session| {
            if !session.select_custom_preset(value) {
                return Err(ServiceError::InvalidInput(format!(
                    "{value} is not a configured preset"
                )));
            }
            Ok(())
        })
    }

    pub fn choose_selector(
        &self,
        id: Uuid,
        set_index: usize,
        selector: usize,
        value: i64,
    ) -> Result<SessionSnapshot, ServiceError> {
        self.mutate(id, |session| {
            if !session.choose_selector(set_index, selector, value) {
                return Err(ServiceError::InvalidInput(
                    "unknown selector or option value".into(),
                ));
            }
            Ok(())
        })
    }

    pub fn toggle_option(&self, id: Uuid, key: &str) -> Result<SessionSnapshot, ServiceError> {
        self.mutate(id, |session| {
            if !session.toggle_option(key) {
                return Err(ServiceError::InvalidInput(format!(
                    "unknown additional service '{key}'"
                )));
            }
            Ok(())
        })
    }

    /// Submits the payment for a session. Guard failures and the
    /// card-unavailable path resolve without a gateway round trip; a PayPal
    /// dispatch issues exactly one gateway attempt and applies its outcome.
    #[instrument(skip(self))]
    pub async fn submit_payment(&self, id: Uuid) -> Result<PaymentResolution, ServiceError> {
        let (outcome, total) = self
            .manager
            .with_session(id, |session| (session.submit_payment(), session.total()))
            .ok_or_else(|| session_not_found(id))?;

        let request = match outcome {
            SubmitOutcome::Validation(message) => {
                return Ok(PaymentResolution::ValidationFailed { message });
            }
            SubmitOutcome::CardUnavailable => {
                return Ok(PaymentResolution::CardUnavailable);
            }
            SubmitOutcome::Dispatch(request) => request,
        };

        self.event_sender
            .send_or_log(Event::PaymentSubmitted {
                session_id: id,
                amount: total,
            })
            .await;

        // Awaited without holding the session entry: the session stays
        // responsive (and closable) until the gateway resolves.
        let outcome = self.gateway.execute(request).await;

        let applied = self
            .manager
            .with_session(id, |session| session.apply_gateway_outcome(outcome.clone()));
        if applied.is_none() {
            info!(session_id = %id, "session closed while awaiting gateway; outcome discarded");
            return Ok(PaymentResolution::SessionClosed);
        }

        Ok(match outcome {
            PaymentOutcome::Success {
                order_id,
                captured_amount,
                ..
            } => {
                self.event_sender
                    .send_or_log(Event::PaymentSettled {
                        session_id: id,
                        order_id: order_id.clone(),
                    })
                    .await;
                PaymentResolution::Settled {
                    order_id,
                    captured_amount,
                }
            }
            PaymentOutcome::Error { cause } => {
                self.event_sender
                    .send_or_log(Event::PaymentFailed {
                        session_id: id,
                        cause: cause.clone(),
                    })
                    .await;
                PaymentResolution::Failed { message: cause }
            }
            PaymentOutcome::Cancelled => {
                self.event_sender
                    .send_or_log(Event::PaymentCancelled { session_id: id })
                    .await;
                PaymentResolution::Cancelled
            }
        })
    }

    fn mutate(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut CheckoutSession) -> Result<(), ServiceError>,
    ) -> Result<SessionSnapshot, ServiceError> {
        self.manager
            .with_session(id, |session| {
                f(session)?;
                Ok(SessionSnapshot::from(&*session))
            })
            .ok_or_else(|| session_not_found(id))?
    }
}

fn session_not_found(id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("Checkout session {} not found", id))
}
