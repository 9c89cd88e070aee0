//! Per-service checkout session.
//!
//! A session is created when a service is opened for purchase and discarded
//! wholesale when the checkout surface closes or a different service is
//! opened; selection state never survives a service change. All transitions
//! here are synchronous; the only asynchronous edge is the payment gateway
//! handoff, which the owning service layer drives around this state machine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Region, Service};
use crate::pricing::{self, RangeHandle, ServiceSelections};
use crate::services::payments::{PaymentOutcome, PaymentRequest};

pub const CHECKOUT_CURRENCY: &str = "USD";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Paypal,
    Card,
}

/// Payment-submission sub-state. `Cancelled` is recorded but presents as
/// payment-method-chosen: a user cancel is silent, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PaymentSubmission {
    Idle,
    AwaitingGateway,
    Settled {
        order_id: String,
        captured_amount: Decimal,
    },
    Failed {
        message: String,
    },
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStage {
    Selecting,
    PaymentMethodChosen,
    AwaitingGateway,
    Settled,
    Failed,
}

/// Result of a `submit_payment` call.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Guard failed; surfaced to the user, no transition happened.
    Validation(String),
    /// Card is a declared-but-unimplemented path.
    CardUnavailable,
    /// PayPal handoff: the session is now awaiting the gateway.
    Dispatch(PaymentRequest),
}

#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub id: Uuid,
    pub service: Arc<Service>,
    pub region: Region,
    pub terms_accepted: bool,
    pub payment_method: Option<PaymentMethod>,
    pub submission: PaymentSubmission,
    pub selections: ServiceSelections,
    pub opened_at: DateTime<Utc>,
}

impl CheckoutSession {
    /// Opens a fresh session: default region, terms unaccepted, no payment
    /// method, freshly-initialized selection state.
    pub fn open(service: Arc<Service>) -> Self {
        let selections = ServiceSelections::for_service(&service);
        Self {
            id: Uuid::new_v4(),
            service,
            region: Region::default(),
            terms_accepted: false,
            payment_method: None,
            submission: PaymentSubmission::Idle,
            selections,
            opened_at: Utc::now(),
        }
    }

    pub fn stage(&self) -> CheckoutStage {
        match &self.submission {
            PaymentSubmission::AwaitingGateway => CheckoutStage::AwaitingGateway,
            PaymentSubmission::Settled { .. } => CheckoutStage::Settled,
            PaymentSubmission::Failed { .. } => CheckoutStage::Failed,
            PaymentSubmission::Idle | PaymentSubmission::Cancelled => {
                if self.payment_method.is_some() {
                    CheckoutStage::PaymentMethodChosen
                } else {
                    CheckoutStage::Selecting
                }
            }
        }
    }

    pub fn select_region(&mut self, region: Region) {
        self.region = region;
    }

    pub fn toggle_terms(&mut self) {
        self.terms_accepted = !self.terms_accepted;
    }

    pub fn choose_payment_method(&mut self, method: PaymentMethod) {
        self.payment_method = Some(method);
    }

    pub fn total(&self) -> i64 {
        pricing::compute_total(&self.service, &self.selections)
    }

    // Selection passthroughs. Each returns whether anything could be applied;
    // updates against components the service does not carry are no-ops.

    pub fn range_pointer(&mut self, fraction: f64, handle: RangeHandle) -> bool {
        match &mut self.selections.range {
            Some(range) => {
                range.set_from_pointer(fraction, handle);
                true
            }
            None => false,
        }
    }

    pub fn range_text(&mut self, handle: RangeHandle, input: &str) -> bool {
        match &mut self.selections.range {
            Some(range) => range.set_from_text(handle, input),
            None => false,
        }
    }

    pub fn toggle_box(&mut self, index: usize) -> bool {
        match &mut self.selections.multi_box {
            Some(boxes) => boxes.toggle(index),
            None => false,
        }
    }

    pub fn set_custom_text(&mut self, text: &str) -> bool {
        match &mut self.selections.custom_amount {
            Some(custom) => custom.set_typed_text(text),
            None => false,
        }
    }

    pub fn select_custom_preset(&mut self, value: i64) -> bool {
        match &mut self.selections.custom_amount {
            Some(custom) => custom.select_preset(value),
            None => false,
        }
    }

    pub fn choose_selector(&mut self, set_index: usize, selector: usize, value: i64) -> bool {
        match self.selections.selector_sets.get_mut(set_index) {
            Some(set) => set.choose(selector, value),
            None => false,
        }
    }

    pub fn toggle_option(&mut self, key: &str) -> bool {
        match &mut self.selections.checkbox_group {
            Some(group) => group.toggle(key),
            None => false,
        }
    }

    /// Attempts to start a payment.
    ///
    /// Guard: terms accepted and a payment method chosen, otherwise a
    /// user-facing validation failure with no transition. Card surfaces a
    /// not-yet-available outcome and stays put. PayPal moves the session to
    /// awaiting-gateway and yields the handoff request; the session issues
    /// exactly one attempt per call.
    pub fn submit_payment(&mut self) -> SubmitOutcome {
        if self.submission == PaymentSubmission::AwaitingGateway {
            return SubmitOutcome::Validation("A payment is already in progress".into());
        }
        if matches!(self.submission, PaymentSubmission::Settled { .. }) {
            return SubmitOutcome::Validation("This order has already been paid".into());
        }
        if !self.terms_accepted || self.payment_method.is_none() {
            return SubmitOutcome::Validation(
                "Please accept the service policies and select a payment method".into(),
            );
        }

        match self.payment_method {
            Some(PaymentMethod::Card) => SubmitOutcome::CardUnavailable,
            Some(PaymentMethod::Paypal) => {
                self.submission = PaymentSubmission::AwaitingGateway;
                SubmitOutcome::Dispatch(PaymentRequest {
                    amount: Decimal::from(self.total()),
                    currency: CHECKOUT_CURRENCY.to_string(),
                    description: self.compose_description(),
                })
            }
            None => unreachable!("guard checked above"),
        }
    }

    /// Applies the gateway's resolution to the awaiting session.
    pub fn apply_gateway_outcome(&mut self, outcome: PaymentOutcome) {
        self.submission = match outcome {
            PaymentOutcome::Success {
                order_id,
                captured_amount,
                ..
            } => PaymentSubmission::Settled {
                order_id,
                captured_amount,
            },
            PaymentOutcome::Error { cause } => PaymentSubmission::Failed { message: cause },
            PaymentOutcome::Cancelled => PaymentSubmission::Cancelled,
        };
    }

    /// Human-readable order summary handed to the payment gateway. It is
    /// pipe-delimited for readability only; nothing parses it downstream.
    pub fn compose_description(&self) -> String {
        let service = &self.service;
        let mut parts = vec![format!("{} (Region: {})", service.title, self.region)];

        if let (Some(config), Some(range)) = (&service.range, &self.selections.range) {
            let label = config.label.as_deref().unwrap_or("Range");
            parts.push(format!("{}: {} -> {}", label, range.lower(), range.upper()));
        }

        if let Some(boxes) = &self.selections.multi_box {
            if !boxes.is_empty() {
                parts.push(format!("Amounts: {}", boxes.selected_labels().join(", ")));
            }
        }

        if let (Some(config), Some(custom)) = (&service.custom_amount, &self.selections.custom_amount)
        {
            if config.enabled {
                if let Some(amount) = custom.current_amount() {
                    let label = config.label.as_deref().unwrap_or("Custom Amount");
                    parts.push(format!("{}: ${}", label, amount));
                }
            }
        }

        if let Some(group) = &self.selections.checkbox_group {
            let labels = group.selected_labels();
            if !labels.is_empty() {
                let title = service
                    .checkbox_group
                    .as_ref()
                    .and_then(|g| g.title.as_deref())
                    .unwrap_or("Additional Services");
                parts.push(format!("{}: {}", title, labels.join(", ")));
            }
        }

        for set in &self.selections.selector_sets {
            for (title, option) in set.choices() {
                parts.push(format!("{}: {}", title, option.label));
            }
        }

        parts.push(format!("Total: ${}", self.total()));
        parts.join(" | ")
    }
}
