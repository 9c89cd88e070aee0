//! Payment gateway boundary.
//!
//! The checkout core hands the gateway an amount plus a human-readable
//! description and consumes exactly one resolution per attempt. Gateway
//! failures are outcomes, not errors: the session decides how each one
//! moves the state machine.

pub mod paypal;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;

pub use paypal::PayPalGateway;

/// Handoff payload for one payment attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentRequest {
    pub amount: Decimal,
    pub currency: String,
    pub description: String,
}

/// Resolution of a payment attempt, delivered asynchronously by the gateway.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentOutcome {
    Success {
        order_id: String,
        captured_amount: Decimal,
        currency: String,
    },
    Error {
        cause: String,
    },
    Cancelled,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Executes one payment attempt to completion. There is no timeout or
    /// cancellation token; callers must stay responsive while this resolves.
    async fn execute(&self, request: PaymentRequest) -> PaymentOutcome;
}
