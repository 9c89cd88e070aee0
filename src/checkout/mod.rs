//! Checkout session state machine and the store that owns live sessions.

pub mod manager;
pub mod session;

pub use manager::CheckoutManager;
pub use session::{
    CheckoutSession, CheckoutStage, PaymentMethod, PaymentSubmission, SubmitOutcome,
};
