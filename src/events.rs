//! Checkout lifecycle events, fanned out through an in-process channel.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{error, info};
use uuid::Uuid;

/// Events emitted by the checkout flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    CheckoutOpened {
        session_id: Uuid,
        service_id: String,
    },
    CheckoutClosed {
        session_id: Uuid,
    },
    PaymentSubmitted {
        session_id: Uuid,
        amount: i64,
    },
    PaymentSettled {
        session_id: Uuid,
        order_id: String,
    },
    PaymentFailed {
        session_id: Uuid,
        cause: String,
    },
    PaymentCancelled {
        session_id: Uuid,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing when the receiver is gone.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            error!("Event delivery failed: {}", e);
        }
    }
}

/// Drains the event channel. Runs for the lifetime of the process; today the
/// sink is the structured log.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        info!(?event, "event");
    }
}
