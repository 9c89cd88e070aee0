//! PayPal Orders API implementation of the payment gateway.
//!
//! One `execute` call performs the whole capture flow: client-credentials
//! token, order creation, capture. Transport and API failures surface as
//! `PaymentOutcome::Error`; an order PayPal reports as voided maps to
//! `Cancelled`.

use async_trait::async_trait;
use base64::Engine;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::config::PayPalConfig;
use crate::services::payments::{PaymentGateway, PaymentOutcome, PaymentRequest};

#[derive(Clone)]
pub struct PayPalGateway {
    http: reqwest::Client,
    config: PayPalConfig,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: String,
    #[serde(default)]
    status: String,
}

#[derive(Debug, Deserialize)]
struct CaptureResponse {
    id: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    purchase_units: Vec<CapturePurchaseUnit>,
}

#[derive(Debug, Deserialize)]
struct CapturePurchaseUnit {
    #[serde(default)]
    payments: Option<CapturePayments>,
}

#[derive(Debug, Deserialize)]
struct CapturePayments {
    #[serde(default)]
    captures: Vec<Capture>,
}

#[derive(Debug, Deserialize)]
struct Capture {
    amount: CaptureAmount,
}

#[derive(Debug, Deserialize)]
struct CaptureAmount {
    currency_code: String,
    value: String,
}

impl PayPalGateway {
    pub fn new(config: PayPalConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    async fn access_token(&self) -> Result<String, String> {
        let credentials = base64::engine::general_purpose::STANDARD.encode(format!(
            "{}:{}",
            self.config.client_id, self.config.client_secret
        ));
        let response = self
            .http
            .post(format!("{}/v1/oauth2/token", self.config.api_base))
            .header("Authorization", format!("Basic {credentials}"))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| format!("token request failed: {e}"))?;

        if !response.status().is_success() {
            return Err(format!("token request rejected: {}", response.status()));
        }
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| format!("token response malformed: {e}"))?;
        Ok(token.access_token)
    }

    async fn create_order(
        &self,
        token: &str,
        request: &PaymentRequest,
    ) -> Result<OrderResponse, String> {
        let mut amount = request.amount;
        amount.rescale(2);

        let body = json!({
            "intent": "CAPTURE",
            "purchase_units": [{
                "description": request.description,
                "amount": {
                    "currency_code": request.currency,
                    "value": amount.to_string(),
                }
            }],
            "application_context": {
                "shipping_preference": "NO_SHIPPING"
            }
        });

        let response = self
            .http
            .post(format!("{}/v2/checkout/orders", self.config.api_base))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("order creation failed: {e}"))?;

        if !response.status().is_success() {
            return Err(format!("order creation rejected: {}", response.status()));
        }
        response
            .json()
            .await
            .map_err(|e| format!("order response malformed: {e}"))
    }

    async fn capture_order(&self, token: &str, order_id: &str) -> Result<CaptureResponse, String> {
        let response = self
            .http
            .post(format!(
                "{}/v2/checkout/orders/{}/capture",
                self.config.api_base, order_id
            ))
            .bearer_auth(token)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| format!("capture failed: {e}"))?;

        if !response.status().is_success() {
            return Err(format!("capture rejected: {}", response.status()));
        }
        response
            .json()
            .await
            .map_err(|e| format!("capture response malformed: {e}"))
    }
}

#[async_trait]
impl PaymentGateway for PayPalGateway {
    #[instrument(skip(self, request), fields(amount = %request.amount))]
    async fn execute(&self, request: PaymentRequest) -> PaymentOutcome {
        let token = match self.access_token().await {
            Ok(token) => token,
            Err(cause) => return PaymentOutcome::Error { cause },
        };

        let order = match self.create_order(&token, &request).await {
            Ok(order) => order,
            Err(cause) => return PaymentOutcome::Error { cause },
        };
        if order.status == "VOIDED" {
            warn!(order_id = %order.id, "order voided before capture");
            return PaymentOutcome::Cancelled;
        }

        match self.capture_order(&token, &order.id).await {
            Ok(capture) if capture.status == "COMPLETED" => {
                let (captured_amount, currency) = capture
                    .purchase_units
                    .iter()
                    .filter_map(|unit| unit.payments.as_ref())
                    .flat_map(|payments| &payments.captures)
                    .next()
                    .and_then(|c| {
                        c.amount
                            .value
                            .parse::<Decimal>()
                            .ok()
                            .map(|v| (v, c.amount.currency_code.clone()))
                    })
                    .unwrap_or((request.amount, request.currency.clone()));

                info!(order_id = %capture.id, "payment captured");
                PaymentOutcome::Success {
                    order_id: capture.id,
                    captured_amount,
                    currency,
                }
            }
            Ok(capture) => PaymentOutcome::Error {
                cause: format!("capture ended in status {}", capture.status),
            },
            Err(cause) => PaymentOutcome::Error { cause },
        }
    }
}
