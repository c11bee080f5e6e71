//! Razorpay payment gateway.
//!
//! Checkout creates a gateway order for the amount due; the client pays it in
//! the browser and posts back the ids and an HMAC signature, which
//! [`verify_signature`] checks before the order is confirmed.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use crate::config::RazorpayConfig;

type HmacSha256 = Hmac<Sha256>;

/// Currency of every gateway order.
pub const CURRENCY: &str = "INR";

/// Errors that can occur when talking to the payment gateway.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Gateway returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}

/// An order created on the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    /// Amount in paise.
    pub amount: u64,
    pub currency: String,
}

/// A payment gateway able to open orders for checkout.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a gateway order for `amount_paise`, tagged with `receipt`.
    async fn create_order(
        &self,
        amount_paise: u64,
        receipt: &str,
    ) -> Result<GatewayOrder, PaymentError>;
}

#[derive(Serialize)]
struct CreateOrderRequest<'a> {
    amount: u64,
    currency: &'a str,
    receipt: &'a str,
}

/// Razorpay Orders API client.
#[derive(Clone)]
pub struct RazorpayClient {
    client: reqwest::Client,
    key_id: String,
    key_secret: SecretString,
    api_base: String,
}

impl std::fmt::Debug for RazorpayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RazorpayClient")
            .field("key_id", &self.key_id)
            .field("key_secret", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl RazorpayClient {
    /// Create a new Razorpay client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &RazorpayConfig) -> Result<Self, PaymentError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()?;

        Ok(Self {
            client,
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
            api_base: config.api_base.trim_end_matches('/').to_owned(),
        })
    }
}

#[async_trait]
impl PaymentGateway for RazorpayClient {
    #[tracing::instrument(skip(self))]
    async fn create_order(
        &self,
        amount_paise: u64,
        receipt: &str,
    ) -> Result<GatewayOrder, PaymentError> {
        let url = format!("{}/orders", self.api_base);
        let body = CreateOrderRequest {
            amount: amount_paise,
            currency: CURRENCY,
            receipt,
        };

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.key_id, Some(self.key_secret.expose_secret()))
            .json(&body)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let order: GatewayOrder = response.json().await?;
        tracing::info!(gateway_order_id = %order.id, "Gateway order created");
        Ok(order)
    }
}

/// Check a checkout signature: hex HMAC-SHA256 of `order_id|payment_id`
/// keyed with the gateway secret.
#[must_use]
pub fn verify_signature(secret: &SecretString, order_id: &str, payment_id: &str, signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.expose_secret().as_bytes()) else {
        return false;
    };
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    mac.verify_slice(&expected).is_ok()
}

/// Produce the signature the gateway would send for this payment.
#[must_use]
pub fn sign_payment(secret: &SecretString, order_id: &str, payment_id: &str) -> String {
    HmacSha256::new_from_slice(secret.expose_secret().as_bytes()).map_or_else(
        |_| String::new(),
        |mac| {
            hex::encode(
                mac.chain_update(format!("{order_id}|{payment_id}").as_bytes())
                    .finalize()
                    .into_bytes(),
            )
        },
    )
}
