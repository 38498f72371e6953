//! Payment gateway adapters
//!
//! [`PaymentGateway`] is the only outbound seam of the payment service.
//! [`RazorpayGateway`] talks to a Razorpay-compatible REST API;
//! [`SandboxGateway`] mints order ids in-process for local runs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;

use crate::config::GatewayConfig;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Gateway call timed out")]
    Timeout,

    #[error("Gateway transport error: {0}")]
    Transport(String),

    #[error("Gateway rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Gateway response could not be decoded: {0}")]
    Decode(String),
}

/// Order creation request in gateway units
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatewayOrderRequest {
    /// Amount in the currency's minor unit
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
}

/// Remote order as returned by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync + Debug {
    /// Adapter name for logging
    fn name(&self) -> &'static str;

    /// Public key identifier handed to clients
    fn key_id(&self) -> &str;

    /// Create a remote order. Must not be retried blindly: every success
    /// is a distinct order on the gateway side.
    async fn create_order(&self, req: &GatewayOrderRequest) -> Result<GatewayOrder, GatewayError>;
}

/// Razorpay-compatible REST adapter
///
/// `POST {base_url}/v1/orders` with HTTP basic auth `key_id:key_secret`.
pub struct RazorpayGateway {
    client: reqwest::Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

impl Debug for RazorpayGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RazorpayGateway")
            .field("base_url", &self.base_url)
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

impl RazorpayGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| GatewayError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
        })
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    fn name(&self) -> &'static str {
        "razorpay"
    }

    fn key_id(&self) -> &str {
        &self.key_id
    }

    async fn create_order(&self, req: &GatewayOrderRequest) -> Result<GatewayOrder, GatewayError> {
        let url = format!("{}/v1/orders", self.base_url);
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(req)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout
                } else {
                    GatewayError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<GatewayOrder>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

/// In-process gateway for local runs: every order succeeds.
#[derive(Debug)]
pub struct SandboxGateway {
    key_id: String,
    seq: AtomicU64,
}

impl SandboxGateway {
    pub fn new(key_id: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            seq: AtomicU64::new(0),
        }
    }

    /// Orders created so far
    pub fn orders_created(&self) -> u64 {
        self.seq.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl PaymentGateway for SandboxGateway {
    fn name(&self) -> &'static str {
        "sandbox"
    }

    fn key_id(&self) -> &str {
        &self.key_id
    }

    async fn create_order(&self, req: &GatewayOrderRequest) -> Result<GatewayOrder, GatewayError> {
        let n = self.seq.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(GatewayOrder {
            id: format!("order_sandbox_{:06}", n),
            amount: Some(req.amount),
            currency: Some(req.currency.clone()),
            status: Some("created".to_string()),
        })
    }
}
