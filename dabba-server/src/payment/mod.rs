//! Payment gateway adapter
//!
//! [`PaymentGateway`] is the boundary to the payment provider. Production
//! uses [`RazorpayGateway`]; development without credentials and tests use
//! [`MockGateway`].

mod mock;
mod razorpay;
mod signature;

pub use mock::MockGateway;
pub use razorpay::RazorpayGateway;
pub use signature::{sign_payment, verify_payment_signature};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Payment provider rejected the request: {0}")]
    Provider(String),

    #[error("Payment provider unreachable: {0}")]
    Network(String),

    #[error("Payment provider timed out after {0}ms")]
    Timeout(u64),
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::Timeout(ms) => {
                AppError::timeout(format!("Payment provider timed out after {ms}ms"))
            }
            other => AppError::with_message(ErrorCode::PaymentProviderError, other.to_string()),
        }
    }
}

impl From<reqwest::Error> for PaymentError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_status() || err.is_decode() {
            PaymentError::Provider(err.to_string())
        } else {
            PaymentError::Network(err.to_string())
        }
    }
}

pub type PaymentResult<T> = Result<T, PaymentError>;

/// Order created at the provider; the client completes checkout against `id`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderOrder {
    pub id: String,
    pub status: String,
    /// Minor units (paise)
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderPayment {
    pub id: String,
    pub status: String,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> PaymentResult<ProviderOrder>;

    /// Provider-side payment record.
    ///
    /// Not consulted by checkout verification, which trusts the HMAC
    /// signature alone. Kept for reconciliation tooling.
    async fn fetch_payment(&self, payment_id: &str) -> PaymentResult<ProviderPayment>;

    /// Gateway label for logs
    fn name(&self) -> &'static str;
}

pub type SharedGateway = Arc<dyn PaymentGateway>;
