//! Offline gateway for development and tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use super::{PaymentError, PaymentGateway, PaymentResult, ProviderOrder, ProviderPayment};

/// Issues `order_mock_{n}` ids and reports every payment as `captured`.
///
/// `fail_next` makes the next `create_order` return a provider error.
#[derive(Debug, Default)]
pub struct MockGateway {
    counter: AtomicU64,
    fail_next: AtomicBool,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Number of provider orders created so far
    pub fn orders_created(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> PaymentResult<ProviderOrder> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(PaymentError::Provider("mock provider failure".into()));
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(ProviderOrder {
            id: format!("order_mock_{n}"),
            status: "created".to_string(),
            amount: amount_minor,
            currency: currency.to_string(),
            receipt: Some(receipt.to_string()),
        })
    }

    async fn fetch_payment(&self, payment_id: &str) -> PaymentResult<ProviderPayment> {
        Ok(ProviderPayment {
            id: payment_id.to_string(),
            status: "captured".to_string(),
            amount: 0,
            currency: "INR".to_string(),
            order_id: None,
            method: Some("mock".to_string()),
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
