//! Razorpay REST client (no SDK dependency)

use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

use super::{PaymentError, PaymentGateway, PaymentResult, ProviderOrder, ProviderPayment};

pub struct RazorpayGateway {
    client: reqwest::Client,
    api_base: String,
    key_id: String,
    key_secret: String,
    timeout: Duration,
}

impl std::fmt::Debug for RazorpayGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RazorpayGateway")
            .field("api_base", &self.api_base)
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

impl RazorpayGateway {
    pub fn new(
        api_base: impl Into<String>,
        key_id: impl Into<String>,
        key_secret: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            key_id: key_id.into(),
            key_secret: key_secret.into(),
            timeout,
        }
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> PaymentResult<T> {
        let call = async {
            let resp = request
                .basic_auth(&self.key_id, Some(&self.key_secret))
                .send()
                .await?;
            let status = resp.status();
            if !status.is_success() {
                let body: serde_json::Value = resp.json().await.unwrap_or_default();
                let description = body["error"]["description"]
                    .as_str()
                    .unwrap_or("unknown error")
                    .to_string();
                return Err(PaymentError::Provider(format!("{status}: {description}")));
            }
            Ok::<T, PaymentError>(resp.json::<T>().await?)
        };

        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| PaymentError::Timeout(self.timeout.as_millis() as u64))?
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> PaymentResult<ProviderOrder> {
        let request = self
            .client
            .post(format!("{}/orders", self.api_base))
            .json(&json!({
                "amount": amount_minor,
                "currency": currency,
                "receipt": receipt,
            }));
        let order: ProviderOrder = self.send(request).await?;
        tracing::info!(provider_order_id = %order.id, receipt = %receipt, "Provider order created");
        Ok(order)
    }

    async fn fetch_payment(&self, payment_id: &str) -> PaymentResult<ProviderPayment> {
        let request = self
            .client
            .get(format!("{}/payments/{}", self.api_base, payment_id));
        self.send(request).await
    }

    fn name(&self) -> &'static str {
        "razorpay"
    }
}
