//! Customer notifications
//!
//! Delivery is external. [`Dispatcher`] wraps a [`Notifier`] with a timeout
//! and swallows failures after logging them, so a notification can never
//! fail the operation that triggered it.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use shared::models::{Order, OrderStatus};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification relay error: {0}")]
    Relay(String),

    #[error("Notification timed out")]
    Timeout,
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        NotifyError::Relay(err.to_string())
    }
}

pub type NotifyResult<T> = Result<T, NotifyError>;

/// Who receives a notification about an order
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Recipient {
    pub user_id: String,
    pub name: String,
    pub phone: String,
}

impl Recipient {
    pub fn for_order(order: &Order) -> Self {
        Self {
            user_id: order.user_id.clone(),
            name: order.pickup_details.customer_name.clone(),
            phone: order.pickup_details.customer_phone.clone(),
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_order_confirmation(&self, order: &Order, recipient: &Recipient)
    -> NotifyResult<()>;

    async fn send_order_status_update(
        &self,
        order: &Order,
        recipient: &Recipient,
        status: OrderStatus,
    ) -> NotifyResult<()>;
}

/// Writes notifications to the log only
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_order_confirmation(
        &self,
        order: &Order,
        recipient: &Recipient,
    ) -> NotifyResult<()> {
        tracing::info!(
            order_number = %order.order_number,
            user_id = %recipient.user_id,
            "Order confirmation notification"
        );
        Ok(())
    }

    async fn send_order_status_update(
        &self,
        order: &Order,
        recipient: &Recipient,
        status: OrderStatus,
    ) -> NotifyResult<()> {
        tracing::info!(
            order_number = %order.order_number,
            user_id = %recipient.user_id,
            status = %status,
            "Order status notification"
        );
        Ok(())
    }
}

/// Posts notifications as JSON to a relay webhook
#[derive(Debug)]
pub struct HttpNotifier {
    client: reqwest::Client,
    url: String,
}

impl HttpNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    async fn post(&self, body: serde_json::Value) -> NotifyResult<()> {
        self.client
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn send_order_confirmation(
        &self,
        order: &Order,
        recipient: &Recipient,
    ) -> NotifyResult<()> {
        self.post(json!({
            "type": "order_confirmation",
            "recipient": recipient,
            "order_id": order.id,
            "order_number": order.order_number,
            "pickup_date": order.pickup_details.date,
            "time_slot": order.pickup_details.time_slot,
            "total": order.pricing.total.to_string(),
        }))
        .await
    }

    async fn send_order_status_update(
        &self,
        order: &Order,
        recipient: &Recipient,
        status: OrderStatus,
    ) -> NotifyResult<()> {
        self.post(json!({
            "type": "order_status_update",
            "recipient": recipient,
            "order_id": order.id,
            "order_number": order.order_number,
            "status": status,
        }))
        .await
    }
}

/// Best-effort delivery with a timeout
#[derive(Clone)]
pub struct Dispatcher {
    notifier: Arc<dyn Notifier>,
    timeout: Duration,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, timeout: Duration) -> Self {
        Self { notifier, timeout }
    }

    pub async fn order_confirmed(&self, order: &Order) {
        let recipient = Recipient::for_order(order);
        let result = tokio::time::timeout(
            self.timeout,
            self.notifier.send_order_confirmation(order, &recipient),
        )
        .await
        .unwrap_or(Err(NotifyError::Timeout));
        if let Err(e) = result {
            tracing::warn!(order_id = %order.id, error = %e, "Order confirmation not delivered");
        }
    }

    pub async fn status_changed(&self, order: &Order) {
        let recipient = Recipient::for_order(order);
        let result = tokio::time::timeout(
            self.timeout,
            self.notifier
                .send_order_status_update(order, &recipient, order.status),
        )
        .await
        .unwrap_or(Err(NotifyError::Timeout));
        if let Err(e) = result {
            tracing::warn!(order_id = %order.id, error = %e, "Status notification not delivered");
        }
    }
}
