//! OrdersManager - cart to order conversion and the order lifecycle
//!
//! # Create Flow
//!
//! ```text
//! create_order(user, pickup, method)
//!     ├─ 1. Load cart, check non-empty and single vendor
//!     ├─ 2. Resolve vendor settings, check date / open day / slot
//!     ├─ 3. Price the cart, enforce minimum order amount
//!     ├─ 4. Pre-check slot capacity
//!     ├─ 5. Online: create provider order (nothing persisted on failure)
//!     ├─ 6. Write txn: acquire slot booking + insert order, commit
//!     └─ 7. Clear cart (failure logged only)
//! ```
//!
//! Status changes and payment reconciliation are single write transactions.
//! Notifications are sent after commit and never fail the operation.

mod error;
pub use error::*;

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use shared::models::{
    Order, OrderLine, OrderStatus, PaymentDetails, PaymentMethod, PaymentStatus, PickupDetails,
    StatusEntry,
};
use shared::util::{new_id, now_millis, order_number};
use std::time::Duration;

use crate::auth::CurrentUser;
use crate::db::{KitchenStorage, StorageError, slot_key};
use crate::notify::Dispatcher;
use crate::payment::{
    PaymentError, ProviderOrder, SharedGateway, verify_payment_signature,
};
use crate::pricing::{compute_pricing, to_minor_units};
use crate::slots::{SlotError, bookable_slot};
use crate::vendors::VendorService;

const CREATED_NOTE: &str = "Order created";
const PAYMENT_COMPLETED_NOTE: &str = "Payment completed";
const DEFAULT_CANCEL_REASON: &str = "Cancelled by customer";

/// Order-side settings taken from [`Config`](crate::core::Config)
#[derive(Debug, Clone)]
pub struct OrderConfig {
    pub currency: String,
    /// HMAC key for checkout signatures
    pub payment_secret: String,
    pub payment_timeout: Duration,
    /// Business calendar used to decide what "today" is
    pub tz: Tz,
}

/// Pickup details as submitted by the customer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PickupRequest {
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub time_slot: String,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub special_instructions: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub order_id: String,
    pub provider_payment_id: String,
    pub provider_order_id: String,
    pub provider_signature: String,
}

/// A newly created order plus the provider order the client pays against
#[derive(Debug, Clone, Serialize)]
pub struct PlacedOrder {
    pub order: Order,
    pub payment: Option<ProviderOrder>,
}

pub struct OrdersManager {
    storage: KitchenStorage,
    vendors: VendorService,
    gateway: SharedGateway,
    notifier: Dispatcher,
    config: OrderConfig,
}

impl std::fmt::Debug for OrdersManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrdersManager")
            .field("gateway", &self.gateway.name())
            .field("currency", &self.config.currency)
            .field("tz", &self.config.tz)
            .finish_non_exhaustive()
    }
}

impl OrdersManager {
    pub fn new(
        storage: KitchenStorage,
        vendors: VendorService,
        gateway: SharedGateway,
        notifier: Dispatcher,
        config: OrderConfig,
    ) -> Self {
        tracing::info!(gateway = gateway.name(), currency = %config.currency, "OrdersManager ready");
        Self {
            storage,
            vendors,
            gateway,
            notifier,
            config,
        }
    }

    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.config.tz).date_naive()
    }

    /// Turn the caller's cart into a pending order.
    pub async fn create_order(
        &self,
        user: &CurrentUser,
        pickup: PickupRequest,
        method: PaymentMethod,
    ) -> ManagerResult<PlacedOrder> {
        let cart = self
            .storage
            .get_cart(&user.id)?
            .filter(|c| !c.is_empty())
            .ok_or(ManagerError::CartEmpty)?;

        let time_slot = pickup.time_slot.trim().to_string();
        let date = match pickup.date {
            Some(date) if !time_slot.is_empty() => date,
            _ => return Err(ManagerError::MissingPickupDetails),
        };

        let vendor_id = cart.items[0].vendor_id.clone();
        if cart.items.iter().any(|e| e.vendor_id != vendor_id) {
            return Err(ManagerError::MixedVendorCart);
        }

        let settings = self.vendors.resolve(&vendor_id)?;
        if date < self.today() {
            return Err(ManagerError::Validation(format!(
                "Pickup date {date} is in the past"
            )));
        }
        let slot = bookable_slot(&settings, date, &time_slot)?.clone();

        let subtotal = cart.total_amount;
        if subtotal < settings.minimum_order_amount {
            return Err(ManagerError::BelowMinimumOrder {
                subtotal,
                minimum: settings.minimum_order_amount,
            });
        }
        let pricing = compute_pricing(subtotal, &settings)?;
        let amount_minor = to_minor_units(pricing.total)?;

        let booking_key = slot_key(&vendor_id, date, &time_slot);
        if self.storage.slot_bookings(&booking_key)? >= u64::from(slot.max_orders) {
            return Err(SlotError::SlotFull(time_slot).into());
        }

        let now = now_millis();
        let number = order_number(now);

        let provider_order = match method {
            PaymentMethod::Online => Some(
                self.create_provider_order(amount_minor, &number)
                    .await
                    .map_err(ManagerError::PaymentInitiation)?,
            ),
            PaymentMethod::Cash => None,
        };

        let order = Order {
            id: new_id(),
            order_number: number,
            user_id: user.id.clone(),
            vendor_id: vendor_id.clone(),
            items: cart
                .items
                .iter()
                .map(|e| OrderLine {
                    menu_item_id: e.menu_item_id.clone(),
                    name: e.name.clone(),
                    price: e.price,
                    quantity: e.quantity,
                    subtotal: e.subtotal,
                })
                .collect(),
            pricing,
            pickup_details: PickupDetails {
                date,
                time_slot: time_slot.clone(),
                customer_name: pickup
                    .customer_name
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| user.name.clone()),
                customer_phone: pickup
                    .customer_phone
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| user.phone.clone()),
                special_instructions: pickup.special_instructions,
            },
            payment_details: PaymentDetails {
                method,
                status: PaymentStatus::Pending,
                provider_order_id: provider_order.as_ref().map(|p| p.id.clone()),
                ..Default::default()
            },
            status: OrderStatus::Pending,
            status_history: vec![StatusEntry {
                status: OrderStatus::Pending,
                timestamp: now,
                note: CREATED_NOTE.to_string(),
            }],
            created_at: now,
            updated_at: now,
        };

        let txn = self.storage.begin_write()?;
        // Dropping the txn on SlotFull aborts it
        if !self
            .storage
            .acquire_slot(&txn, &booking_key, slot.max_orders)?
        {
            return Err(SlotError::SlotFull(time_slot).into());
        }
        self.storage.insert_order(&txn, &order)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            order_id = %order.id,
            order_number = %order.order_number,
            vendor_id = %vendor_id,
            total = %order.pricing.total,
            "Order created"
        );

        if let Err(e) = self.clear_cart(&user.id) {
            tracing::warn!(user_id = %user.id, error = %e, "Failed to clear cart after order");
        }

        Ok(PlacedOrder {
            order,
            payment: provider_order,
        })
    }

    async fn create_provider_order(
        &self,
        amount_minor: i64,
        receipt: &str,
    ) -> Result<ProviderOrder, PaymentError> {
        let call = self
            .gateway
            .create_order(amount_minor, &self.config.currency, receipt);
        tokio::time::timeout(self.config.payment_timeout, call)
            .await
            .map_err(|_| PaymentError::Timeout(self.config.payment_timeout.as_millis() as u64))?
    }

    fn clear_cart(&self, user_id: &str) -> ManagerResult<()> {
        let txn = self.storage.begin_write()?;
        if let Some(mut cart) = self.storage.get_cart_txn(&txn, user_id)? {
            cart.clear(now_millis());
            self.storage.put_cart(&txn, &cart)?;
        }
        txn.commit().map_err(StorageError::from)?;
        Ok(())
    }

    /// Reconcile a checkout result reported by the client.
    pub async fn verify_payment(
        &self,
        user: &CurrentUser,
        input: PaymentConfirmation,
    ) -> ManagerResult<Order> {
        let txn = self.storage.begin_write()?;
        let mut order = self
            .storage
            .get_order_txn(&txn, &input.order_id)?
            .ok_or_else(|| ManagerError::OrderNotFound(input.order_id.clone()))?;

        if order.user_id != user.id {
            return Err(ManagerError::NotOwner(order.id));
        }
        if order.payment_details.method != PaymentMethod::Online {
            return Err(ManagerError::PaymentInvalidMethod);
        }
        if order.payment_details.status == PaymentStatus::Completed {
            return if order.payment_details.provider_payment_id.as_deref()
                == Some(input.provider_payment_id.as_str())
            {
                Ok(order)
            } else {
                Err(ManagerError::PaymentAlreadyCompleted)
            };
        }
        if order.status != OrderStatus::Pending {
            return Err(ManagerError::InvalidTransition {
                from: order.status,
                to: OrderStatus::Confirmed,
            });
        }

        let expected_provider_order = order.payment_details.provider_order_id.as_deref();
        let valid = expected_provider_order == Some(input.provider_order_id.as_str())
            && verify_payment_signature(
                &self.config.payment_secret,
                &input.provider_order_id,
                &input.provider_payment_id,
                &input.provider_signature,
            );

        let now = now_millis();
        if !valid {
            order.payment_details.status = PaymentStatus::Failed;
            order.updated_at = now;
            self.storage.put_order(&txn, &order)?;
            txn.commit().map_err(StorageError::from)?;
            tracing::warn!(order_id = %order.id, "Payment signature mismatch");
            return Err(ManagerError::PaymentVerificationFailed);
        }

        order.payment_details.status = PaymentStatus::Completed;
        order.payment_details.provider_payment_id = Some(input.provider_payment_id);
        order.payment_details.provider_signature = Some(input.provider_signature);
        order.payment_details.paid_at = Some(now);
        order.push_status(OrderStatus::Confirmed, PAYMENT_COMPLETED_NOTE, now);
        self.storage.put_order(&txn, &order)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(order_id = %order.id, "Payment completed");
        self.notifier.order_confirmed(&order).await;
        Ok(order)
    }

    /// Vendor moves one of their orders along the state machine.
    pub async fn update_status(
        &self,
        vendor: &CurrentUser,
        order_id: &str,
        status: OrderStatus,
        note: Option<String>,
    ) -> ManagerResult<Order> {
        let txn = self.storage.begin_write()?;
        let mut order = self
            .storage
            .get_order_txn(&txn, order_id)?
            .ok_or_else(|| ManagerError::OrderNotFound(order_id.to_string()))?;

        if order.vendor_id != vendor.id {
            return Err(ManagerError::NotOwner(order.id));
        }
        if !order.status.can_transition_to(status) {
            return Err(ManagerError::InvalidTransition {
                from: order.status,
                to: status,
            });
        }

        let note = note
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("Status updated to {status}"));
        order.push_status(status, note, now_millis());
        if status == OrderStatus::Cancelled {
            self.release_booking(&txn, &order)?;
        }
        self.storage.put_order(&txn, &order)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(order_id = %order.id, status = %status, "Order status updated by vendor");
        self.notifier.status_changed(&order).await;
        Ok(order)
    }

    /// Customer cancels their own order before the kitchen starts on it.
    pub fn cancel_order(
        &self,
        user: &CurrentUser,
        order_id: &str,
        reason: Option<String>,
    ) -> ManagerResult<Order> {
        let txn = self.storage.begin_write()?;
        let mut order = self
            .storage
            .get_order_txn(&txn, order_id)?
            .ok_or_else(|| ManagerError::OrderNotFound(order_id.to_string()))?;

        if order.user_id != user.id {
            return Err(ManagerError::NotOwner(order.id));
        }
        if !order.status.is_customer_cancellable() {
            return Err(ManagerError::InvalidTransition {
                from: order.status,
                to: OrderStatus::Cancelled,
            });
        }

        let reason = reason
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CANCEL_REASON.to_string());
        order.push_status(OrderStatus::Cancelled, reason, now_millis());
        self.release_booking(&txn, &order)?;
        self.storage.put_order(&txn, &order)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(order_id = %order.id, "Order cancelled by customer");
        Ok(order)
    }

    fn release_booking(&self, txn: &redb::WriteTransaction, order: &Order) -> ManagerResult<()> {
        let key = slot_key(
            &order.vendor_id,
            order.pickup_details.date,
            &order.pickup_details.time_slot,
        );
        self.storage.release_slot(txn, &key)?;
        Ok(())
    }

    /// The caller's orders, newest first
    pub fn list_user_orders(&self, user: &CurrentUser) -> ManagerResult<Vec<Order>> {
        Ok(self.storage.list_user_orders(&user.id)?)
    }

    /// Order detail for its customer or its vendor
    pub fn get_order_for(&self, user: &CurrentUser, order_id: &str) -> ManagerResult<Order> {
        let order = self
            .storage
            .get_order(order_id)?
            .ok_or_else(|| ManagerError::OrderNotFound(order_id.to_string()))?;
        if order.user_id != user.id && order.vendor_id != user.id {
            return Err(ManagerError::NotOwner(order.id));
        }
        Ok(order)
    }
}

#[cfg(test)]
mod tests;
