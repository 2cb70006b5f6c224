use crate::db::StorageError;
use crate::payment::PaymentError;
use crate::pricing::PricingError;
use crate::slots::SlotError;
use crate::vendors::VendorError;
use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::OrderStatus;
use thiserror::Error;

/// Manager errors
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Vendor(#[from] VendorError),

    #[error(transparent)]
    Slot(#[from] SlotError),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error("Cart is empty")]
    CartEmpty,

    #[error("Pickup time slot is required")]
    MissingPickupDetails,

    #[error("Cart contains items from more than one vendor")]
    MixedVendorCart,

    #[error("{0}")]
    Validation(String),

    #[error("Minimum order amount is {minimum}, cart subtotal is {subtotal}")]
    BelowMinimumOrder { subtotal: Decimal, minimum: Decimal },

    #[error("Error creating payment order: {0}")]
    PaymentInitiation(PaymentError),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Order {0} belongs to someone else")]
    NotOwner(String),

    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Order is not paid online")]
    PaymentInvalidMethod,

    #[error("Payment already completed with another payment id")]
    PaymentAlreadyCompleted,

    #[error("Payment verification failed")]
    PaymentVerificationFailed,
}

impl From<ManagerError> for AppError {
    fn from(err: ManagerError) -> Self {
        let message = err.to_string();
        match err {
            ManagerError::Storage(e) => e.into(),
            ManagerError::Vendor(e) => e.into(),
            ManagerError::Slot(e) => e.into(),
            ManagerError::Pricing(e) => e.into(),
            ManagerError::CartEmpty => AppError::new(ErrorCode::CartEmpty),
            ManagerError::MissingPickupDetails => {
                AppError::with_message(ErrorCode::MissingPickupDetails, message)
            }
            ManagerError::MixedVendorCart => AppError::with_message(ErrorCode::MixedVendorCart, message),
            ManagerError::Validation(msg) => AppError::validation(msg),
            ManagerError::BelowMinimumOrder { subtotal, minimum } => {
                AppError::with_message(ErrorCode::BelowMinimumOrder, message)
                    .with_detail("subtotal", subtotal.to_string())
                    .with_detail("minimum_order_amount", minimum.to_string())
            }
            ManagerError::PaymentInitiation(PaymentError::Timeout(ms)) => {
                AppError::timeout(format!("Payment provider timed out after {ms}ms"))
            }
            ManagerError::PaymentInitiation(e) => {
                tracing::error!(error = %e, "Payment initiation failed");
                AppError::new(ErrorCode::PaymentInitiationFailed)
            }
            ManagerError::OrderNotFound(id) => {
                AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", id)
            }
            ManagerError::NotOwner(id) => {
                AppError::new(ErrorCode::NotResourceOwner).with_detail("order_id", id)
            }
            ManagerError::InvalidTransition { from, to } => {
                AppError::with_message(ErrorCode::InvalidTransition, message)
                    .with_detail("from", from.as_str())
                    .with_detail("to", to.as_str())
            }
            ManagerError::PaymentInvalidMethod => AppError::new(ErrorCode::PaymentInvalidMethod),
            ManagerError::PaymentAlreadyCompleted => {
                AppError::new(ErrorCode::PaymentAlreadyCompleted)
            }
            ManagerError::PaymentVerificationFailed => {
                AppError::new(ErrorCode::PaymentVerificationFailed)
            }
        }
    }
}

pub type ManagerResult<T> = Result<T, ManagerError>;
