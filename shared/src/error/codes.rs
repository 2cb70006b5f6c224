//! Unified error codes for Dabba
//!
//! This module defines all error codes shared by the server and its clients.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Vendor / pickup slot errors
//! - 4xxx: Order and cart errors
//! - 5xxx: Payment errors
//! - 6xxx: Menu errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Vendor role required
    VendorRequired = 2002,
    /// Caller does not own the resource
    NotResourceOwner = 2003,

    // ==================== 3xxx: Vendor ====================
    /// Vendor not found
    VendorNotFound = 3001,
    /// Vendor closed (not accepting orders, closed weekday or holiday)
    VendorClosed = 3002,
    /// Pickup slot not configured by the vendor
    SlotNotFound = 3101,
    /// Pickup slot has no remaining capacity
    SlotFull = 3102,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Requested status transition is not allowed
    InvalidTransition = 4002,
    /// Pickup details missing
    MissingPickupDetails = 4003,
    /// Cart is empty
    CartEmpty = 4004,
    /// Cart not found
    CartNotFound = 4005,
    /// Item not in cart
    ItemNotInCart = 4006,
    /// Cart mixes items from more than one vendor
    MixedVendorCart = 4007,
    /// Subtotal below the vendor's minimum order amount
    BelowMinimumOrder = 4008,

    // ==================== 5xxx: Payment ====================
    /// Provider order could not be created
    PaymentInitiationFailed = 5001,
    /// Provider signature did not match
    PaymentVerificationFailed = 5002,
    /// Order was not placed with online payment
    PaymentInvalidMethod = 5003,
    /// Payment already confirmed with another payment id
    PaymentAlreadyCompleted = 5004,
    /// Payment provider request failed
    PaymentProviderError = 5005,

    // ==================== 6xxx: Menu ====================
    /// Menu item not found
    MenuItemNotFound = 6001,
    /// Menu item has invalid price
    MenuItemInvalidPrice = 6002,
    /// Menu item is not available
    MenuItemUnavailable = 6003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// Notification delivery failed
    NotificationFailed = 9101,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the default message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Success",
            ErrorCode::Unknown => "Unknown error",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field missing",
            ErrorCode::ValueOutOfRange => "Value out of range",

            // Auth
            ErrorCode::NotAuthenticated => "Authentication required",
            ErrorCode::TokenExpired => "Token has expired",
            ErrorCode::TokenInvalid => "Invalid token",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::VendorRequired => "Vendor role required",
            ErrorCode::NotResourceOwner => "Not authorized to access this resource",

            // Vendor
            ErrorCode::VendorNotFound => "Vendor not found",
            ErrorCode::VendorClosed => "Vendor is not accepting orders for this date",
            ErrorCode::SlotNotFound => "Pickup slot not found",
            ErrorCode::SlotFull => "Pickup slot is fully booked",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::InvalidTransition => "Order status transition not allowed",
            ErrorCode::MissingPickupDetails => "Pickup details are required",
            ErrorCode::CartEmpty => "Cart is empty",
            ErrorCode::CartNotFound => "Cart not found",
            ErrorCode::ItemNotInCart => "Item not found in cart",
            ErrorCode::MixedVendorCart => "Cart contains items from more than one vendor",
            ErrorCode::BelowMinimumOrder => "Order is below the minimum order amount",

            // Payment
            ErrorCode::PaymentInitiationFailed => "Error creating payment order",
            ErrorCode::PaymentVerificationFailed => "Payment verification failed",
            ErrorCode::PaymentInvalidMethod => "Invalid payment method for this operation",
            ErrorCode::PaymentAlreadyCompleted => "Payment already completed",
            ErrorCode::PaymentProviderError => "Payment provider error",

            // Menu
            ErrorCode::MenuItemNotFound => "Menu item not found",
            ErrorCode::MenuItemInvalidPrice => "Menu item has invalid price",
            ErrorCode::MenuItemUnavailable => "Menu item is not available",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::NotificationFailed => "Notification delivery failed",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::VendorRequired),
            2003 => Ok(ErrorCode::NotResourceOwner),

            // Vendor
            3001 => Ok(ErrorCode::VendorNotFound),
            3002 => Ok(ErrorCode::VendorClosed),
            3101 => Ok(ErrorCode::SlotNotFound),
            3102 => Ok(ErrorCode::SlotFull),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::InvalidTransition),
            4003 => Ok(ErrorCode::MissingPickupDetails),
            4004 => Ok(ErrorCode::CartEmpty),
            4005 => Ok(ErrorCode::CartNotFound),
            4006 => Ok(ErrorCode::ItemNotInCart),
            4007 => Ok(ErrorCode::MixedVendorCart),
            4008 => Ok(ErrorCode::BelowMinimumOrder),

            // Payment
            5001 => Ok(ErrorCode::PaymentInitiationFailed),
            5002 => Ok(ErrorCode::PaymentVerificationFailed),
            5003 => Ok(ErrorCode::PaymentInvalidMethod),
            5004 => Ok(ErrorCode::PaymentAlreadyCompleted),
            5005 => Ok(ErrorCode::PaymentProviderError),

            // Menu
            6001 => Ok(ErrorCode::MenuItemNotFound),
            6002 => Ok(ErrorCode::MenuItemInvalidPrice),
            6003 => Ok(ErrorCode::MenuItemUnavailable),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9101 => Ok(ErrorCode::NotificationFailed),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
