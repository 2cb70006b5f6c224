//! Order lifecycle
//!
//! - **manager**: [`OrdersManager`] converts carts into orders and drives
//!   status transitions and payment reconciliation
//!
//! # State Machine
//!
//! ```text
//! pending → confirmed → preparing → ready → completed
//!    └──────────┴───────────┴──→ cancelled
//! ```

pub mod manager;

pub use manager::{
    ManagerError, ManagerResult, OrderConfig, OrdersManager, PaymentConfirmation, PickupRequest,
    PlacedOrder,
};
