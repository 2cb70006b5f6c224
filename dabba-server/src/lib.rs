//! Dabba Server - pickup ordering for home kitchens
//!
//! Customers browse vendor menus, fill a cart, book a pickup slot and pay
//! online or in cash at pickup. Vendors configure hours and slots, manage
//! their menu and move orders through the kitchen queue.
//!
//! # Module layout
//!
//! ```text
//! dabba-server/src/
//! ├── core/       # config, state, errors, HTTP server
//! ├── auth/       # JWT principal, route guards
//! ├── api/        # HTTP routes and handlers
//! ├── db/         # redb storage
//! ├── menu/       # menu catalogue
//! ├── cart/       # per-user cart
//! ├── vendors/    # vendor settings, dashboard
//! ├── slots/      # pickup slot availability
//! ├── pricing/    # order totals
//! ├── payment/    # payment gateway adapter
//! ├── notify/     # customer notifications
//! ├── orders/     # order lifecycle
//! └── utils/      # logging
//! ```

pub mod api;
pub mod auth;
pub mod cart;
pub mod core;
pub mod db;
pub mod menu;
pub mod notify;
pub mod orders;
pub mod payment;
pub mod pricing;
pub mod slots;
pub mod utils;
pub mod vendors;

pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerError, ServerState};
pub use db::KitchenStorage;
pub use orders::OrdersManager;
pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - accepts tracing field syntax
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}
