//! Pricing
//!
//! Pure price computation applied when a cart becomes an order.

mod calculator;

pub use calculator::*;
