//! Data models
//!
//! Shared between the server and API clients. Timestamps are UTC
//! milliseconds; money is `Decimal`, serialized as a JSON number.

pub mod cart;
pub mod menu_item;
pub mod order;
pub mod slot;
pub mod vendor;

// Re-exports
pub use cart::*;
pub use menu_item::*;
pub use order::*;
pub use slot::*;
pub use vendor::*;
