//! Persistence layer
//!
//! - [`KitchenStorage`] - embedded redb store for menus, carts, settings and orders

pub mod storage;

pub use storage::{KitchenStorage, StorageError, StorageResult, slot_key};
