//! redb-based storage layer
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `menu_items` | `item_id` | `MenuItem` | Vendor menus |
//! | `carts` | `user_id` | `Cart` | One live cart per user |
//! | `vendor_settings` | `vendor_id` | `VendorSettings` | Pricing, slots, hours |
//! | `orders` | `order_id` | `Order` | Order snapshots (never deleted) |
//! | `user_orders` | `(user_id, sequence)` | `order_id` | Customer history index |
//! | `vendor_orders` | `(vendor_id, sequence)` | `order_id` | Vendor queue index |
//! | `slot_bookings` | `vendor\|date\|slot` | `u64` | Live bookings per pickup window |
//! | `sequence_counter` | `"seq"` | `u64` | Global order sequence |
//!
//! Values are JSON-serialized. redb serializes write transactions, so any
//! read-modify-write done inside one `WriteTransaction` is atomic.

use chrono::NaiveDate;
use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
    WriteTransaction,
};
use shared::models::{Cart, MenuItem, Order, VendorSettings};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

const MENU_ITEMS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("menu_items");

const CARTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("carts");

const VENDOR_SETTINGS_TABLE: TableDefinition<&str, &[u8]> =
    TableDefinition::new("vendor_settings");

const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// Secondary index: key = (owner_id, sequence), value = order_id
type OrderIndex = TableDefinition<'static, (&'static str, u64), &'static str>;

const USER_ORDERS_TABLE: OrderIndex = TableDefinition::new("user_orders");

const VENDOR_ORDERS_TABLE: OrderIndex = TableDefinition::new("vendor_orders");

/// key = slot key (see [`slot_key`]), value = live booking count
const SLOT_BOOKINGS_TABLE: TableDefinition<&str, u64> = TableDefinition::new("slot_bookings");

const SEQUENCE_TABLE: TableDefinition<&str, u64> = TableDefinition::new("sequence_counter");

const SEQUENCE_KEY: &str = "seq";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for shared::error::AppError {
    fn from(err: StorageError) -> Self {
        tracing::error!(error = %err, "Storage error occurred");
        shared::error::AppError::database(err.to_string())
    }
}

/// Capacity counter key for one pickup window on one date
pub fn slot_key(vendor_id: &str, date: NaiveDate, time_slot: &str) -> String {
    format!("{}|{}|{}", vendor_id, date.format("%Y-%m-%d"), time_slot)
}

/// Kitchen storage backed by redb
#[derive(Clone)]
pub struct KitchenStorage {
    db: Arc<Database>,
}

impl std::fmt::Debug for KitchenStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KitchenStorage").finish_non_exhaustive()
    }
}

impl KitchenStorage {
    /// Open or create the database at the given path
    ///
    /// Commits are durable as soon as `commit()` returns.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            // Create all tables if they don't exist
            let _ = write_txn.open_table(MENU_ITEMS_TABLE)?;
            let _ = write_txn.open_table(CARTS_TABLE)?;
            let _ = write_txn.open_table(VENDOR_SETTINGS_TABLE)?;
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(USER_ORDERS_TABLE)?;
            let _ = write_txn.open_table(VENDOR_ORDERS_TABLE)?;
            let _ = write_txn.open_table(SLOT_BOOKINGS_TABLE)?;

            let mut seq_table = write_txn.open_table(SEQUENCE_TABLE)?;
            if seq_table.get(SEQUENCE_KEY)?.is_none() {
                seq_table.insert(SEQUENCE_KEY, 0u64)?;
            }
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Menu Items ==========

    pub fn put_menu_item(&self, txn: &WriteTransaction, item: &MenuItem) -> StorageResult<()> {
        let mut table = txn.open_table(MENU_ITEMS_TABLE)?;
        let value = serde_json::to_vec(item)?;
        table.insert(item.id.as_str(), value.as_slice())?;
        Ok(())
    }

    pub fn get_menu_item(&self, id: &str) -> StorageResult<Option<MenuItem>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(MENU_ITEMS_TABLE)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn get_menu_item_txn(
        &self,
        txn: &WriteTransaction,
        id: &str,
    ) -> StorageResult<Option<MenuItem>> {
        let table = txn.open_table(MENU_ITEMS_TABLE)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Remove a menu item, returning whether it existed
    pub fn remove_menu_item(&self, txn: &WriteTransaction, id: &str) -> StorageResult<bool> {
        let mut table = txn.open_table(MENU_ITEMS_TABLE)?;
        Ok(table.remove(id)?.is_some())
    }

    /// All menu items, unordered
    pub fn list_menu_items(&self) -> StorageResult<Vec<MenuItem>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(MENU_ITEMS_TABLE)?;

        let mut items = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            items.push(serde_json::from_slice(value.value())?);
        }
        Ok(items)
    }

    // ========== Carts ==========

    pub fn get_cart(&self, user_id: &str) -> StorageResult<Option<Cart>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CARTS_TABLE)?;
        match table.get(user_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn get_cart_txn(&self, txn: &WriteTransaction, user_id: &str) -> StorageResult<Option<Cart>> {
        let table = txn.open_table(CARTS_TABLE)?;
        match table.get(user_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn put_cart(&self, txn: &WriteTransaction, cart: &Cart) -> StorageResult<()> {
        let mut table = txn.open_table(CARTS_TABLE)?;
        let value = serde_json::to_vec(cart)?;
        table.insert(cart.user_id.as_str(), value.as_slice())?;
        Ok(())
    }

    // ========== Vendor Settings ==========

    pub fn get_vendor_settings(&self, vendor_id: &str) -> StorageResult<Option<VendorSettings>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(VENDOR_SETTINGS_TABLE)?;
        match table.get(vendor_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn get_vendor_settings_txn(
        &self,
        txn: &WriteTransaction,
        vendor_id: &str,
    ) -> StorageResult<Option<VendorSettings>> {
        let table = txn.open_table(VENDOR_SETTINGS_TABLE)?;
        match table.get(vendor_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn put_vendor_settings(
        &self,
        txn: &WriteTransaction,
        settings: &VendorSettings,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(VENDOR_SETTINGS_TABLE)?;
        let value = serde_json::to_vec(settings)?;
        table.insert(settings.vendor_id.as_str(), value.as_slice())?;
        Ok(())
    }

    // ========== Orders ==========

    /// Insert a new order and index it under its customer and vendor
    pub fn insert_order(&self, txn: &WriteTransaction, order: &Order) -> StorageResult<u64> {
        let sequence = self.increment_sequence(txn)?;
        self.put_order(txn, order)?;

        let mut user_index = txn.open_table(USER_ORDERS_TABLE)?;
        user_index.insert((order.user_id.as_str(), sequence), order.id.as_str())?;

        let mut vendor_index = txn.open_table(VENDOR_ORDERS_TABLE)?;
        vendor_index.insert((order.vendor_id.as_str(), sequence), order.id.as_str())?;

        Ok(sequence)
    }

    /// Overwrite an existing order snapshot
    pub fn put_order(&self, txn: &WriteTransaction, order: &Order) -> StorageResult<()> {
        let mut table = txn.open_table(ORDERS_TABLE)?;
        let value = serde_json::to_vec(order)?;
        table.insert(order.id.as_str(), value.as_slice())?;
        Ok(())
    }

    pub fn get_order(&self, order_id: &str) -> StorageResult<Option<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn get_order_txn(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
    ) -> StorageResult<Option<Order>> {
        let table = txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Orders placed by a customer, newest first
    pub fn list_user_orders(&self, user_id: &str) -> StorageResult<Vec<Order>> {
        self.list_indexed_orders(USER_ORDERS_TABLE, user_id)
    }

    /// Orders received by a vendor, newest first
    pub fn list_vendor_orders(&self, vendor_id: &str) -> StorageResult<Vec<Order>> {
        self.list_indexed_orders(VENDOR_ORDERS_TABLE, vendor_id)
    }

    fn list_indexed_orders(
        &self,
        index: OrderIndex,
        owner_id: &str,
    ) -> StorageResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let index_table = read_txn.open_table(index)?;
        let orders_table = read_txn.open_table(ORDERS_TABLE)?;

        let mut orders = Vec::new();
        for result in index_table
            .range((owner_id, 0u64)..=(owner_id, u64::MAX))?
            .rev()
        {
            let (_key, order_id) = result?;
            if let Some(value) = orders_table.get(order_id.value())? {
                orders.push(serde_json::from_slice(value.value())?);
            }
        }
        Ok(orders)
    }

    /// Total number of stored orders
    pub fn order_count(&self) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        Ok(table.len()?)
    }

    // ========== Slot Bookings ==========

    /// Take one booking in a pickup window unless it already holds `max_orders`.
    ///
    /// Returns `false` (and writes nothing) when the window is full.
    pub fn acquire_slot(
        &self,
        txn: &WriteTransaction,
        key: &str,
        max_orders: u32,
    ) -> StorageResult<bool> {
        let mut table = txn.open_table(SLOT_BOOKINGS_TABLE)?;
        let current = table.get(key)?.map(|g| g.value()).unwrap_or(0);
        if current >= u64::from(max_orders) {
            return Ok(false);
        }
        table.insert(key, current + 1)?;
        Ok(true)
    }

    /// Give back one booking; never goes below zero
    pub fn release_slot(&self, txn: &WriteTransaction, key: &str) -> StorageResult<()> {
        let mut table = txn.open_table(SLOT_BOOKINGS_TABLE)?;
        let current = table.get(key)?.map(|g| g.value()).unwrap_or(0);
        table.insert(key, current.saturating_sub(1))?;
        Ok(())
    }

    pub fn slot_bookings(&self, key: &str) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SLOT_BOOKINGS_TABLE)?;
        Ok(table.get(key)?.map(|g| g.value()).unwrap_or(0))
    }

    // ========== Sequence ==========

    fn increment_sequence(&self, txn: &WriteTransaction) -> StorageResult<u64> {
        let mut table = txn.open_table(SEQUENCE_TABLE)?;
        let current = table
            .get(SEQUENCE_KEY)?
            .map(|guard| guard.value())
            .unwrap_or(0);
        let next = current + 1;
        table.insert(SEQUENCE_KEY, next)?;
        Ok(next)
    }
}
