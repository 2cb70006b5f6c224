//! Menu items
//!
//! Public browsing shows available items only. Vendors manage their own
//! items; edits never reach existing cart or order lines, which hold their
//! own copies of name and price.

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{MAX_MENU_PRICE, MenuCategory, MenuItem, MenuItemCreate, MenuItemUpdate};
use shared::util::{new_id, now_millis};
use thiserror::Error;

use crate::db::{KitchenStorage, StorageError};

const DEFAULT_PREPARATION_MINUTES: u32 = 30;

#[derive(Debug, Error)]
pub enum MenuError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Menu item not found: {0}")]
    NotFound(String),

    #[error("Menu item {0} belongs to another vendor")]
    NotOwner(String),

    #[error("Price must be between 0 and {}", MAX_MENU_PRICE)]
    InvalidPrice,

    #[error("{0}")]
    Validation(String),
}

impl From<MenuError> for AppError {
    fn from(err: MenuError) -> Self {
        match err {
            MenuError::Storage(e) => e.into(),
            MenuError::NotFound(id) => {
                AppError::new(ErrorCode::MenuItemNotFound).with_detail("menu_item_id", id)
            }
            MenuError::NotOwner(id) => {
                AppError::new(ErrorCode::NotResourceOwner).with_detail("menu_item_id", id)
            }
            MenuError::InvalidPrice => AppError::new(ErrorCode::MenuItemInvalidPrice),
            MenuError::Validation(msg) => AppError::validation(msg),
        }
    }
}

pub type MenuResult<T> = Result<T, MenuError>;

fn validate_name(name: &str) -> MenuResult<()> {
    if name.trim().is_empty() {
        return Err(MenuError::Validation("name cannot be empty".into()));
    }
    Ok(())
}

fn validate_price(price: Decimal) -> MenuResult<()> {
    if price < Decimal::ZERO || price > Decimal::from(MAX_MENU_PRICE) {
        return Err(MenuError::InvalidPrice);
    }
    Ok(())
}

/// Newest first; ties broken by id so listings are stable
fn sort_newest_first(items: &mut [MenuItem]) {
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
}

#[derive(Debug, Clone)]
pub struct MenuService {
    storage: KitchenStorage,
}

impl MenuService {
    pub fn new(storage: KitchenStorage) -> Self {
        Self { storage }
    }

    /// Available items, optionally narrowed to one vendor and/or category
    pub fn list_available(
        &self,
        vendor_id: Option<&str>,
        category: Option<MenuCategory>,
    ) -> MenuResult<Vec<MenuItem>> {
        let mut items: Vec<MenuItem> = self
            .storage
            .list_menu_items()?
            .into_iter()
            .filter(|item| item.is_available)
            .filter(|item| vendor_id.is_none_or(|v| item.vendor_id == v))
            .filter(|item| category.is_none_or(|c| item.category == c))
            .collect();
        sort_newest_first(&mut items);
        Ok(items)
    }

    pub fn get(&self, id: &str) -> MenuResult<MenuItem> {
        self.storage
            .get_menu_item(id)?
            .ok_or_else(|| MenuError::NotFound(id.to_string()))
    }

    /// Everything a vendor owns, including unavailable items
    pub fn list_vendor_items(&self, vendor_id: &str) -> MenuResult<Vec<MenuItem>> {
        let mut items: Vec<MenuItem> = self
            .storage
            .list_menu_items()?
            .into_iter()
            .filter(|item| item.vendor_id == vendor_id)
            .collect();
        sort_newest_first(&mut items);
        Ok(items)
    }

    pub fn create(&self, vendor_id: &str, data: MenuItemCreate) -> MenuResult<MenuItem> {
        validate_name(&data.name)?;
        validate_price(data.price)?;

        let now = now_millis();
        let item = MenuItem {
            id: new_id(),
            vendor_id: vendor_id.to_string(),
            name: data.name,
            description: data.description,
            price: data.price,
            category: data.category,
            is_available: data.is_available.unwrap_or(true),
            images: data.images.unwrap_or_default(),
            dietary_info: data.dietary_info.unwrap_or_default(),
            preparation_time: data.preparation_time.unwrap_or(DEFAULT_PREPARATION_MINUTES),
            created_at: now,
            updated_at: now,
        };

        let txn = self.storage.begin_write()?;
        self.storage.put_menu_item(&txn, &item)?;
        txn.commit().map_err(StorageError::from)?;
        tracing::info!(vendor_id = %vendor_id, menu_item_id = %item.id, "Menu item created");
        Ok(item)
    }

    pub fn update(&self, vendor_id: &str, id: &str, data: MenuItemUpdate) -> MenuResult<MenuItem> {
        if let Some(name) = &data.name {
            validate_name(name)?;
        }
        if let Some(price) = data.price {
            validate_price(price)?;
        }

        let txn = self.storage.begin_write()?;
        let mut item = self
            .storage
            .get_menu_item_txn(&txn, id)?
            .ok_or_else(|| MenuError::NotFound(id.to_string()))?;
        if item.vendor_id != vendor_id {
            return Err(MenuError::NotOwner(id.to_string()));
        }

        if let Some(v) = data.name {
            item.name = v;
        }
        if let Some(v) = data.description {
            item.description = v;
        }
        if let Some(v) = data.price {
            item.price = v;
        }
        if let Some(v) = data.category {
            item.category = v;
        }
        if let Some(v) = data.is_available {
            item.is_available = v;
        }
        if let Some(v) = data.images {
            item.images = v;
        }
        if let Some(v) = data.dietary_info {
            item.dietary_info = v;
        }
        if let Some(v) = data.preparation_time {
            item.preparation_time = v;
        }
        item.updated_at = now_millis();

        self.storage.put_menu_item(&txn, &item)?;
        txn.commit().map_err(StorageError::from)?;
        Ok(item)
    }

    pub fn delete(&self, vendor_id: &str, id: &str) -> MenuResult<()> {
        let txn = self.storage.begin_write()?;
        let item = self
            .storage
            .get_menu_item_txn(&txn, id)?
            .ok_or_else(|| MenuError::NotFound(id.to_string()))?;
        if item.vendor_id != vendor_id {
            return Err(MenuError::NotOwner(id.to_string()));
        }
        self.storage.remove_menu_item(&txn, id)?;
        txn.commit().map_err(StorageError::from)?;
        tracing::info!(vendor_id = %vendor_id, menu_item_id = %id, "Menu item deleted");
        Ok(())
    }
}
