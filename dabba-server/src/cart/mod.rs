//! Per-user cart store
//!
//! Every mutation is one redb write transaction: read the cart, change it,
//! recompute totals and write it back.

use shared::error::{AppError, ErrorCode};
use shared::models::{AmountOverflow, Cart, CartEntry, MAX_LINE_QUANTITY};
use shared::util::now_millis;
use thiserror::Error;

use crate::db::{KitchenStorage, StorageError};

#[derive(Debug, Error)]
pub enum CartError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Menu item not found: {0}")]
    MenuItemNotFound(String),

    #[error("Menu item is not available: {0}")]
    MenuItemUnavailable(String),

    #[error("Quantity must be between 1 and {max}, got {0}", max = MAX_LINE_QUANTITY)]
    InvalidQuantity(i64),

    #[error(transparent)]
    AmountOverflow(#[from] AmountOverflow),

    #[error("Cart not found for user {0}")]
    CartNotFound(String),

    #[error("Item not found in cart: {0}")]
    ItemNotInCart(String),
}

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        let message = err.to_string();
        match err {
            CartError::Storage(e) => e.into(),
            CartError::MenuItemNotFound(id) => {
                AppError::new(ErrorCode::MenuItemNotFound).with_detail("menu_item_id", id)
            }
            CartError::MenuItemUnavailable(id) => {
                AppError::new(ErrorCode::MenuItemUnavailable).with_detail("menu_item_id", id)
            }
            CartError::InvalidQuantity(q) => {
                AppError::with_message(ErrorCode::ValueOutOfRange, message)
                    .with_detail("quantity", q)
            }
            CartError::AmountOverflow(_) => AppError::with_message(ErrorCode::ValueOutOfRange, message),
            CartError::CartNotFound(_) => AppError::new(ErrorCode::CartNotFound),
            CartError::ItemNotInCart(id) => {
                AppError::new(ErrorCode::ItemNotInCart).with_detail("menu_item_id", id)
            }
        }
    }
}

pub type CartResult<T> = Result<T, CartError>;

/// A line quantity in `1..=MAX_LINE_QUANTITY`
fn line_quantity(quantity: i64) -> CartResult<u32> {
    u32::try_from(quantity)
        .ok()
        .filter(|q| (1..=MAX_LINE_QUANTITY).contains(q))
        .ok_or(CartError::InvalidQuantity(quantity))
}

#[derive(Debug, Clone)]
pub struct CartService {
    storage: KitchenStorage,
}

impl CartService {
    pub fn new(storage: KitchenStorage) -> Self {
        Self { storage }
    }

    /// The user's cart, creating an empty one on first access
    pub fn get(&self, user_id: &str) -> CartResult<Cart> {
        if let Some(cart) = self.storage.get_cart(user_id)? {
            return Ok(cart);
        }
        let txn = self.storage.begin_write()?;
        // Re-check inside the write txn; another request may have created it
        let cart = match self.storage.get_cart_txn(&txn, user_id)? {
            Some(cart) => cart,
            None => {
                let cart = Cart::empty(user_id, now_millis());
                self.storage.put_cart(&txn, &cart)?;
                cart
            }
        };
        txn.commit().map_err(StorageError::from)?;
        Ok(cart)
    }

    pub fn add(&self, user_id: &str, menu_item_id: &str, quantity: i64) -> CartResult<Cart> {
        let quantity = line_quantity(quantity)?;

        let txn = self.storage.begin_write()?;
        let item = self
            .storage
            .get_menu_item_txn(&txn, menu_item_id)?
            .ok_or_else(|| CartError::MenuItemNotFound(menu_item_id.to_string()))?;
        if !item.is_available {
            return Err(CartError::MenuItemUnavailable(menu_item_id.to_string()));
        }

        let now = now_millis();
        let mut cart = self
            .storage
            .get_cart_txn(&txn, user_id)?
            .unwrap_or_else(|| Cart::empty(user_id, now));

        match cart.entry_mut(menu_item_id) {
            Some(entry) => {
                let total = line_quantity(i64::from(entry.quantity) + i64::from(quantity))?;
                entry.set_quantity(total)?;
            }
            None => {
                let mut entry = CartEntry {
                    menu_item_id: item.id.clone(),
                    vendor_id: item.vendor_id.clone(),
                    name: item.name.clone(),
                    price: item.price,
                    image: item.thumbnail(),
                    quantity: 0,
                    subtotal: Default::default(),
                };
                entry.set_quantity(quantity)?;
                cart.items.push(entry);
            }
        }
        cart.recalculate(now)?;

        self.storage.put_cart(&txn, &cart)?;
        txn.commit().map_err(StorageError::from)?;
        tracing::debug!(user_id = %user_id, menu_item_id = %menu_item_id, quantity, "Added to cart");
        Ok(cart)
    }

    /// Set a line's quantity; zero or less removes the line
    pub fn update_quantity(
        &self,
        user_id: &str,
        menu_item_id: &str,
        quantity: i64,
    ) -> CartResult<Cart> {
        let txn = self.storage.begin_write()?;
        let mut cart = self
            .storage
            .get_cart_txn(&txn, user_id)?
            .ok_or_else(|| CartError::CartNotFound(user_id.to_string()))?;

        let position = cart
            .items
            .iter()
            .position(|e| e.menu_item_id == menu_item_id)
            .ok_or_else(|| CartError::ItemNotInCart(menu_item_id.to_string()))?;

        if quantity <= 0 {
            cart.items.remove(position);
        } else {
            cart.items[position].set_quantity(line_quantity(quantity)?)?;
        }
        cart.recalculate(now_millis())?;

        self.storage.put_cart(&txn, &cart)?;
        txn.commit().map_err(StorageError::from)?;
        Ok(cart)
    }

    /// Remove a line; removing an absent item leaves the cart unchanged
    pub fn remove(&self, user_id: &str, menu_item_id: &str) -> CartResult<Cart> {
        let txn = self.storage.begin_write()?;
        let mut cart = self
            .storage
            .get_cart_txn(&txn, user_id)?
            .ok_or_else(|| CartError::CartNotFound(user_id.to_string()))?;

        let before = cart.items.len();
        cart.items.retain(|e| e.menu_item_id != menu_item_id);
        if cart.items.len() == before {
            return Ok(cart);
        }
        cart.recalculate(now_millis())?;

        self.storage.put_cart(&txn, &cart)?;
        txn.commit().map_err(StorageError::from)?;
        Ok(cart)
    }

    pub fn clear(&self, user_id: &str) -> CartResult<Cart> {
        let txn = self.storage.begin_write()?;
        let mut cart = self
            .storage
            .get_cart_txn(&txn, user_id)?
            .ok_or_else(|| CartError::CartNotFound(user_id.to_string()))?;
        cart.clear(now_millis());
        self.storage.put_cart(&txn, &cart)?;
        txn.commit().map_err(StorageError::from)?;
        Ok(cart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::models::{MenuCategory, MenuItem};

    fn menu_item(id: &str, price: i64, available: bool) -> MenuItem {
        MenuItem {
            id: id.to_string(),
            vendor_id: "v-1".to_string(),
            name: format!("Item {id}"),
            description: String::new(),
            price: Decimal::from(price),
            category: MenuCategory::Snacks,
            is_available: available,
            images: vec![format!("https://img.example/{id}.jpg")],
            dietary_info: Default::default(),
            preparation_time: 10,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn service() -> (KitchenStorage, CartService) {
        let storage = KitchenStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        storage.put_menu_item(&txn, &menu_item("samosa", 10, true)).unwrap();
        storage.put_menu_item(&txn, &menu_item("chai", 5, true)).unwrap();
        storage.put_menu_item(&txn, &menu_item("kheer", 60, false)).unwrap();
        txn.commit().unwrap();
        (storage.clone(), CartService::new(storage))
    }

    fn assert_totals(cart: &Cart) {
        for e in &cart.items {
            assert_eq!(e.subtotal, e.price * Decimal::from(e.quantity));
        }
        let sum: Decimal = cart.items.iter().map(|e| e.subtotal).sum();
        assert_eq!(cart.total_amount, sum);
    }

    #[test]
    fn test_get_creates_empty_cart() {
        let (storage, svc) = service();
        let cart = svc.get("u-1").unwrap();
        assert!(cart.is_empty());
        assert!(storage.get_cart("u-1").unwrap().is_some());
    }

    #[test]
    fn test_add_accumulates_quantity() {
        let (_storage, svc) = service();
        svc.add("u-1", "samosa", 1).unwrap();
        let cart = svc.add("u-1", "samosa", 1).unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 2);
        assert_eq!(cart.items[0].image, "https://img.example/samosa.jpg");
        assert_totals(&cart);

        let cart = svc.add("u-1", "chai", 1).unwrap();
        assert_eq!(cart.total_amount, Decimal::from(25));
        assert_totals(&cart);
    }

    #[test]
    fn test_add_rejections() {
        let (_storage, svc) = service();
        assert!(matches!(
            svc.add("u-1", "missing", 1),
            Err(CartError::MenuItemNotFound(_))
        ));
        assert!(matches!(
            svc.add("u-1", "kheer", 1),
            Err(CartError::MenuItemUnavailable(_))
        ));
        assert!(matches!(
            svc.add("u-1", "samosa", 0),
            Err(CartError::InvalidQuantity(0))
        ));
        assert!(matches!(
            svc.add("u-1", "samosa", -3),
            Err(CartError::InvalidQuantity(-3))
        ));
    }

    #[test]
    fn test_update_to_zero_removes_line() {
        let (_storage, svc) = service();
        svc.add("u-1", "samosa", 2).unwrap();
        svc.add("u-1", "chai", 1).unwrap();

        let cart = svc.update_quantity("u-1", "chai", 4).unwrap();
        assert_eq!(cart.total_amount, Decimal::from(40));
        assert_totals(&cart);

        let cart = svc.update_quantity("u-1", "samosa", 0).unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_totals(&cart);

        assert!(matches!(
            svc.update_quantity("u-1", "samosa", 1),
            Err(CartError::ItemNotInCart(_))
        ));
    }

    #[test]
    fn test_update_without_cart() {
        let (_storage, svc) = service();
        assert!(matches!(
            svc.update_quantity("nobody", "samosa", 1),
            Err(CartError::CartNotFound(_))
        ));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (_storage, svc) = service();
        svc.add("u-1", "samosa", 2).unwrap();
        let cart = svc.remove("u-1", "chai").unwrap();
        assert_eq!(cart.items.len(), 1);
        let cart = svc.remove("u-1", "samosa").unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.total_amount, Decimal::ZERO);
        assert!(matches!(
            svc.remove("nobody", "samosa"),
            Err(CartError::CartNotFound(_))
        ));
    }

    #[test]
    fn test_clear_keeps_row() {
        let (storage, svc) = service();
        svc.add("u-1", "samosa", 2).unwrap();
        let cart = svc.clear("u-1").unwrap();
        assert!(cart.is_empty());
        let stored = storage.get_cart("u-1").unwrap().unwrap();
        assert!(stored.is_empty());
    }

    #[test]
    fn test_line_keeps_price_when_menu_changes() {
        let (storage, svc) = service();
        svc.add("u-1", "samosa", 1).unwrap();

        let txn = storage.begin_write().unwrap();
        storage.put_menu_item(&txn, &menu_item("samosa", 99, true)).unwrap();
        txn.commit().unwrap();

        let cart = svc.add("u-1", "samosa", 1).unwrap();
        assert_eq!(cart.items[0].price, Decimal::from(10));
        assert_eq!(cart.total_amount, Decimal::from(20));
    }

    #[test]
    fn test_line_quantity_ceiling() {
        let (_storage, svc) = service();
        assert!(matches!(
            svc.add("u-1", "samosa", i64::from(MAX_LINE_QUANTITY) + 1),
            Err(CartError::InvalidQuantity(_))
        ));

        svc.add("u-1", "samosa", i64::from(MAX_LINE_QUANTITY)).unwrap();
        // accumulating past the ceiling leaves the stored line as it was
        assert!(matches!(
            svc.add("u-1", "samosa", 1),
            Err(CartError::InvalidQuantity(_))
        ));
        assert!(matches!(
            svc.update_quantity("u-1", "samosa", 100_000),
            Err(CartError::InvalidQuantity(100_000))
        ));
        let cart = svc.get("u-1").unwrap();
        assert_eq!(cart.items[0].quantity, MAX_LINE_QUANTITY);
        assert_totals(&cart);
    }

    #[test]
    fn test_oversized_price_is_rejected_not_panicking() {
        let (storage, svc) = service();
        let mut item = menu_item("gold", 1, true);
        item.price = Decimal::from_i128_with_scale(10_i128.pow(28), 0);
        let txn = storage.begin_write().unwrap();
        storage.put_menu_item(&txn, &item).unwrap();
        txn.commit().unwrap();

        svc.add("u-1", "gold", 1).unwrap();
        // 8 x 1e28 exceeds what a Decimal can hold
        let err = svc.add("u-1", "gold", 7).unwrap_err();
        assert!(matches!(err, CartError::AmountOverflow(_)));
        assert_eq!(AppError::from(err).code, ErrorCode::ValueOutOfRange);
        assert_eq!(svc.get("u-1").unwrap().items[0].quantity, 1);
    }
}
