//! Menu Item Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Highest price a vendor may set, in whole currency units
pub const MAX_MENU_PRICE: i64 = 1_000_000;

/// Menu category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MenuCategory {
    Breakfast,
    Lunch,
    Dinner,
    Snacks,
    Desserts,
    Beverages,
}

/// Spice level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SpiceLevel {
    #[default]
    Mild,
    Medium,
    Hot,
}

/// Dietary flags shown on the menu card
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DietaryInfo {
    #[serde(default)]
    pub is_vegetarian: bool,
    #[serde(default)]
    pub is_vegan: bool,
    #[serde(default)]
    pub is_gluten_free: bool,
    #[serde(default)]
    pub spice_level: SpiceLevel,
}

/// Menu item entity (vendor-owned)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MenuItem {
    pub id: String,
    pub vendor_id: String,
    pub name: String,
    pub description: String,
    /// Price in whole currency units
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub category: MenuCategory,
    pub is_available: bool,
    /// Ordered image URLs; the first one is used as thumbnail
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub dietary_info: DietaryInfo,
    /// Minutes
    pub preparation_time: u32,
    pub created_at: i64,
    pub updated_at: i64,
}

impl MenuItem {
    /// Thumbnail URL, empty when the item has no images
    pub fn thumbnail(&self) -> String {
        self.images.first().cloned().unwrap_or_default()
    }
}

/// Create menu item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemCreate {
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub category: MenuCategory,
    pub is_available: Option<bool>,
    pub images: Option<Vec<String>>,
    pub dietary_info: Option<DietaryInfo>,
    pub preparation_time: Option<u32>,
}

/// Update menu item payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuItemUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    pub category: Option<MenuCategory>,
    pub is_available: Option<bool>,
    pub images: Option<Vec<String>>,
    pub dietary_info: Option<DietaryInfo>,
    pub preparation_time: Option<u32>,
}
