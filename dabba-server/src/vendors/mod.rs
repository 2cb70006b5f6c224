//! Vendor settings, order queue and dashboard
//!
//! Settings are created lazily with defaults the first time a vendor reads
//! them. Customer-facing lookups (`resolve`) fall back to defaults without
//! persisting anything.

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    BusinessHours, MAX_TAX_RATE, MAX_VENDOR_AMOUNT, Order, OrderStatus, PaymentStatus,
    PickupSlot, VendorSettings, VendorSettingsUpdate, Weekday,
};
use shared::util::now_millis;
use std::collections::HashSet;
use thiserror::Error;

use crate::db::{KitchenStorage, StorageError};

pub const DEFAULT_PAGE_LIMIT: usize = 10;
pub const MAX_PAGE_LIMIT: usize = 100;
const RECENT_ORDERS: usize = 10;

#[derive(Debug, Error)]
pub enum VendorError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Vendor not found: {0}")]
    VendorNotFound(String),

    #[error("{0}")]
    Validation(String),
}

impl From<VendorError> for AppError {
    fn from(err: VendorError) -> Self {
        match err {
            VendorError::Storage(e) => e.into(),
            VendorError::VendorNotFound(id) => {
                AppError::new(ErrorCode::VendorNotFound).with_detail("vendor_id", id)
            }
            VendorError::Validation(msg) => AppError::validation(msg),
        }
    }
}

pub type VendorResult<T> = Result<T, VendorError>;

/// One page of a vendor's order queue
#[derive(Debug, Clone, Serialize)]
pub struct VendorOrderPage {
    pub count: usize,
    pub total_count: usize,
    pub total_pages: usize,
    pub current_page: usize,
    pub orders: Vec<Order>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardStats {
    pub total_orders: usize,
    pub pending_orders: usize,
    pub completed_orders: usize,
    /// Sum of totals over orders whose payment completed
    #[serde(with = "rust_decimal::serde::float")]
    pub total_revenue: Decimal,
    pub total_menu_items: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub recent_orders: Vec<Order>,
}

#[derive(Debug, Clone)]
pub struct VendorService {
    storage: KitchenStorage,
}

impl VendorService {
    pub fn new(storage: KitchenStorage) -> Self {
        Self { storage }
    }

    /// Settings for the calling vendor, creating and persisting defaults on
    /// first access.
    pub fn get_or_create(&self, vendor_id: &str, vendor_name: &str) -> VendorResult<VendorSettings> {
        let txn = self.storage.begin_write()?;
        if let Some(existing) = self.storage.get_vendor_settings_txn(&txn, vendor_id)? {
            return Ok(existing);
        }
        let settings = VendorSettings::defaults_for(vendor_id, vendor_name, now_millis());
        self.storage.put_vendor_settings(&txn, &settings)?;
        txn.commit().map_err(StorageError::from)?;
        tracing::info!(vendor_id = %vendor_id, "Created default vendor settings");
        Ok(settings)
    }

    /// Settings used to serve customers of `vendor_id`.
    ///
    /// A vendor that never saved settings but has menu items gets the
    /// defaults; a vendor with neither is unknown.
    pub fn resolve(&self, vendor_id: &str) -> VendorResult<VendorSettings> {
        if let Some(settings) = self.storage.get_vendor_settings(vendor_id)? {
            return Ok(settings);
        }
        let has_menu = self
            .storage
            .list_menu_items()?
            .iter()
            .any(|item| item.vendor_id == vendor_id);
        if !has_menu {
            return Err(VendorError::VendorNotFound(vendor_id.to_string()));
        }
        Ok(VendorSettings::defaults_for(vendor_id, vendor_id, now_millis()))
    }

    /// Apply a partial update, creating the settings row if needed.
    pub fn update(
        &self,
        vendor_id: &str,
        vendor_name: &str,
        update: VendorSettingsUpdate,
    ) -> VendorResult<VendorSettings> {
        validate_update(&update)?;

        let now = now_millis();
        let txn = self.storage.begin_write()?;
        let mut settings = self
            .storage
            .get_vendor_settings_txn(&txn, vendor_id)?
            .unwrap_or_else(|| VendorSettings::defaults_for(vendor_id, vendor_name, now));

        if let Some(v) = update.business_name {
            settings.business_name = v;
        }
        if let Some(v) = update.description {
            settings.description = Some(v);
        }
        if let Some(v) = update.special_notice {
            settings.special_notice = Some(v);
        }
        if let Some(v) = update.packaging_fee {
            settings.packaging_fee = v;
        }
        if let Some(v) = update.tax_rate {
            settings.tax_rate = v;
        }
        if let Some(v) = update.minimum_order_amount {
            settings.minimum_order_amount = v;
        }
        if let Some(v) = update.pickup_slots {
            settings.pickup_slots = v;
        }
        if let Some(v) = update.business_hours {
            settings.business_hours = v;
        }
        if let Some(v) = update.holidays {
            settings.holidays = v;
        }
        if let Some(v) = update.accepting_orders {
            settings.accepting_orders = v;
        }
        settings.updated_at = now;

        self.storage.put_vendor_settings(&txn, &settings)?;
        txn.commit().map_err(StorageError::from)?;
        tracing::info!(vendor_id = %vendor_id, "Vendor settings updated");
        Ok(settings)
    }

    /// Vendor order queue, newest first, optionally filtered by status.
    ///
    /// `page` starts at 1; `limit` defaults to 10 and is capped at 100.
    pub fn list_orders(
        &self,
        vendor_id: &str,
        status: Option<OrderStatus>,
        page: Option<usize>,
        limit: Option<usize>,
    ) -> VendorResult<VendorOrderPage> {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT);

        let matching: Vec<Order> = self
            .storage
            .list_vendor_orders(vendor_id)?
            .into_iter()
            .filter(|o| status.is_none_or(|s| o.status == s))
            .collect();

        let total_count = matching.len();
        // Pages past the end are empty; saturate so huge page numbers can't overflow
        let orders: Vec<Order> = matching
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .collect();

        Ok(VendorOrderPage {
            count: orders.len(),
            total_count,
            total_pages: total_count.div_ceil(limit),
            current_page: page,
            orders,
        })
    }

    pub fn dashboard(&self, vendor_id: &str) -> VendorResult<Dashboard> {
        let orders = self.storage.list_vendor_orders(vendor_id)?;
        let total_menu_items = self
            .storage
            .list_menu_items()?
            .iter()
            .filter(|item| item.vendor_id == vendor_id)
            .count();

        let stats = DashboardStats {
            total_orders: orders.len(),
            pending_orders: orders
                .iter()
                .filter(|o| o.status == OrderStatus::Pending)
                .count(),
            completed_orders: orders
                .iter()
                .filter(|o| o.status == OrderStatus::Completed)
                .count(),
            total_revenue: orders
                .iter()
                .filter(|o| o.payment_details.status == PaymentStatus::Completed)
                .map(|o| o.pricing.total)
                .sum(),
            total_menu_items,
        };

        Ok(Dashboard {
            stats,
            recent_orders: orders.into_iter().take(RECENT_ORDERS).collect(),
        })
    }
}

fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    if value.len() != 5 {
        return None;
    }
    NaiveTime::parse_from_str(value, "%H:%M").ok()
}

fn validate_slots(slots: &[PickupSlot]) -> VendorResult<()> {
    let mut labels = HashSet::new();
    for slot in slots {
        let (Some(start), Some(end)) = (parse_hhmm(&slot.start_time), parse_hhmm(&slot.end_time))
        else {
            return Err(VendorError::Validation(format!(
                "Invalid pickup slot time: {}",
                slot.label()
            )));
        };
        if start >= end {
            return Err(VendorError::Validation(format!(
                "Pickup slot must start before it ends: {}",
                slot.label()
            )));
        }
        if slot.max_orders == 0 {
            return Err(VendorError::Validation(format!(
                "Pickup slot capacity must be at least 1: {}",
                slot.label()
            )));
        }
        if !labels.insert(slot.label()) {
            return Err(VendorError::Validation(format!(
                "Duplicate pickup slot: {}",
                slot.label()
            )));
        }
    }
    Ok(())
}

fn validate_business_hours(hours: &[BusinessHours]) -> VendorResult<()> {
    let days: HashSet<Weekday> = hours.iter().map(|h| h.day).collect();
    if hours.len() != Weekday::ALL.len() || days.len() != Weekday::ALL.len() {
        return Err(VendorError::Validation(
            "Business hours need exactly one entry per weekday".into(),
        ));
    }
    for h in hours {
        if parse_hhmm(&h.open_time).is_none() || parse_hhmm(&h.close_time).is_none() {
            return Err(VendorError::Validation(format!(
                "Invalid business hours for {:?}",
                h.day
            )));
        }
    }
    Ok(())
}

fn validate_update(update: &VendorSettingsUpdate) -> VendorResult<()> {
    if update
        .business_name
        .as_deref()
        .is_some_and(|name| name.trim().is_empty())
    {
        return Err(VendorError::Validation("business_name cannot be empty".into()));
    }
    for (field, value, max) in [
        ("packaging_fee", update.packaging_fee, MAX_VENDOR_AMOUNT),
        ("tax_rate", update.tax_rate, MAX_TAX_RATE),
        ("minimum_order_amount", update.minimum_order_amount, MAX_VENDOR_AMOUNT),
    ] {
        if value.is_some_and(|v| v < Decimal::ZERO) {
            return Err(VendorError::Validation(format!("{field} cannot be negative")));
        }
        if value.is_some_and(|v| v > Decimal::from(max)) {
            return Err(VendorError::Validation(format!("{field} cannot exceed {max}")));
        }
    }
    if let Some(slots) = &update.pickup_slots {
        validate_slots(slots)?;
    }
    if let Some(hours) = &update.business_hours {
        validate_business_hours(hours)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{MenuCategory, MenuItem};

    fn service() -> (KitchenStorage, VendorService) {
        let storage = KitchenStorage::open_in_memory().unwrap();
        (storage.clone(), VendorService::new(storage))
    }

    fn seed_menu_item(storage: &KitchenStorage, vendor_id: &str) {
        let item = MenuItem {
            id: format!("{vendor_id}-item"),
            vendor_id: vendor_id.to_string(),
            name: "Dal".to_string(),
            description: "Yellow dal".to_string(),
            price: Decimal::from(80),
            category: MenuCategory::Lunch,
            is_available: true,
            images: vec![],
            dietary_info: Default::default(),
            preparation_time: 20,
            created_at: 0,
            updated_at: 0,
        };
        let txn = storage.begin_write().unwrap();
        storage.put_menu_item(&txn, &item).unwrap();
        txn.commit().unwrap();
    }

    #[test]
    fn test_get_or_create_persists_defaults() {
        let (storage, svc) = service();
        let s = svc.get_or_create("v-1", "Meera's Kitchen").unwrap();
        assert_eq!(s.business_name, "Meera's Kitchen");
        assert!(storage.get_vendor_settings("v-1").unwrap().is_some());

        // second call returns the stored row untouched
        let again = svc.get_or_create("v-1", "Renamed").unwrap();
        assert_eq!(again.business_name, "Meera's Kitchen");
    }

    #[test]
    fn test_resolve_unknown_vendor() {
        let (_storage, svc) = service();
        assert!(matches!(
            svc.resolve("ghost"),
            Err(VendorError::VendorNotFound(_))
        ));
    }

    #[test]
    fn test_resolve_falls_back_to_defaults_without_persisting() {
        let (storage, svc) = service();
        seed_menu_item(&storage, "v-2");
        let s = svc.resolve("v-2").unwrap();
        assert_eq!(s.pickup_slots.len(), 3);
        assert!(storage.get_vendor_settings("v-2").unwrap().is_none());
    }

    #[test]
    fn test_update_merges_fields() {
        let (_storage, svc) = service();
        let update = VendorSettingsUpdate {
            packaging_fee: Some(Decimal::from(10)),
            pickup_slots: Some(vec![PickupSlot::new("08:00", "09:00", 4)]),
            accepting_orders: Some(false),
            ..Default::default()
        };
        let s = svc.update("v-1", "K", update).unwrap();
        assert_eq!(s.packaging_fee, Decimal::from(10));
        assert_eq!(s.tax_rate, Decimal::from(5));
        assert_eq!(s.pickup_slots, vec![PickupSlot::new("08:00", "09:00", 4)]);
        assert!(!s.accepting_orders);
    }

    #[test]
    fn test_update_rejects_bad_values() {
        let (_storage, svc) = service();
        let cases = vec![
            VendorSettingsUpdate {
                tax_rate: Some(Decimal::from(-1)),
                ..Default::default()
            },
            VendorSettingsUpdate {
                pickup_slots: Some(vec![PickupSlot::new("11:00", "10:00", 5)]),
                ..Default::default()
            },
            VendorSettingsUpdate {
                pickup_slots: Some(vec![PickupSlot::new("10:00", "11:00", 0)]),
                ..Default::default()
            },
            VendorSettingsUpdate {
                pickup_slots: Some(vec![
                    PickupSlot::new("10:00", "11:00", 5),
                    PickupSlot::new("10:00", "11:00", 8),
                ]),
                ..Default::default()
            },
            VendorSettingsUpdate {
                pickup_slots: Some(vec![PickupSlot::new("9:00", "10:00", 5)]),
                ..Default::default()
            },
            VendorSettingsUpdate {
                business_hours: Some(vec![]),
                ..Default::default()
            },
            VendorSettingsUpdate {
                tax_rate: Some(Decimal::from(MAX_TAX_RATE + 1)),
                ..Default::default()
            },
            VendorSettingsUpdate {
                packaging_fee: Some(Decimal::from(MAX_VENDOR_AMOUNT + 1)),
                ..Default::default()
            },
        ];
        for update in cases {
            assert!(matches!(
                svc.update("v-1", "K", update),
                Err(VendorError::Validation(_))
            ));
        }
    }

    #[test]
    fn test_list_orders_huge_page_is_empty() {
        let (_storage, svc) = service();
        let page = svc
            .list_orders("v-1", None, Some(usize::MAX), Some(MAX_PAGE_LIMIT))
            .unwrap();
        assert_eq!(page.count, 0);
        assert_eq!(page.total_count, 0);
        assert_eq!(page.current_page, usize::MAX);

        let page = svc.list_orders("v-1", None, Some(0), Some(10_000)).unwrap();
        assert_eq!(page.current_page, 1);
        assert_eq!(page.total_pages, 0);
    }
}
