//! Pickup slot availability
//!
//! Availability is computed from the vendor's live (non-cancelled) orders.
//! The booking counters in `slot_bookings` are the admission gate used at
//! order creation; this view never writes.

use chrono::NaiveDate;
use shared::error::{AppError, ErrorCode};
use shared::models::{OrderStatus, PickupSlot, SlotStatus, VendorSettings};
use std::collections::HashMap;
use thiserror::Error;

use crate::db::{KitchenStorage, StorageError};
use crate::vendors::{VendorError, VendorService};

#[derive(Debug, Error)]
pub enum SlotError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Vendor(#[from] VendorError),

    #[error("Vendor is closed on {0}")]
    VendorClosed(NaiveDate),

    #[error("Pickup slot not offered: {0}")]
    SlotNotFound(String),

    #[error("Pickup slot is full: {0}")]
    SlotFull(String),
}

impl From<SlotError> for AppError {
    fn from(err: SlotError) -> Self {
        match err {
            SlotError::Storage(e) => e.into(),
            SlotError::Vendor(e) => e.into(),
            SlotError::VendorClosed(date) => {
                AppError::new(ErrorCode::VendorClosed).with_detail("date", date.to_string())
            }
            SlotError::SlotNotFound(label) => {
                AppError::new(ErrorCode::SlotNotFound).with_detail("time_slot", label)
            }
            SlotError::SlotFull(label) => {
                AppError::new(ErrorCode::SlotFull).with_detail("time_slot", label)
            }
        }
    }
}

pub type SlotResult<T> = Result<T, SlotError>;

/// The slot a customer may book for `date`, or why they cannot.
pub fn bookable_slot<'a>(
    settings: &'a VendorSettings,
    date: NaiveDate,
    time_slot: &str,
) -> SlotResult<&'a PickupSlot> {
    if !settings.is_open_on(date) {
        return Err(SlotError::VendorClosed(date));
    }
    settings
        .find_slot(time_slot)
        .ok_or_else(|| SlotError::SlotNotFound(time_slot.to_string()))
}

#[derive(Debug, Clone)]
pub struct SlotService {
    storage: KitchenStorage,
    vendors: VendorService,
}

impl SlotService {
    pub fn new(storage: KitchenStorage, vendors: VendorService) -> Self {
        Self { storage, vendors }
    }

    pub fn get_availability(&self, vendor_id: &str, date: NaiveDate) -> SlotResult<Vec<SlotStatus>> {
        let settings = self.vendors.resolve(vendor_id)?;
        if !settings.is_open_on(date) {
            return Err(SlotError::VendorClosed(date));
        }

        let mut booked: HashMap<String, u32> = HashMap::new();
        for order in self.storage.list_vendor_orders(vendor_id)? {
            if order.status == OrderStatus::Cancelled || order.pickup_details.date != date {
                continue;
            }
            *booked.entry(order.pickup_details.time_slot).or_default() += 1;
        }

        Ok(settings
            .pickup_slots
            .iter()
            .map(|slot| {
                let label = slot.label();
                let booked_orders = booked.get(&label).copied().unwrap_or(0);
                SlotStatus {
                    start_time: slot.start_time.clone(),
                    end_time: slot.end_time.clone(),
                    max_orders: slot.max_orders,
                    booked_orders,
                    available: booked_orders < slot.max_orders,
                    remaining_capacity: i64::from(slot.max_orders) - i64::from(booked_orders),
                    time_slot: label,
                }
            })
            .collect())
    }
}
