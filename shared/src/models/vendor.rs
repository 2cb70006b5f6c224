//! Vendor Settings Model

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Day of week used in business hours
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn of(date: NaiveDate) -> Self {
        match date.weekday() {
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
        }
    }
}

/// A bookable pickup window
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PickupSlot {
    /// "HH:MM"
    pub start_time: String,
    /// "HH:MM"
    pub end_time: String,
    pub max_orders: u32,
}

impl PickupSlot {
    pub fn new(start_time: &str, end_time: &str, max_orders: u32) -> Self {
        Self {
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
            max_orders,
        }
    }

    /// Label stored on orders, e.g. `"12:00 - 13:00"`
    pub fn label(&self) -> String {
        format!("{} - {}", self.start_time, self.end_time)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BusinessHours {
    pub day: Weekday,
    pub is_open: bool,
    pub open_time: String,
    pub close_time: String,
}

/// Per-vendor configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VendorSettings {
    pub vendor_id: String,
    pub business_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub special_notice: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub packaging_fee: Decimal,
    /// Percent, e.g. 5 = 5%
    #[serde(with = "rust_decimal::serde::float")]
    pub tax_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub minimum_order_amount: Decimal,
    pub pickup_slots: Vec<PickupSlot>,
    pub business_hours: Vec<BusinessHours>,
    #[serde(default)]
    pub holidays: Vec<NaiveDate>,
    pub accepting_orders: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

pub const DEFAULT_PACKAGING_FEE: i64 = 20;
pub const DEFAULT_TAX_RATE: i64 = 5;
pub const DEFAULT_SLOT_CAPACITY: u32 = 10;
/// Upper bound for packaging fee and minimum order amount
pub const MAX_VENDOR_AMOUNT: i64 = 1_000_000;
/// Percent
pub const MAX_TAX_RATE: i64 = 100;

impl VendorSettings {
    /// Settings a vendor gets before configuring anything
    pub fn defaults_for(vendor_id: impl Into<String>, business_name: impl Into<String>, now: i64) -> Self {
        let business_hours = Weekday::ALL
            .iter()
            .map(|&day| BusinessHours {
                day,
                is_open: day != Weekday::Sunday,
                open_time: "09:00".to_string(),
                close_time: "21:00".to_string(),
            })
            .collect();

        Self {
            vendor_id: vendor_id.into(),
            business_name: business_name.into(),
            description: None,
            special_notice: None,
            packaging_fee: Decimal::from(DEFAULT_PACKAGING_FEE),
            tax_rate: Decimal::from(DEFAULT_TAX_RATE),
            minimum_order_amount: Decimal::ZERO,
            pickup_slots: vec![
                PickupSlot::new("10:00", "11:00", DEFAULT_SLOT_CAPACITY),
                PickupSlot::new("12:00", "13:00", DEFAULT_SLOT_CAPACITY),
                PickupSlot::new("18:00", "19:00", DEFAULT_SLOT_CAPACITY),
            ],
            business_hours,
            holidays: Vec::new(),
            accepting_orders: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the vendor takes pickups on `date`
    pub fn is_open_on(&self, date: NaiveDate) -> bool {
        if !self.accepting_orders || self.holidays.contains(&date) {
            return false;
        }
        let day = Weekday::of(date);
        self.business_hours
            .iter()
            .find(|h| h.day == day)
            .is_some_and(|h| h.is_open)
    }

    pub fn find_slot(&self, label: &str) -> Option<&PickupSlot> {
        self.pickup_slots.iter().find(|s| s.label() == label)
    }
}

/// Update vendor settings payload (all fields optional)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VendorSettingsUpdate {
    pub business_name: Option<String>,
    pub description: Option<String>,
    pub special_notice: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub packaging_fee: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub tax_rate: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub minimum_order_amount: Option<Decimal>,
    pub pickup_slots: Option<Vec<PickupSlot>>,
    pub business_hours: Option<Vec<BusinessHours>>,
    pub holidays: Option<Vec<NaiveDate>>,
    pub accepting_orders: Option<bool>,
}
