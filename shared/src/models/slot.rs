//! Pickup slot availability view

use serde::{Deserialize, Serialize};

/// Capacity snapshot of one pickup window on one date
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlotStatus {
    pub time_slot: String,
    pub start_time: String,
    pub end_time: String,
    pub max_orders: u32,
    pub booked_orders: u32,
    pub available: bool,
    /// Negative when capacity was reduced below existing bookings
    pub remaining_capacity: i64,
}
