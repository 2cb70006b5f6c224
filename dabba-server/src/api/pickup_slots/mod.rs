//! Pickup slot availability (public)
//!
//! `GET /api/pickup-slots?vendor_id=...&date=YYYY-MM-DD`

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/pickup-slots", get(handler::availability))
}
