use axum::{
    Json,
    extract::{Query, State},
};
use chrono::NaiveDate;
use serde::Deserialize;
use shared::error::{AppError, AppResult};
use shared::models::SlotStatus;

use crate::core::ServerState;

#[derive(Debug, Deserialize)]
pub struct SlotQuery {
    pub vendor_id: Option<String>,
    pub date: Option<String>,
}

/// GET /api/pickup-slots
pub async fn availability(
    State(state): State<ServerState>,
    Query(query): Query<SlotQuery>,
) -> AppResult<Json<Vec<SlotStatus>>> {
    let vendor_id = query
        .vendor_id
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::validation("vendor_id is required"))?;
    let date = query
        .date
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .ok_or_else(|| AppError::validation("date must be YYYY-MM-DD"))?;

    Ok(Json(state.slots.get_availability(&vendor_id, date)?))
}
