use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::error::AppResult;
use shared::models::{MenuCategory, MenuItem};

use crate::core::ServerState;

#[derive(Debug, Deserialize)]
pub struct MenuQuery {
    pub vendor_id: Option<String>,
    pub category: Option<MenuCategory>,
}

/// GET /api/menu - available items only
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<MenuQuery>,
) -> AppResult<Json<Vec<MenuItem>>> {
    let items = state
        .menu
        .list_available(query.vendor_id.as_deref(), query.category)?;
    Ok(Json(items))
}

/// GET /api/menu/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<MenuItem>> {
    Ok(Json(state.menu.get(&id)?))
}
