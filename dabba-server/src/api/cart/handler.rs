//! Cart API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use shared::error::AppResult;
use shared::models::Cart;
use validator::Validate;

use crate::api::validate_payload;
use crate::auth::CurrentUser;
use crate::core::ServerState;

#[derive(Debug, Deserialize, Validate)]
pub struct AddToCart {
    #[validate(length(min = 1, message = "menu_item_id is required"))]
    pub menu_item_id: String,
    #[serde(default = "one")]
    pub quantity: i64,
}

fn one() -> i64 {
    1
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCartItem {
    #[validate(length(min = 1, message = "menu_item_id is required"))]
    pub menu_item_id: String,
    pub quantity: i64,
}

/// GET /api/cart
pub async fn get_cart(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<Cart>> {
    Ok(Json(state.cart.get(&current_user.id)?))
}

/// POST /api/cart/add
pub async fn add(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(payload): Json<AddToCart>,
) -> AppResult<Json<Cart>> {
    validate_payload(&payload)?;
    let cart = state
        .cart
        .add(&current_user.id, &payload.menu_item_id, payload.quantity)?;
    Ok(Json(cart))
}

/// PUT /api/cart/update - zero or less removes the line
pub async fn update(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(payload): Json<UpdateCartItem>,
) -> AppResult<Json<Cart>> {
    validate_payload(&payload)?;
    let cart = state
        .cart
        .update_quantity(&current_user.id, &payload.menu_item_id, payload.quantity)?;
    Ok(Json(cart))
}

/// DELETE /api/cart/remove/{item_id}
pub async fn remove(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(item_id): Path<String>,
) -> AppResult<Json<Cart>> {
    Ok(Json(state.cart.remove(&current_user.id, &item_id)?))
}

/// DELETE /api/cart/clear
pub async fn clear(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<Cart>> {
    Ok(Json(state.cart.clear(&current_user.id)?))
}
