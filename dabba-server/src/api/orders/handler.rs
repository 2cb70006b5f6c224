//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use shared::error::AppResult;
use shared::models::{Order, PaymentMethod};
use validator::Validate;

use crate::api::validate_payload;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::orders::{PaymentConfirmation, PickupRequest};
use crate::payment::ProviderOrder;

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub pickup_details: PickupRequest,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub order: Order,
    /// Present for online payment; the client opens checkout with it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_order: Option<ProviderOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_key_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct VerifyPaymentRequest {
    #[validate(length(min = 1, message = "order_id is required"))]
    pub order_id: String,
    #[validate(length(min = 1, message = "provider_payment_id is required"))]
    pub provider_payment_id: String,
    #[validate(length(min = 1, message = "provider_order_id is required"))]
    pub provider_order_id: String,
    #[validate(length(min = 1, message = "provider_signature is required"))]
    pub provider_signature: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct CancelRequest {
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

/// GET /api/orders - caller's orders, newest first
pub async fn list(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(state.orders.list_user_orders(&current_user)?))
}

/// POST /api/orders/create
pub async fn create(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<Json<CreateOrderResponse>> {
    let placed = state
        .orders
        .create_order(&current_user, payload.pickup_details, payload.payment_method)
        .await?;
    let payment_key_id = placed
        .payment
        .as_ref()
        .and_then(|_| state.config.payment.key_id.clone());
    Ok(Json(CreateOrderResponse {
        order: placed.order,
        payment_order: placed.payment,
        payment_key_id,
    }))
}

/// POST /api/orders/verify-payment
pub async fn verify_payment(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(payload): Json<VerifyPaymentRequest>,
) -> AppResult<Json<Order>> {
    validate_payload(&payload)?;
    let input = PaymentConfirmation {
        order_id: payload.order_id,
        provider_payment_id: payload.provider_payment_id,
        provider_order_id: payload.provider_order_id,
        provider_signature: payload.provider_signature,
    };
    Ok(Json(state.orders.verify_payment(&current_user, input).await?))
}

/// GET /api/orders/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.get_order_for(&current_user, &id)?))
}

/// POST /api/orders/{id}/cancel
pub async fn cancel(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
    payload: Option<Json<CancelRequest>>,
) -> AppResult<Json<Order>> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    validate_payload(&payload)?;
    Ok(Json(
        state
            .orders
            .cancel_order(&current_user, &id, payload.reason)?,
    ))
}
