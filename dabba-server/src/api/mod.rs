//! HTTP API
//!
//! - [`health`] - liveness
//! - [`cart`] - the caller's cart
//! - [`orders`] - order placement, payment confirmation, history
//! - [`pickup_slots`] - public slot availability
//! - [`menu`] - public menu browsing
//! - [`vendor`] - vendor console (settings, queue, menu management)

pub mod cart;
pub mod health;
pub mod menu;
pub mod orders;
pub mod pickup_slots;
pub mod vendor;

#[cfg(test)]
mod tests;

use axum::{Router, middleware};
use shared::error::{AppError, AppResult};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use validator::Validate;

use crate::auth::require_auth;
use crate::core::ServerState;

/// All routes, without state or middleware
pub fn routes() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(cart::router())
        .merge(orders::router())
        .merge(pickup_slots::router())
        .merge(menu::router())
        .merge(vendor::router())
}

/// The complete application: routes, auth and tower-http layers
pub fn build_app(state: ServerState) -> Router {
    routes()
        // require_auth skips public routes itself
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CorsLayer::permissive())
                .layer(CompressionLayer::new()),
        )
}

/// Run derive-based validation on a request body
pub(crate) fn validate_payload<T: Validate>(payload: &T) -> AppResult<()> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))
}
