//! Order API
//!
//! | Path | Method | Caller |
//! |------|--------|--------|
//! | /api/orders | GET | customer |
//! | /api/orders/create | POST | customer |
//! | /api/orders/verify-payment | POST | customer |
//! | /api/orders/{id} | GET | owner or vendor |
//! | /api/orders/{id}/cancel | POST | owner |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/create", post(handler::create))
        .route("/verify-payment", post(handler::verify_payment))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/cancel", post(handler::cancel))
}
