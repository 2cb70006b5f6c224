//! Public menu browsing
//!
//! | Path | Method |
//! |------|--------|
//! | /api/menu?vendor_id&category | GET |
//! | /api/menu/{id} | GET |

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/menu", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
}
