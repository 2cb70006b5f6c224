//! Cart API
//!
//! | Path | Method |
//! |------|--------|
//! | /api/cart | GET |
//! | /api/cart/add | POST |
//! | /api/cart/update | PUT |
//! | /api/cart/remove/{item_id} | DELETE |
//! | /api/cart/clear | DELETE |

mod handler;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/cart", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::get_cart))
        .route("/add", post(handler::add))
        .route("/update", put(handler::update))
        .route("/remove/{item_id}", delete(handler::remove))
        .route("/clear", delete(handler::clear))
}
