//! Authentication
//!
//! - [`JwtService`] verifies principal tokens
//! - [`CurrentUser`] is the authenticated principal
//! - [`require_auth`] / [`require_vendor`] are the route guards

pub mod extractor;
pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService, UserRole};
pub use middleware::{require_auth, require_vendor};
