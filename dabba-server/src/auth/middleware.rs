//! Authentication middleware
//!
//! Validates `Authorization: Bearer <token>` and inserts the
//! [`CurrentUser`] into request extensions.
//!
//! # Routes that skip authentication
//!
//! - `OPTIONS *` (CORS preflight)
//! - non-`/api/` paths (`/health`)
//! - `GET /api/pickup-slots`
//! - `GET /api/menu` and `GET /api/menu/{id}`

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use http::Method;
use shared::error::{AppError, ErrorCode};

use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;

fn is_public_route(method: &Method, path: &str) -> bool {
    method == Method::GET
        && (path == "/api/pickup-slots" || path == "/api/menu" || path.starts_with("/api/menu/"))
}

pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    if req.method() == Method::OPTIONS || !path.starts_with("/api/") {
        return Ok(next.run(req).await);
    }
    if is_public_route(req.method(), path) {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
            return Err(AppError::not_authenticated());
        }
    };

    let user = authenticate(state.jwt_service(), token).inspect_err(|_| {
        security_log!("WARN", "auth_failed", uri = format!("{:?}", req.uri()));
    })?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Decode a token into a principal, mapping failures to API errors
pub(crate) fn authenticate(jwt: &JwtService, token: &str) -> Result<CurrentUser, AppError> {
    let claims = jwt.validate_token(token).map_err(|e| {
        tracing::debug!(error = %e, "Token rejected");
        match e {
            JwtError::ExpiredToken => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid token"),
        }
    })?;
    CurrentUser::try_from(claims)
        .map_err(|e| AppError::invalid_token(format!("Malformed token claims: {e}")))
}

/// Vendor-only routes
///
/// Must be layered inside [`require_auth`].
pub async fn require_vendor(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(AppError::not_authenticated)?;
    if !user.is_vendor() {
        security_log!(
            "WARN",
            "vendor_required",
            user_id = user.id.clone(),
            uri = format!("{:?}", req.uri())
        );
        return Err(AppError::new(ErrorCode::VendorRequired));
    }
    Ok(next.run(req).await)
}
