use crate::{AppState, handlers};
use axum::{Router, routing::get};

use super::require_auth;

/// Authenticated Router Module
///
/// Routes open to any caller holding a valid bearer token, whatever their roles.
pub fn authenticated_routes(state: &AppState) -> Router<AppState> {
    let router = Router::new()
        // GET /me
        // The caller's verified subject, role codes and token expiry.
        .route("/me", get(handlers::get_me));

    require_auth(router, state)
}
