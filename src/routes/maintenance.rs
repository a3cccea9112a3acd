use crate::{AppState, handlers, roles::{RegistryError, Role}};
use axum::{Router, routing::get};

use super::require_roles;

/// Maintenance Router Module
///
/// Nested under `/maintenance`. Open to administrators and maintainers.
pub fn maintenance_routes(state: &AppState) -> Result<Router<AppState>, RegistryError> {
    let router = Router::new()
        // GET /maintenance/status
        // Runtime configuration summary (environment, clock skew, role count).
        .route("/status", get(handlers::maintenance_status));

    require_roles(
        router,
        state,
        &[Role::Admin.name(), Role::Maintainer.name()],
    )
}
