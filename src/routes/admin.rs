use crate::{AppState, handlers, roles::{RegistryError, Role}};
use axum::{Router, routing::get};

use super::require_roles;

/// Admin Router Module
///
/// Nested under `/admin`. Every route requires the `admin` role.
pub fn admin_routes(state: &AppState) -> Result<Router<AppState>, RegistryError> {
    let router = Router::new()
        // GET /admin/roles
        // The role-code registry, for administrators provisioning accounts.
        .route("/roles", get(handlers::list_roles));

    require_roles(router, state, &[Role::Admin.name()])
}
