//! Router Module Index
//!
//! Routes are grouped by the pipeline stages they sit behind. Stages are attached as
//! route layers on each group, so a group can never be mounted without its checks.

use axum::{Router, middleware};

use crate::{AppState, auth, gate::{self, AccessGate}, roles::RegistryError};

/// Routes accessible to anonymous clients.
pub mod public;

/// Routes that need a verified identity and nothing more.
pub mod authenticated;

/// Routes restricted to administrators.
pub mod admin;

/// Routes restricted to administrators and maintainers.
pub mod maintenance;

/// Puts `router` behind the credential verifier only.
pub fn require_auth(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    router.route_layer(middleware::from_fn_with_state(
        state.verifier.clone(),
        auth::authenticate,
    ))
}

/// Puts `router` behind the credential verifier followed by a gate for `roles`.
///
/// Role names are checked against the registry here, so a misspelled name fails
/// router construction instead of silently changing who may call the routes.
pub fn require_roles(
    router: Router<AppState>,
    state: &AppState,
    roles: &[&str],
) -> Result<Router<AppState>, RegistryError> {
    let gate = AccessGate::try_new(&state.registry, roles.iter().copied())?;

    // Layers added later run first: authenticate, then enforce.
    let router = router.route_layer(middleware::from_fn_with_state(gate, gate::enforce));
    Ok(require_auth(router, state))
}
