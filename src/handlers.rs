use axum::{Json, extract::State};

use crate::{
    AppState,
    auth::IdentityClaim,
    config::Env,
    models::{ErrorBody, ForbiddenBody, MaintenanceStatus, MeResponse, RoleEntry},
};

/// health
///
/// [Public Route] Liveness probe for load balancers.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = String))
)]
pub async fn health() -> &'static str {
    "ok"
}

/// get_me
///
/// [Authenticated Route] Echoes the verified identity of the caller, with role codes
/// translated to names where the registry knows them.
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Verified identity", body = MeResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    )
)]
pub async fn get_me(claim: IdentityClaim, State(state): State<AppState>) -> Json<MeResponse> {
    let codes = claim.role_codes();
    Json(MeResponse {
        subject: claim.subject().to_string(),
        role_codes: codes.iter().map(|code| code.0).collect(),
        roles: state
            .registry
            .names_for(codes.iter().copied())
            .into_iter()
            .collect(),
        expires_at: claim.expires_at(),
    })
}

/// list_roles
///
/// [Admin Route] Lists the role-code registry.
#[utoipa::path(
    get,
    path = "/admin/roles",
    responses(
        (status = 200, description = "Registered roles", body = [RoleEntry]),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Not an administrator", body = ForbiddenBody)
    )
)]
pub async fn list_roles(State(state): State<AppState>) -> Json<Vec<RoleEntry>> {
    let roles = state
        .registry
        .entries()
        .map(|(name, code)| RoleEntry {
            name: name.to_string(),
            code: code.0,
        })
        .collect();
    Json(roles)
}

/// maintenance_status
///
/// [Maintenance Route] Reports how the running process is configured.
#[utoipa::path(
    get,
    path = "/maintenance/status",
    responses(
        (status = 200, description = "Runtime status", body = MaintenanceStatus),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Not an administrator or maintainer", body = ForbiddenBody)
    )
)]
pub async fn maintenance_status(State(state): State<AppState>) -> Json<MaintenanceStatus> {
    let environment = match state.config.env {
        Env::Local => "local",
        Env::Production => "production",
    };
    Json(MaintenanceStatus {
        environment: environment.to_string(),
        clock_skew_secs: state.config.clock_skew_secs,
        registered_roles: state.registry.len(),
        insecure_secret: state.config.uses_insecure_secret(),
    })
}
