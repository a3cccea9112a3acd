use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// --- Rejection Bodies ---

/// ErrorBody
///
/// Body of every 401 response: `{"status": "error", "message": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ErrorBody {
    pub status: String,
    pub message: String,
}

/// ForbiddenBody
///
/// Body of every 403 response: `{"success": false, "message": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ForbiddenBody {
    pub success: bool,
    pub message: String,
}

// --- Response Payloads ---

/// MeResponse
///
/// The caller's verified identity as seen by the server.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MeResponse {
    /// Subject of the token, rendered as a string.
    pub subject: String,
    /// Role codes asserted by the token, including codes this server does not know.
    pub role_codes: Vec<u32>,
    /// Names of the asserted codes that are registered.
    pub roles: Vec<String>,
    pub expires_at: DateTime<Utc>,
}

/// RoleEntry
///
/// One row of the role-code registry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct RoleEntry {
    pub name: String,
    pub code: u32,
}

/// MaintenanceStatus
///
/// Runtime facts exposed to administrators and maintainers. Never includes the secret.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MaintenanceStatus {
    pub environment: String,
    pub clock_skew_secs: u64,
    pub registered_roles: usize,
    pub insecure_secret: bool,
}
