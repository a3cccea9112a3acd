use std::sync::Arc;

use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Authentication and authorization pipeline.
pub mod auth;
pub mod config;
pub mod error;
pub mod gate;
pub mod roles;

// HTTP surface built on top of the pipeline.
pub mod handlers;
pub mod models;
pub mod routes;

use routes::{admin, authenticated, maintenance, public};

// --- Public Re-exports ---

pub use auth::{CredentialVerifier, IdentityClaim, SubjectId, TokenClaims};
pub use config::{AppConfig, ConfigError};
pub use error::AuthError;
pub use gate::{AccessDecision, AccessGate, DenyReason};
pub use roles::{RegistryError, Role, RoleCode, RoleRegistry};

/// ApiDoc
///
/// OpenAPI document served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health, handlers::get_me, handlers::list_roles, handlers::maintenance_status
    ),
    components(
        schemas(
            models::ErrorBody, models::ForbiddenBody, models::MeResponse,
            models::RoleEntry, models::MaintenanceStatus,
        )
    ),
    tags(
        (name = "school-portal", description = "School portal authentication and authorization API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Everything a request needs, assembled once at startup and read-only afterwards.
/// Cloning only bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    /// The loaded, immutable process configuration.
    pub config: AppConfig,
    /// Role name <-> code mapping shared by gates and handlers.
    pub registry: Arc<RoleRegistry>,
    /// Bearer token verifier keyed with `config.jwt_secret`.
    pub verifier: Arc<CredentialVerifier>,
}

impl AppState {
    /// Builds the state with the standard role registry.
    pub fn new(config: AppConfig) -> Self {
        Self::with_registry(config, RoleRegistry::standard())
    }

    pub fn with_registry(config: AppConfig, registry: RoleRegistry) -> Self {
        let verifier = Arc::new(CredentialVerifier::new(&config));
        Self {
            config,
            registry: Arc::new(registry),
            verifier,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

impl FromRef<AppState> for Arc<RoleRegistry> {
    fn from_ref(app_state: &AppState) -> Arc<RoleRegistry> {
        app_state.registry.clone()
    }
}

impl FromRef<AppState> for Arc<CredentialVerifier> {
    fn from_ref(app_state: &AppState) -> Arc<CredentialVerifier> {
        app_state.verifier.clone()
    }
}

/// create_router
///
/// Assembles the routing structure, attaches the pipeline stages to each route group
/// and wraps everything in the request-id, tracing and CORS layers.
///
/// Fails if a route group declares a role name the registry does not know.
pub fn create_router(state: AppState) -> Result<Router, RegistryError> {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: Swagger UI and the raw OpenAPI document.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public Routes: no pipeline stage.
        .merge(public::public_routes())
        // Authenticated Routes: credential verifier only.
        .merge(authenticated::authenticated_routes(&state))
        // Role-Restricted Routes: verifier then gate. Unknown role names abort here.
        .nest("/admin", admin::admin_routes(&state)?)
        .nest("/maintenance", maintenance::maintenance_routes(&state)?)
        .with_state(state);

    // 3. Observability and Correlation Layers
    Ok(base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID Generation
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request Tracing, one span per request carrying the request id.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID Propagation back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors))
}

/// trace_span_logger
///
/// Opens one span per request carrying the method, URI and `x-request-id`, so every
/// log line emitted by the pipeline (including denials) is correlated to its request.
/// The `Authorization` header is never recorded.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
