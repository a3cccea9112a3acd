use std::{env, fmt};

use thiserror::Error;

/// Fallback verification secret for local development.
///
/// Tokens signed with this value must never be accepted by a production deployment,
/// which is why `AppConfig::load` refuses to fall back to it when `APP_ENV=production`.
pub const INSECURE_LOCAL_SECRET: &str = "insecure-local-development-secret";

/// Largest accepted expiry tolerance, in seconds.
pub const MAX_CLOCK_SKEW_SECS: u64 = 3600;

/// Default bind address of the HTTP server.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// ConfigError
///
/// Startup-time configuration failures. None of these are recoverable per request;
/// `main` aborts the process when `AppConfig::load` returns one of them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set in production")]
    MissingSecret,

    #[error("JWT_SECRET must not be empty")]
    EmptySecret,

    #[error("JWT_CLOCK_SKEW_SECS must be an integer between 0 and 3600, got {0:?}")]
    InvalidClockSkew(String),
}

/// AppConfig
///
/// Holds the process-wide configuration. It is built once at startup, never mutated
/// afterwards, and pulled into handlers and middleware through `FromRef`.
#[derive(Clone)]
pub struct AppConfig {
    // Runtime environment marker. Controls log format and the secret fallback.
    pub env: Env,
    // Shared HMAC secret used to verify bearer tokens.
    pub jwt_secret: String,
    // Tolerated clock skew, in seconds, when checking token expiry.
    pub clock_skew_secs: u64,
    // Socket address the HTTP server listens on.
    pub bind_addr: String,
}

/// Env
///
/// Defines the runtime context: local development or hardened production.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("jwt_secret", &"<redacted>")
            .field("clock_skew_secs", &self.clock_skew_secs)
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}

impl Default for AppConfig {
    /// Safe, non-panicking configuration used for test setup.
    fn default() -> Self {
        Self {
            env: Env::Local,
            jwt_secret: INSECURE_LOCAL_SECRET.to_string(),
            clock_skew_secs: 0,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables.
    ///
    /// * `APP_ENV`: `production` selects `Env::Production`; anything else is `Env::Local`.
    /// * `JWT_SECRET`: mandatory in production. Locally it falls back to
    ///   [`INSECURE_LOCAL_SECRET`].
    /// * `JWT_CLOCK_SKEW_SECS`: expiry tolerance in seconds, default `0`, at most
    ///   [`MAX_CLOCK_SKEW_SECS`].
    /// * `BIND_ADDR`: listen address, default [`DEFAULT_BIND_ADDR`].
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // 1. Runtime Environment
        let env = match lookup("APP_ENV").as_deref() {
            Some("production") => Env::Production,
            _ => Env::Local,
        };

        // 2. JWT Secret Resolution
        // An explicitly empty secret is always an error. Only local mode may fall back
        // to the well-known development secret.
        let jwt_secret = match (env, lookup("JWT_SECRET")) {
            (_, Some(secret)) if secret.trim().is_empty() => return Err(ConfigError::EmptySecret),
            (_, Some(secret)) => secret,
            (Env::Production, None) => return Err(ConfigError::MissingSecret),
            (Env::Local, None) => INSECURE_LOCAL_SECRET.to_string(),
        };

        // 3. Clock Skew Window
        // Bounded so that `now - leeway` inside the verifier can never underflow.
        let clock_skew_secs = match lookup("JWT_CLOCK_SKEW_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs <= MAX_CLOCK_SKEW_SECS => secs,
                _ => return Err(ConfigError::InvalidClockSkew(raw)),
            },
            None => 0,
        };

        // 4. Listener Address
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        Ok(Self {
            env,
            jwt_secret,
            clock_skew_secs,
            bind_addr,
        })
    }

    /// True when the process is running with the well-known development secret.
    pub fn uses_insecure_secret(&self) -> bool {
        self.jwt_secret == INSECURE_LOCAL_SECRET
    }
}
