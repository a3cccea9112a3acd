//! Rejection taxonomy of the authentication pipeline and its HTTP rendering.
//!
//! Callers only ever see the generic messages below. Sub-reasons such as an expired
//! or badly signed token are logged server-side and never echoed back.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::models::{ErrorBody, ForbiddenBody};

pub const NO_TOKEN_MESSAGE: &str = "No token provided";
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid token";
pub const FORBIDDEN_MESSAGE: &str = "Forbidden: Access denied";

/// Why a presented token was rejected. Logged, never returned to the client.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    #[error("token has expired")]
    Expired,

    #[error("signature does not verify")]
    BadSignature,

    #[error("token is malformed")]
    Malformed,
}

/// AuthError
///
/// Failure of the credential verification stage. Both variants surface as 401.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("no bearer token presented")]
    MissingCredential,

    #[error("invalid bearer token: {0}")]
    InvalidCredential(InvalidReason),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingCredential => unauthorized(NO_TOKEN_MESSAGE),
            AuthError::InvalidCredential(_) => unauthorized(INVALID_TOKEN_MESSAGE),
        }
    }
}

/// 401 with the `{status, message}` body.
pub fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorBody {
            status: "error".to_string(),
            message: message.to_string(),
        }),
    )
        .into_response()
}

/// 403 with the `{success, message}` body. Never names the missing role.
pub fn forbidden() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(ForbiddenBody {
            success: false,
            message: FORBIDDEN_MESSAGE.to_string(),
        }),
    )
        .into_response()
}
