use std::{collections::BTreeSet, fmt, sync::Arc};

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};

use crate::{
    config::{AppConfig, MAX_CLOCK_SKEW_SECS},
    error::{AuthError, InvalidReason},
    roles::RoleCode,
};

/// SubjectId
///
/// Identifier of the user a token was issued to. The identity store hands out numeric
/// ids, but any string subject is accepted and treated as opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubjectId {
    Numeric(u64),
    Opaque(String),
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectId::Numeric(id) => write!(f, "{id}"),
            SubjectId::Opaque(id) => f.write_str(id),
        }
    }
}

/// TokenClaims
///
/// Payload carried inside a bearer token. Signed with the shared HS256 secret by the
/// login flow and checked here on every protected request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (sub): the user the token was issued to.
    pub sub: SubjectId,
    /// Role codes asserted for the subject.
    #[serde(default)]
    pub roles: Vec<RoleCode>,
    /// Expiration Time (exp): seconds since the Unix epoch.
    pub exp: u64,
    /// Issued At (iat): seconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
}

/// IdentityClaim
///
/// The verified identity of one request. The only way to obtain one is through
/// [`CredentialVerifier`], so holding an `IdentityClaim` proves the token checked out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityClaim {
    subject: SubjectId,
    role_codes: BTreeSet<RoleCode>,
    expires_at: DateTime<Utc>,
}

impl IdentityClaim {
    pub fn subject(&self) -> &SubjectId {
        &self.subject
    }

    pub fn role_codes(&self) -> &BTreeSet<RoleCode> {
        &self.role_codes
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// True if at least one of `codes` was asserted for this subject.
    pub fn holds_any(&self, codes: &BTreeSet<RoleCode>) -> bool {
        !self.role_codes.is_disjoint(codes)
    }
}

/// CredentialVerifier
///
/// Authenticates `Authorization: Bearer <token>` credentials against the process-wide
/// secret. Immutable after construction and shared behind an `Arc`.
#[derive(Clone)]
pub struct CredentialVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialVerifier")
            .field("algorithms", &self.validation.algorithms)
            .field("leeway", &self.validation.leeway)
            .finish_non_exhaustive()
    }
}

impl CredentialVerifier {
    pub fn new(config: &AppConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        // `AppConfig::load` already rejects larger values; configs built by hand are capped here.
        validation.leeway = config.clock_skew_secs.min(MAX_CLOCK_SKEW_SECS);
        // Audience is not part of the token contract.
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Verifies the `Authorization` header of a request.
    pub fn verify_headers(&self, headers: &HeaderMap) -> Result<IdentityClaim, AuthError> {
        let authorization = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        self.verify_bearer(authorization)
    }

    /// Verifies a raw `Authorization` header value.
    ///
    /// The scheme is matched case-insensitively. A missing value, any other scheme or an
    /// empty token all count as no credential at all.
    pub fn verify_bearer(&self, authorization: Option<&str>) -> Result<IdentityClaim, AuthError> {
        let Some(token) = authorization.and_then(bearer_token) else {
            tracing::warn!("credential rejected: no bearer token");
            return Err(AuthError::MissingCredential);
        };
        self.verify_token(token)
    }

    /// Verifies the token itself: signature, structure and expiry.
    pub fn verify_token(&self, token: &str) -> Result<IdentityClaim, AuthError> {
        // 1. Decode and Validate the Token
        // Signature, algorithm, structure and `exp` (with leeway) are all checked here.
        // Only the sub-reason is logged; the token itself never reaches a log line.
        let token_data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                let reason = match e.kind() {
                    ErrorKind::ExpiredSignature => InvalidReason::Expired,
                    ErrorKind::InvalidSignature => InvalidReason::BadSignature,
                    _ => InvalidReason::Malformed,
                };
                tracing::warn!(%reason, "credential rejected: invalid bearer token");
                AuthError::InvalidCredential(reason)
            })?;

        // 2. Expiry Instant
        // An `exp` beyond what chrono can represent is still a valid, unexpired token.
        let claims = token_data.claims;
        let expires_at = i64::try_from(claims.exp)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        // 3. Build the Identity Claim
        let claim = IdentityClaim {
            subject: claims.sub,
            role_codes: claims.roles.into_iter().collect(),
            expires_at,
        };

        tracing::debug!(
            subject = %claim.subject,
            roles = ?claim.role_codes,
            expires_at = %claim.expires_at,
            "bearer token verified"
        );

        Ok(claim)
    }
}

fn bearer_token(authorization: &str) -> Option<&str> {
    let (scheme, token) = authorization.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// authenticate
///
/// First pipeline stage. Verifies the bearer credential and attaches the resulting
/// [`IdentityClaim`] to the request extensions. Any failure ends the request with 401.
pub async fn authenticate(
    State(verifier): State<Arc<CredentialVerifier>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let claim = verifier.verify_headers(request.headers())?;
    request.extensions_mut().insert(claim);
    Ok(next.run(request).await)
}

/// IdentityClaim Extractor
///
/// Handlers behind the `authenticate` stage receive the claim it attached. Handlers
/// mounted without that stage still get a verified claim: the extractor then runs the
/// verifier itself. Rejection is the same 401 the middleware produces.
impl<S> FromRequestParts<S> for IdentityClaim
where
    S: Send + Sync,
    Arc<CredentialVerifier>: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // 1. Claim attached by the `authenticate` stage
        if let Some(claim) = parts.extensions.get::<IdentityClaim>() {
            return Ok(claim.clone());
        }

        // 2. No stage ran: verify the `Authorization` header directly
        let verifier = Arc::<CredentialVerifier>::from_ref(state);
        verifier.verify_headers(&parts.headers)
    }
}
