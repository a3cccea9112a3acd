use std::{collections::BTreeSet, sync::Arc};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    auth::IdentityClaim,
    error::{self, NO_TOKEN_MESSAGE},
    roles::{RegistryError, RoleCode, RoleRegistry},
};

/// What a gate demands of a verified identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// No role names were declared: any verified identity passes.
    AnyAuthenticated,
    /// At least one of these codes must be asserted. An empty set admits nobody.
    AnyOf(BTreeSet<RoleCode>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Unauthenticated,
    Forbidden,
}

/// Outcome of a single gate evaluation. Computed per request, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Deny(DenyReason),
}

impl AccessDecision {
    pub fn is_allowed(self) -> bool {
        matches!(self, AccessDecision::Allow)
    }

    pub fn into_result(self) -> Result<(), DenyReason> {
        match self {
            AccessDecision::Allow => Ok(()),
            AccessDecision::Deny(reason) => Err(reason),
        }
    }
}

impl IntoResponse for DenyReason {
    fn into_response(self) -> Response {
        match self {
            DenyReason::Unauthenticated => error::unauthorized(NO_TOKEN_MESSAGE),
            DenyReason::Forbidden => error::forbidden(),
        }
    }
}

/// AccessGate
///
/// Enforces one fixed required-role set. Role names are resolved to codes once, when
/// the gate is built; evaluating it afterwards touches no shared state, so the same
/// gate can be cloned onto any number of routes.
#[derive(Debug, Clone)]
pub struct AccessGate {
    requirement: Arc<Requirement>,
}

impl AccessGate {
    /// Builds a gate, dropping names the registry does not know.
    ///
    /// Dropped names are logged. If every declared name is unknown the gate admits nobody.
    pub fn new<I, S>(registry: &RoleRegistry, required_roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<S> = required_roles.into_iter().collect();
        if names.is_empty() {
            return Self::from_requirement(Requirement::AnyAuthenticated);
        }

        for name in &names {
            if registry.codes_for([name.as_ref()]).is_empty() {
                tracing::warn!(role = name.as_ref(), "ignoring unknown role in gate declaration");
            }
        }

        Self::from_requirement(Requirement::AnyOf(registry.codes_for(&names)))
    }

    /// Builds a gate, failing on the first name the registry does not know.
    pub fn try_new<I, S>(registry: &RoleRegistry, required_roles: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let codes = registry.try_codes_for(required_roles)?;
        let requirement = if codes.is_empty() {
            Requirement::AnyAuthenticated
        } else {
            Requirement::AnyOf(codes)
        };
        Ok(Self::from_requirement(requirement))
    }

    /// Gate that only requires a verified identity.
    pub fn authenticated_only() -> Self {
        Self::from_requirement(Requirement::AnyAuthenticated)
    }

    fn from_requirement(requirement: Requirement) -> Self {
        Self {
            requirement: Arc::new(requirement),
        }
    }

    pub fn requirement(&self) -> &Requirement {
        &self.requirement
    }

    /// Decides whether `claim` may pass.
    pub fn decide(&self, claim: Option<&IdentityClaim>) -> AccessDecision {
        let Some(claim) = claim else {
            tracing::warn!("access denied: no verified identity");
            return AccessDecision::Deny(DenyReason::Unauthenticated);
        };

        match self.requirement.as_ref() {
            Requirement::AnyAuthenticated => AccessDecision::Allow,
            Requirement::AnyOf(required) if claim.holds_any(required) => AccessDecision::Allow,
            Requirement::AnyOf(required) => {
                tracing::warn!(
                    subject = %claim.subject(),
                    required = ?required,
                    asserted = ?claim.role_codes(),
                    "access denied: no required role"
                );
                AccessDecision::Deny(DenyReason::Forbidden)
            }
        }
    }
}

/// enforce
///
/// Second pipeline stage. Must run after `auth::authenticate`; reads the claim that
/// stage attached and ends the request with 401 or 403 when the gate denies it.
pub async fn enforce(State(gate): State<AccessGate>, request: Request, next: Next) -> Response {
    match gate.decide(request.extensions().get::<IdentityClaim>()) {
        AccessDecision::Allow => next.run(request).await,
        AccessDecision::Deny(reason) => reason.into_response(),
    }
}
