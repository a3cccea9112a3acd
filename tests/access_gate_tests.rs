use std::collections::BTreeSet;

use school_portal_auth::{
    AccessDecision, AccessGate, CredentialVerifier, DenyReason, IdentityClaim, RegistryError,
    RoleCode, RoleRegistry, gate::Requirement,
};

mod common;
use common::*;

fn scenario_registry() -> RoleRegistry {
    RoleRegistry::from_pairs([("admin", RoleCode(6794)), ("teacher", RoleCode(2938))]).unwrap()
}

/// Claims can only come out of the verifier, so tests mint and verify a real token.
fn claim_with(roles: &[u32]) -> IdentityClaim {
    CredentialVerifier::new(&test_config())
        .verify_token(&mint_token(roles))
        .unwrap()
}

#[test]
fn test_admin_gate_scenario() {
    let gate = AccessGate::new(&scenario_registry(), ["admin"]);

    assert_eq!(
        gate.decide(Some(&claim_with(&[2938]))),
        AccessDecision::Deny(DenyReason::Forbidden)
    );
    assert_eq!(gate.decide(Some(&claim_with(&[6794, 2938]))), AccessDecision::Allow);
    assert_eq!(
        gate.decide(None),
        AccessDecision::Deny(DenyReason::Unauthenticated)
    );
}

#[test]
fn test_any_required_code_is_enough() {
    let registry = RoleRegistry::standard();
    let gate = AccessGate::new(&registry, ["admin", "maintainer"]);

    assert!(gate.decide(Some(&claim_with(&[MAINTAINER]))).is_allowed());
    assert!(gate.decide(Some(&claim_with(&[ADMIN]))).is_allowed());
    assert!(!gate.decide(Some(&claim_with(&[TEACHER, INACTIVE]))).is_allowed());
    assert!(!gate.decide(Some(&claim_with(&[]))).is_allowed());
}

#[test]
fn test_empty_requirement_admits_any_authenticated_identity() {
    let registry = RoleRegistry::standard();
    let gate = AccessGate::new(&registry, Vec::<&str>::new());

    assert_eq!(gate.requirement(), &Requirement::AnyAuthenticated);
    assert_eq!(gate.decide(Some(&claim_with(&[]))), AccessDecision::Allow);
    assert_eq!(gate.decide(Some(&claim_with(&[INACTIVE]))), AccessDecision::Allow);
    assert_eq!(
        gate.decide(None),
        AccessDecision::Deny(DenyReason::Unauthenticated)
    );

    let only = AccessGate::authenticated_only();
    assert_eq!(only.decide(Some(&claim_with(&[]))), AccessDecision::Allow);
}

#[test]
fn test_unknown_names_are_dropped_by_lenient_builder() {
    let registry = RoleRegistry::standard();

    let partly_known = AccessGate::new(&registry, ["admin", "principal"]);
    assert_eq!(
        partly_known.requirement(),
        &Requirement::AnyOf(BTreeSet::from([RoleCode(ADMIN)]))
    );

    // Nothing resolved: the gate must not fall open.
    let all_unknown = AccessGate::new(&registry, ["amdin"]);
    assert_eq!(all_unknown.requirement(), &Requirement::AnyOf(BTreeSet::new()));
    assert_eq!(
        all_unknown.decide(Some(&claim_with(&[ADMIN, TEACHER, MAINTAINER, INACTIVE]))),
        AccessDecision::Deny(DenyReason::Forbidden)
    );
}

#[test]
fn test_strict_builder_rejects_unknown_names() {
    let registry = RoleRegistry::standard();

    assert_eq!(
        AccessGate::try_new(&registry, ["admin", "amdin"]).unwrap_err(),
        RegistryError::UnknownRole("amdin".to_string())
    );

    let gate = AccessGate::try_new(&registry, ["teacher"]).unwrap();
    assert!(gate.decide(Some(&claim_with(&[TEACHER]))).is_allowed());
}

#[test]
fn test_decision_is_idempotent() {
    let gate = AccessGate::new(&RoleRegistry::standard(), ["teacher"]);
    let teacher = claim_with(&[TEACHER]);
    let admin = claim_with(&[ADMIN]);

    for _ in 0..3 {
        assert_eq!(gate.decide(Some(&teacher)), AccessDecision::Allow);
        assert_eq!(
            gate.decide(Some(&admin)),
            AccessDecision::Deny(DenyReason::Forbidden)
        );
    }
}

#[test]
fn test_gates_do_not_interfere() {
    let registry = RoleRegistry::standard();
    let admin_gate = AccessGate::new(&registry, ["admin"]);
    let teacher_gate = AccessGate::new(&registry, ["teacher"]);
    let cloned = admin_gate.clone();

    let teacher = claim_with(&[TEACHER]);
    assert!(!admin_gate.decide(Some(&teacher)).is_allowed());
    assert!(teacher_gate.decide(Some(&teacher)).is_allowed());
    assert_eq!(cloned.requirement(), admin_gate.requirement());
}

#[test]
fn test_decision_into_result() {
    assert_eq!(AccessDecision::Allow.into_result(), Ok(()));
    assert_eq!(
        AccessDecision::Deny(DenyReason::Forbidden).into_result(),
        Err(DenyReason::Forbidden)
    );
}
