#![allow(dead_code)]

use std::time::SystemTime;

use jsonwebtoken::{EncodingKey, Header, encode};
use school_portal_auth::{AppConfig, RoleCode, SubjectId, TokenClaims};

pub const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";
pub const OTHER_JWT_SECRET: &str = "some-other-secret-0987654321";

pub const ADMIN: u32 = 6794;
pub const TEACHER: u32 = 2938;
pub const MAINTAINER: u32 = 5150;
pub const INACTIVE: u32 = 1001;

pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// Signs a token for `sub` with the given role codes, expiring `exp_offset` seconds from now.
pub fn mint_token_with(secret: &str, sub: SubjectId, roles: &[u32], exp_offset: i64) -> String {
    let now = now_secs();
    let claims = TokenClaims {
        sub,
        roles: roles.iter().copied().map(RoleCode).collect(),
        exp: now.saturating_add_signed(exp_offset),
        iat: Some(now),
    };

    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &claims, &key).unwrap()
}

/// A one-hour token for user 42 signed with the test secret.
pub fn mint_token(roles: &[u32]) -> String {
    mint_token_with(TEST_JWT_SECRET, SubjectId::Numeric(42), roles, 3600)
}

pub fn test_config() -> AppConfig {
    AppConfig {
        jwt_secret: TEST_JWT_SECRET.to_string(),
        ..AppConfig::default()
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
