use std::{collections::HashMap, env, panic};

use school_portal_auth::{
    AppConfig, ConfigError,
    config::{DEFAULT_BIND_ADDR, Env, INSECURE_LOCAL_SECRET, MAX_CLOCK_SKEW_SECS},
};
use serial_test::serial;

const CONFIG_VARS: [&str; 4] = ["APP_ENV", "JWT_SECRET", "JWT_CLOCK_SKEW_SECS", "BIND_ADDR"];

// --- Setup/Teardown Utilities ---

/// Utility to run a test function and restore environment variables afterward
fn run_with_env<T, R>(test: T, cleanup_vars: &[&'static str]) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    let originals: Vec<(String, Option<String>)> = cleanup_vars
        .iter()
        .map(|&var| (var.to_string(), env::var(var).ok()))
        .collect();

    let result = panic::catch_unwind(test);

    for (key, original_value) in originals.into_iter().rev() {
        unsafe {
            if let Some(val) = original_value {
                env::set_var(&key, val);
            } else {
                env::remove_var(&key);
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

// --- Tests ---

#[test]
#[serial]
fn test_app_config_production_fail_fast() {
    let result = run_with_env(
        || {
            unsafe {
                env::set_var("APP_ENV", "production");
                env::remove_var("JWT_SECRET");
            }
            AppConfig::load()
        },
        &CONFIG_VARS,
    );

    assert_eq!(result.unwrap_err(), ConfigError::MissingSecret);
}

#[test]
#[serial]
fn test_app_config_local_env_defaults() {
    let config = run_with_env(
        || {
            unsafe {
                env::set_var("APP_ENV", "local");
                env::remove_var("JWT_SECRET");
                env::remove_var("JWT_CLOCK_SKEW_SECS");
                env::remove_var("BIND_ADDR");
            }
            AppConfig::load()
        },
        &CONFIG_VARS,
    )
    .unwrap();

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.jwt_secret, INSECURE_LOCAL_SECRET);
    assert!(config.uses_insecure_secret());
    assert_eq!(config.clock_skew_secs, 0);
    assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
}

#[test]
#[serial]
fn test_app_config_production_reads_environment() {
    let config = run_with_env(
        || {
            unsafe {
                env::set_var("APP_ENV", "production");
                env::set_var("JWT_SECRET", "prod-secret");
                env::set_var("JWT_CLOCK_SKEW_SECS", "5");
                env::set_var("BIND_ADDR", "127.0.0.1:8080");
            }
            AppConfig::load()
        },
        &CONFIG_VARS,
    )
    .unwrap();

    assert_eq!(config.env, Env::Production);
    assert_eq!(config.jwt_secret, "prod-secret");
    assert!(!config.uses_insecure_secret());
    assert_eq!(config.clock_skew_secs, 5);
    assert_eq!(config.bind_addr, "127.0.0.1:8080");
}

#[test]
fn test_empty_secret_is_rejected_in_every_env() {
    for app_env in ["local", "production"] {
        let result = AppConfig::from_lookup(lookup(&[("APP_ENV", app_env), ("JWT_SECRET", "  ")]));
        assert_eq!(result.unwrap_err(), ConfigError::EmptySecret);
    }
}

#[test]
fn test_invalid_clock_skew_is_rejected() {
    let result = AppConfig::from_lookup(lookup(&[("JWT_CLOCK_SKEW_SECS", "-3")]));
    assert_eq!(
        result.unwrap_err(),
        ConfigError::InvalidClockSkew("-3".to_string())
    );
}

#[test]
fn test_clock_skew_above_limit_is_rejected() {
    for raw in ["3601", "18446744073709551615"] {
        let result = AppConfig::from_lookup(lookup(&[("JWT_CLOCK_SKEW_SECS", raw)]));
        assert_eq!(
            result.unwrap_err(),
            ConfigError::InvalidClockSkew(raw.to_string())
        );
    }

    let limit = MAX_CLOCK_SKEW_SECS.to_string();
    let config = AppConfig::from_lookup(lookup(&[("JWT_CLOCK_SKEW_SECS", limit.as_str())])).unwrap();
    assert_eq!(config.clock_skew_secs, MAX_CLOCK_SKEW_SECS);
}

#[test]
fn test_unrecognised_env_falls_back_to_local() {
    let config = AppConfig::from_lookup(lookup(&[("APP_ENV", "staging")])).unwrap();
    assert_eq!(config.env, Env::Local);
}
