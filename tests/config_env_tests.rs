//! Integration tests for ControllerConfig::from_env()
//!
//! These tests verify configuration loading from environment variables.

use helmsman::cluster::ControllerConfig;
use helmsman::telemetry::LogFormat;
use helmsman::types::InstanceType;
use std::env;
use std::sync::Mutex;

/// Global mutex to serialize all env-based tests.
/// Environment variables are process-global, so we must prevent concurrent access.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// All environment variables read by ControllerConfig::from_env().
const ALL_CONFIG_ENV_VARS: &[&str] = &[
    "CLUSTER_NAME",
    "INSTANCE_NAME",
    "INSTANCE_TYPE",
    "COORDINATION_ADDRESS",
    "LOG_FORMAT",
];

/// Helper to run a test with specific environment variables set.
/// This helper:
/// 1. Acquires a mutex to serialize all env-based tests
/// 2. Saves and restores ALL config-related env vars
fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());

    let all_originals: Vec<_> = ALL_CONFIG_ENV_VARS
        .iter()
        .map(|k| (*k, env::var(*k).ok()))
        .collect();

    for key in ALL_CONFIG_ENV_VARS {
        unsafe { env::remove_var(key) };
    }

    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    for (key, original) in all_originals {
        match original {
            Some(v) => unsafe { env::set_var(key, v) },
            None => unsafe { env::remove_var(key) },
        }
    }

    result
}

#[test]
fn test_from_env_defaults() {
    with_env_vars(&[], || {
        let config = ControllerConfig::from_env().expect("Should parse config");
        assert_eq!(config, ControllerConfig::default());
        assert!(config.validate().is_ok());
    });
}

#[test]
fn test_from_env_with_identity() {
    with_env_vars(
        &[
            ("CLUSTER_NAME", "orders"),
            ("INSTANCE_NAME", "node_7"),
            ("COORDINATION_ADDRESS", "zk1:2181,zk2:2181"),
        ],
        || {
            let config = ControllerConfig::from_env().expect("Should parse config");
            assert_eq!(config.cluster_name, "orders");
            assert_eq!(config.instance_name, "node_7");
            assert_eq!(config.coordination_address, "zk1:2181,zk2:2181");
        },
    );
}

#[test]
fn test_from_env_instance_type_is_case_insensitive() {
    with_env_vars(&[("INSTANCE_TYPE", "controller_participant")], || {
        let config = ControllerConfig::from_env().expect("Should parse config");
        assert_eq!(config.instance_type, InstanceType::ControllerParticipant);
    });
}

#[test]
fn test_from_env_invalid_instance_type() {
    with_env_vars(&[("INSTANCE_TYPE", "leader")], || {
        let result = ControllerConfig::from_env();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("INSTANCE_TYPE"));
    });
}

#[test]
fn test_from_env_participant_fails_validation() {
    with_env_vars(&[("INSTANCE_TYPE", "PARTICIPANT")], || {
        let config = ControllerConfig::from_env().expect("Should parse config");
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("instance_type"));
    });
}

#[test]
fn test_from_env_log_format() {
    with_env_vars(&[("LOG_FORMAT", "JSON")], || {
        let config = ControllerConfig::from_env().expect("Should parse config");
        assert_eq!(config.log_format, LogFormat::Json);
    });

    with_env_vars(&[("LOG_FORMAT", "anything-else")], || {
        let config = ControllerConfig::from_env().expect("Should parse config");
        assert_eq!(config.log_format, LogFormat::Pretty);
    });
}
