//! Configuration Layering Tests
//!
//! Precedence is CLI > environment > file > builtin.

use std::io::Write;

use holloman_client::config::{env_layer, ConfigOrigin, EffectiveConfig};
use holloman_client::CapabilityPolicy;
use serde_json::json;
use tempfile::NamedTempFile;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn env(vars: &[(&str, &str)]) -> serde_json::Value {
    env_layer(vars.iter().map(|(k, v)| (k.to_string(), v.to_string()))).unwrap()
}

#[test]
fn test_builtin_defaults() {
    let effective = EffectiveConfig::build(None, None, None).unwrap();
    let config = effective.to_client_config().unwrap();

    assert_eq!(config.server_address, "localhost:50051");
    assert_eq!(config.acceleration, "default");
    assert_eq!(config.max_order, 1);
    assert_eq!(config.capability_policy, CapabilityPolicy::Advisory);
    assert!(!config.verify_digest);
}

#[test]
fn test_precedence() {
    let file = config_file(
        r#"
server_address = "file-host:1"
acceleration = "avx2"
max_order = 4
timeout_seconds = 30
"#,
    );

    let effective = EffectiveConfig::build(
        Some(file.path()),
        Some(env(&[("HOLLOMAN_SERVER", "env-host:2"), ("HOLLOMAN_MAX_ORDER", "6")])),
        Some(json!({ "server_address": "cli-host:3" })),
    )
    .unwrap();
    let config = effective.to_client_config().unwrap();

    assert_eq!(config.server_address, "cli-host:3", "CLI wins");
    assert_eq!(config.max_order, 6, "env beats file");
    assert_eq!(config.acceleration, "avx2", "file beats builtin");
    assert_eq!(config.timeout_seconds, 30);

    let origins: Vec<_> = effective.sources.iter().map(|s| s.origin.clone()).collect();
    assert_eq!(
        origins,
        vec![ConfigOrigin::Builtin, ConfigOrigin::File, ConfigOrigin::Env, ConfigOrigin::Cli]
    );
    assert_eq!(effective.sources[1].digest.as_ref().map(String::len), Some(64));
}

#[test]
fn test_policy_from_file() {
    let file = config_file("capability_policy = \"enforce\"\nverify_digest = true\n");
    let config = EffectiveConfig::build(Some(file.path()), None, None)
        .unwrap()
        .to_client_config()
        .unwrap();

    assert_eq!(config.capability_policy, CapabilityPolicy::Enforce);
    assert!(config.verify_digest);
}

#[test]
fn test_validation_failures() {
    for overrides in [
        json!({ "max_order": 0 }),
        json!({ "acceleration": "" }),
        json!({ "server_address": "  " }),
        json!({ "timeout_seconds": 0 }),
        json!({ "timeout_seconds": 3601 }),
    ] {
        assert!(
            EffectiveConfig::build(None, None, Some(overrides.clone())).is_err(),
            "{overrides} should be rejected"
        );
    }
}

#[test]
fn test_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    assert!(EffectiveConfig::build(Some(&missing), None, None).is_err());
}

#[test]
fn test_bad_env_value() {
    let result = env_layer(vec![("HOLLOMAN_MAX_ORDER".to_string(), "lots".to_string())]);
    assert!(result.is_err());
}
