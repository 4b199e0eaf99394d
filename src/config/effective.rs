//! Effective configuration with provenance
//!
//! Merges the layers, records where each one came from, validates the
//! result and converts it into a [`ClientConfig`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

use super::defaults::{BuiltinDefaults, ClientConfig};
use super::merge::merge_layers;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "HOLLOMAN_CONFIG";

/// Environment variables recognised by [`env_layer`], with their config keys.
const ENV_KEYS: &[(&str, &str)] = &[
    ("HOLLOMAN_SERVER", "server_address"),
    ("HOLLOMAN_ACCELERATION", "acceleration"),
    ("HOLLOMAN_MAX_ORDER", "max_order"),
    ("HOLLOMAN_TIMEOUT", "timeout_seconds"),
];

/// Origin of a configuration source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    File,
    Env,
    Cli,
}

/// A contributing config source with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSource {
    pub origin: ConfigOrigin,

    /// File path (file layer only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 of the raw file bytes (file layer only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Merged configuration plus the sources that produced it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    /// When this config was computed
    pub created_at: DateTime<Utc>,

    /// The merged configuration object
    pub config: Value,

    /// Contributing sources in precedence order
    pub sources: Vec<ConfigSource>,
}

impl EffectiveConfig {
    /// Build effective config from layers.
    ///
    /// A named config file must exist; empty layers are skipped.
    pub fn build(
        config_path: Option<&Path>,
        env_overrides: Option<Value>,
        cli_overrides: Option<Value>,
    ) -> Result<Self, ConfigError> {
        let mut layers = vec![BuiltinDefaults::default().to_value()];
        let mut sources = vec![ConfigSource {
            origin: ConfigOrigin::Builtin,
            path: None,
            digest: None,
        }];

        if let Some(path) = config_path {
            let (value, digest) = Self::load_toml_file(path)?;
            layers.push(value);
            sources.push(ConfigSource {
                origin: ConfigOrigin::File,
                path: Some(path.to_string_lossy().to_string()),
                digest: Some(digest),
            });
        }

        for (origin, layer) in [(ConfigOrigin::Env, env_overrides), (ConfigOrigin::Cli, cli_overrides)] {
            if let Some(value) = layer.filter(|v| v.as_object().map_or(true, |m| !m.is_empty())) {
                layers.push(value);
                sources.push(ConfigSource {
                    origin,
                    path: None,
                    digest: None,
                });
            }
        }

        let merged = merge_layers(layers);
        Self::validate_config(&merged)?;

        Ok(Self {
            created_at: Utc::now(),
            config: merged,
            sources,
        })
    }

    /// Load and parse a TOML file, returning the value and digest
    fn load_toml_file(path: &Path) -> Result<(Value, String), ConfigError> {
        let bytes = fs::read(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;

        let digest = hex::encode(Sha256::digest(&bytes));

        let contents = String::from_utf8(bytes)
            .map_err(|e| ConfigError::ParseError(format!("Invalid UTF-8: {}", e)))?;

        let toml_value: toml::Value = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?;

        Ok((Self::toml_to_json(toml_value), digest))
    }

    /// Convert TOML Value to JSON Value
    fn toml_to_json(toml: toml::Value) -> Value {
        match toml {
            toml::Value::String(s) => Value::String(s),
            toml::Value::Integer(i) => Value::Number(i.into()),
            toml::Value::Float(f) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            toml::Value::Boolean(b) => Value::Bool(b),
            toml::Value::Datetime(dt) => Value::String(dt.to_string()),
            toml::Value::Array(arr) => {
                Value::Array(arr.into_iter().map(Self::toml_to_json).collect())
            }
            toml::Value::Table(table) => Value::Object(
                table
                    .into_iter()
                    .map(|(k, v)| (k, Self::toml_to_json(v)))
                    .collect(),
            ),
        }
    }

    /// Validate configuration values
    fn validate_config(config: &Value) -> Result<(), ConfigError> {
        match config.get("server_address").and_then(|v| v.as_str()) {
            Some(addr) if !addr.trim().is_empty() => {}
            _ => {
                return Err(ConfigError::ValidationError(
                    "server_address must be a non-empty string".to_string(),
                ))
            }
        }

        match config.get("acceleration").and_then(|v| v.as_str()) {
            Some(mode) if !mode.is_empty() => {}
            _ => {
                return Err(ConfigError::ValidationError(
                    "acceleration must be a non-empty string".to_string(),
                ))
            }
        }

        match config.get("max_order").and_then(|v| v.as_i64()) {
            Some(order) if (1..=i64::from(i32::MAX)).contains(&order) => {}
            _ => {
                return Err(ConfigError::ValidationError(
                    "max_order must be an integer >= 1".to_string(),
                ))
            }
        }

        // timeout_seconds must be in (0, 3600]
        if let Some(timeout) = config.get("timeout_seconds").and_then(|v| v.as_u64()) {
            if timeout == 0 || timeout > 3600 {
                return Err(ConfigError::ValidationError(
                    "timeout_seconds must be in (0, 3600]".to_string(),
                ));
            }
        }

        // connect_timeout_seconds must be in (0, 300]
        if let Some(connect) = config.get("connect_timeout_seconds").and_then(|v| v.as_u64()) {
            if connect == 0 || connect > 300 {
                return Err(ConfigError::ValidationError(
                    "connect_timeout_seconds must be in (0, 300]".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Deserialize the merged object into a [`ClientConfig`]
    pub fn to_client_config(&self) -> Result<ClientConfig, ConfigError> {
        serde_json::from_value(self.config.clone())
            .map_err(|e| ConfigError::ValidationError(e.to_string()))
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Get a config value by path (dot-separated)
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut current = &self.config;
        for part in path.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    pub fn get_u64(&self, path: &str) -> Option<u64> {
        self.get(path).and_then(|v| v.as_u64())
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|v| v.as_str())
    }
}

/// Build the environment layer from `HOLLOMAN_*` variables.
///
/// Takes the variables as an iterator so callers can pass
/// `std::env::vars()` or a fixed list.
pub fn env_layer<I>(vars: I) -> Result<Value, ConfigError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut layer = Map::new();

    for (name, raw) in vars {
        let Some((_, key)) = ENV_KEYS.iter().find(|(env, _)| *env == name) else {
            continue;
        };

        let value = match *key {
            "max_order" | "timeout_seconds" => {
                let number: i64 = raw.trim().parse().map_err(|_| {
                    ConfigError::ParseError(format!("{} must be an integer, got '{}'", name, raw))
                })?;
                Value::from(number)
            }
            _ => Value::String(raw),
        };
        layer.insert(key.to_string(), value);
    }

    Ok(Value::Object(layer))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::CapabilityPolicy;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_build_with_defaults_only() {
        let config = EffectiveConfig::build(None, None, None).unwrap();

        assert_eq!(config.get_str("server_address"), Some("localhost:50051"));
        assert_eq!(config.get_u64("max_order"), Some(1));
        assert_eq!(config.sources.len(), 1);
        assert_eq!(config.sources[0].origin, ConfigOrigin::Builtin);
    }

    #[test]
    fn test_build_with_cli_override() {
        let cli = serde_json::json!({"server_address": "10.1.2.3:50051"});

        let config = EffectiveConfig::build(None, None, Some(cli)).unwrap();
        let client = config.to_client_config().unwrap();

        assert_eq!(client.server_address, "10.1.2.3:50051");
        assert_eq!(client.acceleration, "default");
    }

    #[test]
    fn test_cli_beats_env_beats_file() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "server_address = \"file-host:1\"").unwrap();
        writeln!(temp, "acceleration = \"file-mode\"").unwrap();
        writeln!(temp, "max_order = 2").unwrap();

        let env = env_layer(vars(&[
            ("HOLLOMAN_ACCELERATION", "env-mode"),
            ("HOLLOMAN_MAX_ORDER", "3"),
        ]))
        .unwrap();
        let cli = serde_json::json!({"max_order": 4});

        let config = EffectiveConfig::build(Some(temp.path()), Some(env), Some(cli)).unwrap();
        let client = config.to_client_config().unwrap();

        assert_eq!(client.server_address, "file-host:1");
        assert_eq!(client.acceleration, "env-mode");
        assert_eq!(client.max_order, 4);

        let origins: Vec<_> = config.sources.iter().map(|s| s.origin.clone()).collect();
        assert_eq!(
            origins,
            vec![ConfigOrigin::Builtin, ConfigOrigin::File, ConfigOrigin::Env, ConfigOrigin::Cli]
        );
    }

    #[test]
    fn test_file_digest_recorded() {
        let mut temp = NamedTempFile::new().unwrap();
        write!(temp, "max_order = 2\n").unwrap();

        let config = EffectiveConfig::build(Some(temp.path()), None, None).unwrap();
        let digest = config.sources[1].digest.as_deref().unwrap();

        assert_eq!(digest, hex::encode(Sha256::digest(b"max_order = 2\n")));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = EffectiveConfig::build(Some(Path::new("/nonexistent/holloman.toml")), None, None);
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }

    #[test]
    fn test_policy_from_file() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "capability_policy = \"enforce\"").unwrap();
        writeln!(temp, "verify_digest = true").unwrap();

        let client = EffectiveConfig::build(Some(temp.path()), None, None)
            .unwrap()
            .to_client_config()
            .unwrap();

        assert_eq!(client.capability_policy, CapabilityPolicy::Enforce);
        assert!(client.verify_digest);
    }

    #[test]
    fn test_validation_max_order() {
        let cli = serde_json::json!({"max_order": 0});
        let result = EffectiveConfig::build(None, None, Some(cli));
        assert!(result.unwrap_err().to_string().contains("max_order"));
    }

    #[test]
    fn test_validation_empty_acceleration() {
        let cli = serde_json::json!({"acceleration": ""});
        let result = EffectiveConfig::build(None, None, Some(cli));
        assert!(result.unwrap_err().to_string().contains("acceleration"));
    }

    #[test]
    fn test_validation_connect_timeout() {
        let cli = serde_json::json!({"connect_timeout_seconds": 500});
        let result = EffectiveConfig::build(None, None, Some(cli));
        assert!(result.unwrap_err().to_string().contains("connect_timeout_seconds"));
    }

    #[test]
    fn test_env_layer_ignores_unrelated_vars() {
        let layer = env_layer(vars(&[("PATH", "/usr/bin"), ("HOLLOMAN_SERVER", "h:1")])).unwrap();
        assert_eq!(layer, serde_json::json!({"server_address": "h:1"}));
    }

    #[test]
    fn test_env_layer_rejects_bad_integer() {
        let result = env_layer(vars(&[("HOLLOMAN_MAX_ORDER", "many")]));
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_empty_env_layer_not_recorded() {
        let config = EffectiveConfig::build(None, Some(serde_json::json!({})), None).unwrap();
        assert_eq!(config.sources.len(), 1);
    }
}
