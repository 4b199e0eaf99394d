//! Built-in defaults (layer 1) and the resolved client configuration.

use serde::{Deserialize, Serialize};

use holloman_protocol::{DEFAULT_ACCELERATION, DEFAULT_MAX_ORDER, DEFAULT_SERVER_ADDRESS};

use crate::policy::CapabilityPolicy;

/// Built-in default configuration values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Target endpoint (default: localhost:50051)
    pub server_address: String,

    /// Requested acceleration mode (default: "default")
    pub acceleration: String,

    /// Order bound sent with the capability query (default: 1)
    pub max_order: i32,

    /// Per-call deadline in seconds (default: 10)
    pub timeout_seconds: u64,

    /// Connection timeout in seconds (default: 10)
    pub connect_timeout_seconds: u64,

    /// What to do with the capability response (default: advisory)
    pub capability_policy: CapabilityPolicy,

    /// Recompute and compare the buffer digest (default: false)
    pub verify_digest: bool,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            server_address: DEFAULT_SERVER_ADDRESS.to_string(),
            acceleration: DEFAULT_ACCELERATION.to_string(),
            max_order: DEFAULT_MAX_ORDER,
            timeout_seconds: 10,
            connect_timeout_seconds: 10,
            capability_policy: CapabilityPolicy::Advisory,
            verify_digest: false,
        }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "server_address": self.server_address,
            "acceleration": self.acceleration,
            "max_order": self.max_order,
            "timeout_seconds": self.timeout_seconds,
            "connect_timeout_seconds": self.connect_timeout_seconds,
            "capability_policy": self.capability_policy,
            "verify_digest": self.verify_digest,
        })
    }
}

/// Resolved configuration handed to the client constructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Target endpoint, `host:port` or a full `http://` URI.
    pub server_address: String,
    /// Acceleration hint for the capability query.
    pub acceleration: String,
    /// Order bound for the capability query.
    pub max_order: i32,
    pub timeout_seconds: u64,
    pub connect_timeout_seconds: u64,
    pub capability_policy: CapabilityPolicy,
    pub verify_digest: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let defaults = BuiltinDefaults::default();
        Self {
            server_address: defaults.server_address,
            acceleration: defaults.acceleration,
            max_order: defaults.max_order,
            timeout_seconds: defaults.timeout_seconds,
            connect_timeout_seconds: defaults.connect_timeout_seconds,
            capability_policy: defaults.capability_policy,
            verify_digest: defaults.verify_digest,
        }
    }
}

impl ClientConfig {
    /// Same defaults, different endpoint.
    pub fn for_address(server_address: impl Into<String>) -> Self {
        Self {
            server_address: server_address.into(),
            ..Self::default()
        }
    }

    /// Endpoint as a URI the transport can dial.
    pub fn endpoint_uri(&self) -> String {
        if self.server_address.contains("://") {
            self.server_address.clone()
        } else {
            format!("http://{}", self.server_address)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let defaults = BuiltinDefaults::default();
        assert_eq!(defaults.server_address, "localhost:50051");
        assert_eq!(defaults.acceleration, "default");
        assert_eq!(defaults.max_order, 1);
        assert_eq!(defaults.capability_policy, CapabilityPolicy::Advisory);
        assert!(!defaults.verify_digest);
    }

    #[test]
    fn test_to_value() {
        let value = BuiltinDefaults::default().to_value();

        assert_eq!(value["server_address"], "localhost:50051");
        assert_eq!(value["max_order"], 1);
        assert_eq!(value["capability_policy"], "advisory");
    }

    #[test]
    fn test_defaults_round_trip_into_client_config() {
        let value = BuiltinDefaults::default().to_value();
        let config: ClientConfig = serde_json::from_value(value).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_endpoint_uri() {
        assert_eq!(
            ClientConfig::default().endpoint_uri(),
            "http://localhost:50051"
        );
        assert_eq!(
            ClientConfig::for_address("http://10.0.0.5:50051").endpoint_uri(),
            "http://10.0.0.5:50051"
        );
    }
}
