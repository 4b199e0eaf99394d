//! RPC method table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unary methods exposed by the Holloman service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Capability discovery. Request and response share one message layout.
    Capabilities,
    /// Submit a buffer and receive its order, identifier and magic.
    ClusterBuffer,
}

impl Method {
    /// Method name as registered on the service.
    pub fn name(&self) -> &'static str {
        match self {
            Method::Capabilities => names::CAPABILITIES,
            Method::ClusterBuffer => names::CLUSTER_BUFFER,
        }
    }

    /// HTTP/2 path for the method.
    pub fn path(&self) -> &'static str {
        match self {
            Method::Capabilities => paths::CAPABILITIES,
            Method::ClusterBuffer => paths::CLUSTER_BUFFER,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Known method names.
pub mod names {
    pub const CAPABILITIES: &str = "Capabilities";
    pub const CLUSTER_BUFFER: &str = "ClusterBuffer";
}

/// Request paths (`/<service>/<method>`).
pub mod paths {
    pub const CAPABILITIES: &str = "/HuntingHash.Holloman/Capabilities";
    pub const CLUSTER_BUFFER: &str = "/HuntingHash.Holloman/ClusterBuffer";
}
