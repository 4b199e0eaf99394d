//! RPC request messages.

use serde::{Deserialize, Serialize};

/// Capability query sent before any work is submitted.
///
/// Encodes as the service's `ServiceCapabilities` message (fields 1 and 2).
#[derive(Clone, PartialEq, Serialize, Deserialize, prost::Message)]
pub struct CapabilitiesRequest {
    /// Requested acceleration mode, e.g. `"default"`. Must be non-empty.
    #[prost(string, tag = "1")]
    pub acceleration: String,
    /// Highest order the client will accept. Must be at least 1.
    #[prost(int32, tag = "2")]
    pub max_order: i32,
}

impl CapabilitiesRequest {
    pub fn new(acceleration: impl Into<String>, max_order: i32) -> Self {
        Self {
            acceleration: acceleration.into(),
            max_order,
        }
    }

    /// Check the local preconditions. Returns a description of the first violation.
    pub fn validate(&self) -> Result<(), String> {
        if self.acceleration.is_empty() {
            return Err("acceleration must be non-empty".to_string());
        }
        if self.max_order < 1 {
            return Err(format!("max_order must be >= 1, got {}", self.max_order));
        }
        Ok(())
    }
}

/// Buffer submission.
#[derive(Clone, PartialEq, Serialize, Deserialize, prost::Message)]
pub struct BufferRequest {
    /// Raw content to process. Sent as-is, including when empty.
    #[prost(bytes = "vec", tag = "1")]
    #[serde(with = "hex::serde")]
    pub buffer: Vec<u8>,
    /// Optional label echoed back by the service.
    #[prost(string, tag = "2")]
    #[serde(default)]
    pub label: String,
}

impl BufferRequest {
    pub fn new(buffer: Vec<u8>) -> Self {
        Self {
            buffer,
            label: String::new(),
        }
    }

    /// Attach a label to the submission.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}
