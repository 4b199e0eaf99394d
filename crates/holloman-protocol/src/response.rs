//! RPC response messages.

use serde::{Deserialize, Serialize};

use crate::CapabilitiesRequest;

/// Capabilities reported by the service.
///
/// Shares its first two fields with [`crate::CapabilitiesRequest`]; the
/// service answers with the same message type it receives.
#[derive(Clone, PartialEq, Serialize, Deserialize, prost::Message)]
pub struct CapabilitiesResponse {
    /// Acceleration mode the service selected.
    #[prost(string, tag = "1")]
    pub acceleration: String,
    /// Highest order the service supports.
    #[prost(int32, tag = "2")]
    pub max_order: i32,
    /// Magic backend in use (e.g. `filemagic`).
    #[prost(string, tag = "3")]
    #[serde(default)]
    pub magic: String,
    /// Whether fuzzy hashing is enabled.
    #[prost(bool, tag = "4")]
    #[serde(default)]
    pub ssdeep: bool,
}

/// Result of a buffer submission.
#[derive(Clone, PartialEq, Serialize, Deserialize, prost::Message)]
pub struct BufferResponse {
    /// Order (degree) of the processed result.
    #[prost(int32, tag = "1")]
    pub order: i32,
    /// Content-derived identifier.
    #[prost(bytes = "vec", tag = "2")]
    #[serde(with = "hex::serde")]
    pub identifier: Vec<u8>,
    /// Opaque format/version marker.
    #[prost(uint32, tag = "3")]
    pub magic: u32,
    /// Label echoed from the request.
    #[prost(string, tag = "4")]
    #[serde(default)]
    pub label: String,
    /// Hex SHA-1 of the submitted buffer, when the service computes one.
    #[prost(string, tag = "5")]
    #[serde(default)]
    pub sha1: String,
    #[prost(string, tag = "6")]
    #[serde(default)]
    pub ssdeep: String,
    #[prost(string, tag = "7")]
    #[serde(default)]
    pub tlsh: String,
    #[prost(string, tag = "8")]
    #[serde(default)]
    pub sdhash: String,
}

impl BufferResponse {
    /// Lowercase hex encoding of the identifier, two digits per byte.
    pub fn identifier_hex(&self) -> String {
        hex::encode(&self.identifier)
    }
}

impl From<CapabilitiesRequest> for CapabilitiesResponse {
    /// Same wire message; the service-only fields start empty.
    fn from(request: CapabilitiesRequest) -> Self {
        Self {
            acceleration: request.acceleration,
            max_order: request.max_order,
            magic: String::new(),
            ssdeep: false,
        }
    }
}

impl From<CapabilitiesResponse> for CapabilitiesRequest {
    /// Keeps the two shared fields; `magic` and `ssdeep` have no request counterpart.
    fn from(response: CapabilitiesResponse) -> Self {
        Self::new(response.acceleration, response.max_order)
    }
}
