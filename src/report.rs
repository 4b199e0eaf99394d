//! Result rendering
//!
//! Human output mirrors what the service returned, one field per line,
//! and ends with the identifier as a bare hex line so scripts can take
//! the last line. `--json` output is a single versioned document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use holloman_protocol::{BufferResponse, CapabilitiesResponse, RpcFailure, StatusCode};

use crate::host::{ClientError, FailureKind};

/// Schema version for the JSON report
pub const REPORT_SCHEMA_VERSION: u32 = 1;

/// Schema identifier for the JSON report
pub const REPORT_SCHEMA_ID: &str = "holloman/report@1";

/// Capability block printed before submission.
pub fn render_capabilities(caps: &CapabilitiesResponse) -> String {
    let mut out = String::from("Service capabilities received:\n");
    out.push_str(&format!("Acceleration: {}\n", caps.acceleration));
    out.push_str(&format!("MaxOrder: {}\n", caps.max_order));
    out
}

/// Buffer response block. The last line is the identifier alone.
pub fn render(response: &BufferResponse) -> String {
    let hex = response.identifier_hex();

    let mut out = String::from("Buffer Response received:\n");
    out.push_str(&format!("HOrder: {}\n", response.order));
    out.push_str(&format!("Identifier: {}\n", hex));
    out.push_str(&format!("Magic: {}\n", response.magic));
    out.push_str(&hex);
    out.push('\n');
    out
}

/// Failure report for stderr.
pub fn render_failure(failure: &RpcFailure) -> String {
    format!("RPC failed: {}\nDetails: {}\n", failure.code, failure.details)
}

/// Machine-readable report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonReport {
    pub schema_version: u32,
    pub schema_id: String,

    /// Session that produced this report
    pub session_id: String,

    pub server_address: String,

    pub created_at: DateTime<Utc>,

    /// Capabilities exactly as the service reported them
    pub capabilities: CapabilitiesResponse,

    /// Buffer response exactly as the service reported it
    pub response: BufferResponse,

    /// Identifier as lowercase hex
    pub identifier_hex: String,

    /// Number of bytes submitted
    pub buffer_len: usize,

    /// Capability issues seen under the advisory policy
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capability_issues: Vec<String>,

    /// Whether the identifier digest was checked and matched
    pub verified: bool,
}

impl JsonReport {
    pub fn new(
        session_id: &str,
        server_address: &str,
        capabilities: CapabilitiesResponse,
        response: BufferResponse,
        buffer_len: usize,
    ) -> Self {
        let identifier_hex = response.identifier_hex();
        Self {
            schema_version: REPORT_SCHEMA_VERSION,
            schema_id: REPORT_SCHEMA_ID.to_string(),
            session_id: session_id.to_string(),
            server_address: server_address.to_string(),
            created_at: Utc::now(),
            capabilities,
            response,
            identifier_hex,
            buffer_len,
            capability_issues: Vec::new(),
            verified: false,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Failure document for `--json` mode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonFailure {
    pub schema_version: u32,
    pub schema_id: String,
    pub created_at: DateTime<Utc>,

    pub kind: FailureKind,
    pub exit_code: i32,

    /// Status code, for failed remote calls only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<StatusCode>,

    pub details: String,
}

impl From<&ClientError> for JsonFailure {
    fn from(error: &ClientError) -> Self {
        let (code, details) = match error {
            ClientError::Rpc(failure) => (Some(failure.code), failure.details.clone()),
            other => (None, other.to_string()),
        };
        Self {
            schema_version: REPORT_SCHEMA_VERSION,
            schema_id: REPORT_SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            kind: error.failure_kind(),
            exit_code: error.exit_code(),
            code,
            details,
        }
    }
}
