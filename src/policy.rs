//! Capability Gating and Identifier Verification
//!
//! The capability response is advisory unless the caller opts into
//! enforcement. Either way the same checks run; the policy decides
//! whether an issue is logged or stops the submission.

use holloman_protocol::{BufferResponse, CapabilitiesRequest, CapabilitiesResponse, DEFAULT_ACCELERATION};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use tracing::warn;

use crate::host::{ClientError, ClientResult};

/// What to do when the service's capabilities look incompatible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityPolicy {
    /// Log each issue and submit anyway
    #[default]
    Advisory,
    /// Refuse to submit
    Enforce,
}

impl CapabilityPolicy {
    /// Apply the policy to a list of issues from [`assess_capabilities`].
    pub fn apply(&self, issues: &[String]) -> ClientResult<()> {
        if issues.is_empty() {
            return Ok(());
        }
        match self {
            CapabilityPolicy::Advisory => {
                for issue in issues {
                    warn!(issue = %issue, "capability mismatch ignored (advisory policy)");
                }
                Ok(())
            }
            CapabilityPolicy::Enforce => Err(ClientError::Incompatible(issues.join("; "))),
        }
    }
}

/// Smallest curve order able to hold `len` bytes (ceil(log4(len))).
pub fn required_order(len: usize) -> i32 {
    if len == 0 {
        return 0;
    }
    let bits = usize::BITS - (len - 1).leading_zeros();
    ((bits + 1) >> 1) as i32
}

/// Compare what was asked for with what the service offers.
///
/// Returns one human-readable line per issue; empty means compatible.
pub fn assess_capabilities(
    requested: &CapabilitiesRequest,
    offered: &CapabilitiesResponse,
    buffer_len: usize,
) -> Vec<String> {
    let mut issues = Vec::new();

    if offered.max_order < 1 {
        issues.push(format!(
            "service reports max_order {}, it cannot process buffers",
            offered.max_order
        ));
    }

    if offered.max_order >= 1 && offered.max_order < requested.max_order {
        issues.push(format!(
            "requested max_order {} but service supports up to {}",
            requested.max_order, offered.max_order
        ));
    }

    if requested.acceleration != DEFAULT_ACCELERATION
        && offered.acceleration != requested.acceleration
    {
        issues.push(format!(
            "requested acceleration '{}' but service offers '{}'",
            requested.acceleration, offered.acceleration
        ));
    }

    let needed = required_order(buffer_len);
    if offered.max_order >= 1 && needed > offered.max_order {
        issues.push(format!(
            "buffer of {} bytes needs order {}, service supports up to {}",
            buffer_len, needed, offered.max_order
        ));
    }

    issues
}

/// Outcome of comparing the service's digest with a local one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DigestCheck {
    Verified,
    /// The service did not report a digest
    NotReported,
    Mismatch { reported: String, computed: String },
}

/// Lowercase hex SHA-1 of a buffer, as the service reports it.
pub fn buffer_digest(buffer: &[u8]) -> String {
    hex::encode(Sha1::digest(buffer))
}

/// Check the response's `sha1` against a digest computed before submission.
pub fn verify_digest(computed: &str, response: &BufferResponse) -> DigestCheck {
    let reported = response.sha1.trim();
    if reported.is_empty() {
        return DigestCheck::NotReported;
    }
    if reported.eq_ignore_ascii_case(computed) {
        DigestCheck::Verified
    } else {
        DigestCheck::Mismatch {
            reported: reported.to_string(),
            computed: computed.to_string(),
        }
    }
}

impl DigestCheck {
    /// Turn a mismatch into an error; other outcomes pass.
    pub fn into_result(self) -> ClientResult<()> {
        match self {
            DigestCheck::Mismatch { reported, computed } => {
                Err(ClientError::DigestMismatch { reported, computed })
            }
            DigestCheck::NotReported => {
                warn!("service did not report a digest; identifier not verified");
                Ok(())
            }
            DigestCheck::Verified => Ok(()),
        }
    }
}
