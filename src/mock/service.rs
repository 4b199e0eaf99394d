//! Mock Service Implementation
//!
//! Configurable mock of the Holloman service for testing both RPC methods.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use holloman_protocol::{
    BufferRequest, BufferResponse, CapabilitiesRequest, CapabilitiesResponse, Method, RpcFailure,
    StatusCode, SERVICE_MIN_BUFFER_LEN,
};
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::policy::required_order;

use super::failure::{FailureConfig, FailureInjector};
use super::state::MockState;

/// Leading identifier byte, indexed by order.
const ORDER_ALPHABET: &[u8] = b"  cdefghijkmnopqrstuvwxyz";

/// Number of digest bytes carried in a generated identifier.
const IDENTIFIER_DIGEST_LEN: usize = 16;

/// Configurable capabilities for the mock service
#[derive(Debug, Clone)]
pub struct MockCapabilities {
    pub acceleration: String,
    /// Highest order the service can map
    pub max_order: i32,
    /// Magic backend name reported by `Capabilities`
    pub magic_backend: String,
    pub ssdeep: bool,
    /// Marker returned in every `BufferResponse.magic`
    pub magic_marker: u32,
    /// Buffers shorter than this are rejected
    pub min_buffer_len: usize,
}

impl Default for MockCapabilities {
    fn default() -> Self {
        Self {
            acceleration: "none".to_string(),
            max_order: 12,
            magic_backend: "filemagic".to_string(),
            ssdeep: false,
            magic_marker: 1,
            min_buffer_len: SERVICE_MIN_BUFFER_LEN,
        }
    }
}

/// Configurable mock service for testing.
///
/// Cloning yields another handle to the same service, so a test can keep
/// one handle for assertions while the client owns a transport.
#[derive(Clone, Default)]
pub struct MockService {
    state: Arc<Mutex<MockState>>,
    failures: Arc<Mutex<FailureInjector>>,
    capabilities: Arc<Mutex<MockCapabilities>>,
    /// Fixed response for every successful `ClusterBuffer`
    canned_response: Arc<Mutex<Option<BufferResponse>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capabilities(capabilities: MockCapabilities) -> Self {
        let service = Self::new();
        *lock(&service.capabilities) = capabilities;
        service
    }

    // === Test configuration ===

    /// Accept buffers of any length
    pub fn accept_any_length(&self) {
        lock(&self.capabilities).min_buffer_len = 0;
    }

    pub fn set_max_order(&self, max_order: i32) {
        lock(&self.capabilities).max_order = max_order;
    }

    pub fn set_acceleration(&self, acceleration: &str) {
        lock(&self.capabilities).acceleration = acceleration.to_string();
    }

    /// Answer every successful `ClusterBuffer` with this response
    pub fn respond_with(&self, response: BufferResponse) {
        *lock(&self.canned_response) = Some(response);
    }

    /// Inject an error for a method
    pub fn inject_error(&self, method: Method, code: StatusCode, details: &str) {
        lock(&self.failures).inject_error(method, code, details);
    }

    /// Inject a failure configuration for a method
    pub fn inject_failure(&self, method: Method, config: FailureConfig) {
        lock(&self.failures).inject(method, config);
    }

    pub fn clear_failures(&self) {
        lock(&self.failures).clear();
    }

    /// Reject new connections with UNAVAILABLE
    pub fn refuse_connections(&self) {
        lock(&self.state).refuse_connections = true;
    }

    // === Observations ===

    pub fn calls(&self) -> Vec<Method> {
        lock(&self.state).calls.clone()
    }

    pub fn call_count(&self, method: Method) -> usize {
        lock(&self.state).call_count(method)
    }

    pub fn capability_requests(&self) -> Vec<CapabilitiesRequest> {
        lock(&self.state).capability_requests.clone()
    }

    pub fn buffer_requests(&self) -> Vec<BufferRequest> {
        lock(&self.state).buffer_requests.clone()
    }

    pub fn connection_count(&self) -> u32 {
        lock(&self.state).connections
    }

    pub fn close_count(&self) -> u32 {
        lock(&self.state).closes
    }

    // === Lifecycle ===

    pub(crate) fn accept_connection(&self) -> Result<(), RpcFailure> {
        let mut state = lock(&self.state);
        if state.refuse_connections {
            return Err(RpcFailure::unavailable("connection refused"));
        }
        state.connections += 1;
        Ok(())
    }

    pub(crate) fn record_close(&self) {
        lock(&self.state).closes += 1;
    }

    // === Request handling ===

    /// Handle a `Capabilities` call
    pub fn capabilities(
        &self,
        request: CapabilitiesRequest,
    ) -> Result<CapabilitiesResponse, RpcFailure> {
        {
            let mut state = lock(&self.state);
            state.calls.push(Method::Capabilities);
            state.capability_requests.push(request);
        }

        if let Some(failure) = lock(&self.failures).check(Method::Capabilities) {
            return Err(failure);
        }

        let caps = lock(&self.capabilities);
        Ok(CapabilitiesResponse {
            acceleration: caps.acceleration.clone(),
            max_order: caps.max_order,
            magic: caps.magic_backend.clone(),
            ssdeep: caps.ssdeep,
        })
    }

    /// Handle a `ClusterBuffer` call
    pub fn cluster_buffer(&self, request: BufferRequest) -> Result<BufferResponse, RpcFailure> {
        {
            let mut state = lock(&self.state);
            state.calls.push(Method::ClusterBuffer);
            state.buffer_requests.push(request.clone());
        }

        if let Some(failure) = lock(&self.failures).check(Method::ClusterBuffer) {
            return Err(failure);
        }

        if let Some(response) = lock(&self.canned_response).clone() {
            return Ok(response);
        }

        let caps = lock(&self.capabilities).clone();
        let len = request.buffer.len();

        // The reference service reports these as plain errors, which surface as UNKNOWN.
        if len < caps.min_buffer_len {
            return Err(RpcFailure::new(
                StatusCode::Unknown,
                format!(
                    "buffer length of {} is too small. minimum length is {}",
                    len, caps.min_buffer_len
                ),
            ));
        }

        let order = required_order(len);
        if order > caps.max_order {
            return Err(RpcFailure::new(
                StatusCode::Unknown,
                format!(
                    "buffer too large, max order {}, it requires a curve of at least order {}",
                    caps.max_order, order
                ),
            ));
        }

        Ok(BufferResponse {
            order,
            identifier: derive_identifier(order, &request.buffer),
            magic: caps.magic_marker,
            label: request.label,
            sha1: hex::encode(Sha1::digest(&request.buffer)),
            ..Default::default()
        })
    }
}

/// Order letter followed by a truncated content digest.
fn derive_identifier(order: i32, buffer: &[u8]) -> Vec<u8> {
    let letter = usize::try_from(order)
        .ok()
        .and_then(|i| ORDER_ALPHABET.get(i).copied())
        .unwrap_or(b'?');

    let digest = Sha256::digest(buffer);
    let mut identifier = Vec::with_capacity(1 + IDENTIFIER_DIGEST_LEN);
    identifier.push(letter);
    identifier.extend_from_slice(&digest[..IDENTIFIER_DIGEST_LEN]);
    identifier
}
