//! Protocol Client
//!
//! Drives the two-call exchange with the service: capability negotiation,
//! then buffer submission. One client is one session; the transport it
//! owns is released exactly once, on `close()` or on drop.

use std::fmt;
use std::io;

use holloman_protocol::{
    BufferRequest, BufferResponse, CapabilitiesRequest, CapabilitiesResponse, Method, RpcFailure,
    SERVICE_MIN_BUFFER_LEN,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{ClientConfig, ConfigError};

use super::transport::{Connector, Transport};

/// Client errors
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Rpc(#[from] RpcFailure),

    #[error("Cannot {operation} while session is {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    #[error("Service incompatible: {0}")]
    Incompatible(String),

    #[error("Identifier verification failed: service reported sha1 {reported}, computed {computed}")]
    DigestMismatch { reported: String, computed: String },

    #[error("Cannot read input {path}: {source}")]
    Input {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Cannot write output: {0}")]
    Output(#[source] io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Failure kind for exit code mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Usage, configuration, local input/output (exit code 1)
    Local = 1,
    /// Remote call did not complete (exit code 2)
    Rpc = 2,
    /// Capabilities rejected under the enforced policy (exit code 3)
    Incompatible = 3,
    /// Identifier verification failed (exit code 4)
    Digest = 4,
}

impl ClientError {
    /// Map error to failure kind for exit code
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            ClientError::Rpc(_) => FailureKind::Rpc,
            ClientError::Incompatible(_) => FailureKind::Incompatible,
            ClientError::DigestMismatch { .. } => FailureKind::Digest,
            ClientError::InvalidState { .. }
            | ClientError::Input { .. }
            | ClientError::Output(_)
            | ClientError::Config(_) => FailureKind::Local,
        }
    }

    /// Get exit code for this error
    pub fn exit_code(&self) -> i32 {
        self.failure_kind() as i32
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Constructed, no connection yet
    Idle,
    /// Connection held; calls allowed
    Connected,
    /// Connection released; terminal
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Connected => write!(f, "connected"),
            SessionState::Closed => write!(f, "closed"),
        }
    }
}

/// Holloman protocol client (one session)
pub struct ProtocolClient {
    config: ClientConfig,
    session_id: String,
    state: SessionState,
    transport: Option<Box<dyn Transport>>,
}

impl ProtocolClient {
    /// Create an idle client
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            session_id: uuid::Uuid::new_v4().to_string(),
            state: SessionState::Idle,
            transport: None,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Acquire the connection (Idle → Connected)
    pub fn connect(&mut self, connector: &dyn Connector) -> ClientResult<()> {
        self.require(SessionState::Idle, "connect")?;

        let transport = connector.connect(&self.config, &self.session_id)?;
        self.transport = Some(transport);
        self.state = SessionState::Connected;

        debug!(session = %self.session_id, address = %self.config.server_address, "session connected");
        Ok(())
    }

    /// Ask the service for its capabilities.
    ///
    /// The response is returned verbatim; nothing is negotiated locally.
    pub fn negotiate_capabilities(
        &mut self,
        acceleration: &str,
        max_order: i32,
    ) -> ClientResult<CapabilitiesResponse> {
        let request = CapabilitiesRequest::new(acceleration, max_order);
        request.validate().map_err(RpcFailure::invalid_argument)?;

        let session = self.session_id.clone();
        let transport = self.transport_for("negotiate capabilities")?;

        debug!(session = %session, method = %Method::Capabilities, acceleration, max_order, "issuing call");
        let response = transport.capabilities(request).map_err(|failure| {
            warn!(session = %session, method = %Method::Capabilities, code = %failure.code, "call failed");
            failure
        })?;

        debug!(
            session = %session,
            acceleration = %response.acceleration,
            max_order = response.max_order,
            "capabilities received"
        );
        Ok(response)
    }

    /// Negotiate with the acceleration hint and order bound from the config
    pub fn negotiate_configured(&mut self) -> ClientResult<CapabilitiesResponse> {
        let acceleration = self.config.acceleration.clone();
        let max_order = self.config.max_order;
        self.negotiate_capabilities(&acceleration, max_order)
    }

    /// Submit a buffer in one call and return the response as received
    pub fn submit_buffer(&mut self, data: Vec<u8>) -> ClientResult<BufferResponse> {
        self.submit(BufferRequest::new(data))
    }

    /// Submit a buffer with a label the service echoes back
    pub fn submit_labelled(&mut self, data: Vec<u8>, label: &str) -> ClientResult<BufferResponse> {
        self.submit(BufferRequest::new(data).with_label(label))
    }

    fn submit(&mut self, request: BufferRequest) -> ClientResult<BufferResponse> {
        let session = self.session_id.clone();
        let transport = self.transport_for("submit buffer")?;

        let len = request.buffer.len();
        if len < SERVICE_MIN_BUFFER_LEN {
            debug!(session = %session, len, "buffer shorter than the service minimum, sending anyway");
        }

        debug!(session = %session, method = %Method::ClusterBuffer, len, "issuing call");
        let response = transport.cluster_buffer(request).map_err(|failure| {
            warn!(session = %session, method = %Method::ClusterBuffer, code = %failure.code, "call failed");
            failure
        })?;

        debug!(session = %session, order = response.order, magic = response.magic, "buffer response received");
        Ok(response)
    }

    /// Release the connection. Later calls fail; repeated closes are no-ops.
    pub fn close(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close();
            debug!(session = %self.session_id, "session closed");
        }
        self.state = SessionState::Closed;
    }

    fn require(&self, expected: SessionState, operation: &'static str) -> ClientResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ClientError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    fn transport_for(&mut self, operation: &'static str) -> ClientResult<&mut Box<dyn Transport>> {
        self.require(SessionState::Connected, operation)?;
        let state = self.state;
        self.transport
            .as_mut()
            .ok_or(ClientError::InvalidState { operation, state })
    }
}

impl Drop for ProtocolClient {
    fn drop(&mut self) {
        self.close();
    }
}
