//! Transport Layer for the Protocol Client
//!
//! Abstracts the RPC channel for testability. Provides:
//! - Transport trait: one method per unary call plus release
//! - Connector trait: opens a transport for a session
//! - MockTransport: in-process mock service for tests

use holloman_protocol::{
    BufferRequest, BufferResponse, CapabilitiesRequest, CapabilitiesResponse, RpcFailure,
};

use crate::config::ClientConfig;
use crate::mock::MockService;

/// An open channel to the service.
///
/// Implementations are exclusively owned by one client session.
pub trait Transport: Send {
    /// Issue the `Capabilities` call
    fn capabilities(
        &mut self,
        request: CapabilitiesRequest,
    ) -> Result<CapabilitiesResponse, RpcFailure>;

    /// Issue the `ClusterBuffer` call
    fn cluster_buffer(&mut self, request: BufferRequest) -> Result<BufferResponse, RpcFailure>;

    /// Release the underlying connection. Called exactly once per session.
    fn close(&mut self);
}

/// Opens transports.
pub trait Connector {
    fn connect(
        &self,
        config: &ClientConfig,
        session_id: &str,
    ) -> Result<Box<dyn Transport>, RpcFailure>;
}

/// Mock transport for testing - talks directly to a MockService in-process
pub struct MockTransport {
    service: MockService,
}

impl MockTransport {
    pub fn new(service: MockService) -> Self {
        Self { service }
    }

    /// Get a handle to the underlying mock service for assertions
    pub fn service(&self) -> &MockService {
        &self.service
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new(MockService::new())
    }
}

impl Transport for MockTransport {
    fn capabilities(
        &mut self,
        request: CapabilitiesRequest,
    ) -> Result<CapabilitiesResponse, RpcFailure> {
        self.service.capabilities(request)
    }

    fn cluster_buffer(&mut self, request: BufferRequest) -> Result<BufferResponse, RpcFailure> {
        self.service.cluster_buffer(request)
    }

    fn close(&mut self) {
        self.service.record_close();
    }
}

impl Connector for MockService {
    fn connect(
        &self,
        _config: &ClientConfig,
        _session_id: &str,
    ) -> Result<Box<dyn Transport>, RpcFailure> {
        self.accept_connection()?;
        Ok(Box::new(MockTransport::new(self.clone())))
    }
}
