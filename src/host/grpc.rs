//! gRPC transport
//!
//! Blocking facade over a tonic channel. Each transport owns a private
//! current-thread runtime and drives one call at a time on it, so the
//! client stays synchronous and sessions share nothing.

use std::time::Duration;

use holloman_protocol::{
    BufferRequest, BufferResponse, CapabilitiesRequest, CapabilitiesResponse, Method, RpcFailure,
    StatusCode,
};
use tokio::runtime::{Builder, Runtime};
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::metadata::{Ascii, MetadataValue};
use tonic::transport::{Channel, Endpoint};
use tonic::{Request, Status};
use tracing::debug;

use crate::config::ClientConfig;

use super::transport::{Connector, Transport};

/// Metadata key carrying the session id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Connector that dials the configured endpoint over plaintext HTTP/2.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrpcConnector;

impl Connector for GrpcConnector {
    fn connect(
        &self,
        config: &ClientConfig,
        session_id: &str,
    ) -> Result<Box<dyn Transport>, RpcFailure> {
        Ok(Box::new(GrpcTransport::connect(config, session_id)?))
    }
}

/// gRPC transport for production use
pub struct GrpcTransport {
    runtime: Runtime,
    /// None once released
    channel: Option<Channel>,
    timeout: Duration,
    session_id: String,
}

impl GrpcTransport {
    /// Establish the connection, bounded by `connect_timeout_seconds`.
    pub fn connect(config: &ClientConfig, session_id: &str) -> Result<Self, RpcFailure> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| RpcFailure::internal(format!("failed to start I/O runtime: {}", e)))?;

        let endpoint = Endpoint::from_shared(config.endpoint_uri())
            .map_err(|e| {
                RpcFailure::invalid_argument(format!(
                    "invalid server address '{}': {}",
                    config.server_address, e
                ))
            })?
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds));

        debug!(address = %config.server_address, session = session_id, "connecting");

        let channel = runtime.block_on(endpoint.connect()).map_err(|e| {
            RpcFailure::unavailable(format!(
                "failed to connect to {}: {}",
                config.server_address, e
            ))
        })?;

        Ok(Self {
            runtime,
            channel: Some(channel),
            timeout: Duration::from_secs(config.timeout_seconds),
            session_id: session_id.to_string(),
        })
    }

    /// Issue one unary call and wait for its outcome or the deadline.
    fn unary<Req, Resp>(&mut self, method: Method, message: Req) -> Result<Resp, RpcFailure>
    where
        Req: prost::Message + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static,
    {
        let channel = self
            .channel
            .clone()
            .ok_or_else(|| RpcFailure::unavailable("connection already released"))?;

        let mut request = Request::new(message);
        if let Ok(value) = self.session_id.parse::<MetadataValue<Ascii>>() {
            request.metadata_mut().insert(REQUEST_ID_HEADER, value);
        }

        let call = async move {
            let mut grpc = tonic::client::Grpc::new(channel);
            grpc.ready()
                .await
                .map_err(|e| Status::unavailable(format!("service was not ready: {}", e)))?;
            let codec: ProstCodec<Req, Resp> = ProstCodec::default();
            grpc.unary(request, PathAndQuery::from_static(method.path()), codec)
                .await
        };

        let timeout = self.timeout;
        let response = self
            .runtime
            .block_on(async { tokio::time::timeout(timeout, call).await })
            .map_err(|_| RpcFailure::deadline_exceeded(timeout.as_secs()))?
            .map_err(status_to_failure)?;

        Ok(response.into_inner())
    }
}

impl Transport for GrpcTransport {
    fn capabilities(
        &mut self,
        request: CapabilitiesRequest,
    ) -> Result<CapabilitiesResponse, RpcFailure> {
        self.unary(Method::Capabilities, request)
    }

    fn cluster_buffer(&mut self, request: BufferRequest) -> Result<BufferResponse, RpcFailure> {
        self.unary(Method::ClusterBuffer, request)
    }

    fn close(&mut self) {
        if self.channel.take().is_some() {
            debug!(session = %self.session_id, "channel released");
        }
    }
}

/// Convert a transport status into the protocol failure type.
pub fn status_to_failure(status: Status) -> RpcFailure {
    RpcFailure::new(
        StatusCode::from_i32(status.code() as i32),
        status.message().to_string(),
    )
}
