//! Client-Side Components
//!
//! The session-owning protocol client and the transports it drives:
//! gRPC for real services, an in-process mock for tests.

pub mod grpc;
pub mod rpc;
pub mod transport;

pub use grpc::{GrpcConnector, GrpcTransport};
pub use rpc::{ClientError, ClientResult, FailureKind, ProtocolClient, SessionState};
pub use transport::{Connector, MockTransport, Transport};
