//! Holloman Protocol Types
//!
//! Defines the protobuf messages, method table and status codes for
//! client↔service communication.

pub mod error;
pub mod ops;
pub mod request;
pub mod response;

pub use error::{RpcFailure, StatusCode};
pub use ops::Method;
pub use request::{BufferRequest, CapabilitiesRequest};
pub use response::{BufferResponse, CapabilitiesResponse};

/// Fully-qualified gRPC service name.
pub const SERVICE_NAME: &str = "HuntingHash.Holloman";

/// Server address used when the caller does not name one.
pub const DEFAULT_SERVER_ADDRESS: &str = "localhost:50051";

/// Acceleration hint sent when the caller does not name one.
pub const DEFAULT_ACCELERATION: &str = "default";

/// Upper bound on the order the client accepts by default.
pub const DEFAULT_MAX_ORDER: i32 = 1;

/// Smallest buffer the reference service will cluster.
///
/// Informational only: clients pass every buffer through unmodified.
pub const SERVICE_MIN_BUFFER_LEN: usize = 64;

/// Current client version string.
pub const CLIENT_VERSION: &str = "0.1.0";
