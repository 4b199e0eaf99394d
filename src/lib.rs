//! Holloman protocol client
//!
//! A synchronous client for the Holloman service: it asks the service for
//! its capabilities, submits one buffer, and reports the order, identifier
//! and magic marker the service assigns to it.

pub mod config;
pub mod host;
pub mod mock;
pub mod pipeline;
pub mod policy;
pub mod report;

pub use config::{ClientConfig, ConfigError, EffectiveConfig};
pub use host::{ClientError, ClientResult, Connector, GrpcConnector, ProtocolClient, SessionState, Transport};
pub use pipeline::{InputSource, OutputFormat};
pub use policy::CapabilityPolicy;
