//! Mock Holloman Service
//!
//! In-process stand-in for the remote service, used by unit and
//! integration tests through `MockTransport`.
//!
//! # Behaviour
//!
//! - `Capabilities`: returns configurable capabilities
//! - `ClusterBuffer`: rejects short buffers and buffers beyond the
//!   supported order, otherwise derives an identifier from the content
//!
//! Every call, submitted buffer, connection and release is recorded so
//! tests can assert on sequencing and resource release.

mod failure;
mod service;
mod state;

pub use failure::{FailureConfig, FailureInjector};
pub use service::{MockCapabilities, MockService};
pub use state::MockState;
