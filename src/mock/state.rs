//! Mock Service State
//!
//! Everything the mock service observed during a test.

use holloman_protocol::{BufferRequest, CapabilitiesRequest, Method};

/// Recorded traffic and lifecycle events
#[derive(Debug, Default)]
pub struct MockState {
    /// Every call, in arrival order (including ones that failed)
    pub calls: Vec<Method>,
    /// Capability queries as received
    pub capability_requests: Vec<CapabilitiesRequest>,
    /// Buffer submissions as received
    pub buffer_requests: Vec<BufferRequest>,
    /// Successful connection attempts
    pub connections: u32,
    /// Transport releases
    pub closes: u32,
    /// Reject new connections with UNAVAILABLE
    pub refuse_connections: bool,
}

impl MockState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of calls made to a method
    pub fn call_count(&self, method: Method) -> usize {
        self.calls.iter().filter(|m| **m == method).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_count() {
        let mut state = MockState::new();
        state.calls.push(Method::Capabilities);
        state.calls.push(Method::Capabilities);
        state.calls.push(Method::ClusterBuffer);

        assert_eq!(state.call_count(Method::Capabilities), 2);
        assert_eq!(state.call_count(Method::ClusterBuffer), 1);
    }
}
