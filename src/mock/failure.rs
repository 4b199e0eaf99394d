//! Failure Injection for the Mock Service
//!
//! Supports configurable failure injection for testing error paths.

use std::collections::HashMap;

use holloman_protocol::{Method, RpcFailure, StatusCode};

/// Failure configuration for a method
#[derive(Debug, Clone)]
pub struct FailureConfig {
    /// Status code to return
    pub code: StatusCode,
    /// Detail string to return
    pub details: String,
    /// Number of times to fail before succeeding (None = always fail)
    pub fail_count: Option<u32>,
}

impl FailureConfig {
    /// Create a config that returns an error
    pub fn error(code: StatusCode, details: impl Into<String>) -> Self {
        Self {
            code,
            details: details.into(),
            fail_count: None,
        }
    }

    /// Create an UNAVAILABLE error
    pub fn unavailable() -> Self {
        Self::error(StatusCode::Unavailable, "service unavailable")
    }

    /// Create a DEADLINE_EXCEEDED error
    pub fn deadline() -> Self {
        Self::error(StatusCode::DeadlineExceeded, "deadline exceeded")
    }

    /// Set the number of times to fail before succeeding
    pub fn with_fail_count(mut self, count: u32) -> Self {
        self.fail_count = Some(count);
        self
    }

    pub fn to_failure(&self) -> RpcFailure {
        RpcFailure::new(self.code, self.details.clone())
    }
}

/// Failure injector for the mock service
#[derive(Debug, Default)]
pub struct FailureInjector {
    /// Per-method failure configs
    configs: HashMap<Method, FailureConfig>,
    /// Call counts per method (for fail_count tracking)
    call_counts: HashMap<Method, u32>,
}

impl FailureInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject a failure for a method
    pub fn inject(&mut self, method: Method, config: FailureConfig) {
        self.configs.insert(method, config);
        self.call_counts.insert(method, 0);
    }

    /// Inject an error for a method
    pub fn inject_error(&mut self, method: Method, code: StatusCode, details: impl Into<String>) {
        self.inject(method, FailureConfig::error(code, details));
    }

    /// Clear all failure injections
    pub fn clear(&mut self) {
        self.configs.clear();
        self.call_counts.clear();
    }

    /// Check if a failure should occur for a method.
    /// Returns the failure to report, None if the call should succeed.
    pub fn check(&mut self, method: Method) -> Option<RpcFailure> {
        let config = self.configs.get(&method)?;
        let count = self.call_counts.entry(method).or_insert(0);
        *count += 1;

        match config.fail_count {
            Some(limit) if *count > limit => None,
            _ => Some(config.to_failure()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_injector_basic() {
        let mut injector = FailureInjector::new();

        assert!(injector.check(Method::Capabilities).is_none());

        injector.inject_error(Method::ClusterBuffer, StatusCode::Internal, "boom");

        let failure = injector.check(Method::ClusterBuffer).unwrap();
        assert_eq!(failure.code, StatusCode::Internal);
        assert_eq!(failure.details, "boom");
        assert!(injector.check(Method::Capabilities).is_none());
    }

    #[test]
    fn test_failure_injector_fail_count() {
        let mut injector = FailureInjector::new();

        injector.inject(
            Method::Capabilities,
            FailureConfig::unavailable().with_fail_count(2),
        );

        assert!(injector.check(Method::Capabilities).is_some());
        assert!(injector.check(Method::Capabilities).is_some());
        assert!(injector.check(Method::Capabilities).is_none());
    }

    #[test]
    fn test_failure_injector_clear() {
        let mut injector = FailureInjector::new();

        injector.inject(Method::ClusterBuffer, FailureConfig::deadline());
        assert!(injector.check(Method::ClusterBuffer).is_some());

        injector.clear();
        assert!(injector.check(Method::ClusterBuffer).is_none());
    }
}
