//! Session Lifecycle Tests
//!
//! Connection ownership, call ordering and pass-through behaviour of a
//! `ProtocolClient` driven against the in-process mock service.

use holloman_client::mock::{FailureConfig, MockService};
use holloman_client::{ClientConfig, ClientError, ProtocolClient, SessionState};
use holloman_protocol::{Method, StatusCode};

fn connected(service: &MockService) -> ProtocolClient {
    let mut client = ProtocolClient::new(ClientConfig::default());
    client.connect(service).expect("mock connection should succeed");
    client
}

// =============================================================================
// Release exactly once
// =============================================================================

#[test]
fn test_release_once_on_success() {
    let service = MockService::new();
    {
        let mut client = connected(&service);
        client.negotiate_configured().unwrap();
        client.submit_buffer(vec![9u8; 128]).unwrap();
        client.close();
    }

    assert_eq!(service.connection_count(), 1);
    assert_eq!(service.close_count(), 1, "transport must be released exactly once");
}

#[test]
fn test_release_once_on_capabilities_failure() {
    let service = MockService::new();
    service.inject_error(Method::Capabilities, StatusCode::Unavailable, "down");
    {
        let mut client = connected(&service);
        assert!(client.negotiate_configured().is_err());
    }

    assert_eq!(service.close_count(), 1, "drop must release after a failed call");
}

#[test]
fn test_release_once_on_cluster_failure() {
    let service = MockService::new();
    service.inject_error(Method::ClusterBuffer, StatusCode::Internal, "boom");
    {
        let mut client = connected(&service);
        client.negotiate_configured().unwrap();
        let err = client.submit_buffer(vec![0u8; 64]).unwrap_err();
        assert!(matches!(err, ClientError::Rpc(ref f) if f.code == StatusCode::Internal));
        client.close();
        client.close();
    }

    assert_eq!(service.close_count(), 1);
}

// =============================================================================
// Call ordering
// =============================================================================

#[test]
fn test_capabilities_failure_prevents_cluster_call() {
    let service = MockService::new();
    service.inject_error(Method::Capabilities, StatusCode::PermissionDenied, "denied");

    let mut out = Vec::new();
    let result = holloman_client::pipeline::execute(
        &ClientConfig::default(),
        vec![0u8; 64],
        "",
        &service,
        &mut out,
        holloman_client::OutputFormat::Human,
    );

    assert!(result.is_err());
    assert_eq!(service.calls(), vec![Method::Capabilities], "ClusterBuffer must never be issued");
}

#[test]
fn test_calls_after_close_are_rejected_locally() {
    let service = MockService::new();
    let mut client = connected(&service);
    client.close();

    let err = client.negotiate_configured().unwrap_err();
    assert!(matches!(
        err,
        ClientError::InvalidState { state: SessionState::Closed, .. }
    ));
    assert!(service.calls().is_empty(), "no call may reach the service after close");
}

// =============================================================================
// Negotiation shape
// =============================================================================

#[test]
fn test_repeated_negotiation_has_same_shape() {
    let service = MockService::new();
    let mut client = connected(&service);

    let first = client.negotiate_capabilities("default", 1).unwrap();
    let second = client.negotiate_capabilities("default", 1).unwrap();

    assert_eq!(first, second, "an unchanged service must answer identically");
    assert_eq!(service.call_count(Method::Capabilities), 2);
}

#[test]
fn test_transient_failure_is_not_retried() {
    let service = MockService::new();
    service.inject_failure(
        Method::Capabilities,
        FailureConfig::unavailable().with_fail_count(1),
    );
    let mut client = connected(&service);

    assert!(client.negotiate_configured().is_err());
    assert_eq!(service.call_count(Method::Capabilities), 1, "client must not retry");

    // The caller may try again on the same session
    assert!(client.negotiate_configured().is_ok());
}

// =============================================================================
// Buffer pass-through
// =============================================================================

#[test]
fn test_empty_buffer_sent_as_zero_length() {
    let service = MockService::new();
    let mut client = connected(&service);

    let err = client.submit_buffer(Vec::new()).unwrap_err();

    let received = service.buffer_requests();
    assert_eq!(received.len(), 1, "empty buffer must still be transmitted");
    assert!(received[0].buffer.is_empty());
    // Rejection comes from the service, not the client
    assert!(matches!(err, ClientError::Rpc(ref f) if f.details.contains("too small")));
}

#[test]
fn test_buffer_transmitted_unmodified() {
    let service = MockService::new();
    let data: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
    let mut client = connected(&service);

    client.submit_buffer(data.clone()).unwrap();

    assert_eq!(service.buffer_requests()[0].buffer, data);
}

#[test]
fn test_response_returned_verbatim() {
    let service = MockService::new();
    let mut client = connected(&service);
    let data = vec![0x41u8; 300];

    let direct = MockService::new()
        .cluster_buffer(holloman_protocol::BufferRequest::new(data.clone()))
        .unwrap();
    let via_client = client.submit_buffer(data).unwrap();

    assert_eq!(via_client, direct);
}
