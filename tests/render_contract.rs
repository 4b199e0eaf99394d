//! Output Contract Tests
//!
//! The human output ends with the identifier as a bare lowercase hex
//! line; scripts rely on that.

use holloman_client::mock::MockService;
use holloman_client::report::render;
use holloman_client::{ClientConfig, OutputFormat};
use holloman_protocol::BufferResponse;

fn run_human(service: &MockService, data: Vec<u8>) -> String {
    let mut out = Vec::new();
    holloman_client::pipeline::execute(
        &ClientConfig::default(),
        data,
        "",
        service,
        &mut out,
        OutputFormat::Human,
    )
    .expect("run should succeed");
    String::from_utf8(out).expect("output must be UTF-8")
}

#[test]
fn test_deadbeef_scenario() {
    let service = MockService::new();
    service.respond_with(BufferResponse {
        order: 2,
        identifier: vec![0xde, 0xad, 0xbe, 0xef],
        magic: 7,
        ..Default::default()
    });

    let text = run_human(&service, vec![1u8; 10]);

    assert!(text.contains("HOrder: 2\n"));
    assert!(text.contains("Magic: 7\n"));
    assert_eq!(text.lines().last(), Some("deadbeef"));
}

#[test]
fn test_hex_line_even_length_lowercase() {
    let service = MockService::new();
    let text = run_human(&service, vec![0xabu8; 200]);

    let hex = text.lines().last().expect("output must not be empty");
    assert_eq!(hex.len() % 2, 0, "hex must have two digits per byte");
    assert!(
        hex.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)),
        "hex must be lowercase without separators: {hex}"
    );
}

#[test]
fn test_hex_round_trips_to_identifier() {
    let service = MockService::new();
    let mut out = Vec::new();
    let report = holloman_client::pipeline::execute(
        &ClientConfig::default(),
        vec![0x10u8; 64],
        "",
        &service,
        &mut out,
        OutputFormat::Human,
    )
    .unwrap();

    let text = String::from_utf8(out).unwrap();
    let hex = text.lines().last().unwrap();
    assert_eq!(hex::decode(hex).unwrap(), report.response.identifier);
}

#[test]
fn test_render_matches_pipeline_output() {
    let response = BufferResponse {
        order: 5,
        identifier: vec![0x01, 0x02],
        magic: 42,
        ..Default::default()
    };
    let service = MockService::new();
    service.respond_with(response.clone());

    let text = run_human(&service, vec![0u8; 1]);
    assert!(text.ends_with(&render(&response)));
}
