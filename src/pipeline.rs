//! Pipeline orchestration
//!
//! One linear run per invocation:
//! - Read the input buffer (before any network activity)
//! - Connect and query capabilities
//! - Apply the capability policy
//! - Submit the buffer
//! - Verify the identifier digest when asked to
//! - Render the result and release the connection
//!
//! The connection is owned by a [`ProtocolClient`], so every early return
//! releases it.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use holloman_protocol::CapabilitiesRequest;
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::host::{ClientError, ClientResult, Connector, ProtocolClient};
use crate::policy::{assess_capabilities, buffer_digest, verify_digest, DigestCheck};
use crate::report::{render, render_capabilities, JsonReport};

/// Where the buffer comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    File(PathBuf),
    Stdin,
}

impl InputSource {
    /// Interpret a command-line argument; `-` means stdin.
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            InputSource::Stdin
        } else {
            InputSource::File(PathBuf::from(arg))
        }
    }

    pub fn describe(&self) -> String {
        match self {
            InputSource::File(path) => path.display().to_string(),
            InputSource::Stdin => "<stdin>".to_string(),
        }
    }

    /// Label sent with the buffer: the file name exactly as given.
    pub fn label(&self) -> String {
        match self {
            InputSource::File(path) => path.to_string_lossy().into_owned(),
            InputSource::Stdin => String::new(),
        }
    }
}

/// Read the whole input into memory.
pub fn read_input(source: &InputSource) -> ClientResult<Vec<u8>> {
    let result = match source {
        InputSource::File(path) => fs::read(path),
        InputSource::Stdin => {
            let mut data = Vec::new();
            io::stdin().read_to_end(&mut data).map(|_| data)
        }
    };

    result.map_err(|source_err| ClientError::Input {
        path: source.describe(),
        source: source_err,
    })
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

/// Read `input`, then run the exchange against the service.
pub fn run(
    config: &ClientConfig,
    input: &InputSource,
    connector: &dyn Connector,
    out: &mut dyn Write,
    format: OutputFormat,
) -> ClientResult<JsonReport> {
    let data = read_input(input)?;
    debug!(input = %input.describe(), len = data.len(), "input read");
    execute(config, data, &input.label(), connector, out, format)
}

/// Run the exchange for a buffer already in memory.
pub fn execute(
    config: &ClientConfig,
    data: Vec<u8>,
    label: &str,
    connector: &dyn Connector,
    out: &mut dyn Write,
    format: OutputFormat,
) -> ClientResult<JsonReport> {
    let mut client = ProtocolClient::new(config.clone());
    client.connect(connector)?;

    let requested = CapabilitiesRequest::new(&config.acceleration, config.max_order);
    let capabilities = client.negotiate_capabilities(&requested.acceleration, requested.max_order)?;

    if format == OutputFormat::Human {
        writeln!(out, "{}", render_capabilities(&capabilities)).map_err(ClientError::Output)?;
    }

    let buffer_len = data.len();
    let issues = assess_capabilities(&requested, &capabilities, buffer_len);
    config.capability_policy.apply(&issues)?;

    let computed = config.verify_digest.then(|| buffer_digest(&data));

    info!(session = %client.session_id(), len = buffer_len, "submitting buffer");
    let response = if label.is_empty() {
        client.submit_buffer(data)?
    } else {
        client.submit_labelled(data, label)?
    };
    client.close();

    let verified = match computed {
        Some(computed) => {
            let check = verify_digest(&computed, &response);
            let verified = check == DigestCheck::Verified;
            check.into_result()?;
            verified
        }
        None => false,
    };

    let mut report = JsonReport::new(
        client.session_id(),
        &config.server_address,
        capabilities,
        response,
        buffer_len,
    );
    report.capability_issues = issues;
    report.verified = verified;

    match format {
        OutputFormat::Human => {
            write!(out, "{}", render(&report.response)).map_err(ClientError::Output)?
        }
        OutputFormat::Json => {
            let json = report
                .to_json()
                .map_err(|e| ClientError::Output(io::Error::new(io::ErrorKind::InvalidData, e)))?;
            writeln!(out, "{}", json).map_err(ClientError::Output)?
        }
    }

    Ok(report)
}
