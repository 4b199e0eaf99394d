//! Holloman CLI
//!
//! Entry point for the `holloman` command-line tool.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use holloman_protocol::CLIENT_VERSION;
use holloman_client::config::{env_layer, CONFIG_PATH_ENV};
use holloman_client::report::{render_failure, JsonFailure};
use holloman_client::{
    ClientConfig, ClientError, EffectiveConfig, GrpcConnector, InputSource, OutputFormat,
};
use serde_json::{Map, Value};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "holloman")]
#[command(about = "Submit a file to a Holloman service and print its identifier")]
#[command(version = CLIENT_VERSION)]
struct Cli {
    /// File to submit (`-` reads stdin)
    file: String,

    /// Service address [default: localhost:50051]
    server_address: Option<String>,

    /// Path to a TOML config file (default: $HOLLOMAN_CONFIG)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Acceleration mode hint [default: default]
    #[arg(long)]
    acceleration: Option<String>,

    /// Highest order to request [default: 1]
    #[arg(long)]
    max_order: Option<i32>,

    /// Per-call deadline in seconds [default: 10]
    #[arg(long)]
    timeout: Option<u64>,

    /// Refuse to submit when the service's capabilities look incompatible
    #[arg(long)]
    enforce_capabilities: bool,

    /// Check the identifier against a locally computed SHA-1
    #[arg(long)]
    verify_digest: bool,

    /// Output in JSON format
    #[arg(long)]
    json: bool,

    /// Log debug output to stderr
    #[arg(long, short = 'v')]
    verbose: bool,
}

impl Cli {
    /// Flags given on the command line, as a config layer.
    fn overrides(&self) -> Value {
        let mut layer = Map::new();
        if let Some(ref address) = self.server_address {
            layer.insert("server_address".into(), Value::from(address.as_str()));
        }
        if let Some(ref acceleration) = self.acceleration {
            layer.insert("acceleration".into(), Value::from(acceleration.as_str()));
        }
        if let Some(max_order) = self.max_order {
            layer.insert("max_order".into(), Value::from(max_order));
        }
        if let Some(timeout) = self.timeout {
            layer.insert("timeout_seconds".into(), Value::from(timeout));
        }
        if self.enforce_capabilities {
            layer.insert("capability_policy".into(), Value::from("enforce"));
        }
        if self.verify_digest {
            layer.insert("verify_digest".into(), Value::from(true));
        }
        Value::Object(layer)
    }
}

fn main() {
    // Usage errors exit 1; help and version keep clap's behaviour
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            process::exit(1);
        }
        Err(e) => e.exit(),
    };

    init_logging(cli.verbose);

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            report_error(&e, format);
            process::exit(e.exit_code());
        }
    };
    let input = InputSource::from_arg(&cli.file);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = holloman_client::pipeline::run(&config, &input, &GrpcConnector, &mut out, format);
    let _ = out.flush();

    if let Err(e) = result {
        report_error(&e, format);
        process::exit(e.exit_code());
    }
}

/// Logs go to stderr so stdout stays parseable.
fn init_logging(verbose: bool) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) if verbose => "holloman_client=debug,holloman=debug".to_string(),
        Err(_) => "warn".to_string(),
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();
}

fn load_config(cli: &Cli) -> Result<ClientConfig, ClientError> {
    let config_path = cli
        .config
        .clone()
        .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

    let env = env_layer(std::env::vars())?;
    let effective = EffectiveConfig::build(config_path.as_deref(), Some(env), Some(cli.overrides()))?;
    tracing::debug!(sources = effective.sources.len(), "configuration resolved");

    Ok(effective.to_client_config()?)
}

/// Human text on stderr; under `--json` a failure document on stdout as well.
fn report_error(error: &ClientError, format: OutputFormat) {
    match error {
        ClientError::Rpc(failure) => eprint!("{}", render_failure(failure)),
        other => eprintln!("Error: {}", other),
    }

    if format == OutputFormat::Json {
        if let Ok(json) = serde_json::to_string_pretty(&JsonFailure::from(error)) {
            println!("{}", json);
        }
    }
}
