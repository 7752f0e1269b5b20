//! Healer CLI
//!
//! Runs one remediation from a trigger event, or serves a webhook that runs
//! one per posted alarm.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use healer::server::run_server;
use healer::{AlarmEvent, Healer, HealerConfig, RunResult};

/// Reboot a degraded instance, wait for it to recover and verify the application
#[derive(Parser)]
#[command(name = "healer")]
#[command(about = "Reboot a degraded instance, wait for it to recover and verify the application")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Result output format (json or text)
    #[arg(long, value_enum, default_value = "json", global = true)]
    format: OutputFormat,

    /// Log output format (text or json)
    #[arg(long, value_enum, default_value = "text", global = true)]
    log_format: LogFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Instance to remediate
    #[arg(long, env = "INSTANCE_ID", global = true)]
    instance_id: Option<String>,

    /// SNS topic that receives alerts
    #[arg(long, env = "SNS_TOPIC_ARN", global = true)]
    topic_arn: Option<String>,

    /// Application URL checked after recovery
    #[arg(long, env = "APP_URL", global = true)]
    app_url: Option<String>,

    /// AWS region
    #[arg(long, env = "AWS_REGION", global = true)]
    region: Option<String>,

    /// Override the AWS endpoint (local emulators, tests)
    #[arg(long, env = "AWS_ENDPOINT_URL", global = true)]
    endpoint_url: Option<String>,
}

#[derive(Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Json,
    Text,
}

#[derive(Clone, Copy, Default, clap::ValueEnum)]
enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one remediation and print the result
    Run {
        /// Trigger event file (`-` for stdin); an empty event when omitted
        #[arg(long)]
        event: Option<PathBuf>,
    },
    /// Serve the alarm webhook
    Serve {
        /// Address to bind
        #[arg(long, default_value = "0.0.0.0:8080")]
        addr: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.log_format, cli.verbose);

    let config = load_config(&cli)?;
    debug!(
        region = %config.region,
        poll_attempts = config.timings.poll_attempts,
        poll_interval_secs = config.timings.poll_interval.as_secs(),
        settle_delay_secs = config.timings.settle_delay.as_secs(),
        "Loaded configuration"
    );
    let healer = Healer::from_config(&config)?;

    match cli.command {
        Commands::Run { event } => {
            let event = read_event(event.as_ref()).await?;
            let result = healer.handle(&event).await;
            print_result(&result, cli.format)?;

            Ok(if result.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Serve { addr } => {
            info!(addr = %addr, "Starting healer webhook server");
            run_server(Arc::new(healer), &addr).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_tracing(format: LogFormat, verbose: bool) {
    let default_filter = if verbose {
        "healer=debug,healer_cloud=debug,healer_notify=debug,info"
    } else {
        "healer=info,healer_cloud=info,healer_notify=info,warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // Logs go to stderr; stdout carries the result record
    let (text, json) = match format {
        LogFormat::Text => (Some(fmt::layer().with_writer(std::io::stderr)), None),
        LogFormat::Json => (
            None,
            Some(fmt::layer().json().with_writer(std::io::stderr)),
        ),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(text)
        .with(json)
        .init();
}

/// Environment first, then command-line overrides.
fn load_config(cli: &Cli) -> Result<HealerConfig> {
    let mut config = HealerConfig::from_env().context("Invalid configuration")?;

    let set = |value: &Option<String>| value.clone().filter(|v| !v.trim().is_empty());
    if let Some(instance_id) = set(&cli.instance_id) {
        config.target.instance_id = Some(instance_id);
    }
    if let Some(topic_arn) = set(&cli.topic_arn) {
        config.target.topic_arn = Some(topic_arn);
    }
    if let Some(app_url) = set(&cli.app_url) {
        config.target.app_url = Some(app_url);
    }
    if let Some(region) = set(&cli.region) {
        config.region = region;
    }
    if let Some(endpoint) = set(&cli.endpoint_url) {
        config.endpoint_url = Some(endpoint);
    }

    Ok(config)
}

async fn read_event(source: Option<&PathBuf>) -> Result<AlarmEvent> {
    let raw = match source {
        None => return Ok(AlarmEvent::default()),
        Some(path) if path.as_os_str() == "-" => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("Failed to read event from stdin")?;
            buf
        }
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read event file {}", path.display()))?,
    };

    if raw.trim().is_empty() {
        return Ok(AlarmEvent::default());
    }
    serde_json::from_str(&raw).context("Failed to parse trigger event")
}

fn print_result(result: &RunResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(result)?);
        }
        OutputFormat::Text => {
            let code = result.status_code.to_string();
            let code = if result.is_success() {
                code.green().bold()
            } else if result.status_code < 500 {
                code.yellow().bold()
            } else {
                code.red().bold()
            };
            println!("{code} {}", result.body);
        }
    }
    Ok(())
}
