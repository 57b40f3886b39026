//! CLI entry point for the secrets key-value store.
//!
//! Reads or writes a single secret by name in AWS Secrets Manager.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use secrets_kvs::{
    SecretStoreClient, SecretValue, StoreConfig, StoreConfigBuilder, WriteOutcome,
};
use std::ffi::OsStr;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "secrets_kvs")]
#[command(about = "Get and set secrets in AWS Secrets Manager by name", long_about = None)]
struct Cli {
    /// JSON config file with region, endpoint, profile and transport settings
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// AWS region (falls back to SECRETS_KVS_REGION)
    #[arg(long, global = true)]
    region: Option<String>,

    /// Secrets Manager endpoint URL (falls back to SECRETS_KVS_ENDPOINT)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Profile name (falls back to SECRETS_KVS_PROFILE)
    #[arg(long, global = true)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current value of a secret
    Get {
        #[arg(value_name = "NAME")]
        name: String,
    },
    /// Overwrite a secret, creating it if it does not exist
    Set {
        #[arg(value_name = "NAME")]
        name: String,

        #[arg(value_name = "VALUE")]
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/secrets_kvs.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("secrets_kvs.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive(tracing::Level::INFO.into()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(
            EnvFilter::from_env("RUST_LOG_JSON").add_directive(tracing::Level::DEBUG.into()),
        );

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    let store = SecretStoreClient::from_config(&config).await;

    match cli.command {
        Commands::Get { name } => match store
            .get_value(&name)
            .await
            .with_context(|| format!("failed to get secret '{name}'"))?
        {
            Some(value) => {
                write_value(&value)?;
                Ok(ExitCode::SUCCESS)
            }
            None => {
                warn!(secret = %name, "Secret has no value");
                Ok(ExitCode::from(2))
            }
        },
        Commands::Set { name, value } => {
            let outcome = store
                .set_value(&name, &value)
                .await
                .with_context(|| format!("failed to set secret '{name}'"))?;
            match outcome {
                WriteOutcome::Created => info!(secret = %name, "Secret created"),
                WriteOutcome::Updated => info!(secret = %name, "Secret updated"),
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Builds the store config from `--config` (or the `SECRETS_KVS_*` environment
/// variables when no file is given), with `--region`, `--endpoint` and
/// `--profile` layered on top.
fn resolve_config(cli: &Cli) -> Result<StoreConfig> {
    let base = match &cli.config {
        Some(path) => StoreConfigBuilder::from_file(path)
            .with_context(|| format!("loading config from {path}"))?,
        None => StoreConfigBuilder::from_env(),
    };

    let mut flags = StoreConfig::builder();
    if let Some(region) = &cli.region {
        flags = flags.region(region);
    }
    if let Some(endpoint) = &cli.endpoint {
        flags = flags.endpoint(endpoint);
    }
    if let Some(profile) = &cli.profile {
        flags = flags.profile(profile);
    }

    Ok(base.overlay(flags).build()?)
}

/// Writes a secret to stdout: strings with a trailing newline, binary as is.
fn write_value(value: &SecretValue) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    match value {
        SecretValue::String(s) => writeln!(stdout, "{s}")?,
        SecretValue::Binary(b) => stdout.write_all(b)?,
    }
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    #[test]
    fn test_flags_override_config_file() {
        let path = format!(
            "{}/secrets_kvs_{}_cli_config.json",
            env::temp_dir().display(),
            std::process::id()
        );
        fs::write(
            path.as_str(),
            r#"{"region": "us-east-1", "endpoint": "https://file.example", "profile": "file"}"#,
        )
        .unwrap();

        let cli = Cli::parse_from([
            "secrets_kvs",
            "--config",
            path.as_str(),
            "--profile",
            "flag",
            "get",
            "test",
        ]);
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.region(), "us-east-1");
        assert_eq!(config.endpoint().as_str(), "https://file.example/");
        assert_eq!(config.profile(), "flag");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_set_subcommand_parses() {
        let cli = Cli::parse_from(["secrets_kvs", "set", "test", "case", "--region", "eu-west-1"]);
        assert_eq!(cli.region.as_deref(), Some("eu-west-1"));
        assert!(matches!(
            cli.command,
            Commands::Set { ref name, ref value } if name == "test" && value == "case"
        ));
    }
}
