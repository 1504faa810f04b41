use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use portsync_config::defaults::{
    DEFAULT_CONTROL_SERVER_URL, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_PORT_FILE,
    DEFAULT_QBITTORRENT_URL, DEFAULT_QBITTORRENT_USERNAME,
};
use portsync_config::{PortSourceConfig, SyncConfig, TorrentClientConfig};
use portsync_core::{Credentials, ExitCode, ReconciliationOutcome, run_pass};
use portsync_telemetry::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, init_logging, pass_span};
use reqwest::Url;
use tracing::{Instrument, error, info};
use uuid::Uuid;

use crate::client::{CliError, CliResult, parse_url};
use crate::qbittorrent::QbittorrentClient;
use crate::source::build_source;

/// Parses arguments, installs logging, and runs one reconciliation pass.
/// Returns the process exit code.
pub async fn run() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return usage_exit_code(&err),
    };

    let logging = LoggingConfig {
        level: &cli.log_level,
        format: cli
            .log_format
            .map_or_else(LogFormat::infer, LogFormatArg::into_format),
    };
    if let Err(err) = init_logging(&logging) {
        let err = CliError::Telemetry(err);
        eprintln!("error: {}", err.display_message());
        return err.exit_code();
    }

    run_with(cli).await
}

/// Runs one reconciliation pass with already parsed arguments and returns
/// the exit code. Logging must already be installed by the caller if output
/// is wanted.
pub async fn run_with(cli: Cli) -> i32 {
    let run_id = Uuid::new_v4().to_string();
    let config = match cli.into_config() {
        Ok(config) => config,
        Err(err) => return report(Err(err)),
    };

    let span = pass_span(&run_id, config.source.kind());
    let result = execute(&config).instrument(span.clone()).await;
    span.in_scope(|| report(result))
}

async fn execute(config: &SyncConfig) -> CliResult<ReconciliationOutcome> {
    let source = build_source(&config.source, config.http_timeout)?;
    let client = QbittorrentClient::new(config.torrent.base_url.clone(), config.http_timeout)?;
    let outcome = run_pass(source.as_ref(), &client, &config.torrent.credentials).await?;
    Ok(outcome)
}

fn report(result: CliResult<ReconciliationOutcome>) -> i32 {
    match result {
        Ok(outcome) => {
            let exit_code = ExitCode::from_outcome(&outcome).code();
            match &outcome {
                ReconciliationOutcome::Failed(reason) => {
                    error!(exit_code, ?reason, "reconciliation failed");
                }
                ReconciliationOutcome::NoChangeNeeded | ReconciliationOutcome::Updated => {
                    info!(exit_code, ?outcome, "reconciliation finished");
                }
            }
            exit_code
        }
        Err(err) => {
            let exit_code = err.exit_code();
            error!(exit_code, error = %err.display_message(), "reconciliation failed");
            exit_code
        }
    }
}

/// Help and version requests exit cleanly; any other argument error maps to
/// the general failure code so it cannot be mistaken for a login failure.
fn usage_exit_code(err: &clap::Error) -> i32 {
    let _ = err.print();
    if err.use_stderr() {
        ExitCode::BaseError.code()
    } else {
        ExitCode::Success.code()
    }
}

/// Command-line arguments for `portsync`.
#[derive(Parser)]
#[command(
    name = "portsync",
    version,
    about = "Sync the qBittorrent listen port with the VPN forwarded port"
)]
pub struct Cli {
    #[arg(
        long,
        env = "PORTSYNC_SOURCE",
        value_enum,
        default_value_t = SourceKind::File,
        help = "Where to read the forwarded port from"
    )]
    source: SourceKind,
    #[arg(
        long,
        env = "PORTSYNC_PORT_FILE",
        default_value = DEFAULT_PORT_FILE,
        help = "Port file written by gluetun"
    )]
    port_file: PathBuf,
    #[arg(
        long,
        env = "PORTSYNC_CONTROL_SERVER_URL",
        value_parser = parse_url,
        default_value = DEFAULT_CONTROL_SERVER_URL,
        help = "Base URL of the gluetun control server"
    )]
    control_server_url: Url,
    #[arg(
        long,
        env = "PORTSYNC_QBITTORRENT_URL",
        value_parser = parse_url,
        default_value = DEFAULT_QBITTORRENT_URL,
        help = "Base URL of the qBittorrent WebUI"
    )]
    qbittorrent_url: Url,
    #[arg(
        long,
        env = "PORTSYNC_QBITTORRENT_USERNAME",
        default_value = DEFAULT_QBITTORRENT_USERNAME
    )]
    username: String,
    #[arg(long, env = "PORTSYNC_QBITTORRENT_PASSWORD", hide_env_values = true)]
    password: String,
    #[arg(
        long,
        env = "PORTSYNC_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_HTTP_TIMEOUT_SECS,
        help = "Connect and request timeout for every HTTP call, in seconds"
    )]
    timeout: u64,
    #[arg(long, env = "PORTSYNC_LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,
    #[arg(
        long,
        env = "PORTSYNC_LOG_FORMAT",
        value_enum,
        help = "Log output format; defaults to pretty in debug builds and json otherwise"
    )]
    log_format: Option<LogFormatArg>,
}

impl fmt::Debug for Cli {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Cli")
            .field("source", &self.source)
            .field("port_file", &self.port_file)
            .field("control_server_url", &self.control_server_url.as_str())
            .field("qbittorrent_url", &self.qbittorrent_url.as_str())
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Cli {
    fn into_config(self) -> CliResult<SyncConfig> {
        let source = match self.source {
            SourceKind::File => PortSourceConfig::File {
                path: self.port_file,
            },
            SourceKind::ControlServer => PortSourceConfig::ControlServer {
                base_url: self.control_server_url,
            },
        };
        let config = SyncConfig {
            source,
            torrent: TorrentClientConfig {
                base_url: self.qbittorrent_url,
                credentials: Credentials::new(self.username, self.password),
            },
            http_timeout: Duration::from_secs(self.timeout),
        };
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SourceKind {
    File,
    ControlServer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormatArg {
    Json,
    Pretty,
}

impl LogFormatArg {
    const fn into_format(self) -> LogFormat {
        match self {
            Self::Json => LogFormat::Json,
            Self::Pretty => LogFormat::Pretty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn file_source_config_from_arguments() {
        let cli = Cli::try_parse_from([
            "portsync",
            "--port-file",
            "/run/gluetun/port",
            "--qbittorrent-url",
            "http://qbittorrent:8080",
            "--password",
            "secret",
            "--timeout",
            "3",
        ])
        .expect("arguments parse");
        let config = cli.into_config().expect("valid config");

        assert_eq!(
            config.source,
            PortSourceConfig::File {
                path: PathBuf::from("/run/gluetun/port")
            }
        );
        assert_eq!(config.torrent.base_url.as_str(), "http://qbittorrent:8080/");
        assert_eq!(config.torrent.credentials.password(), "secret");
        assert_eq!(config.http_timeout, Duration::from_secs(3));
    }

    #[test]
    fn control_server_source_from_arguments() {
        let cli = Cli::try_parse_from([
            "portsync",
            "--source",
            "control-server",
            "--control-server-url",
            "http://gluetun:8000",
            "--password",
            "secret",
        ])
        .expect("arguments parse");
        let config = cli.into_config().expect("valid config");
        assert_eq!(config.source.kind(), "control-server");
    }

    #[test]
    fn debug_output_redacts_password() {
        let cli = Cli::try_parse_from(["portsync", "--password", "hunter2"])
            .expect("arguments parse");
        let rendered = format!("{cli:?}");
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let cli = Cli::try_parse_from(["portsync", "--password", "secret", "--timeout", "0"])
            .expect("arguments parse");
        let err = cli.into_config().expect_err("zero timeout");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn unknown_source_is_a_usage_error() {
        let err = Cli::try_parse_from(["portsync", "--password", "x", "--source", "socket"])
            .expect_err("unknown source");
        assert_eq!(usage_exit_code(&err), 1);
    }

    #[test]
    fn help_exits_successfully() {
        let err = Cli::try_parse_from(["portsync", "--help"]).expect_err("help short-circuits");
        assert_eq!(usage_exit_code(&err), 0);
    }

    #[test]
    fn explicit_log_format_maps_to_telemetry_format() {
        assert_eq!(LogFormatArg::Json.into_format(), LogFormat::Json);
        assert_eq!(LogFormatArg::Pretty.into_format(), LogFormat::Pretty);
    }
}
