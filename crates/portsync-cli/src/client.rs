//! Shared HTTP client construction and the CLI error type.

use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use anyhow::anyhow;
use portsync_config::ConfigError;
use portsync_core::{ExitCode, SyncError};
use portsync_telemetry::TelemetryError;
use reqwest::header::HeaderMap;
use reqwest::{Client, Url};

/// CLI-level error type wrapping every failure a run can end with.
#[derive(Debug)]
pub(crate) enum CliError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Sync(SyncError),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Sync(err) => err.exit_code().code(),
            Self::Config(_) | Self::Telemetry(_) | Self::Failure(_) => ExitCode::BaseError.code(),
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Config(ConfigError::InvalidField {
                field,
                value,
                reason,
            }) => match value {
                Some(value) => format!("invalid configuration: {field} {reason} (got {value})"),
                None => format!("invalid configuration: {field} {reason}"),
            },
            Self::Telemetry(err) => match std::error::Error::source(err) {
                Some(source) => format!("{err}: {source}"),
                None => err.to_string(),
            },
            Self::Sync(err) => describe_sync_error(err),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<SyncError> for CliError {
    fn from(err: SyncError) -> Self {
        Self::Sync(err)
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

fn describe_sync_error(err: &SyncError) -> String {
    match err {
        SyncError::SourceUnavailable { location, source } => {
            format!("{err} ({location}): {source}")
        }
        SyncError::SourceProtocol { location, fault } => format!("{err} ({location}): {fault}"),
        SyncError::PortOutOfRange { value } => format!("{err}: {value}"),
        SyncError::AuthenticationFailed {
            url,
            reason,
            source: Some(source),
        } => format!("{err} ({url}): {reason}: {source}"),
        SyncError::AuthenticationFailed { url, reason, .. } => format!("{err} ({url}): {reason}"),
        SyncError::InvalidPreference { key, value } => format!("{err}: {key}={value}"),
        SyncError::ClientRequest { operation, source } => {
            format!("{err} ({operation}): {source}")
        }
    }
}

/// Build an HTTP client with connect and request timeouts.
///
/// With `keep_cookies` the client stores cookies set by responses and sends
/// them back on later requests to the same host.
pub(crate) fn build_http_client(
    timeout: Duration,
    default_headers: HeaderMap,
    keep_cookies: bool,
) -> CliResult<Client> {
    Client::builder()
        .connect_timeout(timeout)
        .timeout(timeout)
        .default_headers(default_headers)
        .cookie_store(keep_cookies)
        .build()
        .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))
}

/// Resolve an API path below `base`, keeping any path prefix `base` carries.
pub(crate) fn api_url(base: &Url, path: &str) -> CliResult<Url> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    base.join(path.trim_start_matches('/'))
        .map_err(|err| CliError::failure(anyhow!("invalid base URL: {err}")))
}

/// Parse a URL argument provided to the CLI.
pub(crate) fn parse_url(input: &str) -> Result<Url, String> {
    input
        .parse::<Url>()
        .map_err(|err| format!("invalid URL '{input}': {err}"))
}
