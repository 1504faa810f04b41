//! Typed settings for one reconciliation pass.

use std::path::PathBuf;
use std::time::Duration;

use portsync_core::Credentials;
use url::Url;

use crate::error::{ConfigError, ConfigResult};

/// Everything a pass needs, already parsed.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Where the forwarded port is read from.
    pub source: PortSourceConfig,
    /// Torrent client endpoint and login.
    pub torrent: TorrentClientConfig,
    /// Connect and request timeout for every HTTP call.
    pub http_timeout: Duration,
}

/// Forwarded port source selected at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortSourceConfig {
    /// Plain-text file written by the VPN sidecar.
    File {
        /// Path to the port file.
        path: PathBuf,
    },
    /// VPN control server HTTP API.
    ControlServer {
        /// Base URL; `/v1/openvpn/portforwarded` is resolved against it.
        base_url: Url,
    },
}

impl PortSourceConfig {
    /// Short label for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::File { .. } => "file",
            Self::ControlServer { .. } => "control-server",
        }
    }
}

/// qBittorrent WebUI settings.
#[derive(Debug, Clone)]
pub struct TorrentClientConfig {
    /// WebUI base URL.
    pub base_url: Url,
    /// WebUI login.
    pub credentials: Credentials,
}

impl SyncConfig {
    /// Check cross-field constraints that argument parsing cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] for the first offending field.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.http_timeout.is_zero() {
            return Err(ConfigError::invalid(
                "http_timeout",
                Some("0".to_string()),
                "must be greater than zero",
            ));
        }

        match &self.source {
            PortSourceConfig::File { path } => {
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::invalid("port_file", None, "must not be empty"));
                }
            }
            PortSourceConfig::ControlServer { base_url } => {
                validate_http_url("control_server_url", base_url)?;
            }
        }

        validate_http_url("qbittorrent_url", &self.torrent.base_url)?;
        if self.torrent.credentials.username().trim().is_empty() {
            return Err(ConfigError::invalid("username", None, "must not be empty"));
        }
        Ok(())
    }
}

fn validate_http_url(field: &'static str, url: &Url) -> ConfigResult<()> {
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::invalid(
            field,
            Some(url.to_string()),
            "scheme must be http or https",
        ));
    }
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(ConfigError::invalid(
            field,
            Some(url.to_string()),
            "must include a host",
        ));
    }
    Ok(())
}
