//! qBittorrent WebUI adapter.
//!
//! # Design
//! - Endpoints are resolved once at construction; requests never build URLs.
//! - The client keeps its own cookie store, so whatever session cookie the
//!   WebUI sets at login (`SID` or a renamed one) rides on later calls. The
//!   store lives and dies with the client, which is built per pass.
//! - Preference writes go out one key per request, listen port first.

use std::time::Duration;

use async_trait::async_trait;
use portsync_core::{
    Credentials, EMBEDDED_TRACKER_PORT_KEY, ForwardedPort, LISTEN_PORT_KEY, SyncError, SyncResult,
    TorrentConfigClient,
};
use reqwest::header::{HeaderMap, REFERER};
use reqwest::{Client, Url};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::client::{CliResult, api_url, build_http_client};

const LOGIN_ACCEPTED: &str = "Ok.";

/// Proof of a successful WebUI login; the session cookie itself is held by
/// the client's cookie store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct QbitSession;

#[derive(Debug, Clone)]
struct Endpoints {
    login: Url,
    logout: Url,
    version: Url,
    webapi_version: Url,
    preferences: Url,
    set_preferences: Url,
}

impl Endpoints {
    fn resolve(base: &Url) -> CliResult<Self> {
        Ok(Self {
            login: api_url(base, "api/v2/auth/login")?,
            logout: api_url(base, "api/v2/auth/logout")?,
            version: api_url(base, "api/v2/app/version")?,
            webapi_version: api_url(base, "api/v2/app/webapiVersion")?,
            preferences: api_url(base, "api/v2/app/preferences")?,
            set_preferences: api_url(base, "api/v2/app/setPreferences")?,
        })
    }
}

/// Talks to the qBittorrent WebUI API v2.
#[derive(Debug, Clone)]
pub(crate) struct QbittorrentClient {
    client: Client,
    base_url: Url,
    endpoints: Endpoints,
}

impl QbittorrentClient {
    pub(crate) fn new(base_url: Url, timeout: Duration) -> CliResult<Self> {
        Ok(Self {
            client: build_http_client(timeout, HeaderMap::new(), true)?,
            endpoints: Endpoints::resolve(&base_url)?,
            base_url,
        })
    }

    async fn fetch_text(&self, url: &Url) -> reqwest::Result<String> {
        self.client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }

    async fn log_versions(&self) {
        let version = self.fetch_text(&self.endpoints.version).await;
        let webapi = self.fetch_text(&self.endpoints.webapi_version).await;
        match (version, webapi) {
            (Ok(version), Ok(webapi)) => {
                info!(
                    version = %version.trim(),
                    web_api = %webapi.trim(),
                    "connected to qBittorrent"
                );
            }
            (Err(err), _) | (_, Err(err)) => {
                debug!(error = %err, "qBittorrent version lookup failed");
            }
        }
    }

    async fn set_preference(
        &self,
        key: &'static str,
        port: ForwardedPort,
        operation: &'static str,
    ) -> SyncResult<()> {
        let mut preferences = Map::new();
        preferences.insert(key.to_string(), Value::from(port.get()));
        let payload = Value::Object(preferences).to_string();

        self.client
            .post(self.endpoints.set_preferences.clone())
            .form(&[("json", payload.as_str())])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| SyncError::client_request(operation, err))?;
        Ok(())
    }
}

#[async_trait]
impl TorrentConfigClient for QbittorrentClient {
    type Session = QbitSession;

    async fn authenticate(&self, credentials: &Credentials) -> SyncResult<QbitSession> {
        let url = self.endpoints.login.to_string();
        let failed = |reason: String, source: Option<reqwest::Error>| {
            SyncError::AuthenticationFailed {
                url: url.clone(),
                reason,
                source: source
                    .map(|err| Box::new(err) as Box<dyn std::error::Error + Send + Sync>),
            }
        };

        debug!(url = %url, username = credentials.username(), "logging in to qBittorrent");
        let response = self
            .client
            .post(self.endpoints.login.clone())
            .header(REFERER, self.base_url.as_str())
            .form(&[
                ("username", credentials.username()),
                ("password", credentials.password()),
            ])
            .send()
            .await
            .map_err(|err| failed("service unreachable".to_string(), Some(err)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| failed("login response unreadable".to_string(), Some(err)))?;

        if !status.is_success() {
            return Err(failed(format!("status {}", status.as_u16()), None));
        }
        if body.trim() != LOGIN_ACCEPTED {
            return Err(failed(body.trim().to_string(), None));
        }

        self.log_versions().await;
        Ok(QbitSession)
    }

    async fn current_listen_port(&self, _session: &QbitSession) -> SyncResult<Option<i64>> {
        let response = self
            .client
            .get(self.endpoints.preferences.clone())
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| SyncError::client_request("get_preferences", err))?;

        let preferences: Map<String, Value> = response
            .json()
            .await
            .map_err(|err| SyncError::client_request("get_preferences", err))?;
        listen_port(&preferences)
    }

    async fn apply_port(&self, _session: &QbitSession, port: ForwardedPort) -> SyncResult<()> {
        self.set_preference(LISTEN_PORT_KEY, port, "set_listen_port")
            .await?;
        info!(port = port.get(), "listen port updated");

        if let Err(err) = self
            .set_preference(EMBEDDED_TRACKER_PORT_KEY, port, "set_embedded_tracker_port")
            .await
        {
            warn!(
                port = port.get(),
                "listen port already applied; embedded tracker port update failed"
            );
            return Err(err);
        }
        info!(port = port.get(), "embedded tracker port updated");
        Ok(())
    }

    async fn release(&self, _session: QbitSession) {
        let result = self
            .client
            .post(self.endpoints.logout.clone())
            .header(REFERER, self.base_url.as_str())
            .send()
            .await
            .and_then(reqwest::Response::error_for_status);
        if let Err(err) = result {
            debug!(error = %err, "qBittorrent logout failed");
        }
    }
}

fn listen_port(preferences: &Map<String, Value>) -> SyncResult<Option<i64>> {
    match preferences.get(LISTEN_PORT_KEY) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_i64()
            .map(Some)
            .ok_or_else(|| SyncError::InvalidPreference {
                key: LISTEN_PORT_KEY,
                value: value.to_string(),
            }),
    }
}
