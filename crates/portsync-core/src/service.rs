//! Capability traits implemented by the I/O adapters.

use std::fmt::{self, Debug, Formatter};

use async_trait::async_trait;

use crate::error::SyncResult;
use crate::port::ForwardedPort;

/// Preference key holding the peer listen port.
pub const LISTEN_PORT_KEY: &str = "listen_port";
/// Preference key holding the embedded tracker port.
pub const EMBEDDED_TRACKER_PORT_KEY: &str = "embedded_tracker_port";

/// Where the currently forwarded port comes from.
#[async_trait]
pub trait PortSource: Send + Sync {
    /// Human-readable location (path or URL) used in logs.
    fn location(&self) -> String;

    /// Fetch and validate the forwarded port.
    async fn resolve(&self) -> SyncResult<ForwardedPort>;
}

/// Minimal view of a torrent client's management API.
#[async_trait]
pub trait TorrentConfigClient: Send + Sync {
    /// Authenticated session handle.
    type Session: Send + Sync;

    /// Log in to the client.
    async fn authenticate(&self, credentials: &Credentials) -> SyncResult<Self::Session>;

    /// Current listen port, or `None` when the preference is absent.
    async fn current_listen_port(&self, session: &Self::Session) -> SyncResult<Option<i64>>;

    /// Set the listen port and then the embedded tracker port to `port`.
    ///
    /// The writes are sequential and not rolled back: if the second write
    /// fails the first one stays applied.
    async fn apply_port(&self, session: &Self::Session, port: ForwardedPort) -> SyncResult<()>;

    /// Release the session. Never fails; problems are logged by the implementation.
    async fn release(&self, session: Self::Session);
}

/// Username and password for the torrent client.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Bundle a username and password.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Login name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Login secret.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl Debug for Credentials {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
