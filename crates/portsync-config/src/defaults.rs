//! Defaults matching a stock gluetun + qBittorrent deployment.

/// File gluetun writes the forwarded port to.
pub const DEFAULT_PORT_FILE: &str = "/tmp/gluetun/forwarded_port";
/// gluetun control server address.
pub const DEFAULT_CONTROL_SERVER_URL: &str = "http://127.0.0.1:8000";
/// qBittorrent WebUI address.
pub const DEFAULT_QBITTORRENT_URL: &str = "http://localhost:8080";
/// qBittorrent WebUI user.
pub const DEFAULT_QBITTORRENT_USERNAME: &str = "admin";
/// Connect and request timeout applied to every HTTP call.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
