use std::path::PathBuf;

use async_trait::async_trait;
use portsync_core::{ForwardedPort, PortSource, ProtocolFault, SyncError, SyncResult};
use tracing::debug;

/// Reads the port from the plain-text file gluetun keeps up to date.
#[derive(Debug, Clone)]
pub(crate) struct FilePortSource {
    path: PathBuf,
}

impl FilePortSource {
    pub(crate) const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl PortSource for FilePortSource {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    async fn resolve(&self) -> SyncResult<ForwardedPort> {
        debug!(path = %self.path.display(), "reading forwarded port file");
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|err| SyncError::SourceUnavailable {
                location: self.location(),
                source: Box::new(err),
            })?;
        let raw = std::str::from_utf8(&bytes).map_err(|_| SyncError::SourceProtocol {
            location: self.location(),
            fault: ProtocolFault::MalformedPort {
                value: String::from_utf8_lossy(&bytes).into_owned(),
            },
        })?;
        ForwardedPort::parse(raw, &self.location())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portsync_core::ExitCode;
    use std::fs;
    use tempfile::TempDir;

    fn write_port_file(dir: &TempDir, contents: &[u8]) -> PathBuf {
        let path = dir.path().join("forwarded_port");
        fs::write(&path, contents).expect("write port file");
        path
    }

    #[tokio::test]
    async fn reads_port_with_trailing_newline() {
        let dir = TempDir::new().expect("tempdir");
        let source = FilePortSource::new(write_port_file(&dir, b"51413\n"));
        let port = source.resolve().await.expect("valid port");
        assert_eq!(port.get(), 51413);
    }

    #[tokio::test]
    async fn missing_file_is_unavailable() {
        let dir = TempDir::new().expect("tempdir");
        let source = FilePortSource::new(dir.path().join("absent"));
        let err = source.resolve().await.expect_err("missing file");
        assert!(matches!(err, SyncError::SourceUnavailable { .. }));
        assert_eq!(err.exit_code(), ExitCode::BaseError);
    }

    #[tokio::test]
    async fn non_numeric_content_is_invalid_port() {
        let dir = TempDir::new().expect("tempdir");
        let source = FilePortSource::new(write_port_file(&dir, b"not-a-port"));
        let err = source.resolve().await.expect_err("garbage");
        assert_eq!(err.exit_code(), ExitCode::InvalidPort);
    }

    #[tokio::test]
    async fn empty_file_is_invalid_port() {
        let dir = TempDir::new().expect("tempdir");
        let source = FilePortSource::new(write_port_file(&dir, b""));
        let err = source.resolve().await.expect_err("empty");
        assert!(matches!(
            err,
            SyncError::SourceProtocol {
                fault: ProtocolFault::MalformedPort { .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn out_of_range_content_is_rejected() {
        let dir = TempDir::new().expect("tempdir");
        let source = FilePortSource::new(write_port_file(&dir, b"65535"));
        let err = source.resolve().await.expect_err("out of range");
        assert!(matches!(err, SyncError::PortOutOfRange { value: 65535 }));
    }

    #[tokio::test]
    async fn invalid_utf8_is_invalid_port() {
        let dir = TempDir::new().expect("tempdir");
        let source = FilePortSource::new(write_port_file(&dir, &[0xff, 0xfe]));
        let err = source.resolve().await.expect_err("binary");
        assert_eq!(err.exit_code(), ExitCode::InvalidPort);
    }
}
