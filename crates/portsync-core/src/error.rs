//! # Design
//!
//! - One taxonomy for every failure a reconciliation pass can hit.
//! - Messages stay constant; diagnostic context rides in the variant fields.
//! - Each variant maps to exactly one [`ExitCode`].

use std::error::Error;
use std::fmt::{self, Display, Formatter};

use thiserror::Error;

use crate::exit::ExitCode;

/// Convenience alias for reconciliation results.
pub type SyncResult<T> = Result<T, SyncError>;

/// Failures raised while resolving, reading, or applying ports.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The forwarded port source could not be reached or read.
    #[error("forwarded port source unavailable")]
    SourceUnavailable {
        /// File path or URL of the source.
        location: String,
        /// Underlying transport or filesystem failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The source answered, but not with a usable port.
    #[error("forwarded port source returned an unusable response")]
    SourceProtocol {
        /// File path or URL of the source.
        location: String,
        /// What was wrong with the response.
        fault: ProtocolFault,
    },
    /// The forwarded port parsed but lies outside `1024..=65534`.
    #[error("forwarded port out of range")]
    PortOutOfRange {
        /// Rejected value.
        value: i64,
    },
    /// The torrent client rejected the credentials or could not be reached.
    #[error("torrent client authentication failed")]
    AuthenticationFailed {
        /// Login endpoint.
        url: String,
        /// Short reason reported by the client or the transport.
        reason: String,
        /// Underlying transport failure when there was one.
        #[source]
        source: Option<Box<dyn Error + Send + Sync>>,
    },
    /// A preference held a value that is not a port number.
    #[error("torrent client preference has an invalid value")]
    InvalidPreference {
        /// Preference key.
        key: &'static str,
        /// Raw value as returned by the client.
        value: String,
    },
    /// A torrent client request failed after authentication.
    #[error("torrent client request failed")]
    ClientRequest {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl SyncError {
    /// Exit code reported when this error ends the run.
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self {
            Self::SourceProtocol {
                fault: ProtocolFault::UnexpectedStatus { .. },
                ..
            } => ExitCode::HttpError,
            Self::SourceProtocol { .. } | Self::PortOutOfRange { .. } => ExitCode::InvalidPort,
            Self::AuthenticationFailed { .. } => ExitCode::AuthenticationFailed,
            Self::SourceUnavailable { .. }
            | Self::InvalidPreference { .. }
            | Self::ClientRequest { .. } => ExitCode::BaseError,
        }
    }

    /// Wrap a transport failure for a post-login torrent client call.
    pub fn client_request(
        operation: &'static str,
        source: impl Into<Box<dyn Error + Send + Sync>>,
    ) -> Self {
        Self::ClientRequest {
            operation,
            source: source.into(),
        }
    }
}

/// Ways a port source response can be unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolFault {
    /// The control server answered with a non-200 status.
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
    },
    /// The response body could not be decoded.
    MalformedBody {
        /// Decoder error detail.
        detail: String,
    },
    /// The response body has no `port` field.
    MissingPort,
    /// The port value is not an integer.
    MalformedPort {
        /// Offending value.
        value: String,
    },
}

impl Display for ProtocolFault {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedStatus { status } => write!(formatter, "unexpected status {status}"),
            Self::MalformedBody { detail } => write!(formatter, "malformed body: {detail}"),
            Self::MissingPort => formatter.write_str("missing port data"),
            Self::MalformedPort { value } => write!(formatter, "port is not an integer: {value:?}"),
        }
    }
}
