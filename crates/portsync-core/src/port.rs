//! Validated forwarded port value.

use std::fmt::{self, Display, Formatter};

use crate::error::{ProtocolFault, SyncError, SyncResult};

/// Lowest port accepted as a forwarded port.
pub const MIN_FORWARDED_PORT: u16 = 1024;
/// Highest port accepted as a forwarded port.
pub const MAX_FORWARDED_PORT: u16 = 65_534;

/// Port currently forwarded by the VPN gateway.
///
/// Values only exist inside `MIN_FORWARDED_PORT..=MAX_FORWARDED_PORT`; every
/// source funnels through [`ForwardedPort::new`] so the range lives in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ForwardedPort(u16);

impl ForwardedPort {
    /// Validate a raw integer as a forwarded port.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::PortOutOfRange`] when `value` falls outside
    /// `1024..=65534`.
    pub fn new(value: i64) -> SyncResult<Self> {
        if !(i64::from(MIN_FORWARDED_PORT)..=i64::from(MAX_FORWARDED_PORT)).contains(&value) {
            return Err(SyncError::PortOutOfRange { value });
        }
        u16::try_from(value)
            .map(Self)
            .map_err(|_| SyncError::PortOutOfRange { value })
    }

    /// Parse the textual form used by port export files.
    ///
    /// Surrounding whitespace is ignored. `location` is recorded on failure.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::SourceProtocol`] when the text is not an integer and
    /// [`SyncError::PortOutOfRange`] when it is outside the accepted range.
    pub fn parse(raw: &str, location: &str) -> SyncResult<Self> {
        let trimmed = raw.trim();
        let value = trimmed
            .parse::<i64>()
            .map_err(|_| SyncError::SourceProtocol {
                location: location.to_string(),
                fault: ProtocolFault::MalformedPort {
                    value: trimmed.to_string(),
                },
            })?;
        Self::new(value)
    }

    /// Numeric port value.
    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }
}

impl TryFrom<i64> for ForwardedPort {
    type Error = SyncError;

    fn try_from(value: i64) -> SyncResult<Self> {
        Self::new(value)
    }
}

impl From<ForwardedPort> for u16 {
    fn from(port: ForwardedPort) -> Self {
        port.0
    }
}

impl Display for ForwardedPort {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}
