//! Pure reconciliation decision.

use crate::port::ForwardedPort;
use crate::service::LISTEN_PORT_KEY;

/// Result of comparing the forwarded port with the torrent client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconciliationOutcome {
    /// The client already listens on the forwarded port.
    NoChangeNeeded,
    /// The client must be (or was) moved to the forwarded port.
    Updated,
    /// The pass cannot complete.
    Failed(FailureReason),
}

/// Why a pass could not reach a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// The client's preference map has no listen port entry.
    PreferenceMissing {
        /// Missing preference key.
        key: &'static str,
    },
}

/// Decide what to do given the forwarded port and the client's listen port.
///
/// `current` is `None` when the client does not expose the listen port
/// preference, which usually means a client version or config mismatch.
#[must_use]
pub fn decide(forwarded: ForwardedPort, current: Option<i64>) -> ReconciliationOutcome {
    match current {
        None => ReconciliationOutcome::Failed(FailureReason::PreferenceMissing {
            key: LISTEN_PORT_KEY,
        }),
        Some(current) if current == i64::from(forwarded.get()) => {
            ReconciliationOutcome::NoChangeNeeded
        }
        Some(_) => ReconciliationOutcome::Updated,
    }
}
