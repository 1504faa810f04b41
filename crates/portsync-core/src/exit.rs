//! Process exit codes consumed by schedulers and health checks.

use crate::error::SyncResult;
use crate::reconcile::{FailureReason, ReconciliationOutcome};

/// Stable exit codes. The numeric values are part of the external contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ExitCode {
    /// Ports matched or were updated.
    Success = 0,
    /// Unclassified failure.
    BaseError = 1,
    /// Torrent client authentication failed.
    AuthenticationFailed = 2,
    /// Control server answered with a non-200 status.
    HttpError = 3,
    /// Forwarded port invalid or absent.
    InvalidPort = 4,
    /// Torrent client preference key not found.
    PreferenceMissing = 5,
}

impl ExitCode {
    /// Numeric value passed to `std::process::exit`.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Exit code for a completed pass.
    #[must_use]
    pub const fn from_outcome(outcome: &ReconciliationOutcome) -> Self {
        match outcome {
            ReconciliationOutcome::NoChangeNeeded | ReconciliationOutcome::Updated => {
                Self::Success
            }
            ReconciliationOutcome::Failed(FailureReason::PreferenceMissing { .. }) => {
                Self::PreferenceMissing
            }
        }
    }

    /// Exit code for the result of [`crate::run_pass`].
    #[must_use]
    pub const fn from_result(result: &SyncResult<ReconciliationOutcome>) -> Self {
        match result {
            Ok(outcome) => Self::from_outcome(outcome),
            Err(err) => err.exit_code(),
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.code()
    }
}
