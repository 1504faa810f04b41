//! Span helpers that tag every line of a pass with its run identifier.

use tracing::{Span, info_span};

/// Span wrapping one reconciliation pass.
#[must_use]
pub fn pass_span(run_id: &str, source_kind: &str) -> Span {
    info_span!("reconcile", run_id = %run_id, source = %source_kind)
}
