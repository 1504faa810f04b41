//! One reconciliation pass: resolve, compare, optionally apply.

use tracing::{info, warn};

use crate::error::SyncResult;
use crate::port::ForwardedPort;
use crate::reconcile::{ReconciliationOutcome, decide};
use crate::service::{Credentials, PortSource, TorrentConfigClient};

/// Run a single pass against `source` and `client`.
///
/// The torrent client session is released on every path once login has
/// succeeded, whether the pass completes, fails, or reports a missing
/// preference.
///
/// # Errors
///
/// Returns the first [`crate::SyncError`] raised by the source or client.
/// A missing listen port preference is not an error; it is reported as
/// [`ReconciliationOutcome::Failed`].
pub async fn run_pass<S, C>(
    source: &S,
    client: &C,
    credentials: &Credentials,
) -> SyncResult<ReconciliationOutcome>
where
    S: PortSource + ?Sized,
    C: TorrentConfigClient + ?Sized,
{
    let forwarded = source.resolve().await?;
    info!(port = forwarded.get(), source = %source.location(), "VPN port resolved");

    let session = client.authenticate(credentials).await?;
    let result = reconcile_session(client, &session, forwarded).await;
    client.release(session).await;
    result
}

async fn reconcile_session<C>(
    client: &C,
    session: &C::Session,
    forwarded: ForwardedPort,
) -> SyncResult<ReconciliationOutcome>
where
    C: TorrentConfigClient + ?Sized,
{
    let current = client.current_listen_port(session).await?;
    if let Some(current) = current {
        info!(port = current, "torrent port read");
    }

    let outcome = decide(forwarded, current);
    match outcome {
        ReconciliationOutcome::NoChangeNeeded => {
            info!(port = forwarded.get(), "ports matched, no change");
        }
        ReconciliationOutcome::Updated => {
            client.apply_port(session, forwarded).await?;
        }
        ReconciliationOutcome::Failed(reason) => {
            warn!(?reason, "reconciliation could not be decided");
        }
    }
    Ok(outcome)
}
