#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Port reconciliation primitives shared by the `portsync` workspace.
//!
//! Layout:
//! - `port.rs`: the validated [`ForwardedPort`] and its text parser
//! - `error.rs`: the failure taxonomy and its exit-code mapping
//! - `exit.rs`: the stable process exit codes
//! - `reconcile.rs`: the side-effect-free decision function
//! - `service.rs`: capability traits for port sources and torrent clients
//! - `pass.rs`: one reconciliation pass wiring the pieces together

mod error;
mod exit;
mod pass;
mod port;
mod reconcile;
mod service;

pub use error::{ProtocolFault, SyncError, SyncResult};
pub use exit::ExitCode;
pub use pass::run_pass;
pub use port::{ForwardedPort, MAX_FORWARDED_PORT, MIN_FORWARDED_PORT};
pub use reconcile::{FailureReason, ReconciliationOutcome, decide};
pub use service::{
    Credentials, EMBEDDED_TRACKER_PORT_KEY, LISTEN_PORT_KEY, PortSource, TorrentConfigClient,
};
