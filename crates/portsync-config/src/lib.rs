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

//! Runtime configuration for a reconciliation pass.
//!
//! Layout: `defaults.rs` (deployment defaults), `model.rs` (typed settings and
//! validation), `error.rs` (validation failures).

pub mod defaults;
pub mod error;
pub mod model;

pub use error::{ConfigError, ConfigResult};
pub use model::{PortSourceConfig, SyncConfig, TorrentClientConfig};
