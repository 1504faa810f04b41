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
#![allow(clippy::redundant_pub_crate)]

//! Reconciles the qBittorrent listen port with the port gluetun forwards.
//!
//! Layout:
//! - `cli.rs`: argument parsing, logging setup, and exit code reporting
//! - `client.rs`: shared HTTP client construction and the CLI error type
//! - `source/`: forwarded port sources (port file, control server)
//! - `qbittorrent.rs`: qBittorrent WebUI adapter
//! - `main.rs`: thin entrypoint delegating to `run()`

pub(crate) mod cli;
pub(crate) mod client;
pub(crate) mod qbittorrent;
pub(crate) mod source;

pub use cli::{Cli, run, run_with};
