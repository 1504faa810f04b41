//! Forwarded port sources exposed by the VPN sidecar.

mod control_server;
mod file;

use std::time::Duration;

use portsync_config::PortSourceConfig;
use portsync_core::PortSource;

use crate::client::CliResult;

pub(crate) use control_server::ControlServerSource;
pub(crate) use file::FilePortSource;

/// Build the source selected in configuration.
pub(crate) fn build_source(
    config: &PortSourceConfig,
    timeout: Duration,
) -> CliResult<Box<dyn PortSource>> {
    let source: Box<dyn PortSource> = match config {
        PortSourceConfig::File { path } => Box::new(FilePortSource::new(path.clone())),
        PortSourceConfig::ControlServer { base_url } => {
            Box::new(ControlServerSource::new(base_url, timeout)?)
        }
    };
    Ok(source)
}
