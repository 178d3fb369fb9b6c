//! Tracing subscriber setup

use crate::config::{LogFormat, RtmConfig};
use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber
///
/// `RUST_LOG` wins over `config.log_filter`. Returns `false` if a global
/// subscriber was already installed, which leaves that one in place.
pub fn init_tracing(config: &RtmConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match config.log_format {
        LogFormat::Pretty => builder.try_init().is_ok(),
        LogFormat::Json => builder.json().try_init().is_ok(),
    };
    if installed {
        tracing::debug!(filter = %config.log_filter, "tracing initialized");
    }
    installed
}
