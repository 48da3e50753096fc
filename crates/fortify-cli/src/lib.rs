//! fortify library - command handlers behind the `fortify` binary
//!
//! Exposed as a library so handlers can be tested without spawning the binary.

pub mod commands;
pub mod common;
pub mod errors;
pub mod output;

pub use common::GlobalOpts;
pub use fortify_config as config_manager;
pub use fortify_logger as logger;

use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive
pub const LOG_FILTER_ENV: &str = "FORTIFY_LOG";

/// Install the stderr `tracing` subscriber
///
/// `FORTIFY_LOG` wins when set; otherwise the level follows `-v`.
pub fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}
