//! Common types and utilities shared across commands

use crate::config_manager::Config;
use crate::errors::CliError;
use crate::output::OutputFormat;
use clap::Parser;
use fortify_bridge::BridgeOptions;
use std::path::PathBuf;
use std::time::Duration;

/// Global CLI options available to all commands
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    #[arg(short, long, global = true, help = "Suppress console messages except errors; results are still printed")]
    pub quiet: bool,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Increase verbosity (-v for debug, -vv for trace)")]
    pub verbose: u8,

    #[arg(long, global = true, help = "Disable colored output")]
    pub no_color: bool,

    #[arg(short, long, global = true, value_name = "PATH", help = "Use this config file")]
    pub config: Option<PathBuf>,

    #[arg(
        short,
        long,
        global = true,
        value_name = "PATH",
        help = "Directory containing the FortifyJS library"
    )]
    pub library_path: Option<PathBuf>,

    #[arg(long, global = true, value_name = "PATH", help = "Node.js binary to run")]
    pub runtime: Option<PathBuf>,

    #[arg(long, global = true, help = "Print results as JSON")]
    pub json: bool,

    #[arg(
        long,
        global = true,
        value_name = "SECS",
        help = "Kill the runtime after this many seconds (0 disables)"
    )]
    pub timeout: Option<u64>,
}

impl GlobalOpts {
    /// Get the effective verbosity level
    /// - 0: quiet/warn only
    /// - 1: debug (-v)
    /// - 2: trace (-vv)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Load the config file named by `--config`, or the resolved default
    pub fn load_config(&self) -> Result<Config, CliError> {
        let config = match self.config {
            Some(ref path) => Config::load_from(path)?,
            None => Config::load()?,
        };
        Ok(config)
    }

    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::path)
    }

    /// Merge flags over config values into the options a bridge is built from
    pub fn bridge_options(&self, config: &Config) -> BridgeOptions {
        let timeout = match self.timeout {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => config.timeout(),
        };

        BridgeOptions {
            runtime: self
                .runtime
                .clone()
                .unwrap_or_else(|| config.runtime_program()),
            library_hint: self.library_path.clone().or_else(|| config.library_hint()),
            package_name: config.package_name().to_string(),
            prefer_installed: config.prefer_installed(),
            timeout,
            ..BridgeOptions::default()
        }
    }

    pub fn output_format(&self, config: &Config) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::from_name(config.output_format())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_level() {
        let opts = GlobalOpts {
            quiet: true,
            verbose: 2,
            ..GlobalOpts::default()
        };
        assert_eq!(opts.verbosity_level(), 0);

        let opts = GlobalOpts {
            verbose: 2,
            ..GlobalOpts::default()
        };
        assert_eq!(opts.verbosity_level(), 2);
    }

    #[test]
    fn test_flags_override_config() {
        let config = Config {
            runtime_path: Some("/opt/node/bin/node".to_string()),
            library_path: Some("/srv/fortifyjs".to_string()),
            timeout_secs: Some(30),
            ..Config::default()
        };
        let opts = GlobalOpts {
            runtime: Some(PathBuf::from("/usr/local/bin/node")),
            timeout: Some(0),
            ..GlobalOpts::default()
        };

        let options = opts.bridge_options(&config);
        assert_eq!(options.runtime, PathBuf::from("/usr/local/bin/node"));
        assert_eq!(options.library_hint, Some(PathBuf::from("/srv/fortifyjs")));
        assert!(options.timeout.is_none());
    }

    #[test]
    fn test_config_fills_missing_flags() {
        let config = Config {
            timeout_secs: Some(30),
            prefer_installed: Some(true),
            package_name: Some("@acme/fortify".to_string()),
            ..Config::default()
        };
        let options = GlobalOpts::default().bridge_options(&config);
        assert_eq!(options.timeout, Some(Duration::from_secs(30)));
        assert!(options.prefer_installed);
        assert_eq!(options.package_name, "@acme/fortify");
    }

    #[test]
    fn test_json_flag_wins_over_config() {
        let config = Config {
            output_format: Some("text".to_string()),
            ..Config::default()
        };
        let opts = GlobalOpts {
            json: true,
            ..GlobalOpts::default()
        };
        assert_eq!(opts.output_format(&config), OutputFormat::Json);
        assert_eq!(GlobalOpts::default().output_format(&config), OutputFormat::Text);
    }
}
