//! Platform-specific locations for fortify's configuration and key storage
//!
//! - **Unix/macOS**: `~/.config/fortify`
//! - **Windows**: `%APPDATA%\fortify`

use std::path::PathBuf;

/// Directory name used under the platform config root
pub const APP_DIR_NAME: &str = "fortify";

/// File name of the TOML configuration file
pub const CONFIG_FILE_NAME: &str = "fortify.toml";

/// Pointer file that redirects the config location, stored next to the default file
pub const POINTER_FILE_NAME: &str = ".fortify_config_path";

/// Subdirectory holding saved key material
pub const KEYS_DIR_NAME: &str = "keys";

/// Environment variable that overrides the config file location
pub const CONFIG_ENV_VAR: &str = "FORTIFY_CONFIG";

/// Resolve the fortify configuration directory
pub fn config_dir() -> PathBuf {
    #[cfg(not(target_os = "windows"))]
    let root = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    #[cfg(target_os = "windows")]
    let root = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));

    root.join(APP_DIR_NAME)
}

/// Default config file path, before env var or pointer file overrides
pub fn default_config_file() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

/// Default directory for saved keys
pub fn default_key_storage_dir() -> PathBuf {
    config_dir().join(KEYS_DIR_NAME)
}
