//! Configuration management for the fortify CLI
//!
//! The configuration lives in a TOML file (see [`Config::path`]). Every field is
//! optional; accessors fall back to the built-in defaults so callers always get a
//! fully-resolved value.

pub mod paths;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use which::which;

pub const DEFAULT_RUNTIME: &str = "node";
pub const DEFAULT_PACKAGE_NAME: &str = "fortifyjs";
pub const DEFAULT_KEY_TYPE: &str = "ed25519";
pub const DEFAULT_HASH_ALGORITHM: &str = "argon2id";
pub const DEFAULT_ENCRYPTION_ALGORITHM: &str = "aes-256-gcm";
pub const DEFAULT_OUTPUT_FORMAT: &str = "text";

/// Keys accepted by [`Config::get`] and [`Config::set`]
pub const KNOWN_KEYS: &[&str] = &[
    "library-path",
    "runtime-path",
    "package-name",
    "prefer-installed",
    "timeout-secs",
    "default-key-type",
    "default-hash-algorithm",
    "default-encryption-algorithm",
    "output-format",
    "key-storage-path",
];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Unknown config key: {0}. Supported keys: {keys}", keys = KNOWN_KEYS.join(", "))]
    UnknownKey(String),

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefer_installed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_key_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_hash_algorithm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_encryption_algorithm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_storage_path: Option<String>,
}

impl Config {
    pub fn path() -> PathBuf {
        // Honor explicit override via FORTIFY_CONFIG for tests / isolated runs.
        if let Ok(env_path) = std::env::var(paths::CONFIG_ENV_VAR) {
            let trimmed = env_path.trim();
            if !trimmed.is_empty() {
                return PathBuf::from(trimmed);
            }
        }

        let default = paths::default_config_file();

        // A pointer file next to the default config redirects to another location.
        if let Some(parent) = default.parent() {
            let pointer = parent.join(paths::POINTER_FILE_NAME);
            if pointer.exists() {
                if let Ok(contents) = fs::read_to_string(&pointer) {
                    let trimmed = contents.trim();
                    if !trimmed.is_empty() {
                        return PathBuf::from(trimmed);
                    }
                }
            }
        }

        default
    }

    /// Path of the pointer file consulted by [`Config::path`]
    pub fn pointer_path() -> PathBuf {
        paths::config_dir().join(paths::POINTER_FILE_NAME)
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path())
    }

    /// Load from an explicit file; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let value = match key {
            "library-path" => self.library_path.clone(),
            "runtime-path" => self.runtime_path.clone(),
            "package-name" => self.package_name.clone(),
            "prefer-installed" => self.prefer_installed.map(|v| v.to_string()),
            "timeout-secs" => self.timeout_secs.map(|v| v.to_string()),
            "default-key-type" => self.default_key_type.clone(),
            "default-hash-algorithm" => self.default_hash_algorithm.clone(),
            "default-encryption-algorithm" => self.default_encryption_algorithm.clone(),
            "output-format" => self.output_format.clone(),
            "key-storage-path" => self.key_storage_path.clone(),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        };
        Ok(value)
    }

    pub fn set(&mut self, key: &str, value: String) -> Result<(), ConfigError> {
        match key {
            "library-path" => self.library_path = Some(value),
            "runtime-path" => self.runtime_path = Some(value),
            "package-name" => self.package_name = Some(value),
            "prefer-installed" => {
                let parsed = value
                    .parse::<bool>()
                    .map_err(|e| invalid_value(key, &value, e))?;
                self.prefer_installed = Some(parsed);
            }
            "timeout-secs" => {
                let parsed = value
                    .parse::<u64>()
                    .map_err(|e| invalid_value(key, &value, e))?;
                self.timeout_secs = Some(parsed);
            }
            "default-key-type" => self.default_key_type = Some(value),
            "default-hash-algorithm" => self.default_hash_algorithm = Some(value),
            "default-encryption-algorithm" => self.default_encryption_algorithm = Some(value),
            "output-format" => {
                if !matches!(value.as_str(), "text" | "json") {
                    return Err(invalid_value(key, &value, "expected 'text' or 'json'"));
                }
                self.output_format = Some(value);
            }
            "key-storage-path" => self.key_storage_path = Some(value),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        *self == Config::default()
    }

    /// Set values in display order, keyed by their kebab-case names
    pub fn values_iter(&self) -> Vec<(&'static str, String)> {
        KNOWN_KEYS
            .iter()
            .filter_map(|key| match self.get(key) {
                Ok(Some(value)) => Some((*key, value)),
                _ => None,
            })
            .collect()
    }

    /// The value `key` resolves to, falling back to its built-in default
    ///
    /// `library-path` and `timeout-secs` have no default and stay `None` when unset.
    pub fn effective(&self, key: &str) -> Result<Option<String>, ConfigError> {
        if let Some(value) = self.get(key)? {
            return Ok(Some(value));
        }
        let default = match key {
            "runtime-path" => Some(self.runtime_program().display().to_string()),
            "package-name" => Some(self.package_name().to_string()),
            "prefer-installed" => Some(self.prefer_installed().to_string()),
            "default-key-type" => Some(self.default_key_type().to_string()),
            "default-hash-algorithm" => Some(self.default_hash_algorithm().to_string()),
            "default-encryption-algorithm" => {
                Some(self.default_encryption_algorithm().to_string())
            }
            "output-format" => Some(self.output_format().to_string()),
            "key-storage-path" => Some(self.key_storage_path().display().to_string()),
            _ => None,
        };
        Ok(default)
    }

    /// The runtime program to launch
    ///
    /// A configured `runtime-path` wins; otherwise `node` is looked up on PATH,
    /// falling back to the bare name so the bridge can report it as unavailable.
    pub fn runtime_program(&self) -> PathBuf {
        if let Some(ref path) = self.runtime_path {
            return PathBuf::from(path);
        }
        which(DEFAULT_RUNTIME).unwrap_or_else(|_| PathBuf::from(DEFAULT_RUNTIME))
    }

    pub fn library_hint(&self) -> Option<PathBuf> {
        self.library_path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
    }

    pub fn package_name(&self) -> &str {
        self.package_name.as_deref().unwrap_or(DEFAULT_PACKAGE_NAME)
    }

    pub fn prefer_installed(&self) -> bool {
        self.prefer_installed.unwrap_or(false)
    }

    /// Bounded wait for runtime children; `None` (or 0) waits indefinitely
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn default_key_type(&self) -> &str {
        self.default_key_type.as_deref().unwrap_or(DEFAULT_KEY_TYPE)
    }

    pub fn default_hash_algorithm(&self) -> &str {
        self.default_hash_algorithm
            .as_deref()
            .unwrap_or(DEFAULT_HASH_ALGORITHM)
    }

    pub fn default_encryption_algorithm(&self) -> &str {
        self.default_encryption_algorithm
            .as_deref()
            .unwrap_or(DEFAULT_ENCRYPTION_ALGORITHM)
    }

    pub fn output_format(&self) -> &str {
        self.output_format.as_deref().unwrap_or(DEFAULT_OUTPUT_FORMAT)
    }

    pub fn key_storage_path(&self) -> PathBuf {
        self.key_storage_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(paths::default_key_storage_dir)
    }

    pub fn ensure_key_storage_path(&self) -> Result<PathBuf, ConfigError> {
        let path = self.key_storage_path();
        fs::create_dir_all(&path)?;
        Ok(path)
    }
}

fn invalid_value(key: &str, value: &str, reason: impl std::fmt::Display) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_new() {
        let config = Config::default();
        assert!(config.is_empty());
        assert_eq!(config.package_name(), "fortifyjs");
        assert_eq!(config.default_key_type(), "ed25519");
        assert_eq!(config.default_hash_algorithm(), "argon2id");
        assert_eq!(config.default_encryption_algorithm(), "aes-256-gcm");
        assert_eq!(config.output_format(), "text");
        assert!(config.timeout().is_none());
    }

    #[test]
    fn test_config_set_get() {
        let mut config = Config::default();
        assert!(config.set("library-path", "/opt/fortifyjs".to_string()).is_ok());
        assert_eq!(
            config.get("library-path").ok().flatten(),
            Some("/opt/fortifyjs".to_string())
        );
        assert_eq!(config.library_hint(), Some(PathBuf::from("/opt/fortifyjs")));
        assert!(!config.is_empty());
    }

    #[test]
    fn test_config_typed_values() {
        let mut config = Config::default();
        assert!(config.set("timeout-secs", "30".to_string()).is_ok());
        assert!(config.set("prefer-installed", "true".to_string()).is_ok());
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
        assert!(config.prefer_installed());

        assert!(config.set("timeout-secs", "0".to_string()).is_ok());
        assert!(config.timeout().is_none());
    }

    #[test]
    fn test_config_rejects_bad_values() {
        let mut config = Config::default();
        assert!(matches!(
            config.set("timeout-secs", "soon".to_string()),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.set("output-format", "yaml".to_string()),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(config.is_empty());
    }

    #[test]
    fn test_config_unknown_key() {
        let mut config = Config::default();
        assert!(matches!(
            config.set("unknown-key", "value".to_string()),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            config.get("unknown-key"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_blank_library_path_is_no_hint() {
        let config = Config {
            library_path: Some("   ".to_string()),
            ..Config::default()
        };
        assert!(config.library_hint().is_none());
    }

    #[test]
    fn test_effective_falls_back_to_defaults() {
        let mut config = Config::default();
        assert_eq!(
            config.effective("default-hash-algorithm").ok().flatten(),
            Some(DEFAULT_HASH_ALGORITHM.to_string())
        );
        assert_eq!(config.effective("timeout-secs").ok().flatten(), None);

        let _ = config.set("default-hash-algorithm", "pbkdf2".to_string());
        assert_eq!(
            config.effective("default-hash-algorithm").ok().flatten(),
            Some("pbkdf2".to_string())
        );
        assert!(config.effective("nope").is_err());
    }

    #[test]
    fn test_values_iter_order() {
        let mut config = Config::default();
        let _ = config.set("output-format", "json".to_string());
        let _ = config.set("library-path", "/lib".to_string());
        let keys: Vec<&str> = config.values_iter().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["library-path", "output-format"]);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let Ok(dir) = TempDir::new() else {
            return;
        };
        let path = dir.path().join("sub").join("fortify.toml");

        let mut config = Config::default();
        let _ = config.set("runtime-path", "/usr/local/bin/node".to_string());
        let _ = config.set("timeout-secs", "5".to_string());
        assert!(config.save_to(&path).is_ok());

        let loaded = Config::load_from(&path);
        assert!(loaded.is_ok_and(|c| c == config));
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let missing = PathBuf::from("/tmp/non_existent_fortify_config_12345.toml");
        assert!(Config::load_from(&missing).is_ok_and(|c| c.is_empty()));
    }

    #[test]
    fn test_load_reads_snake_case_keys() {
        let Ok(dir) = TempDir::new() else {
            return;
        };
        let path = dir.path().join("fortify.toml");
        let written = fs::write(
            &path,
            "default_key_type = \"rsa\"\nprefer_installed = true\n",
        );
        assert!(written.is_ok());

        let loaded = Config::load_from(&path);
        assert!(loaded.is_ok_and(|c| c.default_key_type() == "rsa" && c.prefer_installed()));
    }

    #[test]
    fn test_config_default_key_storage_path() {
        let config = Config::default();
        assert!(config.key_storage_path().ends_with("fortify/keys"));
    }
}
