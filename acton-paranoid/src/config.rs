//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables (prefix: PARANOID_, sections separated by `__`)
//! 2. Current working directory: ./paranoid.toml
//! 3. XDG config directory: ~/.config/acton-paranoid/config.toml
//! 4. Default values
//!
//! ```toml
//! [soft_delete]
//! column = "deleted_at"
//!
//! [logging]
//! level = "info"
//! json = true
//! ```

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::schema::DEFAULT_PARANOIA_COLUMN;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Soft-delete configuration
    #[serde(default)]
    pub soft_delete: SoftDeleteConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Soft-delete configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftDeleteConfig {
    /// Marker column for types registered without an explicit one
    #[serde(default = "default_column")]
    pub column: String,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log filter directive (trace, debug, info, warn, error or an EnvFilter expression)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default = "default_true")]
    pub json: bool,
}

impl Default for SoftDeleteConfig {
    fn default() -> Self {
        Self {
            column: default_column(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: default_true(),
        }
    }
}

fn default_column() -> String {
    DEFAULT_PARANOIA_COLUMN.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from all sources
    ///
    /// Searches for config files in this order (first found wins):
    /// 1. Current working directory: ./paranoid.toml
    /// 2. XDG config directory: ~/.config/acton-paranoid/config.toml
    ///
    /// Environment variables (PARANOID_ prefix) override all file-based configs.
    pub fn load() -> Result<Self> {
        let config_paths = Self::find_config_paths();

        tracing::debug!("Searching for config files in order:");
        for path in &config_paths {
            tracing::debug!("  - {}", path.display());
        }

        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Lowest priority first so that higher priority files override
        for path in config_paths.iter().rev() {
            if path.exists() {
                tracing::info!("Loading configuration from: {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }

        let config = figment.merge(Self::env()).extract()?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honouring environment overrides
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Self::env())
            .extract()?;

        Ok(config)
    }

    fn env() -> Env {
        Env::prefixed("PARANOID_").split("__")
    }

    fn find_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("paranoid.toml")];

        let xdg_dirs = xdg::BaseDirectories::with_prefix("acton-paranoid");
        if let Some(path) = xdg_dirs.find_config_file("config.toml") {
            paths.push(path);
        }

        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.soft_delete.column, "deleted_at");
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.json);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[soft_delete]\ncolumn = \"removed_at\"\n\n[logging]\nlevel = \"debug\"").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.soft_delete.column, "removed_at");
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\njson = [1, 2]").unwrap();

        let error = Config::load_from(file.path()).unwrap_err();
        assert!(matches!(error, crate::error::Error::Config(_)));
    }
}
