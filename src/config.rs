//! Configuration loading.
//!
//! Settings come from a TOML file (explicit path, `~/.tasklist/config.toml`,
//! then `./tasklist.toml`), are overridden by `TASKLIST_*` environment
//! variables, and finally by command-line flags in `main`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::controller::DEFAULT_CACHE_KEY;
use crate::fields::HydrationPolicy;
use crate::remote::http::DEFAULT_BASE_URL;

pub const ENV_BASE_URL: &str = "TASKLIST_BASE_URL";
pub const ENV_CACHE_DIR: &str = "TASKLIST_CACHE_DIR";
pub const ENV_LOG: &str = "TASKLIST_LOG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RemoteConfig {
    pub base_url: String,
    /// Request timeout; unset keeps the transport default.
    pub timeout_ms: Option<u64>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CacheConfig {
    /// When false the snapshot only lives for the current process.
    pub enabled: bool,
    pub directory: Option<PathBuf>,
    pub key: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            enabled: true,
            directory: None,
            key: DEFAULT_CACHE_KEY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `tasklist=debug`.
    pub level: String,
    /// Where the TUI writes its log file.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "warn".to_string(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub hydration: HydrationPolicy,
    pub remote: RemoteConfig,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Cache directory, defaulting to `<data dir>/cache`.
    pub fn cache_dir(&self) -> PathBuf {
        self.cache
            .directory
            .clone()
            .unwrap_or_else(|| data_dir().join("cache"))
    }

    /// Log directory, defaulting to `<data dir>/logs`.
    pub fn log_dir(&self) -> PathBuf {
        self.logging
            .directory
            .clone()
            .unwrap_or_else(|| data_dir().join("logs"))
    }

    /// Apply `TASKLIST_*` overrides from `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = non_empty(ENV_BASE_URL) {
            self.remote.base_url = v;
        }
        if let Some(v) = non_empty(ENV_CACHE_DIR) {
            self.cache.directory = Some(PathBuf::from(v));
        }
        if let Some(v) = non_empty(ENV_LOG) {
            self.logging.level = v;
        }
    }
}

/// `~/.tasklist`, or `./.tasklist` when no home directory is known.
pub fn data_dir() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".tasklist")
}

/// Parse a config file.
pub fn load_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&s).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolve the configuration: explicit file, else the first default location
/// that exists, else built-in defaults; then environment overrides.
pub fn load(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut cfg = match explicit {
        Some(path) => load_file(path)?,
        None => {
            let candidates = [data_dir().join("config.toml"), PathBuf::from("tasklist.toml")];
            match candidates.iter().find(|p| p.exists()) {
                Some(path) => load_file(path)?,
                None => AppConfig::default(),
            }
        }
    };
    cfg.apply_env(|key| std::env::var(key).ok());
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_the_stock_server() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.remote.base_url, "http://localhost:5000/api");
        assert_eq!(cfg.remote.timeout_ms, None);
        assert!(cfg.cache.enabled);
        assert_eq!(cfg.cache.key, "tasks");
        assert_eq!(cfg.hydration, HydrationPolicy::CacheFirst);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasklist.toml");
        std::fs::write(
            &path,
            r#"
hydration = "remote-first"

[remote]
base_url = "http://tasks.internal/api"
timeout_ms = 2500
"#,
        )
        .unwrap();

        let cfg = load_file(&path).unwrap();
        assert_eq!(cfg.hydration, HydrationPolicy::RemoteFirst);
        assert_eq!(cfg.remote.base_url, "http://tasks.internal/api");
        assert_eq!(cfg.remote.timeout_ms, Some(2500));
        assert_eq!(cfg.cache, CacheConfig::default());
    }

    #[test]
    fn bad_toml_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "hydration = [").unwrap();
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn env_overrides_ignore_blank_values() {
        let env: HashMap<&str, &str> = [
            (ENV_BASE_URL, "http://override/api"),
            (ENV_CACHE_DIR, "  "),
            (ENV_LOG, "tasklist=debug"),
        ]
        .into_iter()
        .collect();

        let mut cfg = AppConfig::default();
        cfg.apply_env(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.remote.base_url, "http://override/api");
        assert_eq!(cfg.cache.directory, None);
        assert_eq!(cfg.logging.level, "tasklist=debug");
    }

    #[test]
    fn explicit_cache_dir_wins() {
        let mut cfg = AppConfig::default();
        cfg.cache.directory = Some(PathBuf::from("/var/cache/tl"));
        assert_eq!(cfg.cache_dir(), PathBuf::from("/var/cache/tl"));
    }
}
