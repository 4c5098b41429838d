//! Configuration module
//!
//! Config lives in `.kgraph/config.toml` (local, found by walking up from the
//! current directory) or `~/.kgraph/config.toml` (global).
//!
//! Database path priority:
//! 1. `KGRAPH_DATABASE` env var
//! 2. `store.path` (relative paths resolve against the config file's directory)
//! 3. Local `.kgraph/graph.db`
//! 4. Global `~/.kgraph/graph.db`

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Directory holding config and database
pub const DIR_NAME: &str = ".kgraph";
pub const CONFIG_FILE: &str = "config.toml";
pub const DB_FILE: &str = "graph.db";
/// Overrides the database location
pub const DATABASE_ENV: &str = "KGRAPH_DATABASE";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub output: OutputConfig,

    /// File this config was loaded from
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// `[store]` section as written in the file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Database file (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// How long a writer waits for the database lock
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Pretty-print JSON results
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: default_pretty(),
        }
    }
}

fn default_pretty() -> bool {
    true
}

/// Resolved store settings, ready to open a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub busy_timeout_ms: u64,
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Reject settings we can't start with
    pub fn validate(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            bail!(
                "Database path is empty. Set {} or store.path in {}",
                DATABASE_ENV,
                CONFIG_FILE
            );
        }
        if self.busy_timeout_ms == 0 {
            bail!("store.busy_timeout_ms must be greater than zero");
        }
        Ok(())
    }
}

impl Config {
    /// Load config from an explicit file, or the default locations
    pub fn load_with(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }
        Self::load()
    }

    /// Load config from default locations
    pub fn load() -> Result<Self> {
        // Try local config first, then global
        if let Some(local) = Self::find_local_config() {
            return Self::load_from(&local);
        }

        if let Some(global) = Self::global_config_path() {
            if global.exists() {
                return Self::load_from(&global);
            }
        }

        Ok(Self::default())
    }

    /// Load config from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Save config to a file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Find local .kgraph/config.toml walking up directories
    pub fn find_local_config() -> Option<PathBuf> {
        Self::find_local_dir()
            .map(|dir| dir.join(CONFIG_FILE))
            .filter(|p| p.exists())
    }

    /// Find local .kgraph directory walking up directories
    pub fn find_local_dir() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;

        loop {
            let dir = current.join(DIR_NAME);
            if dir.is_dir() {
                return Some(dir);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Global kgraph directory (~/.kgraph)
    pub fn global_dir() -> Option<PathBuf> {
        directories::UserDirs::new().map(|u| u.home_dir().join(DIR_NAME))
    }

    /// Get global config path (~/.kgraph/config.toml)
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|d| d.join(CONFIG_FILE))
    }

    /// Resolve and validate the store settings
    pub fn store_config(&self) -> Result<StoreConfig> {
        let env_path = std::env::var_os(DATABASE_ENV).map(PathBuf::from);
        let store = StoreConfig {
            path: self.database_path(env_path),
            busy_timeout_ms: self.store.busy_timeout_ms,
        };
        store.validate()?;
        Ok(store)
    }

    fn database_path(&self, env_path: Option<PathBuf>) -> PathBuf {
        // 1. Environment variable
        if let Some(path) = env_path {
            return path;
        }

        // 2. Configured path
        if let Some(path) = &self.store.path {
            if path.is_relative() && !path.as_os_str().is_empty() {
                if let Some(dir) = self.source.as_deref().and_then(Path::parent) {
                    return dir.join(path);
                }
            }
            return path.clone();
        }

        // 3. Local .kgraph/ directory (even without graph.db yet)
        if let Some(local) = Self::find_local_dir() {
            return local.join(DB_FILE);
        }

        // 4. Global ~/.kgraph/graph.db
        if let Some(global) = Self::global_dir() {
            return global.join(DB_FILE);
        }

        PathBuf::from(DIR_NAME).join(DB_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_file() -> Result<()> {
        let config: Config = toml::from_str("")?;
        assert_eq!(config.store.busy_timeout_ms, 5000);
        assert!(config.store.path.is_none());
        assert!(config.output.pretty);
        Ok(())
    }

    #[test]
    fn test_env_path_wins() -> Result<()> {
        let mut config: Config = toml::from_str("[store]\npath = \"/data/other.db\"")?;
        config.source = Some(PathBuf::from("/proj/.kgraph/config.toml"));

        let path = config.database_path(Some(PathBuf::from("/tmp/env.db")));
        assert_eq!(path, PathBuf::from("/tmp/env.db"));
        Ok(())
    }

    #[test]
    fn test_relative_path_resolves_against_config_dir() -> Result<()> {
        let mut config: Config = toml::from_str("[store]\npath = \"memory.db\"")?;
        config.source = Some(PathBuf::from("/proj/.kgraph/config.toml"));

        let path = config.database_path(None);
        assert_eq!(path, PathBuf::from("/proj/.kgraph/memory.db"));
        Ok(())
    }

    #[test]
    fn test_validate_rejects_empty_path() {
        let store = StoreConfig::new("");
        let err = store.validate().unwrap_err();
        assert!(err.to_string().contains(DATABASE_ENV));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut store = StoreConfig::new("/tmp/graph.db");
        store.busy_timeout_ms = 0;
        assert!(store.validate().is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(DIR_NAME).join(CONFIG_FILE);

        let mut config = Config::default();
        config.store.busy_timeout_ms = 250;
        config.save_to(&path)?;

        let loaded = Config::load_from(&path)?;
        assert_eq!(loaded.store.busy_timeout_ms, 250);
        assert_eq!(loaded.source.as_deref(), Some(path.as_path()));
        Ok(())
    }
}
