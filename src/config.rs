use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::cache::CachePolicy;
use crate::store::ClearMode;

const DEFAULT_API_URL: &str = "https://dragonball.keepcoding.education";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  #[serde(default)]
  pub storage: StorageConfig,
  #[serde(default)]
  pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  #[serde(default = "default_api_url")]
  pub url: String,
  /// Per-request timeout
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      url: default_api_url(),
      timeout_secs: default_timeout_secs(),
    }
  }
}

fn default_api_url() -> String {
  DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
  30
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
  /// Database file (default: $XDG_DATA_HOME/herocache/store.db)
  pub path: Option<PathBuf>,
  /// Keep everything in memory; nothing survives the process
  #[serde(default)]
  pub in_memory: bool,
  /// Clear all tables in one transaction instead of table by table
  #[serde(default)]
  pub atomic_clear: bool,
}

impl StorageConfig {
  pub fn clear_mode(&self) -> ClearMode {
    if self.atomic_clear {
      ClearMode::Atomic
    } else {
      ClearMode::BestEffort
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// Hit the remote again while a key's local result is empty
  #[serde(default = "default_true")]
  pub refetch_when_empty: bool,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      refetch_when_empty: true,
    }
  }
}

impl CacheConfig {
  pub fn policy(&self) -> CachePolicy {
    CachePolicy {
      refetch_when_empty: self.refetch_when_empty,
    }
  }
}

fn default_true() -> bool {
  true
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./herocache.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/herocache/config.yaml
  ///
  /// With no file anywhere the defaults are used.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("herocache.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("herocache").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self, serde_yaml::Error> {
    serde_yaml::from_str(contents)
  }

  /// Session token supplied through the environment, bypassing the keychain.
  ///
  /// Checks HEROCACHE_TOKEN.
  pub fn get_api_token() -> Option<String> {
    std::env::var("HEROCACHE_TOKEN")
      .ok()
      .filter(|t| !t.is_empty())
  }

  /// Get the login password from environment variables.
  ///
  /// Checks HEROCACHE_PASSWORD.
  pub fn get_password() -> Result<String> {
    std::env::var("HEROCACHE_PASSWORD")
      .map_err(|_| eyre!("Password not found. Set HEROCACHE_PASSWORD environment variable."))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_document_uses_defaults() {
    let config = Config::parse("{}").unwrap();

    assert_eq!(config.api.url, DEFAULT_API_URL);
    assert_eq!(config.api.timeout_secs, 30);
    assert!(config.storage.path.is_none());
    assert_eq!(config.storage.clear_mode(), ClearMode::BestEffort);
    assert!(config.cache.policy().refetch_when_empty);
  }

  #[test]
  fn test_full_document() {
    let yaml = r#"
api:
  url: http://localhost:8080
  timeout_secs: 5
storage:
  path: /tmp/heroes.db
  atomic_clear: true
cache:
  refetch_when_empty: false
"#;
    let config = Config::parse(yaml).unwrap();

    assert_eq!(config.api.url, "http://localhost:8080");
    assert_eq!(config.api.timeout_secs, 5);
    assert_eq!(config.storage.path, Some(PathBuf::from("/tmp/heroes.db")));
    assert!(!config.storage.in_memory);
    assert_eq!(config.storage.clear_mode(), ClearMode::Atomic);
    assert!(!config.cache.policy().refetch_when_empty);
  }

  #[test]
  fn test_partial_section_keeps_other_defaults() {
    let config = Config::parse("api:\n  timeout_secs: 1\n").unwrap();

    assert_eq!(config.api.url, DEFAULT_API_URL);
    assert_eq!(config.api.timeout_secs, 1);
  }

  #[test]
  fn test_missing_explicit_path_is_an_error() {
    let result = Config::load(Some(Path::new("/definitely/not/here.yaml")));
    assert!(result.is_err());
  }

  #[test]
  fn test_explicit_path_is_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "storage:\n  in_memory: true\n").unwrap();

    let config = Config::load(Some(&path)).unwrap();
    assert!(config.storage.in_memory);
  }
}
