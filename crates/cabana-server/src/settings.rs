//! Server configuration, layered from an optional TOML file and `CABANA_`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use cabana_core::config::{PoolConfig, PoolConfigPatch};
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  /// The building's offset from UTC, e.g. `-05:00`. Decides what "today"
  /// means for entry counts and whether the pool is open.
  pub utc_offset: String,
  /// Initial pool configuration, applied only to a store that has none.
  pub pool:       PoolDefaults,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "127.0.0.1".into(),
      port:       8080,
      store_path: PathBuf::from("~/.local/share/cabana/cabana.db"),
      utc_offset: "+00:00".into(),
      pool:       PoolDefaults::default(),
    }
  }
}

/// Overrides on top of [`PoolConfig::default`]. Times are `HH:MM`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolDefaults {
  pub max_capacity:        Option<u32>,
  pub max_hours_per_visit: Option<u32>,
  pub opening_time:        Option<String>,
  pub closing_time:        Option<String>,
  pub is_active:           Option<bool>,
}

impl PoolDefaults {
  /// The configuration to seed an empty store with.
  pub fn to_config(&self, now: DateTime<Utc>) -> anyhow::Result<PoolConfig> {
    let patch = PoolConfigPatch {
      max_capacity:        self.max_capacity,
      max_hours_per_visit: self.max_hours_per_visit,
      opening_time:        self.opening_time.clone(),
      closing_time:        self.closing_time.clone(),
      is_active:           self.is_active,
    };
    if patch.is_empty() {
      return Ok(PoolConfig::default());
    }
    PoolConfig::default()
      .apply(&patch, now)
      .context("invalid [pool] defaults")
  }
}

impl ServerConfig {
  /// Read `file` (if it exists) and then the environment.
  /// `CABANA_POOL__MAX_CAPACITY=20` sets `pool.max_capacity`.
  pub fn load(file: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(file).required(false))
      .add_source(
        config::Environment::with_prefix("CABANA")
          .prefix_separator("_")
          .separator("__"),
      )
      .build()
      .context("failed to read configuration")?;

    settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn offset(&self) -> anyhow::Result<FixedOffset> {
    self
      .utc_offset
      .parse()
      .with_context(|| format!("invalid utc_offset {:?}", self.utc_offset))
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
