//! Server configuration, persisted as TOML.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level server configuration. Loaded once at startup; individual game
/// settings (`holdem_shared::GameSettings`) are a separate, per-game concern
/// chosen at table-creation time, not configured here.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Address the HTTP/WS server binds to.
    pub bind_addr: String,
    /// Directory holding the sled database, relative to the process cwd.
    pub data_dir: String,
    /// Seconds a game with no connected players is kept before the sweeper
    /// considers it stale.
    pub idle_retention_seconds: u64,
    /// Seconds a finished (`game_over`) game is retained before the sweeper
    /// deletes it.
    pub ended_retention_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: "127.0.0.1:3000".into(),
            data_dir: "data".into(),
            idle_retention_seconds: 24 * 60 * 60,
            ended_retention_seconds: 72 * 60 * 60,
        }
    }
}

impl Config {
    /// Load configuration from `path`. If the file does not exist, create it
    /// with defaults and return those defaults.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let s = fs::read_to_string(path)
                .with_context(|| format!("reading config file '{}'", path.display()))?;
            let cfg: Config = toml::from_str(&s)
                .with_context(|| format!("parsing TOML config '{}'", path.display()))?;
            Ok(cfg)
        } else {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    fs::create_dir_all(parent)
                        .with_context(|| format!("creating config directory '{}'", parent.display()))?;
                }
            }
            let cfg = Config::default();
            let toml_text = toml::to_string_pretty(&cfg).context("serializing default config to TOML")?;
            fs::write(path, toml_text)
                .with_context(|| format!("writing default config to '{}'", path.display()))?;
            Ok(cfg)
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating config directory '{}'", parent.display()))?;
            }
        }
        let toml_text = toml::to_string_pretty(self).context("serializing config to TOML")?;
        fs::write(path, toml_text).with_context(|| format!("writing config to '{}'", path.display()))?;
        Ok(())
    }
}
