//! Configuration for a printfarm instance.
//!
//! TOML file at the platform config path, `PRINTFARM_`-prefixed
//! environment overrides, and translation to
//! `printfarm_core::FarmSettings`. The core crate never touches disk;
//! everything file-shaped lives here.

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use printfarm_core::FarmSettings;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config struct ──────────────────────────────────────────────

/// On-disk configuration. Kept flat so environment overrides map
/// one-to-one onto keys (`PRINTFARM_SITE_TITLE`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Display title for this farm instance.
    #[serde(default = "default_site_title")]
    pub site_title: String,

    /// Addresses the farm host answers on, as strings.
    #[serde(default)]
    pub network_addresses: Vec<String>,

    /// Activity ticker ring capacity.
    #[serde(default = "default_ticker_capacity")]
    pub ticker_capacity: usize,

    /// Queue depth of each per-printer event lane.
    #[serde(default = "default_lane_depth")]
    pub lane_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site_title: default_site_title(),
            network_addresses: Vec::new(),
            ticker_capacity: default_ticker_capacity(),
            lane_depth: default_lane_depth(),
        }
    }
}

fn default_site_title() -> String {
    "PrintFarm".into()
}
fn default_ticker_capacity() -> usize {
    1000
}
fn default_lane_depth() -> usize {
    256
}

impl Config {
    /// Translate into the core crate's runtime settings, validating
    /// every field that can be malformed on disk.
    pub fn to_farm_settings(&self) -> Result<FarmSettings, ConfigError> {
        if self.ticker_capacity == 0 {
            return Err(ConfigError::Validation {
                field: "ticker_capacity".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.lane_depth == 0 {
            return Err(ConfigError::Validation {
                field: "lane_depth".into(),
                reason: "must be at least 1".into(),
            });
        }

        let mut network_addresses = Vec::with_capacity(self.network_addresses.len());
        for raw in &self.network_addresses {
            let addr: IpAddr = raw.parse().map_err(|_| ConfigError::Validation {
                field: "network_addresses".into(),
                reason: format!("invalid address: {raw}"),
            })?;
            network_addresses.push(addr);
        }

        Ok(FarmSettings {
            site_title: self.site_title.clone(),
            network_addresses,
            ticker_capacity: self.ticker_capacity,
            lane_depth: self.lane_depth,
        })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "printfarm", "printfarm").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("printfarm");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from a specific file + environment.
///
/// Merge order: built-in defaults, then the TOML file, then
/// `PRINTFARM_`-prefixed environment variables.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("PRINTFARM_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning the defaults if anything fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

/// Serialize config to TOML and write to a specific path.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
