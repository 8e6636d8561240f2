//! Shared configuration for the beanscope CLI.
//!
//! TOML targets, output defaults, access-policy flags, and ignore-list
//! extensions, loaded through a file + environment figment. Translation
//! to `beanscope_core` policy types lives here so the CLI only handles
//! flag overrides.

use std::collections::HashMap;
use std::path::PathBuf;

use beanscope_core::{AccessPolicy, IgnoreList, ProbeError};
use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no target named '{target}' in config")]
    NoSuchTarget { target: String },

    #[error("invalid ignore entry")]
    Ignore(#[from] ProbeError),

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

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default target name.
    pub default_target: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named remote targets.
    #[serde(default)]
    pub targets: HashMap<String, Target>,

    /// Ignore-list extensions on top of the built-in defaults.
    #[serde(default)]
    pub ignore: Vec<IgnoreEntry>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_target: Some("local".into()),
            defaults: Defaults::default(),
            targets: HashMap::new(),
            ignore: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Scalar cell truncation bound; 0 means unbounded.
    #[serde(default)]
    pub max_length: usize,

    #[serde(default = "default_true")]
    pub attribute_write_allowed: bool,

    #[serde(default = "default_true")]
    pub operation_call_allowed: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            max_length: 0,
            attribute_write_allowed: true,
            operation_call_allowed: true,
        }
    }
}

fn default_output() -> String {
    "tree".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_true() -> bool {
    true
}

/// A named remote target.
#[derive(Debug, Deserialize, Serialize)]
pub struct Target {
    /// Server address (e.g., "localhost:4848").
    pub server: String,

    /// Per-request timeout in seconds.
    pub timeout: Option<u64>,
}

/// One configured ignore-list extension.
#[derive(Debug, Deserialize, Serialize)]
pub struct IgnoreEntry {
    /// Declaring type name (e.g., "pool.DataSource").
    #[serde(rename = "type")]
    pub type_name: String,

    /// Canonical operation signature (e.g., "getConnection()").
    pub operation: String,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "beanscope", "beanscope").map_or_else(
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
    p.push("beanscope");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit path — the `BEANSCOPE_CONFIG` override and tests
/// go through here.
pub fn load_config_from(path: &std::path::Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("BEANSCOPE_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &std::path::Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation to core types ───────────────────────────────────────

impl Config {
    /// Build the engine access policy from the configured defaults.
    pub fn access_policy(&self) -> AccessPolicy {
        AccessPolicy {
            attribute_write_allowed: self.defaults.attribute_write_allowed,
            operation_call_allowed: self.defaults.operation_call_allowed,
            max_length: self.defaults.max_length,
        }
    }

    /// Build the ignore list from the built-in defaults plus configured
    /// extensions. A malformed entry is fatal.
    pub fn ignore_list(&self) -> Result<IgnoreList, ConfigError> {
        let entries = self
            .ignore
            .iter()
            .map(|entry| (entry.type_name.as_str(), entry.operation.as_str()));
        Ok(IgnoreList::from_entries(entries)?)
    }

    /// Look up a target by name, or the configured default. The returned
    /// name borrows from the argument when one was given.
    pub fn target<'a>(
        &'a self,
        name: Option<&'a str>,
    ) -> Result<(&'a str, &'a Target), ConfigError> {
        let name = name
            .or(self.default_target.as_deref())
            .ok_or_else(|| ConfigError::Validation {
                field: "default_target".into(),
                reason: "no target given and no default configured".into(),
            })?;
        let target = self
            .targets
            .get(name)
            .ok_or_else(|| ConfigError::NoSuchTarget {
                target: name.to_owned(),
            })?;
        Ok((name, target))
    }
}
