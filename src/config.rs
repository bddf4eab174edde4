//! Application configuration.
//!
//! Settings come from an optional JSON file, then environment variables, then
//! CLI flags, each layer overriding the previous one. The resolved
//! `AppConfig` is passed explicitly to the stores and the nutrition client.
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::nutrition::{self, DEFAULT_NUTRITION_BASE_URL};

/// Current schema version for `config.json`.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;
/// Per-request nutrition timeout when the config does not set one.
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;
const MAX_TIMEOUT_MS: u64 = 60_000;

pub const DB_ENV: &str = "SMOOTHIE_DB";
pub const NUTRITION_URL_ENV: &str = "SMOOTHIE_NUTRITION_URL";

const APP_DIR: &str = "smoothie";
const CONFIG_FILE: &str = "config.json";
const DATABASE_FILE: &str = "smoothies.db";

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub schema_version: u32,
    #[serde(default = "default_database")]
    pub database: PathBuf,
    #[serde(default)]
    pub nutrition: NutritionConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct NutritionConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for NutritionConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl NutritionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Values supplied on the command line; `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub database: Option<PathBuf>,
    pub nutrition_url: Option<String>,
}

fn default_database() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR).join(DATABASE_FILE))
        .unwrap_or_else(|| PathBuf::from(DATABASE_FILE))
}

fn default_base_url() -> String {
    DEFAULT_NUTRITION_BASE_URL.to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

pub fn default_config() -> AppConfig {
    AppConfig {
        schema_version: CONFIG_SCHEMA_VERSION,
        database: default_database(),
        nutrition: NutritionConfig::default(),
    }
}

/// Location of the user-level config file, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

pub fn load_config(path: &Path) -> Result<AppConfig> {
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let config: AppConfig = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse config JSON {}", path.display()))?;
    Ok(config)
}

/// Resolve the effective config: file, then environment, then CLI flags.
///
/// An explicit `--config` path must exist; the default location is optional.
pub fn resolve_config(overrides: &ConfigOverrides) -> Result<AppConfig> {
    let mut config = match &overrides.config_path {
        Some(path) => load_config(path)?,
        None => match default_config_path().filter(|path| path.is_file()) {
            Some(path) => load_config(&path)?,
            None => default_config(),
        },
    };
    apply_env_overrides(&mut config, |key| env::var(key).ok());
    apply_cli_overrides(&mut config, overrides);
    validate_config(&config)?;
    tracing::debug!(
        database = %config.database.display(),
        nutrition_url = %config.nutrition.base_url,
        timeout_ms = config.nutrition.timeout_ms,
        "config resolved"
    );
    Ok(config)
}

pub(crate) fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(db) = lookup(DB_ENV).filter(|value| !value.trim().is_empty()) {
        config.database = PathBuf::from(db);
    }
    if let Some(url) = lookup(NUTRITION_URL_ENV).filter(|value| !value.trim().is_empty()) {
        config.nutrition.base_url = url;
    }
}

pub(crate) fn apply_cli_overrides(config: &mut AppConfig, overrides: &ConfigOverrides) {
    if let Some(db) = &overrides.database {
        config.database = db.clone();
    }
    if let Some(url) = &overrides.nutrition_url {
        config.nutrition.base_url = url.clone();
    }
}

pub fn validate_config(config: &AppConfig) -> Result<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported config schema_version {}",
            config.schema_version
        ));
    }
    if config.database.as_os_str().is_empty() {
        return Err(anyhow!("database must be a non-empty path"));
    }
    nutrition::parse_base_url(&config.nutrition.base_url).context("invalid nutrition.base_url")?;
    if config.nutrition.timeout_ms == 0 || config.nutrition.timeout_ms > MAX_TIMEOUT_MS {
        return Err(anyhow!(
            "nutrition.timeout_ms must be between 1 and {MAX_TIMEOUT_MS} (got {})",
            config.nutrition.timeout_ms
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
