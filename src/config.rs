//! Runtime configuration: defaults, then an optional YAML file named by
//! `POKEBRACKET_CONFIG`, then individual `POKEBRACKET_*` env overrides.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::data::pokeapi::DEFAULT_API_BASE_URL;
use crate::error::ConfigError;
use crate::tournament::validate_pool_size;

pub const CONFIG_PATH_ENV: &str = "POKEBRACKET_CONFIG";
pub const API_BASE_ENV: &str = "POKEBRACKET_API_BASE";
pub const POOL_SIZE_ENV: &str = "POKEBRACKET_POOL_SIZE";
pub const MAX_ATTEMPTS_ENV: &str = "POKEBRACKET_MAX_ATTEMPTS";
pub const BIND_ENV: &str = "POKEBRACKET_BIND";

pub const DEFAULT_POOL_SIZE: usize = 32;
pub const DEFAULT_MAX_FETCH_ATTEMPTS: usize = 2_000;
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    /// Contestants per bracket; a power of two, at least 2.
    pub pool_size: usize,
    /// Upper bound on draws while filling a pool (missing ids and duplicates count).
    pub max_fetch_attempts: usize,
    pub bind_addr: String,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            pool_size: DEFAULT_POOL_SIZE,
            max_fetch_attempts: DEFAULT_MAX_FETCH_ATTEMPTS,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl AppConfig {
    /// Defaults, config file and process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::load`] with an explicit variable lookup.
    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match lookup(CONFIG_PATH_ENV) {
            Some(path) if !path.trim().is_empty() => Self::from_yaml_file(path.trim())?,
            _ => Self::default(),
        };
        config.apply_overrides(&lookup)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    fn apply_overrides(&mut self, lookup: &impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(base) = lookup(API_BASE_ENV) {
            self.api_base_url = base;
        }
        if let Some(bind) = lookup(BIND_ENV) {
            self.bind_addr = bind;
        }
        if let Some(raw) = lookup(POOL_SIZE_ENV) {
            self.pool_size = parse_usize(POOL_SIZE_ENV, &raw)?;
        }
        if let Some(raw) = lookup(MAX_ATTEMPTS_ENV) {
            self.max_fetch_attempts = parse_usize(MAX_ATTEMPTS_ENV, &raw)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_pool_size(self.pool_size)?;
        if self.max_fetch_attempts < self.pool_size {
            return Err(ConfigError::InvalidValue {
                key: "max_fetch_attempts",
                value: self.max_fetch_attempts.to_string(),
            });
        }
        Ok(())
    }
}

fn parse_usize(key: &'static str, raw: &str) -> Result<usize, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}
