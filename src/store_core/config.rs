use crate::movement::MAX_RANGE_MINUTES;
use std::env;

pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379/0";
pub const DEFAULT_TTL_SECS: u64 = 120;

#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    pub redis_url: String,
    pub ttl_secs: u64,
    pub input_prefix: String,
    pub output_prefix: String,
    pub movement_range_minutes: i64,
    pub config_dir: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue(msg) => write!(f, "Invalid configuration value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            redis_url: DEFAULT_REDIS_URL.to_string(),
            ttl_secs: DEFAULT_TTL_SECS,
            input_prefix: "prices".to_string(),
            output_prefix: "algos".to_string(),
            movement_range_minutes: 5,
            config_dir: "config".to_string(),
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `REDIS_URL` (default: redis://127.0.0.1:6379/0)
    /// - `RECORD_TTL_SECS` (default: 120)
    /// - `INPUT_PREFIX` (default: prices)
    /// - `OUTPUT_PREFIX` (default: algos)
    /// - `MOVEMENT_RANGE_MINUTES` (default: 5, at most one year)
    /// - `CONFIG_DIR` (default: config)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let redis_url = env::var("REDIS_URL").unwrap_or(defaults.redis_url);
        if !["redis://", "rediss://", "unix://"]
            .iter()
            .any(|scheme| redis_url.starts_with(scheme))
        {
            return Err(ConfigError::InvalidValue(
                "REDIS_URL must start with redis://, rediss:// or unix://".to_string(),
            ));
        }

        let ttl_secs = match env::var("RECORD_TTL_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|ttl| *ttl > 0)
                .ok_or_else(|| {
                    ConfigError::InvalidValue(format!(
                        "RECORD_TTL_SECS must be a positive integer, got '{}'",
                        raw
                    ))
                })?,
            Err(_) => defaults.ttl_secs,
        };

        let movement_range_minutes = match env::var("MOVEMENT_RANGE_MINUTES") {
            Ok(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|minutes| (1..=MAX_RANGE_MINUTES).contains(minutes))
                .ok_or_else(|| {
                    ConfigError::InvalidValue(format!(
                        "MOVEMENT_RANGE_MINUTES must be between 1 and {}, got '{}'",
                        MAX_RANGE_MINUTES, raw
                    ))
                })?,
            Err(_) => defaults.movement_range_minutes,
        };

        Ok(Self {
            redis_url,
            ttl_secs,
            input_prefix: env::var("INPUT_PREFIX").unwrap_or(defaults.input_prefix),
            output_prefix: env::var("OUTPUT_PREFIX").unwrap_or(defaults.output_prefix),
            movement_range_minutes,
            config_dir: env::var("CONFIG_DIR").unwrap_or(defaults.config_dir),
        })
    }
}
