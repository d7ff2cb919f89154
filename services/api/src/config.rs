//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use portfolio_core::matching::{DEFAULT_MATCH_THRESHOLD, DEFAULT_SUGGESTION_COUNT};
use portfolio_core::{MatchConfig, UniformTypingDelay};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub storage_dir: PathBuf,
    pub narration_path: PathBuf,
    pub frame_interval: Duration,
    pub typing_delay_min: Duration,
    pub typing_delay_max: Duration,
    pub match_threshold: u32,
    pub suggestion_count: usize,
    /// Live conversations untouched for this long are evicted with their session file.
    pub session_idle_timeout: Duration,
    pub session_sweep_interval: Duration,
    pub cors_origin: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 3000)),
            log_level: Level::INFO,
            storage_dir: PathBuf::from("./data"),
            narration_path: PathBuf::from("./public/intro.wav"),
            frame_interval: Duration::from_millis(16),
            typing_delay_min: Duration::from_millis(600),
            typing_delay_max: Duration::from_millis(1000),
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            suggestion_count: DEFAULT_SUGGESTION_COUNT,
            session_idle_timeout: Duration::from_secs(30 * 60),
            session_sweep_interval: Duration::from_secs(60),
            cors_origin: "http://localhost:3000".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        let defaults = Self::default();

        // --- Server Settings ---
        let bind_address = parse_var("BIND_ADDRESS", defaults.bind_address)?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin = std::env::var("CORS_ORIGIN").unwrap_or(defaults.cors_origin);

        // --- Storage and Media ---
        let storage_dir = parse_var("STORAGE_DIR", defaults.storage_dir)?;
        let narration_path = parse_var("NARRATION_PATH", defaults.narration_path)?;
        let session_idle_timeout = parse_period(
            "SESSION_IDLE_TIMEOUT_SECS",
            defaults.session_idle_timeout,
            Duration::from_secs,
        )?;
        let session_sweep_interval = parse_period(
            "SESSION_SWEEP_INTERVAL_SECS",
            defaults.session_sweep_interval,
            Duration::from_secs,
        )?;

        // --- Engine Tunables ---
        let frame_interval =
            parse_period("FRAME_INTERVAL_MS", defaults.frame_interval, Duration::from_millis)?;
        let typing_delay_min = parse_duration(
            "TYPING_DELAY_MIN_MS",
            defaults.typing_delay_min,
            Duration::from_millis,
        )?;
        let typing_delay_max = parse_duration(
            "TYPING_DELAY_MAX_MS",
            defaults.typing_delay_max,
            Duration::from_millis,
        )?;
        if typing_delay_max < typing_delay_min {
            return Err(ConfigError::InvalidValue(
                "TYPING_DELAY_MAX_MS".to_string(),
                "must not be below TYPING_DELAY_MIN_MS".to_string(),
            ));
        }

        let match_threshold = parse_var("MATCH_THRESHOLD", defaults.match_threshold)?;
        let suggestion_count = parse_var("SUGGESTION_COUNT", defaults.suggestion_count)?;

        Ok(Self {
            bind_address,
            log_level,
            storage_dir,
            narration_path,
            frame_interval,
            typing_delay_min,
            typing_delay_max,
            match_threshold,
            suggestion_count,
            session_idle_timeout,
            session_sweep_interval,
            cors_origin,
        })
    }

    pub fn match_config(&self) -> MatchConfig {
        MatchConfig {
            threshold: self.match_threshold,
            suggestion_count: self.suggestion_count,
        }
    }

    pub fn typing_delay(&self) -> UniformTypingDelay {
        UniformTypingDelay {
            min: self.typing_delay_min,
            max: self.typing_delay_max,
        }
    }
}

/// Reads and parses `name`, falling back to `default` when it is unset.
fn parse_var<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

/// A whole number of units read through `unit`.
fn parse_duration(
    name: &str,
    default: Duration,
    unit: fn(u64) -> Duration,
) -> Result<Duration, ConfigError> {
    match std::env::var(name) {
        Ok(_) => Ok(unit(parse_var(name, 0)?)),
        Err(_) => Ok(default),
    }
}

/// Like [`parse_duration`], but zero is rejected.
fn parse_period(
    name: &str,
    default: Duration,
    unit: fn(u64) -> Duration,
) -> Result<Duration, ConfigError> {
    let period = parse_duration(name, default, unit)?;
    if period.is_zero() {
        return Err(ConfigError::InvalidValue(
            name.to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    Ok(period)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_var_reports_the_variable_name() {
        std::env::set_var("PORTFOLIO_TEST_BAD_NUMBER", "not-a-number");
        let err = parse_var::<u64>("PORTFOLIO_TEST_BAD_NUMBER", 1).unwrap_err();
        match err {
            ConfigError::InvalidValue(name, _) => assert_eq!(name, "PORTFOLIO_TEST_BAD_NUMBER"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn parse_var_uses_default_when_unset() {
        let value: u32 = parse_var("PORTFOLIO_TEST_UNSET_VAR", 7).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn parse_var_trims_the_value() {
        std::env::set_var("PORTFOLIO_TEST_PADDED_NUMBER", " 12 ");
        let value: usize = parse_var("PORTFOLIO_TEST_PADDED_NUMBER", 0).unwrap();
        assert_eq!(value, 12);
    }

    #[test]
    fn zero_periods_are_rejected_but_zero_delays_are_not() {
        std::env::set_var("PORTFOLIO_TEST_ZERO_MS", "0");
        let delay = parse_duration(
            "PORTFOLIO_TEST_ZERO_MS",
            Duration::from_millis(600),
            Duration::from_millis,
        )
        .unwrap();
        assert_eq!(delay, Duration::ZERO);

        std::env::set_var("PORTFOLIO_TEST_ZERO_SECS", "0");
        let err = parse_period(
            "PORTFOLIO_TEST_ZERO_SECS",
            Duration::from_secs(1),
            Duration::from_secs,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(..)));
    }

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert_eq!(config.match_config().threshold, DEFAULT_MATCH_THRESHOLD);
        assert!(config.typing_delay_min <= config.typing_delay_max);
        assert!(config.session_sweep_interval < config.session_idle_timeout);
    }
}
