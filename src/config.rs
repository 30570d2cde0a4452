use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::analytics::StockThresholds;
use crate::services::dashboard::DashboardSettings;

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";
const DEFAULT_WARNING_MULTIPLIER: f64 = 1.2;
const DEFAULT_WINDOW_DAYS: u32 = 30;
const DEFAULT_DAILY_PRODUCTION_TARGET: f64 = 200.0;

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Database connection URL
    pub database_url: String,

    /// Server host address
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    #[validate(range(min = 1))]
    pub port: u16,

    /// Application environment
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Whether to run database migrations on startup
    #[serde(default = "default_true")]
    pub auto_migrate: bool,

    /// CORS: comma-separated list of allowed origins; permissive when unset
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    /// DB pool: max connections
    #[serde(default = "default_db_max_connections")]
    #[validate(range(min = 1))]
    pub db_max_connections: u32,

    /// DB pool: min connections
    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    /// DB connect timeout (seconds)
    #[serde(default = "default_db_connect_timeout_secs")]
    pub db_connect_timeout_secs: u64,

    /// DB idle timeout (seconds)
    #[serde(default = "default_db_idle_timeout_secs")]
    pub db_idle_timeout_secs: u64,

    /// DB acquire timeout (seconds)
    #[serde(default = "default_db_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,

    /// Stock below `minimum_required * multiplier` is reported as Warning
    #[serde(default = "default_warning_multiplier")]
    #[validate(range(min = 1.0, max = 10.0))]
    pub stock_warning_multiplier: f64,

    /// Chemical inventory override for `stock_warning_multiplier`
    #[serde(default)]
    #[validate(range(min = 1.0, max = 10.0))]
    pub chemical_warning_multiplier: Option<f64>,

    /// Length of the default dashboard window ending today
    #[serde(default = "default_window_days")]
    #[validate(range(min = 1, max = 3660))]
    pub default_window_days: u32,

    /// Daily crushed tonnage target used for target achievement
    #[serde(default = "default_daily_production_target")]
    #[validate(range(min = 0.001))]
    pub daily_production_target: f64,
}

impl AppConfig {
    /// Builds a configuration with every tuning knob at its default.
    pub fn new(database_url: String, host: String, port: u16, environment: String) -> Self {
        Self {
            database_url,
            host,
            port,
            environment,
            log_level: default_log_level(),
            log_json: false,
            auto_migrate: true,
            cors_allowed_origins: None,
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
            db_connect_timeout_secs: default_db_connect_timeout_secs(),
            db_idle_timeout_secs: default_db_idle_timeout_secs(),
            db_acquire_timeout_secs: default_db_acquire_timeout_secs(),
            stock_warning_multiplier: default_warning_multiplier(),
            chemical_warning_multiplier: None,
            default_window_days: default_window_days(),
            daily_production_target: default_daily_production_target(),
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    /// Explicit CORS origins, if any are configured
    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn dashboard_settings(&self) -> DashboardSettings {
        let stock = StockThresholds::from_f64(self.stock_warning_multiplier);
        let chemicals = self
            .chemical_warning_multiplier
            .map(StockThresholds::from_f64)
            .unwrap_or(stock);

        DashboardSettings {
            stock_thresholds: stock,
            chemical_thresholds: chemicals,
            default_window_days: self.default_window_days,
            daily_production_target: crate::analytics::numeric::from_f64(
                self.daily_production_target,
            )
            .unwrap_or_else(|| DashboardSettings::default().daily_production_target),
        }
    }

    fn validate_additional_constraints(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.db_min_connections > self.db_max_connections {
            let mut err = ValidationError::new("db_min_connections");
            err.message = Some("db_min_connections must not exceed db_max_connections".into());
            errors.add("db_min_connections", err);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ConfigError),
    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationErrors),
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_true() -> bool {
    true
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_db_min_connections() -> u32 {
    1
}

fn default_db_connect_timeout_secs() -> u64 {
    30
}

fn default_db_idle_timeout_secs() -> u64 {
    600
}

fn default_db_acquire_timeout_secs() -> u64 {
    8
}

fn default_warning_multiplier() -> f64 {
    DEFAULT_WARNING_MULTIPLIER
}

fn default_window_days() -> u32 {
    DEFAULT_WINDOW_DAYS
}

fn default_daily_production_target() -> f64 {
    DEFAULT_DAILY_PRODUCTION_TARGET
}

/// Validates log level values
fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if valid_levels.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("log_level");
        err.message = Some("Must be one of: trace, debug, info, warn, error".into());
        Err(err)
    }
}

/// Loads configuration from `config/default`, the profile file selected by
/// `RUN_ENV` / `APP_ENV`, then `APP__*` environment variables.
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    let config = Config::builder()
        .set_default("database_url", "sqlite://mymine.db?mode=rwc")?
        .set_default("host", "0.0.0.0")?
        .set_default("port", i64::from(DEFAULT_PORT))?
        .set_default("environment", run_env.as_str())?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    app_config.validate_additional_constraints().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn base_config() -> AppConfig {
        AppConfig::new(
            "sqlite::memory:".into(),
            "127.0.0.1".into(),
            8080,
            "development".into(),
        )
    }

    #[test]
    fn defaults_validate() {
        let cfg = base_config();
        assert!(cfg.validate().is_ok());
        assert!(cfg.validate_additional_constraints().is_ok());
        assert_eq!(cfg.default_window_days, 30);
    }

    #[test]
    fn warning_multiplier_below_one_is_rejected() {
        let mut cfg = base_config();
        cfg.stock_warning_multiplier = 0.8;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn min_connections_cannot_exceed_max() {
        let mut cfg = base_config();
        cfg.db_min_connections = 20;
        assert!(cfg.validate_additional_constraints().is_err());
    }

    #[test]
    fn chemical_multiplier_overrides_stock_multiplier() {
        let mut cfg = base_config();
        let settings = cfg.dashboard_settings();
        assert_eq!(settings.stock_thresholds.warning_multiplier, dec!(1.2));
        assert_eq!(settings.chemical_thresholds.warning_multiplier, dec!(1.2));

        cfg.chemical_warning_multiplier = Some(1.5);
        let settings = cfg.dashboard_settings();
        assert_eq!(settings.chemical_thresholds.warning_multiplier, dec!(1.5));
        assert_eq!(settings.daily_production_target, dec!(200));
    }

    #[test]
    fn cors_origins_are_split_and_trimmed() {
        let mut cfg = base_config();
        assert!(cfg.cors_origins().is_empty());
        cfg.cors_allowed_origins = Some("https://a.example, ,https://b.example".into());
        assert_eq!(
            cfg.cors_origins(),
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }
}
