use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use tracing::info;
use validator::Validate;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_DASHBOARD_CACHE_TTL_SECS: u64 = 30;

/// Application configuration with validation.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct AppConfig {
    /// Database connection URL
    pub database_url: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Deployment environment name
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit logs as JSON
    #[serde(default)]
    pub log_json: bool,

    /// Run migrations on startup
    #[serde(default = "default_true")]
    pub auto_migrate: bool,

    /// Maximum database connections
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// TTL for the cached dashboard snapshot, in seconds
    #[serde(default = "default_dashboard_cache_ttl")]
    #[validate(range(min = 1, max = 3600))]
    pub dashboard_cache_ttl_secs: u64,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_true() -> bool {
    true
}

fn default_db_max_connections() -> u32 {
    DEFAULT_DB_MAX_CONNECTIONS
}

fn default_dashboard_cache_ttl() -> u64 {
    DEFAULT_DASHBOARD_CACHE_TTL_SECS
}

impl AppConfig {
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

/// Loads configuration from layered sources: `config/default.toml`, an
/// environment-specific file, then `APP_*` environment variables.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let env_name = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| DEFAULT_ENV.to_string());

    let mut builder = Config::builder()
        .set_default("environment", env_name.clone())?
        .add_source(File::from(Path::new(CONFIG_DIR).join("default")).required(false))
        .add_source(File::from(Path::new(CONFIG_DIR).join(&env_name)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"));

    // DATABASE_URL wins over file-based settings when present
    if let Ok(url) = std::env::var("DATABASE_URL") {
        builder = builder.set_override("database_url", url)?;
    }

    let cfg: AppConfig = builder.build()?.try_deserialize()?;

    cfg.validate()
        .map_err(|e| ConfigError::Message(format!("invalid configuration: {}", e)))?;

    info!(environment = %cfg.environment, "Configuration loaded");
    Ok(cfg)
}

/// Initializes the tracing subscriber. Safe to call once at startup.
pub fn init_tracing(log_level: &str, json: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig {
            database_url: "sqlite::memory:".to_string(),
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            log_level: default_log_level(),
            log_json: false,
            auto_migrate: true,
            db_max_connections: default_db_max_connections(),
            dashboard_cache_ttl_secs: default_dashboard_cache_ttl(),
        }
    }

    #[test]
    fn defaults_pass_validation() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn zero_cache_ttl_is_rejected() {
        let mut cfg = base_config();
        cfg.dashboard_cache_ttl_secs = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn production_flag() {
        let mut cfg = base_config();
        cfg.environment = "Production".to_string();
        assert!(cfg.is_production());
    }
}
