//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use super::settings::BackendMode;
use super::Settings;
use crate::utils::errors::{DashboardError, Result};

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_server_config(&settings.server)?;
    validate_backend_config(&settings.backend)?;
    validate_cache_config(&settings.cache)?;
    validate_auth_config(&settings.auth)?;
    validate_app_config(&settings.app)?;
    validate_logging_config(&settings.logging)?;

    if settings.features.rate_limit && settings.features.rate_limit_per_minute == 0 {
        return Err(DashboardError::Config(
            "Rate limit per minute must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validate HTTP server configuration
fn validate_server_config(config: &super::ServerConfig) -> Result<()> {
    if config.host.is_empty() {
        return Err(DashboardError::Config("Server host is required".to_string()));
    }

    url::Url::parse(&config.site_url)
        .map_err(|e| DashboardError::Config(format!("Invalid site URL: {}", e)))?;

    Ok(())
}

/// Validate hosted backend configuration
fn validate_backend_config(config: &super::BackendConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(DashboardError::Config("Backend URL is required".to_string()));
    }

    url::Url::parse(&config.url)
        .map_err(|e| DashboardError::Config(format!("Invalid backend URL: {}", e)))?;

    if config.timeout_seconds == 0 {
        return Err(DashboardError::Config(
            "Backend timeout must be greater than 0".to_string(),
        ));
    }

    match config.mode {
        BackendMode::Rest => {
            if config.anon_key.is_empty() {
                return Err(DashboardError::Config(
                    "Backend anon key is required in rest mode".to_string(),
                ));
            }
        }
        BackendMode::Postgres => {
            if config.database_url.as_deref().map_or(true, str::is_empty) {
                return Err(DashboardError::Config(
                    "Database URL is required in postgres mode".to_string(),
                ));
            }

            if config.jwt_secret.as_deref().map_or(true, str::is_empty) {
                return Err(DashboardError::Config(
                    "JWT secret is required in postgres mode".to_string(),
                ));
            }

            if config.max_connections == 0 {
                return Err(DashboardError::Config(
                    "Max connections must be greater than 0".to_string(),
                ));
            }

            if config.min_connections > config.max_connections {
                return Err(DashboardError::Config(
                    "Min connections cannot be greater than max connections".to_string(),
                ));
            }
        }
    }

    Ok(())
}

/// Validate page cache configuration
fn validate_cache_config(config: &super::CacheConfig) -> Result<()> {
    match config.backend.as_str() {
        "memory" => Ok(()),
        "redis" => {
            if config.redis_url.as_deref().map_or(true, str::is_empty) {
                return Err(DashboardError::Config(
                    "Redis URL is required for the redis cache backend".to_string(),
                ));
            }
            Ok(())
        }
        other => Err(DashboardError::Config(format!(
            "Unknown cache backend: {}. Valid backends: [\"memory\", \"redis\"]",
            other
        ))),
    }
}

/// Validate session cookie configuration
fn validate_auth_config(config: &super::AuthConfig) -> Result<()> {
    if config.session_cookie.is_empty() {
        return Err(DashboardError::Config(
            "Session cookie name is required".to_string(),
        ));
    }

    if config.provider.is_empty() {
        return Err(DashboardError::Config("OAuth provider is required".to_string()));
    }

    Ok(())
}

/// Validate presentation settings
fn validate_app_config(config: &super::AppConfig) -> Result<()> {
    // chrono::FixedOffset accepts strictly less than a day
    if config.utc_offset_minutes.abs() >= 24 * 60 {
        return Err(DashboardError::Config(format!(
            "UTC offset out of range: {} minutes",
            config.utc_offset_minutes
        )));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(DashboardError::Config("Log level is required".to_string()));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(DashboardError::Config(format!(
            "Invalid log level: {}. Valid levels: {:?}",
            config.level, valid_levels
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_settings() -> Settings {
        let mut settings = Settings::default();
        settings.backend.anon_key = "anon".to_string();
        settings
    }

    #[test]
    fn test_rest_mode_requires_anon_key() {
        let mut settings = valid_settings();
        settings.backend.anon_key.clear();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_postgres_mode_requirements() {
        let mut settings = valid_settings();
        settings.backend.mode = BackendMode::Postgres;
        assert!(validate_settings(&settings).is_err());

        settings.backend.database_url = Some("postgresql://localhost/ssa".to_string());
        assert!(validate_settings(&settings).is_err());

        settings.backend.jwt_secret = Some("secret".to_string());
        assert!(validate_settings(&settings).is_ok());

        settings.backend.min_connections = 20;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_cache_backend_validation() {
        let mut settings = valid_settings();
        settings.cache.backend = "redis".to_string();
        assert!(validate_settings(&settings).is_err());

        settings.cache.redis_url = Some("redis://localhost:6379".to_string());
        assert!(validate_settings(&settings).is_ok());

        settings.cache.backend = "memcached".to_string();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut settings = valid_settings();
        settings.logging.level = "verbose".to_string();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_utc_offset_range() {
        let mut settings = valid_settings();
        settings.app.utc_offset_minutes = -420;
        assert!(validate_settings(&settings).is_ok());
        settings.app.utc_offset_minutes = 24 * 60;
        assert!(validate_settings(&settings).is_err());
    }
}
