//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub cache: CacheConfig,
    pub auth: AuthConfig,
    pub app: AppConfig,
    pub logging: LoggingConfig,
    pub features: FeaturesConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Public origin of the dashboard, used for OAuth redirects
    pub site_url: String,
    /// Development mode ignores `x-forwarded-host` on auth redirects
    pub development: bool,
}

/// How the hosted backend is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// REST + auth HTTP API of the hosted backend
    Rest,
    /// Direct Postgres connection with locally verified session tokens
    Postgres,
}

/// Hosted backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    pub mode: BackendMode,
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub url: String,
    /// Public (anon) API key sent with every REST request
    pub anon_key: String,
    pub timeout_seconds: u64,
    /// Postgres connection string, only used in `postgres` mode
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
    /// HS256 secret used to verify session tokens in `postgres` mode
    pub jwt_secret: Option<String>,
    pub run_migrations: bool,
}

/// Page cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// `memory` or `redis`
    pub backend: String,
    pub ttl_seconds: u64,
    pub redis_url: Option<String>,
    pub prefix: String,
}

/// Session cookie and OAuth provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub session_cookie: String,
    pub code_verifier_cookie: String,
    pub provider: String,
    pub cookie_secure: bool,
}

/// Presentation settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub name: String,
    /// Offset used to interpret and display `datetime-local` values
    pub utc_offset_minutes: i32,
    /// Hosts event images may be served from
    pub image_domains: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: Option<String>,
    pub json: bool,
}

/// Feature flags configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeaturesConfig {
    pub rate_limit: bool,
    pub rate_limit_per_minute: u32,
    /// Key the limiter on `x-forwarded-for`; only safe behind a proxy that overwrites it
    pub trust_forwarded_for: bool,
    pub page_cache: bool,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        Self::load(config::File::with_name("config").required(false))
    }

    /// Load settings from an explicit TOML file, still honouring env overrides
    pub fn from_file(path: &Path) -> Result<Self, config::ConfigError> {
        Self::load(config::File::from(path))
    }

    fn load<S>(file: S) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let defaults = config::Config::try_from(&Settings::default())?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("SSA_DASHBOARD")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("app.image_domains")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::DashboardError> {
        super::validation::validate_settings(self)
    }

    /// Socket address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                site_url: "http://localhost:3000".to_string(),
                development: true,
            },
            backend: BackendConfig {
                mode: BackendMode::Rest,
                url: "http://localhost:54321".to_string(),
                anon_key: String::new(),
                timeout_seconds: 10,
                database_url: None,
                max_connections: 10,
                min_connections: 1,
                jwt_secret: None,
                run_migrations: false,
            },
            cache: CacheConfig {
                backend: "memory".to_string(),
                ttl_seconds: 300,
                redis_url: None,
                prefix: "ssa_dashboard:".to_string(),
            },
            auth: AuthConfig {
                session_cookie: "sb-access-token".to_string(),
                code_verifier_cookie: "sb-code-verifier".to_string(),
                provider: "google".to_string(),
                cookie_secure: false,
            },
            app: AppConfig {
                name: "SSA".to_string(),
                utc_offset_minutes: 0,
                image_domains: vec![
                    "5wetyecq6s.ufs.sh".to_string(),
                    "placehold.co".to_string(),
                    "images.unsplash.com".to_string(),
                ],
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: None,
                json: false,
            },
            features: FeaturesConfig {
                rate_limit: true,
                rate_limit_per_minute: 60,
                trust_forwarded_for: false,
                page_cache: true,
            },
        }
    }
}
