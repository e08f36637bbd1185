//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the dashboard.

use std::path::Path;

use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use crate::config::LoggingConfig;
use crate::utils::errors::{DashboardError, Result};

/// Initialize logging based on configuration
///
/// The returned guard flushes the file writer and must live as long as the process.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.level));

    let stdout_layer = if config.json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    let (file_layer, guard) = match config.file_path.as_deref() {
        Some(dir) if !dir.is_empty() => {
            let file_appender = tracing_appender::rolling::daily(Path::new(dir), "ssa-dashboard.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking)
                .boxed();
            (Some(layer), Some(guard))
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| DashboardError::Config(format!("Failed to initialize logging: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log admin actions
pub fn log_admin_action(admin_id: &str, action: &str, target: Option<&str>) {
    warn!(
        admin_id = admin_id,
        action = action,
        target = target,
        "Admin action performed"
    );
}

/// Log mutation action outcome
pub fn log_action_result(action: &str, success: bool, error: Option<&str>) {
    if success {
        info!(action = action, "Action completed");
    } else {
        warn!(action = action, error = error, "Action rejected");
    }
}

/// Log hosted backend errors with context
pub fn log_backend_error(action: &str, error: &str) {
    error!(
        action = action,
        error = error,
        "Backend call failed"
    );
}

/// Log backend operations
pub fn log_backend_operation(operation: &str, table: &str, duration_ms: u64, success: bool) {
    if success {
        debug!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Backend operation completed"
        );
    } else {
        warn!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Backend operation failed"
        );
    }
}

/// Log page cache invalidation
pub fn log_revalidation(path: &str, removed: bool) {
    debug!(path = path, removed = removed, "Path revalidated");
}

/// Log completed HTTP request
pub fn log_request(method: &str, path: &str, status: u16, duration_ms: u64) {
    if status >= 500 {
        error!(method = method, path = path, status = status, duration_ms = duration_ms, "Request completed");
    } else if status >= 400 {
        warn!(method = method, path = path, status = status, duration_ms = duration_ms, "Request completed");
    } else {
        info!(method = method, path = path, status = status, duration_ms = duration_ms, "Request completed");
    }
}
