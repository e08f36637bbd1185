//! SSA Dashboard
//!
//! Membership dashboard for the SSA club. Members browse upcoming events
//! and shared resources; administrators manage events, resources, tags and
//! users. Persistence and sign-in are delegated to a hosted backend.

#![allow(non_snake_case)]

pub mod backend;
pub mod config;
pub mod database;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;
pub mod views;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{DashboardError, Result};

// Re-export main components for easy access
pub use backend::{Backend, BackendHandle, Session};
pub use database::DatabaseService;
pub use handlers::create_router;
pub use services::{AppState, ServiceFactory};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
