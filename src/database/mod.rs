//! Database module
//!
//! This module handles database connections and the per-table repositories

pub mod connection;
pub mod repositories;
pub mod service;

// Re-export commonly used database components
pub use connection::{DatabasePool, DatabaseConfig, create_pool, run_migrations, health_check};
pub use repositories::{EventRepository, ProfileRepository, ResourceRepository, TagRepository};
pub use service::DatabaseService;
