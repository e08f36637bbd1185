//! Test context for unified test setup
//!
//! Wires a `ServiceFactory` around the in-memory backend and page cache,
//! with one admin and one member session already registered.

use std::sync::Arc;

use axum::Router;
use uuid::Uuid;

use SsaDashboard::backend::Session;
use SsaDashboard::config::Settings;
use SsaDashboard::database::DatabaseService;
use SsaDashboard::services::{ActionContext, MemoryPageCache, ServiceFactory};

use super::memory_backend::MemoryBackend;
use super::test_data::profile_row;

pub const ADMIN_TOKEN: &str = "admin-token";
pub const MEMBER_TOKEN: &str = "member-token";

pub struct TestContext {
    pub backend: Arc<MemoryBackend>,
    pub cache: Arc<MemoryPageCache>,
    pub services: Arc<ServiceFactory>,
    pub settings: Settings,
    pub admin_id: Uuid,
    pub member_id: Uuid,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_settings(test_settings())
    }

    pub fn with_settings(settings: Settings) -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let backend = Arc::new(MemoryBackend::new());
        let admin_id = Uuid::new_v4();
        let member_id = Uuid::new_v4();
        backend.add_session(ADMIN_TOKEN, admin_id);
        backend.add_session(MEMBER_TOKEN, member_id);
        backend.seed(
            "profiles",
            vec![
                profile_row(admin_id, "Ada", "admin"),
                profile_row(member_id, "Max", "member"),
            ],
        );

        let cache = Arc::new(MemoryPageCache::new(settings.cache.ttl_seconds));
        let services = Arc::new(ServiceFactory::new(
            settings.clone(),
            backend.clone(),
            cache.clone(),
        ));

        Self {
            backend,
            cache,
            services,
            settings,
            admin_id,
            member_id,
        }
    }

    pub fn admin(&self) -> ActionContext {
        self.services.action_context(Session::with_token(ADMIN_TOKEN))
    }

    pub fn member(&self) -> ActionContext {
        self.services.action_context(Session::with_token(MEMBER_TOKEN))
    }

    pub fn anonymous(&self) -> ActionContext {
        self.services.action_context(Session::anonymous())
    }

    pub fn database(&self, token: &str) -> DatabaseService {
        self.services.database(Session::with_token(token))
    }

    pub fn router(&self) -> Router {
        SsaDashboard::create_router(self.services.clone())
    }
}

/// Defaults with a fixed offset and rate limiting loose enough for tests
pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.backend.anon_key = "test-anon-key".to_string();
    settings.features.rate_limit_per_minute = 1000;
    settings
}
