//! Database service layer
//!
//! This module provides a high-level interface to database operations

use crate::backend::{AuthUser, BackendHandle};
use crate::database::{EventRepository, ProfileRepository, ResourceRepository, TagRepository};
use crate::utils::errors::BackendResult;

/// Repositories bound to one request's session
#[derive(Clone)]
pub struct DatabaseService {
    pub profiles: ProfileRepository,
    pub events: EventRepository,
    pub resources: ResourceRepository,
    pub tags: TagRepository,
    handle: BackendHandle,
}

impl DatabaseService {
    pub fn new(handle: BackendHandle) -> Self {
        Self {
            profiles: ProfileRepository::new(handle.clone()),
            events: EventRepository::new(handle.clone()),
            resources: ResourceRepository::new(handle.clone()),
            tags: TagRepository::new(handle.clone()),
            handle,
        }
    }

    pub fn handle(&self) -> &BackendHandle {
        &self.handle
    }

    /// The session's user according to the auth service
    pub async fn current_user(&self) -> BackendResult<AuthUser> {
        self.handle.auth().get_user().await
    }
}
