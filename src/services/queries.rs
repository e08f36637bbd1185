//! Data-access functions used by the pages
//!
//! One backend query each. A failed call or a missing session yields `None`
//! (or `false` for the admin flag) after a warning; nothing is retried.

use std::fmt::Display;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::database::DatabaseService;
use crate::models::{Event, Profile, Resource, ResourceWithTags, Role, Tag};
use crate::utils::errors::BackendResult;

fn swallow<T, E: Display>(query: &str, result: Result<T, E>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(query = query, error = %e, "Query failed");
            None
        }
    }
}

/// First name of the session user
pub async fn get_first_name(db: &DatabaseService) -> Option<String> {
    let result: BackendResult<Option<String>> = async {
        let user = db.current_user().await?;
        db.profiles.find_first_name(user.id).await
    }
    .await;
    swallow("get_first_name", result).flatten()
}

/// Full profile of the session user
pub async fn get_current_profile(db: &DatabaseService) -> Option<Profile> {
    let result: BackendResult<_> = async {
        let user = db.current_user().await?;
        db.profiles.find_by_id(user.id).await
    }
    .await;
    swallow("get_current_profile", result)
}

/// Whether the session user is an admin; `false` on any failure
pub async fn get_is_admin(db: &DatabaseService) -> bool {
    let result: BackendResult<_> = async {
        let user = db.current_user().await?;
        db.profiles.find_role(user.id).await
    }
    .await;
    swallow("get_is_admin", result)
        .map(|role| role == Role::Admin)
        .unwrap_or(false)
}

pub async fn get_upcoming_events(db: &DatabaseService) -> Option<Vec<Event>> {
    get_upcoming_events_at(db, Utc::now()).await
}

/// Events whose `end_time` is not before `now`, by `start_time`
pub async fn get_upcoming_events_at(db: &DatabaseService, now: DateTime<Utc>) -> Option<Vec<Event>> {
    swallow("get_upcoming_events", db.events.list_upcoming(now).await)
}

pub async fn get_all_events(db: &DatabaseService) -> Option<Vec<Event>> {
    swallow("get_all_events", db.events.list().await)
}

/// Pinned first, then by name
pub async fn get_resources(db: &DatabaseService) -> Option<Vec<Resource>> {
    swallow("get_resources", db.resources.list().await)
}

pub async fn get_pinned_resources(db: &DatabaseService) -> Option<Vec<Resource>> {
    swallow("get_pinned_resources", db.resources.list_pinned().await)
}

pub async fn get_resources_with_tags(db: &DatabaseService) -> Option<Vec<ResourceWithTags>> {
    swallow("get_resources_with_tags", db.resources.list_with_tags().await)
}

pub async fn get_tags(db: &DatabaseService) -> Option<Vec<Tag>> {
    swallow("get_tags", db.tags.list().await)
}

/// Admin user list by first name
pub async fn get_all_profiles(db: &DatabaseService) -> Option<Vec<Profile>> {
    swallow("get_all_profiles", db.profiles.list().await)
}
