//! Mutation actions
//!
//! One function per entity per operation. Every action runs through
//! `pipeline::run`: authorize, validate, write, invalidate, return.

pub mod events;
pub mod pipeline;
pub mod profile;
pub mod resources;
pub mod tags;
pub mod users;

use std::sync::Arc;

use chrono::FixedOffset;
use uuid::Uuid;

use super::auth::AuthService;
use super::cache::PageCache;
use crate::database::DatabaseService;
use crate::utils::errors::ActionError;

pub use events::{create_event, delete_event, update_event};
pub use profile::update_profile;
pub use resources::{create_resource, delete_resource, update_resource};
pub use tags::{create_tag, delete_tag, update_tag};
pub use users::{delete_user_profile, update_user_role};

/// Everything an action needs for one request
#[derive(Clone)]
pub struct ActionContext {
    pub db: DatabaseService,
    pub auth: AuthService,
    pub cache: Arc<dyn PageCache>,
    /// Offset `datetime-local` form values are read in
    pub utc_offset: FixedOffset,
}

impl ActionContext {
    pub fn new(
        db: DatabaseService,
        auth: AuthService,
        cache: Arc<dyn PageCache>,
        utc_offset: FixedOffset,
    ) -> Self {
        Self {
            db,
            auth,
            cache,
            utc_offset,
        }
    }
}

/// Parse a path id
pub fn parse_id(id: &str) -> Result<Uuid, ActionError> {
    Uuid::parse_str(id.trim()).map_err(|_| ActionError::Validation("Invalid id".to_string()))
}

/// Required text field: present and non-blank after trimming
pub(crate) fn required(value: Option<&str>) -> Option<String> {
    crate::utils::helpers::non_empty(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()), Ok(id));
        assert_eq!(
            parse_id("not-a-uuid"),
            Err(ActionError::Validation("Invalid id".to_string()))
        );
    }
}
