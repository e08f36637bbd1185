//! Resource model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::tag::Tag;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: Uuid,
    pub name: String,
    pub link: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A resource together with its tags (the one aggregation query)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceWithTags {
    #[serde(flatten)]
    pub resource: Resource,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl ResourceWithTags {
    pub fn has_tag(&self, tag_id: &Uuid) -> bool {
        self.tags.iter().any(|tag| &tag.id == tag_id)
    }
}

/// Writable resource columns, shared by create and update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceInput {
    pub name: String,
    pub link: String,
    pub description: Option<String>,
    pub is_pinned: bool,
}

/// Row of the `resource_tags` join table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTagLink {
    pub resource_id: Uuid,
    pub tag_id: Uuid,
}
