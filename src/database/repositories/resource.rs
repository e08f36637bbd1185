//! Resource repository implementation

use uuid::Uuid;

use crate::backend::{BackendHandle, Embed};
use crate::models::{Resource, ResourceInput, ResourceTagLink, ResourceWithTags, WithId};
use crate::utils::errors::BackendResult;

const TABLE: &str = "resources";
const LINK_TABLE: &str = "resource_tags";

#[derive(Clone)]
pub struct ResourceRepository {
    db: BackendHandle,
}

impl ResourceRepository {
    pub fn new(db: BackendHandle) -> Self {
        Self { db }
    }

    /// Create a new resource
    pub async fn create(&self, id: Uuid, input: ResourceInput) -> BackendResult<()> {
        self.db.from(TABLE).insert(&WithId { id, fields: input }).await
    }

    pub async fn update(&self, id: Uuid, input: &ResourceInput) -> BackendResult<()> {
        self.db.from(TABLE).update(input).eq("id", id).execute().await
    }

    pub async fn delete(&self, id: Uuid) -> BackendResult<()> {
        self.db.from(TABLE).delete().eq("id", id).execute().await
    }

    /// Pinned first, then by name
    pub async fn list(&self) -> BackendResult<Vec<Resource>> {
        self.db
            .from(TABLE)
            .select("*")
            .order("is_pinned", false)
            .order("name", true)
            .execute()
            .await
    }

    pub async fn list_pinned(&self) -> BackendResult<Vec<Resource>> {
        self.db
            .from(TABLE)
            .select("*")
            .eq("is_pinned", true)
            .order("name", true)
            .execute()
            .await
    }

    /// Resources with their tags embedded, same order as `list`
    pub async fn list_with_tags(&self) -> BackendResult<Vec<ResourceWithTags>> {
        self.db
            .from(TABLE)
            .select("*")
            .embed(Embed::ResourceTags)
            .order("is_pinned", false)
            .order("name", true)
            .execute()
            .await
    }

    /// Replace the resource's tag links with `tag_ids`
    ///
    /// Two writes (delete, then insert); a failure in between leaves the
    /// resource untagged.
    pub async fn replace_tags(&self, resource_id: Uuid, tag_ids: &[Uuid]) -> BackendResult<()> {
        self.db
            .from(LINK_TABLE)
            .delete()
            .eq("resource_id", resource_id)
            .execute()
            .await?;

        let links: Vec<ResourceTagLink> = tag_ids
            .iter()
            .map(|tag_id| ResourceTagLink {
                resource_id,
                tag_id: *tag_id,
            })
            .collect();
        self.db.from(LINK_TABLE).insert_many(&links).await
    }
}
