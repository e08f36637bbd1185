//! Tag repository implementation

use uuid::Uuid;

use crate::backend::BackendHandle;
use crate::models::{Tag, TagInput, WithId};
use crate::utils::errors::BackendResult;

const TABLE: &str = "tags";

#[derive(Clone)]
pub struct TagRepository {
    db: BackendHandle,
}

impl TagRepository {
    pub fn new(db: BackendHandle) -> Self {
        Self { db }
    }

    pub async fn create(&self, id: Uuid, input: TagInput) -> BackendResult<()> {
        self.db.from(TABLE).insert(&WithId { id, fields: input }).await
    }

    pub async fn update(&self, id: Uuid, input: &TagInput) -> BackendResult<()> {
        self.db.from(TABLE).update(input).eq("id", id).execute().await
    }

    /// Delete tag; its resource links go with it through the foreign key
    pub async fn delete(&self, id: Uuid) -> BackendResult<()> {
        self.db.from(TABLE).delete().eq("id", id).execute().await
    }

    /// Tags in display order, ties broken by name
    pub async fn list(&self) -> BackendResult<Vec<Tag>> {
        self.db
            .from(TABLE)
            .select("*")
            .order("display_order", true)
            .order("name", true)
            .execute()
            .await
    }
}
