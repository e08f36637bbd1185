//! Profile repository implementation

use serde::Deserialize;
use uuid::Uuid;

use crate::backend::BackendHandle;
use crate::models::{Profile, Role, UpdateProfileRequest, UpdateRoleRequest};
use crate::utils::errors::BackendResult;

const TABLE: &str = "profiles";

#[derive(Deserialize)]
struct FirstNameRow {
    first_name: Option<String>,
}

#[derive(Deserialize)]
struct RoleRow {
    #[serde(default)]
    role: Role,
}

#[derive(Clone)]
pub struct ProfileRepository {
    db: BackendHandle,
}

impl ProfileRepository {
    pub fn new(db: BackendHandle) -> Self {
        Self { db }
    }

    /// Find profile by ID
    pub async fn find_by_id(&self, id: Uuid) -> BackendResult<Profile> {
        self.db.from(TABLE).select("*").eq("id", id).single().await
    }

    pub async fn find_first_name(&self, id: Uuid) -> BackendResult<Option<String>> {
        let row: FirstNameRow = self
            .db
            .from(TABLE)
            .select("first_name")
            .eq("id", id)
            .single()
            .await?;
        Ok(row.first_name)
    }

    pub async fn find_role(&self, id: Uuid) -> BackendResult<Role> {
        let row: RoleRow = self
            .db
            .from(TABLE)
            .select("role")
            .eq("id", id)
            .single()
            .await?;
        Ok(row.role)
    }

    /// All profiles by first name
    pub async fn list(&self) -> BackendResult<Vec<Profile>> {
        self.db
            .from(TABLE)
            .select("*")
            .order("first_name", true)
            .execute()
            .await
    }

    /// Update the owner-editable fields
    pub async fn update_details(&self, id: Uuid, request: &UpdateProfileRequest) -> BackendResult<()> {
        self.db.from(TABLE).update(request).eq("id", id).execute().await
    }

    pub async fn update_role(&self, id: Uuid, role: Role) -> BackendResult<()> {
        self.db
            .from(TABLE)
            .update(&UpdateRoleRequest { role })
            .eq("id", id)
            .execute()
            .await
    }

    pub async fn delete(&self, id: Uuid) -> BackendResult<()> {
        self.db.from(TABLE).delete().eq("id", id).execute().await
    }
}
