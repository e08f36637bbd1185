//! Event repository implementation

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::backend::BackendHandle;
use crate::models::{Event, EventInput, WithId};
use crate::utils::errors::BackendResult;

const TABLE: &str = "events";

#[derive(Clone)]
pub struct EventRepository {
    db: BackendHandle,
}

impl EventRepository {
    pub fn new(db: BackendHandle) -> Self {
        Self { db }
    }

    /// Create a new event
    pub async fn create(&self, id: Uuid, input: EventInput) -> BackendResult<()> {
        self.db.from(TABLE).insert(&WithId { id, fields: input }).await
    }

    /// Update event
    pub async fn update(&self, id: Uuid, input: &EventInput) -> BackendResult<()> {
        self.db.from(TABLE).update(input).eq("id", id).execute().await
    }

    /// Delete event
    pub async fn delete(&self, id: Uuid) -> BackendResult<()> {
        self.db.from(TABLE).delete().eq("id", id).execute().await
    }

    /// All events, earliest first
    pub async fn list(&self) -> BackendResult<Vec<Event>> {
        self.db
            .from(TABLE)
            .select("*")
            .order("start_time", true)
            .execute()
            .await
    }

    /// Events that have not ended by `now`, earliest first
    pub async fn list_upcoming(&self, now: DateTime<Utc>) -> BackendResult<Vec<Event>> {
        self.db
            .from(TABLE)
            .select("*")
            .gte("end_time", now.to_rfc3339())
            .order("start_time", true)
            .execute()
            .await
    }
}
