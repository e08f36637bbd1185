//! Hosted backend client module
//!
//! This module defines the contract the dashboard needs from the hosted
//! backend (row access and session auth) and the request-scoped handle the
//! repositories use to talk to it.

pub mod postgres;
pub mod query;
pub mod rest;

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::utils::errors::{BackendError, BackendResult};

pub use postgres::PgBackend;
pub use query::{Columns, Embed, Filter, Order, SelectQuery};
pub use rest::RestBackend;

/// Credentials carried by one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub access_token: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            access_token: Some(token.into()),
        }
    }

    pub fn token(&self) -> BackendResult<&str> {
        self.access_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(BackendError::NoSession)
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_ok()
    }
}

/// The signed-in user as reported by the auth service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// Tokens issued by a successful code exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// Row access and auth operations of the hosted backend
///
/// Rows travel as JSON objects; typing happens in `BackendHandle`.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Resolve the session's user
    async fn get_user(&self, session: &Session) -> BackendResult<AuthUser>;

    async fn select(&self, session: &Session, query: &SelectQuery) -> BackendResult<Vec<Value>>;

    async fn insert(&self, session: &Session, table: &str, rows: Vec<Value>) -> BackendResult<()>;

    async fn update(
        &self,
        session: &Session,
        table: &str,
        values: Value,
        filters: &[Filter],
    ) -> BackendResult<()>;

    /// Delete matching rows; matching nothing is not an error
    async fn delete(&self, session: &Session, table: &str, filters: &[Filter]) -> BackendResult<()>;

    /// Exchange an OAuth authorization code (PKCE) for a session
    async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> BackendResult<AuthSession>;

    async fn sign_out(&self, session: &Session) -> BackendResult<()>;

    /// Name used in logs and health output
    fn name(&self) -> &'static str;
}

/// A backend bound to the current request's session
#[derive(Clone)]
pub struct BackendHandle {
    backend: Arc<dyn Backend>,
    session: Session,
}

impl BackendHandle {
    pub fn new(backend: Arc<dyn Backend>, session: Session) -> Self {
        Self { backend, session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    pub fn auth(&self) -> AuthClient<'_> {
        AuthClient { handle: self }
    }

    pub fn from(&self, table: &str) -> TableRef<'_> {
        TableRef {
            handle: self,
            table: table.to_string(),
        }
    }
}

pub struct AuthClient<'a> {
    handle: &'a BackendHandle,
}

impl AuthClient<'_> {
    pub async fn get_user(&self) -> BackendResult<AuthUser> {
        self.handle.backend.get_user(&self.handle.session).await
    }

    pub async fn sign_out(&self) -> BackendResult<()> {
        self.handle.backend.sign_out(&self.handle.session).await
    }
}

/// Entry point of the fluent table API
pub struct TableRef<'a> {
    handle: &'a BackendHandle,
    table: String,
}

impl<'a> TableRef<'a> {
    pub fn select(self, columns: &str) -> SelectBuilder<'a> {
        SelectBuilder {
            handle: self.handle,
            query: SelectQuery::new(&self.table, columns),
        }
    }

    pub async fn insert<T: Serialize>(self, row: &T) -> BackendResult<()> {
        self.insert_many(std::slice::from_ref(row)).await
    }

    pub async fn insert_many<T: Serialize>(self, rows: &[T]) -> BackendResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let values = rows
            .iter()
            .map(to_json)
            .collect::<BackendResult<Vec<_>>>()?;
        self.handle
            .backend
            .insert(&self.handle.session, &self.table, values)
            .await
    }

    pub fn update<T: Serialize>(self, values: &T) -> WriteBuilder<'a> {
        WriteBuilder {
            handle: self.handle,
            table: self.table,
            kind: WriteKind::Update(to_json(values)),
            filters: Vec::new(),
        }
    }

    pub fn delete(self) -> WriteBuilder<'a> {
        WriteBuilder {
            handle: self.handle,
            table: self.table,
            kind: WriteKind::Delete,
            filters: Vec::new(),
        }
    }
}

pub struct SelectBuilder<'a> {
    handle: &'a BackendHandle,
    query: SelectQuery,
}

impl SelectBuilder<'_> {
    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.query.filters.push(Filter::Eq {
            column: column.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn gte(mut self, column: &str, value: impl ToString) -> Self {
        self.query.filters.push(Filter::Gte {
            column: column.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.query.order.push(Order {
            column: column.to_string(),
            ascending,
        });
        self
    }

    pub fn embed(mut self, embed: Embed) -> Self {
        self.query.embed = Some(embed);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.query.limit = Some(limit);
        self
    }

    pub fn query(&self) -> &SelectQuery {
        &self.query
    }

    /// Run the query, decoding every row
    pub async fn execute<T: DeserializeOwned>(self) -> BackendResult<Vec<T>> {
        let rows = self
            .handle
            .backend
            .select(&self.handle.session, &self.query)
            .await?;
        rows.into_iter().map(from_json).collect()
    }

    /// Exactly one row; zero or several rows is an error
    pub async fn single<T: DeserializeOwned>(self) -> BackendResult<T> {
        let table = self.query.table.clone();
        let mut rows: Vec<T> = self.limit(2).execute().await?;
        match rows.len() {
            1 => Ok(rows.remove(0)),
            n => Err(BackendError::Api {
                status: 406,
                message: format!("JSON object requested, multiple (or no) rows returned from {} ({} rows)", table, n),
                code: Some("PGRST116".to_string()),
            }),
        }
    }
}

enum WriteKind {
    Update(BackendResult<Value>),
    Delete,
}

/// Pending update or delete, narrowed by filters
pub struct WriteBuilder<'a> {
    handle: &'a BackendHandle,
    table: String,
    kind: WriteKind,
    filters: Vec<Filter>,
}

impl WriteBuilder<'_> {
    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.filters.push(Filter::Eq {
            column: column.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub async fn execute(self) -> BackendResult<()> {
        // Unfiltered writes would touch the whole table
        if self.filters.is_empty() {
            return Err(BackendError::InvalidQuery(format!(
                "refusing unfiltered write on '{}'",
                self.table
            )));
        }
        let backend = &self.handle.backend;
        let session = &self.handle.session;
        match self.kind {
            WriteKind::Update(values) => {
                backend
                    .update(session, &self.table, values?, &self.filters)
                    .await
            }
            WriteKind::Delete => backend.delete(session, &self.table, &self.filters).await,
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> BackendResult<Value> {
    serde_json::to_value(value).map_err(|e| BackendError::Decode(e.to_string()))
}

fn from_json<T: DeserializeOwned>(value: Value) -> BackendResult<T> {
    serde_json::from_value(value).map_err(|e| BackendError::Decode(e.to_string()))
}
