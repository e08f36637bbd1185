//! In-memory backend for testing
//!
//! Implements the `Backend` contract over JSON rows held in memory, with
//! PostgREST-like filter, order and embed semantics. Every call is counted
//! so tests can assert that rejected actions never reached the backend.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use SsaDashboard::backend::{AuthSession, AuthUser, Backend, Columns, Embed, Filter, SelectQuery, Session};
use SsaDashboard::utils::errors::{BackendError, BackendResult};

#[derive(Default)]
pub struct MemoryBackend {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    users: Mutex<HashMap<String, AuthUser>>,
    codes: Mutex<HashMap<String, String>>,
    fail_with: Mutex<Option<String>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session token for a user
    pub fn add_session(&self, token: &str, user_id: Uuid) {
        self.users.lock().unwrap().insert(
            token.to_string(),
            AuthUser {
                id: user_id,
                email: Some(format!("{}@example.com", token)),
            },
        );
    }

    /// Make `code` exchangeable for `token`
    pub fn add_auth_code(&self, code: &str, token: &str) {
        self.codes
            .lock()
            .unwrap()
            .insert(code.to_string(), token.to_string());
    }

    /// Insert rows without counting a write
    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .extend(rows);
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Fail every subsequent write with this message
    pub fn fail_writes(&self, message: &str) {
        *self.fail_with.lock().unwrap() = Some(message.to_string());
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(AtomicOrdering::SeqCst)
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(AtomicOrdering::SeqCst)
    }

    fn check_write(&self) -> BackendResult<()> {
        self.writes.fetch_add(1, AtomicOrdering::SeqCst);
        match self.fail_with.lock().unwrap().clone() {
            Some(message) => Err(BackendError::Api {
                status: 400,
                message,
                code: None,
            }),
            None => Ok(()),
        }
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn compare_text(left: &str, right: &str) -> Ordering {
    if let (Ok(a), Ok(b)) = (left.parse::<f64>(), right.parse::<f64>()) {
        return a.partial_cmp(&b).unwrap_or(Ordering::Equal);
    }
    if let (Ok(a), Ok(b)) = (
        DateTime::parse_from_rfc3339(left),
        DateTime::parse_from_rfc3339(right),
    ) {
        return a.cmp(&b);
    }
    left.to_lowercase().cmp(&right.to_lowercase())
}

fn compare_values(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (a, b) => compare_text(&text(a), &text(b)),
    }
}

fn matches(row: &Value, filters: &[Filter]) -> bool {
    filters.iter().all(|filter| {
        let field = row.get(filter.column()).cloned().unwrap_or(Value::Null);
        match filter {
            Filter::Eq { value, .. } => text(&field).eq_ignore_ascii_case(value),
            Filter::Gte { value, .. } => {
                !field.is_null() && compare_text(&text(&field), value) != Ordering::Less
            }
        }
    })
}

fn project(row: &Value, columns: &Columns) -> Value {
    match columns {
        Columns::All => row.clone(),
        Columns::Named(names) => {
            let mut object = Map::new();
            for name in names {
                object.insert(name.clone(), row.get(name).cloned().unwrap_or(Value::Null));
            }
            Value::Object(object)
        }
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn get_user(&self, session: &Session) -> BackendResult<AuthUser> {
        let token = session.token()?;
        self.users
            .lock()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or_else(|| BackendError::Api {
                status: 401,
                message: "invalid JWT".to_string(),
                code: None,
            })
    }

    async fn select(&self, _session: &Session, query: &SelectQuery) -> BackendResult<Vec<Value>> {
        query.validate()?;
        self.reads.fetch_add(1, AtomicOrdering::SeqCst);

        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<Value> = tables
            .get(&query.table)
            .map(|rows| rows.iter().filter(|row| matches(row, &query.filters)).cloned().collect())
            .unwrap_or_default();

        rows.sort_by(|a, b| {
            for order in &query.order {
                let left = a.get(&order.column).unwrap_or(&Value::Null);
                let right = b.get(&order.column).unwrap_or(&Value::Null);
                let ordering = if order.ascending {
                    compare_values(left, right)
                } else {
                    compare_values(right, left)
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });

        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        let mut output: Vec<Value> = rows.iter().map(|row| project(row, &query.columns)).collect();

        if query.embed == Some(Embed::ResourceTags) {
            let links = tables.get("resource_tags").cloned().unwrap_or_default();
            let tags = tables.get("tags").cloned().unwrap_or_default();
            for (row, source) in output.iter_mut().zip(rows.iter()) {
                let id = text(source.get("id").unwrap_or(&Value::Null));
                let mut embedded: Vec<Value> = links
                    .iter()
                    .filter(|link| text(link.get("resource_id").unwrap_or(&Value::Null)) == id)
                    .filter_map(|link| {
                        let tag_id = text(link.get("tag_id").unwrap_or(&Value::Null));
                        tags.iter()
                            .find(|tag| text(tag.get("id").unwrap_or(&Value::Null)) == tag_id)
                            .cloned()
                    })
                    .collect();
                embedded.sort_by(|a, b| {
                    compare_values(&a["display_order"], &b["display_order"])
                        .then_with(|| compare_values(&a["name"], &b["name"]))
                });
                if let Value::Object(object) = row {
                    object.insert("tags".to_string(), Value::Array(embedded));
                }
            }
        }

        Ok(output)
    }

    async fn insert(&self, _session: &Session, table: &str, rows: Vec<Value>) -> BackendResult<()> {
        SsaDashboard::backend::query::validate_table(table)?;
        self.check_write()?;

        let rows = rows
            .into_iter()
            .map(|mut row| {
                if table == "resources" {
                    if let Value::Object(object) = &mut row {
                        object
                            .entry("created_at")
                            .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));
                    }
                }
                row
            })
            .collect::<Vec<_>>();
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .extend(rows);
        Ok(())
    }

    async fn update(
        &self,
        _session: &Session,
        table: &str,
        values: Value,
        filters: &[Filter],
    ) -> BackendResult<()> {
        SsaDashboard::backend::query::validate_filters(table, filters)?;
        self.check_write()?;

        let Value::Object(changes) = values else {
            return Err(BackendError::InvalidQuery("update values must be an object".to_string()));
        };
        let mut tables = self.tables.lock().unwrap();
        for row in tables.entry(table.to_string()).or_default().iter_mut() {
            if matches(row, filters) {
                if let Value::Object(object) = row {
                    for (key, value) in &changes {
                        object.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        Ok(())
    }

    async fn delete(&self, _session: &Session, table: &str, filters: &[Filter]) -> BackendResult<()> {
        SsaDashboard::backend::query::validate_filters(table, filters)?;
        self.check_write()?;

        let mut tables = self.tables.lock().unwrap();
        tables
            .entry(table.to_string())
            .or_default()
            .retain(|row| !matches(row, filters));
        Ok(())
    }

    async fn exchange_code_for_session(
        &self,
        code: &str,
        _code_verifier: Option<&str>,
    ) -> BackendResult<AuthSession> {
        match self.codes.lock().unwrap().get(code) {
            Some(token) => Ok(AuthSession {
                access_token: token.clone(),
                refresh_token: None,
                expires_in: Some(3600),
            }),
            None => Err(BackendError::Api {
                status: 400,
                message: "invalid flow state, no valid flow state found".to_string(),
                code: Some("flow_state_not_found".to_string()),
            }),
        }
    }

    async fn sign_out(&self, session: &Session) -> BackendResult<()> {
        session.token()?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
