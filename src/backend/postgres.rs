//! Direct Postgres access to the hosted backend's database
//!
//! Used when the dashboard runs next to the backend's database instead of
//! going through its REST API. Session tokens are the backend's own HS256
//! JWTs and are verified locally.

use std::time::Instant;

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::Value;
use sqlx::Row;
use tracing::debug;
use uuid::Uuid;

use super::query::{validate_column, validate_filters, validate_table, Columns, Embed, Filter, SelectQuery};
use super::{AuthSession, AuthUser, Backend, Session};
use crate::database::connection::DatabasePool;
use crate::utils::errors::{BackendError, BackendResult};
use crate::utils::logging::log_backend_operation;

/// Claims of a backend-issued session token
#[derive(Debug, Deserialize)]
struct Claims {
    sub: Uuid,
    #[serde(default)]
    email: Option<String>,
}

/// Correlated subquery producing a resource's tags
const RESOURCE_TAGS_SQL: &str = "(SELECT COALESCE(json_agg(json_build_object(\
    'id', tg.id, 'name', tg.name, 'display_order', tg.display_order) \
    ORDER BY tg.display_order, tg.name), '[]'::json) \
    FROM resource_tags rt JOIN tags tg ON tg.id = rt.tag_id \
    WHERE rt.resource_id = resources.id) AS tags";

#[derive(Clone)]
pub struct PgBackend {
    pool: DatabasePool,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl PgBackend {
    pub fn new(pool: DatabasePool, jwt_secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;

        Self {
            pool,
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            validation,
        }
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    fn verify(&self, session: &Session) -> BackendResult<AuthUser> {
        let token = session.token()?;
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| BackendError::InvalidToken(e.to_string()))?;
        Ok(AuthUser {
            id: data.claims.sub,
            email: data.claims.email,
        })
    }
}

/// SQL type a filter value is cast to
fn column_type(column: &str) -> Option<&'static str> {
    match column {
        "id" | "resource_id" | "tag_id" => Some("uuid"),
        "graduation_year" | "display_order" => Some("integer"),
        "is_pinned" => Some("boolean"),
        "start_time" | "end_time" | "created_at" => Some("timestamptz"),
        _ => None,
    }
}

fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier)
}

/// `WHERE` clause with placeholders starting at `$first`
fn where_clause(table: &str, filters: &[Filter], first: usize) -> String {
    if filters.is_empty() {
        return String::new();
    }
    let conditions: Vec<String> = filters
        .iter()
        .enumerate()
        .map(|(i, filter)| {
            let placeholder = match column_type(filter.column()) {
                Some(ty) => format!("CAST(${} AS {})", first + i, ty),
                None => format!("${}", first + i),
            };
            format!(
                "{}.{} {} {}",
                quote(table),
                quote(filter.column()),
                filter.sql_operator(),
                placeholder
            )
        })
        .collect();
    format!(" WHERE {}", conditions.join(" AND "))
}

fn select_sql(query: &SelectQuery) -> String {
    let mut columns = match &query.columns {
        Columns::All => "*".to_string(),
        Columns::Named(names) => names.iter().map(|c| quote(c)).collect::<Vec<_>>().join(", "),
    };
    if let Some(Embed::ResourceTags) = query.embed {
        columns = format!("{}, {}", columns, RESOURCE_TAGS_SQL);
    }

    let mut sql = format!(
        "SELECT {} FROM {}{}",
        columns,
        quote(&query.table),
        where_clause(&query.table, &query.filters, 1)
    );
    if !query.order.is_empty() {
        let order: Vec<String> = query
            .order
            .iter()
            .map(|o| format!("{} {}", quote(&o.column), if o.ascending { "ASC" } else { "DESC" }))
            .collect();
        sql.push_str(&format!(" ORDER BY {}", order.join(", ")));
    }
    if let Some(limit) = query.limit {
        sql.push_str(&format!(" LIMIT {}", limit));
    }
    format!("SELECT row_to_json(t) AS row FROM ({}) t", sql)
}

/// Column names of a JSON payload, checked against the table
fn payload_columns(table: &str, value: &Value) -> BackendResult<Vec<String>> {
    let object = value
        .as_object()
        .ok_or_else(|| BackendError::InvalidQuery("row payload must be an object".to_string()))?;
    let mut columns = Vec::with_capacity(object.len());
    for key in object.keys() {
        validate_column(table, key)?;
        columns.push(key.clone());
    }
    if columns.is_empty() {
        return Err(BackendError::InvalidQuery("row payload is empty".to_string()));
    }
    Ok(columns)
}

/// Database errors keep their message so it reaches the user unchanged
fn map_sqlx(error: sqlx::Error) -> BackendError {
    match error {
        sqlx::Error::Database(db) => {
            let code = db.code().map(|c| c.to_string());
            let status = match code.as_deref() {
                Some("23505") => 409,
                Some(c) if c.starts_with("23") || c.starts_with("22") => 400,
                _ => 500,
            };
            BackendError::Api {
                status,
                message: db.message().to_string(),
                code,
            }
        }
        other => BackendError::Database(other),
    }
}

#[async_trait]
impl Backend for PgBackend {
    async fn get_user(&self, session: &Session) -> BackendResult<AuthUser> {
        self.verify(session)
    }

    async fn select(&self, session: &Session, query: &SelectQuery) -> BackendResult<Vec<Value>> {
        self.verify(session)?;
        query.validate()?;

        let sql = select_sql(query);
        let mut statement = sqlx::query(&sql);
        for filter in &query.filters {
            statement = statement.bind(filter.value().to_string());
        }

        let started = Instant::now();
        let result = statement.fetch_all(&self.pool).await;
        log_backend_operation(
            "select",
            &query.table,
            started.elapsed().as_millis() as u64,
            result.is_ok(),
        );

        let rows = result.map_err(map_sqlx)?;
        debug!(table = %query.table, rows = rows.len(), "Rows selected");
        rows.iter()
            .map(|row| row.try_get::<Value, _>("row").map_err(map_sqlx))
            .collect()
    }

    async fn insert(&self, session: &Session, table: &str, rows: Vec<Value>) -> BackendResult<()> {
        self.verify(session)?;
        validate_table(table)?;
        let Some(first) = rows.first() else {
            return Ok(());
        };

        let columns = payload_columns(table, first)?;
        let column_list = columns.iter().map(|c| quote(c)).collect::<Vec<_>>().join(", ");
        let sql = format!(
            "INSERT INTO {table} ({cols}) SELECT {cols} FROM jsonb_populate_recordset(NULL::{table}, $1)",
            table = quote(table),
            cols = column_list
        );

        let started = Instant::now();
        let result = sqlx::query(&sql)
            .bind(Value::Array(rows))
            .execute(&self.pool)
            .await;
        log_backend_operation("insert", table, started.elapsed().as_millis() as u64, result.is_ok());
        result.map(|_| ()).map_err(map_sqlx)
    }

    async fn update(
        &self,
        session: &Session,
        table: &str,
        values: Value,
        filters: &[Filter],
    ) -> BackendResult<()> {
        self.verify(session)?;
        validate_table(table)?;
        validate_filters(table, filters)?;

        let columns = payload_columns(table, &values)?;
        let assignments = columns
            .iter()
            .map(|c| format!("{col} = r.{col}", col = quote(c)))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {table} SET {assignments} FROM jsonb_populate_record(NULL::{table}, $1) r{filter}",
            table = quote(table),
            assignments = assignments,
            filter = where_clause(table, filters, 2)
        );

        let mut statement = sqlx::query(&sql).bind(values);
        for filter in filters {
            statement = statement.bind(filter.value().to_string());
        }

        let started = Instant::now();
        let result = statement.execute(&self.pool).await;
        log_backend_operation("update", table, started.elapsed().as_millis() as u64, result.is_ok());
        result.map(|_| ()).map_err(map_sqlx)
    }

    async fn delete(&self, session: &Session, table: &str, filters: &[Filter]) -> BackendResult<()> {
        self.verify(session)?;
        validate_table(table)?;
        validate_filters(table, filters)?;

        let sql = format!(
            "DELETE FROM {}{}",
            quote(table),
            where_clause(table, filters, 1)
        );
        let mut statement = sqlx::query(&sql);
        for filter in filters {
            statement = statement.bind(filter.value().to_string());
        }

        let started = Instant::now();
        let result = statement.execute(&self.pool).await;
        log_backend_operation("delete", table, started.elapsed().as_millis() as u64, result.is_ok());
        result.map(|_| ()).map_err(map_sqlx)
    }

    async fn exchange_code_for_session(
        &self,
        _code: &str,
        _code_verifier: Option<&str>,
    ) -> BackendResult<AuthSession> {
        Err(BackendError::Unsupported(
            "code exchange requires the hosted auth API".to_string(),
        ))
    }

    async fn sign_out(&self, session: &Session) -> BackendResult<()> {
        // Tokens are stateless here; dropping the cookie ends the session
        self.verify(session).map(|_| ())
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::query::Order;

    #[test]
    fn test_select_sql_with_filters_and_order() {
        let mut query = SelectQuery::new("events", "*");
        query.filters.push(Filter::Gte {
            column: "end_time".to_string(),
            value: "2025-01-15T18:00:00Z".to_string(),
        });
        query.order.push(Order {
            column: "start_time".to_string(),
            ascending: true,
        });

        assert_eq!(
            select_sql(&query),
            "SELECT row_to_json(t) AS row FROM (SELECT * FROM \"events\" \
             WHERE \"events\".\"end_time\" >= CAST($1 AS timestamptz) \
             ORDER BY \"start_time\" ASC) t"
        );
    }

    #[test]
    fn test_select_sql_embeds_tags() {
        let mut query = SelectQuery::new("resources", "*");
        query.embed = Some(Embed::ResourceTags);
        let sql = select_sql(&query);
        assert!(sql.contains("json_agg"));
        assert!(sql.contains("ORDER BY tg.display_order, tg.name"));
    }

    #[test]
    fn test_where_clause_text_column_is_not_cast() {
        let filters = vec![Filter::Eq {
            column: "role".to_string(),
            value: "admin".to_string(),
        }];
        assert_eq!(
            where_clause("profiles", &filters, 2),
            " WHERE \"profiles\".\"role\" = $2"
        );
    }

    #[test]
    fn test_payload_columns_rejects_unknown_keys() {
        let payload = serde_json::json!({"name": "Scores", "owner": "x"});
        assert!(payload_columns("tags", &payload).is_err());

        let payload = serde_json::json!({"name": "Scores", "display_order": 1});
        assert_eq!(payload_columns("tags", &payload).unwrap().len(), 2);
    }
}
