//! REST client for the hosted backend
//!
//! Talks to the PostgREST data API (`/rest/v1`) and the auth API
//! (`/auth/v1`) of the hosted project. Every request carries the project's
//! public `apikey`; row access is authorized by the session's bearer token.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::query::{Columns, Embed, Filter, SelectQuery};
use super::{AuthSession, AuthUser, Backend, Session};
use crate::config::BackendConfig;
use crate::utils::errors::{BackendError, BackendResult, DashboardError, Result};
use crate::utils::logging::log_backend_operation;

/// Select fragment embedding a resource's tags through the join table
const RESOURCE_TAGS_SELECT: &str = "resource_tags(tags(id,name,display_order))";

/// Error payload shapes of the data and auth APIs
#[derive(Debug, Default, Deserialize)]
struct ErrorPayload {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
    code: Option<Value>,
    error_code: Option<String>,
}

impl ErrorPayload {
    fn into_error(self, status: StatusCode) -> BackendError {
        let code = self.error_code.or_else(|| match self.code {
            Some(Value::String(code)) => Some(code),
            Some(Value::Number(code)) => Some(code.to_string()),
            _ => None,
        });
        let message = self
            .message
            .or(self.msg)
            .or(self.error_description)
            .or(self.error)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });
        BackendError::Api {
            status: status.as_u16(),
            message,
            code,
        }
    }
}

/// Hosted backend reached over HTTP
#[derive(Clone)]
pub struct RestBackend {
    base_url: String,
    anon_key: String,
    http_client: reqwest::Client,
}

impl RestBackend {
    /// Create a new RestBackend instance
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("SsaDashboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(DashboardError::Http)?;

        Ok(Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    /// Request with the project key and, when present, the session token
    fn request(&self, method: Method, url: String, session: Option<&Session>) -> RequestBuilder {
        let bearer = session
            .and_then(|s| s.token().ok())
            .unwrap_or(&self.anon_key)
            .to_string();
        self.http_client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    async fn send(&self, operation: &str, table: &str, request: RequestBuilder) -> BackendResult<Response> {
        let started = Instant::now();
        let result = request.send().await;
        let duration_ms = started.elapsed().as_millis() as u64;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                log_backend_operation(operation, table, duration_ms, false);
                return Err(BackendError::Transport(e));
            }
        };

        let status = response.status();
        log_backend_operation(operation, table, duration_ms, status.is_success());
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let payload: ErrorPayload = serde_json::from_str(&body).unwrap_or_default();
        Err(payload.into_error(status))
    }

    fn filter_params(filters: &[Filter]) -> Vec<(String, String)> {
        filters
            .iter()
            .map(|f| (f.column().to_string(), format!("{}.{}", f.operator(), f.value())))
            .collect()
    }

    fn select_params(query: &SelectQuery) -> Vec<(String, String)> {
        let mut select = query.columns.to_select_param();
        if let Some(Embed::ResourceTags) = query.embed {
            if query.columns == Columns::All {
                select = format!("*,{}", RESOURCE_TAGS_SELECT);
            } else {
                select = format!("{},{}", select, RESOURCE_TAGS_SELECT);
            }
        }

        let mut params = vec![("select".to_string(), select)];
        params.extend(Self::filter_params(&query.filters));
        if !query.order.is_empty() {
            let order = query
                .order
                .iter()
                .map(|o| format!("{}.{}", o.column, if o.ascending { "asc" } else { "desc" }))
                .collect::<Vec<_>>()
                .join(",");
            params.push(("order".to_string(), order));
        }
        if let Some(limit) = query.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }
}

/// Replace the nested join rows with a sorted `tags` array
fn flatten_resource_tags(mut row: Value) -> Value {
    let Some(object) = row.as_object_mut() else {
        return row;
    };
    let mut tags: Vec<Value> = match object.remove("resource_tags") {
        Some(Value::Array(links)) => links
            .into_iter()
            .filter_map(|mut link| link.get_mut("tags").map(Value::take))
            .filter(|tag| tag.is_object())
            .collect(),
        _ => Vec::new(),
    };
    tags.sort_by(|a, b| {
        let order_a = a.get("display_order").and_then(Value::as_i64).unwrap_or(0);
        let order_b = b.get("display_order").and_then(Value::as_i64).unwrap_or(0);
        let name_a = a.get("name").and_then(Value::as_str).unwrap_or_default();
        let name_b = b.get("name").and_then(Value::as_str).unwrap_or_default();
        order_a.cmp(&order_b).then_with(|| name_a.cmp(name_b))
    });
    object.insert("tags".to_string(), Value::Array(tags));
    row
}

#[async_trait]
impl Backend for RestBackend {
    async fn get_user(&self, session: &Session) -> BackendResult<AuthUser> {
        session.token()?;
        let request = self.request(Method::GET, self.auth_url("user"), Some(session));
        let response = self.send("get_user", "auth", request).await?;
        response
            .json::<AuthUser>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    async fn select(&self, session: &Session, query: &SelectQuery) -> BackendResult<Vec<Value>> {
        query.validate()?;
        let request = self
            .request(Method::GET, self.rest_url(&query.table), Some(session))
            .query(&Self::select_params(query));
        let response = self.send("select", &query.table, request).await?;
        let rows = response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;

        debug!(table = %query.table, rows = rows.len(), "Rows selected");
        Ok(match query.embed {
            Some(Embed::ResourceTags) => rows.into_iter().map(flatten_resource_tags).collect(),
            None => rows,
        })
    }

    async fn insert(&self, session: &Session, table: &str, rows: Vec<Value>) -> BackendResult<()> {
        let request = self
            .request(Method::POST, self.rest_url(table), Some(session))
            .header("Prefer", "return=minimal")
            .json(&rows);
        self.send("insert", table, request).await?;
        Ok(())
    }

    async fn update(
        &self,
        session: &Session,
        table: &str,
        values: Value,
        filters: &[Filter],
    ) -> BackendResult<()> {
        let request = self
            .request(Method::PATCH, self.rest_url(table), Some(session))
            .header("Prefer", "return=minimal")
            .query(&Self::filter_params(filters))
            .json(&values);
        self.send("update", table, request).await?;
        Ok(())
    }

    async fn delete(&self, session: &Session, table: &str, filters: &[Filter]) -> BackendResult<()> {
        let request = self
            .request(Method::DELETE, self.rest_url(table), Some(session))
            .query(&Self::filter_params(filters));
        self.send("delete", table, request).await?;
        Ok(())
    }

    async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> BackendResult<AuthSession> {
        let request = self
            .request(Method::POST, self.auth_url("token"), None)
            .query(&[("grant_type", "pkce")])
            .json(&json!({
                "auth_code": code,
                "code_verifier": code_verifier.unwrap_or_default(),
            }));
        let response = self.send("exchange_code", "auth", request).await?;
        response
            .json::<AuthSession>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    async fn sign_out(&self, session: &Session) -> BackendResult<()> {
        session.token()?;
        let request = self.request(Method::POST, self.auth_url("logout"), Some(session));
        self.send("sign_out", "auth", request).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "rest"
    }
}
