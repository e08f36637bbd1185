//! Authentication middleware
//!
//! Extracts the request's session: a bearer token when present, otherwise
//! the session cookie set by the auth callback.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use crate::backend::Session;
use crate::services::AppState;

/// Session of the current request; anonymous when no credentials were sent
#[derive(Debug, Clone, Default)]
pub struct CurrentSession(pub Session);

impl CurrentSession {
    pub fn into_inner(self) -> Session {
        self.0
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Token from the `Authorization` header or the named cookie
pub fn session_from_parts(parts: &Parts, cookie_name: &str) -> Session {
    if let Some(token) = bearer_token(parts) {
        return Session::with_token(token);
    }
    let jar = CookieJar::from_headers(&parts.headers);
    match jar.get(cookie_name) {
        Some(cookie) if !cookie.value().is_empty() => Session::with_token(cookie.value()),
        _ => Session::anonymous(),
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = session_from_parts(parts, &state.settings.auth.session_cookie);
        debug!(authenticated = session.is_authenticated(), "Session extracted");
        Ok(CurrentSession(session))
    }
}
