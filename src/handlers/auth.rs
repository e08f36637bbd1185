//! Sign-in hand-off to the hosted auth provider
//!
//! The provider owns the login itself; these routes start the PKCE flow,
//! turn the returned code into a session cookie and sign out.

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::Settings;
use crate::middleware::CurrentSession;
use crate::services::{AppState, AuthService};
use crate::utils::helpers::sanitize_next_path;

pub const AUTH_ERROR_PATH: &str = "/auth/auth-code-error";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth", get(sign_in))
        .route("/auth/callback", get(callback))
        .route(AUTH_ERROR_PATH, get(auth_code_error))
        .route("/auth/logout", post(logout))
}

#[derive(Debug, Clone, Serialize)]
pub struct SignInPage {
    pub title: String,
    pub sign_in_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthErrorPage {
    pub title: &'static str,
    pub message: &'static str,
    pub retry: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub next: Option<String>,
}

fn auth_cookie(settings: &Settings, name: &str, value: String) -> Cookie<'static> {
    Cookie::build((name.to_string(), value))
        .path("/")
        .http_only(true)
        .secure(settings.auth.cookie_secure)
        .same_site(SameSite::Lax)
        .build()
}

fn removal_cookie(name: &str) -> Cookie<'static> {
    Cookie::build((name.to_string(), "")).path("/").build()
}

/// Where the callback sends the browser after a successful exchange
///
/// Behind a proxy the forwarded host wins, except in development.
pub fn redirect_origin(settings: &Settings, headers: &HeaderMap) -> String {
    let site_url = settings.server.site_url.trim_end_matches('/').to_string();
    if settings.server.development {
        return site_url;
    }
    match headers
        .get("x-forwarded-host")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
    {
        Some(host) => format!("https://{}", host),
        None => site_url,
    }
}

async fn sign_in(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<SignInPage>) {
    let verifier = AuthService::new_code_verifier();
    let page = SignInPage {
        title: format!("Sign in to {}", state.presenter.app_name()),
        sign_in_url: state.auth_service.authorize_url(&verifier),
    };
    let jar = jar.add(auth_cookie(&state.settings, &state.settings.auth.code_verifier_cookie, verifier));
    (jar, Json(page))
}

async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Response {
    let next = sanitize_next_path(query.next.as_deref());
    let Some(code) = query.code.filter(|c| !c.is_empty()) else {
        warn!("Auth callback without code");
        return Redirect::to(AUTH_ERROR_PATH).into_response();
    };

    let auth = &state.settings.auth;
    let verifier = jar.get(&auth.code_verifier_cookie).map(|c| c.value().to_string());

    match state
        .backend
        .exchange_code_for_session(&code, verifier.as_deref())
        .await
    {
        Ok(session) => {
            info!(next = %next, "Session established");
            let jar = jar
                .remove(removal_cookie(&auth.code_verifier_cookie))
                .add(auth_cookie(&state.settings, &auth.session_cookie, session.access_token));
            let target = format!("{}{}", redirect_origin(&state.settings, &headers), next);
            (jar, Redirect::to(&target)).into_response()
        }
        Err(e) => {
            warn!(error = %e, "Code exchange failed");
            Redirect::to(AUTH_ERROR_PATH).into_response()
        }
    }
}

async fn auth_code_error() -> Json<AuthErrorPage> {
    Json(AuthErrorPage {
        title: "Authentication error",
        message: "We couldn't sign you in. The link may have expired.",
        retry: "/auth",
    })
}

async fn logout(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    if session.is_authenticated() {
        if let Err(e) = state.backend.sign_out(&session).await {
            warn!(error = %e, "Backend sign-out failed");
        }
    }
    let jar = jar.remove(removal_cookie(&state.settings.auth.session_cookie));
    (jar, Redirect::to("/auth"))
}
