//! Form action handlers
//!
//! POST routes taking the dashboard's urlencoded forms. Every handler
//! answers 200 with the action's result shape, failures included.

use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Form, Json, Router};

use crate::middleware::CurrentSession;
use crate::models::{ActionResult, FormData, ProfileFormState};
use crate::services::actions;
use crate::services::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/events", post(create_event))
        .route("/admin/events/:id", post(update_event))
        .route("/admin/events/:id/delete", post(delete_event))
        .route("/admin/resources", post(create_resource))
        .route("/admin/resources/:id", post(update_resource))
        .route("/admin/resources/:id/delete", post(delete_resource))
        .route("/admin/tags", post(create_tag))
        .route("/admin/tags/:id", post(update_tag))
        .route("/admin/tags/:id/delete", post(delete_tag))
        .route("/admin/users/:id/role", post(update_user_role))
        .route("/admin/users/:id/delete", post(delete_user_profile))
        .route("/settings/profile", post(update_profile))
}

async fn create_event(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Form(form): Form<FormData>,
) -> Json<ActionResult> {
    Json(actions::create_event(&state.action_context(session), &form).await)
}

async fn update_event(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<String>,
    Form(form): Form<FormData>,
) -> Json<ActionResult> {
    Json(actions::update_event(&state.action_context(session), &id, &form).await)
}

async fn delete_event(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<String>,
) -> Json<ActionResult> {
    Json(actions::delete_event(&state.action_context(session), &id).await)
}

async fn create_resource(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Form(form): Form<FormData>,
) -> Json<ActionResult> {
    Json(actions::create_resource(&state.action_context(session), &form).await)
}

async fn update_resource(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<String>,
    Form(form): Form<FormData>,
) -> Json<ActionResult> {
    Json(actions::update_resource(&state.action_context(session), &id, &form).await)
}

async fn delete_resource(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<String>,
) -> Json<ActionResult> {
    Json(actions::delete_resource(&state.action_context(session), &id).await)
}

async fn create_tag(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Form(form): Form<FormData>,
) -> Json<ActionResult> {
    Json(actions::create_tag(&state.action_context(session), &form).await)
}

async fn update_tag(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<String>,
    Form(form): Form<FormData>,
) -> Json<ActionResult> {
    Json(actions::update_tag(&state.action_context(session), &id, &form).await)
}

async fn delete_tag(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<String>,
) -> Json<ActionResult> {
    Json(actions::delete_tag(&state.action_context(session), &id).await)
}

async fn update_user_role(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<String>,
    Form(form): Form<FormData>,
) -> Json<ActionResult> {
    Json(actions::update_user_role(&state.action_context(session), &id, &form).await)
}

async fn delete_user_profile(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<String>,
) -> Json<ActionResult> {
    Json(actions::delete_user_profile(&state.action_context(session), &id).await)
}

async fn update_profile(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Form(form): Form<FormData>,
) -> Json<ProfileFormState> {
    Json(actions::update_profile(&state.action_context(session), &form).await)
}
