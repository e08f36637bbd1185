//! Page handlers
//!
//! GET routes returning page view models. Shared list payloads are read
//! through the page cache under the path they are shown on, so the paths a
//! mutation invalidates are exactly the keys it drops.

use axum::extract::{Query, State};
use axum::response::Redirect;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::database::DatabaseService;
use crate::middleware::CurrentSession;
use crate::models::{Event, Profile, Resource, ResourceWithTags, Tag};
use crate::services::{cached, queries, AppState, AuthContext};
use crate::views::pages::{
    AdminEventsPage, AdminIndexPage, AdminResourcesPage, AdminTagsPage, AdminUsersPage, EventsPage,
    HomePage, ResourcesPage, SettingsPage,
};
use crate::views::{sidebar, Sidebar, TagSelection};

pub type PageResult<T> = Result<Json<T>, Redirect>;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/events", get(events))
        .route("/resources", get(resources))
        .route("/settings", get(settings))
        .route("/admin", get(admin_index))
        .route("/admin/events", get(admin_events))
        .route("/admin/resources", get(admin_resources))
        .route("/admin/users", get(admin_users))
        .route("/admin/tags", get(admin_tags))
}

/// Signed-in user of a page request
struct Viewer {
    db: DatabaseService,
    context: AuthContext,
    profile: Option<Profile>,
    sidebar: Sidebar,
}

async fn viewer(state: &AppState, session: CurrentSession) -> Result<Viewer, Redirect> {
    let session = session.into_inner();
    if !session.is_authenticated() {
        return Err(Redirect::to("/auth"));
    }

    let db = state.database(session);
    let context = match state.auth_service.get_auth_context(&db).await {
        Ok(context) => context,
        Err(e) => {
            debug!(error = %e, "Session rejected, redirecting to sign-in");
            return Err(Redirect::to("/auth"));
        }
    };

    let profile = queries::get_current_profile(&db).await;
    let display_name = profile
        .as_ref()
        .and_then(|p| p.display_name())
        .map(str::to_string);
    let sidebar = sidebar(state.presenter.app_name(), context.is_admin(), display_name);

    Ok(Viewer {
        db,
        context,
        profile,
        sidebar,
    })
}

async fn admin_viewer(state: &AppState, session: CurrentSession) -> Result<Viewer, Redirect> {
    let viewer = viewer(state, session).await?;
    if !viewer.context.is_admin() {
        debug!(user_id = %viewer.context.user_id(), "Non-admin redirected from admin page");
        return Err(Redirect::to("/"));
    }
    Ok(viewer)
}

#[derive(Debug, Serialize, Deserialize)]
struct HomeData {
    events: Vec<Event>,
    pinned: Vec<Resource>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TaggedResources {
    tags: Vec<Tag>,
    resources: Vec<ResourceWithTags>,
}

async fn tagged_resources(state: &AppState, db: &DatabaseService, path: &str) -> TaggedResources {
    cached(&*state.cache, path, || async move {
        Some(TaggedResources {
            tags: queries::get_tags(db).await?,
            resources: queries::get_resources_with_tags(db).await?,
        })
    })
    .await
    .unwrap_or(TaggedResources {
        tags: Vec::new(),
        resources: Vec::new(),
    })
}

async fn home(State(state): State<AppState>, session: CurrentSession) -> PageResult<HomePage> {
    let viewer = viewer(&state, session).await?;
    let db = &viewer.db;

    let first_name = queries::get_first_name(db).await;
    let data = cached(&*state.cache, "/", || async move {
        Some(HomeData {
            events: queries::get_upcoming_events(db).await?,
            pinned: queries::get_pinned_resources(db).await?,
        })
    })
    .await
    .unwrap_or(HomeData {
        events: Vec::new(),
        pinned: Vec::new(),
    });

    Ok(Json(state.presenter.home(
        viewer.sidebar,
        first_name.as_deref(),
        &data.events,
        &data.pinned,
    )))
}

async fn events(State(state): State<AppState>, session: CurrentSession) -> PageResult<EventsPage> {
    let viewer = viewer(&state, session).await?;
    let events = cached(&*state.cache, "/events", || queries::get_upcoming_events(&viewer.db))
        .await
        .unwrap_or_default();
    Ok(Json(state.presenter.events(viewer.sidebar, &events)))
}

#[derive(Debug, Deserialize)]
pub struct ResourcesQuery {
    pub tag: Option<String>,
}

/// The tag filter runs over the cached list; switching tabs issues no query
async fn resources(
    State(state): State<AppState>,
    session: CurrentSession,
    Query(query): Query<ResourcesQuery>,
) -> PageResult<ResourcesPage> {
    let viewer = viewer(&state, session).await?;
    let data = tagged_resources(&state, &viewer.db, "/resources").await;
    let selection = TagSelection::from_query(query.tag.as_deref());
    Ok(Json(state.presenter.resources(
        viewer.sidebar,
        &data.tags,
        &data.resources,
        selection,
    )))
}

async fn settings(State(state): State<AppState>, session: CurrentSession) -> PageResult<SettingsPage> {
    let viewer = viewer(&state, session).await?;
    Ok(Json(state.presenter.settings(viewer.sidebar, viewer.profile.as_ref())))
}

async fn admin_index(State(state): State<AppState>, session: CurrentSession) -> PageResult<AdminIndexPage> {
    let viewer = admin_viewer(&state, session).await?;
    Ok(Json(state.presenter.admin_index(viewer.sidebar)))
}

async fn admin_events(State(state): State<AppState>, session: CurrentSession) -> PageResult<AdminEventsPage> {
    let viewer = admin_viewer(&state, session).await?;
    let events = cached(&*state.cache, "/admin/events", || queries::get_all_events(&viewer.db))
        .await
        .unwrap_or_default();
    Ok(Json(state.presenter.admin_events(viewer.sidebar, &events)))
}

async fn admin_resources(
    State(state): State<AppState>,
    session: CurrentSession,
) -> PageResult<AdminResourcesPage> {
    let viewer = admin_viewer(&state, session).await?;
    let data = tagged_resources(&state, &viewer.db, "/admin/resources").await;
    Ok(Json(state.presenter.admin_resources(viewer.sidebar, &data.resources, &data.tags)))
}

async fn admin_users(State(state): State<AppState>, session: CurrentSession) -> PageResult<AdminUsersPage> {
    let viewer = admin_viewer(&state, session).await?;
    let profiles = cached(&*state.cache, "/admin/users", || queries::get_all_profiles(&viewer.db))
        .await
        .unwrap_or_default();
    Ok(Json(state.presenter.admin_users(
        viewer.sidebar,
        &profiles,
        viewer.context.user_id(),
    )))
}

async fn admin_tags(State(state): State<AppState>, session: CurrentSession) -> PageResult<AdminTagsPage> {
    let viewer = admin_viewer(&state, session).await?;
    let tags = cached(&*state.cache, "/admin/tags", || queries::get_tags(&viewer.db))
        .await
        .unwrap_or_default();
    Ok(Json(state.presenter.admin_tags(viewer.sidebar, &tags)))
}
