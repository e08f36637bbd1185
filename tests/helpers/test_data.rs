//! Test data helpers for creating rows and forms
//!
//! Rows are JSON values shaped like the backend's tables; forms are the
//! urlencoded pairs the dashboard posts.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use SsaDashboard::models::FormData;

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).unwrap()
}

pub fn profile_row(id: Uuid, first_name: &str, role: &str) -> Value {
    json!({
        "id": id,
        "first_name": first_name,
        "preferred_name": null,
        "email": format!("{}@example.com", first_name.to_lowercase()),
        "major": null,
        "graduation_year": null,
        "instrument": null,
        "role": role,
    })
}

pub fn event_row(title: &str, location: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Value {
    json!({
        "id": Uuid::new_v4(),
        "title": title,
        "description": null,
        "location": location,
        "start_time": start,
        "end_time": end,
        "image_url": null,
    })
}

pub fn resource_row(id: Uuid, name: &str, is_pinned: bool) -> Value {
    json!({
        "id": id,
        "name": name,
        "link": format!("https://example.com/{}", name.to_lowercase().replace(' ', "-")),
        "description": null,
        "is_pinned": is_pinned,
        "created_at": "2025-01-15T18:00:00Z",
    })
}

pub fn tag_row(id: Uuid, name: &str, display_order: i32) -> Value {
    json!({ "id": id, "name": name, "display_order": display_order })
}

pub fn link_row(resource_id: Uuid, tag_id: Uuid) -> Value {
    json!({ "resource_id": resource_id, "tag_id": tag_id })
}

pub fn event_form(title: &str, location: &str, start: &str, end: &str) -> FormData {
    FormData::new()
        .with("title", title)
        .with("description", "")
        .with("location", location)
        .with("start_time", start)
        .with("end_time", end)
        .with("image_url", "")
}

pub fn resource_form(name: &str, link: &str) -> FormData {
    FormData::new()
        .with("name", name)
        .with("link", link)
        .with("description", "")
}

pub fn tag_form(name: &str, display_order: &str) -> FormData {
    FormData::new()
        .with("name", name)
        .with("display_order", display_order)
}

pub fn profile_form(preferred_name: &str, major: &str, graduation_year: &str) -> FormData {
    FormData::new()
        .with("preferred_name", preferred_name)
        .with("major", major)
        .with("graduation_year", graduation_year)
        .with("instrument", "")
}
