//! Event actions

use chrono::FixedOffset;

use super::pipeline::{self, Gate};
use super::{parse_id, required, ActionContext};
use crate::models::{ActionResult, EventInput, FormData};
use crate::utils::errors::ActionError;
use crate::utils::helpers::{generate_uuid, non_empty};
use crate::views::format::parse_form_datetime;

pub const EVENT_PATHS: &[&str] = &["/admin/events", "/events", "/"];

const REQUIRED_MESSAGE: &str = "Title, location, start time, and end time are required";

/// Validate an event form
pub fn parse_event_form(form: &FormData, offset: FixedOffset) -> Result<EventInput, ActionError> {
    let title = required(form.get("title"));
    let location = required(form.get("location"));
    let start = required(form.get("start_time"));
    let end = required(form.get("end_time"));

    let (Some(title), Some(location), Some(start), Some(end)) = (title, location, start, end) else {
        return Err(ActionError::Validation(REQUIRED_MESSAGE.to_string()));
    };

    let start_time = parse_form_datetime(&start, offset)
        .ok_or_else(|| ActionError::Validation("Invalid start time".to_string()))?;
    let end_time = parse_form_datetime(&end, offset)
        .ok_or_else(|| ActionError::Validation("Invalid end time".to_string()))?;

    Ok(EventInput {
        title,
        description: non_empty(form.get("description")),
        location,
        start_time,
        end_time,
        image_url: non_empty(form.get("image_url")),
    })
}

/// Create a new event
pub async fn create_event(ctx: &ActionContext, form: &FormData) -> ActionResult {
    let db = &ctx.db;
    pipeline::run(
        ctx,
        "create_event",
        Gate::Admin,
        |_| parse_event_form(form, ctx.utc_offset),
        |input| async move { db.events.create(generate_uuid(), input).await },
        EVENT_PATHS,
    )
    .await
}

pub async fn update_event(ctx: &ActionContext, id: &str, form: &FormData) -> ActionResult {
    let db = &ctx.db;
    pipeline::run(
        ctx,
        "update_event",
        Gate::Admin,
        |_| Ok((parse_id(id)?, parse_event_form(form, ctx.utc_offset)?)),
        |(id, input)| async move { db.events.update(id, &input).await },
        EVENT_PATHS,
    )
    .await
}

pub async fn delete_event(ctx: &ActionContext, id: &str) -> ActionResult {
    let db = &ctx.db;
    pipeline::run(
        ctx,
        "delete_event",
        Gate::Admin,
        |_| parse_id(id),
        |id| async move { db.events.delete(id).await },
        EVENT_PATHS,
    )
    .await
}
