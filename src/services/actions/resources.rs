//! Resource actions
//!
//! A resource form may carry repeated `tag_ids`. When the field is present
//! the resource's tag links are replaced after the resource write.

use uuid::Uuid;

use super::pipeline::{self, Gate};
use super::{parse_id, required, ActionContext};
use crate::models::{ActionResult, FormData, ResourceInput};
use crate::utils::errors::ActionError;
use crate::utils::helpers::{generate_uuid, non_empty};

pub const RESOURCE_PATHS: &[&str] = &["/admin/resources", "/resources", "/"];

/// Validated resource form
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceForm {
    pub input: ResourceInput,
    /// `None` leaves existing links untouched
    pub tag_ids: Option<Vec<Uuid>>,
}

pub fn parse_resource_form(form: &FormData) -> Result<ResourceForm, ActionError> {
    let (Some(name), Some(link)) = (required(form.get("name")), required(form.get("link"))) else {
        return Err(ActionError::Validation("Name and link are required".to_string()));
    };

    let tag_ids = if form.contains("tag_ids") {
        let ids = form
            .get_all("tag_ids")
            .into_iter()
            .filter(|v| !v.trim().is_empty())
            .map(parse_id)
            .collect::<Result<Vec<_>, _>>()?;
        Some(ids)
    } else {
        None
    };

    Ok(ResourceForm {
        input: ResourceInput {
            name,
            link,
            description: non_empty(form.get("description")),
            is_pinned: form.is_checked("is_pinned"),
        },
        tag_ids,
    })
}

/// Create a new resource
pub async fn create_resource(ctx: &ActionContext, form: &FormData) -> ActionResult {
    let db = &ctx.db;
    pipeline::run(
        ctx,
        "create_resource",
        Gate::Admin,
        |_| parse_resource_form(form),
        |parsed| async move {
            let id = generate_uuid();
            db.resources.create(id, parsed.input).await?;
            match parsed.tag_ids {
                Some(tag_ids) => db.resources.replace_tags(id, &tag_ids).await,
                None => Ok(()),
            }
        },
        RESOURCE_PATHS,
    )
    .await
}

pub async fn update_resource(ctx: &ActionContext, id: &str, form: &FormData) -> ActionResult {
    let db = &ctx.db;
    pipeline::run(
        ctx,
        "update_resource",
        Gate::Admin,
        |_| Ok((parse_id(id)?, parse_resource_form(form)?)),
        |(id, parsed)| async move {
            db.resources.update(id, &parsed.input).await?;
            match parsed.tag_ids {
                Some(tag_ids) => db.resources.replace_tags(id, &tag_ids).await,
                None => Ok(()),
            }
        },
        RESOURCE_PATHS,
    )
    .await
}

pub async fn delete_resource(ctx: &ActionContext, id: &str) -> ActionResult {
    let db = &ctx.db;
    pipeline::run(
        ctx,
        "delete_resource",
        Gate::Admin,
        |_| parse_id(id),
        |id| async move { db.resources.delete(id).await },
        RESOURCE_PATHS,
    )
    .await
}
