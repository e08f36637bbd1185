//! Tag actions

use super::pipeline::{self, Gate};
use super::{parse_id, required, ActionContext};
use crate::models::{ActionResult, FormData, TagInput};
use crate::utils::errors::ActionError;
use crate::utils::helpers::generate_uuid;

pub const TAG_PATHS: &[&str] = &["/admin/tags", "/admin/resources", "/resources"];

/// Validate a tag form; a missing or non-numeric display order is 0
pub fn parse_tag_form(form: &FormData) -> Result<TagInput, ActionError> {
    let name = required(form.get("name"))
        .ok_or_else(|| ActionError::Validation("Tag name is required".to_string()))?;
    let display_order = form
        .get("display_order")
        .and_then(|v| v.trim().parse::<i32>().ok())
        .unwrap_or(0);

    Ok(TagInput {
        name,
        display_order,
    })
}

pub async fn create_tag(ctx: &ActionContext, form: &FormData) -> ActionResult {
    let db = &ctx.db;
    pipeline::run(
        ctx,
        "create_tag",
        Gate::Admin,
        |_| parse_tag_form(form),
        |input| async move { db.tags.create(generate_uuid(), input).await },
        TAG_PATHS,
    )
    .await
}

pub async fn update_tag(ctx: &ActionContext, id: &str, form: &FormData) -> ActionResult {
    let db = &ctx.db;
    pipeline::run(
        ctx,
        "update_tag",
        Gate::Admin,
        |_| Ok((parse_id(id)?, parse_tag_form(form)?)),
        |(id, input)| async move { db.tags.update(id, &input).await },
        TAG_PATHS,
    )
    .await
}

pub async fn delete_tag(ctx: &ActionContext, id: &str) -> ActionResult {
    let db = &ctx.db;
    pipeline::run(
        ctx,
        "delete_tag",
        Gate::Admin,
        |_| parse_id(id),
        |id| async move { db.tags.delete(id).await },
        TAG_PATHS,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tag_form() {
        let form = FormData::new().with("name", " Scores ").with("display_order", "3");
        assert_eq!(
            parse_tag_form(&form),
            Ok(TagInput {
                name: "Scores".to_string(),
                display_order: 3
            })
        );
    }

    #[test]
    fn test_display_order_defaults_to_zero() {
        let form = FormData::new().with("name", "Audio").with("display_order", "first");
        assert_eq!(parse_tag_form(&form).map(|t| t.display_order), Ok(0));
        let form = FormData::new().with("name", "Audio");
        assert_eq!(parse_tag_form(&form).map(|t| t.display_order), Ok(0));
    }

    #[test]
    fn test_name_required() {
        let form = FormData::new().with("name", "");
        assert_eq!(
            parse_tag_form(&form),
            Err(ActionError::Validation("Tag name is required".to_string()))
        );
    }
}
