//! User management actions (admin only)

use std::str::FromStr;

use super::pipeline::{self, Gate};
use super::{parse_id, ActionContext};
use crate::models::{ActionResult, FormData, Role};
use crate::utils::errors::ActionError;

pub const ROLE_PATHS: &[&str] = &["/admin/users", "/"];
pub const DELETE_USER_PATHS: &[&str] = &["/admin/users"];

/// Change a user's role; admins cannot change their own
pub async fn update_user_role(ctx: &ActionContext, id: &str, form: &FormData) -> ActionResult {
    let db = &ctx.db;
    pipeline::run(
        ctx,
        "update_user_role",
        Gate::Admin,
        |auth| {
            let id = parse_id(id)?;
            if id == auth.user_id() {
                return Err(ActionError::Validation(
                    "You cannot change your own role".to_string(),
                ));
            }
            let role = form
                .get("role")
                .and_then(|value| Role::from_str(value).ok())
                .ok_or_else(|| ActionError::Validation("Invalid role".to_string()))?;
            Ok((id, role))
        },
        |(id, role)| async move { db.profiles.update_role(id, role).await },
        ROLE_PATHS,
    )
    .await
}

/// Delete a user's profile row; admins cannot delete their own
pub async fn delete_user_profile(ctx: &ActionContext, id: &str) -> ActionResult {
    let db = &ctx.db;
    pipeline::run(
        ctx,
        "delete_user_profile",
        Gate::Admin,
        |auth| {
            let id = parse_id(id)?;
            if id == auth.user_id() {
                return Err(ActionError::Validation(
                    "You cannot delete your own account".to_string(),
                ));
            }
            Ok(id)
        },
        |id| async move { db.profiles.delete(id).await },
        DELETE_USER_PATHS,
    )
    .await
}
