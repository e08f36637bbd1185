//! The five-step action pattern
//!
//! authorize -> validate -> write -> invalidate -> return. A failure at any
//! step ends the action with `{success: false, error}`; nothing after it runs.

use std::future::Future;

use super::ActionContext;
use crate::models::ActionResult;
use crate::services::auth::AuthContext;
use crate::services::cache::revalidate_paths;
use crate::utils::errors::{ActionError, BackendResult};
use crate::utils::logging::{log_action_result, log_admin_action, log_backend_error};

/// Who may run an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Admin,
    /// Any signed-in user, acting on their own data
    Owner,
}

/// Run an action, keeping the typed error
pub async fn execute<T, V, W, Fut>(
    ctx: &ActionContext,
    action: &str,
    gate: Gate,
    validate: V,
    write: W,
    paths: &[&str],
) -> Result<(), ActionError>
where
    V: FnOnce(&AuthContext) -> Result<T, ActionError>,
    W: FnOnce(T) -> Fut,
    Fut: Future<Output = BackendResult<()>>,
{
    let auth = match gate {
        Gate::Admin => ctx.auth.require_admin(&ctx.db).await?,
        Gate::Owner => ctx.auth.require_member(&ctx.db).await?,
    };

    let input = validate(&auth)?;

    if let Err(e) = write(input).await {
        log_backend_error(action, &e.to_string());
        return Err(e.into());
    }

    revalidate_paths(ctx.cache.as_ref(), paths).await;

    if gate == Gate::Admin {
        log_admin_action(&auth.user_id().to_string(), action, None);
    }
    Ok(())
}

/// Run an action and collapse the outcome into an `ActionResult`
pub async fn run<T, V, W, Fut>(
    ctx: &ActionContext,
    action: &str,
    gate: Gate,
    validate: V,
    write: W,
    paths: &[&str],
) -> ActionResult
where
    V: FnOnce(&AuthContext) -> Result<T, ActionError>,
    W: FnOnce(T) -> Fut,
    Fut: Future<Output = BackendResult<()>>,
{
    let outcome = execute(ctx, action, gate, validate, write, paths).await;
    match &outcome {
        Ok(()) => log_action_result(action, true, None),
        Err(e) => log_action_result(action, false, Some(&e.to_string())),
    }
    ActionResult::from(outcome)
}
