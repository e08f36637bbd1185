//! Profile settings action
//!
//! Unlike the admin actions this one reports per-field errors back to the
//! settings form.

use super::pipeline::{self, Gate};
use super::{required, ActionContext};
use crate::models::{FormData, ProfileFormState, UpdateProfileRequest};
use crate::utils::errors::ActionError;

pub const PROFILE_PATHS: &[&str] = &["/settings", "/", "/admin/users"];

pub const SUCCESS_MESSAGE: &str = "Profile updated successfully";

pub const MIN_GRADUATION_YEAR: i32 = 2000;
pub const MAX_GRADUATION_YEAR: i32 = 2100;

/// Validate the settings form, collecting every field error
pub fn parse_profile_form(form: &FormData) -> Result<UpdateProfileRequest, ProfileFormState> {
    let mut state = ProfileFormState::default();

    let preferred_name = required(form.get("preferred_name"));
    if preferred_name.is_none() {
        state.add_field_error("preferred_name", "Preferred name is required");
    }

    let major = required(form.get("major"));
    if major.is_none() {
        state.add_field_error("major", "Major is required");
    }

    let graduation_year = form
        .get("graduation_year")
        .and_then(|v| v.trim().parse::<i32>().ok())
        .filter(|year| (MIN_GRADUATION_YEAR..=MAX_GRADUATION_YEAR).contains(year));
    if graduation_year.is_none() {
        state.add_field_error(
            "graduation_year",
            format!(
                "Graduation year must be between {} and {}",
                MIN_GRADUATION_YEAR, MAX_GRADUATION_YEAR
            ),
        );
    }

    match (preferred_name, major, graduation_year) {
        (Some(preferred_name), Some(major), Some(graduation_year)) => Ok(UpdateProfileRequest {
            preferred_name,
            major,
            graduation_year,
        }),
        _ => Err(state),
    }
}

/// Update the session user's own profile
pub async fn update_profile(ctx: &ActionContext, form: &FormData) -> ProfileFormState {
    let db = &ctx.db;
    let mut field_errors = None;

    let outcome = pipeline::execute(
        ctx,
        "update_profile",
        Gate::Owner,
        |auth| match parse_profile_form(form) {
            Ok(request) => Ok((auth.user_id(), request)),
            Err(state) => {
                field_errors = Some(state);
                Err(ActionError::Validation("Invalid profile".to_string()))
            }
        },
        |(id, request)| async move { db.profiles.update_details(id, &request).await },
        PROFILE_PATHS,
    )
    .await;

    match (outcome, field_errors) {
        (Ok(()), _) => ProfileFormState::succeeded(SUCCESS_MESSAGE),
        (Err(_), Some(state)) => state,
        (Err(e), None) => ProfileFormState::failed(e.to_string()),
    }
}
