//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod action;
pub mod event;
pub mod profile;
pub mod resource;
pub mod tag;

// Re-export commonly used models
pub use action::{ActionResult, FormData, ProfileFormState, WithId};
pub use event::{Event, EventInput};
pub use profile::{Profile, Role, UpdateProfileRequest, UpdateRoleRequest};
pub use resource::{Resource, ResourceInput, ResourceTagLink, ResourceWithTags};
pub use tag::{Tag, TagInput};
