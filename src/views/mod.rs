//! Presentation module
//!
//! View models for the dashboard pages: date formatting, the resource tag
//! filter, dialog state, sidebar navigation and the page documents.

pub mod dialog;
pub mod filter;
pub mod format;
pub mod navigation;
pub mod pages;

pub use dialog::{ConfirmDialog, DialogMode, FormDialog};
pub use filter::{filter_by_tag, TagSelection};
pub use navigation::{sidebar, Sidebar};
pub use pages::Presenter;
