//! Form dialog state
//!
//! A dialog collects field values, submits them to an action and reacts to
//! the result: close on success, show the error otherwise. Create dialogs
//! forget their values when they close; edit dialogs keep the prefill.

use chrono::FixedOffset;
use serde::Serialize;
use uuid::Uuid;

use super::format::format_datetime_local;
use crate::models::{ActionResult, Event, FormData, ResourceWithTags, Tag};

pub const DEFAULT_ERROR: &str = "An error occurred";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    Text,
    Textarea,
    Url,
    Number,
    DatetimeLocal,
    Checkbox,
    /// Multi-select of tag ids, submitted as repeated values
    TagPicker,
    /// Filled by the upload widget
    Upload,
}

/// One input of a dialog form; `required` and `input_type` are the only
/// client-side validation hints
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: &'static str,
    pub label: &'static str,
    pub input_type: InputType,
    pub required: bool,
    pub values: Vec<String>,
}

impl Field {
    fn new(name: &'static str, label: &'static str, input_type: InputType, required: bool) -> Self {
        Self {
            name,
            label,
            input_type,
            required,
            values: Vec::new(),
        }
    }

    fn with_value(mut self, value: impl Into<String>) -> Self {
        self.values = vec![value.into()];
        self
    }

    pub fn value(&self) -> &str {
        self.values.first().map(String::as_str).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "id")]
pub enum DialogMode {
    Create,
    Edit(Uuid),
}

/// Create or edit dialog for one entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormDialog {
    pub title: String,
    pub description: String,
    pub mode: DialogMode,
    /// Form post target
    pub action: String,
    pub open: bool,
    pub pending: bool,
    pub error: Option<String>,
    pub fields: Vec<Field>,
    #[serde(skip)]
    initial: Vec<Field>,
}

impl FormDialog {
    fn new(title: String, description: &str, mode: DialogMode, action: String, fields: Vec<Field>) -> Self {
        Self {
            title,
            description: description.to_string(),
            mode,
            action,
            open: false,
            pending: false,
            error: None,
            initial: fields.clone(),
            fields,
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, DialogMode::Edit(_))
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
        if !self.is_editing() {
            self.fields = self.initial.clone();
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn set_field(&mut self, name: &str, value: &str) {
        if let Some(field) = self.fields.iter_mut().find(|f| f.name == name) {
            field.values = vec![value.to_string()];
        }
    }

    /// Start a submission; returns the form body to post
    pub fn submit(&mut self) -> FormData {
        self.error = None;
        self.pending = true;
        self.fields
            .iter()
            .flat_map(|field| {
                field
                    .values
                    .iter()
                    .map(move |value| (field.name, value.as_str()))
            })
            .fold(FormData::new(), |form, (name, value)| form.with(name, value))
    }

    /// Apply the action's result to the dialog
    pub fn finish(&mut self, result: &ActionResult) {
        self.pending = false;
        if result.success {
            self.close();
        } else {
            self.error = Some(
                result
                    .error
                    .clone()
                    .unwrap_or_else(|| DEFAULT_ERROR.to_string()),
            );
        }
    }

    /// The upload widget finished; its URL becomes the image field
    pub fn upload_complete(&mut self, url: &str) {
        self.set_field("image_url", url);
    }

    pub fn upload_failed(&mut self, message: &str) {
        self.error = Some(format!("Upload failed: {}", message));
    }

    pub fn submit_label(&self) -> &'static str {
        match (self.pending, self.is_editing()) {
            (true, _) => "Saving...",
            (false, true) => "Save Changes",
            (false, false) => "Create",
        }
    }
}

/// Event dialog, prefilled from `event` when editing
pub fn event_dialog(event: Option<&Event>, offset: FixedOffset) -> FormDialog {
    let mut title = Field::new("title", "Title", InputType::Text, true);
    let mut description = Field::new("description", "Description", InputType::Textarea, false);
    let mut location = Field::new("location", "Location", InputType::Text, true);
    let mut start_time = Field::new("start_time", "Start Time", InputType::DatetimeLocal, true);
    let mut end_time = Field::new("end_time", "End Time", InputType::DatetimeLocal, true);
    let mut image_url = Field::new("image_url", "Event Image", InputType::Upload, false);

    match event {
        Some(event) => {
            title = title.with_value(&event.title);
            description = description.with_value(event.description.clone().unwrap_or_default());
            location = location.with_value(&event.location);
            start_time = start_time.with_value(format_datetime_local(event.start_time, offset));
            end_time = end_time.with_value(format_datetime_local(event.end_time, offset));
            image_url = image_url.with_value(event.image_url.clone().unwrap_or_default());

            FormDialog::new(
                "Edit Event".to_string(),
                "Update the event details below.",
                DialogMode::Edit(event.id),
                format!("/admin/events/{}", event.id),
                vec![title, description, location, start_time, end_time, image_url],
            )
        }
        None => FormDialog::new(
            "Add Event".to_string(),
            "Add a new event for SSA members.",
            DialogMode::Create,
            "/admin/events".to_string(),
            vec![title, description, location, start_time, end_time, image_url],
        ),
    }
}

/// Resource dialog with a tag picker over `tags`
pub fn resource_dialog(resource: Option<&ResourceWithTags>, tags: &[Tag]) -> FormDialog {
    let name = Field::new("name", "Name", InputType::Text, true);
    let link = Field::new("link", "Link", InputType::Url, true);
    let description = Field::new("description", "Description", InputType::Textarea, false);
    let is_pinned = Field::new("is_pinned", "Pin to home page", InputType::Checkbox, false);
    let mut tag_ids = Field::new("tag_ids", "Tags", InputType::TagPicker, false);

    match resource {
        Some(item) => {
            let r = &item.resource;
            tag_ids.values = item
                .tags
                .iter()
                .filter(|t| tags.iter().any(|known| known.id == t.id))
                .map(|t| t.id.to_string())
                .collect();
            let mut fields = vec![
                name.with_value(&r.name),
                link.with_value(&r.link),
                description.with_value(r.description.clone().unwrap_or_default()),
                is_pinned,
                tag_ids,
            ];
            if r.is_pinned {
                fields[3].values = vec!["on".to_string()];
            }
            FormDialog::new(
                "Edit Resource".to_string(),
                "Update the resource details below.",
                DialogMode::Edit(r.id),
                format!("/admin/resources/{}", r.id),
                fields,
            )
        }
        None => FormDialog::new(
            "Add Resource".to_string(),
            "Add a new resource to share with members.",
            DialogMode::Create,
            "/admin/resources".to_string(),
            vec![name, link, description, is_pinned, tag_ids],
        ),
    }
}

pub fn tag_dialog(tag: Option<&Tag>) -> FormDialog {
    let name = Field::new("name", "Name", InputType::Text, true);
    let display_order = Field::new("display_order", "Display Order", InputType::Number, false);

    match tag {
        Some(tag) => FormDialog::new(
            "Edit Tag".to_string(),
            "Update the tag details below.",
            DialogMode::Edit(tag.id),
            format!("/admin/tags/{}", tag.id),
            vec![
                name.with_value(&tag.name),
                display_order.with_value(tag.display_order.to_string()),
            ],
        ),
        None => FormDialog::new(
            "Add Tag".to_string(),
            "Add a new tag for organizing resources.",
            DialogMode::Create,
            "/admin/tags".to_string(),
            vec![name, display_order.with_value("0")],
        ),
    }
}

/// Delete confirmation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfirmDialog {
    pub title: String,
    pub description: String,
    pub action: String,
    pub open: bool,
    pub pending: bool,
    pub error: Option<String>,
}

impl ConfirmDialog {
    pub fn delete(entity: &str, name: &str, action: String) -> Self {
        Self {
            title: format!("Delete {}", entity),
            description: format!(
                "Are you sure you want to delete \"{}\"? This action cannot be undone.",
                name
            ),
            action,
            open: false,
            pending: false,
            error: None,
        }
    }

    pub fn confirm(&mut self) {
        self.error = None;
        self.pending = true;
    }

    pub fn finish(&mut self, result: &ActionResult) {
        self.pending = false;
        if result.success {
            self.open = false;
        } else {
            self.error = Some(
                result
                    .error
                    .clone()
                    .unwrap_or_else(|| DEFAULT_ERROR.to_string()),
            );
        }
    }
}
