//! Form payloads and mutation results

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::errors::ActionError;

/// Result of a mutation action: `{success: true}` or `{success: false, error}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

impl From<Result<(), ActionError>> for ActionResult {
    fn from(result: Result<(), ActionError>) -> Self {
        match result {
            Ok(()) => ActionResult::ok(),
            Err(e) => ActionResult::failed(e.to_string()),
        }
    }
}

/// State returned by the profile settings form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileFormState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ProfileFormState {
    pub fn succeeded(message: impl Into<String>) -> Self {
        Self {
            success: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn add_field_error(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn has_field_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// A submitted `application/x-www-form-urlencoded` body, keeping repeated keys
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData {
    fields: Vec<(String, String)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder used by handlers and tests
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.fields.push((name.to_string(), value.to_string()));
        self
    }

    pub fn set(&mut self, name: &str, value: &str) {
        self.fields.retain(|(key, _)| key != name);
        self.fields.push((name.to_string(), value.to_string()));
    }

    /// First value of a field
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// All values of a repeated field
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(key, _)| key == name)
    }

    /// HTML checkbox semantics: checked iff the value is `on`
    pub fn is_checked(&self, name: &str) -> bool {
        self.get(name) == Some("on")
    }
}

/// Insert payload carrying an id generated by the application
#[derive(Debug, Clone, Serialize)]
pub struct WithId<T> {
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: T,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_result_shapes() {
        let ok = serde_json::to_value(ActionResult::ok()).unwrap();
        assert_eq!(ok, serde_json::json!({"success": true}));

        let failed = serde_json::to_value(ActionResult::failed("Unauthorized")).unwrap();
        assert_eq!(failed, serde_json::json!({"success": false, "error": "Unauthorized"}));
    }

    #[test]
    fn test_form_data_repeated_fields() {
        let form = FormData::new()
            .with("name", "Drive")
            .with("tag_ids", "a")
            .with("tag_ids", "b")
            .with("is_pinned", "on");

        assert_eq!(form.get("name"), Some("Drive"));
        assert_eq!(form.get_all("tag_ids"), vec!["a", "b"]);
        assert!(form.is_checked("is_pinned"));
        assert!(!form.is_checked("missing"));
    }

    #[test]
    fn test_form_data_set_replaces() {
        let mut form = FormData::new().with("image_url", "https://a.example/x.png");
        form.set("image_url", "");
        assert_eq!(form.get_all("image_url"), vec![""]);
    }

    #[test]
    fn test_profile_form_state_field_errors() {
        let mut state = ProfileFormState::default();
        assert!(!state.has_field_errors());
        state.add_field_error("major", "Major is required");
        assert!(state.has_field_errors());
        assert_eq!(state.errors["major"], vec!["Major is required".to_string()]);
    }
}
