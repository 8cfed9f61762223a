use std::collections::BTreeMap;

use serde::Serialize;

/// Per-field validation messages, keyed by the request field name.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub(crate) struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub(crate) fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    pub(crate) fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// First message overall, used as the human-readable `detail`.
    pub(crate) fn first_message(&self) -> Option<&str> {
        self.0.values().flat_map(|messages| messages.iter()).map(String::as_str).next()
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut collected = Self::default();
        for (field, field_errors) in errors.field_errors() {
            let field = field.to_string();
            for error in field_errors.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| format!("The {field} field is invalid ({}).", error.code));
                collected.add(&field, message);
            }
        }
        collected
    }
}

/// Trims surrounding whitespace in place; request strings are compared trimmed.
pub(crate) fn trim_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

/// Trims an optional string, collapsing blank values to `None`.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}
