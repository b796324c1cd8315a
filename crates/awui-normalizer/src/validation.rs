// SPDX-License-Identifier: MIT OR Apache-2.0
//! Validation error bags and the form-field contract used to highlight them.

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Header line of every validation message.
pub const VALIDATION_HEADER: &str = "Please correct the following errors:";

/// Prefix of each bullet line.
pub const BULLET: &str = "• ";

/// Marker class of an invalid field.
pub const INVALID_CLASS: &str = "is-invalid";

/// Class of the feedback element placed next to an invalid field.
pub const FEEDBACK_CLASS: &str = "invalid-feedback";

// ---------------------------------------------------------------------------
// FieldErrors
// ---------------------------------------------------------------------------

/// One or several error strings for a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldErrors {
    /// A single message.
    One(String),
    /// Several messages, in order.
    Many(Vec<String>),
}

impl FieldErrors {
    /// All messages in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            Self::One(s) => std::slice::from_ref(s),
            Self::Many(v) => v,
        };
        slice.iter().map(String::as_str)
    }

    /// The first message, if any.
    pub fn first(&self) -> Option<&str> {
        self.iter().next()
    }
}

impl From<&str> for FieldErrors {
    fn from(s: &str) -> Self {
        Self::One(s.to_string())
    }
}

impl From<String> for FieldErrors {
    fn from(s: String) -> Self {
        Self::One(s)
    }
}

impl From<Vec<String>> for FieldErrors {
    fn from(v: Vec<String>) -> Self {
        Self::Many(v)
    }
}

impl From<Vec<&str>> for FieldErrors {
    fn from(v: Vec<&str>) -> Self {
        Self::Many(v.into_iter().map(String::from).collect())
    }
}

impl<const N: usize> From<[&str; N]> for FieldErrors {
    fn from(v: [&str; N]) -> Self {
        Self::Many(v.into_iter().map(String::from).collect())
    }
}

// ---------------------------------------------------------------------------
// ValidationErrors
// ---------------------------------------------------------------------------

/// A validation payload: either one free-standing message or per-field
/// errors in the order the fields were reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrors {
    /// A single message not tied to a field.
    Message(String),
    /// Field name to errors, insertion ordered.
    Fields(Vec<(String, FieldErrors)>),
}

impl Default for ValidationErrors {
    fn default() -> Self {
        Self::Fields(Vec::new())
    }
}

impl ValidationErrors {
    /// An empty field bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// A single message.
    pub fn message(text: impl Into<String>) -> Self {
        Self::Message(text.into())
    }

    /// Append errors for `name`. A standalone message is turned into a
    /// field bag first and dropped.
    pub fn with_field(mut self, name: impl Into<String>, errors: impl Into<FieldErrors>) -> Self {
        if let Self::Message(_) = self {
            self = Self::default();
        }
        if let Self::Fields(fields) = &mut self {
            fields.push((name.into(), errors.into()));
        }
        self
    }

    /// Parse a JSON payload, keeping the field order of the document.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Bullet texts (without the marker), field by field.
    pub fn bullets(&self) -> Vec<&str> {
        match self {
            Self::Message(m) => vec![m.as_str()],
            Self::Fields(fields) => fields.iter().flat_map(|(_, e)| e.iter()).collect(),
        }
    }

    /// Whether there is nothing to report.
    pub fn is_empty(&self) -> bool {
        self.bullets().is_empty()
    }

    /// The combined user-facing message.
    ///
    /// ```text
    /// Please correct the following errors:
    ///
    /// • first
    /// • second
    /// ```
    pub fn to_message(&self) -> String {
        let bullets = self.bullets();
        let mut out = VALIDATION_HEADER.to_string();
        if !bullets.is_empty() {
            out.push_str("\n\n");
            let lines: Vec<String> = bullets.iter().map(|b| format!("{BULLET}{b}")).collect();
            out.push_str(&lines.join("\n"));
        }
        out
    }

    /// Per-field errors; empty for a standalone message.
    pub fn fields(&self) -> &[(String, FieldErrors)] {
        match self {
            Self::Message(_) => &[],
            Self::Fields(fields) => fields,
        }
    }
}

impl Serialize for ValidationErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Message(m) => serializer.serialize_str(m),
            Self::Fields(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (name, errors) in fields {
                    map.serialize_entry(name, errors)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for ValidationErrors {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValidationErrorsVisitor)
    }
}

struct ValidationErrorsVisitor;

impl<'de> Visitor<'de> for ValidationErrorsVisitor {
    type Value = ValidationErrors;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a message string or a map of field errors")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(ValidationErrors::Message(v.to_string()))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(ValidationErrors::default())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut fields = Vec::new();
        while let Some((name, errors)) = access.next_entry::<String, FieldErrors>()? {
            fields.push((name, errors));
        }
        Ok(ValidationErrors::Fields(fields))
    }
}

// ---------------------------------------------------------------------------
// Form fields
// ---------------------------------------------------------------------------

/// A form whose fields can be looked up by name and flagged invalid.
pub trait FormFields {
    /// Whether a field called `name` exists.
    fn has_field(&self, name: &str) -> bool;
    /// Names of every field currently marked invalid.
    fn invalid_fields(&self) -> Vec<String>;
    /// Add or remove the [`INVALID_CLASS`] marker.
    fn set_invalid(&mut self, name: &str, invalid: bool);
    /// Set or clear the [`FEEDBACK_CLASS`] text next to the field.
    fn set_feedback(&mut self, name: &str, text: Option<&str>);
}

/// Clear every previously invalid field, then mark each reported field that
/// exists and show its first error. Unknown names are skipped.
pub fn highlight_form_errors(form: &mut dyn FormFields, errors: &ValidationErrors) {
    for name in form.invalid_fields() {
        form.set_invalid(&name, false);
        form.set_feedback(&name, None);
    }
    for (name, field_errors) in errors.fields() {
        if !form.has_field(name) {
            continue;
        }
        form.set_invalid(name, true);
        form.set_feedback(name, Some(field_errors.first().unwrap_or_default()));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FieldState {
    name: String,
    invalid: bool,
    feedback: Option<String>,
}

/// In-memory [`FormFields`] implementation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryForm {
    fields: Vec<FieldState>,
}

impl MemoryForm {
    /// A form with the given field names, all valid.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: names
                .into_iter()
                .map(|n| FieldState {
                    name: n.into(),
                    invalid: false,
                    feedback: None,
                })
                .collect(),
        }
    }

    fn get(&self, name: &str) -> Option<&FieldState> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut FieldState> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// Whether `name` carries the invalid marker.
    pub fn is_invalid(&self, name: &str) -> bool {
        self.get(name).map(|f| f.invalid).unwrap_or(false)
    }

    /// Feedback text shown next to `name`.
    pub fn feedback(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|f| f.feedback.as_deref())
    }

    /// Class list of the field element, e.g. `form-control is-invalid`.
    pub fn field_class(&self, name: &str) -> Option<String> {
        self.get(name).map(|f| {
            if f.invalid {
                format!("form-control {INVALID_CLASS}")
            } else {
                "form-control".to_string()
            }
        })
    }
}

impl FormFields for MemoryForm {
    fn has_field(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    fn invalid_fields(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|f| f.invalid)
            .map(|f| f.name.clone())
            .collect()
    }

    fn set_invalid(&mut self, name: &str, invalid: bool) {
        if let Some(f) = self.get_mut(name) {
            f.invalid = invalid;
        }
    }

    fn set_feedback(&mut self, name: &str, text: Option<&str>) {
        if let Some(f) = self.get_mut(name) {
            f.feedback = text.map(String::from);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ValidationErrors {
        ValidationErrors::new()
            .with_field("email", ["Invalid format"])
            .with_field("password", "Too short")
    }

    #[test]
    fn message_lists_bullets_in_field_order() {
        assert_eq!(
            sample().to_message(),
            "Please correct the following errors:\n\n• Invalid format\n• Too short"
        );
    }

    #[test]
    fn every_error_of_a_field_is_listed() {
        let e = ValidationErrors::new().with_field("name", ["Required", "Too long"]);
        assert_eq!(e.bullets(), vec!["Required", "Too long"]);
    }

    #[test]
    fn standalone_message() {
        let e = ValidationErrors::message("Form expired");
        assert_eq!(
            e.to_message(),
            "Please correct the following errors:\n\n• Form expired"
        );
        assert!(e.fields().is_empty());
    }

    #[test]
    fn empty_bag_has_header_only() {
        assert_eq!(ValidationErrors::new().to_message(), VALIDATION_HEADER);
        assert!(ValidationErrors::new().is_empty());
    }

    #[test]
    fn json_keeps_document_order() {
        let e = ValidationErrors::from_json(
            r#"{"zip": "Invalid", "email": ["Taken", "Bad"], "age": []}"#,
        )
        .unwrap();
        let names: Vec<_> = e.fields().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["zip", "email", "age"]);
        assert_eq!(e.bullets(), vec!["Invalid", "Taken", "Bad"]);
    }

    #[test]
    fn json_string_and_null() {
        assert_eq!(
            ValidationErrors::from_json(r#""Oops""#).unwrap(),
            ValidationErrors::message("Oops")
        );
        assert_eq!(
            ValidationErrors::from_json("null").unwrap(),
            ValidationErrors::new()
        );
        assert!(ValidationErrors::from_json("42").is_err());
    }

    #[test]
    fn serializes_as_map() {
        let v = serde_json::to_value(sample()).unwrap();
        assert_eq!(v["email"][0], "Invalid format");
        assert_eq!(v["password"], "Too short");
        assert_eq!(
            serde_json::to_value(ValidationErrors::message("x")).unwrap(),
            serde_json::json!("x")
        );
    }

    #[test]
    fn highlight_clears_then_marks() {
        let mut form = MemoryForm::new(["email", "password", "name"]);
        form.set_invalid("name", true);
        form.set_feedback("name", Some("old"));

        let errors = ValidationErrors::new()
            .with_field("email", ["Invalid format", "Second"])
            .with_field("nickname", "ignored")
            .with_field("password", "Too short");
        highlight_form_errors(&mut form, &errors);

        assert!(!form.is_invalid("name"));
        assert_eq!(form.feedback("name"), None);
        assert!(form.is_invalid("email"));
        assert_eq!(form.feedback("email"), Some("Invalid format"));
        assert_eq!(form.feedback("password"), Some("Too short"));
        assert!(!form.has_field("nickname"));
        assert_eq!(
            form.field_class("email").as_deref(),
            Some("form-control is-invalid")
        );
    }

    #[test]
    fn message_bag_only_clears() {
        let mut form = MemoryForm::new(["email"]);
        form.set_invalid("email", true);
        highlight_form_errors(&mut form, &ValidationErrors::message("nope"));
        assert!(form.invalid_fields().is_empty());
    }
}
