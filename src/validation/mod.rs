//! Field-level validation of untyped JSON candidates
//!
//! Schemas run against a `serde_json::Value` before typed deserialization so
//! that every violated field is reported at once instead of stopping at the
//! first serde error.

mod rules;

pub use rules::{is_valid_email, is_valid_url, parse_datetime};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// A single violated constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Dotted path of the offending field ("" for the record itself)
    pub field: String,
    pub message: String,
}

/// Every constraint a candidate record violated
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(transparent)]
#[error("{} validation error(s): {}", .0.len(), summarize(.0))]
pub struct ValidationErrors(Vec<FieldError>);

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| {
            if e.field.is_empty() {
                e.message.clone()
            } else {
                format!("{}: {}", e.field, e.message)
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        Self(vec![FieldError {
            field: field.to_string(),
            message: message.into(),
        }])
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// True if any error names `field`
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// Fold another error set in under a path prefix
    pub fn extend_prefixed(&mut self, prefix: &str, other: ValidationErrors) {
        for error in other.0 {
            let field = if error.field.is_empty() {
                prefix.to_string()
            } else {
                format!("{}.{}", prefix, error.field)
            };
            self.0.push(FieldError {
                field,
                message: error.message,
            });
        }
    }
}

/// A type with a schema that validates raw JSON before building the value
pub trait Schema: Sized {
    /// Collect every violation in `value`
    fn check(value: &Value) -> ValidationErrors;

    /// Validate then deserialize
    fn parse(value: &Value) -> Result<Self, ValidationErrors>
    where
        Self: DeserializeOwned,
    {
        let errors = Self::check(value);
        if !errors.is_empty() {
            return Err(errors);
        }
        // Only reachable if the schema and the struct disagree
        serde_json::from_value(value.clone()).map_err(|e| ValidationErrors::single("", e.to_string()))
    }
}

/// Walks the fields of one JSON object and accumulates violations
pub struct ObjectValidator<'a> {
    fields: Option<&'a Map<String, Value>>,
    errors: ValidationErrors,
}

impl<'a> ObjectValidator<'a> {
    pub fn new(value: &'a Value) -> Self {
        let mut errors = ValidationErrors::new();
        let fields = value.as_object();
        if fields.is_none() {
            errors.push("", "expected an object");
        }
        Self { fields, errors }
    }

    fn get(&self, name: &str) -> Option<&'a Value> {
        self.fields
            .and_then(|f| f.get(name))
            .filter(|v| !v.is_null())
    }

    fn present(&mut self, name: &str, required: bool) -> Option<&'a Value> {
        // A non-object candidate already carries its own error
        self.fields?;
        let value = self.get(name);
        if value.is_none() && required {
            self.errors.push(name, "is required");
        }
        value
    }

    /// Required string field
    pub fn string(&mut self, name: &str) -> Option<&'a str> {
        self.string_field(name, true)
    }

    /// Optional string field
    pub fn opt_string(&mut self, name: &str) -> Option<&'a str> {
        self.string_field(name, false)
    }

    fn string_field(&mut self, name: &str, required: bool) -> Option<&'a str> {
        let value = self.present(name, required)?;
        match value.as_str() {
            Some(s) => Some(s),
            None => {
                self.errors.push(name, "must be a string");
                None
            }
        }
    }

    /// Required string that must not be empty after trimming
    pub fn non_empty(&mut self, name: &str) -> Option<&'a str> {
        let s = self.string(name)?;
        if s.trim().is_empty() {
            self.errors.push(name, "must not be empty");
            return None;
        }
        Some(s)
    }

    /// String whose character count must fall in `[min, max]`
    pub fn length(&mut self, name: &str, min: usize, max: usize, required: bool) -> Option<&'a str> {
        let s = self.string_field(name, required)?;
        self.check_length(name, s.chars().count(), min, max)
            .then_some(s)
    }

    /// Like [`length`](Self::length), but surrounding whitespace does not count
    pub fn text(&mut self, name: &str, min: usize, max: usize, required: bool) -> Option<&'a str> {
        let s = self.string_field(name, required)?;
        self.check_length(name, s.trim().chars().count(), min, max)
            .then_some(s)
    }

    fn check_length(&mut self, name: &str, len: usize, min: usize, max: usize) -> bool {
        if len < min {
            self.errors
                .push(name, format!("must be at least {} characters", min));
            return false;
        }
        if len > max {
            self.errors
                .push(name, format!("must be at most {} characters", max));
            return false;
        }
        true
    }

    /// String restricted to a closed set of values
    pub fn one_of(&mut self, name: &str, allowed: &[&str], required: bool) -> Option<&'a str> {
        let s = self.string_field(name, required)?;
        if !allowed.contains(&s) {
            self.errors.push(
                name,
                format!("must be one of: {} (got '{}')", allowed.join(", "), s),
            );
            return None;
        }
        Some(s)
    }

    /// Number within an inclusive range
    pub fn number(&mut self, name: &str, min: f64, max: f64, required: bool) -> Option<f64> {
        let value = self.present(name, required)?;
        let Some(n) = value.as_f64() else {
            self.errors.push(name, "must be a number");
            return None;
        };
        if n < min || n > max {
            self.errors
                .push(name, format!("must be between {} and {}", min, max));
            return None;
        }
        Some(n)
    }

    /// Integer within an inclusive range
    pub fn integer(&mut self, name: &str, min: i64, max: i64, required: bool) -> Option<i64> {
        let value = self.present(name, required)?;
        let Some(n) = value.as_i64() else {
            self.errors.push(name, "must be an integer");
            return None;
        };
        if n < min || n > max {
            self.errors
                .push(name, format!("must be between {} and {}", min, max));
            return None;
        }
        Some(n)
    }

    pub fn boolean(&mut self, name: &str, required: bool) -> Option<bool> {
        let value = self.present(name, required)?;
        let b = value.as_bool();
        if b.is_none() {
            self.errors.push(name, "must be a boolean");
        }
        b
    }

    /// ISO-8601 / RFC 3339 datetime string
    pub fn datetime(&mut self, name: &str, required: bool) {
        if let Some(s) = self.string_field(name, required) {
            if parse_datetime(s).is_none() {
                self.errors
                    .push(name, "must be a valid ISO-8601 datetime");
            }
        }
    }

    pub fn email(&mut self, name: &str, required: bool) {
        if let Some(s) = self.string_field(name, required) {
            if !is_valid_email(s) {
                self.errors.push(name, "must be a valid email address");
            }
        }
    }

    pub fn url(&mut self, name: &str, required: bool) {
        if let Some(s) = self.string_field(name, required) {
            if !is_valid_url(s) {
                self.errors.push(name, "must be a valid URL");
            }
        }
    }

    /// Array of non-empty strings with at most `max_items` entries
    pub fn string_list(&mut self, name: &str, max_items: usize, required: bool) {
        let Some(value) = self.present(name, required) else {
            return;
        };
        let Some(items) = value.as_array() else {
            self.errors.push(name, "must be an array");
            return;
        };
        if items.len() > max_items {
            self.errors
                .push(name, format!("must contain at most {} items", max_items));
        }
        for (i, item) in items.iter().enumerate() {
            match item.as_str() {
                Some(s) if !s.trim().is_empty() => {}
                Some(_) => self
                    .errors
                    .push(&format!("{}.{}", name, i), "must not be empty"),
                None => self
                    .errors
                    .push(&format!("{}.{}", name, i), "must be a string"),
            }
        }
    }

    /// Validate a nested object with another schema
    pub fn nested<S: Schema>(&mut self, name: &str, required: bool) {
        if let Some(value) = self.present(name, required) {
            let nested = S::check(value);
            self.errors.extend_prefixed(name, nested);
        }
    }

    /// Record a custom violation
    pub fn fail(&mut self, name: &str, message: impl Into<String>) {
        self.errors.push(name, message);
    }

    pub fn finish(self) -> ValidationErrors {
        self.errors
    }
}
