//! Error types for forms.

use thiserror::Error;

/// Form configuration errors.
///
/// These signal misuse at setup time (or a validator pointed at data it
/// cannot handle). Business-rule violations are never reported through this
/// type; they accumulate as messages on the fields instead.
#[derive(Debug, Error)]
pub enum FormError {
    /// Unknown form method.
    #[error("invalid form method: {0}")]
    InvalidMethod(String),

    /// Unknown form encoding type.
    #[error("invalid form enctype: {0}")]
    InvalidEnctype(String),

    /// A validator was attached to a field it cannot check.
    #[error("{validator} cannot be attached to field {field}: expected {expected}")]
    ValidatorTarget {
        validator: &'static str,
        field: String,
        expected: &'static str,
    },

    /// A scalar-only validator received a list or map value.
    #[error("{validator} expects a scalar value for field {field}")]
    NonScalarValue {
        validator: &'static str,
        field: String,
    },

    /// An HTML attribute name cannot appear in markup.
    #[error("invalid attribute name: {0:?}")]
    InvalidAttribute(String),

    /// A field reference could not be parsed.
    #[error("invalid field reference: {0:?}")]
    InvalidFieldReference(String),

    /// A field reference did not match any field on the form.
    #[error("field {field} refers to unknown field {reference}")]
    UnresolvedField { field: String, reference: String },

    /// No field with that name exists on the form.
    #[error("no such field: {0}")]
    FieldNotFound(String),

    /// An aspect ratio was not of the form `width:height`.
    #[error("invalid aspect ratio: {0:?}")]
    InvalidRatio(String),

    /// A CSRF token lifetime was negative or out of range.
    #[error("invalid CSRF expiry: {0} seconds")]
    InvalidExpiry(i64),

    /// A validator pattern failed to compile.
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Settings could not be parsed.
    #[error("failed to parse form settings: {0}")]
    Settings(#[from] serde_json::Error),
}

/// Collection of validation errors by field, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    /// Errors keyed by field name.
    pub errors: Vec<(String, Vec<String>)>,
}

impl ValidationErrors {
    /// Creates a new empty ValidationErrors.
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Adds an error for a field.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        match self.errors.iter_mut().find(|(name, _)| name == field) {
            Some((_, messages)) => messages.push(message.into()),
            None => self.errors.push((field.to_string(), vec![message.into()])),
        }
    }

    /// Returns whether there are any errors.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of fields with errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns errors for a specific field.
    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.errors
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, messages)| messages)
    }

    /// Returns all errors as a flat list.
    pub fn all_errors(&self) -> Vec<(&str, &str)> {
        self.errors
            .iter()
            .flat_map(|(field, messages)| {
                messages
                    .iter()
                    .map(move |msg| (field.as_str(), msg.as_str()))
            })
            .collect()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (field, messages) in &self.errors {
            for message in messages {
                writeln!(f, "{field}: {message}")?;
            }
        }
        Ok(())
    }
}

/// Result type alias for form operations.
pub type Result<T> = std::result::Result<T, FormError>;
