//! Text field types.

use super::{Field, FieldKind};
use crate::request::ParamValue;

impl Field {
    /// Creates a single-line text field.
    pub fn text(name: &str) -> Self {
        Self::new(name, FieldKind::Text)
    }

    /// Creates a text field rendered with another HTML input type
    /// (`email`, `number`, `date`, ...).
    pub fn input(name: &str, input_type: &str) -> Self {
        let mut field = Self::new(name, FieldKind::Text);
        field.attrs.insert("type", input_type);
        field
    }

    /// Creates a password field.
    pub fn password(name: &str) -> Self {
        Self::new(name, FieldKind::Password)
    }

    /// Creates a textarea with the given number of rows.
    pub fn textarea(name: &str, rows: usize) -> Self {
        Self::new(name, FieldKind::TextArea { rows, cols: 40 })
    }

    /// Creates a hidden field.
    pub fn hidden(name: &str, value: impl Into<ParamValue>) -> Self {
        Self::new(name, FieldKind::Hidden).value(value)
    }

    /// Sets the maximum input length rendered on the control.
    #[must_use]
    pub fn max_length(mut self, max: usize) -> Self {
        self.attrs.insert("maxlength", max.to_string());
        self
    }

    /// Sets the placeholder text.
    #[must_use]
    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.attrs.insert("placeholder", text);
        self
    }
}
