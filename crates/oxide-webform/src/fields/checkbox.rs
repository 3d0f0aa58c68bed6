//! Checkbox and radio button fields.

use super::{Field, FieldKind};

impl Field {
    /// Creates a checkbox that sends `value` when checked.
    pub fn checkbox(name: &str, value: &str) -> Self {
        Self::new(name, FieldKind::CheckBox { checked: false }).value(value)
    }

    /// Creates a radio button that sends `value` when chosen.
    pub fn radio(name: &str, value: &str) -> Self {
        Self::new(name, FieldKind::RadioButton { checked: false }).value(value)
    }

    /// Sets the checked state before submission. No effect on other kinds.
    #[must_use]
    pub fn checked(mut self, checked: bool) -> Self {
        match &mut self.kind {
            FieldKind::CheckBox { checked: c } | FieldKind::RadioButton { checked: c } => {
                *c = checked;
            }
            _ => {}
        }
        self
    }
}
