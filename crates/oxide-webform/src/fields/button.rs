//! Button types.
//!
//! Buttons are not fields: an unclicked button is simply absent from the
//! request, so submission detection treats them separately.

use super::Attributes;
use crate::error::Result;

/// The kind of a button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonKind {
    /// `<input type="submit">`.
    Submit,
    /// `<input type="image">`; browsers send `name_x` and `name_y`.
    Image { src: String },
    /// A button leaving the form without submitting it.
    Cancel { url: Option<String> },
    /// `<input type="reset">`.
    Reset,
}

/// A form button.
#[derive(Debug, Clone)]
pub struct Button {
    /// Presentation attributes.
    pub attrs: Attributes,
    /// Button name. Empty names are never sent by browsers.
    pub name: String,
    /// Caption.
    pub caption: String,
    /// Whether the button is disabled.
    pub disabled: bool,
    /// Kind of button.
    pub kind: ButtonKind,
}

impl Button {
    /// Creates a button of the given kind.
    pub fn new(name: impl Into<String>, caption: impl Into<String>, kind: ButtonKind) -> Self {
        Self {
            attrs: Attributes::new(),
            name: name.into(),
            caption: caption.into(),
            disabled: false,
            kind,
        }
    }

    /// Creates a submit button.
    pub fn submit(name: &str, caption: &str) -> Self {
        Self::new(name, caption, ButtonKind::Submit)
    }

    /// Creates an image button.
    pub fn image(name: &str, src: &str) -> Self {
        Self::new(name, "", ButtonKind::Image { src: src.to_string() })
    }

    /// Creates a cancel button, optionally leading to `url`.
    pub fn cancel(name: &str, caption: &str, url: Option<&str>) -> Self {
        Self::new(
            name,
            caption,
            ButtonKind::Cancel {
                url: url.map(str::to_string),
            },
        )
    }

    /// Creates a reset button.
    pub fn reset(name: &str, caption: &str) -> Self {
        Self::new(name, caption, ButtonKind::Reset)
    }

    /// Disables the button.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Sets an HTML attribute.
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        self.attrs.set(key, value)?;
        Ok(self)
    }

    /// Returns whether clicking the button submits the form.
    pub fn submits(&self) -> bool {
        matches!(self.kind, ButtonKind::Submit | ButtonKind::Image { .. })
    }

    /// Returns whether the button counts for submission detection: it
    /// submits, it can be clicked and it would show up in the request.
    pub fn is_significant(&self) -> bool {
        self.submits() && !self.disabled && !self.name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_significance() {
        assert!(Button::submit("save", "Save").is_significant());
        assert!(!Button::submit("", "Save").is_significant());
        assert!(!Button::submit("save", "Save").disabled().is_significant());
        assert!(!Button::reset("reset", "Reset").is_significant());
        assert!(!Button::cancel("cancel", "Cancel", None).is_significant());
    }

    #[test]
    fn test_image_button() {
        let button = Button::image("go", "/img/go.png");
        assert_eq!(
            button.kind,
            ButtonKind::Image {
                src: "/img/go.png".to_string()
            }
        );
    }
}
