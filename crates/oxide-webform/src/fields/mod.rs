//! Form elements: value-carrying fields and buttons.

mod button;
mod checkbox;
mod select;
mod text;
mod upload;

pub use button::{Button, ButtonKind};
pub use select::{Optgroup, Select, SelectEntry, SelectOption};

use std::cell::RefCell;

use indexmap::IndexMap;

use crate::error::{FormError, Result};
use crate::form::Form;
use crate::request::ParamValue;
use crate::validation::{ValidationContext, Validator, Verdict};

/// Presentation attributes shared by every element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    /// Element id. Renderers derive one from the name when unset.
    pub id: Option<String>,
    /// Tooltip text.
    pub title: Option<String>,
    /// Tab order.
    pub tabindex: Option<i32>,
    /// Keyboard shortcut.
    pub accesskey: Option<char>,
    /// Extra CSS classes.
    pub class: Option<String>,
    /// Inline style.
    pub style: Option<String>,
    /// Any other HTML attributes, in insertion order.
    pub extra: IndexMap<String, String>,
}

impl Attributes {
    /// Creates new empty attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an arbitrary attribute.
    ///
    /// Fails with [`FormError::InvalidAttribute`] for names that cannot
    /// appear in markup.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let key = key.into();
        if !is_attribute_name(&key) {
            return Err(FormError::InvalidAttribute(key));
        }
        self.extra.insert(key, value.into());
        Ok(())
    }

    /// Sets an attribute whose name is known to be well formed.
    pub(crate) fn insert(&mut self, key: &'static str, value: impl Into<String>) {
        self.extra.insert(key.to_string(), value.into());
    }

    /// Gets an arbitrary attribute.
    pub fn get(&self, key: &str) -> Option<&String> {
        self.extra.get(key)
    }

    /// Returns the standard attributes followed by the extra ones, as
    /// name/value pairs.
    pub fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(title) = &self.title {
            pairs.push(("title".to_string(), title.clone()));
        }
        if let Some(tabindex) = self.tabindex {
            pairs.push(("tabindex".to_string(), tabindex.to_string()));
        }
        if let Some(key) = self.accesskey {
            pairs.push(("accesskey".to_string(), key.to_string()));
        }
        if let Some(style) = &self.style {
            pairs.push(("style".to_string(), style.clone()));
        }
        pairs.extend(
            self.extra
                .iter()
                .filter(|(k, _)| is_attribute_name(k))
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        pairs
    }
}

/// Attribute names exclude whitespace, quotes, `>`, `/` and `=`.
fn is_attribute_name(key: &str) -> bool {
    !key.is_empty()
        && !key.chars().any(|c| {
            c.is_whitespace() || c.is_control() || matches!(c, '"' | '\'' | '<' | '>' | '/' | '=')
        })
}

/// The kind of a field. Checked state and options live on the variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Single-line text input.
    Text,
    /// Password input; renderers never echo the value.
    Password,
    /// Multi-line text input.
    TextArea { rows: usize, cols: usize },
    /// Checkbox. `checked` is the state before submission.
    CheckBox { checked: bool },
    /// Radio button. Buttons sharing a name form a group.
    RadioButton { checked: bool },
    /// Drop-down or list box.
    Select(Select),
    /// File input.
    Upload { accept: Option<String> },
    /// Hidden input.
    Hidden,
}

#[derive(Debug, Default)]
struct FieldState {
    valid: Option<bool>,
    errors: Vec<String>,
}

/// A value-carrying form field.
pub struct Field {
    /// Presentation attributes.
    pub attrs: Attributes,
    /// Field name, possibly with bracket groups (`tags[]`).
    pub name: String,
    /// Label text.
    pub label: Option<String>,
    /// Help text shown under the control.
    pub help_text: Option<String>,
    /// Value before submission (or the value a checkbox/radio sends).
    pub value: Option<ParamValue>,
    /// Whether the field is disabled.
    pub disabled: bool,
    /// Whether renderers mark the field as required.
    pub required: bool,
    /// Kind of control.
    pub kind: FieldKind,
    validators: Vec<Box<dyn Validator>>,
    state: RefCell<FieldState>,
}

impl std::fmt::Debug for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("value", &self.value)
            .field("disabled", &self.disabled)
            .field("required", &self.required)
            .field("validators", &self.validators.len())
            .finish_non_exhaustive()
    }
}

impl Field {
    /// Creates a field of the given kind.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            attrs: Attributes::new(),
            name: name.into(),
            label: None,
            help_text: None,
            value: None,
            disabled: false,
            required: false,
            kind,
            validators: Vec::new(),
            state: RefCell::new(FieldState::default()),
        }
    }

    /// Sets the label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets help text.
    #[must_use]
    pub fn help_text(mut self, text: impl Into<String>) -> Self {
        self.help_text = Some(text.into());
        self
    }

    /// Sets the initial value.
    #[must_use]
    pub fn value(mut self, value: impl Into<ParamValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Marks the field as required for rendering.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Disables the field.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Sets the element id.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.attrs.id = Some(id.into());
        self
    }

    /// Sets extra CSS classes.
    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.attrs.class = Some(class.into());
        self
    }

    /// Sets an HTML attribute.
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        self.attrs.set(key, value)?;
        Ok(self)
    }

    /// Attaches a validator, binding it to this field.
    pub fn validator(mut self, validator: impl Validator + 'static) -> Result<Self> {
        self.add_validator(validator)?;
        Ok(self)
    }

    /// Attaches a validator to an already registered field.
    ///
    /// Fails when the validator cannot check this kind of field.
    pub fn add_validator(&mut self, mut validator: impl Validator + 'static) -> Result<&mut Self> {
        validator.bind(self)?;
        self.validators.push(Box::new(validator));
        self.state.get_mut().valid = None;
        Ok(self)
    }

    /// Returns the number of attached validators.
    pub fn validator_count(&self) -> usize {
        self.validators.len()
    }

    /// Replaces the initial value.
    pub fn set_value(&mut self, value: impl Into<ParamValue>) {
        self.value = Some(value.into());
    }

    /// Returns whether this is a checkbox or radio button.
    pub fn is_checkable(&self) -> bool {
        matches!(
            self.kind,
            FieldKind::CheckBox { .. } | FieldKind::RadioButton { .. }
        )
    }

    /// Returns whether this is a radio button.
    pub fn is_radio(&self) -> bool {
        matches!(self.kind, FieldKind::RadioButton { .. })
    }

    /// Returns whether this is a select field.
    pub fn is_select(&self) -> bool {
        matches!(self.kind, FieldKind::Select(_))
    }

    /// Returns whether this is a hidden input.
    pub fn is_hidden(&self) -> bool {
        matches!(self.kind, FieldKind::Hidden)
    }

    /// Returns whether this is an upload field.
    pub fn is_upload(&self) -> bool {
        matches!(self.kind, FieldKind::Upload { .. })
    }

    /// Returns the select options, if this is a select field.
    pub fn select_options(&self) -> Option<&Select> {
        match &self.kind {
            FieldKind::Select(select) => Some(select),
            _ => None,
        }
    }

    /// Returns the select options mutably, if this is a select field.
    pub fn select_options_mut(&mut self) -> Option<&mut Select> {
        match &mut self.kind {
            FieldKind::Select(select) => Some(select),
            _ => None,
        }
    }

    /// Returns the checked state before submission.
    pub fn initially_checked(&self) -> bool {
        matches!(
            self.kind,
            FieldKind::CheckBox { checked: true } | FieldKind::RadioButton { checked: true }
        )
    }

    /// Runs the attached validators, in order, unless a cached result
    /// exists.
    ///
    /// Every validator runs; failure messages accumulate on the field.
    pub fn is_valid(&self, form: &Form) -> Result<bool> {
        if let Some(valid) = self.state.borrow().valid {
            return Ok(valid);
        }

        let ctx = ValidationContext::new(form, self);
        let mut valid = true;
        let mut messages = Vec::new();
        for validator in &self.validators {
            if let Verdict::Invalid(failures) = validator.validate(&ctx)? {
                tracing::debug!(
                    field = %self.name,
                    validator = validator.name(),
                    "validation failed"
                );
                valid = false;
                messages.extend(failures);
            }
        }

        let mut state = self.state.borrow_mut();
        // Errors added by hand before validation also make the field invalid.
        let valid = valid && state.errors.is_empty();
        state.errors.extend(messages);
        state.valid = Some(valid);
        Ok(valid)
    }

    /// Adds an error message by hand and marks the field invalid.
    pub fn add_error(&self, message: impl Into<String>) {
        let mut state = self.state.borrow_mut();
        state.errors.push(message.into());
        if state.valid.is_some() {
            state.valid = Some(false);
        }
    }

    /// Returns the accumulated error messages, in validator order.
    pub fn errors(&self) -> Vec<String> {
        self.state.borrow().errors.clone()
    }

    /// Returns whether the field has accumulated errors.
    pub fn has_errors(&self) -> bool {
        !self.state.borrow().errors.is_empty()
    }

    /// Forgets the cached validity and the accumulated errors.
    pub fn clear_cache(&self) {
        *self.state.borrow_mut() = FieldState::default();
    }
}

/// Anything placed on a form.
#[derive(Debug)]
pub enum Element {
    /// A value-carrying field.
    Field(Field),
    /// A button.
    Button(Button),
}

impl Element {
    /// Returns the element name.
    pub fn name(&self) -> &str {
        match self {
            Self::Field(field) => &field.name,
            Self::Button(button) => &button.name,
        }
    }

    /// Returns the presentation attributes.
    pub fn attrs(&self) -> &Attributes {
        match self {
            Self::Field(field) => &field.attrs,
            Self::Button(button) => &button.attrs,
        }
    }

    /// Returns whether the element is disabled.
    pub fn is_disabled(&self) -> bool {
        match self {
            Self::Field(field) => field.disabled,
            Self::Button(button) => button.disabled,
        }
    }

    /// Returns whether the element is a button.
    pub fn is_button(&self) -> bool {
        matches!(self, Self::Button(_))
    }

    /// Returns the field, if this is one.
    pub fn as_field(&self) -> Option<&Field> {
        match self {
            Self::Field(field) => Some(field),
            Self::Button(_) => None,
        }
    }

    /// Returns the field mutably, if this is one.
    pub fn as_field_mut(&mut self) -> Option<&mut Field> {
        match self {
            Self::Field(field) => Some(field),
            Self::Button(_) => None,
        }
    }

    /// Returns the button, if this is one.
    pub fn as_button(&self) -> Option<&Button> {
        match self {
            Self::Button(button) => Some(button),
            Self::Field(_) => None,
        }
    }
}

impl From<Field> for Element {
    fn from(field: Field) -> Self {
        Self::Field(field)
    }
}

impl From<Button> for Element {
    fn from(button: Button) -> Self {
        Self::Button(button)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::StringValidator;

    #[test]
    fn test_field_builder() {
        let field = Field::text("username")
            .label("Username")
            .required()
            .help_text("Choose a unique username")
            .attr("placeholder", "Enter username")
            .unwrap();

        assert_eq!(field.name, "username");
        assert_eq!(field.label.as_deref(), Some("Username"));
        assert!(field.required);
        assert_eq!(
            field.attrs.get("placeholder").map(String::as_str),
            Some("Enter username")
        );
    }

    #[test]
    fn test_validators_attach_in_order() {
        let field = Field::text("name")
            .validator(StringValidator::new(1, 5))
            .and_then(|f| f.validator(StringValidator::new(2, 0)))
            .unwrap();
        assert_eq!(field.validator_count(), 2);
    }

    #[test]
    fn test_capabilities() {
        assert!(Field::checkbox("agree", "1").is_checkable());
        assert!(Field::radio("color", "red").is_radio());
        assert!(Field::upload("avatar").is_upload());
        assert!(Field::select("tags", vec![("a", "A")]).is_select());
        assert!(!Field::text("plain").is_checkable());
    }

    #[test]
    fn test_attribute_names_are_checked() {
        let mut attrs = Attributes::new();
        for bad in ["", "on click", "x\"y", "a>b", "a=b"] {
            assert!(matches!(
                attrs.set(bad, "1"),
                Err(FormError::InvalidAttribute(name)) if name == bad
            ));
        }
        assert!(attrs.extra.is_empty());

        attrs.extra.insert("bad name".to_string(), "1".to_string());
        attrs.set("aria-label", "Close").unwrap();
        assert_eq!(
            attrs.pairs(),
            vec![("aria-label".to_string(), "Close".to_string())]
        );
    }

    #[test]
    fn test_attribute_pairs_order() {
        let mut attrs = Attributes::new();
        attrs.title = Some("Tip".to_string());
        attrs.tabindex = Some(3);
        attrs.set("data-x", "1").unwrap();

        assert_eq!(
            attrs.pairs(),
            vec![
                ("title".to_string(), "Tip".to_string()),
                ("tabindex".to_string(), "3".to_string()),
                ("data-x".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn test_element_accessors() {
        let element: Element = Button::submit("save", "Save").into();
        assert!(element.is_button());
        assert_eq!(element.name(), "save");
        assert!(element.as_field().is_none());
    }
}
