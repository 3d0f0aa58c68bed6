//! The form: elements, submission state, values and validity.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use chrono::Duration;

use crate::config::{Enctype, FormBuilder};
use crate::csrf::{CsrfLedger, CsrfTokenValidator, CSRF_FIELD};
use crate::error::{FormError, Result, ValidationErrors};
use crate::fields::{Button, Element, Field, Optgroup};
use crate::filter::SharedFilter;
use crate::render::SharedRenderer;
use crate::request::{Method, ParamValue, Request, UploadedFile};
use crate::submission::{self, SubmissionCheck, SubmissionReason};
use crate::values::{lookup, strip_array_suffix};

/// A form bound to one request.
///
/// Submission status, looked-up values and field validity are computed
/// lazily and cached until [`Form::clear_cache`].
pub struct Form {
    pub(crate) name: String,
    pub(crate) action: String,
    pub(crate) method: Method,
    pub(crate) enctype: Enctype,
    pub(crate) accept_charset: String,
    pub(crate) target: Option<String>,
    pub(crate) elements: Vec<Element>,
    pub(crate) request: Request,
    pub(crate) submitted: Cell<Option<bool>>,
    pub(crate) values: RefCell<HashMap<String, Option<ParamValue>>>,
    pub(crate) csrf_protection: bool,
    pub(crate) csrf_expiry: Duration,
    pub(crate) csrf_ledger: CsrfLedger,
    pub(crate) renderer: SharedRenderer,
    pub(crate) encoding_filter: Option<SharedFilter>,
}

impl std::fmt::Debug for Form {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Form")
            .field("name", &self.name)
            .field("action", &self.action)
            .field("method", &self.method)
            .field("enctype", &self.enctype)
            .field("elements", &self.elements)
            .field("submitted", &self.submitted.get())
            .field("csrf_protection", &self.csrf_protection)
            .finish_non_exhaustive()
    }
}

impl Form {
    /// Creates a form builder.
    pub fn builder(name: impl Into<String>) -> FormBuilder {
        FormBuilder::new(name)
    }

    /// Returns the form name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the action URL.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Returns the submission method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// Returns the encoding type.
    pub fn enctype(&self) -> Enctype {
        self.enctype
    }

    /// Returns the accepted character set.
    pub fn accept_charset(&self) -> &str {
        &self.accept_charset
    }

    /// Returns the target browsing context.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Returns the request the form is bound to.
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Returns the request mutably. Cached results are kept until
    /// [`Form::clear_cache`].
    pub fn request_mut(&mut self) -> &mut Request {
        &mut self.request
    }

    // Elements

    /// Appends an element.
    ///
    /// Upload fields switch the form to `multipart/form-data`.
    pub fn add(&mut self, element: impl Into<Element>) -> &mut Element {
        let element = element.into();
        if element.as_field().is_some_and(Field::is_upload) {
            self.enctype = Enctype::Multipart;
        }
        self.elements.push(element);
        let index = self.elements.len() - 1;
        &mut self.elements[index]
    }

    /// Appends a field and returns it for further setup.
    pub fn add_field(&mut self, field: Field) -> &mut Field {
        match self.add(field) {
            Element::Field(field) => field,
            Element::Button(_) => unreachable!("a field was just added"),
        }
    }

    /// Appends a button and returns it for further setup.
    pub fn add_button(&mut self, button: Button) -> &mut Button {
        match self.add(button) {
            Element::Button(button) => button,
            Element::Field(_) => unreachable!("a button was just added"),
        }
    }

    /// Adds a text field.
    pub fn text_field(&mut self, name: &str, label: &str) -> &mut Field {
        self.add_field(Field::text(name).label(label))
    }

    /// Adds a password field.
    pub fn password_field(&mut self, name: &str, label: &str) -> &mut Field {
        self.add_field(Field::password(name).label(label))
    }

    /// Adds a textarea.
    pub fn text_area(&mut self, name: &str, label: &str, rows: usize) -> &mut Field {
        self.add_field(Field::textarea(name, rows).label(label))
    }

    /// Adds a hidden field.
    pub fn hidden_field(&mut self, name: &str, value: impl Into<ParamValue>) -> &mut Field {
        self.add_field(Field::hidden(name, value))
    }

    /// Adds a checkbox sending `value` when checked.
    pub fn check_box(&mut self, name: &str, label: &str, value: &str) -> &mut Field {
        self.add_field(Field::checkbox(name, value).label(label))
    }

    /// Adds a radio button. Radio buttons sharing a name form a group.
    pub fn radio_button(&mut self, name: &str, label: &str, value: &str) -> &mut Field {
        self.add_field(Field::radio(name, value).label(label))
    }

    /// Adds a select field from (value, label) pairs.
    pub fn select_field(
        &mut self,
        name: &str,
        label: &str,
        choices: Vec<(&str, &str)>,
    ) -> &mut Field {
        self.add_field(Field::select(name, choices).label(label))
    }

    /// Adds a select field made of option groups.
    pub fn grouped_select_field(
        &mut self,
        name: &str,
        label: &str,
        groups: Vec<Optgroup>,
    ) -> &mut Field {
        let field = groups
            .into_iter()
            .fold(Field::select(name, Vec::new()), Field::optgroup);
        self.add_field(field.label(label))
    }

    /// Adds a file upload field.
    pub fn upload_field(&mut self, name: &str, label: &str) -> &mut Field {
        self.add_field(Field::upload(name).label(label))
    }

    /// Adds a submit button.
    pub fn submit_button(&mut self, name: &str, caption: &str) -> &mut Button {
        self.add_button(Button::submit(name, caption))
    }

    /// Adds an image button.
    pub fn image_button(&mut self, name: &str, src: &str) -> &mut Button {
        self.add_button(Button::image(name, src))
    }

    /// Adds a cancel button, optionally leading to `url`.
    pub fn cancel_button(&mut self, name: &str, caption: &str, url: Option<&str>) -> &mut Button {
        self.add_button(Button::cancel(name, caption, url))
    }

    /// Adds a reset button.
    pub fn reset_button(&mut self, name: &str, caption: &str) -> &mut Button {
        self.add_button(Button::reset(name, caption))
    }

    /// Returns all elements in insertion order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Iterates over the fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.elements.iter().filter_map(Element::as_field)
    }

    /// Iterates over the buttons in insertion order.
    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.elements.iter().filter_map(Element::as_button)
    }

    /// Returns the first field with this name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields().find(|field| field.name == name)
    }

    /// Returns the first field with this name, mutably.
    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.elements
            .iter_mut()
            .filter_map(Element::as_field_mut)
            .find(|field| field.name == name)
    }

    /// Iterates over the radio buttons named `name`.
    pub fn radio_group<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Field> + 'a {
        self.fields()
            .filter(move |field| field.is_radio() && field.name == name)
    }

    // Submission

    /// Returns whether the request is a submission of this form.
    ///
    /// The first answer is memoised until [`Form::clear_cache`].
    pub fn is_submitted(&self) -> bool {
        self.submission_check().submitted
    }

    /// Returns the submission status with the reason behind it.
    pub fn submission_check(&self) -> SubmissionCheck {
        if let Some(submitted) = self.submitted.get() {
            tracing::trace!(form = %self.name, submitted, "reusing submission check");
            return SubmissionCheck {
                submitted,
                reason: SubmissionReason::PreviousResult,
            };
        }

        let check = submission::analyse(self);
        if check.submitted {
            tracing::debug!(form = %self.name, "form submitted");
        } else {
            tracing::debug!(form = %self.name, reason = %check.reason, "form not submitted");
        }
        self.submitted.set(Some(check.submitted));
        check
    }

    /// Forgets the submission status, looked-up values and field validity.
    pub fn clear_cache(&self) {
        self.submitted.set(None);
        self.values.borrow_mut().clear();
        for field in self.fields() {
            field.clear_cache();
        }
    }

    // Values

    /// Looks a (possibly bracketed) name up in the parameter bag of the
    /// form's method.
    ///
    /// Non-empty results pass through the encoding filter. Results are
    /// cached per name.
    pub fn field_value(&self, name: &str) -> Option<ParamValue> {
        if let Some(cached) = self.values.borrow().get(name) {
            return cached.clone();
        }

        let value = lookup(self.request.bag(self.method), name).map(|value| {
            match &self.encoding_filter {
                Some(filter) if !value.is_empty() => {
                    value.map_scalars(&|s: &str| filter.filter(s))
                }
                _ => value.clone(),
            }
        });
        self.values
            .borrow_mut()
            .insert(name.to_string(), value.clone());
        value
    }

    /// Returns the field's current value: the submitted one once the form
    /// is submitted, the configured one before.
    pub fn current_value(&self, field: &Field) -> Option<ParamValue> {
        if self.is_submitted() {
            self.field_value(&field.name)
        } else {
            field.value.clone()
        }
    }

    /// Returns whether a checkbox or radio button is checked.
    ///
    /// After submission the request decides: the control is checked when
    /// the submitted value is, or contains, the control's own value.
    pub fn is_checked(&self, field: &Field) -> bool {
        if !self.is_submitted() {
            return field.initially_checked();
        }
        let own = field
            .value
            .as_ref()
            .and_then(ParamValue::as_str)
            .unwrap_or("on");
        self.field_value(&field.name)
            .is_some_and(|submitted| submitted.contains(own))
    }

    /// Returns the uploaded file for an upload field, once submitted.
    pub fn uploaded_file(&self, field: &Field) -> Option<&UploadedFile> {
        if !field.is_upload() || !self.is_submitted() {
            return None;
        }
        self.request.files.get(strip_array_suffix(&field.name))
    }

    // Validation

    /// Returns whether every field is valid.
    ///
    /// All fields are evaluated so that each collects its messages.
    pub fn is_valid(&self) -> Result<bool> {
        let mut valid = true;
        for field in self.fields() {
            let field_valid = field.is_valid(self)?;
            valid = valid && field_valid;
        }
        Ok(valid)
    }

    /// Returns the collected messages per field, in field order.
    pub fn validation_errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        for field in self.fields() {
            for message in field.errors() {
                errors.add(&field.name, message);
            }
        }
        errors
    }

    /// Returns every collected message, in field order.
    pub fn error_messages(&self) -> Vec<String> {
        self.fields().flat_map(Field::errors).collect()
    }

    /// Adds a message to a field by hand, e.g. after a uniqueness check.
    pub fn add_error(&self, name: &str, message: impl Into<String>) -> Result<()> {
        let field = self
            .field(name)
            .ok_or_else(|| FormError::FieldNotFound(name.to_string()))?;
        field.add_error(message);
        Ok(())
    }

    // CSRF

    /// Enables or disables CSRF protection.
    ///
    /// Enabling adds the token field if it is missing. Unless the form is
    /// already known to be submitted, the field holds a token: the one the
    /// request carries when the ledger still knows it, otherwise a fresh
    /// one issued into the ledger. Disabling removes the field.
    pub fn set_csrf_protection(&mut self, enabled: bool) -> Result<()> {
        self.csrf_protection = enabled;
        if !enabled {
            self.elements.retain(|element| {
                element.is_button() || element.name() != CSRF_FIELD
            });
            return Ok(());
        }
        if self.field(CSRF_FIELD).is_some() {
            return Ok(());
        }

        let token = if self.submitted.get() == Some(true) {
            String::new()
        } else if let Some(token) = self.reusable_token() {
            token
        } else {
            self.csrf_ledger.issue()
        };
        let field = Field::hidden(CSRF_FIELD, token).validator(CsrfTokenValidator::new())?;
        self.add_field(field);
        Ok(())
    }

    /// A still-valid token carried by the request.
    fn reusable_token(&self) -> Option<String> {
        self.request
            .bag(self.method)
            .get(CSRF_FIELD)
            .and_then(ParamValue::as_str)
            .filter(|token| self.csrf_ledger.contains(token, self.csrf_expiry))
            .map(str::to_string)
    }

    /// Returns the token this form hands out, if it holds one.
    ///
    /// Renderers show it instead of the submitted value, so a form whose
    /// token was rejected carries a fresh one.
    pub fn csrf_token(&self) -> Option<&str> {
        self.field(CSRF_FIELD)
            .and_then(|field| field.value.as_ref())
            .and_then(ParamValue::as_str)
            .filter(|token| !token.is_empty())
    }

    /// Returns whether CSRF protection is enabled.
    pub fn csrf_protection(&self) -> bool {
        self.csrf_protection
    }

    /// Returns whether the submitted CSRF token is acceptable.
    ///
    /// True when protection is off, when the form is not submitted or when
    /// the whole form is valid.
    pub fn is_csrf_valid(&self) -> Result<bool> {
        if !self.csrf_protection || !self.is_submitted() || self.is_valid()? {
            return Ok(true);
        }
        match self.field(CSRF_FIELD) {
            Some(field) => field.is_valid(self),
            None => Ok(true),
        }
    }

    /// Returns the token ledger, to be stored back in the session.
    pub fn csrf_ledger(&self) -> &CsrfLedger {
        &self.csrf_ledger
    }

    /// Returns the lifetime of issued tokens.
    pub fn csrf_expiry(&self) -> Duration {
        self.csrf_expiry
    }

    // Rendering

    /// Renders the form with its configured renderer.
    pub fn render(&self) -> String {
        self.renderer.render_form(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::StringValidator;

    fn post_form(request: Request) -> Form {
        Form::builder("test")
            .csrf_protection(false)
            .build(request)
            .unwrap()
    }

    #[test]
    fn test_factories_append_in_order() {
        let mut form = post_form(Request::post());
        form.text_field("name", "Name");
        form.check_box("agree", "Agree", "yes");
        form.submit_button("save", "Save");

        let names: Vec<&str> = form.elements().iter().map(Element::name).collect();
        assert_eq!(names, vec!["name", "agree", "save"]);
        assert_eq!(form.fields().count(), 2);
        assert_eq!(form.buttons().count(), 1);
    }

    #[test]
    fn test_upload_switches_enctype() {
        let mut form = post_form(Request::post());
        assert_eq!(form.enctype(), Enctype::UrlEncoded);
        form.upload_field("avatar", "Avatar");
        assert_eq!(form.enctype(), Enctype::Multipart);
    }

    #[test]
    fn test_unsubmitted_form_uses_configured_values() {
        let mut form = post_form(Request::get());
        form.text_field("name", "Name").set_value("Ada");
        form.check_box("agree", "Agree", "yes");

        let name = form.field("name").unwrap();
        assert!(!form.is_submitted());
        assert_eq!(form.current_value(name), Some(ParamValue::from("Ada")));
        assert!(!form.is_checked(form.field("agree").unwrap()));
    }

    #[test]
    fn test_add_error_marks_field_invalid() {
        let mut form = post_form(Request::post().body_param("name", "Ada"));
        form.text_field("name", "Name")
            .add_validator(StringValidator::new(1, 10))
            .unwrap();

        form.add_error("name", "Already taken.").unwrap();
        assert!(!form.is_valid().unwrap());
        assert_eq!(form.error_messages(), vec!["Already taken.".to_string()]);
        assert!(matches!(
            form.add_error("missing", "x"),
            Err(FormError::FieldNotFound(_))
        ));
    }

    #[test]
    fn test_csrf_toggle() {
        let mut form = post_form(Request::get());
        form.set_csrf_protection(true).unwrap();
        let token = form.field(CSRF_FIELD).and_then(|f| f.value.clone());
        assert!(token.is_some_and(|t| !t.is_empty()));
        assert_eq!(form.csrf_ledger().len(), 1);

        form.set_csrf_protection(true).unwrap();
        assert_eq!(form.csrf_ledger().len(), 1);

        form.set_csrf_protection(false).unwrap();
        assert!(form.field(CSRF_FIELD).is_none());
    }
}
