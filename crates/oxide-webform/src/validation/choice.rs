//! Validators for select fields and radio button groups.

use super::{check_required, wrong_target, ValidationContext, Validator, Verdict};
use crate::error::Result;
use crate::fields::Field;
use crate::request::ParamValue;

/// Validator requiring the submitted value(s) to be options of the select
/// field. Guards against tampered requests.
#[derive(Debug, Clone)]
pub struct IsOptionValidator {
    required: bool,
    message: String,
}

impl IsOptionValidator {
    /// Creates a new IsOptionValidator with default message.
    pub fn new() -> Self {
        Self {
            required: false,
            message: "Select a valid choice.".to_string(),
        }
    }

    /// Rejects an empty selection.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the error message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

impl Default for IsOptionValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for IsOptionValidator {
    fn bind(&mut self, field: &Field) -> Result<()> {
        if field.is_select() {
            Ok(())
        } else {
            Err(wrong_target(self.name(), field, "a select field"))
        }
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<Verdict> {
        if let Some(verdict) = check_required(ctx, self.required, &self.message) {
            return Ok(verdict);
        }
        let Some(select) = ctx.field().select_options() else {
            return Err(wrong_target(self.name(), ctx.field(), "a select field"));
        };

        let ok = match ctx.value() {
            None => true,
            Some(ParamValue::Scalar(value)) => select.has_option(value),
            Some(ParamValue::List(items)) if select.multiple => items
                .iter()
                .all(|item| item.as_str().is_some_and(|v| select.has_option(v))),
            Some(ParamValue::Map(map)) if select.multiple => map
                .values()
                .all(|item| item.as_str().is_some_and(|v| select.has_option(v))),
            Some(_) => false,
        };
        Ok(Verdict::check(ok, &self.message))
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn name(&self) -> &'static str {
        "IsOptionValidator"
    }
}

/// Validator requiring one radio button of the group to be checked.
///
/// Always required: an empty group is invalid.
#[derive(Debug, Clone)]
pub struct RadioButtonCheckedValidator {
    message: String,
}

impl RadioButtonCheckedValidator {
    /// Creates a new RadioButtonCheckedValidator with default message.
    pub fn new() -> Self {
        Self {
            message: "Choose one of the options.".to_string(),
        }
    }

    /// Sets the error message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

impl Default for RadioButtonCheckedValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for RadioButtonCheckedValidator {
    fn bind(&mut self, field: &Field) -> Result<()> {
        if field.is_radio() {
            Ok(())
        } else {
            Err(wrong_target(self.name(), field, "a radio button"))
        }
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<Verdict> {
        let form = ctx.form();
        let checked = form
            .radio_group(&ctx.field().name)
            .any(|radio| form.is_checked(radio));
        Ok(Verdict::check(checked, &self.message))
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn name(&self) -> &'static str {
        "RadioButtonCheckedValidator"
    }
}
