//! Field validators.
//!
//! A validator is bound to exactly one field when it is attached and reads
//! that field's current value through a [`ValidationContext`]. Validators
//! answer with a [`Verdict`]; a `FormError` means the validator was pointed
//! at data it cannot handle, not that the value is wrong.
//!
//! Most validators are required-aware: an optional validator accepts an
//! empty value without evaluating its rule, a required one rejects it.

mod choice;
mod compare;
mod function;
mod number;
mod string;
mod upload;

pub use choice::{IsOptionValidator, RadioButtonCheckedValidator};
pub use compare::{Comparable, EqualsValidator, FieldRef, SameFieldsValidator};
pub use function::{Check, FunctionValidator};
pub use number::{DecimalMode, FloatValidator, NumberValidator};
pub use string::{EmailValidator, RegexValidator, StringValidator, UrlValidator};
pub use upload::{ImageUploadValidator, UploadValidator};

use crate::error::{FormError, Result};
use crate::fields::Field;
use crate::form::Form;
use crate::request::{ParamValue, UploadedFile};

/// Outcome of a validator run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The value satisfies the rule.
    Valid,
    /// The value breaks the rule. The list may be empty.
    Invalid(Vec<String>),
}

impl Verdict {
    /// An invalid verdict with one message.
    pub fn fail(message: impl Into<String>) -> Self {
        Self::Invalid(vec![message.into()])
    }

    /// Valid when `ok`, otherwise invalid with `message`.
    pub fn check(ok: bool, message: &str) -> Self {
        if ok {
            Self::Valid
        } else {
            Self::fail(message)
        }
    }

    /// Returns whether the verdict is valid.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Flips the verdict; `message` explains a newly failing one.
    #[must_use]
    pub fn invert(self, message: &str) -> Self {
        match self {
            Self::Valid => Self::fail(message),
            Self::Invalid(_) => Self::Valid,
        }
    }
}

/// Trait for field validators.
pub trait Validator: Send + Sync {
    /// Binds the validator to the field it will check.
    ///
    /// Called when the validator is attached. Attaching it again rebinds it.
    /// Validators that only make sense for certain kinds of fields reject
    /// other targets here.
    fn bind(&mut self, field: &Field) -> Result<()> {
        let _ = field;
        Ok(())
    }

    /// Validates the bound field's current value.
    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<Verdict>;

    /// Returns the error message for this validator.
    fn message(&self) -> &str;

    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;
}

/// What a validator sees while it runs: the form, the bound field and the
/// field's current value.
pub struct ValidationContext<'a> {
    form: &'a Form,
    field: &'a Field,
    value: Option<ParamValue>,
}

impl<'a> ValidationContext<'a> {
    /// Creates a context, resolving the field's current value.
    pub fn new(form: &'a Form, field: &'a Field) -> Self {
        Self {
            form,
            field,
            value: form.current_value(field),
        }
    }

    /// Returns the owning form.
    pub fn form(&self) -> &'a Form {
        self.form
    }

    /// Returns the bound field.
    pub fn field(&self) -> &'a Field {
        self.field
    }

    /// Returns the field's current value.
    pub fn value(&self) -> Option<&ParamValue> {
        self.value.as_ref()
    }

    /// Returns the current value as a string, failing for lists and maps.
    ///
    /// A missing value reads as the empty string.
    pub fn scalar(&self, validator: &'static str) -> Result<&str> {
        match &self.value {
            None => Ok(""),
            Some(ParamValue::Scalar(s)) => Ok(s),
            Some(_) => Err(FormError::NonScalarValue {
                validator,
                field: self.field.name.clone(),
            }),
        }
    }

    /// Returns whether the field carries no data: no value, an empty value,
    /// an unchecked checkbox or radio button, or no uploaded file.
    pub fn is_empty(&self) -> bool {
        if self.field.is_checkable() {
            return !self.checked();
        }
        if self.field.is_upload() {
            return self.upload().is_none_or(UploadedFile::is_empty);
        }
        self.value.as_ref().is_none_or(ParamValue::is_empty)
    }

    /// Returns whether the bound checkbox or radio button is checked.
    pub fn checked(&self) -> bool {
        self.form.is_checked(self.field)
    }

    /// Returns the uploaded file for the bound upload field.
    pub fn upload(&self) -> Option<&'a UploadedFile> {
        self.form.uploaded_file(self.field)
    }
}

/// Short-circuits empty values: valid when optional, invalid when required.
fn check_required(ctx: &ValidationContext<'_>, required: bool, message: &str) -> Option<Verdict> {
    if !ctx.is_empty() {
        return None;
    }
    Some(if required {
        Verdict::fail(message)
    } else {
        Verdict::Valid
    })
}

/// Builds the error for a validator attached to the wrong kind of field.
fn wrong_target(validator: &'static str, field: &Field, expected: &'static str) -> FormError {
    FormError::ValidatorTarget {
        validator,
        field: field.name.clone(),
        expected,
    }
}
