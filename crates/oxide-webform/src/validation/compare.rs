//! Equality validators: against a literal or against another field.

use std::sync::LazyLock;

use regex::Regex;

use super::{ValidationContext, Validator, Verdict};
use crate::error::{FormError, Result};
use crate::fields::Field;
use crate::form::Form;
use crate::request::ParamValue;

static FIELD_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\[\]\s]+(\[[^\[\]]*\])*$").unwrap());

/// What a field contributes to a comparison.
///
/// Checkboxes and radio buttons compare by checked state, everything else
/// by its text value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparable {
    /// A text value.
    Text(String),
    /// A checked state.
    Checked(bool),
}

impl Comparable {
    fn of(form: &Form, field: &Field, validator: &'static str) -> Result<Self> {
        if field.is_checkable() {
            return Ok(Self::Checked(form.is_checked(field)));
        }
        match form.current_value(field) {
            None => Ok(Self::Text(String::new())),
            Some(ParamValue::Scalar(s)) => Ok(Self::Text(s)),
            Some(_) => Err(FormError::NonScalarValue {
                validator,
                field: field.name.clone(),
            }),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Checked(checked) => !checked,
        }
    }

    fn truthy(&self) -> bool {
        match self {
            Self::Text(s) => !s.is_empty() && s != "0" && !s.eq_ignore_ascii_case("false"),
            Self::Checked(checked) => *checked,
        }
    }

    fn matches(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a == b,
            _ => self.truthy() == other.truthy(),
        }
    }
}

impl From<&str> for Comparable {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Comparable {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for Comparable {
    fn from(value: bool) -> Self {
        Self::Checked(value)
    }
}

/// A reference to another field by name, resolved against the form when
/// validation runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef(String);

impl FieldRef {
    /// Creates a reference, rejecting names no field could carry.
    pub fn new(name: &str) -> Result<Self> {
        if FIELD_NAME.is_match(name) {
            Ok(Self(name.to_string()))
        } else {
            Err(FormError::InvalidFieldReference(name.to_string()))
        }
    }

    /// Returns the referenced name.
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Looks the field up on the form.
    pub fn resolve<'a>(&self, form: &'a Form, from: &Field) -> Result<&'a Field> {
        form.field(&self.0).ok_or_else(|| FormError::UnresolvedField {
            field: from.name.clone(),
            reference: self.0.clone(),
        })
    }
}

/// Validator comparing the field to a literal.
#[derive(Debug, Clone)]
pub struct EqualsValidator {
    expected: Comparable,
    not: bool,
    required: bool,
    message: String,
}

impl EqualsValidator {
    /// Creates a validator requiring the field to equal `expected`.
    pub fn new(expected: impl Into<Comparable>) -> Self {
        Self {
            expected: expected.into(),
            not: false,
            required: false,
            message: "The value is not allowed.".to_string(),
        }
    }

    /// Requires the field NOT to equal the literal.
    #[must_use]
    pub fn not(mut self) -> Self {
        self.not = true;
        self
    }

    /// Rejects empty values.
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

impl Validator for EqualsValidator {
    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<Verdict> {
        let actual = Comparable::of(ctx.form(), ctx.field(), self.name())?;
        if actual.is_empty() {
            return Ok(Verdict::check(!self.required, &self.message));
        }
        Ok(Verdict::check(
            actual.matches(&self.expected) != self.not,
            &self.message,
        ))
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn name(&self) -> &'static str {
        "EqualsValidator"
    }
}

/// Validator comparing the field to another field, e.g. a password
/// confirmation.
#[derive(Debug, Clone)]
pub struct SameFieldsValidator {
    other: FieldRef,
    not: bool,
    required: bool,
    message: String,
}

impl SameFieldsValidator {
    /// Creates a validator requiring the field to equal the field named
    /// `other`.
    pub fn new(other: &str) -> Result<Self> {
        Ok(Self {
            other: FieldRef::new(other)?,
            not: false,
            required: false,
            message: "The fields do not match.".to_string(),
        })
    }

    /// Requires the fields to differ.
    #[must_use]
    pub fn not(mut self) -> Self {
        self.not = true;
        self
    }

    /// Rejects empty values.
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

impl Validator for SameFieldsValidator {
    fn bind(&mut self, field: &Field) -> Result<()> {
        if field.name == self.other.name() {
            return Err(FormError::InvalidFieldReference(field.name.clone()));
        }
        Ok(())
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<Verdict> {
        let other = self.other.resolve(ctx.form(), ctx.field())?;
        let actual = Comparable::of(ctx.form(), ctx.field(), self.name())?;
        let expected = Comparable::of(ctx.form(), other, self.name())?;

        if actual.is_empty() && self.required {
            return Ok(Verdict::fail(&self.message));
        }
        if actual.is_empty() && expected.is_empty() {
            return Ok(Verdict::check(!self.not, &self.message));
        }
        Ok(Verdict::check(
            actual.matches(&expected) != self.not,
            &self.message,
        ))
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn name(&self) -> &'static str {
        "SameFieldsValidator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_ref_parsing() {
        assert!(FieldRef::new("password").is_ok());
        assert!(FieldRef::new("record[1][x]").is_ok());
        assert!(FieldRef::new("tags[]").is_ok());
        assert!(matches!(
            FieldRef::new(""),
            Err(FormError::InvalidFieldReference(_))
        ));
        assert!(FieldRef::new("two words").is_err());
        assert!(FieldRef::new("open[").is_err());
    }

    #[test]
    fn test_comparable_matching() {
        assert!(Comparable::from("a").matches(&Comparable::from("a")));
        assert!(!Comparable::from("a").matches(&Comparable::from("b")));
        assert!(Comparable::from(true).matches(&Comparable::from("1")));
        assert!(Comparable::from(false).matches(&Comparable::from("0")));
        assert!(!Comparable::from(true).matches(&Comparable::from(false)));
    }

    #[test]
    fn test_bind_rejects_self_reference() {
        let mut validator = SameFieldsValidator::new("password").unwrap();
        assert!(validator.bind(&Field::password("password")).is_err());
        assert!(validator.bind(&Field::password("confirm")).is_ok());
    }
}
