//! Validator backed by a caller-supplied function.

use super::{ValidationContext, Validator, Verdict};
use crate::error::Result;

/// What a validation function answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    /// The value passes.
    Valid,
    /// The value fails with the validator's configured message, if any.
    Invalid,
    /// The value fails with this message instead.
    Message(String),
}

impl From<bool> for Check {
    fn from(ok: bool) -> Self {
        if ok {
            Self::Valid
        } else {
            Self::Invalid
        }
    }
}

impl From<&str> for Check {
    fn from(message: &str) -> Self {
        Self::Message(message.to_string())
    }
}

impl From<String> for Check {
    fn from(message: String) -> Self {
        Self::Message(message)
    }
}

type CheckFn = dyn Fn(&ValidationContext<'_>) -> Check + Send + Sync;

/// Validator delegating to a function.
///
/// The function always runs, even for empty values: it decides for itself
/// what an empty value means. A plain `false` answer fails without a message
/// unless one was set with [`FunctionValidator::with_message`].
pub struct FunctionValidator {
    check: Box<CheckFn>,
    message: Option<String>,
}

impl FunctionValidator {
    /// Creates a validator from a function returning a `bool`, a message or
    /// a [`Check`].
    pub fn new<F, R>(check: F) -> Self
    where
        F: Fn(&ValidationContext<'_>) -> R + Send + Sync + 'static,
        R: Into<Check>,
    {
        Self {
            check: Box::new(move |ctx| check(ctx).into()),
            message: None,
        }
    }

    /// Sets the message used when the function answers `false`.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl std::fmt::Debug for FunctionValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionValidator")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

impl Validator for FunctionValidator {
    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<Verdict> {
        Ok(match (self.check)(ctx) {
            Check::Valid => Verdict::Valid,
            Check::Invalid => Verdict::Invalid(self.message.iter().cloned().collect()),
            Check::Message(message) => Verdict::fail(message),
        })
    }

    fn message(&self) -> &str {
        self.message.as_deref().unwrap_or_default()
    }

    fn name(&self) -> &'static str {
        "FunctionValidator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_conversions() {
        assert_eq!(Check::from(true), Check::Valid);
        assert_eq!(Check::from(false), Check::Invalid);
        assert_eq!(Check::from("taken"), Check::Message("taken".to_string()));
    }

    #[test]
    fn test_message_is_optional() {
        assert_eq!(FunctionValidator::new(|_| false).message(), "");
        assert_eq!(
            FunctionValidator::new(|_| false).with_message("Nope.").message(),
            "Nope."
        );
    }
}
