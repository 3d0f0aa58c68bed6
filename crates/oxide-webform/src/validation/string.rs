//! String validators: length, regex, email and URL.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

use super::{check_required, ValidationContext, Validator, Verdict};
use crate::error::Result;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
});

static DELIMITED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/(?s)(.*)/([imsxU]*)$").unwrap());

/// Validator for string length, in characters.
#[derive(Debug, Clone)]
pub struct StringValidator {
    min: usize,
    max: usize,
    required: bool,
    message: String,
}

impl StringValidator {
    /// Creates a length validator. A `max` of 0 leaves the length unbounded.
    pub fn new(min: usize, max: usize) -> Self {
        let message = match (min, max) {
            (0, 0) => "Enter a value.".to_string(),
            (min, 0) => format!("Ensure this value has at least {min} characters."),
            (0, max) => format!("Ensure this value has at most {max} characters."),
            (min, max) => format!("Ensure this value has between {min} and {max} characters."),
        };
        Self {
            min,
            max,
            required: false,
            message,
        }
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

impl Validator for StringValidator {
    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<Verdict> {
        let value = ctx.scalar(self.name())?;
        if let Some(verdict) = check_required(ctx, self.required, &self.message) {
            return Ok(verdict);
        }

        let len = value.chars().count();
        let ok = len >= self.min && (self.max == 0 || len <= self.max);
        Ok(Verdict::check(ok, &self.message))
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn name(&self) -> &'static str {
        "StringValidator"
    }
}

/// Validator using a custom regex pattern.
///
/// Patterns may be written bare (`^[a-z]+$`) or delimited with trailing
/// flags (`/^[a-z]+$/i`).
#[derive(Debug, Clone)]
pub struct RegexValidator {
    pattern: Regex,
    not: bool,
    required: bool,
    message: String,
}

impl RegexValidator {
    /// Creates a new RegexValidator.
    pub fn new(pattern: &str, message: impl Into<String>) -> Result<Self> {
        Ok(Self {
            pattern: compile_pattern(pattern)?,
            not: false,
            required: false,
            message: message.into(),
        })
    }

    /// Requires the value NOT to match.
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
}

fn compile_pattern(pattern: &str) -> Result<Regex> {
    let Some(caps) = DELIMITED.captures(pattern) else {
        return Ok(Regex::new(pattern)?);
    };

    let body = caps.get(1).map_or("", |m| m.as_str());
    let flags = caps.get(2).map_or("", |m| m.as_str());
    // DELIMITED only admits the flags handled here.
    Ok(RegexBuilder::new(body)
        .case_insensitive(flags.contains('i'))
        .multi_line(flags.contains('m'))
        .dot_matches_new_line(flags.contains('s'))
        .ignore_whitespace(flags.contains('x'))
        .swap_greed(flags.contains('U'))
        .build()?)
}

impl Validator for RegexValidator {
    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<Verdict> {
        let value = ctx.scalar(self.name())?;
        if let Some(verdict) = check_required(ctx, self.required, &self.message) {
            return Ok(verdict);
        }

        let matched = self.pattern.is_match(value);
        Ok(Verdict::check(matched != self.not, &self.message))
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn name(&self) -> &'static str {
        "RegexValidator"
    }
}

/// Validator for email addresses.
#[derive(Debug, Clone)]
pub struct EmailValidator {
    required: bool,
    message: String,
}

impl EmailValidator {
    /// Creates a new EmailValidator with default message.
    pub fn new() -> Self {
        Self {
            required: false,
            message: "Enter a valid email address.".to_string(),
        }
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

impl Default for EmailValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for EmailValidator {
    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<Verdict> {
        let value = ctx.scalar(self.name())?;
        if let Some(verdict) = check_required(ctx, self.required, &self.message) {
            return Ok(verdict);
        }
        Ok(Verdict::check(EMAIL.is_match(value), &self.message))
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn name(&self) -> &'static str {
        "EmailValidator"
    }
}

/// Validator for URL values.
#[derive(Debug, Clone)]
pub struct UrlValidator {
    required: bool,
    message: String,
}

impl UrlValidator {
    /// Creates a new UrlValidator with default message.
    pub fn new() -> Self {
        Self {
            required: false,
            message: "Enter a valid URL.".to_string(),
        }
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

impl Default for UrlValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for UrlValidator {
    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<Verdict> {
        let value = ctx.scalar(self.name())?;
        if let Some(verdict) = check_required(ctx, self.required, &self.message) {
            return Ok(verdict);
        }
        let ok = ["http://", "https://"]
            .iter()
            .any(|scheme| value.len() > scheme.len() && value.starts_with(scheme));
        Ok(Verdict::check(ok, &self.message))
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn name(&self) -> &'static str {
        "UrlValidator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delimited_pattern() {
        let re = compile_pattern("/^[a-z]+$/i").unwrap();
        assert!(re.is_match("PIETER"));
        let bare = compile_pattern("^[a-z]+$").unwrap();
        assert!(!bare.is_match("PIETER"));
    }

    #[test]
    fn test_flags_combine() {
        let re = compile_pattern("/^a.b$/is").unwrap();
        assert!(re.is_match("A\nB"));
        let re = compile_pattern("/^a.b$/i").unwrap();
        assert!(!re.is_match("A\nB"));
    }

    #[test]
    fn test_unknown_flags_read_as_literal_pattern() {
        let re = compile_pattern("/abc/q").unwrap();
        assert!(re.is_match("/abc/q"));
        assert!(!re.is_match("abc"));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(RegexValidator::new("(unclosed", "bad").is_err());
    }

    #[test]
    fn test_length_messages() {
        assert_eq!(
            StringValidator::new(2, 10).message(),
            "Ensure this value has between 2 and 10 characters."
        );
        assert_eq!(
            StringValidator::new(0, 5).message(),
            "Ensure this value has at most 5 characters."
        );
    }
}
