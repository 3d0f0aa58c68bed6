//! Numeric validators.
//!
//! Values are compared as exact decimals, so a bound like `2.3` accepts
//! `"2.3"` and `"2,30"` without float rounding surprises.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use super::{check_required, ValidationContext, Validator, Verdict};
use crate::error::Result;

static INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?\d+$").unwrap());
static POINT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?\d+(\.\d+)?$").unwrap());
static COMMA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?\d+(,\d+)?$").unwrap());
static POINT_OR_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+([.,]\d+)?$").unwrap());

/// Accepted decimal separators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecimalMode {
    /// `1.5`
    #[default]
    Point,
    /// `1,5`
    Comma,
    /// Either separator.
    PointOrComma,
}

impl DecimalMode {
    fn grammar(self) -> &'static Regex {
        match self {
            Self::Point => &*POINT,
            Self::Comma => &*COMMA,
            Self::PointOrComma => &*POINT_OR_COMMA,
        }
    }
}

fn in_bounds(value: Decimal, min: Option<Decimal>, max: Option<Decimal>) -> bool {
    min.is_none_or(|min| value >= min) && max.is_none_or(|max| value <= max)
}

fn range_message(min: Option<Decimal>, max: Option<Decimal>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("Value must be between {min} and {max}."),
        (Some(min), None) => format!("Value must be at least {min}."),
        (None, Some(max)) => format!("Value must be at most {max}."),
        (None, None) => "Enter a valid number.".to_string(),
    }
}

/// Validator for whole numbers within an inclusive range.
#[derive(Debug, Clone)]
pub struct NumberValidator {
    min: Option<Decimal>,
    max: Option<Decimal>,
    required: bool,
    message: String,
}

impl NumberValidator {
    /// Creates a new NumberValidator with min and max bounds.
    pub fn new(min: Option<i64>, max: Option<i64>) -> Self {
        let min = min.map(Decimal::from);
        let max = max.map(Decimal::from);
        Self {
            min,
            max,
            required: false,
            message: range_message(min, max),
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

impl Validator for NumberValidator {
    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<Verdict> {
        let value = ctx.scalar(self.name())?;
        if let Some(verdict) = check_required(ctx, self.required, &self.message) {
            return Ok(verdict);
        }

        let ok = INTEGER.is_match(value)
            && Decimal::from_str(value).is_ok_and(|n| in_bounds(n, self.min, self.max));
        Ok(Verdict::check(ok, &self.message))
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn name(&self) -> &'static str {
        "NumberValidator"
    }
}

/// Validator for decimal numbers within an inclusive range.
#[derive(Debug, Clone)]
pub struct FloatValidator {
    min: Option<Decimal>,
    max: Option<Decimal>,
    mode: DecimalMode,
    required: bool,
    message: String,
}

impl FloatValidator {
    /// Creates a new FloatValidator with min and max bounds.
    pub fn new(min: Option<Decimal>, max: Option<Decimal>) -> Self {
        Self {
            min,
            max,
            mode: DecimalMode::default(),
            required: false,
            message: range_message(min, max),
        }
    }

    /// Sets the accepted decimal separators.
    #[must_use]
    pub fn mode(mut self, mode: DecimalMode) -> Self {
        self.mode = mode;
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

impl Validator for FloatValidator {
    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<Verdict> {
        let value = ctx.scalar(self.name())?;
        if let Some(verdict) = check_required(ctx, self.required, &self.message) {
            return Ok(verdict);
        }

        let ok = self.mode.grammar().is_match(value)
            && Decimal::from_str(&value.replace(',', "."))
                .is_ok_and(|n| in_bounds(n, self.min, self.max));
        Ok(Verdict::check(ok, &self.message))
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn name(&self) -> &'static str {
        "FloatValidator"
    }
}
