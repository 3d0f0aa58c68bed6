//! Uploaded file validators.

use super::{check_required, wrong_target, ValidationContext, Validator, Verdict};
use crate::error::{FormError, Result};
use crate::fields::Field;
use crate::request::UploadStatus;

/// Validator for uploaded files: the upload succeeded, the stored file
/// exists, its extension is allowed and it is not too large.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    extensions: Vec<String>,
    max_size: u64,
    required: bool,
    message: String,
}

impl UploadValidator {
    /// Creates a validator accepting any extension and size.
    pub fn new() -> Self {
        Self {
            extensions: Vec::new(),
            max_size: 0,
            required: false,
            message: "The uploaded file is not accepted.".to_string(),
        }
    }

    /// Restricts the allowed extensions (case-insensitive).
    #[must_use]
    pub fn extensions(mut self, extensions: &[&str]) -> Self {
        self.extensions = extensions.iter().map(|e| e.to_lowercase()).collect();
        self
    }

    /// Sets the maximum size in bytes. 0 leaves the size unbounded.
    #[must_use]
    pub fn max_size(mut self, bytes: u64) -> Self {
        self.max_size = bytes;
        self
    }

    /// Rejects a missing upload.
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

impl Default for UploadValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for UploadValidator {
    fn bind(&mut self, field: &Field) -> Result<()> {
        if field.is_upload() {
            Ok(())
        } else {
            Err(wrong_target(self.name(), field, "an upload field"))
        }
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<Verdict> {
        if let Some(verdict) = check_required(ctx, self.required, &self.message) {
            return Ok(verdict);
        }
        let Some(file) = ctx.upload() else {
            return Ok(Verdict::Valid);
        };

        if file.status != UploadStatus::Ok {
            return Ok(Verdict::fail(&self.message));
        }
        let Ok(metadata) = std::fs::metadata(&file.tmp_path) else {
            return Ok(Verdict::fail(&self.message));
        };

        let extension_ok = self.extensions.is_empty()
            || file
                .extension()
                .is_some_and(|ext| self.extensions.contains(&ext));
        let size_ok = self.max_size == 0 || metadata.len() <= self.max_size;

        Ok(Verdict::check(
            metadata.is_file() && extension_ok && size_ok,
            &self.message,
        ))
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn name(&self) -> &'static str {
        "UploadValidator"
    }
}

/// An aspect ratio reduced to lowest terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ratio(u32, u32);

impl Ratio {
    fn new(width: u32, height: u32) -> Self {
        let divisor = gcd(width, height).max(1);
        Self(width / divisor, height / divisor)
    }

    fn parse(spec: &str) -> Result<Self> {
        let invalid = || FormError::InvalidRatio(spec.to_string());
        let (w, h) = spec.split_once(':').ok_or_else(invalid)?;
        let w: u32 = w.trim().parse().map_err(|_| invalid())?;
        let h: u32 = h.trim().parse().map_err(|_| invalid())?;
        if w == 0 || h == 0 {
            return Err(invalid());
        }
        Ok(Self::new(w, h))
    }
}

impl std::fmt::Display for Ratio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.0, self.1)
    }
}

fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

/// Validator for uploaded images.
///
/// Runs the upload checks first, then decodes the image dimensions. Each
/// broken dimension rule contributes its own message.
#[derive(Debug, Clone)]
pub struct ImageUploadValidator {
    upload: UploadValidator,
    allowed_ratios: Vec<Ratio>,
    denied_ratios: Vec<Ratio>,
    min_width: Option<u32>,
    max_width: Option<u32>,
    min_height: Option<u32>,
    max_height: Option<u32>,
}

impl ImageUploadValidator {
    /// Creates a validator accepting common web image formats.
    pub fn new() -> Self {
        Self {
            upload: UploadValidator::new().extensions(&["jpg", "jpeg", "png", "gif", "webp"]),
            allowed_ratios: Vec::new(),
            denied_ratios: Vec::new(),
            min_width: None,
            max_width: None,
            min_height: None,
            max_height: None,
        }
    }

    /// Replaces the upload checks (extensions, size, required).
    #[must_use]
    pub fn upload(mut self, upload: UploadValidator) -> Self {
        self.upload = upload;
        self
    }

    /// Allows an aspect ratio such as `"16:9"`. Once any ratio is allowed,
    /// all others are rejected.
    pub fn allow_ratio(mut self, ratio: &str) -> Result<Self> {
        self.allowed_ratios.push(Ratio::parse(ratio)?);
        Ok(self)
    }

    /// Rejects an aspect ratio such as `"1:1"`.
    pub fn deny_ratio(mut self, ratio: &str) -> Result<Self> {
        self.denied_ratios.push(Ratio::parse(ratio)?);
        Ok(self)
    }

    /// Sets the minimum width in pixels.
    #[must_use]
    pub fn min_width(mut self, pixels: u32) -> Self {
        self.min_width = Some(pixels);
        self
    }

    /// Sets the maximum width in pixels.
    #[must_use]
    pub fn max_width(mut self, pixels: u32) -> Self {
        self.max_width = Some(pixels);
        self
    }

    /// Sets the minimum height in pixels.
    #[must_use]
    pub fn min_height(mut self, pixels: u32) -> Self {
        self.min_height = Some(pixels);
        self
    }

    /// Sets the maximum height in pixels.
    #[must_use]
    pub fn max_height(mut self, pixels: u32) -> Self {
        self.max_height = Some(pixels);
        self
    }

    fn check_dimensions(&self, width: u32, height: u32) -> Vec<String> {
        let mut messages = Vec::new();
        let ratio = Ratio::new(width, height);

        if !self.allowed_ratios.is_empty() && !self.allowed_ratios.contains(&ratio) {
            let allowed: Vec<String> = self.allowed_ratios.iter().map(Ratio::to_string).collect();
            messages.push(format!(
                "The image aspect ratio must be one of {}.",
                allowed.join(", ")
            ));
        }
        if self.denied_ratios.contains(&ratio) {
            messages.push(format!("The image aspect ratio {ratio} is not allowed."));
        }
        if let Some(min) = self.min_width.filter(|min| width < *min) {
            messages.push(format!("The image must be at least {min} pixels wide."));
        }
        if let Some(max) = self.max_width.filter(|max| width > *max) {
            messages.push(format!("The image must be at most {max} pixels wide."));
        }
        if let Some(min) = self.min_height.filter(|min| height < *min) {
            messages.push(format!("The image must be at least {min} pixels high."));
        }
        if let Some(max) = self.max_height.filter(|max| height > *max) {
            messages.push(format!("The image must be at most {max} pixels high."));
        }
        messages
    }
}

impl Default for ImageUploadValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for ImageUploadValidator {
    fn bind(&mut self, field: &Field) -> Result<()> {
        self.upload.bind(field)
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<Verdict> {
        let verdict = self.upload.validate(ctx)?;
        if !verdict.is_valid() {
            return Ok(verdict);
        }
        let Some(file) = ctx.upload().filter(|file| !file.is_empty()) else {
            return Ok(Verdict::Valid);
        };

        let Ok((width, height)) = image::image_dimensions(&file.tmp_path) else {
            return Ok(Verdict::fail("The uploaded file is not a valid image."));
        };
        let messages = self.check_dimensions(width, height);
        if messages.is_empty() {
            Ok(Verdict::Valid)
        } else {
            Ok(Verdict::Invalid(messages))
        }
    }

    fn message(&self) -> &str {
        self.upload.message()
    }

    fn name(&self) -> &'static str {
        "ImageUploadValidator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_reduction() {
        assert_eq!(Ratio::new(1920, 1080), Ratio(16, 9));
        assert_eq!(Ratio::parse("32:18").unwrap(), Ratio(16, 9));
        assert_eq!(Ratio::new(0, 0), Ratio(0, 0));
        assert!(matches!(Ratio::parse("wide"), Err(FormError::InvalidRatio(_))));
        assert!(Ratio::parse("0:3").is_err());
    }

    #[test]
    fn test_each_dimension_rule_reports() {
        let validator = ImageUploadValidator::new()
            .allow_ratio("4:3")
            .and_then(|v| v.deny_ratio("1:1"))
            .unwrap()
            .min_width(200)
            .max_height(50);

        let messages = validator.check_dimensions(100, 100);
        assert_eq!(
            messages,
            vec![
                "The image aspect ratio must be one of 4:3.".to_string(),
                "The image aspect ratio 1:1 is not allowed.".to_string(),
                "The image must be at least 200 pixels wide.".to_string(),
                "The image must be at most 50 pixels high.".to_string(),
            ]
        );
        assert!(validator.check_dimensions(400, 300).len() == 1);
    }

    #[test]
    fn test_upload_needs_upload_field() {
        let mut validator = UploadValidator::new();
        assert!(validator.bind(&Field::upload("file")).is_ok());
        assert!(validator.bind(&Field::text("file")).is_err());
    }
}
