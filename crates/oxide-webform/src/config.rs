//! Form configuration: the builder, encoding types and JSON settings.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::csrf::CsrfLedger;
use crate::defaults;
use crate::error::{FormError, Result};
use crate::filter::SharedFilter;
use crate::form::Form;
use crate::render::SharedRenderer;
use crate::request::{Method, Request};

/// Form encoding types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Enctype {
    /// `application/x-www-form-urlencoded`
    #[default]
    #[serde(rename = "application/x-www-form-urlencoded")]
    UrlEncoded,
    /// `multipart/form-data`, required for uploads.
    #[serde(rename = "multipart/form-data")]
    Multipart,
    /// `text/plain`
    #[serde(rename = "text/plain")]
    TextPlain,
}

impl Enctype {
    /// Returns the MIME type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UrlEncoded => "application/x-www-form-urlencoded",
            Self::Multipart => "multipart/form-data",
            Self::TextPlain => "text/plain",
        }
    }
}

impl FromStr for Enctype {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "application/x-www-form-urlencoded" => Ok(Self::UrlEncoded),
            "multipart/form-data" => Ok(Self::Multipart),
            "text/plain" => Ok(Self::TextPlain),
            _ => Err(FormError::InvalidEnctype(s.to_string())),
        }
    }
}

impl fmt::Display for Enctype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Plain-data form settings, loadable from JSON.
///
/// ```
/// use oxide_webform::FormSettings;
///
/// let settings = FormSettings::from_json(r#"{"method": "GET", "csrf_protection": true}"#).unwrap();
/// assert_eq!(settings.method, Some(oxide_webform::Method::Get));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormSettings {
    /// Form action URL.
    pub action: Option<String>,
    /// Submission method.
    pub method: Option<Method>,
    /// Encoding type.
    pub enctype: Option<Enctype>,
    /// Accepted character set.
    pub accept_charset: Option<String>,
    /// Browsing context for the response.
    pub target: Option<String>,
    /// Whether the form is CSRF protected.
    pub csrf_protection: Option<bool>,
    /// Lifetime of issued CSRF tokens, in seconds.
    pub csrf_expiry_secs: Option<i64>,
}

impl FormSettings {
    /// Parses settings from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Builder for [`Form`].
///
/// Starts from a snapshot of the process-wide [`defaults`].
pub struct FormBuilder {
    name: String,
    action: String,
    method: Method,
    enctype: Enctype,
    accept_charset: String,
    target: Option<String>,
    csrf_protection: bool,
    csrf_expiry: Duration,
    csrf_ledger: CsrfLedger,
    renderer: SharedRenderer,
    encoding_filter: Option<SharedFilter>,
}

impl fmt::Debug for FormBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormBuilder")
            .field("name", &self.name)
            .field("action", &self.action)
            .field("method", &self.method)
            .field("enctype", &self.enctype)
            .field("csrf_protection", &self.csrf_protection)
            .finish_non_exhaustive()
    }
}

impl FormBuilder {
    /// Creates a new form builder.
    pub fn new(name: impl Into<String>) -> Self {
        let defaults = defaults::current();
        Self {
            name: name.into(),
            action: String::new(),
            method: Method::default(),
            enctype: Enctype::default(),
            accept_charset: "utf-8".to_string(),
            target: None,
            csrf_protection: defaults.csrf_protection,
            csrf_expiry: defaults.csrf_expiry,
            csrf_ledger: CsrfLedger::new(),
            renderer: defaults.renderer,
            encoding_filter: defaults.encoding_filter,
        }
    }

    /// Sets the action URL.
    #[must_use]
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = action.into();
        self
    }

    /// Sets the method from a string such as `"post"`.
    pub fn method(mut self, method: &str) -> Result<Self> {
        self.method = method.parse()?;
        Ok(self)
    }

    /// Sets the method.
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the encoding type from a MIME string.
    pub fn enctype(mut self, enctype: &str) -> Result<Self> {
        self.enctype = enctype.parse()?;
        Ok(self)
    }

    /// Sets the encoding type.
    #[must_use]
    pub fn with_enctype(mut self, enctype: Enctype) -> Self {
        self.enctype = enctype;
        self
    }

    /// Sets the accepted character set.
    #[must_use]
    pub fn accept_charset(mut self, charset: impl Into<String>) -> Self {
        self.accept_charset = charset.into();
        self
    }

    /// Sets the target browsing context.
    #[must_use]
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Enables or disables CSRF protection.
    #[must_use]
    pub fn csrf_protection(mut self, enabled: bool) -> Self {
        self.csrf_protection = enabled;
        self
    }

    /// Sets the lifetime of issued CSRF tokens.
    #[must_use]
    pub fn csrf_expiry(mut self, expiry: Duration) -> Self {
        self.csrf_expiry = expiry;
        self
    }

    /// Hands over the token ledger restored from the session.
    #[must_use]
    pub fn csrf_ledger(mut self, ledger: CsrfLedger) -> Self {
        self.csrf_ledger = ledger;
        self
    }

    /// Sets the renderer.
    #[must_use]
    pub fn renderer(mut self, renderer: SharedRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Sets the filter applied to submitted values.
    #[must_use]
    pub fn encoding_filter(mut self, filter: SharedFilter) -> Self {
        self.encoding_filter = Some(filter);
        self
    }

    /// Applies the settings that are present.
    ///
    /// Fails with [`FormError::InvalidExpiry`] when `csrf_expiry_secs` is
    /// negative or out of range.
    pub fn settings(mut self, settings: &FormSettings) -> Result<Self> {
        if let Some(action) = &settings.action {
            self.action.clone_from(action);
        }
        if let Some(method) = settings.method {
            self.method = method;
        }
        if let Some(enctype) = settings.enctype {
            self.enctype = enctype;
        }
        if let Some(charset) = &settings.accept_charset {
            self.accept_charset.clone_from(charset);
        }
        if let Some(target) = &settings.target {
            self.target = Some(target.clone());
        }
        if let Some(enabled) = settings.csrf_protection {
            self.csrf_protection = enabled;
        }
        if let Some(secs) = settings.csrf_expiry_secs {
            self.csrf_expiry = Duration::try_seconds(secs)
                .filter(|expiry| *expiry >= Duration::zero())
                .ok_or(FormError::InvalidExpiry(secs))?;
        }
        Ok(self)
    }

    /// Builds the form for the given request.
    ///
    /// A CSRF protected form prunes expired tokens from the ledger and
    /// receives its token field right away.
    pub fn build(self, request: Request) -> Result<Form> {
        let mut form = Form {
            name: self.name,
            action: self.action,
            method: self.method,
            enctype: self.enctype,
            accept_charset: self.accept_charset,
            target: self.target,
            elements: Vec::new(),
            request,
            submitted: Cell::new(None),
            values: RefCell::new(HashMap::new()),
            csrf_protection: false,
            csrf_expiry: self.csrf_expiry,
            csrf_ledger: self.csrf_ledger,
            renderer: self.renderer,
            encoding_filter: self.encoding_filter,
        };

        if self.csrf_protection {
            form.csrf_ledger.prune(form.csrf_expiry);
            form.set_csrf_protection(true)?;
        }

        tracing::debug!(
            form = %form.name,
            method = %form.method,
            csrf = form.csrf_protection,
            "form built"
        );
        Ok(form)
    }
}
