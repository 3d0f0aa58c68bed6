//! Process-wide form defaults.
//!
//! [`FormBuilder`](crate::FormBuilder) takes a snapshot of these values when
//! it is created; every value can still be overridden per form. Changing a
//! default is a process-wide side effect: it affects every form built
//! afterwards, on every thread, and never forms that already exist.

use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use chrono::Duration;

use crate::csrf::DEFAULT_CSRF_EXPIRY_SECS;
use crate::filter::SharedFilter;
use crate::render::{BootstrapRenderer, SharedRenderer};

/// Default configuration for new forms.
#[derive(Clone)]
pub struct FormDefaults {
    /// Renderer used by `Form::render`.
    pub renderer: SharedRenderer,
    /// Filter applied to submitted values, if any.
    pub encoding_filter: Option<SharedFilter>,
    /// Whether new forms are CSRF protected.
    pub csrf_protection: bool,
    /// Lifetime of issued CSRF tokens.
    pub csrf_expiry: Duration,
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self {
            renderer: Arc::new(BootstrapRenderer::new()),
            encoding_filter: None,
            csrf_protection: false,
            csrf_expiry: Duration::seconds(DEFAULT_CSRF_EXPIRY_SECS),
        }
    }
}

impl std::fmt::Debug for FormDefaults {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormDefaults")
            .field("encoding_filter", &self.encoding_filter.is_some())
            .field("csrf_protection", &self.csrf_protection)
            .field("csrf_expiry", &self.csrf_expiry)
            .finish_non_exhaustive()
    }
}

static DEFAULTS: LazyLock<RwLock<FormDefaults>> =
    LazyLock::new(|| RwLock::new(FormDefaults::default()));

/// Returns a snapshot of the current defaults.
pub fn current() -> FormDefaults {
    DEFAULTS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

fn update(apply: impl FnOnce(&mut FormDefaults)) {
    let mut defaults = DEFAULTS.write().unwrap_or_else(PoisonError::into_inner);
    apply(&mut defaults);
    tracing::debug!(defaults = ?*defaults, "form defaults changed");
}

/// Sets the renderer for forms built from now on.
pub fn set_renderer(renderer: SharedRenderer) {
    update(|defaults| defaults.renderer = renderer);
}

/// Sets (or clears) the encoding filter for forms built from now on.
pub fn set_encoding_filter(filter: Option<SharedFilter>) {
    update(|defaults| defaults.encoding_filter = filter);
}

/// Enables or disables CSRF protection for forms built from now on.
pub fn set_csrf_protection(enabled: bool) {
    update(|defaults| defaults.csrf_protection = enabled);
}

/// Sets the CSRF token lifetime for forms built from now on.
pub fn set_csrf_expiry(expiry: Duration) {
    update(|defaults| defaults.csrf_expiry = expiry);
}

/// Restores the built-in defaults.
pub fn reset() {
    update(|defaults| *defaults = FormDefaults::default());
}
