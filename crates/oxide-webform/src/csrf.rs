//! Cross-site request forgery protection.
//!
//! A protected form carries a hidden [`CSRF_FIELD`] holding a random token.
//! Issued tokens are remembered in a [`CsrfLedger`] that the host keeps in
//! its session between requests; a submission is only trusted when it echoes
//! a token from the ledger that has not expired yet.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::validation::{ValidationContext, Validator, Verdict};

/// Name of the hidden token field.
pub const CSRF_FIELD: &str = "csrftoken";

/// Default lifetime of an issued token.
pub const DEFAULT_CSRF_EXPIRY_SECS: i64 = 60 * 60 * 2;

/// Generates a cryptographically secure token (64 character hex string).
pub fn generate_token() -> String {
    use rand::RngExt;
    let mut rng = rand::rng();
    let mut bytes = [0u8; 32];
    rng.fill(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// A token handed out with a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedToken {
    /// The token value.
    pub token: String,
    /// When the token was issued.
    pub issued_at: DateTime<Utc>,
}

impl IssuedToken {
    /// Returns whether the token is older than `expiry`.
    pub fn is_expired(&self, expiry: Duration) -> bool {
        Utc::now() - self.issued_at > expiry
    }
}

/// Session-backed record of issued tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsrfLedger {
    tokens: Vec<IssuedToken>,
}

impl CsrfLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates a token, records it and returns it.
    pub fn issue(&mut self) -> String {
        let token = generate_token();
        self.tokens.push(IssuedToken {
            token: token.clone(),
            issued_at: Utc::now(),
        });
        token
    }

    /// Drops tokens older than `expiry`.
    pub fn prune(&mut self, expiry: Duration) {
        let before = self.tokens.len();
        self.tokens.retain(|issued| !issued.is_expired(expiry));
        let pruned = before - self.tokens.len();
        if pruned > 0 {
            tracing::trace!(pruned, "pruned expired csrf tokens");
        }
    }

    /// Returns whether `token` was issued and has not expired.
    pub fn contains(&self, token: &str, expiry: Duration) -> bool {
        self.tokens
            .iter()
            .any(|issued| issued.token == token && !issued.is_expired(expiry))
    }

    /// Returns the number of remembered tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns whether no tokens are remembered.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Returns the remembered tokens, oldest first.
    pub fn tokens(&self) -> &[IssuedToken] {
        &self.tokens
    }

    /// Serializes the ledger for session storage.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Restores a ledger from session storage.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Validator accepting only tokens recorded in the form's ledger.
#[derive(Debug, Clone)]
pub struct CsrfTokenValidator {
    message: String,
}

impl CsrfTokenValidator {
    /// Creates a new CsrfTokenValidator with default message.
    pub fn new() -> Self {
        Self {
            message: "The form has expired. Please submit it again.".to_string(),
        }
    }
}

impl Default for CsrfTokenValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for CsrfTokenValidator {
    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<Verdict> {
        let token = ctx.scalar(self.name())?;
        let form = ctx.form();
        let known = !token.is_empty() && form.csrf_ledger().contains(token, form.csrf_expiry());
        if !known {
            tracing::warn!(form = %form.name(), "rejected csrf token");
        }
        Ok(Verdict::check(known, &self.message))
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn name(&self) -> &'static str {
        "CsrfTokenValidator"
    }
}
