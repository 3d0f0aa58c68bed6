//! # oxide-webform
//!
//! Server-side HTML forms: submission detection, per-field validation, CSRF
//! protection and Bootstrap 5 rendering.
//!
//! A [`Form`] is built for one request. It decides whether the request is a
//! submission of the form, resolves submitted values (including bracketed
//! names such as `tags[]` or `address[home][street]`), runs the validators
//! attached to each field and renders itself back with errors in place.
//!
//! ## Quick Start
//!
//! ```rust
//! use oxide_webform::{Form, Request};
//! use oxide_webform::validation::{EmailValidator, StringValidator};
//!
//! let request = Request::post()
//!     .body_param("name", "Ada")
//!     .body_param("email", "not-an-address")
//!     .body_param("send", "Send");
//!
//! let mut form = Form::builder("contact")
//!     .action("/contact")
//!     .csrf_protection(false)
//!     .build(request)
//!     .unwrap();
//! form.text_field("name", "Name")
//!     .add_validator(StringValidator::new(2, 50).required())
//!     .unwrap();
//! form.text_field("email", "Email")
//!     .add_validator(EmailValidator::new().required())
//!     .unwrap();
//! form.submit_button("send", "Send");
//!
//! assert!(form.is_submitted());
//! assert!(!form.is_valid().unwrap());
//! assert_eq!(form.validation_errors().len(), 1);
//!
//! let html = form.render();
//! assert!(html.contains("is-invalid"));
//! ```
//!
//! ## Errors
//!
//! Setup mistakes (an unknown method string, a validator attached to a field
//! it cannot check, a malformed pattern) are returned as [`FormError`].
//! Rejected user input is not an error: it shows up as `is_valid() ==
//! Ok(false)` plus the messages collected on each field.
//!
//! ## Defaults
//!
//! The [`defaults`] module holds process-wide defaults (renderer, encoding
//! filter, CSRF protection) that every [`FormBuilder`] starts from.

mod config;
pub mod csrf;
pub mod defaults;
mod error;
pub mod fields;
pub mod filter;
mod form;
pub mod render;
mod request;
mod submission;
pub mod validation;
pub mod values;

pub use config::{Enctype, FormBuilder, FormSettings};
pub use csrf::{CsrfLedger, CSRF_FIELD};
pub use error::{FormError, Result, ValidationErrors};
pub use fields::{Button, ButtonKind, Element, Field, FieldKind, Optgroup, SelectOption};
pub use filter::{EncodingFilter, HtmlEscapeFilter, TrimFilter};
pub use form::Form;
pub use render::{BootstrapRenderer, Renderer};
pub use request::{
    parse_urlencoded, Method, ParamBag, ParamValue, Request, UploadStatus, UploadedFile,
};
pub use submission::{SubmissionCheck, SubmissionReason};
