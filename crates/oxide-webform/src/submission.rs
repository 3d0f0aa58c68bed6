//! Submission detection.
//!
//! A form counts as submitted when the request uses the form's method and
//! carries every field the browser always sends. Checkboxes and radio buttons
//! are skipped because unchecked ones are never sent, and buttons are
//! special: only the clicked one is sent.

use std::fmt;

use crate::fields::{ButtonKind, Element, FieldKind};
use crate::form::Form;
use crate::request::{Method, ParamBag};
use crate::values::strip_array_suffix;

/// Why a form was, or was not, considered submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionReason {
    /// Every check passed.
    Submitted,
    /// The transport reported no method.
    NoRequestMethod,
    /// The request used another method than the form.
    MethodMismatch { expected: Method, actual: String },
    /// An upload field had no entry in the files bag.
    MissingUpload(String),
    /// A field was absent from the parameter bag.
    MissingField(String),
    /// The form's only significant button was absent.
    MissingButton(String),
    /// The form has significant buttons but none of them was sent.
    NoButtonEvidence,
    /// The memoised result of an earlier check was returned.
    PreviousResult,
}

impl fmt::Display for SubmissionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submitted => write!(f, "all submission checks passed"),
            Self::NoRequestMethod => write!(f, "no request method known"),
            Self::MethodMismatch { expected, actual } => {
                write!(f, "form expects {expected} but the request method is {actual:?}")
            }
            Self::MissingUpload(name) => write!(f, "upload field {name} not in the files bag"),
            Self::MissingField(name) => write!(f, "field {name} not in the parameter bag"),
            Self::MissingButton(name) => write!(f, "the only button {name} was not submitted"),
            Self::NoButtonEvidence => write!(f, "no button evidence"),
            Self::PreviousResult => write!(f, "previous check result reused"),
        }
    }
}

/// Result of a submission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionCheck {
    /// Whether the form counts as submitted.
    pub submitted: bool,
    /// Diagnostic explanation.
    pub reason: SubmissionReason,
}

impl SubmissionCheck {
    fn rejected(reason: SubmissionReason) -> Self {
        Self {
            submitted: false,
            reason,
        }
    }
}

/// Analyses the form's request, ignoring any memoised result.
pub(crate) fn analyse(form: &Form) -> SubmissionCheck {
    let request = form.request();
    let Some(actual) = request.method.as_deref() else {
        return SubmissionCheck::rejected(SubmissionReason::NoRequestMethod);
    };
    let expected = form.method();
    if actual != expected.as_str() {
        return SubmissionCheck::rejected(SubmissionReason::MethodMismatch {
            expected,
            actual: actual.to_string(),
        });
    }

    let bag = request.bag(expected);
    let significant = form
        .buttons()
        .filter(|button| button.is_significant())
        .count();
    let mut buttons_found = 0;

    for element in form.elements() {
        if element.is_disabled() || element.name().is_empty() {
            continue;
        }
        let name = strip_array_suffix(element.name());

        match element {
            Element::Field(field) => match &field.kind {
                FieldKind::Upload { .. } => {
                    if !request.files.contains_key(name) {
                        return SubmissionCheck::rejected(SubmissionReason::MissingUpload(
                            name.to_string(),
                        ));
                    }
                }
                FieldKind::Select(select) => {
                    // Nothing selected in a list box sends nothing.
                    let tolerated = select.option_count() == 0 || select.multiple;
                    if !tolerated && !bag.contains_key(name) {
                        return SubmissionCheck::rejected(SubmissionReason::MissingField(
                            name.to_string(),
                        ));
                    }
                }
                FieldKind::CheckBox { .. } | FieldKind::RadioButton { .. } => {}
                _ => {
                    if !bag.contains_key(name) {
                        return SubmissionCheck::rejected(SubmissionReason::MissingField(
                            name.to_string(),
                        ));
                    }
                }
            },
            Element::Button(button) => {
                let present = match &button.kind {
                    ButtonKind::Submit => bag.contains_key(name),
                    ButtonKind::Image { .. } => image_clicked(bag, name),
                    ButtonKind::Cancel { .. } | ButtonKind::Reset => continue,
                };
                if present {
                    buttons_found += 1;
                } else if significant == 1 {
                    return SubmissionCheck::rejected(SubmissionReason::MissingButton(
                        name.to_string(),
                    ));
                }
            }
        }
    }

    if significant > 0 && buttons_found == 0 {
        return SubmissionCheck::rejected(SubmissionReason::NoButtonEvidence);
    }

    SubmissionCheck {
        submitted: true,
        reason: SubmissionReason::Submitted,
    }
}

/// Image buttons send the click coordinates instead of their name.
fn image_clicked(bag: &ParamBag, name: &str) -> bool {
    bag.contains_key(&format!("{name}_x")) && bag.contains_key(&format!("{name}_y"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::ParamValue;

    #[test]
    fn test_reason_messages() {
        assert_eq!(
            SubmissionReason::NoRequestMethod.to_string(),
            "no request method known"
        );
        assert_eq!(
            SubmissionReason::PreviousResult.to_string(),
            "previous check result reused"
        );
        assert_eq!(
            SubmissionReason::MethodMismatch {
                expected: Method::Post,
                actual: "post".to_string()
            }
            .to_string(),
            "form expects POST but the request method is \"post\""
        );
    }

    #[test]
    fn test_image_click_needs_both_coordinates() {
        let mut bag = ParamBag::new();
        bag.insert("go_x".to_string(), ParamValue::from("3"));
        assert!(!image_clicked(&bag, "go"));
        bag.insert("go_y".to_string(), ParamValue::from("7"));
        assert!(image_clicked(&bag, "go"));
    }
}
