//! Tests for field validation.

mod common;
use common::*;

use oxide_webform::validation::{
    Check, DecimalMode, EmailValidator, EqualsValidator, FloatValidator, FunctionValidator,
    ImageUploadValidator, IsOptionValidator, NumberValidator, RadioButtonCheckedValidator,
    RegexValidator, SameFieldsValidator, StringValidator, UploadValidator, UrlValidator,
    Validator,
};
use oxide_webform::{Field, Form, FormError, ParamValue, Request, UploadStatus, UploadedFile};
use rust_decimal::Decimal;
use serde_json::json;

/// Submits `value` for a single text field guarded by `validator`.
fn check_text(value: &str, validator: impl Validator + 'static) -> bool {
    let mut form = form(post(json!({ "field": value })));
    form.text_field("field", "Field")
        .add_validator(validator)
        .unwrap();
    form.is_valid().unwrap()
}

#[test]
fn string_length_bounds() {
    let validator = || StringValidator::new(2, 10).required();
    assert!(!check_text("", validator()));
    assert!(!check_text("a", validator()));
    assert!(check_text("ab", validator()));
    assert!(check_text("abcdef", validator()));
    assert!(check_text("abcdefghij", validator()));
    assert!(!check_text("abcdefghijk", validator()));
}

#[test]
fn string_length_counts_chars() {
    assert!(check_text("héllo", StringValidator::new(5, 5)));
}

#[test]
fn optional_validators_accept_empty() {
    assert!(check_text("", StringValidator::new(2, 10)));
    assert!(check_text("", NumberValidator::new(Some(1), Some(5))));
    assert!(check_text("", EmailValidator::new()));
}

#[test]
fn float_decimal_modes() {
    let both = || FloatValidator::new(None, None).mode(DecimalMode::PointOrComma);
    assert!(check_text("1.5", both()));
    assert!(check_text("1,5", both()));

    let point = || FloatValidator::new(None, None).mode(DecimalMode::Point);
    assert!(check_text("1.5", point()));
    assert!(!check_text("1,5", point()));

    let comma = || FloatValidator::new(None, None).mode(DecimalMode::Comma);
    assert!(check_text("1,5", comma()));
    assert!(!check_text("1.5", comma()));
}

#[test]
fn float_bounds_are_exact() {
    let validator = || FloatValidator::new(Some(Decimal::new(-5, 1)), Some(Decimal::new(23, 1)));
    assert!(check_text("2.3", validator()));
    assert!(check_text("2.30", validator()));
    assert!(!check_text("2.31", validator()));
    assert!(check_text("-0.5", validator()));
    assert!(!check_text("-0.6", validator()));
    assert!(!check_text("abc", validator()));
}

#[test]
fn number_grammar_and_range() {
    let validator = || NumberValidator::new(Some(1), Some(10)).required();
    assert!(check_text("1", validator()));
    assert!(check_text("10", validator()));
    assert!(!check_text("11", validator()));
    assert!(!check_text("1.5", validator()));
    assert!(!check_text("", validator()));
}

#[test]
fn regex_not() {
    let validator = || {
        RegexValidator::new("/^[a-z]+$/", "Must contain something else.")
            .unwrap()
            .not()
    };
    assert!(check_text("Piet06", validator()));
    assert!(!check_text("pieter", validator()));
}

#[test]
fn regex_flags() {
    let validator = || RegexValidator::new("/^[a-z]+$/i", "Letters only.").unwrap();
    assert!(check_text("PiEtEr", validator()));
    assert!(!check_text("Piet06", validator()));
}

#[test]
fn regex_rejects_bad_pattern() {
    assert!(matches!(
        RegexValidator::new("([a-z", "x"),
        Err(FormError::InvalidPattern(_))
    ));
}

#[test]
fn email_and_url() {
    assert!(check_text("ada@example.org", EmailValidator::new()));
    assert!(!check_text("ada@", EmailValidator::new()));
    assert!(check_text("https://example.org/a?b=c", UrlValidator::new()));
    assert!(!check_text("example.org", UrlValidator::new()));
}

#[test]
fn every_validator_runs_in_order() {
    let mut form = form(post(json!({ "code": "x" })));
    form.text_field("code", "Code")
        .add_validator(StringValidator::new(3, 0).with_message("Too short."))
        .unwrap()
        .add_validator(NumberValidator::new(None, None).with_message("Not a number."))
        .unwrap();

    assert!(!form.is_valid().unwrap());
    assert_eq!(
        form.field("code").unwrap().errors(),
        vec!["Too short.".to_string(), "Not a number.".to_string()]
    );
}

#[test]
fn form_validity_does_not_short_circuit() {
    let mut form = form(post(json!({ "a": "", "b": "" })));
    form.text_field("a", "A")
        .add_validator(StringValidator::new(1, 0).required().with_message("A is required."))
        .unwrap();
    form.text_field("b", "B")
        .add_validator(StringValidator::new(1, 0).required().with_message("B is required."))
        .unwrap();

    assert!(!form.is_valid().unwrap());
    assert_eq!(
        form.error_messages(),
        vec!["A is required.".to_string(), "B is required.".to_string()]
    );
    let errors = form.validation_errors();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors.errors[0].0, "a");
}

#[test]
fn field_validity_is_cached() {
    let mut form = form(post(json!({ "name": "" })));
    form.text_field("name", "Name")
        .add_validator(StringValidator::new(1, 0).required())
        .unwrap();

    assert!(!form.is_valid().unwrap());
    assert!(!form.is_valid().unwrap());
    assert_eq!(form.error_messages().len(), 1);

    form.request_mut()
        .body
        .insert("name".to_string(), ParamValue::from("Ada"));
    form.clear_cache();
    assert!(form.is_valid().unwrap());
    assert!(form.error_messages().is_empty());
}

#[test]
fn fields_without_validators_are_valid() {
    let mut form = form(post(json!({ "free": "anything" })));
    form.text_field("free", "Free");
    assert!(form.is_valid().unwrap());
}

#[test]
fn scalar_validators_reject_lists() {
    let mut form = form(post(json!({ "tags": ["a", "b"] })));
    form.text_field("tags[]", "Tags")
        .add_validator(StringValidator::new(1, 10))
        .unwrap();

    assert!(matches!(
        form.is_valid(),
        Err(FormError::NonScalarValue { field, .. }) if field == "tags[]"
    ));
}

#[test]
fn same_fields() {
    let build = |password: &str, confirm: &str| {
        let mut form = form(post(json!({ "password": password, "confirm": confirm })));
        form.password_field("password", "Password");
        form.password_field("confirm", "Confirm")
            .add_validator(SameFieldsValidator::new("password").unwrap())
            .unwrap();
        form
    };
    assert!(build("s3cret", "s3cret").is_valid().unwrap());
    assert!(!build("s3cret", "secret").is_valid().unwrap());
}

#[test]
fn same_fields_not_and_unresolved() {
    let mut form = form(post(json!({ "old": "a", "new": "a" })));
    form.password_field("old", "Old");
    form.password_field("new", "New")
        .add_validator(SameFieldsValidator::new("old").unwrap().not())
        .unwrap();
    assert!(!form.is_valid().unwrap());

    let mut form = common::form(post(json!({ "new": "a" })));
    form.password_field("new", "New")
        .add_validator(SameFieldsValidator::new("missing").unwrap())
        .unwrap();
    assert!(matches!(
        form.is_valid(),
        Err(FormError::UnresolvedField { reference, .. }) if reference == "missing"
    ));

    assert!(matches!(
        SameFieldsValidator::new("bad name"),
        Err(FormError::InvalidFieldReference(_))
    ));
}

#[test]
fn equals_on_checkbox_compares_checked_state() {
    let build = |body: serde_json::Value| {
        let mut form = form(post(body));
        form.check_box("terms", "I agree", "yes")
            .add_validator(EqualsValidator::new(true).required().with_message("Accept the terms."))
            .unwrap();
        form
    };
    assert!(build(json!({ "terms": "yes" })).is_valid().unwrap());

    let form = build(json!({}));
    assert!(!form.is_valid().unwrap());
    assert_eq!(form.error_messages(), vec!["Accept the terms.".to_string()]);
}

#[test]
fn equals_literal() {
    assert!(check_text("blue", EqualsValidator::new("blue")));
    assert!(!check_text("red", EqualsValidator::new("blue")));
    assert!(check_text("red", EqualsValidator::new("blue").not()));
}

#[test]
fn is_option_single_and_multiple() {
    let mut form = form(post(json!({ "size": "m" })));
    form.select_field("size", "Size", vec![("s", "S"), ("m", "M")])
        .add_validator(IsOptionValidator::new())
        .unwrap();
    assert!(form.is_valid().unwrap());

    let mut form = common::form(post(json!({ "size": "xl" })));
    form.select_field("size", "Size", vec![("s", "S"), ("m", "M")])
        .add_validator(IsOptionValidator::new())
        .unwrap();
    assert!(!form.is_valid().unwrap());

    // A list for a single select is tampering.
    let mut form = common::form(post(json!({ "size": ["s", "m"] })));
    form.select_field("size", "Size", vec![("s", "S"), ("m", "M")])
        .add_validator(IsOptionValidator::new())
        .unwrap();
    assert!(!form.is_valid().unwrap());

    let mut form = common::form(post(json!({ "tags": ["a", "c"] })));
    form.add_field(
        Field::select("tags[]", vec![("a", "A")])
            .optgroup(oxide_webform::Optgroup::new("More", vec![("c", "C")]))
            .multiple(),
    )
    .add_validator(IsOptionValidator::new().required())
    .unwrap();
    assert!(form.is_valid().unwrap());
}

#[test]
fn radio_group_needs_a_checked_button() {
    let build = |body: serde_json::Value| {
        let mut form = form(post(body));
        form.radio_button("color", "Red", "red")
            .add_validator(RadioButtonCheckedValidator::new())
            .unwrap();
        form.radio_button("color", "Blue", "blue");
        form
    };
    assert!(build(json!({ "color": "blue" })).is_valid().unwrap());
    assert!(!build(json!({})).is_valid().unwrap());
}

#[test]
fn wrong_targets_fail_at_attach_time() {
    let mut form = form(Request::post());
    let result = form
        .text_field("size", "Size")
        .add_validator(IsOptionValidator::new());
    assert!(matches!(result, Err(FormError::ValidatorTarget { .. })));

    assert!(Field::text("avatar").validator(UploadValidator::new()).is_err());
    assert!(Field::checkbox("c", "1")
        .validator(RadioButtonCheckedValidator::new())
        .is_err());
}

#[test]
fn function_validator() {
    let reserved = || {
        FunctionValidator::new(|ctx| {
            if ctx.value().and_then(ParamValue::as_str) == Some("admin") {
                Check::from("This name is reserved.")
            } else {
                Check::Valid
            }
        })
    };
    assert!(check_text("ada", reserved()));

    let mut form = form(post(json!({ "field": "admin" })));
    form.text_field("field", "Field")
        .add_validator(reserved())
        .unwrap();
    assert!(!form.is_valid().unwrap());
    assert_eq!(form.error_messages(), vec!["This name is reserved.".to_string()]);

    let never = FunctionValidator::new(|_| false).with_message("Nope.");
    assert!(!check_text("", never));
}

#[test]
fn function_validator_fails_silently_without_message() {
    let mut form = form(post(json!({ "field": "anything" })));
    form.text_field("field", "Field")
        .add_validator(FunctionValidator::new(|_| false))
        .unwrap();

    assert!(!form.is_valid().unwrap());
    assert!(form.error_messages().is_empty());
    assert!(form.field("field").unwrap().errors().is_empty());

    let mut form = common::form(post(json!({ "field": "anything" })));
    form.text_field("field", "Field")
        .add_validator(FunctionValidator::new(|_| false).with_message("Nope."))
        .unwrap();
    assert!(!form.is_valid().unwrap());
    assert_eq!(form.error_messages(), vec!["Nope.".to_string()]);
}

fn upload_form(file: UploadedFile, validator: impl Validator + 'static) -> Form {
    let request = post(json!({})).file("upload", file);
    let mut form = form(request);
    form.upload_field("upload", "Upload")
        .add_validator(validator)
        .unwrap();
    form
}

#[test]
fn upload_checks() {
    let fixture = bytes_fixture(b"hello world");

    let form = upload_form(upload("notes.txt", &fixture), UploadValidator::new());
    assert!(form.is_valid().unwrap());

    let validator = UploadValidator::new().extensions(&["pdf"]);
    let form = upload_form(upload("notes.txt", &fixture), validator);
    assert!(!form.is_valid().unwrap());

    let validator = UploadValidator::new().max_size(4);
    let form = upload_form(upload("notes.txt", &fixture), validator);
    assert!(!form.is_valid().unwrap());

    let broken = upload("notes.txt", &fixture).status(UploadStatus::Partial);
    let form = upload_form(broken, UploadValidator::new());
    assert!(!form.is_valid().unwrap());

    let gone = UploadedFile::new("ghost.txt", "/nonexistent/ghost.txt", 10);
    let form = upload_form(gone, UploadValidator::new());
    assert!(!form.is_valid().unwrap());
}

#[test]
fn upload_required() {
    let form = upload_form(UploadedFile::empty(), UploadValidator::new());
    assert!(form.is_valid().unwrap());

    let form = upload_form(UploadedFile::empty(), UploadValidator::new().required());
    assert!(!form.is_valid().unwrap());
}

#[test]
fn image_dimensions_and_ratio() {
    let fixture = png_fixture(160, 90);

    let validator = ImageUploadValidator::new()
        .allow_ratio("16:9")
        .unwrap()
        .min_width(100);
    let form = upload_form(upload("banner.png", &fixture), validator);
    assert!(form.is_valid().unwrap());

    let validator = ImageUploadValidator::new()
        .deny_ratio("16:9")
        .unwrap()
        .min_width(200)
        .max_height(50);
    let form = upload_form(upload("banner.png", &fixture), validator);
    assert!(!form.is_valid().unwrap());
    assert_eq!(form.error_messages().len(), 3);
}

#[test]
fn image_must_decode() {
    let fixture = bytes_fixture(b"definitely not a png");
    let form = upload_form(upload("fake.png", &fixture), ImageUploadValidator::new());
    assert!(!form.is_valid().unwrap());
    assert_eq!(
        form.error_messages(),
        vec!["The uploaded file is not a valid image.".to_string()]
    );
}

#[test]
fn image_rejects_bad_ratio_spec() {
    assert!(matches!(
        ImageUploadValidator::new().allow_ratio("sixteen:nine"),
        Err(FormError::InvalidRatio(_))
    ));
}
