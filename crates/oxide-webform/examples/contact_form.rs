//! Contact form demo.
//!
//! Builds a CSRF protected contact form, renders it for a first visit, then
//! replays a POST carrying the issued token and an invalid email address.

use std::sync::Arc;

use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_webform::validation::{EmailValidator, IsOptionValidator, StringValidator};
use oxide_webform::{CsrfLedger, Form, Request, TrimFilter, CSRF_FIELD};

fn contact_form(request: Request, ledger: CsrfLedger) -> anyhow::Result<Form> {
    let mut form = Form::builder("contact")
        .action("/contact")
        .csrf_protection(true)
        .csrf_ledger(ledger)
        .encoding_filter(Arc::new(TrimFilter))
        .build(request)?;

    form.text_field("name", "Name")
        .add_validator(StringValidator::new(2, 80).required())?;
    form.text_field("email", "Email")
        .add_validator(EmailValidator::new().required())?;
    form.select_field(
        "topic",
        "Topic",
        vec![("sales", "Sales"), ("support", "Support")],
    )
    .add_validator(IsOptionValidator::new().required())?;
    form.text_area("message", "Message", 6)
        .add_validator(StringValidator::new(10, 2000).required())?;
    form.submit_button("send", "Send");
    Ok(form)
}

fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // First visit: nothing submitted, a token is issued.
    let form = contact_form(Request::get(), CsrfLedger::new())?;
    info!(submitted = form.is_submitted(), "first visit");
    println!("{}\n", form.render());

    let token = form
        .field(CSRF_FIELD)
        .and_then(|field| field.value.clone())
        .and_then(|value| value.as_str().map(str::to_string))
        .unwrap_or_default();
    // The host would store this in the session.
    let session = form.csrf_ledger().to_json()?;

    // Second visit: the browser posts the form back.
    let body = format!(
        "name=+Ada+Lovelace+&email=ada%40invalid&topic=support&message=Hello+there%2C+engines!&send=Send&{CSRF_FIELD}={token}"
    );
    let form = contact_form(
        Request::post().form_body(&body),
        CsrfLedger::from_json(&session)?,
    )?;

    let check = form.submission_check();
    info!(submitted = check.submitted, reason = %check.reason, "form posted");
    info!(csrf_valid = form.is_csrf_valid()?, "token checked");

    if form.is_valid()? {
        info!("message accepted");
    } else {
        for (field, message) in form.validation_errors().all_errors() {
            warn!(field, message, "rejected");
        }
        println!("{}", form.render());
    }
    Ok(())
}
