//! Bootstrap 5 renderer.

use ironhtml::html;
use ironhtml::typed::Element;
use ironhtml_elements::{Div, Li, Ul};

use super::{element_id, Renderer};
use crate::fields::{Button, ButtonKind, Field, FieldKind, Select, SelectEntry, SelectOption};
use crate::filter::html_escape;
use crate::csrf::CSRF_FIELD;
use crate::form::Form;
use crate::request::ParamValue;

/// Renders forms with Bootstrap 5 classes.
#[derive(Debug, Clone, Default)]
pub struct BootstrapRenderer {
    /// Whether to list every error in an alert above the fields.
    pub error_summary: bool,
}

impl BootstrapRenderer {
    /// Creates a new renderer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables the error summary alert.
    #[must_use]
    pub fn with_error_summary(mut self) -> Self {
        self.error_summary = true;
        self
    }

    fn render_control(&self, form: &Form, field: &Field, id: &str, invalid: bool) -> String {
        let name = html_escape(&field.name);
        match &field.kind {
            FieldKind::Text => {
                let input_type = field.attrs.get("type").map_or("text", String::as_str);
                format!(
                    r#"<input type="{}" name="{name}" value="{}"{}>"#,
                    html_escape(input_type),
                    html_escape(&scalar_value(form, field)),
                    control_attrs(field, "form-control", id, invalid)
                )
            }
            // Passwords are never echoed back.
            FieldKind::Password => format!(
                r#"<input type="password" name="{name}"{}>"#,
                control_attrs(field, "form-control", id, invalid)
            ),
            FieldKind::TextArea { rows, cols } => format!(
                r#"<textarea name="{name}" rows="{rows}" cols="{cols}"{}>{}</textarea>"#,
                control_attrs(field, "form-control", id, invalid),
                html_escape(&scalar_value(form, field))
            ),
            FieldKind::CheckBox { .. } | FieldKind::RadioButton { .. } => {
                let input_type = if field.is_radio() { "radio" } else { "checkbox" };
                let checked_attr = if form.is_checked(field) { " checked" } else { "" };
                format!(
                    r#"<input type="{input_type}" name="{name}" value="{}"{}{checked_attr}>"#,
                    html_escape(&own_value(field)),
                    control_attrs(field, "form-check-input", id, invalid)
                )
            }
            FieldKind::Select(select) => self.render_select(form, field, select, id, invalid),
            FieldKind::Upload { accept } => {
                let accept_attr = accept
                    .as_ref()
                    .map(|a| format!(r#" accept="{}""#, html_escape(a)))
                    .unwrap_or_default();
                format!(
                    r#"<input type="file" name="{name}"{accept_attr}{}>"#,
                    control_attrs(field, "form-control", id, invalid)
                )
            }
            FieldKind::Hidden => {
                let value = match form.csrf_token() {
                    Some(token) if field.name == CSRF_FIELD => token.to_string(),
                    _ => scalar_value(form, field),
                };
                format!(
                    r#"<input type="hidden" name="{name}" id="{}" value="{}">"#,
                    html_escape(id),
                    html_escape(&value)
                )
            }
        }
    }

    fn render_select(
        &self,
        form: &Form,
        field: &Field,
        select: &Select,
        id: &str,
        invalid: bool,
    ) -> String {
        let chosen = form.current_value(field);
        let submitted = form.is_submitted();
        let is_selected = |option: &SelectOption| match &chosen {
            Some(value) => value.contains(&option.value),
            None => !submitted && option.selected,
        };

        let mut options = String::new();
        for entry in &select.entries {
            match entry {
                SelectEntry::Option(option) => {
                    options.push_str(&render_option(option, is_selected(option)));
                }
                SelectEntry::Group(group) => {
                    options.push_str(&format!(r#"<optgroup label="{}">"#, html_escape(&group.label)));
                    for option in &group.options {
                        options.push_str(&render_option(option, is_selected(option)));
                    }
                    options.push_str("</optgroup>");
                }
            }
        }

        // Browsers only send every selected option for `name[]`.
        let name = if select.multiple && !field.name.ends_with("[]") {
            format!("{}[]", field.name)
        } else {
            field.name.clone()
        };
        let multiple_attr = if select.multiple { " multiple" } else { "" };
        let size_attr = select
            .size
            .map(|size| format!(r#" size="{size}""#))
            .unwrap_or_default();

        format!(
            r#"<select name="{}"{multiple_attr}{size_attr}{}>{options}</select>"#,
            html_escape(&name),
            control_attrs(field, "form-select", id, invalid)
        )
    }

    fn wrap_check(&self, field: &Field, id: &str, control: &str, errors: &[String]) -> String {
        let label_html = field
            .label
            .as_deref()
            .map(|text| {
                html! {
                    label.for_(#id).class("form-check-label") { #text }
                }
                .render()
            })
            .unwrap_or_default();
        let help_text = field.help_text.clone();

        html! { div.class("form-check") }
            .raw(control)
            .raw(label_html)
            .children(errors.iter(), |error, div: Element<Div>| {
                div.class("invalid-feedback").text(error)
            })
            .when(help_text.is_some(), |d| {
                d.child::<Div, _>(|h| h.class("form-text").text(help_text.as_deref().unwrap_or("")))
            })
            .render()
    }

    fn wrap_field(&self, field: &Field, id: &str, control: &str, errors: &[String]) -> String {
        let label_html = field
            .label
            .as_ref()
            .map(|label| {
                let required_marker = if field.required { " *" } else { "" };
                let label_text = format!("{label}{required_marker}");
                html! {
                    label.for_(#id).class("form-label") { #label_text }
                }
                .render()
            })
            .unwrap_or_default();
        let help_text = field.help_text.clone();

        html! { div.class("mb-3") }
            .raw(label_html)
            .raw(control)
            .children(errors.iter(), |error, div: Element<Div>| {
                div.class("invalid-feedback").text(error)
            })
            .when(help_text.is_some(), |d| {
                d.child::<Div, _>(|h| h.class("form-text").text(help_text.as_deref().unwrap_or("")))
            })
            .render()
    }
}

impl Renderer for BootstrapRenderer {
    fn render_form(&self, form: &Form) -> String {
        let action = form.action();
        let method = form.method().as_str();
        let mut html_form = html! {
            form.action(#action).method(#method)
        }
        .attr("enctype", form.enctype().as_str())
        .attr("accept-charset", form.accept_charset());

        if !form.name().is_empty() {
            html_form = html_form.attr("name", form.name());
        }
        if let Some(target) = form.target() {
            html_form = html_form.attr("target", target);
        }

        // A form only holds flow content, so raw markup goes in wrapper divs.
        if self.error_summary {
            let errors = form.error_messages();
            if !errors.is_empty() {
                let summary = self.render_errors(&errors);
                html_form = html_form.child::<Div, _>(|d| d.raw(&summary));
            }
        }

        let hidden = self.render_hidden_block(form);
        if !hidden.is_empty() {
            html_form = html_form.child::<Div, _>(|d| d.class("d-none").raw(&hidden));
        }
        for element in form.elements() {
            if element.as_field().is_some_and(Field::is_hidden) {
                continue;
            }
            let element_html = self.render_element(form, element);
            html_form = html_form.child::<Div, _>(|d| d.raw(&element_html));
        }

        html_form.render()
    }

    fn render_field(&self, form: &Form, field: &Field) -> String {
        let id = field
            .attrs
            .id
            .clone()
            .unwrap_or_else(|| match &field.kind {
                FieldKind::RadioButton { .. } => {
                    element_id(&format!("{}_{}", field.name, own_value(field)))
                }
                _ => element_id(&field.name),
            });
        let errors = field.errors();
        let control = self.render_control(form, field, &id, !errors.is_empty());

        match field.kind {
            FieldKind::Hidden => control,
            FieldKind::CheckBox { .. } | FieldKind::RadioButton { .. } => {
                self.wrap_check(field, &id, &control, &errors)
            }
            _ => self.wrap_field(field, &id, &control, &errors),
        }
    }

    fn render_button(&self, button: &Button) -> String {
        let caption = html_escape(&button.caption);
        let name = html_escape(&button.name);
        let attrs = button_attrs(button);
        match &button.kind {
            ButtonKind::Submit => format!(
                r#"<button type="submit" name="{name}" value="{caption}"{}{attrs}>{caption}</button>"#,
                button_class(button, "btn btn-primary")
            ),
            ButtonKind::Image { src } => format!(
                r#"<input type="image" name="{name}" src="{}" alt="{caption}"{attrs}>"#,
                html_escape(src)
            ),
            ButtonKind::Cancel { url: Some(url) } => format!(
                r#"<a href="{}"{}{attrs}>{caption}</a>"#,
                html_escape(url),
                button_class(button, "btn btn-outline-secondary")
            ),
            ButtonKind::Cancel { url: None } => format!(
                r#"<button type="button" name="{name}"{}{attrs}>{caption}</button>"#,
                button_class(button, "btn btn-outline-secondary")
            ),
            ButtonKind::Reset => format!(
                r#"<button type="reset" name="{name}"{}{attrs}>{caption}</button>"#,
                button_class(button, "btn btn-outline-secondary")
            ),
        }
    }

    fn render_errors(&self, errors: &[String]) -> String {
        html! { div.class("alert alert-danger") }
            .attr("role", "alert")
            .child::<Ul, _>(|ul| {
                ul.class("mb-0")
                    .children(errors.iter(), |e, li: Element<Li>| li.text(e))
            })
            .render()
    }
}

fn render_option(option: &SelectOption, selected: bool) -> String {
    let selected_attr = if selected { " selected" } else { "" };
    let disabled_attr = if option.disabled { " disabled" } else { "" };
    format!(
        r#"<option value="{}"{selected_attr}{disabled_attr}>{}</option>"#,
        html_escape(&option.value),
        html_escape(&option.label)
    )
}

/// The value shown in a text-like control.
fn scalar_value(form: &Form, field: &Field) -> String {
    form.current_value(field)
        .as_ref()
        .and_then(ParamValue::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}

/// The value a checkbox or radio button sends when checked.
fn own_value(field: &Field) -> String {
    field
        .value
        .as_ref()
        .and_then(ParamValue::as_str)
        .unwrap_or("on")
        .to_string()
}

fn control_attrs(field: &Field, base_class: &str, id: &str, invalid: bool) -> String {
    let mut class = base_class.to_string();
    if let Some(extra) = &field.attrs.class {
        class = format!("{class} {extra}");
    }
    if invalid {
        class.push_str(" is-invalid");
    }

    let mut attrs = format!(r#" class="{}" id="{}""#, html_escape(&class), html_escape(id));
    for (key, value) in field.attrs.pairs() {
        if key == "type" {
            continue;
        }
        attrs.push_str(&format!(r#" {key}="{}""#, html_escape(&value)));
    }
    if field.disabled {
        attrs.push_str(" disabled");
    }
    if field.required {
        attrs.push_str(" required");
    }
    attrs
}

fn button_class(button: &Button, base_class: &str) -> String {
    let class = match &button.attrs.class {
        Some(extra) => format!("{base_class} {extra}"),
        None => base_class.to_string(),
    };
    format!(r#" class="{}""#, html_escape(&class))
}

fn button_attrs(button: &Button) -> String {
    let mut attrs = String::new();
    let id = match &button.attrs.id {
        Some(id) => Some(id.clone()),
        None if !button.name.is_empty() => Some(element_id(&button.name)),
        None => None,
    };
    if let Some(id) = id {
        attrs.push_str(&format!(r#" id="{}""#, html_escape(&id)));
    }
    for (key, value) in button.attrs.pairs() {
        attrs.push_str(&format!(r#" {key}="{}""#, html_escape(&value)));
    }
    if button.disabled {
        attrs.push_str(" disabled");
    }
    attrs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Request;

    fn form() -> Form {
        Form::builder("t")
            .csrf_protection(false)
            .build(Request::new())
            .unwrap()
    }

    #[test]
    fn test_text_field_markup() {
        let mut form = form();
        form.text_field("email", "Email")
            .set_value("a&b");
        let field = form.field("email").unwrap();
        let html = BootstrapRenderer::new().render_field(&form, field);
        assert!(html.contains(r#"class="form-control""#));
        assert!(html.contains(r#"id="id_email""#));
        assert!(html.contains(r#"value="a&amp;b""#));
        assert!(html.contains("form-label"));
    }

    #[test]
    fn test_password_not_echoed() {
        let mut form = form();
        form.password_field("secret", "Secret").set_value("hunter2");
        let html = BootstrapRenderer::new().render_field(&form, form.field("secret").unwrap());
        assert!(html.contains(r#"type="password""#));
        assert!(!html.contains("hunter2"));
    }

    #[test]
    fn test_select_with_groups() {
        let mut form = form();
        form.add_field(
            Field::select("car", vec![("none", "None")])
                .optgroup(crate::fields::Optgroup::new("German", vec![("vw", "VW")]))
                .value("vw"),
        );
        let html = BootstrapRenderer::new().render_field(&form, form.field("car").unwrap());
        assert!(html.contains(r#"<optgroup label="German">"#));
        assert!(html.contains(r#"<option value="vw" selected>VW</option>"#));
        assert!(html.contains(r#"<option value="none">None</option>"#));
    }

    #[test]
    fn test_buttons() {
        let renderer = BootstrapRenderer::new();
        let html = renderer.render_button(&Button::submit("save", "Save"));
        assert!(html.contains(r#"type="submit""#));
        assert!(html.contains(r#"name="save""#));

        let html = renderer.render_button(&Button::image("go", "/go.png"));
        assert!(html.contains(r#"type="image""#));
        assert!(html.contains(r#"src="/go.png""#));

        let html = renderer.render_button(&Button::cancel("back", "Back", Some("/list")));
        assert!(html.starts_with(r#"<a href="/list""#));
    }

    #[test]
    fn test_error_summary() {
        let html = BootstrapRenderer::new().render_errors(&["Broken".to_string()]);
        assert!(html.contains("alert alert-danger"));
        assert!(html.contains("Broken"));
    }

    #[test]
    fn test_form_wraps_each_element() {
        let mut form = form();
        form.hidden_field("step", "2");
        form.text_field("name", "Name");
        form.submit_button("save", "Save");

        let html = form.render();
        assert!(html.starts_with("<form"));
        assert!(html.ends_with("</form>"));
        assert!(html.contains(r#"<div class="d-none"><input type="hidden" name="step""#));
        assert!(html.contains(r#"<div><div class="mb-3">"#));
        assert!(html.contains(r#"<div><button type="submit" name="save""#));
    }
}
