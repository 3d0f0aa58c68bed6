//! Rendering forms to HTML.
//!
//! A [`Renderer`] reads the form's decisions (current values, checked
//! states, collected errors) and turns them into markup. It never changes
//! form state.

mod bootstrap;

pub use bootstrap::BootstrapRenderer;

use std::sync::Arc;

use crate::fields::{Button, Element, Field};
use crate::form::Form;

/// Shared handle to a renderer.
pub type SharedRenderer = Arc<dyn Renderer>;

/// Trait for form renderers.
pub trait Renderer: Send + Sync {
    /// Renders the complete form.
    fn render_form(&self, form: &Form) -> String;

    /// Renders one element.
    fn render_element(&self, form: &Form, element: &Element) -> String {
        match element {
            Element::Field(field) => self.render_field(form, field),
            Element::Button(button) => self.render_button(button),
        }
    }

    /// Renders a field with its label, errors and help text.
    fn render_field(&self, form: &Form, field: &Field) -> String;

    /// Renders a button.
    fn render_button(&self, button: &Button) -> String;

    /// Renders all hidden fields.
    fn render_hidden_block(&self, form: &Form) -> String {
        form.fields()
            .filter(|field| field.is_hidden())
            .map(|field| self.render_field(form, field))
            .collect()
    }

    /// Renders a list of error messages.
    fn render_errors(&self, errors: &[String]) -> String;
}

/// Derives an element id from a (possibly bracketed) name:
/// `record[1][x]` becomes `id_record_1_x`.
pub fn element_id(name: &str) -> String {
    let mut id = String::from("id_");
    for c in name.chars() {
        match c {
            '[' => id.push('_'),
            ']' => {}
            c if c.is_alphanumeric() || c == '-' || c == '_' => id.push(c),
            _ => id.push('_'),
        }
    }
    id.trim_end_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_id() {
        assert_eq!(element_id("email"), "id_email");
        assert_eq!(element_id("record[1][x]"), "id_record_1_x");
        assert_eq!(element_id("tags[]"), "id_tags");
        assert_eq!(element_id("first name"), "id_first_name");
    }
}
