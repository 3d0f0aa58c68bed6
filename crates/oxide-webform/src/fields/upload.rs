//! Upload field type.

use super::{Field, FieldKind};

impl Field {
    /// Creates a file upload field.
    pub fn upload(name: &str) -> Self {
        Self::new(name, FieldKind::Upload { accept: None })
    }

    /// Sets the `accept` hint rendered on an upload field.
    #[must_use]
    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        if let FieldKind::Upload { accept: slot } = &mut self.kind {
            *slot = Some(accept.into());
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_field() {
        let field = Field::upload("avatar").accept("image/*");
        assert_eq!(
            field.kind,
            FieldKind::Upload {
                accept: Some("image/*".to_string())
            }
        );
    }
}
