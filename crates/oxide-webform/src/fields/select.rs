//! Select field types.

use super::{Field, FieldKind};

/// One `<option>` of a select field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    /// Submitted value.
    pub value: String,
    /// Display label.
    pub label: String,
    /// Whether the option is selected before submission.
    pub selected: bool,
    /// Whether the option is disabled.
    pub disabled: bool,
}

impl SelectOption {
    /// Creates an option.
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            selected: false,
            disabled: false,
        }
    }

    /// Marks the option as selected.
    #[must_use]
    pub fn selected(mut self) -> Self {
        self.selected = true;
        self
    }

    /// Disables the option.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

/// A labelled group of options. Groups do not nest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Optgroup {
    /// Group label.
    pub label: String,
    /// Options in the group.
    pub options: Vec<SelectOption>,
}

impl Optgroup {
    /// Creates a group from (value, label) pairs.
    pub fn new(label: impl Into<String>, choices: Vec<(&str, &str)>) -> Self {
        Self {
            label: label.into(),
            options: choices
                .into_iter()
                .map(|(v, l)| SelectOption::new(v, l))
                .collect(),
        }
    }
}

/// A direct child of a select field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectEntry {
    /// A plain option.
    Option(SelectOption),
    /// A group of options.
    Group(Optgroup),
}

/// Options and selection mode of a select field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Select {
    /// Options and groups, in display order.
    pub entries: Vec<SelectEntry>,
    /// Whether several options may be selected.
    pub multiple: bool,
    /// Visible rows.
    pub size: Option<usize>,
}

impl Select {
    /// Iterates over all options, descending into groups.
    pub fn options(&self) -> impl Iterator<Item = &SelectOption> {
        self.entries.iter().flat_map(|entry| match entry {
            SelectEntry::Option(option) => std::slice::from_ref(option).iter(),
            SelectEntry::Group(group) => group.options.iter(),
        })
    }

    /// Returns the number of options, including grouped ones.
    pub fn option_count(&self) -> usize {
        self.options().count()
    }

    /// Returns whether an option with this value exists.
    pub fn has_option(&self, value: &str) -> bool {
        self.options().any(|option| option.value == value)
    }
}

impl Field {
    /// Creates a select field from (value, label) pairs.
    pub fn select(name: &str, choices: Vec<(&str, &str)>) -> Self {
        let entries = choices
            .into_iter()
            .map(|(v, l)| SelectEntry::Option(SelectOption::new(v, l)))
            .collect();
        Self::new(
            name,
            FieldKind::Select(Select {
                entries,
                ..Select::default()
            }),
        )
    }

    /// Allows several options to be selected. No effect on other kinds.
    #[must_use]
    pub fn multiple(mut self) -> Self {
        if let Some(select) = self.select_options_mut() {
            select.multiple = true;
        }
        self
    }

    /// Appends an option. No effect on other kinds.
    #[must_use]
    pub fn option(mut self, option: SelectOption) -> Self {
        if let Some(select) = self.select_options_mut() {
            select.entries.push(SelectEntry::Option(option));
        }
        self
    }

    /// Appends an option group. No effect on other kinds.
    #[must_use]
    pub fn optgroup(mut self, group: Optgroup) -> Self {
        if let Some(select) = self.select_options_mut() {
            select.entries.push(SelectEntry::Group(group));
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_field() {
        let field = Field::select("status", vec![("draft", "Draft"), ("published", "Published")]);
        let select = field.select_options().unwrap();
        assert_eq!(select.option_count(), 2);
        assert!(!select.multiple);
        assert!(select.has_option("draft"));
    }

    #[test]
    fn test_optgroups_are_searched() {
        let field = Field::select("car", vec![])
            .option(SelectOption::new("none", "None"))
            .optgroup(Optgroup::new("German", vec![("vw", "Volkswagen"), ("bmw", "BMW")]))
            .multiple();
        let select = field.select_options().unwrap();

        assert!(select.multiple);
        assert_eq!(select.option_count(), 3);
        assert!(select.has_option("bmw"));
        assert_eq!(
            select.options().map(|o| o.value.as_str()).collect::<Vec<_>>(),
            vec!["none", "vw", "bmw"]
        );
    }

    #[test]
    fn test_empty_select() {
        let field = Field::select("tags", vec![]).multiple();
        assert_eq!(field.select_options().unwrap().option_count(), 0);
    }
}
