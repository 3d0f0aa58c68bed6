//! Field name parsing and parameter bag lookup.
//!
//! Field names may address nested request data with bracket groups:
//! `tags[]`, `record[1]`, `address[home][street]`.

use std::sync::LazyLock;

use regex::Regex;

use crate::request::{ParamBag, ParamValue};

static BRACKETED_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^\[\]]+)((?:\[[^\[\]]*\])+)$").unwrap());

static BRACKET_GROUP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\[\]]*)\]").unwrap());

/// Splits `a[b][c]` into the base key and its bracketed sub-keys.
///
/// Returns `None` for names without bracket groups.
pub fn parse_name(name: &str) -> Option<(String, Vec<String>)> {
    let caps = BRACKETED_NAME.captures(name)?;
    let base = caps.get(1)?.as_str().to_string();
    let keys = BRACKET_GROUP
        .captures_iter(caps.get(2)?.as_str())
        .filter_map(|group| group.get(1).map(|m| m.as_str().to_string()))
        .collect();
    Some((base, keys))
}

/// Strips the bracket suffix used for array fields: `files[]` and
/// `record[1][x]` both become their base key.
pub fn strip_array_suffix(name: &str) -> &str {
    match BRACKETED_NAME.captures(name).and_then(|caps| caps.get(1)) {
        Some(base) => base.as_str(),
        None => name,
    }
}

/// Resolves a field name against a parameter bag.
///
/// A direct key match wins. Otherwise the bracket groups are walked one
/// level at a time; an empty group (`[]`) yields the whole collection at
/// that level.
pub fn lookup<'a>(bag: &'a ParamBag, name: &str) -> Option<&'a ParamValue> {
    if let Some(value) = bag.get(name) {
        return Some(value);
    }

    let (base, keys) = parse_name(name)?;
    let mut current = bag.get(&base)?;
    for key in &keys {
        if key.is_empty() {
            break;
        }
        current = current.get(key)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bag(value: serde_json::Value) -> ParamBag {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_name() {
        assert_eq!(parse_name("plain"), None);
        assert_eq!(
            parse_name("a[b][c]"),
            Some(("a".to_string(), vec!["b".to_string(), "c".to_string()]))
        );
        assert_eq!(
            parse_name("tags[]"),
            Some(("tags".to_string(), vec![String::new()]))
        );
        assert_eq!(parse_name("broken[x"), None);
    }

    #[test]
    fn test_strip_array_suffix() {
        assert_eq!(strip_array_suffix("files[]"), "files");
        assert_eq!(strip_array_suffix("record[1][x]"), "record");
        assert_eq!(strip_array_suffix("name"), "name");
    }

    #[test]
    fn test_nested_lookup() {
        let present = bag(json!({"arr": {"1": {"x": "v"}}}));
        assert_eq!(lookup(&present, "arr[1][x]"), Some(&ParamValue::from("v")));

        let missing = bag(json!({"arr": {"1": {}}}));
        assert_eq!(lookup(&missing, "arr[1][x]"), None);
    }

    #[test]
    fn test_lookup_stops_at_scalars() {
        let data = bag(json!({"arr": "flat"}));
        assert_eq!(lookup(&data, "arr[1]"), None);
    }

    #[test]
    fn test_lookup_lists() {
        let data = bag(json!({"tags": ["a", "b"]}));
        assert_eq!(lookup(&data, "tags[]"), Some(&ParamValue::from(vec!["a", "b"])));
        assert_eq!(lookup(&data, "tags[1]"), Some(&ParamValue::from("b")));
        assert_eq!(lookup(&data, "tags[5]"), None);
    }

    #[test]
    fn test_direct_key_wins() {
        let data = bag(json!({"odd[key]": "direct", "odd": {"key": "nested"}}));
        assert_eq!(lookup(&data, "odd[key]"), Some(&ParamValue::from("direct")));
    }
}
