use std::sync::LazyLock;

use regex::Regex;

use crate::types::AnyValue;

pub(crate) static VARIABLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Za-z0-9_\-.$]+)\s*\}\}").expect("valid"));

static WHOLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\{\{\s*([A-Za-z0-9_\-.$]+)\s*\}\}$").expect("valid"));

/// Every referenced name in `input`, in order of appearance.
pub fn variable_names(input: &str) -> Vec<&str> {
    VARIABLE_RE
        .captures_iter(input)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

/// The name when `input` consists of exactly one reference.
pub fn whole_reference(input: &str) -> Option<&str> {
    WHOLE_RE
        .captures(input)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// String form used when a value is embedded inside a larger string.
pub fn stringify(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}
