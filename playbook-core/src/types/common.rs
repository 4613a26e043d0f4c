use std::collections::BTreeMap;

pub type AnyValue = serde_json::Value;

/// Variable overrides attached to a stage or request, before substitution.
pub type Environment = BTreeMap<String, AnyValue>;
