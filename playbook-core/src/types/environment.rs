use std::collections::BTreeMap;

use crate::types::AnyValue;

/// Declares which runtime values a playbook imports and under which name.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlaybookEnvironment {
    #[serde(default)]
    pub variables: BTreeMap<String, EnvironmentVariable>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EnvironmentVariable {
    /// Name looked up in the runtime `EnvData`.
    pub name: String,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<AnyValue>,
}

/// Runtime values supplied by the host; secrets take precedence over defaults.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EnvData {
    #[serde(default)]
    pub default: BTreeMap<String, AnyValue>,

    #[serde(default)]
    pub secrets: BTreeMap<String, AnyValue>,
}
