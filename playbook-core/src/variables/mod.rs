//! `{{name}}` substitution against an environment stack.

mod substitute;
mod template;

pub use substitute::{
    replace_credential_variables, replace_environment_variables, replace_request_variables,
};
pub use template::{stringify, variable_names, whole_reference};

use crate::types::AnyValue;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FoundVariable {
    pub name: String,
    pub value: AnyValue,
    /// Id of the stack entry the value came from.
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MissingVariable {
    pub name: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Replacement<T> {
    pub value: T,
    pub found: Vec<FoundVariable>,
    pub missing: Vec<MissingVariable>,
}

impl<T> Replacement<T> {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Comma separated, deduplicated names in first-seen order.
pub fn missing_variable_names(missing: &[MissingVariable]) -> String {
    let mut names: Vec<&str> = Vec::new();
    for m in missing {
        if !names.contains(&m.name.as_str()) {
            names.push(&m.name);
        }
    }
    names.join(", ")
}
