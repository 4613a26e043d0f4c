//! Layered variable scopes.
//!
//! A stack is an ordered list of shared, immutable entries. Lookups walk it
//! from the end, so later (inner) entries shadow earlier (outer) ones. New
//! scopes are introduced by building a new stack, never by editing an entry.

use std::sync::Arc;

use crate::types::{AnyValue, EnvData, Environment, PlaybookBundle, PlaybookEnvironment};

pub type EnvStack = Vec<Arc<PlaybookEnv>>;

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlaybookEnv {
    pub id: String,
    pub env: Environment,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assignments: Vec<AssignedVariable>,
}

impl PlaybookEnv {
    pub fn new(id: impl Into<String>, env: Environment) -> Self {
        Self {
            id: id.into(),
            env,
            assignments: Vec::new(),
        }
    }

    pub fn empty(id: impl Into<String>) -> Self {
        Self::new(id, Environment::new())
    }

    pub fn get(&self, name: &str) -> Option<&AnyValue> {
        self.env.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.env.is_empty()
    }
}

/// A variable produced by a response-processing rule.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AssignedVariable {
    pub name: String,
    pub value: AnyValue,
}

/// Finds `name`, innermost entry first.
pub fn resolve<'a>(name: &str, stack: &'a [Arc<PlaybookEnv>]) -> Option<(&'a AnyValue, &'a PlaybookEnv)> {
    stack
        .iter()
        .rev()
        .find_map(|entry| entry.get(name).map(|value| (value, entry.as_ref())))
}

/// Concatenates stacks, outermost first.
pub fn compose(parts: &[&[Arc<PlaybookEnv>]]) -> EnvStack {
    parts.iter().flat_map(|part| part.iter().cloned()).collect()
}

/// The `environment` entry built from a declared environment and runtime data,
/// plus the required names nothing provided.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvEnv {
    pub env: PlaybookEnv,
    pub missing: Vec<String>,
}

pub const ENVIRONMENT_ENTRY_ID: &str = "environment";

pub fn make_env_env(environment: &PlaybookEnvironment, env_data: &EnvData) -> EnvEnv {
    let mut env = Environment::new();
    let mut missing = Vec::new();

    for (var_name, var) in &environment.variables {
        let provided = env_data
            .secrets
            .get(&var.name)
            .or_else(|| env_data.default.get(&var.name));

        match (provided, &var.default) {
            (Some(value), _) => {
                env.insert(var_name.clone(), value.clone());
            }
            (None, Some(default)) if !var.required => {
                env.insert(var_name.clone(), default.clone());
            }
            (None, _) if var.required => missing.push(var.name.clone()),
            (None, _) => {}
        }
    }

    EnvEnv {
        env: PlaybookEnv::new(ENVIRONMENT_ENTRY_ID, env),
        missing,
    }
}

/// Builds the entry for the environment selected by the bundle's runtime
/// configuration. An undeclared environment yields an empty entry.
pub fn get_external_environment(bundle: &PlaybookBundle, env_data: &EnvData) -> EnvEnv {
    match bundle.environments.get(bundle.environment_name()) {
        Some(environment) => make_env_env(environment, env_data),
        None => EnvEnv {
            env: PlaybookEnv::empty(ENVIRONMENT_ENTRY_ID),
            missing: Vec::new(),
        },
    }
}
