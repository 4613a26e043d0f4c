use std::collections::BTreeMap;

use crate::types::{Credential, PlaybookEnvironment, Request, RequestRef, RefType, Stage};

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlaybookBundle {
    #[serde(default)]
    pub operations: BTreeMap<String, Operation>,

    #[serde(default)]
    pub requests: BTreeMap<String, Request>,

    /// Global block executed before every operation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub before: Vec<Stage>,

    /// Global block executed after every operation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub after: Vec<Stage>,

    #[serde(default, rename = "authenticationDetails")]
    pub authentication_details: Vec<BTreeMap<String, Credential>>,

    #[serde(default)]
    pub environments: BTreeMap<String, PlaybookEnvironment>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "runtimeConfiguration")]
    pub runtime_configuration: Option<RuntimeConfiguration>,
}

impl PlaybookBundle {
    pub fn request_by_ref(&self, reference: &RequestRef) -> Option<&Request> {
        match reference.r#type {
            RefType::Operation => self.operations.get(&reference.id).map(|op| &op.request),
            RefType::Request => self.requests.get(&reference.id),
        }
    }

    /// Looks a credential up across all authentication groups, first group wins.
    pub fn credential(&self, name: &str) -> Option<&Credential> {
        self.authentication_details
            .iter()
            .find_map(|group| group.get(name))
    }

    pub fn environment_name(&self) -> &str {
        self.runtime_configuration
            .as_ref()
            .and_then(|rc| rc.environment.as_deref())
            .filter(|name| !name.is_empty())
            .unwrap_or("default")
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Operation {
    pub request: Request,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub before: Vec<Stage>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub after: Vec<Stage>,

    #[serde(default)]
    pub scenarios: BTreeMap<String, Scenario>,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub requests: Vec<Stage>,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RuntimeConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
}
