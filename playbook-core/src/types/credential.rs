use std::collections::BTreeMap;

use crate::types::Stage;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Credential {
    /// Scheme hints, used when the OpenAPI document does not declare the scheme.
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "type")]
    pub kind: Option<SecuritySchemeKind>,

    #[serde(default, skip_serializing_if = "Option::is_none", rename = "in")]
    pub location: Option<SecuritySchemeLocation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub default: String,

    #[serde(default)]
    pub methods: BTreeMap<String, CredentialMethod>,
}

impl Credential {
    pub fn declared_scheme(&self) -> Option<SecurityScheme> {
        self.kind.map(|kind| SecurityScheme {
            kind,
            location: self.location,
            name: self.name.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CredentialMethod {
    /// Credential value template, substituted at resolution time.
    pub credential: String,

    /// Stages executed to obtain the value (e.g. a token endpoint).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests: Option<Vec<Stage>>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SecurityScheme {
    pub kind: SecuritySchemeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SecuritySchemeLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SecuritySchemeKind {
    ApiKey,
    Basic,
    Bearer,
    Oauth2,
    OpenIdConnect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecuritySchemeLocation {
    Header,
    Query,
    Cookie,
}
