use std::collections::BTreeMap;

use crate::types::{AnyValue, Environment, ResponseCode, Responses};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Request {
    /// Absent for external requests, which never carry operation security.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "operationId")]
    pub operation_id: Option<String>,

    #[serde(default, skip_serializing_if = "Environment::is_empty")]
    pub environment: Environment,

    /// Credential references in `credential[/method]` form.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub auth: Vec<String>,

    #[serde(rename = "defaultResponse")]
    pub default_response: ResponseCode,

    #[serde(default, skip_serializing_if = "Responses::is_empty")]
    pub responses: Responses,

    #[serde(default)]
    pub request: RequestTemplate,
}

impl Request {
    pub fn is_external(&self) -> bool {
        self.operation_id.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RequestTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    #[serde(default)]
    pub parameters: RequestParameters,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<RequestBody>,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RequestParameters {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub query: BTreeMap<String, AnyValue>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub header: BTreeMap<String, AnyValue>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub path: BTreeMap<String, AnyValue>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub cookie: BTreeMap<String, AnyValue>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RequestBody {
    #[serde(rename = "mediaType")]
    pub media_type: String,

    pub value: AnyValue,
}
