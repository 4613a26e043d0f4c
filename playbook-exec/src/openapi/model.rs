use std::collections::BTreeMap;

use playbook_core::types::SecurityScheme;

use crate::openapi::loader::{load_openapi, parse_openapi_str, OpenApiError};

/// An OpenAPI (3.x) or Swagger (2.0) document kept as raw JSON.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct OpenApiDoc {
    /// Original location (URL or file path) used to load; empty when built in memory.
    pub source_url: String,
    pub raw: serde_json::Value,
}

impl OpenApiDoc {
    pub fn from_value(raw: serde_json::Value) -> Self {
        Self {
            source_url: String::new(),
            raw,
        }
    }

    pub fn parse_str(input: &str) -> Result<Self, OpenApiError> {
        Ok(Self::from_value(parse_openapi_str(input)?))
    }

    pub async fn load(client: &reqwest::Client, url_or_path: &str) -> Result<Self, OpenApiError> {
        Ok(Self {
            source_url: url_or_path.to_string(),
            raw: load_openapi(client, url_or_path).await?,
        })
    }

    pub fn operation(&self, operation_id: &str) -> Option<ResolvedOperation> {
        crate::openapi::op_id::find_operation_by_id(&self.raw, operation_id)
    }

    pub fn security_scheme(&self, name: &str) -> Option<SecurityScheme> {
        crate::openapi::security::find_security_scheme(&self.raw, name)
    }

    /// First document-level server, or the Swagger `schemes`/`host`/`basePath` triple.
    pub fn default_server(&self) -> Option<String> {
        crate::openapi::shape::document_base_url(&self.raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ResolvedOperation {
    pub operation_id: String,
    pub method: String,
    pub path: String,
    /// Selected from operation, path-item or document servers; empty when none is declared.
    pub base_url: String,
    pub parameters: Vec<OpenApiParam>,
}

impl ResolvedOperation {
    pub fn required_params(&self, location: OpenApiParamLocation) -> impl Iterator<Item = &OpenApiParam> {
        self.parameters
            .iter()
            .filter(move |p| p.required && p.location == location)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OpenApiParam {
    pub name: String,
    pub location: OpenApiParamLocation,
    pub required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenApiParamLocation {
    Path,
    Query,
    Header,
    Cookie,
}

pub(crate) fn location_from_str(s: &str) -> Option<OpenApiParamLocation> {
    match s {
        "path" => Some(OpenApiParamLocation::Path),
        "query" => Some(OpenApiParamLocation::Query),
        "header" => Some(OpenApiParamLocation::Header),
        "cookie" => Some(OpenApiParamLocation::Cookie),
        _ => None,
    }
}

pub(crate) fn method_keys() -> &'static [&'static str] {
    &[
        "get", "put", "post", "delete", "options", "head", "patch", "trace",
    ]
}

pub(crate) fn extract_parameter_obj(p: &serde_json::Value) -> Option<OpenApiParam> {
    let name = p.get("name").and_then(|v| v.as_str())?;
    let loc = p
        .get("in")
        .and_then(|v| v.as_str())
        .and_then(location_from_str)?;
    let required = loc == OpenApiParamLocation::Path
        || p.get("required").and_then(|v| v.as_bool()).unwrap_or(false);
    Some(OpenApiParam {
        name: name.to_string(),
        location: loc,
        required,
    })
}

/// Operation-level parameters override path-level ones with the same name and location.
pub(crate) fn dedupe_params(params: Vec<OpenApiParam>) -> Vec<OpenApiParam> {
    let mut map: BTreeMap<(OpenApiParamLocation, String), bool> = BTreeMap::new();
    for p in params {
        map.insert((p.location, p.name), p.required);
    }
    map.into_iter()
        .map(|((location, name), required)| OpenApiParam {
            name,
            location,
            required,
        })
        .collect()
}
