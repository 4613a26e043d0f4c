//! Turns substituted request templates into concrete transport requests.

use std::collections::BTreeMap;

use base64::Engine as _;
use playbook_core::types::{
    AnyValue, HttpRequest, RequestBody, RequestTemplate, SecuritySchemeKind, SecuritySchemeLocation,
};
use playbook_core::variables::stringify;
use url::Url;

use crate::auth::{AuthResult, ResolvedCredential};
use crate::openapi::{OpenApiDoc, OpenApiParamLocation};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("operation '{0}' not found in the OpenAPI document")]
    UnknownOperation(String),
    #[error("no server URL available for operation '{0}'")]
    MissingServer(String),
    #[error("external request has no url")]
    MissingUrl,
    #[error("invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },
    #[error("path parameter '{0}' has no value")]
    MissingPathParameter(String),
    #[error("invalid HTTP method '{0}'")]
    InvalidMethod(String),
    #[error("cannot encode body as {media_type}: {message}")]
    Body { media_type: String, message: String },
}

/// Builds a request for an OpenAPI operation. A non-empty `server` replaces the
/// servers declared in the document.
pub fn build_operation_request(
    oas: &OpenApiDoc,
    server: &str,
    operation_id: &str,
    template: &RequestTemplate,
    security: &AuthResult,
) -> Result<HttpRequest, BuildError> {
    let op = oas
        .operation(operation_id)
        .ok_or_else(|| BuildError::UnknownOperation(operation_id.to_string()))?;

    let base = if server.trim().is_empty() {
        op.base_url.as_str()
    } else {
        server
    };
    if base.trim().is_empty() {
        return Err(BuildError::MissingServer(operation_id.to_string()));
    }

    let path = substitute_path(&op.path, &template.parameters.path, true)?;
    let url = join_url(base, &path)?;

    let mut parts = RequestParts::new(url);
    parts.apply_template(template);
    for (auth_ref, credential) in security {
        parts.apply_credential(auth_ref, credential);
    }

    for location in [OpenApiParamLocation::Query, OpenApiParamLocation::Header] {
        for param in op.required_params(location) {
            if !parts.has_param(location, &param.name) {
                tracing::warn!(
                    operation_id,
                    parameter = %param.name,
                    location = ?location,
                    "required parameter has no value"
                );
            }
        }
    }

    parts.finish(op.method, template.body.as_ref())
}

/// Builds a free-form request. Method defaults to GET and no security is applied.
pub fn build_external_request(template: &RequestTemplate) -> Result<HttpRequest, BuildError> {
    let raw = template
        .url
        .as_deref()
        .filter(|u| !u.trim().is_empty())
        .ok_or(BuildError::MissingUrl)?;
    let raw = substitute_path(raw, &template.parameters.path, false)?;
    let url = parse_url(&raw)?;

    let method = template
        .method
        .as_deref()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or("GET")
        .to_uppercase();
    if method.parse::<reqwest::Method>().is_err() {
        return Err(BuildError::InvalidMethod(method));
    }

    let mut parts = RequestParts::new(url);
    parts.apply_template(template);
    parts.finish(method, template.body.as_ref())
}

struct RequestParts {
    url: Url,
    headers: BTreeMap<String, String>,
    cookies: Vec<(String, String)>,
}

impl RequestParts {
    fn new(url: Url) -> Self {
        Self {
            url,
            headers: BTreeMap::new(),
            cookies: Vec::new(),
        }
    }

    fn apply_template(&mut self, template: &RequestTemplate) {
        for (name, value) in &template.parameters.query {
            self.append_query(name, &stringify(value));
        }
        for (name, value) in &template.parameters.header {
            self.headers.insert(name.clone(), stringify(value));
        }
        for (name, value) in &template.parameters.cookie {
            self.cookies.push((name.clone(), stringify(value)));
        }
    }

    fn apply_credential(&mut self, auth_ref: &str, credential: &ResolvedCredential) {
        let Some(scheme) = &credential.scheme else {
            tracing::warn!(auth = auth_ref, "no security scheme known for credential, not applied");
            return;
        };
        let value = credential.value.clone();
        match scheme.kind {
            SecuritySchemeKind::ApiKey => {
                let name = scheme
                    .name
                    .clone()
                    .unwrap_or_else(|| credential.credential.clone());
                match scheme.location.unwrap_or(SecuritySchemeLocation::Header) {
                    SecuritySchemeLocation::Header => {
                        self.headers.insert(name, value);
                    }
                    SecuritySchemeLocation::Query => self.append_query(&name, &value),
                    SecuritySchemeLocation::Cookie => self.cookies.push((name, value)),
                }
            }
            SecuritySchemeKind::Basic => {
                self.headers
                    .insert("Authorization".to_string(), format!("Basic {}", basic_token(&value)));
            }
            SecuritySchemeKind::Bearer
            | SecuritySchemeKind::Oauth2
            | SecuritySchemeKind::OpenIdConnect => {
                self.headers
                    .insert("Authorization".to_string(), format!("Bearer {value}"));
            }
        }
    }

    fn append_query(&mut self, name: &str, value: &str) {
        self.url.query_pairs_mut().append_pair(name, value);
    }

    fn has_param(&self, location: OpenApiParamLocation, name: &str) -> bool {
        match location {
            OpenApiParamLocation::Query => self.url.query_pairs().any(|(k, _)| k == name),
            OpenApiParamLocation::Header => self.header(name).is_some(),
            OpenApiParamLocation::Cookie => self.cookies.iter().any(|(k, _)| k == name),
            OpenApiParamLocation::Path => true,
        }
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn finish(mut self, method: String, body: Option<&RequestBody>) -> Result<HttpRequest, BuildError> {
        if !self.cookies.is_empty() {
            let joined = self
                .cookies
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("; ");
            let cookie = match self.header("cookie") {
                Some(existing) => format!("{existing}; {joined}"),
                None => joined,
            };
            self.headers.retain(|k, _| !k.eq_ignore_ascii_case("cookie"));
            self.headers.insert("Cookie".to_string(), cookie);
        }

        let body = match body {
            Some(body) => {
                if self.header("content-type").is_none() {
                    self.headers
                        .insert("Content-Type".to_string(), body.media_type.clone());
                }
                Some(encode_body(body)?)
            }
            None => None,
        };

        // Drop a dangling `?`.
        let mut url = self.url;
        if url.query() == Some("") {
            url.set_query(None);
        }

        Ok(HttpRequest {
            method,
            url: url.to_string(),
            headers: self.headers,
            body,
        })
    }
}

fn encode_body(body: &RequestBody) -> Result<String, BuildError> {
    let media_type = body.media_type.to_ascii_lowercase();
    if media_type.contains("json") {
        return serde_json::to_string(&body.value).map_err(|e| BuildError::Body {
            media_type: body.media_type.clone(),
            message: e.to_string(),
        });
    }
    if media_type.starts_with("application/x-www-form-urlencoded") {
        let AnyValue::Object(fields) = &body.value else {
            return Err(BuildError::Body {
                media_type: body.media_type.clone(),
                message: "value must be an object".to_string(),
            });
        };
        let mut form = url::form_urlencoded::Serializer::new(String::new());
        for (k, v) in fields {
            form.append_pair(k, &stringify(v));
        }
        return Ok(form.finish());
    }
    Ok(stringify(&body.value))
}

/// `user:pass` is encoded; anything else is taken as an already encoded token.
fn basic_token(value: &str) -> String {
    if value.contains(':') {
        base64::engine::general_purpose::STANDARD.encode(value)
    } else {
        value.to_string()
    }
}

/// Replaces `{name}` segments with url-encoded values.
fn substitute_path(
    template: &str,
    values: &BTreeMap<String, AnyValue>,
    require_all: bool,
) -> Result<String, BuildError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        let name = &rest[start + 1..start + len];
        out.push_str(&rest[..start]);
        match values.get(name) {
            Some(value) => out.push_str(&urlencoding::encode(&stringify(value))),
            None if require_all => return Err(BuildError::MissingPathParameter(name.to_string())),
            None => out.push_str(&rest[start..=start + len]),
        }
        rest = &rest[start + len + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn join_url(base: &str, path: &str) -> Result<Url, BuildError> {
    let joined = format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    parse_url(&joined)
}

fn parse_url(raw: &str) -> Result<Url, BuildError> {
    Url::parse(raw).map_err(|e| BuildError::InvalidUrl {
        url: raw.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn path_substitution_encodes_values() {
        let values = BTreeMap::from([("id".to_string(), json!("a b/c")), ("n".to_string(), json!(3))]);
        assert_eq!(
            substitute_path("/users/{id}/items/{n}", &values, true).unwrap(),
            "/users/a%20b%2Fc/items/3"
        );
        assert_eq!(
            substitute_path("/x/{missing}", &values, true).unwrap_err(),
            BuildError::MissingPathParameter("missing".to_string())
        );
        assert_eq!(substitute_path("/x/{missing}", &values, false).unwrap(), "/x/{missing}");
    }

    #[test]
    fn basic_token_encodes_only_plain_pairs() {
        assert_eq!(basic_token("user:pass"), "dXNlcjpwYXNz");
        assert_eq!(basic_token("dXNlcjpwYXNz"), "dXNlcjpwYXNz");
    }

    #[test]
    fn join_keeps_base_path() {
        let url = join_url("http://localhost:8080/api/", "/users/1").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/users/1");
    }
}
