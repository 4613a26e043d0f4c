use playbook_core::types::{SecurityScheme, SecuritySchemeKind, SecuritySchemeLocation};

use crate::openapi::refs::deref;

/// Looks `name` up in `components.securitySchemes` (OpenAPI 3) or
/// `securityDefinitions` (Swagger 2).
pub(crate) fn find_security_scheme(doc: &serde_json::Value, name: &str) -> Option<SecurityScheme> {
    let raw = doc
        .pointer("/components/securitySchemes")
        .and_then(|s| s.get(name))
        .or_else(|| doc.get("securityDefinitions").and_then(|s| s.get(name)))?;
    let raw = match deref(doc, raw) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(scheme = name, "security scheme {e}");
            return None;
        }
    };
    scheme_from_value(raw)
}

fn scheme_from_value(raw: &serde_json::Value) -> Option<SecurityScheme> {
    let ty = raw.get("type")?.as_str()?;
    let kind = match ty {
        "apiKey" => SecuritySchemeKind::ApiKey,
        "basic" => SecuritySchemeKind::Basic,
        "oauth2" => SecuritySchemeKind::Oauth2,
        "openIdConnect" => SecuritySchemeKind::OpenIdConnect,
        "http" => match raw
            .get("scheme")
            .and_then(|v| v.as_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("basic") => SecuritySchemeKind::Basic,
            Some("bearer") => SecuritySchemeKind::Bearer,
            _ => return None,
        },
        _ => return None,
    };
    let location = match raw.get("in").and_then(|v| v.as_str()) {
        Some("header") => Some(SecuritySchemeLocation::Header),
        Some("query") => Some(SecuritySchemeLocation::Query),
        Some("cookie") => Some(SecuritySchemeLocation::Cookie),
        _ => None,
    };
    Some(SecurityScheme {
        kind,
        location,
        name: raw.get("name").and_then(|v| v.as_str()).map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_openapi3_and_swagger2_schemes() {
        let doc = json!({
            "components": { "securitySchemes": {
                "key": { "type": "apiKey", "in": "query", "name": "api_key" },
                "jwt": { "type": "http", "scheme": "Bearer" },
                "digest": { "type": "http", "scheme": "digest" }
            }},
            "securityDefinitions": { "legacy": { "type": "basic" } }
        });
        let key = find_security_scheme(&doc, "key").unwrap();
        assert_eq!(key.kind, SecuritySchemeKind::ApiKey);
        assert_eq!(key.location, Some(SecuritySchemeLocation::Query));
        assert_eq!(key.name.as_deref(), Some("api_key"));
        assert_eq!(find_security_scheme(&doc, "jwt").unwrap().kind, SecuritySchemeKind::Bearer);
        assert_eq!(find_security_scheme(&doc, "legacy").unwrap().kind, SecuritySchemeKind::Basic);
        assert!(find_security_scheme(&doc, "digest").is_none());
        assert!(find_security_scheme(&doc, "nope").is_none());
    }
}
