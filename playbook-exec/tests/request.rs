mod common;

use playbook_core::types::{
    RequestBody, RequestTemplate, SecurityScheme, SecuritySchemeKind, SecuritySchemeLocation,
};
use playbook_exec::{
    build_external_request, build_operation_request, AuthResult, BuildError, ResolvedCredential,
};
use serde_json::json;

fn template(value: serde_json::Value) -> RequestTemplate {
    serde_json::from_value(value).unwrap()
}

fn credential(name: &str, value: &str, scheme: SecurityScheme) -> AuthResult {
    AuthResult::from([(
        name.to_string(),
        ResolvedCredential {
            credential: name.to_string(),
            method: "default".to_string(),
            value: value.to_string(),
            scheme: Some(scheme),
        },
    )])
}

#[test]
fn operation_request_uses_openapi_server_path_and_parameters() {
    let doc = common::openapi();
    let t = template(json!({
        "parameters": {
            "path": { "id": "a b" },
            "query": { "verbose": true },
            "header": { "X-Tenant": "acme" },
            "cookie": { "sid": "s1", "theme": "dark" }
        }
    }));
    let req = build_operation_request(&doc, "", "getUser", &t, &AuthResult::new()).unwrap();
    assert_eq!(req.method, "GET");
    assert_eq!(req.url, "http://api.example.com/v1/users/a%20b?verbose=true");
    assert_eq!(req.header("x-tenant"), Some("acme"));
    assert_eq!(req.header("cookie"), Some("sid=s1; theme=dark"));
    assert!(req.body.is_none());
}

#[test]
fn server_override_wins() {
    let doc = common::openapi();
    let t = template(json!({ "parameters": { "path": { "id": 1 } } }));
    let req = build_operation_request(&doc, "http://localhost:8080/", "getUser", &t, &AuthResult::new())
        .unwrap();
    assert_eq!(req.url, "http://localhost:8080/users/1");
}

#[test]
fn missing_path_parameter_and_unknown_operation_fail() {
    let doc = common::openapi();
    let err = build_operation_request(&doc, "", "getUser", &RequestTemplate::default(), &AuthResult::new())
        .unwrap_err();
    assert_eq!(err, BuildError::MissingPathParameter("id".to_string()));

    let err = build_operation_request(&doc, "", "nope", &RequestTemplate::default(), &AuthResult::new())
        .unwrap_err();
    assert_eq!(err, BuildError::UnknownOperation("nope".to_string()));
}

#[test]
fn json_body_sets_content_type() {
    let doc = common::openapi();
    let t = template(json!({
        "body": { "mediaType": "application/json", "value": { "user": "bob", "n": 1 } }
    }));
    let req = build_operation_request(&doc, "", "login", &t, &AuthResult::new()).unwrap();
    assert_eq!(req.method, "POST");
    assert_eq!(req.header("content-type"), Some("application/json"));
    let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
    assert_eq!(body, json!({ "user": "bob", "n": 1 }));
}

#[test]
fn api_key_credentials_go_where_the_scheme_says() {
    let doc = common::openapi();
    let t = template(json!({ "parameters": { "path": { "id": 1 } } }));

    let header = SecurityScheme {
        kind: SecuritySchemeKind::ApiKey,
        location: Some(SecuritySchemeLocation::Header),
        name: Some("X-API-Key".to_string()),
    };
    let req = build_operation_request(&doc, "", "getUser", &t, &credential("apiKey", "k1", header)).unwrap();
    assert_eq!(req.header("X-API-Key"), Some("k1"));

    let query = SecurityScheme {
        kind: SecuritySchemeKind::ApiKey,
        location: Some(SecuritySchemeLocation::Query),
        name: Some("api_key".to_string()),
    };
    let req = build_operation_request(&doc, "", "getUser", &t, &credential("apiKey", "k2", query)).unwrap();
    assert!(req.url.ends_with("/users/1?api_key=k2"), "{}", req.url);

    let cookie = SecurityScheme {
        kind: SecuritySchemeKind::ApiKey,
        location: Some(SecuritySchemeLocation::Cookie),
        name: Some("token".to_string()),
    };
    let req = build_operation_request(&doc, "", "getUser", &t, &credential("apiKey", "k3", cookie)).unwrap();
    assert_eq!(req.header("Cookie"), Some("token=k3"));
}

#[test]
fn basic_and_bearer_credentials_set_authorization() {
    let doc = common::openapi();
    let t = template(json!({ "parameters": { "path": { "id": 1 } } }));

    let basic = SecurityScheme {
        kind: SecuritySchemeKind::Basic,
        location: None,
        name: None,
    };
    let req = build_operation_request(&doc, "", "deleteUser", &t, &credential("basic", "user:pass", basic)).unwrap();
    assert_eq!(req.header("authorization"), Some("Basic dXNlcjpwYXNz"));
    assert!(req.url.starts_with("http://admin.example.com/users/1"));

    let bearer = SecurityScheme {
        kind: SecuritySchemeKind::Bearer,
        location: None,
        name: None,
    };
    let req = build_operation_request(&doc, "", "getUser", &t, &credential("jwt", "tok", bearer)).unwrap();
    assert_eq!(req.header("authorization"), Some("Bearer tok"));
}

#[test]
fn external_request_defaults_to_get() {
    let t = template(json!({
        "url": "https://auth.example.com/token",
        "parameters": { "query": { "grant": "client" } }
    }));
    let req = build_external_request(&t).unwrap();
    assert_eq!(req.method, "GET");
    assert_eq!(req.url, "https://auth.example.com/token?grant=client");
}

#[test]
fn external_form_body_is_url_encoded() {
    let t = template(json!({
        "url": "https://auth.example.com/token",
        "method": "post",
        "body": {
            "mediaType": "application/x-www-form-urlencoded",
            "value": { "grant_type": "password", "username": "a b" }
        }
    }));
    let req = build_external_request(&t).unwrap();
    assert_eq!(req.method, "POST");
    assert_eq!(req.body.as_deref(), Some("grant_type=password&username=a+b"));
    assert_eq!(req.header("Content-Type"), Some("application/x-www-form-urlencoded"));
}

#[test]
fn external_request_errors() {
    assert_eq!(
        build_external_request(&RequestTemplate::default()).unwrap_err(),
        BuildError::MissingUrl
    );
    let t = template(json!({ "url": "not a url" }));
    assert!(matches!(build_external_request(&t).unwrap_err(), BuildError::InvalidUrl { .. }));

    let t = RequestTemplate {
        url: Some("http://localhost/".to_string()),
        method: Some("GET POST".to_string()),
        ..Default::default()
    };
    assert!(matches!(build_external_request(&t).unwrap_err(), BuildError::InvalidMethod(_)));

    let t = RequestTemplate {
        url: Some("http://localhost/".to_string()),
        body: Some(RequestBody {
            media_type: "application/x-www-form-urlencoded".to_string(),
            value: json!([1, 2]),
        }),
        ..Default::default()
    };
    assert!(matches!(build_external_request(&t).unwrap_err(), BuildError::Body { .. }));
}
