use playbook_core::types::RefType;
use playbook_core::{parse_bundle_str, validate_bundle, DocumentFormat};

fn minimal_valid_yaml() -> &'static str {
    r#"
operations:
  getUser:
    request:
      operationId: getUser
      auth: [apiKey]
      defaultResponse: 200
      request:
        parameters:
          path:
            id: "{{userId}}"
      responses:
        "2xx":
          variableAssignments:
            name:
              in: body
              path: /name
    scenarios:
      happy:
        requests:
          - ref: { type: operation, id: getUser }
            expectedResponse: 2xx
requests:
  token:
    defaultResponse: "200"
    request:
      url: https://auth.example.com/token
      method: POST
authenticationDetails:
  - apiKey:
      type: apiKey
      in: header
      name: X-API-Key
      default: static
      methods:
        static:
          credential: "{{token}}"
        fetched:
          credential: "{{accessToken}}"
          requests:
            - ref: { type: request, id: token }
environments:
  default:
    variables:
      token:
        name: API_TOKEN
        required: true
"#
}

#[test]
fn parse_yaml_and_validate_ok() {
    let parsed = parse_bundle_str(minimal_valid_yaml(), DocumentFormat::Yaml).unwrap();
    validate_bundle(&parsed.bundle).unwrap();

    let op = &parsed.bundle.operations["getUser"];
    assert_eq!(op.request.default_response.as_str(), "200");
    let stage = &op.scenarios["happy"].requests[0];
    assert_eq!(stage.reference.as_ref().unwrap().r#type, RefType::Operation);
    assert!(parsed.bundle.requests["token"].is_external());
}

#[test]
fn parse_auto_detects_yaml() {
    let parsed = parse_bundle_str(minimal_valid_yaml(), DocumentFormat::Auto).unwrap();
    assert_eq!(parsed.format, DocumentFormat::Yaml);
}

#[test]
fn parse_auto_detects_json() {
    let json = r#"{ "requests": { "ping": { "defaultResponse": 200, "request": { "url": "http://localhost/ping" } } } }"#;
    let parsed = parse_bundle_str(json, DocumentFormat::Auto).unwrap();
    assert_eq!(parsed.format, DocumentFormat::Json);
    validate_bundle(&parsed.bundle).unwrap();
}

#[test]
fn parse_garbage_is_rejected() {
    let err = parse_bundle_str("operations: [valid", DocumentFormat::Auto).unwrap_err();
    assert!(format!("{err}").contains("YAML"));
}

#[test]
fn dangling_references_and_missing_refs_are_reported() {
    let yaml = r#"
requests:
  ping:
    defaultResponse: 200
    request:
      url: http://localhost/ping
before:
  - ref: { type: request, id: nope }
  - environment: { a: 1 }
"#;
    let parsed = parse_bundle_str(yaml, DocumentFormat::Yaml).unwrap();
    let err = validate_bundle(&parsed.bundle).unwrap_err();
    let paths: Vec<_> = err.violations.iter().map(|v| v.path.as_str()).collect();
    assert!(paths.contains(&"$.before[0].ref"));
    assert!(paths.contains(&"$.before[1].ref"));
}

#[test]
fn unknown_credentials_and_methods_are_reported() {
    let yaml = minimal_valid_yaml()
        .replace("auth: [apiKey]", "auth: [apiKey/oauth, basic]")
        .replace("default: static", "default: missing");
    let parsed = parse_bundle_str(&yaml, DocumentFormat::Yaml).unwrap();
    let err = validate_bundle(&parsed.bundle).unwrap_err();
    let messages: Vec<_> = err.violations.iter().map(|v| v.message.as_str()).collect();
    assert!(messages.iter().any(|m| m.contains("no method 'oauth'")));
    assert!(messages.iter().any(|m| m.contains("unknown credential 'basic'")));
    assert!(err
        .violations
        .iter()
        .any(|v| v.path == "$.authenticationDetails[0].apiKey.default"));
}

#[test]
fn external_request_without_url_is_reported() {
    let yaml = r#"
requests:
  bad:
    defaultResponse: 200
"#;
    let parsed = parse_bundle_str(yaml, DocumentFormat::Yaml).unwrap();
    let err = validate_bundle(&parsed.bundle).unwrap_err();
    assert_eq!(err.violations.len(), 1);
    assert_eq!(err.violations[0].path, "$.requests.bad.request.url");
}

#[test]
fn bad_response_keys_and_environment_are_reported() {
    let yaml = r#"
requests:
  ping:
    defaultResponse: 7xx
    request:
      url: http://localhost/ping
    responses:
      ok:
        variableAssignments: {}
runtimeConfiguration:
  environment: staging
"#;
    let parsed = parse_bundle_str(yaml, DocumentFormat::Yaml).unwrap();
    let err = validate_bundle(&parsed.bundle).unwrap_err();
    let paths: Vec<_> = err.violations.iter().map(|v| v.path.as_str()).collect();
    assert!(paths.contains(&"$.requests.ping.defaultResponse"));
    assert!(paths.contains(&"$.requests.ping.responses.ok"));
    assert!(paths.contains(&"$.runtimeConfiguration.environment"));
}
