use std::collections::BTreeMap;

use playbook_core::types::{EnvData, EnvironmentVariable, PlaybookEnvironment};
use playbook_core::{get_external_environment, make_env_env, parse_bundle_str, DocumentFormat};
use serde_json::json;

fn var(name: &str, required: bool, default: Option<serde_json::Value>) -> EnvironmentVariable {
    EnvironmentVariable {
        name: name.to_string(),
        required,
        default,
    }
}

#[test]
fn secrets_win_over_defaults() {
    let environment = PlaybookEnvironment {
        variables: BTreeMap::from([("token".to_string(), var("API_TOKEN", true, None))]),
    };
    let data = EnvData {
        default: BTreeMap::from([("API_TOKEN".to_string(), json!("plain"))]),
        secrets: BTreeMap::from([("API_TOKEN".to_string(), json!("secret"))]),
    };
    let out = make_env_env(&environment, &data);
    assert_eq!(out.env.id, "environment");
    assert_eq!(out.env.get("token"), Some(&json!("secret")));
    assert!(out.missing.is_empty());
}

#[test]
fn declared_default_only_applies_to_optional_variables() {
    let environment = PlaybookEnvironment {
        variables: BTreeMap::from([
            ("host".to_string(), var("HOST", false, Some(json!("localhost")))),
            ("user".to_string(), var("USER", true, Some(json!("admin")))),
            ("extra".to_string(), var("EXTRA", false, None)),
        ]),
    };
    let out = make_env_env(&environment, &EnvData::default());
    assert_eq!(out.env.get("host"), Some(&json!("localhost")));
    assert_eq!(out.env.get("user"), None);
    assert_eq!(out.env.get("extra"), None);
    assert_eq!(out.missing, vec!["USER".to_string()]);
}

#[test]
fn external_environment_follows_runtime_configuration() {
    let yaml = r#"
environments:
  default:
    variables:
      a: { name: A, default: 1 }
  staging:
    variables:
      a: { name: A, default: 2 }
runtimeConfiguration:
  environment: staging
"#;
    let bundle = parse_bundle_str(yaml, DocumentFormat::Yaml).unwrap().bundle;
    let out = get_external_environment(&bundle, &EnvData::default());
    assert_eq!(out.env.get("a"), Some(&json!(2)));

    let mut bundle = bundle;
    bundle.runtime_configuration = None;
    let out = get_external_environment(&bundle, &EnvData::default());
    assert_eq!(out.env.get("a"), Some(&json!(1)));

    bundle.environments.clear();
    let out = get_external_environment(&bundle, &EnvData::default());
    assert!(out.env.is_empty());
}

#[test]
fn empty_environment_name_selects_default() {
    let yaml = r#"
environments:
  default:
    variables:
      a: { name: A, default: 1 }
runtimeConfiguration:
  environment: ""
"#;
    let bundle = parse_bundle_str(yaml, DocumentFormat::Yaml).unwrap().bundle;
    assert_eq!(bundle.environment_name(), "default");
    let out = get_external_environment(&bundle, &EnvData::default());
    assert_eq!(out.env.get("a"), Some(&json!(1)));
}
