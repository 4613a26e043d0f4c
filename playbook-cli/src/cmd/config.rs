use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use playbook_core::parser::parse_auto;
use playbook_core::types::{AnyValue, EnvData};
use playbook_core::{parse_bundle_str, validate_bundle, DocumentFormat, PlaybookBundle};
use playbook_exec::{
    HttpClient, HttpConfig, MockHttpClient, OpenApiDoc, ReqwestHttpClient, RunContext,
};

use crate::exit_codes;
use crate::output::print_error;
use crate::{BundleArgs, EnvArgs, OutputArgs, TransportArgs};

pub const SERVER_ENV_VAR: &str = "PLAYBOOK_SERVER";
/// Host used for mock runs when neither the caller nor the document names one.
pub const MOCK_SERVER: &str = "http://localhost";

/// Everything `run` and `auth` need before the executor starts.
pub struct Session {
    pub ctx: RunContext,
    pub env: EnvData,
}

/// Loads bundle, environment, OpenAPI document and transport. Errors are
/// printed here; the caller only forwards the exit code.
pub async fn prepare(
    bundle: &BundleArgs,
    env: &EnvArgs,
    transport: &TransportArgs,
    output: &OutputArgs,
) -> Result<Session, i32> {
    let parsed = load_bundle(&bundle.bundle, output)?;

    let fail = |message: String| {
        print_error(output.format, output.quiet, &message);
        exit_codes::RUNTIME_ERROR
    };

    let env = load_env(env).map_err(fail)?;
    let oas = load_oas(
        &bundle.oas,
        Duration::from_millis(transport.timeout),
        transport.insecure,
    )
    .await
    .map_err(fail)?;
    let client = build_client(transport).map_err(fail)?;
    let server = server_override(transport.server.as_deref(), transport.mock, &oas);
    tracing::debug!(oas = %bundle.oas, server = %server, mock = transport.mock, "session ready");

    Ok(Session {
        ctx: RunContext::new(client, Arc::new(oas), server, Arc::new(parsed)),
        env,
    })
}

/// Reads, parses and validates a bundle.
pub fn load_bundle(path: &Path, output: &OutputArgs) -> Result<PlaybookBundle, i32> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        print_error(
            output.format,
            output.quiet,
            &format!("failed to read {}: {e}", path.display()),
        );
        exit_codes::RUNTIME_ERROR
    })?;

    let parsed = parse_bundle_str(&content, DocumentFormat::Auto).map_err(|e| {
        print_error(output.format, output.quiet, &e.to_string());
        exit_codes::VALIDATION_FAILED
    })?;

    if let Err(err) = validate_bundle(&parsed.bundle) {
        print_error(output.format, output.quiet, &err.to_string());
        if !output.quiet {
            for v in &err.violations {
                eprintln!("- {}: {}", v.path, v.message);
            }
        }
        return Err(exit_codes::VALIDATION_FAILED);
    }
    Ok(parsed.bundle)
}

/// Environment file first, then `--set` defaults and `--secret` secrets on top.
pub fn load_env(args: &EnvArgs) -> Result<EnvData, String> {
    let mut data = match &args.env_file {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
            let (data, _) = parse_auto::<EnvData>(&content)
                .map_err(|e| format!("invalid environment file {}: {e}", path.display()))?;
            data
        }
        None => EnvData::default(),
    };
    data.default.extend(parse_pairs(&args.set)?);
    data.secrets.extend(parse_pairs(&args.secrets)?);
    Ok(data)
}

pub fn parse_pairs(pairs: &[String]) -> Result<BTreeMap<String, AnyValue>, String> {
    pairs
        .iter()
        .map(|s| {
            s.split_once('=')
                .filter(|(k, _)| !k.is_empty())
                .map(|(k, v)| (k.to_string(), AnyValue::String(v.to_string())))
                .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))
        })
        .collect()
}

/// Empty means the OpenAPI document's own servers apply.
pub fn server_override(arg: Option<&str>, mock: bool, oas: &OpenApiDoc) -> String {
    let server = arg
        .map(str::to_string)
        .or_else(|| std::env::var(SERVER_ENV_VAR).ok())
        .unwrap_or_default();
    if mock && server.trim().is_empty() && oas.default_server().is_none() {
        return MOCK_SERVER.to_string();
    }
    server
}

pub async fn load_oas(source: &str, timeout: Duration, insecure: bool) -> Result<OpenApiDoc, String> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .danger_accept_invalid_certs(insecure)
        .build()
        .map_err(|e| format!("failed to create HTTP client: {e}"))?;
    OpenApiDoc::load(&client, source)
        .await
        .map_err(|e| format!("failed to load OpenAPI document {source}: {e}"))
}

pub fn build_client(transport: &TransportArgs) -> Result<Arc<dyn HttpClient>, String> {
    if transport.mock {
        return Ok(Arc::new(MockHttpClient));
    }
    let config = HttpConfig {
        timeout: Duration::from_millis(transport.timeout),
        max_response_bytes: transport.max_response_bytes,
        reject_unauthorized: !transport.insecure,
    };
    let client = ReqwestHttpClient::new(config).map_err(|e| e.to_string())?;
    Ok(Arc::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pairs_split_on_first_equals() {
        let pairs = parse_pairs(&["a=1".to_string(), "b=x=y".to_string()]).unwrap();
        assert_eq!(pairs.get("a"), Some(&json!("1")));
        assert_eq!(pairs.get("b"), Some(&json!("x=y")));
    }

    #[test]
    fn pairs_without_key_are_rejected() {
        assert!(parse_pairs(&["novalue".to_string()]).is_err());
        assert!(parse_pairs(&["=x".to_string()]).is_err());
    }

    #[test]
    fn explicit_server_wins() {
        let oas = OpenApiDoc::from_value(json!({ "openapi": "3.0.3", "paths": {} }));
        assert_eq!(server_override(Some("http://localhost:1"), true, &oas), "http://localhost:1");
        assert_eq!(server_override(Some("http://localhost:1"), false, &oas), "http://localhost:1");
    }

    #[test]
    fn mock_runs_fall_back_to_localhost_without_document_servers() {
        let bare = OpenApiDoc::from_value(json!({ "openapi": "3.0.3", "paths": {} }));
        assert_eq!(server_override(Some(""), true, &bare), MOCK_SERVER);
        assert_eq!(server_override(Some(""), false, &bare), "");

        let served = OpenApiDoc::from_value(json!({
            "openapi": "3.0.3",
            "servers": [{ "url": "http://api.example.com" }],
            "paths": {}
        }));
        assert_eq!(server_override(Some(""), true, &served), "");
    }

    #[test]
    fn cli_pairs_override_env_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("env.yaml");
        std::fs::write(&path, "default:\n  A: file\n  B: file\nsecrets:\n  S: one\n").unwrap();
        let args = EnvArgs {
            env_file: Some(path),
            set: vec!["A=cli".to_string()],
            secrets: vec!["S=two".to_string()],
        };
        let data = load_env(&args).unwrap();
        assert_eq!(data.default.get("A"), Some(&json!("cli")));
        assert_eq!(data.default.get("B"), Some(&json!("file")));
        assert_eq!(data.secrets.get("S"), Some(&json!("two")));
    }
}
