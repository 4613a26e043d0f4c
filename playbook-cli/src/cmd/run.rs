use std::collections::BTreeMap;
use std::sync::Arc;

use playbook_core::types::{AnyValue, RequestRef, Stage};
use playbook_core::{EnvStack, PlaybookBundle, PlaybookEnv};
use playbook_exec::{execute_all_playbooks, NamedPlaybook, PlaybookList};
use serde::Serialize;

use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::{BundleArgs, EnvArgs, GlobalBlock, OutputArgs, TargetArgs, TransportArgs};

use super::config::{parse_pairs, prepare};
use super::stream::{stream_trace, Streamed};

const GLOBAL_BEFORE: &str = "Global Before";
const GLOBAL_AFTER: &str = "Global After";
const INPUTS_ENTRY_ID: &str = "inputs";

#[derive(Serialize)]
struct RunResult {
    status: &'static str,
    /// Last value of every assigned variable.
    variables: BTreeMap<String, AnyValue>,
}

pub async fn run_cmd(
    bundle: BundleArgs,
    target: TargetArgs,
    env: EnvArgs,
    transport: TransportArgs,
    output: OutputArgs,
) -> i32 {
    let session = match prepare(&bundle, &env, &transport, &output).await {
        Ok(s) => s,
        Err(code) => return code,
    };

    let (playbooks, extra) = match select_playbooks(&session.ctx.bundle, &target) {
        Ok(v) => v,
        Err(e) => {
            print_error(output.format, output.quiet, &e);
            return exit_codes::VALIDATION_FAILED;
        }
    };
    tracing::info!(
        playbooks = ?playbooks.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
        "starting run"
    );

    let mut run = execute_all_playbooks(session.ctx, playbooks, session.env, extra);
    let failed = match stream_trace(&mut run, &output).await {
        Streamed::Completed { failed } => failed,
        Streamed::Interrupted => {
            run.cancel();
            print_error(output.format, output.quiet, "interrupted");
            return exit_codes::RUN_FAILED;
        }
    };

    let stack = match run.finish().await {
        Ok(stack) => stack,
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::RUNTIME_ERROR;
        }
    };

    let result = RunResult {
        status: if failed { "failed" } else { "succeeded" },
        variables: latest_values(&stack),
    };
    match output.format {
        OutputFormat::Json => print_result(output.format, output.quiet, &result),
        OutputFormat::Text if !output.quiet => {
            if failed {
                eprintln!("error: run failed");
            } else {
                println!("ok: run succeeded, {} variables assigned", result.variables.len());
            }
        }
        OutputFormat::Text => {}
    }

    if failed {
        exit_codes::RUN_FAILED
    } else {
        exit_codes::SUCCESS
    }
}

/// Builds the ordered playbook list for the selected target. Playbooks without
/// stages are dropped.
fn select_playbooks(
    bundle: &PlaybookBundle,
    target: &TargetArgs,
) -> Result<(PlaybookList, EnvStack), String> {
    let selected = [
        target.operation.is_some(),
        target.request.is_some(),
        target.global.is_some(),
    ]
    .into_iter()
    .filter(|s| *s)
    .count();
    if selected != 1 {
        return Err("exactly one of --operation, --request or --global is required".to_string());
    }

    let globals = |stages: &[Stage]| {
        if target.global_blocks {
            stages.to_vec()
        } else {
            Vec::new()
        }
    };

    let mut extra = EnvStack::new();
    let playbooks = if let Some(operation_id) = &target.operation {
        let operation = bundle
            .operations
            .get(operation_id)
            .ok_or_else(|| format!("operation '{operation_id}' not found"))?;
        let scenario = match &target.scenario {
            Some(id) => operation
                .scenarios
                .get(id)
                .ok_or_else(|| format!("scenario '{id}' not found in operation '{operation_id}'"))?,
            None => operation
                .scenarios
                .values()
                .next()
                .ok_or_else(|| format!("operation '{operation_id}' has no scenarios"))?,
        };
        vec![
            NamedPlaybook::new(GLOBAL_BEFORE, globals(&bundle.before)),
            NamedPlaybook::new("Before", operation.before.clone()),
            NamedPlaybook::new("Scenario", scenario.requests.clone()),
            NamedPlaybook::new("After", operation.after.clone()),
            NamedPlaybook::new(GLOBAL_AFTER, globals(&bundle.after)),
        ]
    } else if let Some(raw) = &target.request {
        let reference = parse_request_ref(bundle, raw)?;
        if !target.inputs.is_empty() {
            extra.push(Arc::new(PlaybookEnv::new(
                INPUTS_ENTRY_ID,
                parse_pairs(&target.inputs)?,
            )));
        }
        vec![
            NamedPlaybook::new(GLOBAL_BEFORE, globals(&bundle.before)),
            NamedPlaybook::new("Request", vec![Stage::with_ref(reference)]),
            NamedPlaybook::new(GLOBAL_AFTER, globals(&bundle.after)),
        ]
    } else {
        match target.global {
            Some(GlobalBlock::Before) => vec![NamedPlaybook::new(GLOBAL_BEFORE, bundle.before.clone())],
            Some(GlobalBlock::After) | None => {
                vec![NamedPlaybook::new(GLOBAL_AFTER, bundle.after.clone())]
            }
        }
    };

    if target.request.is_none() && !target.inputs.is_empty() {
        tracing::warn!("--input only applies to --request runs, ignored");
    }

    Ok((
        playbooks.into_iter().filter(|p| !p.stages.is_empty()).collect(),
        extra,
    ))
}

/// Accepts `operation/<id>`, `request/<id>` or a bare id, which is looked up
/// among requests before operations.
fn parse_request_ref(bundle: &PlaybookBundle, raw: &str) -> Result<RequestRef, String> {
    let reference = match raw.split_once('/') {
        Some(("operation", id)) => RequestRef::operation(id),
        Some(("request", id)) => RequestRef::request(id),
        _ if bundle.requests.contains_key(raw) => RequestRef::request(raw),
        _ => RequestRef::operation(raw),
    };
    if bundle.request_by_ref(&reference).is_none() {
        return Err(format!("request '{reference}' not found"));
    }
    Ok(reference)
}

fn latest_values(stack: &EnvStack) -> BTreeMap<String, AnyValue> {
    let mut values = BTreeMap::new();
    for entry in stack {
        for (name, value) in &entry.env {
            values.insert(name.clone(), value.clone());
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use playbook_core::{parse_bundle_str, DocumentFormat};

    const BUNDLE: &str = r#"
operations:
  getUser:
    request:
      operationId: getUser
      defaultResponse: 200
    before:
      - ref: { type: request, id: setup }
    scenarios:
      happy:
        requests:
          - ref: { type: operation, id: getUser }
      sad:
        requests:
          - ref: { type: operation, id: getUser }
            expectedResponse: 404
requests:
  setup:
    defaultResponse: 200
    request:
      url: http://localhost/setup
before:
  - ref: { type: request, id: setup }
"#;

    fn bundle() -> PlaybookBundle {
        parse_bundle_str(BUNDLE, DocumentFormat::Yaml).unwrap().bundle
    }

    fn target() -> TargetArgs {
        TargetArgs {
            operation: None,
            scenario: None,
            request: None,
            global: None,
            global_blocks: false,
            inputs: Vec::new(),
        }
    }

    fn names(list: &PlaybookList) -> Vec<&str> {
        list.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn operation_run_skips_empty_blocks() {
        let t = TargetArgs {
            operation: Some("getUser".to_string()),
            ..target()
        };
        let (list, extra) = select_playbooks(&bundle(), &t).unwrap();
        assert_eq!(names(&list), vec!["Before", "Scenario"]);
        assert!(extra.is_empty());
        // first scenario in key order
        assert_eq!(list[1].stages[0].expected_response, None);
    }

    #[test]
    fn global_blocks_wrap_the_operation() {
        let t = TargetArgs {
            operation: Some("getUser".to_string()),
            scenario: Some("sad".to_string()),
            global_blocks: true,
            ..target()
        };
        let (list, _) = select_playbooks(&bundle(), &t).unwrap();
        assert_eq!(names(&list), vec!["Global Before", "Before", "Scenario"]);
        assert!(list[2].stages[0].expected_response.is_some());
    }

    #[test]
    fn request_run_carries_inputs() {
        let t = TargetArgs {
            request: Some("getUser".to_string()),
            inputs: vec!["id=7".to_string()],
            ..target()
        };
        let (list, extra) = select_playbooks(&bundle(), &t).unwrap();
        assert_eq!(names(&list), vec!["Request"]);
        assert_eq!(list[0].stages[0].reference, Some(RequestRef::operation("getUser")));
        assert_eq!(extra[0].id, "inputs");
        assert_eq!(extra[0].get("id"), Some(&serde_json::json!("7")));
    }

    #[test]
    fn request_refs_resolve_requests_first() {
        let b = bundle();
        assert_eq!(parse_request_ref(&b, "setup").unwrap(), RequestRef::request("setup"));
        assert_eq!(
            parse_request_ref(&b, "operation/getUser").unwrap(),
            RequestRef::operation("getUser")
        );
        assert!(parse_request_ref(&b, "request/getUser").is_err());
    }

    #[test]
    fn target_must_be_unique() {
        assert!(select_playbooks(&bundle(), &target()).is_err());
        let t = TargetArgs {
            operation: Some("getUser".to_string()),
            global: Some(GlobalBlock::Before),
            ..target()
        };
        assert!(select_playbooks(&bundle(), &t).is_err());
    }

    #[test]
    fn unknown_scenario_is_reported() {
        let t = TargetArgs {
            operation: Some("getUser".to_string()),
            scenario: Some("nope".to_string()),
            ..target()
        };
        let err = select_playbooks(&bundle(), &t).unwrap_err();
        assert!(err.contains("scenario 'nope'"));
    }
}
