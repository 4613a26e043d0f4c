use std::path::Path;
use std::time::Duration;

use playbook_core::{parse_bundle_str, validate_bundle, DocumentFormat, PlaybookBundle};
use playbook_exec::OpenApiDoc;
use serde::Serialize;

use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::OutputArgs;

use super::config::load_oas;

#[derive(Serialize)]
struct ValidateResult {
    valid: bool,
    format: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

pub async fn validate_cmd(path: &Path, oas: Option<&str>, output: OutputArgs) -> i32 {
    let content = match std::fs::read_to_string(path) {
        Ok(v) => v,
        Err(e) => {
            print_error(
                output.format,
                output.quiet,
                &format!("failed to read {}: {e}", path.display()),
            );
            return exit_codes::RUNTIME_ERROR;
        }
    };

    let parsed = match parse_bundle_str(&content, DocumentFormat::Auto) {
        Ok(p) => p,
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::VALIDATION_FAILED;
        }
    };

    let mut errors: Vec<String> = match validate_bundle(&parsed.bundle) {
        Ok(()) => Vec::new(),
        Err(err) => err
            .violations
            .iter()
            .map(|v| format!("{}: {}", v.path, v.message))
            .collect(),
    };

    if let Some(source) = oas {
        let doc = match load_oas(source, Duration::from_secs(30), false).await {
            Ok(doc) => doc,
            Err(e) => {
                print_error(output.format, output.quiet, &e);
                return exit_codes::RUNTIME_ERROR;
            }
        };
        errors.extend(unresolved_operations(&parsed.bundle, &doc));
    }

    let result = ValidateResult {
        valid: errors.is_empty(),
        format: format!("{:?}", parsed.format),
        errors,
    };

    if output.format == OutputFormat::Text && !output.quiet {
        if result.valid {
            println!("ok: valid playbook bundle ({})", result.format);
        } else {
            eprintln!("error: validation failed");
            for e in &result.errors {
                eprintln!("- {e}");
            }
        }
    } else {
        print_result(output.format, output.quiet, &result);
    }

    if result.valid {
        exit_codes::SUCCESS
    } else {
        exit_codes::VALIDATION_FAILED
    }
}

fn unresolved_operations(bundle: &PlaybookBundle, doc: &OpenApiDoc) -> Vec<String> {
    bundle
        .operations
        .iter()
        .filter_map(|(key, op)| {
            let id = op.request.operation_id.as_deref()?;
            doc.operation(id).is_none().then(|| {
                format!(
                    "$.operations.{key}.request.operationId: operation '{id}' not found in the OpenAPI document"
                )
            })
        })
        .collect()
}
