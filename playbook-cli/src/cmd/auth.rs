use std::sync::Arc;

use playbook_core::types::SecurityScheme;
use playbook_core::{get_external_environment, EnvStack};
use playbook_exec::{execute_auth, AuthCache};
use serde::Serialize;

use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::{BundleArgs, EnvArgs, OutputArgs, TransportArgs};

use super::config::prepare;
use super::stream::{stream_trace, Streamed};

#[derive(Serialize)]
struct AuthSummary {
    credential: String,
    method: String,
    value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    scheme: Option<SecurityScheme>,
}

pub async fn auth_cmd(
    bundle: BundleArgs,
    credential: &str,
    method: Option<&str>,
    env: EnvArgs,
    transport: TransportArgs,
    output: OutputArgs,
) -> i32 {
    let session = match prepare(&bundle, &env, &transport, &output).await {
        Ok(s) => s,
        Err(code) => return code,
    };

    let auth_ref = match method {
        Some(m) => format!("{credential}/{m}"),
        None => credential.to_string(),
    };

    let external = get_external_environment(&session.ctx.bundle, &session.env);
    if !external.missing.is_empty() {
        tracing::warn!(missing = ?external.missing, "required environment variables have no value");
    }
    let stack: EnvStack = vec![Arc::new(external.env)];

    let mut run = execute_auth(session.ctx, AuthCache::new(), vec![auth_ref.clone()], stack, 0);
    if let Streamed::Interrupted = stream_trace(&mut run, &output).await {
        run.cancel();
        print_error(output.format, output.quiet, "interrupted");
        return exit_codes::RUN_FAILED;
    }

    let outcome = match run.finish().await {
        Ok(o) => o,
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::RUNTIME_ERROR;
        }
    };

    let Some(resolved) = outcome.credential(&auth_ref) else {
        print_error(
            output.format,
            output.quiet,
            &format!("credential '{auth_ref}' could not be resolved"),
        );
        return exit_codes::RUN_FAILED;
    };

    let summary = AuthSummary {
        credential: resolved.credential.clone(),
        method: resolved.method.clone(),
        value: resolved.value.clone(),
        scheme: resolved.scheme.clone(),
    };
    if output.format == OutputFormat::Text && !output.quiet {
        println!(
            "ok: {}/{} resolved: {}",
            summary.credential, summary.method, summary.value
        );
    } else {
        print_result(output.format, output.quiet, &summary);
    }
    exit_codes::SUCCESS
}
