//! Recursive playbook interpreter.
//!
//! Both entry points spawn the run onto the current tokio runtime and hand
//! back a [`PlaybookRun`] that yields the trace one [`ExecutorStep`] at a time.

mod auth;
pub mod events;
pub mod http;
mod playbook;
mod result;
mod run;
mod types;

use std::sync::Arc;

use playbook_core::env::compose;
use playbook_core::types::EnvData;
use playbook_core::{get_external_environment, EnvStack};
use uuid::Uuid;

use crate::auth::AuthCache;
use playbook::Executor;

pub use events::{AuthOutcome, ExecutorStep, PlaybookError};
pub use http::{HttpClient, HttpConfig, HttpError, MockHttpClient, ReqwestHttpClient};
pub use result::{Cancelled, RunError};
pub use run::PlaybookRun;
pub use types::{NamedPlaybook, PlaybookList, RunContext, MAX_DEPTH};

/// Runs `playbooks` in order against one auth cache. Each playbook sees the
/// bundle environment, `extra_env` and everything earlier playbooks assigned.
/// The first failing playbook ends the run; the final value is the
/// accumulated assignment stack.
pub fn execute_all_playbooks(
    ctx: RunContext,
    playbooks: PlaybookList,
    runtime_env: EnvData,
    extra_env: EnvStack,
) -> PlaybookRun<EnvStack> {
    let run_id = Uuid::new_v4();
    PlaybookRun::spawn(run_id, move |tx| async move {
        let external = get_external_environment(&ctx.bundle, &runtime_env);
        if !external.missing.is_empty() {
            tracing::warn!(missing = ?external.missing, "required environment variables have no value");
        }
        let env: EnvStack = vec![Arc::new(external.env)];

        let mut executor = Executor::new(&ctx, AuthCache::new(), &tx);
        let mut accumulated = EnvStack::new();

        for (idx, playbook) in playbooks.iter().enumerate() {
            if playbook.stages.is_empty() {
                tracing::debug!(playbook = %playbook.name, "skipping empty playbook");
                continue;
            }

            let stack = compose(&[env.as_slice(), extra_env.as_slice(), accumulated.as_slice()]);
            match executor
                .execute_playbook(&playbook.name, &playbook.stages, stack, 0)
                .await?
            {
                Some(assigned) => accumulated.extend(assigned),
                None => {
                    let skipped: Vec<&str> = playbooks[idx + 1..]
                        .iter()
                        .filter(|p| !p.stages.is_empty())
                        .map(|p| p.name.as_str())
                        .collect();
                    if !skipped.is_empty() {
                        tracing::warn!(failed = %playbook.name, ?skipped, "run halted, remaining playbooks skipped");
                    }
                    break;
                }
            }
        }

        Ok(accumulated)
    })
}

/// Resolves `auth_refs` on their own, for previewing credential acquisition.
pub fn execute_auth(
    ctx: RunContext,
    cache: AuthCache,
    auth_refs: Vec<String>,
    stack: EnvStack,
    depth: usize,
) -> PlaybookRun<AuthOutcome> {
    let run_id = Uuid::new_v4();
    PlaybookRun::spawn(run_id, move |tx| async move {
        let mut executor = Executor::new(&ctx, cache, &tx);
        let result = executor.resolve_auth(&auth_refs, &stack, depth).await?;
        Ok(AuthOutcome {
            result,
            cache: executor.cache,
        })
    })
}
