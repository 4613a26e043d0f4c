use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use playbook_core::env::compose;
use playbook_core::types::{HttpReply, Stage};
use playbook_core::{
    assign_variables, missing_variable_names, replace_environment_variables,
    replace_request_variables, EnvStack,
};

use crate::auth::{AuthCache, AuthResult};
use crate::executor::events::{ExecutorStep, PlaybookError};
use crate::executor::result::Cancelled;
use crate::executor::run::StepSender;
use crate::executor::types::{RunContext, MAX_DEPTH};
use crate::request::{build_external_request, build_operation_request};

pub(crate) const STAGE_ENVIRONMENT_ID: &str = "stage-environment";
pub(crate) const REQUEST_ENVIRONMENT_ID: &str = "request-environment";

/// State of one top-level run: the shared context, its auth cache and the
/// trace producer.
pub(crate) struct Executor<'a> {
    pub(crate) ctx: &'a RunContext,
    pub(crate) cache: AuthCache,
    pub(crate) tx: &'a StepSender,
}

impl<'a> Executor<'a> {
    pub(crate) fn new(ctx: &'a RunContext, cache: AuthCache, tx: &'a StepSender) -> Self {
        Self { ctx, cache, tx }
    }

    pub(crate) async fn emit(&self, step: ExecutorStep) -> Result<(), Cancelled> {
        self.tx.emit(step).await
    }

    /// Runs `stages` in order. `Ok(None)` means the playbook failed and the
    /// failure is already in the trace; `Ok(Some(_))` carries its assignments.
    pub(crate) fn execute_playbook<'b>(
        &'b mut self,
        name: &'b str,
        stages: &'b [Stage],
        stack: EnvStack,
        depth: usize,
    ) -> BoxFuture<'b, Result<Option<EnvStack>, Cancelled>> {
        async move {
            self.emit(ExecutorStep::PlaybookStarted {
                name: name.to_string(),
            })
            .await?;

            if depth >= MAX_DEPTH {
                tracing::warn!(playbook = name, depth, "playbook depth limit reached");
                self.emit(ExecutorStep::PlaybookAborted {
                    error: PlaybookError::DepthLimit(MAX_DEPTH),
                })
                .await?;
                return Ok(None);
            }

            tracing::info!(playbook = name, depth, stages = stages.len(), "playbook started");
            let mut results: EnvStack = Vec::new();
            for (index, stage) in stages.iter().enumerate() {
                match self
                    .execute_stage(name, index, stage, &stack, &results, depth)
                    .await?
                {
                    Some(assigned) => results.extend(assigned),
                    None => {
                        tracing::info!(playbook = name, stage = index, "playbook failed");
                        return Ok(None);
                    }
                }
            }

            self.emit(ExecutorStep::PlaybookFinished).await?;
            tracing::info!(playbook = name, assignments = results.len(), "playbook finished");
            Ok(Some(results))
        }
        .boxed()
    }

    async fn execute_stage(
        &mut self,
        name: &str,
        index: usize,
        stage: &Stage,
        stack: &EnvStack,
        results: &EnvStack,
        depth: usize,
    ) -> Result<Option<EnvStack>, Cancelled> {
        let ctx = self.ctx;

        let Some(reference) = &stage.reference else {
            self.emit(ExecutorStep::PlaybookAborted {
                error: PlaybookError::NonReferenceStage(index),
            })
            .await?;
            return Ok(None);
        };

        let Some(request) = ctx.bundle.request_by_ref(reference) else {
            self.emit(ExecutorStep::PlaybookAborted {
                error: PlaybookError::RequestNotFound(reference.clone()),
            })
            .await?;
            return Ok(None);
        };

        self.emit(ExecutorStep::RequestStarted {
            reference: reference.clone(),
        })
        .await?;

        let outer = compose(&[stack.as_slice(), results.as_slice()]);

        // External requests never carry operation security.
        let security = if request.is_external() {
            AuthResult::new()
        } else {
            match self.resolve_auth(&request.auth, &outer, depth).await? {
                Some(security) => security,
                None => {
                    return self
                        .prepare_error(PlaybookError::CredentialsUnavailable(request.auth.join(", ")))
                        .await;
                }
            }
        };

        let stage_env = replace_environment_variables(STAGE_ENVIRONMENT_ID, &stage.environment, &outer);
        let stage_entry = Arc::new(stage_env.value);
        let request_scope = compose(&[outer.as_slice(), std::slice::from_ref(&stage_entry)]);

        let request_env =
            replace_environment_variables(REQUEST_ENVIRONMENT_ID, &request.environment, &request_scope);
        let request_entry = Arc::new(request_env.value);
        let payload_stack = compose(&[request_scope.as_slice(), std::slice::from_ref(&request_entry)]);

        let template = replace_request_variables(&request.request, &payload_stack);

        let mut found = stage_env.found;
        found.extend(request_env.found);
        found.extend(template.found);
        let mut missing = stage_env.missing;
        missing.extend(request_env.missing);
        missing.extend(template.missing);

        let missing_names = missing_variable_names(&missing);
        self.emit(ExecutorStep::PayloadVariablesSubstituted {
            stack: payload_stack,
            found,
            missing,
        })
        .await?;

        if !missing_names.is_empty() {
            return self
                .prepare_error(PlaybookError::VariablesMissing(missing_names))
                .await;
        }

        let built = match &request.operation_id {
            Some(operation_id) => build_operation_request(
                &ctx.oas,
                &ctx.server,
                operation_id,
                &template.value,
                &security,
            ),
            None => build_external_request(&template.value),
        };
        let http_request = match built {
            Ok(r) => r,
            Err(e) => return self.prepare_error(PlaybookError::Build(e)).await,
        };

        self.emit(ExecutorStep::HttpRequestPrepared {
            request: http_request.clone(),
            operation_id: request.operation_id.clone(),
        })
        .await?;

        tracing::debug!(method = %http_request.method, url = %http_request.url, "sending request");
        let reply = match ctx.client.send(&http_request).await {
            Ok(reply) => reply,
            Err(error) => {
                tracing::warn!(url = %http_request.url, %error, "transport error");
                self.emit(ExecutorStep::HttpErrorReceived { error }).await?;
                return Ok(None);
            }
        };

        self.emit(ExecutorStep::HttpResponseReceived {
            response: reply.clone(),
        })
        .await?;

        if let HttpReply::Response(response) = &reply {
            let expected = stage
                .expected_response
                .as_ref()
                .unwrap_or(&request.default_response);
            if !expected.matches(response.status_code) {
                return self
                    .processing_error(PlaybookError::StatusMismatch {
                        status: response.status_code,
                        expected: expected.to_string(),
                    })
                    .await;
            }
        }

        let mut assigned = EnvStack::new();
        for (id, responses) in [
            (format!("playbook-{name}-step-{index}-request"), &request.responses),
            (format!("playbook-{name}-step-{index}"), &stage.responses),
        ] {
            let entry = match assign_variables(&id, responses, &http_request, &reply) {
                Ok(entry) => entry,
                Err(e) => return self.processing_error(PlaybookError::Assignment(e)).await,
            };
            self.emit(ExecutorStep::VariablesAssigned {
                assignments: entry.clone(),
            })
            .await?;
            assigned.push(Arc::new(entry));
        }

        Ok(Some(assigned))
    }

    async fn prepare_error(&self, error: PlaybookError) -> Result<Option<EnvStack>, Cancelled> {
        tracing::warn!(%error, "request preparation failed");
        self.emit(ExecutorStep::HttpRequestPrepareError { error }).await?;
        Ok(None)
    }

    async fn processing_error(&self, error: PlaybookError) -> Result<Option<EnvStack>, Cancelled> {
        tracing::warn!(%error, "response processing failed");
        self.emit(ExecutorStep::ResponseProcessingError { error }).await?;
        Ok(None)
    }
}
