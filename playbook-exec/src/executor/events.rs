use playbook_core::types::{HttpReply, HttpRequest, RequestRef};
use playbook_core::{AssignmentError, EnvStack, FoundVariable, MissingVariable, PlaybookEnv};

use crate::auth::ResolvedCredential;
use crate::executor::http::HttpError;
use crate::request::BuildError;

/// One entry of the execution trace.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ExecutorStep {
    PlaybookStarted {
        name: String,
    },
    PlaybookAborted {
        error: PlaybookError,
    },
    PlaybookFinished,
    RequestStarted {
        #[serde(rename = "ref")]
        reference: RequestRef,
    },
    AuthStarted {
        name: String,
    },
    AuthAborted {
        error: PlaybookError,
    },
    AuthFinished,
    CredentialRetrievedFromCache {
        name: String,
        result: String,
    },
    CredentialVariablesSubstituted {
        name: String,
        result: String,
        stack: EnvStack,
        found: Vec<FoundVariable>,
        missing: Vec<MissingVariable>,
    },
    PayloadVariablesSubstituted {
        stack: EnvStack,
        found: Vec<FoundVariable>,
        missing: Vec<MissingVariable>,
    },
    HttpRequestPrepareError {
        error: PlaybookError,
    },
    HttpRequestPrepared {
        request: HttpRequest,
        #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
        operation_id: Option<String>,
    },
    HttpErrorReceived {
        error: HttpError,
    },
    HttpResponseReceived {
        response: HttpReply,
    },
    ResponseProcessingError {
        error: PlaybookError,
    },
    VariablesAssigned {
        assignments: PlaybookEnv,
    },
}

impl ExecutorStep {
    /// The kebab-case tag used on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            ExecutorStep::PlaybookStarted { .. } => "playbook-started",
            ExecutorStep::PlaybookAborted { .. } => "playbook-aborted",
            ExecutorStep::PlaybookFinished => "playbook-finished",
            ExecutorStep::RequestStarted { .. } => "request-started",
            ExecutorStep::AuthStarted { .. } => "auth-started",
            ExecutorStep::AuthAborted { .. } => "auth-aborted",
            ExecutorStep::AuthFinished => "auth-finished",
            ExecutorStep::CredentialRetrievedFromCache { .. } => "credential-retrieved-from-cache",
            ExecutorStep::CredentialVariablesSubstituted { .. } => {
                "credential-variables-substituted"
            }
            ExecutorStep::PayloadVariablesSubstituted { .. } => "payload-variables-substituted",
            ExecutorStep::HttpRequestPrepareError { .. } => "http-request-prepare-error",
            ExecutorStep::HttpRequestPrepared { .. } => "http-request-prepared",
            ExecutorStep::HttpErrorReceived { .. } => "http-error-received",
            ExecutorStep::HttpResponseReceived { .. } => "http-response-received",
            ExecutorStep::ResponseProcessingError { .. } => "response-processing-error",
            ExecutorStep::VariablesAssigned { .. } => "variables-assigned",
        }
    }

    /// True for events that terminate the enclosing stage, auth or playbook.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            ExecutorStep::PlaybookAborted { .. }
                | ExecutorStep::AuthAborted { .. }
                | ExecutorStep::HttpRequestPrepareError { .. }
                | ExecutorStep::HttpErrorReceived { .. }
                | ExecutorStep::ResponseProcessingError { .. }
        )
    }
}

/// Failures carried inside the trace.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlaybookError {
    #[error("maximum playbook depth of {0} reached, credential acquisition is likely recursive")]
    DepthLimit(usize),
    #[error("stage {0} has no request reference, inline requests are not supported")]
    NonReferenceStage(usize),
    #[error("request '{0}' not found")]
    RequestNotFound(RequestRef),
    #[error("credential '{0}' not found")]
    UnknownCredential(String),
    #[error("method '{method}' not found in credential '{credential}'")]
    UnknownMethod { credential: String, method: String },
    #[error("failed to acquire credential '{0}'")]
    CredentialAcquisitionFailed(String),
    #[error("failed to substitute credential '{name}', missing variables: {missing}")]
    CredentialVariablesMissing { name: String, missing: String },
    #[error("failed to obtain credentials: {0}")]
    CredentialsUnavailable(String),
    #[error("failed to replace variables: {0}")]
    VariablesMissing(String),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error("HTTP response code {status} does not match expected {expected}")]
    StatusMismatch { status: u16, expected: String },
    #[error(transparent)]
    Assignment(#[from] AssignmentError),
}

impl serde::Serialize for PlaybookError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Outcome of a standalone credential preview.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub result: Option<crate::auth::AuthResult>,
    pub cache: crate::auth::AuthCache,
}

impl AuthOutcome {
    pub fn credential(&self, auth_ref: &str) -> Option<&ResolvedCredential> {
        self.result.as_ref().and_then(|r| r.get(auth_ref))
    }
}
