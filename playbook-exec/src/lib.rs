#![forbid(unsafe_code)]

//! Runtime engine for executing OpenAPI playbooks.
//!
//! The bundle model, environment stack and variable handling live in `playbook-core`.

pub mod auth;
pub mod executor;
pub mod openapi;
pub mod request;

pub use crate::auth::{AuthCache, AuthCacheKey, AuthResult, ResolvedCredential};
pub use crate::executor::{
    execute_all_playbooks, execute_auth, AuthOutcome, ExecutorStep, HttpClient, HttpConfig,
    HttpError, MockHttpClient, NamedPlaybook, PlaybookError, PlaybookList, PlaybookRun,
    ReqwestHttpClient, RunContext, RunError,
};
pub use crate::openapi::OpenApiDoc;
pub use crate::request::{build_external_request, build_operation_request, BuildError};
