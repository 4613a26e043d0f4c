use std::sync::Arc;

use playbook_core::types::{PlaybookBundle, Stage};

use crate::executor::http::HttpClient;
use crate::openapi::OpenApiDoc;

/// Nested credential-acquisition playbooks stop at this depth.
pub const MAX_DEPTH: usize = 5;

/// Everything a run reads but never changes.
#[derive(Clone)]
pub struct RunContext {
    pub client: Arc<dyn HttpClient>,
    pub oas: Arc<OpenApiDoc>,
    /// Overrides the OpenAPI servers when non-empty.
    pub server: String,
    pub bundle: Arc<PlaybookBundle>,
}

impl RunContext {
    pub fn new(
        client: Arc<dyn HttpClient>,
        oas: Arc<OpenApiDoc>,
        server: impl Into<String>,
        bundle: Arc<PlaybookBundle>,
    ) -> Self {
        Self {
            client,
            oas,
            server: server.into(),
            bundle,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedPlaybook {
    pub name: String,
    pub stages: Vec<Stage>,
}

impl NamedPlaybook {
    pub fn new(name: impl Into<String>, stages: Vec<Stage>) -> Self {
        Self {
            name: name.into(),
            stages,
        }
    }
}

pub type PlaybookList = Vec<NamedPlaybook>;
