#![allow(dead_code)]

use std::io::Write;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use playbook_core::types::{HttpReply, HttpRequest, HttpResponse};
use playbook_exec::{HttpClient, HttpError, OpenApiDoc};
use tempfile::NamedTempFile;

pub const OPENAPI: &str = r##"
openapi: 3.0.3
info: { title: Users, version: "1" }
servers:
  - url: http://api.example.com/v1
components:
  parameters:
    tenant:
      name: X-Tenant
      in: header
      required: true
  securitySchemes:
    apiKey:
      type: apiKey
      in: header
      name: X-API-Key
    basic:
      type: http
      scheme: basic
security:
  - apiKey: []
paths:
  /users/{id}:
    parameters:
      - name: id
        in: path
    get:
      operationId: getUser
      parameters:
        - $ref: "#/components/parameters/tenant"
        - name: verbose
          in: query
          required: false
    delete:
      operationId: deleteUser
      servers:
        - url: http://admin.example.com
      security:
        - basic: []
  /login:
    post:
      operationId: login
      security: []
      requestBody:
        content:
          application/json: {}
"##;

pub fn openapi() -> OpenApiDoc {
    OpenApiDoc::parse_str(OPENAPI).unwrap()
}

pub fn write_temp(contents: &str) -> NamedTempFile {
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    f
}

/// Records every request and answers from a fixed list of replies, falling
/// back to the last one.
pub struct RecordingClient {
    pub requests: Mutex<Vec<HttpRequest>>,
    replies: Vec<Result<HttpReply, HttpError>>,
}

impl RecordingClient {
    pub fn new(replies: Vec<Result<HttpReply, HttpError>>) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            replies,
        })
    }

    pub fn mock() -> Arc<Self> {
        Self::new(vec![Ok(HttpReply::Mock)])
    }

    pub fn sent(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for RecordingClient {
    async fn send(&self, req: &HttpRequest) -> Result<HttpReply, HttpError> {
        let mut requests = self.requests.lock().unwrap();
        let idx = requests.len().min(self.replies.len().saturating_sub(1));
        requests.push(req.clone());
        self.replies
            .get(idx)
            .cloned()
            .unwrap_or(Ok(HttpReply::Mock))
    }
}

pub fn json_response(status: u16, body: &str) -> Result<HttpReply, HttpError> {
    Ok(HttpReply::Response(HttpResponse {
        status_code: status,
        headers: Default::default(),
        body: body.to_string(),
    }))
}
