use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use playbook_core::types::{HttpReply, HttpRequest, HttpResponse};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HttpError {
    #[error("timeout")]
    Timeout,
    #[error("connect/dns/tls error: {0}")]
    Network(String),
    #[error("response too large (>{max_bytes} bytes)")]
    ResponseTooLarge { max_bytes: usize },
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("http error: {0}")]
    Other(String),
}

impl serde::Serialize for HttpError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Transport capability handed to the executor.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn send(&self, req: &HttpRequest) -> Result<HttpReply, HttpError>;
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout: Duration,
    pub max_response_bytes: usize,
    /// When false, invalid TLS certificates are accepted.
    pub reject_unauthorized: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_response_bytes: 10 * 1024 * 1024,
            reject_unauthorized: true,
        }
    }
}

pub struct ReqwestHttpClient {
    client: reqwest::Client,
    config: HttpConfig,
}

impl ReqwestHttpClient {
    pub fn new(config: HttpConfig) -> Result<Self, HttpError> {
        // Redirects are surfaced to the playbook rather than followed.
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .danger_accept_invalid_certs(!config.reject_unauthorized)
            .user_agent(concat!("playbook-exec/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HttpError::Other(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn send(&self, req: &HttpRequest) -> Result<HttpReply, HttpError> {
        let method: reqwest::Method = req
            .method
            .parse()
            .map_err(|_| HttpError::InvalidRequest(format!("method '{}'", req.method)))?;
        let mut rb = self
            .client
            .request(method, &req.url)
            .timeout(self.config.timeout);

        for (k, v) in &req.headers {
            rb = rb.header(k.as_str(), v.as_str());
        }
        if let Some(body) = &req.body {
            rb = rb.body(body.clone());
        }

        let resp = rb.send().await.map_err(map_reqwest_error)?;
        let status_code = resp.status().as_u16();

        let mut headers = BTreeMap::<String, String>::new();
        for (k, v) in resp.headers().iter() {
            if let Ok(s) = v.to_str() {
                headers
                    .entry(k.to_string())
                    .and_modify(|existing| {
                        existing.push_str(", ");
                        existing.push_str(s);
                    })
                    .or_insert_with(|| s.to_string());
            }
        }

        let max_bytes = self.config.max_response_bytes;
        if resp.content_length().is_some_and(|len| len as usize > max_bytes) {
            return Err(HttpError::ResponseTooLarge { max_bytes });
        }
        let body = resp.bytes().await.map_err(map_reqwest_error)?;
        if body.len() > max_bytes {
            return Err(HttpError::ResponseTooLarge { max_bytes });
        }

        Ok(HttpReply::Response(HttpResponse {
            status_code,
            headers,
            body: String::from_utf8_lossy(&body).into_owned(),
        }))
    }
}

fn map_reqwest_error(e: reqwest::Error) -> HttpError {
    if e.is_timeout() {
        return HttpError::Timeout;
    }
    if e.is_connect() || e.is_request() {
        return HttpError::Network(e.to_string());
    }
    if e.is_builder() {
        return HttpError::InvalidRequest(e.to_string());
    }
    HttpError::Other(e.to_string())
}

/// Dry-run transport: never touches the network and always answers with the mock sentinel.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockHttpClient;

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn send(&self, req: &HttpRequest) -> Result<HttpReply, HttpError> {
        tracing::debug!(method = %req.method, url = %req.url, "mock transport");
        Ok(HttpReply::Mock)
    }
}
