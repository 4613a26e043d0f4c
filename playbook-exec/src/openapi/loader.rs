#[derive(Debug, thiserror::Error)]
pub enum OpenApiError {
    #[error("read file: {0}")]
    Read(#[from] std::io::Error),
    #[error("fetch: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("HTTP {0}")]
    Status(u16),
    #[error("failed to parse OpenAPI as JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to parse OpenAPI as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub(crate) async fn load_openapi(
    client: &reqwest::Client,
    url_or_path: &str,
) -> Result<serde_json::Value, OpenApiError> {
    if url_or_path.starts_with("http://") || url_or_path.starts_with("https://") {
        let resp = client.get(url_or_path).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(OpenApiError::Status(status.as_u16()));
        }
        let body = resp.text().await?;
        parse_openapi_str(&body)
    } else {
        let body = std::fs::read_to_string(url_or_path)?;
        parse_openapi_str(&body)
    }
}

pub(crate) fn parse_openapi_str(body: &str) -> Result<serde_json::Value, OpenApiError> {
    let trimmed = body.trim_start();
    if trimmed.starts_with('{') {
        Ok(serde_json::from_str::<serde_json::Value>(body)?)
    } else {
        let y = serde_yaml::from_str::<serde_yaml::Value>(body)?;
        Ok(serde_json::to_value(y)?)
    }
}
