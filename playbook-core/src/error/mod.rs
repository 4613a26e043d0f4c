use thiserror::Error;

#[derive(Debug, Error)]
pub enum BundleError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse as JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to parse as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Error)]
#[error("playbook bundle failed validation ({violations_len} violations)")]
pub struct ValidationError {
    pub violations: Vec<Violation>,
    violations_len: usize,
}

impl ValidationError {
    pub fn new(violations: Vec<Violation>) -> Self {
        let violations_len = violations.len();
        Self {
            violations,
            violations_len,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Violation {
    pub path: String,
    pub message: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Failure while extracting variables from an exchange.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssignmentError {
    #[error("variable '{variable}': {location} '{name}' not found in the {from}")]
    NotFound {
        variable: String,
        location: &'static str,
        name: String,
        from: &'static str,
    },
    #[error("variable '{variable}': {from} body is empty")]
    EmptyBody {
        variable: String,
        from: &'static str,
    },
    #[error("variable '{variable}': {from} body is not valid JSON: {message}")]
    InvalidJson {
        variable: String,
        from: &'static str,
        message: String,
    },
    #[error("variable '{variable}': invalid JSONPath '{path}': {message}")]
    InvalidJsonPath {
        variable: String,
        path: String,
        message: String,
    },
    #[error("variable '{variable}': invalid regex '{regex}': {message}")]
    InvalidRegex {
        variable: String,
        regex: String,
        message: String,
    },
    #[error("variable '{variable}': regex '{regex}' did not match")]
    RegexNoMatch { variable: String, regex: String },
    #[error("variable '{variable}': request URL '{url}' is invalid")]
    InvalidUrl { variable: String, url: String },
}
