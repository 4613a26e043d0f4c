use std::fmt;

use crate::types::{Environment, ResponseCode, Responses};

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Stage {
    /// Stages without a reference (inline requests) are rejected by the executor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "ref")]
    pub reference: Option<RequestRef>,

    #[serde(default, skip_serializing_if = "Environment::is_empty")]
    pub environment: Environment,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "expectedResponse")]
    pub expected_response: Option<ResponseCode>,

    #[serde(default, skip_serializing_if = "Responses::is_empty")]
    pub responses: Responses,
}

impl Stage {
    pub fn with_ref(reference: RequestRef) -> Self {
        Self {
            reference: Some(reference),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct RequestRef {
    pub r#type: RefType,
    pub id: String,
}

impl RequestRef {
    pub fn operation(id: impl Into<String>) -> Self {
        Self {
            r#type: RefType::Operation,
            id: id.into(),
        }
    }

    pub fn request(id: impl Into<String>) -> Self {
        Self {
            r#type: RefType::Request,
            id: id.into(),
        }
    }
}

impl fmt::Display for RequestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.r#type, self.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefType {
    Operation,
    Request,
}

impl fmt::Display for RefType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefType::Operation => f.write_str("operation"),
            RefType::Request => f.write_str("request"),
        }
    }
}
