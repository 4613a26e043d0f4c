use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::assign::http_status_category;

/// Response extraction rules keyed by status code, status category or `default`.
pub type Responses = BTreeMap<String, ResponseProcessing>;

/// Either an exact HTTP status (`"200"`) or a category token (`"2xx"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResponseCode(String);

impl ResponseCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_ascii_lowercase())
    }

    pub fn status(status: u16) -> Self {
        Self(status.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for `100`..`599` and `1xx`..`5xx`.
    pub fn is_well_formed(&self) -> bool {
        is_status_or_category(&self.0)
    }

    pub fn matches(&self, status: u16) -> bool {
        self.0 == status.to_string() || self.0 == http_status_category(status)
    }
}

pub(crate) fn is_status_or_category(code: &str) -> bool {
    let bytes = code.as_bytes();
    if bytes.len() != 3 || !(b'1'..=b'5').contains(&bytes[0]) {
        return false;
    }
    if &code[1..] == "xx" {
        return true;
    }
    bytes[1].is_ascii_digit() && bytes[2].is_ascii_digit()
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ResponseCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ResponseCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u16),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Self::status(n),
            Raw::Text(s) => Self::new(s),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResponseProcessing {
    #[serde(default, rename = "variableAssignments")]
    pub variable_assignments: BTreeMap<String, VariableAssignment>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VariableAssignment {
    #[serde(default)]
    pub from: AssignmentSource,

    #[serde(rename = "in")]
    pub location: AssignmentLocation,

    #[serde(default, rename = "type")]
    pub path_type: PathType,

    /// JSON pointer or JSONPath for bodies; header, query or cookie name otherwise.
    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentSource {
    Request,
    #[default]
    Response,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentLocation {
    Body,
    Header,
    Query,
    Cookie,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PathType {
    #[default]
    JsonPointer,
    JsonPath,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_code_accepts_numbers_and_strings() {
        let code: ResponseCode = serde_json::from_str("201").unwrap();
        assert_eq!(code.as_str(), "201");
        let code: ResponseCode = serde_json::from_str("\"2XX\"").unwrap();
        assert_eq!(code.as_str(), "2xx");
    }

    #[test]
    fn response_code_matches_exact_and_category() {
        assert!(ResponseCode::new("200").matches(200));
        assert!(ResponseCode::new("2xx").matches(204));
        assert!(!ResponseCode::new("2xx").matches(404));
        assert!(!ResponseCode::new("201").matches(200));
    }

    #[test]
    fn well_formed_codes() {
        assert!(ResponseCode::new("404").is_well_formed());
        assert!(ResponseCode::new("5xx").is_well_formed());
        assert!(!ResponseCode::new("6xx").is_well_formed());
        assert!(!ResponseCode::new("ok").is_well_formed());
        assert!(!ResponseCode::new("2x0").is_well_formed());
    }
}
