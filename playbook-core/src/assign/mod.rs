//! Post-response variable extraction and status classification.

use regex::Regex;
use serde_json_path::JsonPath;

use crate::env::{AssignedVariable, PlaybookEnv};
use crate::error::AssignmentError;
use crate::types::{
    AnyValue, AssignmentLocation, AssignmentSource, HttpReply, HttpRequest, HttpResponse, PathType,
    ResponseProcessing, Responses, VariableAssignment,
};
use crate::variables::stringify;

/// Value given to every declared variable when the exchange was a dry run.
pub const MOCK_VARIABLE_VALUE: &str = "MOCK_VARIABLE_VALUE";

/// `"1xx"` .. `"5xx"` for the status' hundreds digit.
pub fn http_status_category(status: u16) -> String {
    format!("{}xx", status / 100)
}

/// Picks the rules for `status`: exact code, then category, then `default`.
pub fn select_response_processing(responses: &Responses, status: u16) -> Option<&ResponseProcessing> {
    let exact = status.to_string();
    let category = http_status_category(status);
    let keys = [exact.as_str(), category.as_str(), "default"];
    let found = keys.into_iter().find_map(|key| {
        responses
            .iter()
            .find(|(k, _)| k.trim().eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    });
    found
}

pub fn assign_variables(
    id: &str,
    responses: &Responses,
    request: &HttpRequest,
    reply: &HttpReply,
) -> Result<PlaybookEnv, AssignmentError> {
    let mut entry = PlaybookEnv::empty(id);

    let response = match reply {
        HttpReply::Response(response) => response,
        HttpReply::Mock => {
            for processing in responses.values() {
                for name in processing.variable_assignments.keys() {
                    push(&mut entry, name, AnyValue::String(MOCK_VARIABLE_VALUE.to_string()));
                }
            }
            return Ok(entry);
        }
    };

    let Some(processing) = select_response_processing(responses, response.status_code) else {
        return Ok(entry);
    };

    for (name, rule) in &processing.variable_assignments {
        let value = extract(name, rule, request, response)?;
        push(&mut entry, name, value);
    }

    Ok(entry)
}

fn push(entry: &mut PlaybookEnv, name: &str, value: AnyValue) {
    entry.env.insert(name.to_string(), value.clone());
    entry.assignments.push(AssignedVariable {
        name: name.to_string(),
        value,
    });
}

fn source_name(from: AssignmentSource) -> &'static str {
    match from {
        AssignmentSource::Request => "request",
        AssignmentSource::Response => "response",
    }
}

fn extract(
    variable: &str,
    rule: &VariableAssignment,
    request: &HttpRequest,
    response: &HttpResponse,
) -> Result<AnyValue, AssignmentError> {
    let from = source_name(rule.from);
    let not_found = |location: &'static str| AssignmentError::NotFound {
        variable: variable.to_string(),
        location,
        name: rule.path.clone(),
        from,
    };

    let value = match rule.location {
        AssignmentLocation::Body => {
            let body = match rule.from {
                AssignmentSource::Request => request.body.as_deref().unwrap_or(""),
                AssignmentSource::Response => response.body.as_str(),
            };
            extract_body(variable, rule, from, body)?
        }
        AssignmentLocation::Header => {
            let header = match rule.from {
                AssignmentSource::Request => request.header(&rule.path),
                AssignmentSource::Response => response.header(&rule.path),
            };
            AnyValue::String(header.ok_or_else(|| not_found("header"))?.to_string())
        }
        // Responses carry no URL; query rules always read the sent request.
        AssignmentLocation::Query => {
            let url = url::Url::parse(&request.url).map_err(|_| AssignmentError::InvalidUrl {
                variable: variable.to_string(),
                url: request.url.clone(),
            })?;
            let value = url
                .query_pairs()
                .find(|(k, _)| k == rule.path.as_str())
                .map(|(_, v)| v.into_owned())
                .ok_or_else(|| not_found("query parameter"))?;
            AnyValue::String(value)
        }
        AssignmentLocation::Cookie => {
            let value = match rule.from {
                AssignmentSource::Request => request
                    .header("cookie")
                    .and_then(|h| find_request_cookie(h, &rule.path)),
                AssignmentSource::Response => response
                    .header("set-cookie")
                    .and_then(|h| find_set_cookie(h, &rule.path)),
            };
            AnyValue::String(value.ok_or_else(|| not_found("cookie"))?)
        }
    };

    match &rule.regex {
        Some(re) => apply_regex(variable, re, &value),
        None => Ok(value),
    }
}

fn extract_body(
    variable: &str,
    rule: &VariableAssignment,
    from: &'static str,
    body: &str,
) -> Result<AnyValue, AssignmentError> {
    if body.trim().is_empty() {
        return Err(AssignmentError::EmptyBody {
            variable: variable.to_string(),
            from,
        });
    }
    let json: AnyValue = serde_json::from_str(body).map_err(|e| AssignmentError::InvalidJson {
        variable: variable.to_string(),
        from,
        message: e.to_string(),
    })?;

    let found = match rule.path_type {
        PathType::JsonPointer => json.pointer(&rule.path).cloned(),
        PathType::JsonPath => {
            let path = JsonPath::parse(&rule.path).map_err(|e| AssignmentError::InvalidJsonPath {
                variable: variable.to_string(),
                path: rule.path.clone(),
                message: e.to_string(),
            })?;
            path.query(&json).all().into_iter().next().cloned()
        }
    };

    found.ok_or_else(|| AssignmentError::NotFound {
        variable: variable.to_string(),
        location: "body path",
        name: rule.path.clone(),
        from,
    })
}

fn apply_regex(variable: &str, re: &str, value: &AnyValue) -> Result<AnyValue, AssignmentError> {
    let compiled = Regex::new(re).map_err(|e| AssignmentError::InvalidRegex {
        variable: variable.to_string(),
        regex: re.to_string(),
        message: e.to_string(),
    })?;
    let text = stringify(value);
    let caps = compiled
        .captures(&text)
        .ok_or_else(|| AssignmentError::RegexNoMatch {
            variable: variable.to_string(),
            regex: re.to_string(),
        })?;
    let matched = caps.get(1).or_else(|| caps.get(0)).map(|m| m.as_str()).unwrap_or_default();
    Ok(AnyValue::String(matched.to_string()))
}

fn find_request_cookie(header: &str, name: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k.trim() == name).then(|| v.trim().to_string())
    })
}

// Multiple `Set-Cookie` values arrive comma joined. Attribute fragments such
// as `Expires=Wed, 21 Oct` never start with `name=` before the first `;`.
fn find_set_cookie(header: &str, name: &str) -> Option<String> {
    header.split(',').find_map(|part| {
        let first = part.split(';').next()?.trim();
        let (k, v) = first.split_once('=')?;
        (k.trim() == name).then(|| v.trim().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories() {
        assert_eq!(http_status_category(100), "1xx");
        assert_eq!(http_status_category(204), "2xx");
        assert_eq!(http_status_category(404), "4xx");
        assert_eq!(http_status_category(599), "5xx");
    }

    #[test]
    fn cookie_parsing() {
        assert_eq!(find_request_cookie("a=1; sid=xyz", "sid").as_deref(), Some("xyz"));
        assert_eq!(find_request_cookie("a=1", "sid"), None);
        let set = "sid=abc; Path=/; Expires=Wed, 21 Oct 2015 07:28:00 GMT, theme=dark; Path=/";
        assert_eq!(find_set_cookie(set, "sid").as_deref(), Some("abc"));
        assert_eq!(find_set_cookie(set, "theme").as_deref(), Some("dark"));
        assert_eq!(find_set_cookie(set, "Expires"), None);
    }
}
