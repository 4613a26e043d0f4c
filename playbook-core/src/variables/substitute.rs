use std::collections::BTreeMap;
use std::sync::Arc;

use crate::env::{resolve, PlaybookEnv};
use crate::types::{AnyValue, Environment, RequestBody, RequestParameters, RequestTemplate};

use super::template::{stringify, whole_reference, VARIABLE_RE};
use super::{FoundVariable, MissingVariable, Replacement};

struct Substitutor<'a> {
    stack: &'a [Arc<PlaybookEnv>],
    found: Vec<FoundVariable>,
    missing: Vec<MissingVariable>,
}

impl<'a> Substitutor<'a> {
    fn new(stack: &'a [Arc<PlaybookEnv>]) -> Self {
        Self {
            stack,
            found: Vec::new(),
            missing: Vec::new(),
        }
    }

    fn finish<T>(self, value: T) -> Replacement<T> {
        Replacement {
            value,
            found: self.found,
            missing: self.missing,
        }
    }

    fn lookup(&mut self, name: &str, location: &str) -> Option<AnyValue> {
        match resolve(name, self.stack) {
            Some((value, entry)) => {
                self.found.push(FoundVariable {
                    name: name.to_string(),
                    value: value.clone(),
                    context: entry.id.clone(),
                });
                Some(value.clone())
            }
            None => {
                self.missing.push(MissingVariable {
                    name: name.to_string(),
                    location: location.to_string(),
                });
                None
            }
        }
    }

    fn string(&mut self, input: &str, location: &str) -> AnyValue {
        if let Some(name) = whole_reference(input) {
            return self
                .lookup(name, location)
                .unwrap_or_else(|| AnyValue::String(input.to_string()));
        }

        let mut out = String::with_capacity(input.len());
        let mut last = 0;
        for caps in VARIABLE_RE.captures_iter(input) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            out.push_str(&input[last..whole.start()]);
            match self.lookup(name.as_str(), location) {
                Some(value) => out.push_str(&stringify(&value)),
                // Unresolved references stay in place.
                None => out.push_str(whole.as_str()),
            }
            last = whole.end();
        }
        out.push_str(&input[last..]);
        AnyValue::String(out)
    }

    fn value(&mut self, value: &AnyValue, location: &str) -> AnyValue {
        match value {
            AnyValue::String(s) => self.string(s, location),
            AnyValue::Array(items) => AnyValue::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| self.value(item, &format!("{location}/{i}")))
                    .collect(),
            ),
            AnyValue::Object(map) => AnyValue::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), self.value(v, &format!("{location}/{k}"))))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    fn map(&mut self, map: &BTreeMap<String, AnyValue>, location: &str) -> BTreeMap<String, AnyValue> {
        map.iter()
            .map(|(k, v)| (k.clone(), self.value(v, &format!("{location}/{k}"))))
            .collect()
    }
}

/// Substitutes environment overrides into a new stack entry named `id`.
pub fn replace_environment_variables(
    id: &str,
    overrides: &Environment,
    stack: &[Arc<PlaybookEnv>],
) -> Replacement<PlaybookEnv> {
    let mut s = Substitutor::new(stack);
    let env = s.map(overrides, &format!("/{id}"));
    s.finish(PlaybookEnv::new(id, env))
}

/// Substitutes URL, method, parameters and body of a request template.
pub fn replace_request_variables(
    template: &RequestTemplate,
    stack: &[Arc<PlaybookEnv>],
) -> Replacement<RequestTemplate> {
    let mut s = Substitutor::new(stack);

    let url = template
        .url
        .as_deref()
        .map(|url| stringify(&s.string(url, "/url")));
    let method = template
        .method
        .as_deref()
        .map(|method| stringify(&s.string(method, "/method")));
    let parameters = RequestParameters {
        query: s.map(&template.parameters.query, "/parameters/query"),
        header: s.map(&template.parameters.header, "/parameters/header"),
        path: s.map(&template.parameters.path, "/parameters/path"),
        cookie: s.map(&template.parameters.cookie, "/parameters/cookie"),
    };
    let body = template.body.as_ref().map(|body| RequestBody {
        media_type: body.media_type.clone(),
        value: s.value(&body.value, "/body"),
    });

    s.finish(RequestTemplate {
        url,
        method,
        parameters,
        body,
    })
}

/// Substitutes a credential value template into its final string.
pub fn replace_credential_variables(
    template: &str,
    stack: &[Arc<PlaybookEnv>],
) -> Replacement<String> {
    let mut s = Substitutor::new(stack);
    let value = s.string(template, "/credential");
    s.finish(stringify(&value))
}
