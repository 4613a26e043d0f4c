use crate::types::response::is_status_or_category;
use crate::types::{PlaybookBundle, Request, Responses};
use crate::validate::validator::Validator;

pub(crate) fn validate_request(v: &mut Validator, bundle: &PlaybookBundle, req: &Request, path: &str) {
    if req.is_external() {
        match req.request.url.as_deref() {
            None => v.push(format!("{path}.request.url"), "external request must have a url"),
            Some(url) if url.trim().is_empty() => {
                v.push(format!("{path}.request.url"), "must not be empty")
            }
            Some(_) => {}
        }
    }

    if !req.default_response.is_well_formed() {
        v.push(
            format!("{path}.defaultResponse"),
            format!(
                "'{}' is neither a status code nor a status category",
                req.default_response
            ),
        );
    }

    for (idx, auth) in req.auth.iter().enumerate() {
        let auth_path = format!("{path}.auth[{idx}]");
        let (name, method) = match auth.split_once('/') {
            Some((name, method)) => (name, Some(method)),
            None => (auth.as_str(), None),
        };
        let Some(cred) = bundle.credential(name) else {
            v.push(auth_path, format!("unknown credential '{name}'"));
            continue;
        };
        if let Some(method) = method {
            if !cred.methods.contains_key(method) {
                v.push(
                    auth_path,
                    format!("credential '{name}' has no method '{method}'"),
                );
            }
        }
    }

    validate_responses(v, &req.responses, &format!("{path}.responses"));
}

pub(crate) fn validate_responses(v: &mut Validator, responses: &Responses, path: &str) {
    for key in responses.keys() {
        let normalized = key.trim().to_ascii_lowercase();
        if normalized != "default" && !is_status_or_category(&normalized) {
            v.push(
                format!("{path}.{key}"),
                "response key must be a status code, a status category or 'default'",
            );
        }
    }
}
