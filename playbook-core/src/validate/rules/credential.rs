use crate::types::{Credential, PlaybookBundle};
use crate::validate::rules::stage::validate_stages;
use crate::validate::validator::Validator;

pub(crate) fn validate_credential(
    v: &mut Validator,
    bundle: &PlaybookBundle,
    cred: &Credential,
    path: &str,
) {
    if !cred.methods.contains_key(&cred.default) {
        v.push(
            format!("{path}.default"),
            format!("default method '{}' is not declared in methods", cred.default),
        );
    }

    for (name, method) in &cred.methods {
        if let Some(requests) = &method.requests {
            validate_stages(v, bundle, requests, &format!("{path}.methods.{name}.requests"));
        }
    }
}
