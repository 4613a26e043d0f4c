use crate::types::{PlaybookBundle, Stage};
use crate::validate::rules::request::validate_responses;
use crate::validate::validator::Validator;

pub(crate) fn validate_stages(v: &mut Validator, bundle: &PlaybookBundle, stages: &[Stage], path: &str) {
    for (idx, stage) in stages.iter().enumerate() {
        validate_stage(v, bundle, stage, &format!("{path}[{idx}]"));
    }
}

pub(crate) fn validate_stage(v: &mut Validator, bundle: &PlaybookBundle, stage: &Stage, path: &str) {
    match &stage.reference {
        None => v.push(format!("{path}.ref"), "stage must reference a request"),
        Some(reference) => {
            if bundle.request_by_ref(reference).is_none() {
                v.push(
                    format!("{path}.ref"),
                    format!("reference '{reference}' does not resolve"),
                );
            }
        }
    }

    if let Some(code) = &stage.expected_response {
        if !code.is_well_formed() {
            v.push(
                format!("{path}.expectedResponse"),
                format!("'{code}' is neither a status code nor a status category"),
            );
        }
    }

    validate_responses(v, &stage.responses, &format!("{path}.responses"));
}
