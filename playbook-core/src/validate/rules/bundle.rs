use crate::types::PlaybookBundle;
use crate::validate::rules::{credential, request, stage};
use crate::validate::validator::Validator;

pub(crate) fn validate_bundle(v: &mut Validator, bundle: &PlaybookBundle) {
    for (id, op) in &bundle.operations {
        let path = format!("$.operations.{id}");
        request::validate_request(v, bundle, &op.request, &format!("{path}.request"));
        stage::validate_stages(v, bundle, &op.before, &format!("{path}.before"));
        stage::validate_stages(v, bundle, &op.after, &format!("{path}.after"));
        for (scenario_id, scenario) in &op.scenarios {
            stage::validate_stages(
                v,
                bundle,
                &scenario.requests,
                &format!("{path}.scenarios.{scenario_id}.requests"),
            );
        }
    }

    for (id, req) in &bundle.requests {
        request::validate_request(v, bundle, req, &format!("$.requests.{id}"));
    }

    stage::validate_stages(v, bundle, &bundle.before, "$.before");
    stage::validate_stages(v, bundle, &bundle.after, "$.after");

    for (idx, group) in bundle.authentication_details.iter().enumerate() {
        for (name, cred) in group {
            credential::validate_credential(
                v,
                bundle,
                cred,
                &format!("$.authenticationDetails[{idx}].{name}"),
            );
        }
    }

    if let Some(name) = bundle
        .runtime_configuration
        .as_ref()
        .and_then(|rc| rc.environment.as_deref())
    {
        if !bundle.environments.contains_key(name) {
            v.push(
                "$.runtimeConfiguration.environment",
                format!("environment '{name}' is not declared in environments"),
            );
        }
    }

    for (env_name, env) in &bundle.environments {
        for (var_name, var) in &env.variables {
            if var.name.trim().is_empty() {
                v.push(
                    format!("$.environments.{env_name}.variables.{var_name}.name"),
                    "must not be empty",
                );
            }
        }
    }
}
