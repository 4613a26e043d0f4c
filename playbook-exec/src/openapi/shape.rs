use crate::openapi::model::{dedupe_params, extract_parameter_obj, OpenApiParam};
use crate::openapi::refs::deref;

/// Merged parameters plus non-fatal diagnostics.
pub(crate) fn compile_operation_shape(
    doc: &serde_json::Value,
    path: &str,
    operation: &serde_json::Value,
) -> (Vec<OpenApiParam>, Vec<String>) {
    let mut diagnostics = Vec::<String>::new();

    // Path-level parameters first so operation-level ones override them.
    let mut params = Vec::new();
    if let Some(p) = doc
        .get("paths")
        .and_then(|p| p.get(path))
        .and_then(|item| item.get("parameters"))
    {
        params.extend(extract_params_with_refs(doc, "pathItem.parameters", p, &mut diagnostics));
    }
    if let Some(p) = operation.get("parameters") {
        params.extend(extract_params_with_refs(doc, "operation.parameters", p, &mut diagnostics));
    }

    (dedupe_params(params), diagnostics)
}

/// Prefers operation servers, then path-item servers, then the document default.
pub(crate) fn select_base_url(
    doc: &serde_json::Value,
    path: &str,
    operation: &serde_json::Value,
) -> Option<String> {
    if let Some(url) = servers_first_url(operation) {
        return Some(url);
    }
    if let Some(path_item) = doc.get("paths").and_then(|p| p.get(path)) {
        if let Some(url) = servers_first_url(path_item) {
            return Some(url);
        }
    }
    document_base_url(doc)
}

pub(crate) fn document_base_url(doc: &serde_json::Value) -> Option<String> {
    servers_first_url(doc).or_else(|| swagger_base_url(doc))
}

fn servers_first_url(v: &serde_json::Value) -> Option<String> {
    let servers = v.get("servers")?.as_array()?;
    let first = servers.first()?.as_object()?;
    first.get("url")?.as_str().map(|s| s.to_string())
}

fn swagger_base_url(doc: &serde_json::Value) -> Option<String> {
    let host = doc.get("host")?.as_str()?;
    let scheme = doc
        .get("schemes")
        .and_then(|s| s.as_array())
        .and_then(|s| s.first())
        .and_then(|s| s.as_str())
        .unwrap_or("https");
    let base_path = doc.get("basePath").and_then(|v| v.as_str()).unwrap_or("");
    Some(format!("{scheme}://{host}{base_path}"))
}

fn extract_params_with_refs(
    doc: &serde_json::Value,
    ctx: &str,
    parameters: &serde_json::Value,
    diagnostics: &mut Vec<String>,
) -> Vec<OpenApiParam> {
    let mut out = Vec::new();
    let Some(arr) = parameters.as_array() else {
        return out;
    };

    for p in arr {
        match deref(doc, p) {
            Ok(v) => match extract_parameter_obj(v) {
                Some(param) => out.push(param),
                None => diagnostics.push(format!("{ctx} entry is not a Parameter Object")),
            },
            Err(e) => diagnostics.push(format!("{ctx} {e}")),
        }
    }

    out
}
