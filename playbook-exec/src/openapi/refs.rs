use std::collections::HashSet;

pub(crate) fn resolve_ref<'a>(
    doc: &'a serde_json::Value,
    ref_str: &str,
    visited: &mut HashSet<String>,
) -> Result<&'a serde_json::Value, RefError> {
    if !ref_str.starts_with('#') {
        return Err(RefError::ExternalRef(ref_str.to_string()));
    }

    let pointer = ref_str.trim_start_matches('#');
    if !visited.insert(ref_str.to_string()) {
        return Err(RefError::Cycle(ref_str.to_string()));
    }

    doc.pointer(pointer)
        .ok_or_else(|| RefError::NotFound(ref_str.to_string()))
}

/// Follows `$ref` chains until a non-reference object is reached.
pub(crate) fn deref<'a>(
    doc: &'a serde_json::Value,
    value: &'a serde_json::Value,
) -> Result<&'a serde_json::Value, RefError> {
    let mut visited = HashSet::new();
    let mut current = value;
    while let Some(r) = current.get("$ref").and_then(|v| v.as_str()) {
        current = resolve_ref(doc, r, &mut visited)?;
    }
    Ok(current)
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum RefError {
    #[error("unsupported external $ref: {0}")]
    ExternalRef(String),
    #[error("unresolvable $ref: {0}")]
    NotFound(String),
    #[error("cyclic $ref: {0}")]
    Cycle(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn follows_chains_and_detects_cycles() {
        let doc = json!({
            "components": {
                "parameters": {
                    "a": { "$ref": "#/components/parameters/b" },
                    "b": { "name": "id", "in": "path" },
                    "x": { "$ref": "#/components/parameters/y" },
                    "y": { "$ref": "#/components/parameters/x" }
                }
            }
        });
        let start = json!({ "$ref": "#/components/parameters/a" });
        assert_eq!(deref(&doc, &start).unwrap()["name"], json!("id"));

        let cyclic = json!({ "$ref": "#/components/parameters/x" });
        assert!(matches!(deref(&doc, &cyclic), Err(RefError::Cycle(_))));

        let external = json!({ "$ref": "other.yaml#/x" });
        assert!(matches!(deref(&doc, &external), Err(RefError::ExternalRef(_))));
    }
}
