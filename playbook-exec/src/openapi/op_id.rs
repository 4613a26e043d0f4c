use crate::openapi::model::{method_keys, ResolvedOperation};
use crate::openapi::shape::{compile_operation_shape, select_base_url};

pub(crate) fn find_operation_by_id(
    doc: &serde_json::Value,
    operation_id: &str,
) -> Option<ResolvedOperation> {
    let paths = doc.get("paths")?.as_object()?;
    for (path, item) in paths {
        let Some(item_obj) = item.as_object() else {
            continue;
        };
        for method in method_keys() {
            let Some(op) = item_obj.get(*method) else {
                continue;
            };
            let Some(opid) = op.get("operationId").and_then(|v| v.as_str()) else {
                continue;
            };
            if opid != operation_id {
                continue;
            }

            let base_url = select_base_url(doc, path, op).unwrap_or_default();
            let (parameters, diagnostics) = compile_operation_shape(doc, path, op);
            for d in diagnostics {
                tracing::warn!(operation_id, "{d}");
            }
            return Some(ResolvedOperation {
                operation_id: operation_id.to_string(),
                method: method.to_uppercase(),
                path: path.clone(),
                base_url,
                parameters,
            });
        }
    }
    None
}
