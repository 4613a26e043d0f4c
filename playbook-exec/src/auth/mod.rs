pub mod cache;

use std::collections::BTreeMap;

use playbook_core::types::SecurityScheme;

pub use cache::{AuthCache, AuthCacheKey};

/// A credential value ready to be applied to a request.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ResolvedCredential {
    pub credential: String,
    pub method: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<SecurityScheme>,
}

/// Resolved credentials keyed by the auth reference (`credential[/method]`).
pub type AuthResult = BTreeMap<String, ResolvedCredential>;

/// Splits `credential[/method]`.
pub fn split_auth_ref(auth_ref: &str) -> (&str, Option<&str>) {
    match auth_ref.split_once('/') {
        Some((credential, method)) => (credential, Some(method)),
        None => (auth_ref, None),
    }
}
