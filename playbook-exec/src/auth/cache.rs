use std::collections::HashMap;

/// Identity of a resolved credential value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AuthCacheKey {
    pub credential: String,
    pub method: String,
}

impl AuthCacheKey {
    pub fn new(credential: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            credential: credential.into(),
            method: method.into(),
        }
    }
}

/// Credential values resolved during one top-level run. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct AuthCache {
    entries: HashMap<AuthCacheKey, String>,
}

impl AuthCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, credential: &str, method: &str) -> Option<&str> {
        self.entries
            .get(&AuthCacheKey::new(credential, method))
            .map(String::as_str)
    }

    pub fn insert(&mut self, credential: &str, method: &str, value: impl Into<String>) {
        self.entries
            .insert(AuthCacheKey::new(credential, method), value.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
