//! Per-language translation cache.
//!
//! Keyed by `(language, identity)` where identity is a date string or a
//! composite list key. Entries are written once and live for the process
//! lifetime; there is no expiry and no in-place mutation, so concurrent
//! reads are always safe. Two tasks missing on the same key may both
//! compute — both results are deterministic for the key, last write wins.
//!
//! This is an explicit service instance handed to the orchestrator, not
//! module-level state.

use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub language: String,
    pub identity: String,
}

impl CacheKey {
    pub fn new(language: impl Into<String>, identity: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            identity: identity.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct TranslationCache<T> {
    entries: RwLock<HashMap<CacheKey, T>>,
}

impl<T: Clone> TranslationCache<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<T> {
        self.entries
            .read()
            .expect("translation cache lock poisoned")
            .get(key)
            .cloned()
    }

    pub fn insert(&self, key: CacheKey, payload: T) {
        self.entries
            .write()
            .expect("translation cache lock poisoned")
            .insert(key, payload);
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries
            .read()
            .expect("translation cache lock poisoned")
            .contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .expect("translation cache lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn miss_then_hit() {
        let cache: TranslationCache<String> = TranslationCache::new();
        let key = CacheKey::new("hi", "2025-01-14");

        assert_eq!(cache.get(&key), None);
        cache.insert(key.clone(), "payload".to_string());
        assert_eq!(cache.get(&key).as_deref(), Some("payload"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn language_is_part_of_the_key() {
        let cache: TranslationCache<String> = TranslationCache::new();
        cache.insert(CacheKey::new("hi", "2025-01-14"), "hindi".to_string());
        cache.insert(CacheKey::new("gu", "2025-01-14"), "gujarati".to_string());

        assert_eq!(cache.get(&CacheKey::new("hi", "2025-01-14")).as_deref(), Some("hindi"));
        assert_eq!(cache.get(&CacheKey::new("gu", "2025-01-14")).as_deref(), Some("gujarati"));
        assert_eq!(cache.get(&CacheKey::new("en", "2025-01-14")), None);
    }
}
