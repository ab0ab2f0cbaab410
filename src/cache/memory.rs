//! In-process cache.

use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;

use super::{CacheError, CacheStore};

/// A thread-safe in-memory cache; clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    inner: Arc<DashMap<String, Value>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &str) -> Option<Value> {
        self.inner.get(key).map(|r| r.value().clone())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), CacheError> {
        self.inner.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.inner.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        self.inner.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cache_operations() {
        let cache = MemoryCache::new();
        assert!(cache.get("routes").is_none());

        cache.set("routes", json!({ "admin": "x" })).unwrap();
        assert_eq!(cache.get("routes"), Some(json!({ "admin": "x" })));
        assert!(cache.contains("routes"));

        // clones share storage
        let other = cache.clone();
        other.delete("routes").unwrap();
        assert!(cache.is_empty());

        cache.set("a", json!(1)).unwrap();
        cache.set("b", json!(2)).unwrap();
        cache.clear().unwrap();
        assert_eq!(cache.len(), 0);
    }
}
