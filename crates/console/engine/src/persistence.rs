//! Key-value persistence seam for saved blueprints

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use console_types::{ConsoleError, ConsoleResult};

/// A small persisted key-value area.
///
/// Implementations use interior mutability so one store can be shared by
/// the console and whatever reloads it later.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> ConsoleResult<Option<String>>;

    fn put(&self, key: &str, value: String) -> ConsoleResult<()>;

    /// Returns whether the key existed.
    fn delete(&self, key: &str) -> ConsoleResult<bool>;

    /// Matching keys in ascending order
    fn keys_with_prefix(&self, prefix: &str) -> ConsoleResult<Vec<String>>;
}

/// In-memory store; clones share the same data
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> ConsoleError {
    ConsoleError::Persistence("memory store lock poisoned".to_string())
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> ConsoleResult<Option<String>> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: String) -> ConsoleResult<()> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> ConsoleResult<bool> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        Ok(entries.remove(key).is_some())
    }

    fn keys_with_prefix(&self, prefix: &str) -> ConsoleResult<Vec<String>> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_scan() {
        let store = MemoryStore::new();
        store.put("blueprints/2", "b".into()).unwrap();
        store.put("blueprints/1", "a".into()).unwrap();
        store.put("other/1", "x".into()).unwrap();
        assert_eq!(
            store.keys_with_prefix("blueprints/").unwrap(),
            vec!["blueprints/1", "blueprints/2"]
        );
    }

    #[test]
    fn test_clones_share_data() {
        let store = MemoryStore::new();
        let view = store.clone();
        store.put("k", "v".into()).unwrap();
        assert_eq!(view.get("k").unwrap().as_deref(), Some("v"));
        assert!(view.delete("k").unwrap());
        assert!(!store.delete("k").unwrap());
        assert!(store.is_empty());
    }
}
