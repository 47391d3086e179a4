//! In-memory [`KeyValueStore`] for tests.
//!
//! Honors the same conditional-write and merge contract as the DynamoDB
//! implementation, plus a failure-injection knob for exercising error
//! paths above the adapter.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::store::{Item, KeyValueStore, Result, StoreError, StoreErrorKind};

/// Key-value store held in a `RwLock<HashMap>`.
pub struct MemoryStore {
    key_attr: String,
    items: RwLock<HashMap<String, Item>>,
    fail_with: RwLock<Option<StoreErrorKind>>,
}

impl MemoryStore {
    /// Create a store addressing records by `key_attr`.
    pub fn new(key_attr: impl Into<String>) -> Self {
        Self {
            key_attr: key_attr.into(),
            items: RwLock::new(HashMap::new()),
            fail_with: RwLock::new(None),
        }
    }

    /// Make every subsequent call fail with `kind` until cleared with `None`.
    pub async fn set_failure(&self, kind: Option<StoreErrorKind>) {
        *self.fail_with.write().await = kind;
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    /// True when no records are stored.
    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    async fn check_failure(&self) -> Result<()> {
        if let Some(kind) = *self.fail_with.read().await {
            return Err(StoreError::new(kind, "injected failure"));
        }
        Ok(())
    }

    fn key_of(&self, item: &Item) -> Result<String> {
        item.get(&self.key_attr)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                StoreError::new(
                    StoreErrorKind::Unknown,
                    format!("item missing key attribute {}", self.key_attr),
                )
            })
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn put(&self, item: Item, fail_if_exists: bool) -> Result<()> {
        self.check_failure().await?;
        let key = self.key_of(&item)?;
        let mut items = self.items.write().await;
        if fail_if_exists && items.contains_key(&key) {
            return Err(StoreError::new(
                StoreErrorKind::AlreadyExists,
                format!("key {key} already exists"),
            ));
        }
        items.insert(key, item);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Item>> {
        self.check_failure().await?;
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn update_partial(&self, key: &str, fields: Item, fail_if_missing: bool) -> Result<Item> {
        self.check_failure().await?;
        if fields.is_empty() {
            return Err(StoreError::new(
                StoreErrorKind::Unknown,
                "update_partial requires at least one field",
            ));
        }
        let mut items = self.items.write().await;
        match items.entry(key.to_string()) {
            Entry::Occupied(mut entry) => {
                let existing = entry.get_mut();
                for (field, value) in fields {
                    existing.insert(field, value);
                }
                Ok(existing.clone())
            }
            Entry::Vacant(entry) => {
                if fail_if_missing {
                    return Err(StoreError::new(
                        StoreErrorKind::NotFound,
                        format!("key {key} not found"),
                    ));
                }
                let mut created = fields;
                created.insert(self.key_attr.clone(), Value::String(key.to_string()));
                Ok(entry.insert(created).clone())
            }
        }
    }

    async fn delete(&self, key: &str, fail_if_missing: bool) -> Result<()> {
        self.check_failure().await?;
        let removed = self.items.write().await.remove(key);
        if removed.is_none() && fail_if_missing {
            return Err(StoreError::new(
                StoreErrorKind::NotFound,
                format!("key {key} not found"),
            ));
        }
        Ok(())
    }

    async fn scan(&self, limit: u32) -> Result<Vec<Item>> {
        self.check_failure().await?;
        Ok(self
            .items
            .read()
            .await
            .values()
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn item(key: &str, extra: &str) -> Item {
        match json!({"contactId": key, "extra": extra}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn store() -> MemoryStore {
        MemoryStore::new("contactId")
    }

    #[tokio::test]
    async fn test_conditional_put_rejects_duplicate() {
        let store = store();
        store.put(item("a", "first"), true).await.unwrap();

        let err = store.put(item("a", "second"), true).await.unwrap_err();
        assert!(err.is_already_exists());

        // Losing write left no partial state.
        let stored = store.get("a").await.unwrap().unwrap();
        assert_eq!(stored.get("extra"), Some(&json!("first")));
    }

    #[tokio::test]
    async fn test_unconditional_put_overwrites() {
        let store = store();
        store.put(item("a", "first"), false).await.unwrap();
        store.put(item("a", "second"), false).await.unwrap();

        let stored = store.get("a").await.unwrap().unwrap();
        assert_eq!(stored.get("extra"), Some(&json!("second")));
    }

    #[tokio::test]
    async fn test_get_absent_is_none_not_error() {
        let store = store();
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_partial_merges_top_level_fields() {
        let store = store();
        store.put(item("a", "first"), true).await.unwrap();

        let fields = match json!({"extra": "patched", "new": 7}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let merged = store.update_partial("a", fields, true).await.unwrap();

        assert_eq!(merged.get("contactId"), Some(&json!("a")));
        assert_eq!(merged.get("extra"), Some(&json!("patched")));
        assert_eq!(merged.get("new"), Some(&json!(7)));
    }

    #[tokio::test]
    async fn test_update_partial_guarded_missing_key() {
        let store = store();
        let fields = match json!({"extra": "patched"}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let err = store.update_partial("missing", fields, true).await.unwrap_err();
        assert!(err.is_not_found());
        // The guard must not create the record as a side effect.
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_partial_rejects_empty_fields() {
        let store = store();
        store.put(item("a", "first"), true).await.unwrap();
        let err = store.update_partial("a", Item::new(), true).await.unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::Unknown);
    }

    #[tokio::test]
    async fn test_guarded_delete_of_absent_key() {
        let store = store();
        store.put(item("a", "x"), true).await.unwrap();
        store.delete("a", true).await.unwrap();
        let err = store.delete("a", true).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_scan_honors_limit() {
        let store = store();
        for i in 0..10 {
            store.put(item(&format!("k{i}"), "x"), true).await.unwrap();
        }
        assert_eq!(store.scan(4).await.unwrap().len(), 4);
        assert_eq!(store.scan(100).await.unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let store = store();
        store.set_failure(Some(StoreErrorKind::Timeout)).await;
        assert!(store.get("a").await.unwrap_err().is_timeout());

        store.set_failure(None).await;
        assert!(store.get("a").await.unwrap().is_none());
    }
}
