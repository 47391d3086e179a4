//! Global links: one mutable record of site-wide URLs.
//!
//! Press-conference and auction links live in a single record under a
//! fixed key. Updates are read-modify-write with last-write-wins; an
//! absent record reads as the default (empty links).

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::store::{KeyValueStore, StoreError};

/// Fixed key of the singleton record.
const LINKS_KEY: &str = "global";

/// Site-wide links shown by the frontend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GlobalLinks {
    pub press_conference_link: String,
    pub auction_link: String,
}

/// Failures surfaced by global-links operations.
#[derive(Debug, thiserror::Error)]
pub enum LinksError {
    /// The record failed to round-trip through its stored shape.
    #[error("global links serialization: {0}")]
    Codec(#[from] serde_json::Error),

    /// Store failure passed through unchanged.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Read and mutate the global-links singleton.
pub struct LinksService {
    store: Arc<dyn KeyValueStore>,
}

impl LinksService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Current links, defaulting to empty when nothing is stored yet.
    pub async fn get(&self) -> Result<GlobalLinks, LinksError> {
        match self.store.get(LINKS_KEY).await? {
            Some(item) => Ok(serde_json::from_value(Value::Object(item))?),
            None => Ok(GlobalLinks::default()),
        }
    }

    pub async fn set_press(&self, url: &str) -> Result<(), LinksError> {
        let mut links = self.get().await?;
        links.press_conference_link = url.to_string();
        self.put(links).await
    }

    pub async fn set_auction(&self, url: &str) -> Result<(), LinksError> {
        let mut links = self.get().await?;
        links.auction_link = url.to_string();
        self.put(links).await
    }

    pub async fn clear_press(&self) -> Result<(), LinksError> {
        self.set_press("").await
    }

    pub async fn clear_auction(&self) -> Result<(), LinksError> {
        self.set_auction("").await
    }

    async fn put(&self, links: GlobalLinks) -> Result<(), LinksError> {
        let mut item = match serde_json::to_value(&links)? {
            Value::Object(map) => map,
            other => {
                let err: serde_json::Error =
                    serde::ser::Error::custom(format!("expected object, got {other}"));
                return Err(LinksError::Codec(err));
            }
        };
        item.insert("id".to_string(), Value::String(LINKS_KEY.to_string()));
        self.store.put(item, false).await?;
        info!("global links updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn service() -> LinksService {
        LinksService::new(Arc::new(MemoryStore::new("id")))
    }

    #[tokio::test]
    async fn test_absent_record_reads_as_default() {
        let service = service();
        assert_eq!(service.get().await.unwrap(), GlobalLinks::default());
    }

    #[tokio::test]
    async fn test_set_press_preserves_auction() {
        let service = service();
        service.set_auction("https://example.com/auction").await.unwrap();
        service.set_press("https://example.com/press").await.unwrap();

        let links = service.get().await.unwrap();
        assert_eq!(links.press_conference_link, "https://example.com/press");
        assert_eq!(links.auction_link, "https://example.com/auction");
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let service = service();
        service.set_press("https://old.example.com").await.unwrap();
        service.set_press("https://new.example.com").await.unwrap();

        let links = service.get().await.unwrap();
        assert_eq!(links.press_conference_link, "https://new.example.com");
    }

    #[tokio::test]
    async fn test_clear_resets_to_empty() {
        let service = service();
        service.set_press("https://example.com/press").await.unwrap();
        service.clear_press().await.unwrap();

        let links = service.get().await.unwrap();
        assert_eq!(links.press_conference_link, "");
    }
}
