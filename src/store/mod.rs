//! Key-value store access.
//!
//! Everything that talks to the remote store goes through the
//! [`KeyValueStore`] trait: one choke point that owns conditional-write
//! semantics, per-call timeouts, and error normalization. Layers above it
//! only ever see [`StoreError`], never SDK error types.

pub mod dynamo;
mod error;
pub mod memory;

pub use dynamo::DynamoStore;
pub use error::{StoreError, StoreErrorKind};
pub use memory::MemoryStore;

use async_trait::async_trait;

/// A stored record: a JSON object keyed by attribute name.
///
/// The DynamoDB implementation marshals these to `AttributeValue` maps and
/// back, so callers work in plain JSON terms.
pub type Item = serde_json::Map<String, serde_json::Value>;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Remote key-value store with existence-gated writes.
///
/// Implementations address records by a single unique key attribute fixed
/// at construction time. Absence of a record is a normal outcome for
/// `get`, never an error.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Write `item` in full.
    ///
    /// With `fail_if_exists`, the write is atomic against prior existence
    /// of the item's key: it either lands whole or fails with
    /// [`StoreErrorKind::AlreadyExists`] leaving no partial state.
    async fn put(&self, item: Item, fail_if_exists: bool) -> Result<()>;

    /// Fetch the record stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Item>>;

    /// Atomically merge `fields` into the record under `key` and return the
    /// fully merged record.
    ///
    /// With `fail_if_missing`, an absent key fails with
    /// [`StoreErrorKind::NotFound`] and no record is created. `fields` must
    /// be non-empty; an empty set is a contract violation reported as
    /// [`StoreErrorKind::Unknown`].
    async fn update_partial(&self, key: &str, fields: Item, fail_if_missing: bool) -> Result<Item>;

    /// Remove the record under `key`.
    ///
    /// With `fail_if_missing`, an absent key fails with
    /// [`StoreErrorKind::NotFound`].
    async fn delete(&self, key: &str, fail_if_missing: bool) -> Result<()>;

    /// Return up to `limit` records in store-defined order.
    ///
    /// No ordering or completeness guarantee across calls; this is a
    /// moderate-size listing primitive, not an enumeration.
    async fn scan(&self, limit: u32) -> Result<Vec<Item>>;
}
