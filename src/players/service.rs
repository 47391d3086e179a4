//! Player record service: invariants on top of the raw store.
//!
//! The only component aware of the [`PlayerRecord`] shape. Uniqueness and
//! existence are delegated to the store's conditional writes, never to an
//! in-process lock; two concurrent creates for one contact id resolve with
//! exactly one winner.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use crate::players::record::{NewPlayer, PlayerPatch, PlayerRecord};
use crate::store::{Item, KeyValueStore, StoreError};

/// Upper bound on records returned by [`PlayerService::list`].
pub const LIST_LIMIT: u32 = 100;

/// Failures surfaced by player operations.
#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    /// Caller omitted a required input field.
    #[error("{0}")]
    Validation(String),

    /// A create collided with an existing contact id.
    #[error("player with contact id {0} already exists")]
    Conflict(String),

    /// No record for the addressed contact id.
    #[error("player {0} not found")]
    NotFound(String),

    /// A record failed to round-trip through its stored shape.
    #[error("player record serialization: {0}")]
    Codec(#[from] serde_json::Error),

    /// Store failure passed through unchanged.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// CRUD over player records keyed by contact id.
pub struct PlayerService {
    store: Arc<dyn KeyValueStore>,
}

impl PlayerService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Create a player, failing with [`PlayerError::Conflict`] when the
    /// contact id is already taken.
    ///
    /// The record gets a generated id, defaulted stat sub-objects, and both
    /// timestamps set to now. Uniqueness rides on the store's atomic
    /// conditional write.
    pub async fn create(&self, input: NewPlayer) -> Result<PlayerRecord, PlayerError> {
        let display_name = non_empty(input.display_name.as_deref());
        let contact_id = non_empty(input.contact_id.as_deref());
        let (Some(display_name), Some(contact_id)) = (display_name, contact_id) else {
            return Err(PlayerError::Validation(
                "displayName and contactId are required".to_string(),
            ));
        };

        let now = now_millis();
        let record = PlayerRecord {
            contact_id,
            record_id: Uuid::new_v4().to_string(),
            display_name,
            jersey_number: input.jersey_number,
            batting_stats: input.batting_stats,
            bowling_stats: input.bowling_stats,
            fielding_stats: input.fielding_stats,
            photo_url: input.photo_url,
            date_of_birth: input.date_of_birth,
            batting_style: input.batting_style,
            bowling_style: input.bowling_style,
            created_at: now,
            updated_at: now,
        };

        match self.store.put(to_item(&record)?, true).await {
            Ok(()) => {
                info!(contact_id = %record.contact_id, "player created");
                Ok(record)
            }
            Err(e) if e.is_already_exists() => Err(PlayerError::Conflict(record.contact_id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Fetch a player by contact id.
    pub async fn get(&self, contact_id: &str) -> Result<PlayerRecord, PlayerError> {
        let contact_id = normalize_contact_id(contact_id);
        match self.store.get(&contact_id).await? {
            Some(item) => from_item(item),
            None => Err(PlayerError::NotFound(contact_id)),
        }
    }

    /// Merge a partial update into an existing player and return the merged
    /// record.
    ///
    /// Every staged field plus a fresh `updatedAt` is written in one atomic
    /// merge. A patch with nothing staged is a read-only no-op: no write,
    /// `updatedAt` untouched, though an absent record still surfaces as
    /// [`PlayerError::NotFound`].
    pub async fn update(
        &self,
        contact_id: &str,
        patch: PlayerPatch,
    ) -> Result<PlayerRecord, PlayerError> {
        let contact_id = normalize_contact_id(contact_id);
        let mut fields = patch.staged()?;
        if fields.is_empty() {
            return self.get(&contact_id).await;
        }
        fields.insert("updatedAt".to_string(), Value::from(now_millis()));

        match self.store.update_partial(&contact_id, fields, true).await {
            Ok(item) => {
                debug!(contact_id = %contact_id, "player updated");
                from_item(item)
            }
            Err(e) if e.is_not_found() => Err(PlayerError::NotFound(contact_id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a player; absent records surface as [`PlayerError::NotFound`].
    pub async fn delete(&self, contact_id: &str) -> Result<(), PlayerError> {
        let contact_id = normalize_contact_id(contact_id);
        match self.store.delete(&contact_id, true).await {
            Ok(()) => {
                info!(contact_id = %contact_id, "player deleted");
                Ok(())
            }
            Err(e) if e.is_not_found() => Err(PlayerError::NotFound(contact_id)),
            Err(e) => Err(e.into()),
        }
    }

    /// List up to [`LIST_LIMIT`] players in store order.
    ///
    /// When the store holds more than the bound this is "some players",
    /// not "all players".
    pub async fn list(&self) -> Result<Vec<PlayerRecord>, PlayerError> {
        let items = self.store.scan(LIST_LIMIT).await?;
        items.into_iter().map(from_item).collect()
    }
}

/// The HTTP layer percent-decodes path segments; here only surrounding
/// whitespace is stripped.
fn normalize_contact_id(raw: &str) -> String {
    raw.trim().to_string()
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn to_item(record: &PlayerRecord) -> Result<Item, PlayerError> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        other => {
            let err: serde_json::Error =
                serde::ser::Error::custom(format!("expected object, got {other}"));
            Err(PlayerError::Codec(err))
        }
    }
}

fn from_item(item: Item) -> Result<PlayerRecord, PlayerError> {
    Ok(serde_json::from_value(Value::Object(item))?)
}
