//! Player record shapes: the stored record, creation input, and the typed
//! partial update.
//!
//! JSON field names are the wire format; the structs serialize to exactly
//! what lands in the store.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::store::Item;

/// One player's profile and cumulative statistics.
///
/// `contact_id` is the sole lookup key and immutable once created.
/// `record_id` is assigned at creation and never reused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    pub contact_id: String,
    pub record_id: String,
    pub display_name: String,
    #[serde(default)]
    pub jersey_number: Option<u32>,
    #[serde(default)]
    pub batting_stats: BattingStats,
    #[serde(default)]
    pub bowling_stats: BowlingStats,
    #[serde(default)]
    pub fielding_stats: FieldingStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batting_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bowling_style: Option<String>,
    /// Milliseconds since epoch.
    pub created_at: i64,
    /// Milliseconds since epoch; refreshed on every mutating write.
    pub updated_at: i64,
}

/// Cumulative batting statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BattingStats {
    pub matches: u32,
    pub runs: u32,
    pub balls: u32,
    pub highest: u32,
    pub fifties: u32,
    pub hundreds: u32,
    pub average: f64,
    pub strike_rate: f64,
}

/// Cumulative bowling statistics. `best` holds figures like `"5/12"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BowlingStats {
    pub matches: u32,
    pub balls: u32,
    pub runs_conceded: u32,
    pub wickets: u32,
    pub best: String,
    pub average: f64,
    pub economy: f64,
    pub five_fors: u32,
}

impl Default for BowlingStats {
    fn default() -> Self {
        Self {
            matches: 0,
            balls: 0,
            runs_conceded: 0,
            wickets: 0,
            best: "0/0".to_string(),
            average: 0.0,
            economy: 0.0,
            five_fors: 0,
        }
    }
}

/// Cumulative fielding statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldingStats {
    pub catches: u32,
    pub stumpings: u32,
    pub runouts: u32,
}

/// Creation input.
///
/// The required fields are options so a missing field reaches the service
/// as a validation failure rather than a deserialization rejection.
/// Partial stat sub-objects pick up field-level defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewPlayer {
    pub display_name: Option<String>,
    pub contact_id: Option<String>,
    pub jersey_number: Option<u32>,
    pub batting_stats: BattingStats,
    pub bowling_stats: BowlingStats,
    pub fielding_stats: FieldingStats,
    pub photo_url: Option<String>,
    pub date_of_birth: Option<String>,
    pub batting_style: Option<String>,
    pub bowling_style: Option<String>,
}

/// Typed partial update: a closed set of top-level fields.
///
/// A field left absent in the request body stays `None` and is not staged.
/// `jersey_number` is the one nullable field, so it distinguishes "absent"
/// from "set to null" with a double option. Stat sub-objects replace the
/// whole sub-object when present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerPatch {
    pub display_name: Option<String>,
    #[serde(deserialize_with = "double_option")]
    pub jersey_number: Option<Option<u32>>,
    pub batting_stats: Option<BattingStats>,
    pub bowling_stats: Option<BowlingStats>,
    pub fielding_stats: Option<FieldingStats>,
    pub photo_url: Option<String>,
    pub date_of_birth: Option<String>,
    pub batting_style: Option<String>,
    pub bowling_style: Option<String>,
}

impl PlayerPatch {
    /// Collect the staged fields as stored-item entries.
    pub fn staged(&self) -> Result<Item, serde_json::Error> {
        let mut fields = Item::new();
        if let Some(name) = &self.display_name {
            fields.insert("displayName".to_string(), Value::String(name.clone()));
        }
        if let Some(jersey) = &self.jersey_number {
            fields.insert("jerseyNumber".to_string(), serde_json::to_value(jersey)?);
        }
        if let Some(stats) = &self.batting_stats {
            fields.insert("battingStats".to_string(), serde_json::to_value(stats)?);
        }
        if let Some(stats) = &self.bowling_stats {
            fields.insert("bowlingStats".to_string(), serde_json::to_value(stats)?);
        }
        if let Some(stats) = &self.fielding_stats {
            fields.insert("fieldingStats".to_string(), serde_json::to_value(stats)?);
        }
        if let Some(url) = &self.photo_url {
            fields.insert("photoUrl".to_string(), Value::String(url.clone()));
        }
        if let Some(dob) = &self.date_of_birth {
            fields.insert("dateOfBirth".to_string(), Value::String(dob.clone()));
        }
        if let Some(style) = &self.batting_style {
            fields.insert("battingStyle".to_string(), Value::String(style.clone()));
        }
        if let Some(style) = &self.bowling_style {
            fields.insert("bowlingStyle".to_string(), Value::String(style.clone()));
        }
        Ok(fields)
    }
}

/// Present-but-null deserializes to `Some(None)`; an absent field falls
/// back to the container default of `None`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_bowling_stats_default_best_figures() {
        let stats = BowlingStats::default();
        assert_eq!(stats.best, "0/0");
        assert_eq!(stats.wickets, 0);
    }

    #[test]
    fn test_new_player_partial_stats_pick_up_defaults() {
        let input: NewPlayer = serde_json::from_value(json!({
            "displayName": "Rahul",
            "contactId": "+911234567890",
            "battingStats": {"runs": 10},
        }))
        .unwrap();

        assert_eq!(input.batting_stats.runs, 10);
        assert_eq!(input.batting_stats.matches, 0);
        assert_eq!(input.bowling_stats.best, "0/0");
        assert_eq!(input.fielding_stats.catches, 0);
    }

    #[test]
    fn test_patch_absent_jersey_is_not_staged() {
        let patch: PlayerPatch =
            serde_json::from_value(json!({"displayName": "Rahul K"})).unwrap();
        assert_eq!(patch.jersey_number, None);

        let fields = patch.staged().unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get("displayName"), Some(&json!("Rahul K")));
    }

    #[test]
    fn test_patch_null_jersey_is_staged_as_null() {
        let patch: PlayerPatch =
            serde_json::from_value(json!({"jerseyNumber": null})).unwrap();
        assert_eq!(patch.jersey_number, Some(None));

        let fields = patch.staged().unwrap();
        assert_eq!(fields.get("jerseyNumber"), Some(&Value::Null));
    }

    #[test]
    fn test_patch_sub_object_stages_full_replacement() {
        let patch: PlayerPatch =
            serde_json::from_value(json!({"battingStats": {"runs": 50}})).unwrap();

        let fields = patch.staged().unwrap();
        let staged = fields.get("battingStats").unwrap();
        // The whole sub-object is staged, absent fields at their defaults.
        assert_eq!(staged.get("runs"), Some(&json!(50)));
        assert_eq!(staged.get("matches"), Some(&json!(0)));
    }

    #[test]
    fn test_empty_patch_stages_nothing() {
        let patch = PlayerPatch::default();
        assert!(patch.staged().unwrap().is_empty());
    }

    #[test]
    fn test_record_serializes_jersey_null_and_skips_absent_optionals() {
        let record = PlayerRecord {
            contact_id: "+911234567890".to_string(),
            record_id: "r1".to_string(),
            display_name: "Rahul".to_string(),
            jersey_number: None,
            batting_stats: BattingStats::default(),
            bowling_stats: BowlingStats::default(),
            fielding_stats: FieldingStats::default(),
            photo_url: None,
            date_of_birth: None,
            batting_style: None,
            bowling_style: None,
            created_at: 1,
            updated_at: 1,
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value.get("jerseyNumber"), Some(&Value::Null));
        assert!(value.get("photoUrl").is_none());
        assert_eq!(value["bowlingStats"]["best"], json!("0/0"));
    }
}
