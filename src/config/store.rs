//! Key-value store configuration.

use serde::Deserialize;

/// DynamoDB store configuration.
///
/// Credentials are optional; when absent the SDK's default provider chain
/// is used. The endpoint override exists for local testing against
/// DynamoDB Local.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// AWS region.
    pub region: String,
    /// Table holding player records, keyed by contact id.
    pub players_table: String,
    /// Table holding the global-links singleton.
    pub links_table: String,
    /// Endpoint override for local testing.
    pub endpoint: Option<String>,
    /// Static access key id. Falls back to the default provider chain.
    pub access_key_id: Option<String>,
    /// Static secret access key. Falls back to the default provider chain.
    pub secret_access_key: Option<String>,
    /// Maximum request attempts within the SDK (first try + retries).
    pub max_attempts: u32,
    /// Per-call timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            region: "ap-south-1".to_string(),
            players_table: "players".to_string(),
            links_table: "global-links".to_string(),
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
            max_attempts: 3,
            timeout_ms: 5000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_config_default() {
        let config = StoreConfig::default();
        assert_eq!(config.region, "ap-south-1");
        assert_eq!(config.players_table, "players");
        assert_eq!(config.links_table, "global-links");
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.timeout_ms, 5000);
        assert!(config.endpoint.is_none());
        assert!(config.access_key_id.is_none());
    }
}
