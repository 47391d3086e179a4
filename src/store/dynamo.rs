//! DynamoDB implementation of the key-value store.
//!
//! Items are marshalled between JSON objects and `AttributeValue` maps the
//! way a document client would, so the layers above never touch SDK types.
//! Every call is bounded by the configured timeout; expiry drops the
//! in-flight request and surfaces as [`StoreErrorKind::Timeout`]. Retries
//! happen inside the SDK, bounded by the configured max attempts.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::config::Credentials;
use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client;
use serde_json::Value;
use tracing::{error, info};

use crate::config::StoreConfig;
use crate::store::{Item, KeyValueStore, Result, StoreError, StoreErrorKind};

/// Build a DynamoDB client from configuration.
///
/// Static credentials are used when both halves are present; otherwise the
/// SDK's default provider chain applies. The endpoint override targets
/// DynamoDB Local.
pub async fn connect(config: &StoreConfig) -> Client {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.region.clone()))
        .retry_config(RetryConfig::standard().with_max_attempts(config.max_attempts));

    if let Some(endpoint) = &config.endpoint {
        loader = loader.endpoint_url(endpoint);
    }

    if let (Some(key), Some(secret)) = (&config.access_key_id, &config.secret_access_key) {
        loader = loader.credentials_provider(Credentials::new(key, secret, None, None, "pavilion"));
    }

    let sdk_config = loader.load().await;
    Client::new(&sdk_config)
}

/// Startup connectivity probe.
///
/// Describes the players table when one is configured, otherwise lists a
/// single table. Logs the outcome and never fails: the server still boots
/// when the store is down.
pub async fn check_connection(client: &Client, config: &StoreConfig) {
    if config.players_table.is_empty() {
        match client.list_tables().limit(1).send().await {
            Ok(_) => info!("connected to DynamoDB"),
            Err(e) => error!(
                error = %DisplayErrorContext(&e),
                "DynamoDB connection check failed"
            ),
        }
    } else {
        match client
            .describe_table()
            .table_name(&config.players_table)
            .send()
            .await
        {
            Ok(_) => info!(table = %config.players_table, "connected to DynamoDB, table available"),
            Err(e) => error!(
                table = %config.players_table,
                error = %DisplayErrorContext(&e),
                "DynamoDB connection check failed"
            ),
        }
    }
}

/// DynamoDB-backed [`KeyValueStore`] over one table with a single string
/// partition key.
pub struct DynamoStore {
    client: Client,
    table: String,
    key_attr: String,
    timeout: Duration,
}

impl DynamoStore {
    /// Create a store over `table`, addressing records by `key_attr`.
    pub fn new(
        client: Client,
        table: impl Into<String>,
        key_attr: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let table = table.into();
        info!(table = %table, "using DynamoDB table");
        Self {
            client,
            table,
            key_attr: key_attr.into(),
            timeout,
        }
    }

    /// Run `call` under the per-call deadline.
    ///
    /// On expiry the future is dropped, cancelling the request; the caller
    /// sees a `Timeout` error and no partial result.
    async fn bounded<T, F>(&self, op: &'static str, call: F) -> Result<T>
    where
        F: std::future::Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::timeout(op, self.timeout)),
        }
    }
}

#[async_trait]
impl KeyValueStore for DynamoStore {
    async fn put(&self, item: Item, fail_if_exists: bool) -> Result<()> {
        let attrs: HashMap<String, AttributeValue> = item
            .iter()
            .map(|(k, v)| (k.clone(), to_attribute_value(v)))
            .collect();

        let mut request = self
            .client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(attrs));
        if fail_if_exists {
            request = request
                .condition_expression("attribute_not_exists(#pk)")
                .expression_attribute_names("#pk", &self.key_attr);
        }

        self.bounded("put_item", async {
            request
                .send()
                .await
                .map_err(|e| normalize("put_item", StoreErrorKind::AlreadyExists, e))?;
            Ok(())
        })
        .await
    }

    async fn get(&self, key: &str) -> Result<Option<Item>> {
        let request = self
            .client
            .get_item()
            .table_name(&self.table)
            .key(&self.key_attr, AttributeValue::S(key.to_string()));

        let output = self
            .bounded("get_item", async {
                request
                    .send()
                    .await
                    .map_err(|e| normalize("get_item", StoreErrorKind::Unknown, e))
            })
            .await?;

        Ok(output.item.map(|attrs| from_attribute_map(&attrs)))
    }

    async fn update_partial(&self, key: &str, fields: Item, fail_if_missing: bool) -> Result<Item> {
        if fields.is_empty() {
            return Err(StoreError::new(
                StoreErrorKind::Unknown,
                "update_partial requires at least one field",
            ));
        }

        let (expression, mut names, values) = update_expression(&fields);

        let mut request = self
            .client
            .update_item()
            .table_name(&self.table)
            .key(&self.key_attr, AttributeValue::S(key.to_string()))
            .update_expression(expression)
            .return_values(ReturnValue::AllNew);
        if fail_if_missing {
            names.insert("#pk".to_string(), self.key_attr.clone());
            request = request.condition_expression("attribute_exists(#pk)");
        }
        request = request
            .set_expression_attribute_names(Some(names))
            .set_expression_attribute_values(Some(values));

        let output = self
            .bounded("update_item", async {
                request
                    .send()
                    .await
                    .map_err(|e| normalize("update_item", StoreErrorKind::NotFound, e))
            })
            .await?;

        Ok(from_attribute_map(&output.attributes.unwrap_or_default()))
    }

    async fn delete(&self, key: &str, fail_if_missing: bool) -> Result<()> {
        let mut request = self
            .client
            .delete_item()
            .table_name(&self.table)
            .key(&self.key_attr, AttributeValue::S(key.to_string()));
        if fail_if_missing {
            request = request
                .condition_expression("attribute_exists(#pk)")
                .expression_attribute_names("#pk", &self.key_attr);
        }

        self.bounded("delete_item", async {
            request
                .send()
                .await
                .map_err(|e| normalize("delete_item", StoreErrorKind::NotFound, e))?;
            Ok(())
        })
        .await
    }

    async fn scan(&self, limit: u32) -> Result<Vec<Item>> {
        let request = self
            .client
            .scan()
            .table_name(&self.table)
            .limit(limit.min(i32::MAX as u32) as i32);

        let output = self
            .bounded("scan", async {
                request
                    .send()
                    .await
                    .map_err(|e| normalize("scan", StoreErrorKind::Unknown, e))
            })
            .await?;

        Ok(output
            .items
            .unwrap_or_default()
            .iter()
            .map(from_attribute_map)
            .collect())
    }
}

/// Normalize an SDK error into the uniform [`StoreError`] shape.
///
/// `condition_failed` names the kind a `ConditionalCheckFailedException`
/// maps to for this call: an existence-gated put means the key was taken,
/// a presence-gated update/delete means it was absent.
fn normalize<E>(op: &'static str, condition_failed: StoreErrorKind, err: SdkError<E>) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let request_id = match &err {
        SdkError::ServiceError(ctx) => ctx
            .raw()
            .headers()
            .get("x-amzn-requestid")
            .map(str::to_string),
        _ => None,
    };

    let kind = match &err {
        SdkError::TimeoutError(_) => StoreErrorKind::Timeout,
        SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => StoreErrorKind::Transport,
        _ => kind_for_code(err.code(), condition_failed),
    };

    let message = err
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}", DisplayErrorContext(&err)));

    StoreError::new(kind, format!("{}: {}", op, message)).with_request_id(request_id)
}

/// Classify a service error code.
fn kind_for_code(code: Option<&str>, condition_failed: StoreErrorKind) -> StoreErrorKind {
    match code {
        Some("ConditionalCheckFailedException") => condition_failed,
        Some("RequestTimeout") | Some("RequestTimeoutException") => StoreErrorKind::Timeout,
        _ => StoreErrorKind::Unknown,
    }
}

/// Build a `SET` update expression with placeholder names and values.
///
/// Field names go through `#k{i}` placeholders so reserved words never
/// collide with attribute names.
fn update_expression(
    fields: &Item,
) -> (String, HashMap<String, String>, HashMap<String, AttributeValue>) {
    let mut names = HashMap::with_capacity(fields.len());
    let mut values = HashMap::with_capacity(fields.len());
    let mut sets = Vec::with_capacity(fields.len());

    for (i, (field, value)) in fields.iter().enumerate() {
        names.insert(format!("#k{i}"), field.clone());
        values.insert(format!(":v{i}"), to_attribute_value(value));
        sets.push(format!("#k{i} = :v{i}"));
    }

    (format!("SET {}", sets.join(", ")), names, values)
}

/// Marshal a JSON value into a DynamoDB attribute value.
fn to_attribute_value(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(items) => AttributeValue::L(items.iter().map(to_attribute_value).collect()),
        Value::Object(map) => AttributeValue::M(
            map.iter()
                .map(|(k, v)| (k.clone(), to_attribute_value(v)))
                .collect(),
        ),
    }
}

/// Unmarshal a DynamoDB attribute value back into JSON.
///
/// Numbers parse as integers first, then floats. Attribute types this
/// service never writes (sets, binary) come back as null.
fn from_attribute_value(attr: &AttributeValue) -> Value {
    match attr {
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::N(n) => {
            if let Ok(i) = n.parse::<i64>() {
                Value::from(i)
            } else if let Ok(f) = n.parse::<f64>() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            } else {
                Value::Null
            }
        }
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::L(items) => Value::Array(items.iter().map(from_attribute_value).collect()),
        AttributeValue::M(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), from_attribute_value(v)))
                .collect(),
        ),
        _ => Value::Null,
    }
}

fn from_attribute_map(attrs: &HashMap<String, AttributeValue>) -> Item {
    attrs
        .iter()
        .map(|(k, v)| (k.clone(), from_attribute_value(v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn as_item(value: Value) -> Item {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_update_expression_stages_every_field() {
        let fields = as_item(json!({
            "displayName": "Rahul",
            "updatedAt": 1700000000000i64,
        }));

        let (expression, names, values) = update_expression(&fields);

        assert_eq!(expression, "SET #k0 = :v0, #k1 = :v1");
        assert_eq!(names.get("#k0").map(String::as_str), Some("displayName"));
        assert_eq!(names.get("#k1").map(String::as_str), Some("updatedAt"));
        assert_eq!(
            values.get(":v0"),
            Some(&AttributeValue::S("Rahul".to_string()))
        );
        assert_eq!(
            values.get(":v1"),
            Some(&AttributeValue::N("1700000000000".to_string()))
        );
    }

    #[test]
    fn test_update_expression_single_field() {
        let fields = as_item(json!({"jerseyNumber": null}));
        let (expression, names, values) = update_expression(&fields);

        assert_eq!(expression, "SET #k0 = :v0");
        assert_eq!(names.len(), 1);
        assert_eq!(values.get(":v0"), Some(&AttributeValue::Null(true)));
    }

    #[test]
    fn test_kind_for_code_condition_failed_is_contextual() {
        assert_eq!(
            kind_for_code(
                Some("ConditionalCheckFailedException"),
                StoreErrorKind::AlreadyExists
            ),
            StoreErrorKind::AlreadyExists
        );
        assert_eq!(
            kind_for_code(
                Some("ConditionalCheckFailedException"),
                StoreErrorKind::NotFound
            ),
            StoreErrorKind::NotFound
        );
    }

    #[test]
    fn test_kind_for_code_unknown_codes() {
        assert_eq!(
            kind_for_code(Some("ResourceNotFoundException"), StoreErrorKind::NotFound),
            StoreErrorKind::Unknown
        );
        assert_eq!(
            kind_for_code(None, StoreErrorKind::AlreadyExists),
            StoreErrorKind::Unknown
        );
    }

    #[test]
    fn test_kind_for_code_timeouts() {
        assert_eq!(
            kind_for_code(Some("RequestTimeout"), StoreErrorKind::NotFound),
            StoreErrorKind::Timeout
        );
    }

    #[test]
    fn test_attribute_value_round_trip() {
        let original = json!({
            "contactId": "+911234567890",
            "jerseyNumber": null,
            "battingStats": {"matches": 0, "average": 45.5},
            "active": true,
            "tags": ["captain", "keeper"],
        });

        let attr = to_attribute_value(&original);
        assert_eq!(from_attribute_value(&attr), original);
    }

    #[test]
    fn test_numbers_survive_as_integers() {
        let attr = to_attribute_value(&json!(1700000000000i64));
        assert_eq!(attr, AttributeValue::N("1700000000000".to_string()));
        assert_eq!(from_attribute_value(&attr), json!(1700000000000i64));
    }

    #[test]
    fn test_unsupported_attribute_types_become_null() {
        let attr = AttributeValue::B(aws_sdk_dynamodb::primitives::Blob::new(vec![1, 2, 3]));
        assert_eq!(from_attribute_value(&attr), Value::Null);
    }
}
