//! pavilion-server: REST backend for the league site.
//!
//! Boot sequence: tracing, configuration load and validation, DynamoDB
//! client construction, a non-fatal connectivity probe, then serve. The
//! probe only logs; the server still boots when the store is unreachable.
//!
//! ## Configuration
//! - `PAVILION_CONFIG` or first argument: YAML config file path
//! - `PAVILION__STORE__REGION`, `PAVILION__STORE__PLAYERS_TABLE`, ...:
//!   environment overrides for any setting
//! - `PAVILION_LOG`: log filter (default `info`)

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use pavilion::config::{Config, LOG_ENV_VAR};
use pavilion::http::{self, AdminAuth, AppState};
use pavilion::links::LinksService;
use pavilion::players::PlayerService;
use pavilion::store::{dynamo, DynamoStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_tracing();

    let config_path = std::env::args().nth(1);
    let config = Config::load(config_path.as_deref()).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;
    config.validate()?;

    info!("Starting pavilion-server");

    let client = dynamo::connect(&config.store).await;
    dynamo::check_connection(&client, &config.store).await;

    let timeout = Duration::from_millis(config.store.timeout_ms);
    let players = Arc::new(PlayerService::new(Arc::new(DynamoStore::new(
        client.clone(),
        &config.store.players_table,
        "contactId",
        timeout,
    ))));
    let links = Arc::new(LinksService::new(Arc::new(DynamoStore::new(
        client,
        &config.store.links_table,
        "id",
        timeout,
    ))));
    let auth = Arc::new(AdminAuth::new(&config.auth.jwt_secret));

    let state = AppState {
        players,
        links,
        auth,
    };
    http::serve(state, &config.server).await?;
    Ok(())
}

/// Initialize tracing with the `PAVILION_LOG` environment variable.
///
/// Defaults to "info" level if `PAVILION_LOG` is not set.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV_VAR)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
