//! REST adapter.
//!
//! Translates HTTP verbs and paths into service calls and maps domain
//! errors onto status codes. Every body is the
//! `{ success, data?, message? }` envelope; 5xx responses carry a generic
//! message while details go to the log.
//!
//! Routes:
//! - `GET /health`: liveness probe
//! - `GET /players`, `GET /players/:contact_id`: public reads
//! - `POST/PATCH/DELETE /players...`: admin writes
//! - `GET /global-links`, `PATCH/DELETE /global-links/...`: links

mod auth;
mod links;
mod players;


pub use auth::{AdminAuth, AdminClaims, AuthError};

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::links::{LinksError, LinksService};
use crate::players::{PlayerError, PlayerService};

/// Shared state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub players: Arc<PlayerService>,
    pub links: Arc<LinksService>,
    pub auth: Arc<AdminAuth>,
}

/// Start the REST server.
///
/// When the configured port is 0, the OS assigns an ephemeral port; the
/// actual bound port is always logged.
pub async fn serve(
    state: AppState,
    config: &ServerConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = router(state, &config.cors_origins);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let actual_port = listener.local_addr()?.port();
    info!(port = actual_port, "REST API listening");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Build the axum router (separated for testing).
pub fn router(state: AppState, cors_origins: &[String]) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/players", get(players::list))
        .route("/players/:contact_id", get(players::get_one))
        .route("/global-links", get(links::get_links));

    let admin = Router::new()
        .route("/players", post(players::create))
        .route(
            "/players/:contact_id",
            patch(players::update).delete(players::remove),
        )
        .route(
            "/global-links/press",
            patch(links::set_press).delete(links::clear_press),
        )
        .route(
            "/global-links/auction",
            patch(links::set_auction).delete(links::clear_auction),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin,
        ));

    Router::new()
        .merge(public)
        .merge(admin)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

/// CORS for the browser frontend: an empty origin list means any origin,
/// otherwise the configured allowlist.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(parsed))
}

async fn health() -> Response {
    Json(serde_json::json!({
        "ok": true,
        "time": chrono::Utc::now().to_rfc3339(),
    }))
    .into_response()
}

// ============================================================================
// Response envelope
// ============================================================================

/// JSON envelope carried by every response body.
#[derive(Serialize)]
struct ApiResponse<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

fn data_response<T: Serialize>(status: StatusCode, data: T) -> Response {
    (
        status,
        Json(ApiResponse {
            success: true,
            data: Some(data),
            message: None,
        }),
    )
        .into_response()
}

fn ack_response(message: &str) -> Response {
    (
        StatusCode::OK,
        Json(ApiResponse::<()> {
            success: true,
            data: None,
            message: Some(message.to_string()),
        }),
    )
        .into_response()
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            message: Some(message.into()),
        }),
    )
        .into_response()
}

// ============================================================================
// Error mapping
// ============================================================================

/// Domain failure mapped onto a status code and user-visible message.
struct ApiError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error_response(self.status, self.message)
    }
}

impl From<PlayerError> for ApiError {
    fn from(err: PlayerError) -> Self {
        match &err {
            PlayerError::Validation(_) => Self {
                status: StatusCode::BAD_REQUEST,
                message: err.to_string(),
            },
            PlayerError::Conflict(_) => Self {
                status: StatusCode::CONFLICT,
                message: "Player with this contact id already exists".to_string(),
            },
            PlayerError::NotFound(_) => Self {
                status: StatusCode::NOT_FOUND,
                message: "Player not found".to_string(),
            },
            PlayerError::Codec(e) => {
                error!(error = %e, "player record failed to round-trip");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "Internal error".to_string(),
                }
            }
            PlayerError::Store(e) if e.is_timeout() => {
                error!(error = %e, request_id = ?e.request_id, "store call timed out");
                Self {
                    status: StatusCode::SERVICE_UNAVAILABLE,
                    message: "Store timed out".to_string(),
                }
            }
            PlayerError::Store(e) => {
                error!(error = %e, request_id = ?e.request_id, "store call failed");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "Internal error".to_string(),
                }
            }
        }
    }
}

impl From<LinksError> for ApiError {
    fn from(err: LinksError) -> Self {
        match &err {
            LinksError::Store(e) if e.is_timeout() => {
                error!(error = %e, request_id = ?e.request_id, "store call timed out");
                Self {
                    status: StatusCode::SERVICE_UNAVAILABLE,
                    message: "Store timed out".to_string(),
                }
            }
            _ => {
                error!(error = %err, "global links operation failed");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "Internal error".to_string(),
                }
            }
        }
    }
}
