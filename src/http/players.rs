//! Player route handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;

use super::{ack_response, data_response, ApiError, AppState};
use crate::players::{NewPlayer, PlayerPatch};

/// `GET /players`: public listing, bounded by the service.
pub(crate) async fn list(State(state): State<AppState>) -> Result<Response, ApiError> {
    let players = state.players.list().await?;
    Ok(data_response(StatusCode::OK, players))
}

/// `GET /players/:contact_id`: the path segment arrives percent-decoded.
pub(crate) async fn get_one(
    State(state): State<AppState>,
    Path(contact_id): Path<String>,
) -> Result<Response, ApiError> {
    let record = state.players.get(&contact_id).await?;
    Ok(data_response(StatusCode::OK, record))
}

/// `POST /players`: admin only.
pub(crate) async fn create(
    State(state): State<AppState>,
    Json(input): Json<NewPlayer>,
) -> Result<Response, ApiError> {
    let record = state.players.create(input).await?;
    Ok(data_response(StatusCode::CREATED, record))
}

/// `PATCH /players/:contact_id`: admin only, partial update.
pub(crate) async fn update(
    State(state): State<AppState>,
    Path(contact_id): Path<String>,
    Json(patch): Json<PlayerPatch>,
) -> Result<Response, ApiError> {
    let record = state.players.update(&contact_id, patch).await?;
    Ok(data_response(StatusCode::OK, record))
}

/// `DELETE /players/:contact_id`: admin only.
pub(crate) async fn remove(
    State(state): State<AppState>,
    Path(contact_id): Path<String>,
) -> Result<Response, ApiError> {
    state.players.delete(&contact_id).await?;
    Ok(ack_response("Player deleted"))
}
