//! Global-links route handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;

use super::{ack_response, data_response, ApiError, AppState};

/// Update body; each route reads its own field.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct LinksBody {
    press_conference_link: Option<String>,
    auction_link: Option<String>,
}

/// `GET /global-links`: public.
pub(crate) async fn get_links(State(state): State<AppState>) -> Result<Response, ApiError> {
    let links = state.links.get().await?;
    Ok(data_response(StatusCode::OK, links))
}

/// `PATCH /global-links/press`: admin only.
pub(crate) async fn set_press(
    State(state): State<AppState>,
    Json(body): Json<LinksBody>,
) -> Result<Response, ApiError> {
    let url = body.press_conference_link.unwrap_or_default();
    state.links.set_press(&url).await?;
    Ok(ack_response("Press link updated"))
}

/// `PATCH /global-links/auction`: admin only.
pub(crate) async fn set_auction(
    State(state): State<AppState>,
    Json(body): Json<LinksBody>,
) -> Result<Response, ApiError> {
    let url = body.auction_link.unwrap_or_default();
    state.links.set_auction(&url).await?;
    Ok(ack_response("Auction link updated"))
}

/// `DELETE /global-links/press`: admin only, resets to empty.
pub(crate) async fn clear_press(State(state): State<AppState>) -> Result<Response, ApiError> {
    state.links.clear_press().await?;
    Ok(ack_response("Press link deleted"))
}

/// `DELETE /global-links/auction`: admin only, resets to empty.
pub(crate) async fn clear_auction(State(state): State<AppState>) -> Result<Response, ApiError> {
    state.links.clear_auction().await?;
    Ok(ack_response("Auction link deleted"))
}
