use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use common::{albums_from_tracks, artists_from_tracks, AlbumSummary, ArtistSummary};

use crate::state::{AppState, JsonResult, ListResponse};
use crate::utils::json_error;

/// Album groups derived from the current track list: one per
/// (album name, artist name) pair, first-seen cover art. Computed fresh on
/// every request; nothing here is persisted.
pub async fn list_albums(State(state): State<AppState>) -> JsonResult<ListResponse<AlbumSummary>> {
    let tracks = scan_tracks(&state).await?;
    let items = albums_from_tracks(&tracks);
    let total = items.len();
    Ok(Json(ListResponse { items, total }))
}

pub async fn list_artists(
    State(state): State<AppState>,
) -> JsonResult<ListResponse<ArtistSummary>> {
    let tracks = scan_tracks(&state).await?;
    let items = artists_from_tracks(&tracks);
    let total = items.len();
    Ok(Json(ListResponse { items, total }))
}

async fn scan_tracks(
    state: &AppState,
) -> Result<Vec<common::Track>, (StatusCode, Json<crate::state::ErrorResponse>)> {
    let library = state.library.clone();
    match tokio::task::spawn_blocking(move || library.scan()).await {
        Ok(Ok(tracks)) => Ok(tracks),
        Ok(Err(err)) => Err(json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to scan uploads directory: {}", err),
        )),
        Err(err) => Err(json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Scan task failed: {}", err),
        )),
    }
}
