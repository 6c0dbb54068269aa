pub mod browse;
pub mod tracks;

use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};

use crate::state::{AppState, HealthResponse};

pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/tracks/upload", post(tracks::upload))
        .route("/tracks/scan", get(tracks::scan))
        .route("/tracks/delete", delete(tracks::delete))
        .route("/browse/albums", get(browse::list_albums))
        .route("/browse/artists", get(browse::list_artists))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}
