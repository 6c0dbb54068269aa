use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use bytes::Bytes;

use crate::state::{
    AppState, DeleteRequest, JsonResult, MessageResponse, TracksResponse, UploadResponse,
};
use crate::utils::json_error;

/// Accepts a multipart batch of audio files (repeated `files` fields) and
/// ingests them one after another. Per-file tag trouble degrades to default
/// metadata inside the pipeline; an error that reaches this handler (bad
/// body, failed binary write) aborts the batch.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> JsonResult<UploadResponse> {
    let mut files: Vec<(String, Bytes)> = Vec::new();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => {
                return Err(json_error(
                    StatusCode::BAD_REQUEST,
                    format!("invalid multipart body: {}", err),
                ))
            }
        };
        if field.name() != Some("files") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        match field.bytes().await {
            Ok(data) => files.push((filename, data)),
            Err(err) => {
                return Err(json_error(
                    StatusCode::BAD_REQUEST,
                    format!("failed to read uploaded file: {}", err),
                ))
            }
        }
    }

    if files.is_empty() {
        return Err(json_error(StatusCode::BAD_REQUEST, "No files uploaded"));
    }

    let count = files.len();
    let mut uploaded_tracks = Vec::with_capacity(count);
    for (filename, data) in files {
        let library = state.library.clone();
        let result =
            tokio::task::spawn_blocking(move || library.ingest(&filename, &data)).await;
        match result {
            Ok(Ok(ingested)) => uploaded_tracks.push(ingested.entry),
            Ok(Err(err)) => {
                return Err(json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Upload process failed: {}", err),
                ))
            }
            Err(err) => {
                return Err(json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Upload task failed: {}", err),
                ))
            }
        }
    }

    Ok(Json(UploadResponse {
        message: format!("Successfully uploaded and processed {} file(s)", count),
        uploaded_tracks,
    }))
}

pub async fn scan(State(state): State<AppState>) -> JsonResult<TracksResponse> {
    let library = state.library.clone();
    match tokio::task::spawn_blocking(move || library.scan()).await {
        Ok(Ok(tracks)) => Ok(Json(TracksResponse { tracks })),
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

pub async fn delete(
    State(state): State<AppState>,
    Json(request): Json<DeleteRequest>,
) -> JsonResult<MessageResponse> {
    let track_id = match request.track_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => {
            return Err(json_error(
                StatusCode::BAD_REQUEST,
                "Missing trackId in request body",
            ))
        }
    };

    let library = state.library.clone();
    let id = track_id.clone();
    match tokio::task::spawn_blocking(move || library.delete(&id)).await {
        Ok(Ok(())) => Ok(Json(MessageResponse {
            message: format!("Track {} deleted successfully", track_id),
        })),
        Ok(Err(err)) => Err(json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to update metadata store after deletion: {}", err),
        )),
        Err(err) => Err(json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Delete task failed: {}", err),
        )),
    }
}
