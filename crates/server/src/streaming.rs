use std::io::SeekFrom;
use std::path::PathBuf;

use axum::body::Body;
use axum::extract::{Path as AxumPath, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use common::sanitize_filename;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use crate::state::AppState;
use crate::utils::json_error_response;

/// Routes serving the stored binaries: audio at `/uploads/<id>`, extracted
/// cover art at `/uploads/covers/<name>`. Path parameters go through the
/// same sanitization as stored filenames, so they cannot escape the storage
/// root.
pub fn uploads_router(state: AppState) -> Router {
    Router::new()
        .route("/:filename", get(serve_audio))
        .route("/covers/:filename", get(serve_cover))
        .with_state(state)
}

async fn serve_audio(
    State(state): State<AppState>,
    AxumPath(filename): AxumPath<String>,
    headers: HeaderMap,
) -> Response {
    let name = sanitize_filename(&filename);
    stream_file(state.library.audio_path(&name), &headers).await
}

async fn serve_cover(
    State(state): State<AppState>,
    AxumPath(filename): AxumPath<String>,
    headers: HeaderMap,
) -> Response {
    let name = sanitize_filename(&filename);
    stream_file(state.library.cover_path(&name), &headers).await
}

/// Inclusive byte range, already clamped to the resource size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ByteRange {
    start: u64,
    end: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RangeError {
    Malformed,
    Unsatisfiable,
}

/// Parses a single `bytes=` range. Multi-range requests are treated as
/// malformed; a malformed header makes the caller fall back to the full
/// resource, per the HTTP allowance to ignore Range.
fn parse_range(value: &str, size: u64) -> Result<ByteRange, RangeError> {
    let raw = value
        .trim()
        .strip_prefix("bytes=")
        .ok_or(RangeError::Malformed)?;
    if raw.contains(',') {
        return Err(RangeError::Malformed);
    }
    let (start_str, end_str) = raw.split_once('-').ok_or(RangeError::Malformed)?;
    let start_str = start_str.trim();
    let end_str = end_str.trim();

    if start_str.is_empty() {
        // Suffix form: the last N bytes.
        let suffix: u64 = end_str.parse().map_err(|_| RangeError::Malformed)?;
        if suffix == 0 || size == 0 {
            return Err(RangeError::Unsatisfiable);
        }
        return Ok(ByteRange {
            start: size.saturating_sub(suffix),
            end: size - 1,
        });
    }

    let start: u64 = start_str.parse().map_err(|_| RangeError::Malformed)?;
    if start >= size {
        return Err(RangeError::Unsatisfiable);
    }
    let end = if end_str.is_empty() {
        size - 1
    } else {
        let end: u64 = end_str.parse().map_err(|_| RangeError::Malformed)?;
        if end < start {
            return Err(RangeError::Malformed);
        }
        end.min(size - 1)
    };
    Ok(ByteRange { start, end })
}

async fn stream_file(path: PathBuf, headers: &HeaderMap) -> Response {
    let mut file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(_) => return json_error_response(StatusCode::NOT_FOUND, "file not found"),
    };
    let size = match file.metadata().await {
        Ok(meta) => meta.len(),
        Err(err) => {
            return json_error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("failed to stat file: {}", err),
            )
        }
    };
    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    let content_type = HeaderValue::from_str(mime.as_ref())
        .unwrap_or(HeaderValue::from_static("application/octet-stream"));

    let range = headers
        .get(header::RANGE)
        .and_then(|value| value.to_str().ok())
        .map(|value| parse_range(value, size));

    match range {
        Some(Ok(range)) => {
            if let Err(err) = file.seek(SeekFrom::Start(range.start)).await {
                return json_error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("failed to seek: {}", err),
                );
            }
            let len = range.end - range.start + 1;
            let body = Body::from_stream(ReaderStream::new(file.take(len)));
            let mut response = Response::new(body);
            *response.status_mut() = StatusCode::PARTIAL_CONTENT;
            let headers = response.headers_mut();
            headers.insert(header::CONTENT_TYPE, content_type);
            headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
            headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
            if let Ok(value) =
                HeaderValue::from_str(&format!("bytes {}-{}/{}", range.start, range.end, size))
            {
                headers.insert(header::CONTENT_RANGE, value);
            }
            response
        }
        Some(Err(RangeError::Unsatisfiable)) => {
            let mut response =
                json_error_response(StatusCode::RANGE_NOT_SATISFIABLE, "range not satisfiable");
            if let Ok(value) = HeaderValue::from_str(&format!("bytes */{}", size)) {
                response.headers_mut().insert(header::CONTENT_RANGE, value);
            }
            response
        }
        Some(Err(RangeError::Malformed)) | None => {
            let body = Body::from_stream(ReaderStream::new(file));
            let mut response = Response::new(body);
            let headers = response.headers_mut();
            headers.insert(header::CONTENT_TYPE, content_type);
            headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
            headers.insert(header::CONTENT_LENGTH, HeaderValue::from(size));
            response
        }
    }
}
