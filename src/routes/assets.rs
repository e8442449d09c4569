use axum::extract::Path;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use rust_embed::Embed;

use crate::error::{AppError, AppResult};

#[derive(Embed)]
#[folder = "assets/"]
struct Assets;

/// GET /assets/{*path} — embedded stylesheet and friends, with an ETag so
/// browsers can revalidate cheaply.
pub async fn serve(Path(path): Path<String>, headers: HeaderMap) -> AppResult<Response> {
    let file = Assets::get(&path).ok_or(AppError::NotFound)?;

    let etag = format!("\"{}\"", hex::encode(file.metadata.sha256_hash()));
    let unchanged = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == etag);
    if unchanged {
        return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response());
    }

    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime.as_ref().to_string()),
            (header::CACHE_CONTROL, "public, max-age=86400".to_string()),
            (header::ETAG, etag),
        ],
        file.data.to_vec(),
    )
        .into_response())
}
