//! Public object reads under `/storage/{bucket}/{*path}`.
//!
//! The path arrives percent-decoded by the extractor.

use axum::{
    extract::{Path, State},
    http::header::{CACHE_CONTROL, CONTENT_TYPE},
    response::{IntoResponse, Response},
};

use crate::storage::Bucket;
use crate::state::SharedState;

use super::reply::ApiError;

pub async fn serve_object(
    State(state): State<SharedState>,
    Path((bucket, path)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let bucket: Bucket = bucket.parse()?;
    let content = state.blobs.read_object(bucket, &path).await?;
    let mime_type = mime_guess::from_path(&path).first_or_octet_stream();

    Ok((
        [
            (CONTENT_TYPE, mime_type.to_string()),
            (CACHE_CONTROL, "public, max-age=3600".to_string()),
        ],
        content,
    )
        .into_response())
}
