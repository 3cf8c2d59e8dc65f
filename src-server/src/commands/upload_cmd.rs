//! Upload Commands
//!
//! Accepts base64 image data, optionally as a data URL
//! (`data:image/png;base64,...`), and stores it in a bucket.

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, DomainResult, OwnerId};
use crate::storage::{object_path, validate_upload, BlobStore, Bucket};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub file_name: String,
    /// Falls back to the data URL prefix, then the file extension
    #[serde(default)]
    pub content_type: Option<String>,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    pub url: String,
    pub storage_path: String,
}

/// `(declared content type, base64 payload)` of a possibly data-URL body
fn split_data_url(data: &str) -> (Option<&str>, &str) {
    let Some(rest) = data.strip_prefix("data:") else {
        return (None, data);
    };
    match rest.split_once(',') {
        Some((meta, payload)) => {
            let media = meta.split(';').next().filter(|m| !m.is_empty());
            (media, payload)
        }
        None => (None, rest),
    }
}

pub async fn upload_object(
    blobs: &dyn BlobStore,
    owner: &OwnerId,
    bucket: Bucket,
    request: &UploadRequest,
) -> DomainResult<StoredObject> {
    let (declared, payload) = split_data_url(request.data.trim());
    let content_type = request
        .content_type
        .clone()
        .or_else(|| declared.map(str::to_string))
        .unwrap_or_else(|| {
            mime_guess::from_path(&request.file_name)
                .first_or_octet_stream()
                .to_string()
        });

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| DomainError::invalid(format!("Failed to decode base64: {}", e)))?;

    validate_upload(&content_type, bytes.len())?;

    let path = object_path(owner, &request.file_name, &bytes);
    let url = blobs.put_object(bucket, &path, &bytes, &content_type).await?;
    Ok(StoredObject {
        url,
        storage_path: path,
    })
}
