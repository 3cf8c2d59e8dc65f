//! Storage Commands
//!
//! Uploads are checked locally with the server's rules before any request.

use base64::Engine;
use reqwest::Method;

use super::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::models::{StoredObject, UploadRequest};

pub const ALLOWED_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/avif",
];

pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Photos,
    FoodPhotos,
}

impl Bucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Photos => "photos",
            Bucket::FoodPhotos => "food-photos",
        }
    }
}

pub fn validate_upload(content_type: &str, len: usize) -> ClientResult<()> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if !ALLOWED_TYPES.contains(&essence.as_str()) {
        return Err(ClientError::invalid(format!(
            "Unsupported file type '{}'; allowed: {}",
            content_type,
            ALLOWED_TYPES.join(", ")
        )));
    }
    if len == 0 {
        return Err(ClientError::invalid("File is empty"));
    }
    if len > MAX_UPLOAD_BYTES {
        return Err(ClientError::invalid("File must be at most 10 MiB"));
    }
    Ok(())
}

impl ApiClient {
    /// Upload raw bytes; the content type falls back to the file extension
    pub async fn upload(
        &self,
        bucket: Bucket,
        file_name: &str,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> ClientResult<StoredObject> {
        let content_type = content_type.map(str::to_string).unwrap_or_else(|| {
            mime_guess::from_path(file_name)
                .first_or_octet_stream()
                .to_string()
        });
        validate_upload(&content_type, bytes.len())?;

        let request = UploadRequest {
            file_name: file_name.to_string(),
            content_type: Some(content_type),
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        };
        self.fetch_data(
            Method::POST,
            &format!("storage/{}", bucket.as_str()),
            None,
            Some(&request),
        )
        .await
    }
}
