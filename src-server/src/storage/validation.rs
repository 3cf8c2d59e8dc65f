//! Upload checks run before anything touches a bucket.

use std::fmt;
use std::str::FromStr;

use crate::domain::{DomainError, DomainResult};

pub const ALLOWED_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/avif",
];

/// 10 MiB
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Photos,
    FoodPhotos,
}

impl Bucket {
    pub const ALL: [Bucket; 2] = [Bucket::Photos, Bucket::FoodPhotos];

    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Photos => "photos",
            Bucket::FoodPhotos => "food-photos",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Bucket {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Bucket::ALL
            .into_iter()
            .find(|b| b.as_str() == s)
            .ok_or_else(|| DomainError::invalid(format!("Unknown bucket '{}'", s)))
    }
}

/// Reject anything that is not a supported image or is over the size cap
pub fn validate_upload(content_type: &str, len: usize) -> DomainResult<()> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if !ALLOWED_TYPES.contains(&essence.as_str()) {
        return Err(DomainError::invalid(format!(
            "Unsupported file type '{}'; allowed: {}",
            content_type,
            ALLOWED_TYPES.join(", ")
        )));
    }
    if len == 0 {
        return Err(DomainError::invalid("File is empty"));
    }
    if len > MAX_UPLOAD_BYTES {
        return Err(DomainError::invalid("File must be at most 10 MiB"));
    }
    Ok(())
}
