//! Blob storage
//!
//! Uploaded images live in one directory per bucket under the storage root
//! and are served back from `/storage/{bucket}/{path}`.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;

use crate::domain::{DomainError, DomainResult, OwnerId};

use super::validation::Bucket;

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("valid sanitizer regex"));

/// Keeps `/` so nested paths stay readable in URLs
const PATH_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'/');

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` at `path` and return its public URL
    async fn put_object(
        &self,
        bucket: Bucket,
        path: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> DomainResult<String>;

    async fn remove_object(&self, bucket: Bucket, path: &str) -> DomainResult<()>;

    async fn read_object(&self, bucket: Bucket, path: &str) -> DomainResult<Vec<u8>>;
}

/// Replace runs of unsafe characters with `_` and strip leading dots
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned = UNSAFE_CHARS.replace_all(base.trim(), "_");
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Distinct owners always get distinct prefixes; `%` and `.` are escaped too
const OWNER_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_');

/// Directory every object of `owner` lives under
pub fn owner_prefix(owner: &OwnerId) -> String {
    format!("{}/", utf8_percent_encode(owner.as_str(), OWNER_SET))
}

/// `{owner}/{hash-prefix}-{name}`; the hash keeps same-named uploads apart
pub fn object_path(owner: &OwnerId, file_name: &str, bytes: &[u8]) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(owner.as_str().as_bytes());
    hasher.update(bytes);
    hasher.update(&chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default().to_le_bytes());
    let hash = hasher.finalize().to_hex().to_string();
    format!(
        "{}{}-{}",
        owner_prefix(owner),
        &hash[..16],
        sanitize_file_name(file_name)
    )
}

/// Filesystem-backed buckets
#[derive(Debug, Clone)]
pub struct LocalBucketStore {
    root: PathBuf,
    public_url: String,
}

impl LocalBucketStore {
    pub fn new(root: impl Into<PathBuf>, public_url: &str) -> Self {
        Self {
            root: root.into(),
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn public_url_for(&self, bucket: Bucket, path: &str) -> String {
        format!(
            "{}/storage/{}/{}",
            self.public_url,
            bucket,
            utf8_percent_encode(path, PATH_SET)
        )
    }

    /// Resolve an object path, refusing anything that escapes the bucket
    fn resolve(&self, bucket: Bucket, path: &str) -> DomainResult<PathBuf> {
        let relative = Path::new(path);
        let clean = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !clean {
            return Err(DomainError::invalid(format!("Invalid object path '{}'", path)));
        }
        Ok(self.root.join(bucket.as_str()).join(relative))
    }
}

fn io_error(action: &str, path: &Path, err: std::io::Error) -> DomainError {
    DomainError::upstream(format!("{} {}: {}", action, path.display(), err))
}

#[async_trait]
impl BlobStore for LocalBucketStore {
    async fn put_object(
        &self,
        bucket: Bucket,
        path: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> DomainResult<String> {
        let target = self.resolve(bucket, path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error("create", parent, e))?;
        }
        tokio::fs::write(&target, bytes)
            .await
            .map_err(|e| io_error("write", &target, e))?;

        log::info!(
            "Stored {} bytes ({}) at {}/{}",
            bytes.len(),
            content_type,
            bucket,
            path
        );
        Ok(self.public_url_for(bucket, path))
    }

    async fn remove_object(&self, bucket: Bucket, path: &str) -> DomainResult<()> {
        let target = self.resolve(bucket, path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error("remove", &target, e)),
        }
    }

    async fn read_object(&self, bucket: Bucket, path: &str) -> DomainResult<Vec<u8>> {
        let target = self.resolve(bucket, path)?;
        match tokio::fs::read(&target).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(DomainError::NotFound(format!("Object {}/{}", bucket, path)))
            }
            Err(e) => Err(io_error("read", &target, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_prefix_keeps_owners_apart() {
        let prefix = |s: &str| owner_prefix(&OwnerId::new(s));
        assert_eq!(prefix("alice"), "alice/");
        assert_eq!(prefix("auth0-123_x"), "auth0-123_x/");
        assert_ne!(prefix("a|b"), prefix("a_b"));
        assert_eq!(prefix("a|b"), "a%7Cb/");
        assert_eq!(prefix(".."), "%2E%2E/");
        assert_ne!(prefix("a%7Cb"), prefix("a|b"));
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("my photo (1).png"), "my_photo_1_.png");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("..."), "upload");
        assert_eq!(sanitize_file_name("C:\\pics\\cat.jpg"), "cat.jpg");
    }

    #[test]
    fn test_object_path_shape() {
        let owner = OwnerId::new("auth0|42");
        let path = object_path(&owner, "lunch.jpg", b"bytes");
        let (dir, file) = path.split_once('/').unwrap();
        assert_eq!(dir, "auth0_42");
        assert!(file.ends_with("-lunch.jpg"));
        assert_eq!(file.len(), 16 + 1 + "lunch.jpg".len());
    }

    #[test]
    fn test_public_url_is_encoded() {
        let store = LocalBucketStore::new("/tmp/unused", "http://localhost:8080/");
        assert_eq!(
            store.public_url_for(Bucket::FoodPhotos, "a b/c.png"),
            "http://localhost:8080/storage/food-photos/a%20b/c.png"
        );
    }

    #[tokio::test]
    async fn test_put_read_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBucketStore::new(dir.path(), "http://hub");

        let url = store
            .put_object(Bucket::Photos, "alice/abc-cat.png", b"png", "image/png")
            .await
            .unwrap();
        assert_eq!(url, "http://hub/storage/photos/alice/abc-cat.png");
        assert!(dir.path().join("photos/alice/abc-cat.png").exists());

        let bytes = store.read_object(Bucket::Photos, "alice/abc-cat.png").await.unwrap();
        assert_eq!(bytes, b"png");

        store.remove_object(Bucket::Photos, "alice/abc-cat.png").await.unwrap();
        let err = store.read_object(Bucket::Photos, "alice/abc-cat.png").await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));

        // Removing twice is fine
        store.remove_object(Bucket::Photos, "alice/abc-cat.png").await.unwrap();
    }

    #[tokio::test]
    async fn test_traversal_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBucketStore::new(dir.path(), "http://hub");

        let err = store.read_object(Bucket::Photos, "../secret").await.unwrap_err();
        assert!(matches!(err, DomainError::ValidationFailed(_)));
        assert!(store.read_object(Bucket::Photos, "/etc/passwd").await.is_err());
    }
}
