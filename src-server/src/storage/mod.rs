//! Storage Layer
//!
//! Upload validation and the bucket store photos are written to.

mod blob;
mod validation;

pub use blob::{object_path, owner_prefix, sanitize_file_name, BlobStore, LocalBucketStore};
pub use validation::{validate_upload, Bucket, ALLOWED_TYPES, MAX_UPLOAD_BYTES};
