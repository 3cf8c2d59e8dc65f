//! Photo and food photo commands
//!
//! Rows point at an uploaded object; deleting the row removes the object.

use crate::domain::{
    DomainError, DomainResult, FoodPhoto, NewPhoto, OwnedEntity, OwnerId, Photo, Validate,
};
use crate::repository::OwnedRepository;
use crate::storage::{owner_prefix, BlobStore, Bucket};

/// An entity whose row owns one object in a bucket
pub trait BucketBacked: OwnedEntity<Draft = NewPhoto> {
    const BUCKET: Bucket;

    fn storage_path(&self) -> &str;
}

impl BucketBacked for Photo {
    const BUCKET: Bucket = Bucket::Photos;

    fn storage_path(&self) -> &str {
        &self.storage_path
    }
}

impl BucketBacked for FoodPhoto {
    const BUCKET: Bucket = Bucket::FoodPhotos;

    fn storage_path(&self) -> &str {
        &self.storage_path
    }
}

/// Register an uploaded object; the object must sit under the caller's prefix
pub async fn create_photo<T: BucketBacked>(
    repo: &dyn OwnedRepository<T>,
    owner: &OwnerId,
    draft: &NewPhoto,
) -> DomainResult<T> {
    draft.validate()?;
    if !draft.storage_path.starts_with(&owner_prefix(owner)) {
        return Err(DomainError::PermissionDenied);
    }
    let created = repo.create(owner, draft).await?;
    log::info!("{} {} created by {}", T::NOUN, created.id(), owner);
    Ok(created)
}

/// Delete the row, then its object. A failed object removal only logs.
pub async fn delete_photo<T: BucketBacked>(
    repo: &dyn OwnedRepository<T>,
    blobs: &dyn BlobStore,
    owner: &OwnerId,
    id: i64,
) -> DomainResult<()> {
    let photo = repo.find_by_id(owner, id).await?;
    repo.delete(owner, id).await?;

    if let Err(e) = blobs.remove_object(T::BUCKET, photo.storage_path()).await {
        log::warn!(
            "{} {} deleted but object {}/{} was not removed: {}",
            T::NOUN,
            id,
            T::BUCKET,
            photo.storage_path(),
            e
        );
    }
    Ok(())
}
