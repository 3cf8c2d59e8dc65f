//! Generic owner-scoped CRUD commands
//!
//! Input is validated before the repository is touched.

use crate::domain::{DomainResult, ListQuery, OwnedEntity, OwnerId, Validate};
use crate::repository::OwnedRepository;

pub async fn list_items<T: OwnedEntity>(
    repo: &dyn OwnedRepository<T>,
    owner: &OwnerId,
    query: &ListQuery,
) -> DomainResult<Vec<T>> {
    repo.list(owner, query).await
}

pub async fn get_item<T: OwnedEntity>(
    repo: &dyn OwnedRepository<T>,
    owner: &OwnerId,
    id: i64,
) -> DomainResult<T> {
    repo.find_by_id(owner, id).await
}

pub async fn create_item<T: OwnedEntity>(
    repo: &dyn OwnedRepository<T>,
    owner: &OwnerId,
    draft: &T::Draft,
) -> DomainResult<T> {
    draft.validate()?;
    let created = repo.create(owner, draft).await?;
    log::info!("{} {} created by {}", T::NOUN, created.id(), owner);
    Ok(created)
}

pub async fn update_item<T: OwnedEntity>(
    repo: &dyn OwnedRepository<T>,
    owner: &OwnerId,
    id: i64,
    patch: &T::Patch,
) -> DomainResult<()> {
    patch.validate()?;
    repo.update(owner, id, patch).await
}

pub async fn delete_item<T: OwnedEntity>(
    repo: &dyn OwnedRepository<T>,
    owner: &OwnerId,
    id: i64,
) -> DomainResult<()> {
    repo.delete(owner, id).await?;
    log::info!("{} {} deleted by {}", T::NOUN, id, owner);
    Ok(())
}
