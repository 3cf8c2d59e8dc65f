//! Repository Layer - Core Traits
//!
//! Defines the abstract interfaces for data access.

use async_trait::async_trait;

use crate::domain::{DomainResult, ListQuery, OwnedEntity, OwnerId};

/// Owner-scoped CRUD over one entity type.
///
/// Id-addressed calls fail with `NotFound` for unknown ids and
/// `PermissionDenied` for rows belonging to another owner.
#[async_trait]
pub trait OwnedRepository<T: OwnedEntity>: Send + Sync {
    /// Insert a row for `owner`; the store assigns id and timestamps
    async fn create(&self, owner: &OwnerId, draft: &T::Draft) -> DomainResult<T>;

    async fn find_by_id(&self, owner: &OwnerId, id: i64) -> DomainResult<T>;

    /// Owner's rows, filtered and ordered by `query`
    async fn list(&self, owner: &OwnerId, query: &ListQuery) -> DomainResult<Vec<T>>;

    /// Apply the fields present in `patch`
    async fn update(&self, owner: &OwnerId, id: i64, patch: &T::Patch) -> DomainResult<()>;

    async fn delete(&self, owner: &OwnerId, id: i64) -> DomainResult<()>;
}
