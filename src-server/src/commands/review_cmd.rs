//! Review commands for food photos and pokemon

use crate::domain::{DomainResult, NewReview, OwnerId, Review, ReviewPatch, Validate};
use crate::repository::ReviewRepository;

pub async fn create_review(
    repo: &ReviewRepository,
    owner: &OwnerId,
    parent_id: i64,
    draft: &NewReview,
) -> DomainResult<Review> {
    draft.validate()?;
    let review = repo.create(owner, parent_id, draft).await?;
    log::info!(
        "Review {} on {} {} created by {}",
        review.id,
        repo.table().parent_noun,
        parent_id,
        owner
    );
    Ok(review)
}

pub async fn update_review(
    repo: &ReviewRepository,
    owner: &OwnerId,
    id: i64,
    patch: &ReviewPatch,
) -> DomainResult<()> {
    patch.validate()?;
    repo.update(owner, id, patch).await
}

pub async fn delete_review(repo: &ReviewRepository, owner: &OwnerId, id: i64) -> DomainResult<()> {
    repo.delete(owner, id).await?;
    log::info!("Review {} deleted by {}", id, owner);
    Ok(())
}
