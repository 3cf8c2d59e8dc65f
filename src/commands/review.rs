//! Review Commands

use reqwest::Method;

use super::ApiClient;
use crate::error::ClientResult;
use crate::models::{Check, NewReview, Review, ReviewPatch, Reviewed};

impl ApiClient {
    pub async fn create_review<P: Reviewed>(
        &self,
        parent_id: i64,
        draft: &NewReview,
    ) -> ClientResult<Review> {
        draft.check()?;
        self.fetch_data(
            Method::POST,
            &format!("{}/{}/reviews", P::PATH, parent_id),
            None,
            Some(draft),
        )
        .await
    }

    pub async fn update_review<P: Reviewed>(
        &self,
        id: i64,
        patch: &ReviewPatch,
    ) -> ClientResult<()> {
        patch.check()?;
        self.send::<_, serde_json::Value>(
            Method::PATCH,
            &format!("{}/{}", P::REVIEW_PATH, id),
            None,
            Some(patch),
        )
        .await?;
        Ok(())
    }

    pub async fn delete_review<P: Reviewed>(&self, id: i64) -> ClientResult<()> {
        self.send::<(), serde_json::Value>(
            Method::DELETE,
            &format!("{}/{}", P::REVIEW_PATH, id),
            None,
            None,
        )
        .await?;
        Ok(())
    }
}
