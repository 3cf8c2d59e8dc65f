//! Feature Commands
//!
//! List/get/create/update/delete for every `Feature`.

use reqwest::Method;

use super::ApiClient;
use crate::error::ClientResult;
use crate::models::{Check, Feature, ListQuery};

/// Body type for requests that send none
type NoBody = ();

impl ApiClient {
    pub async fn list<T: Feature>(&self, query: &ListQuery) -> ClientResult<Vec<T>> {
        self.fetch_data::<NoBody, _>(Method::GET, T::PATH, Some(query), None)
            .await
    }

    pub async fn get<T: Feature>(&self, id: i64) -> ClientResult<T> {
        self.fetch_data::<NoBody, _>(Method::GET, &format!("{}/{}", T::PATH, id), None, None)
            .await
    }

    pub async fn create<T: Feature>(&self, draft: &T::Draft) -> ClientResult<T> {
        draft.check()?;
        self.fetch_data(Method::POST, T::PATH, None, Some(draft))
            .await
    }

    pub async fn update<T: Feature>(&self, id: i64, patch: &T::Patch) -> ClientResult<()> {
        patch.check()?;
        self.send::<_, serde_json::Value>(
            Method::PATCH,
            &format!("{}/{}", T::PATH, id),
            None,
            Some(patch),
        )
        .await?;
        Ok(())
    }

    pub async fn delete<T: Feature>(&self, id: i64) -> ClientResult<()> {
        self.send::<NoBody, serde_json::Value>(
            Method::DELETE,
            &format!("{}/{}", T::PATH, id),
            None,
            None,
        )
        .await?;
        Ok(())
    }
}
