//! Feature Stores
//!
//! One optimistic list per feature view. Each mutation shows its intended
//! result right away, runs against the backend, and then the refetched list
//! replaces whatever was shown.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use log::{debug, warn};
use optimistic_list::{Busy, Dispatched, Keyed, ListAction, ListSource, Phase, Reconciler};
use tokio::sync::Mutex;

use crate::commands::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::models::{Check, Feature, ListQuery, NewReview, Review, ReviewPatch, Reviewed};

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// The feature's list endpoint under the store's current query
pub struct FeatureSource<T> {
    client: ApiClient,
    query: Mutex<ListQuery>,
    _item: PhantomData<fn() -> T>,
}

#[async_trait]
impl<T: Feature> ListSource<T> for FeatureSource<T> {
    type Error = ClientError;

    async fn fetch(&self) -> ClientResult<Vec<T>> {
        let query = self.query.lock().await.clone();
        self.client.list::<T>(&query).await
    }
}

pub struct FeatureStore<T: Feature> {
    reconciler: Reconciler<T, FeatureSource<T>>,
    next_placeholder: AtomicI64,
}

impl<T: Feature> FeatureStore<T> {
    pub fn new(client: ApiClient) -> Self {
        Self::with_query(client, ListQuery::default())
    }

    pub fn with_query(client: ApiClient, query: ListQuery) -> Self {
        Self {
            reconciler: Reconciler::new(FeatureSource {
                client,
                query: Mutex::new(query),
                _item: PhantomData,
            }),
            next_placeholder: AtomicI64::new(-1),
        }
    }

    fn client(&self) -> &ApiClient {
        &self.reconciler.source().client
    }

    /// Negative, so it can never collide with a server id
    fn placeholder_id(&self) -> i64 {
        self.next_placeholder.fetch_sub(1, Ordering::Relaxed)
    }

    pub async fn items(&self) -> Vec<T> {
        self.reconciler.view().await
    }

    pub async fn phase(&self) -> Phase {
        self.reconciler.phase().await
    }

    /// True while controls bound to this list should stay disabled
    pub async fn is_pending(&self) -> bool {
        self.reconciler.is_pending().await
    }

    pub async fn query(&self) -> ListQuery {
        self.reconciler.source().query.lock().await.clone()
    }

    pub async fn refresh(&self) -> ClientResult<()> {
        self.reconciler.refresh().await
    }

    /// Change filter or sort and reload; refused while a mutation is pending
    pub async fn set_query(&self, query: ListQuery) -> ClientResult<()> {
        if self.is_pending().await {
            return Err(ClientError::Busy(Busy));
        }
        *self.reconciler.source().query.lock().await = query;
        self.refresh().await
    }

    async fn find(&self, id: i64) -> ClientResult<T> {
        self.items()
            .await
            .into_iter()
            .find(|item| item.key() == id)
            .ok_or_else(|| ClientError::NotFound(format!("Item {} is not in this list", id)))
    }

    pub async fn create(&self, draft: T::Draft) -> ClientResult<T> {
        draft.check()?;
        let placeholder = T::placeholder(self.placeholder_id(), &draft, now_millis());
        let client = self.client();
        let report = self
            .reconciler
            .dispatch(
                ListAction::Add { item: placeholder },
                async move { client.create::<T>(&draft).await },
            )
            .await?;
        outcome(T::PATH, report)
    }

    pub async fn update(&self, id: i64, patch: T::Patch) -> ClientResult<()> {
        patch.check()?;
        let item = self.find(id).await?.patched(&patch, now_millis());
        let client = self.client();
        let report = self
            .reconciler
            .dispatch(
                ListAction::Update { id, item },
                async move { client.update::<T>(id, &patch).await },
            )
            .await?;
        outcome(T::PATH, report)
    }

    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        let client = self.client();
        let report = self
            .reconciler
            .dispatch(
                ListAction::Delete { id },
                async move { client.delete::<T>(id).await },
            )
            .await?;
        outcome(T::PATH, report)
    }
}

impl<T: Reviewed> FeatureStore<T> {
    /// Shown as an update of the parent with the new review first
    pub async fn add_review(&self, parent_id: i64, draft: NewReview) -> ClientResult<Review> {
        draft.check()?;
        let parent = self.find(parent_id).await?;
        let now = now_millis();
        let mut reviews = Vec::with_capacity(parent.reviews().len() + 1);
        reviews.push(Review {
            id: self.placeholder_id(),
            owner_id: parent.owner_id().to_string(),
            parent_id,
            content: draft.content.trim().to_string(),
            rating: draft.rating,
            created_at: now,
            updated_at: now,
        });
        reviews.extend_from_slice(parent.reviews());

        let client = self.client();
        let report = self
            .reconciler
            .dispatch(
                ListAction::Update {
                    id: parent_id,
                    item: parent.with_reviews(reviews),
                },
                async move { client.create_review::<T>(parent_id, &draft).await },
            )
            .await?;
        outcome(T::REVIEW_PATH, report)
    }

    pub async fn edit_review(
        &self,
        parent_id: i64,
        review_id: i64,
        patch: ReviewPatch,
    ) -> ClientResult<()> {
        patch.check()?;
        let parent = self.find(parent_id).await?;
        let now = now_millis();
        let reviews = parent
            .reviews()
            .iter()
            .map(|review| {
                if review.id != review_id {
                    return review.clone();
                }
                Review {
                    content: patch
                        .content
                        .as_deref()
                        .map(|c| c.trim().to_string())
                        .unwrap_or_else(|| review.content.clone()),
                    rating: patch.rating.unwrap_or(review.rating),
                    updated_at: now,
                    ..review.clone()
                }
            })
            .collect();

        let client = self.client();
        let report = self
            .reconciler
            .dispatch(
                ListAction::Update {
                    id: parent_id,
                    item: parent.with_reviews(reviews),
                },
                async move { client.update_review::<T>(review_id, &patch).await },
            )
            .await?;
        outcome(T::REVIEW_PATH, report)
    }

    pub async fn remove_review(&self, parent_id: i64, review_id: i64) -> ClientResult<()> {
        let parent = self.find(parent_id).await?;
        let reviews = parent
            .reviews()
            .iter()
            .filter(|review| review.id != review_id)
            .cloned()
            .collect();

        let client = self.client();
        let report = self
            .reconciler
            .dispatch(
                ListAction::Update {
                    id: parent_id,
                    item: parent.with_reviews(reviews),
                },
                async move { client.delete_review::<T>(review_id).await },
            )
            .await?;
        outcome(T::REVIEW_PATH, report)
    }
}

/// The mutation's result is what the caller sees; a failed refetch only logs
fn outcome<O>(
    feature: &str,
    report: Dispatched<O, ClientError, ClientError>,
) -> ClientResult<O> {
    let Dispatched { mutation, refetch } = report;
    if let Err(e) = refetch {
        warn!("{}: refetch failed, showing last confirmed list: {}", feature, e);
    }
    match mutation {
        Ok(value) => Ok(value),
        Err(e) => {
            debug!("{}: mutation rejected: {}", feature, e);
            Err(e)
        }
    }
}
