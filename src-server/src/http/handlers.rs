//! Route handlers
//!
//! Todos and notes use the generic handlers end to end; photos and pokemon
//! replace create/delete with their own.

use axum::extract::{Path, State};

use crate::commands::{
    catch_pokemon, create_item, create_photo, create_review, delete_item, delete_photo,
    delete_review, get_item, list_items, update_item, update_review, upload_object, BucketBacked,
    StoredObject, UploadRequest,
};
use crate::domain::{
    FoodPhoto, NewPhoto, NewPokemon, NewReview, Note, OwnedEntity, Photo, Pokemon, Review,
    ReviewPatch, Todo,
};
use crate::repository::{OwnedRepository, ReviewRepository};
use crate::state::{AppState, SharedState};
use crate::storage::Bucket;

use super::extract::{ItemId, Listing, Owner, Payload};
use super::reply::{ApiReply, HandlerResult};

/// An entity served under `/api/{feature}`
pub trait Resource: OwnedEntity {
    fn repo(state: &AppState) -> &dyn OwnedRepository<Self>;
}

impl Resource for Todo {
    fn repo(state: &AppState) -> &dyn OwnedRepository<Self> {
        &state.todos
    }
}

impl Resource for Photo {
    fn repo(state: &AppState) -> &dyn OwnedRepository<Self> {
        &state.photos
    }
}

impl Resource for FoodPhoto {
    fn repo(state: &AppState) -> &dyn OwnedRepository<Self> {
        &state.food_photos
    }
}

impl Resource for Pokemon {
    fn repo(state: &AppState) -> &dyn OwnedRepository<Self> {
        &state.pokemon
    }
}

impl Resource for Note {
    fn repo(state: &AppState) -> &dyn OwnedRepository<Self> {
        &state.notes
    }
}

pub async fn health() -> ApiReply<()> {
    ApiReply::done("ok")
}

pub async fn list<T: Resource>(
    State(state): State<SharedState>,
    Owner(owner): Owner,
    Listing(query): Listing,
) -> HandlerResult<Vec<T>> {
    let items = list_items(T::repo(&state), &owner, &query).await?;
    Ok(ApiReply::ok("Fetched", items))
}

pub async fn fetch<T: Resource>(
    State(state): State<SharedState>,
    Owner(owner): Owner,
    ItemId(id): ItemId,
) -> HandlerResult<T> {
    let item = get_item(T::repo(&state), &owner, id).await?;
    Ok(ApiReply::ok("Fetched", item))
}

pub async fn create<T: Resource>(
    State(state): State<SharedState>,
    Owner(owner): Owner,
    Payload(draft): Payload<T::Draft>,
) -> HandlerResult<T> {
    let item = create_item(T::repo(&state), &owner, &draft).await?;
    Ok(ApiReply::created(&format!("{} created", T::NOUN), item))
}

pub async fn update<T: Resource>(
    State(state): State<SharedState>,
    Owner(owner): Owner,
    ItemId(id): ItemId,
    Payload(patch): Payload<T::Patch>,
) -> HandlerResult<()> {
    update_item(T::repo(&state), &owner, id, &patch).await?;
    Ok(ApiReply::done(&format!("{} updated", T::NOUN)))
}

pub async fn delete<T: Resource>(
    State(state): State<SharedState>,
    Owner(owner): Owner,
    ItemId(id): ItemId,
) -> HandlerResult<()> {
    delete_item(T::repo(&state), &owner, id).await?;
    Ok(ApiReply::done(&format!("{} deleted", T::NOUN)))
}

pub async fn create_bucket_backed<T: Resource + BucketBacked>(
    State(state): State<SharedState>,
    Owner(owner): Owner,
    Payload(draft): Payload<NewPhoto>,
) -> HandlerResult<T> {
    let item = create_photo(T::repo(&state), &owner, &draft).await?;
    Ok(ApiReply::created(&format!("{} created", T::NOUN), item))
}

pub async fn delete_bucket_backed<T: Resource + BucketBacked>(
    State(state): State<SharedState>,
    Owner(owner): Owner,
    ItemId(id): ItemId,
) -> HandlerResult<()> {
    delete_photo(T::repo(&state), state.blobs.as_ref(), &owner, id).await?;
    Ok(ApiReply::done(&format!("{} deleted", T::NOUN)))
}

pub async fn create_pokemon(
    State(state): State<SharedState>,
    Owner(owner): Owner,
    Payload(input): Payload<NewPokemon>,
) -> HandlerResult<Pokemon> {
    let pokemon = catch_pokemon(&state.pokemon, state.catalog.as_ref(), &owner, &input).await?;
    Ok(ApiReply::created("Pokemon caught", pokemon))
}

/// Which review table a route writes to
pub trait ReviewTarget {
    fn reviews(state: &AppState) -> &ReviewRepository;
}

impl ReviewTarget for FoodPhoto {
    fn reviews(state: &AppState) -> &ReviewRepository {
        &state.food_reviews
    }
}

impl ReviewTarget for Pokemon {
    fn reviews(state: &AppState) -> &ReviewRepository {
        &state.pokemon_reviews
    }
}

pub async fn add_review<P: ReviewTarget>(
    State(state): State<SharedState>,
    Owner(owner): Owner,
    ItemId(parent_id): ItemId,
    Payload(draft): Payload<NewReview>,
) -> HandlerResult<Review> {
    let review = create_review(P::reviews(&state), &owner, parent_id, &draft).await?;
    Ok(ApiReply::created("Review created", review))
}

pub async fn edit_review<P: ReviewTarget>(
    State(state): State<SharedState>,
    Owner(owner): Owner,
    ItemId(id): ItemId,
    Payload(patch): Payload<ReviewPatch>,
) -> HandlerResult<()> {
    update_review(P::reviews(&state), &owner, id, &patch).await?;
    Ok(ApiReply::done("Review updated"))
}

pub async fn remove_review<P: ReviewTarget>(
    State(state): State<SharedState>,
    Owner(owner): Owner,
    ItemId(id): ItemId,
) -> HandlerResult<()> {
    delete_review(P::reviews(&state), &owner, id).await?;
    Ok(ApiReply::done("Review deleted"))
}

pub async fn upload(
    State(state): State<SharedState>,
    Owner(owner): Owner,
    Path(bucket): Path<String>,
    Payload(request): Payload<UploadRequest>,
) -> HandlerResult<StoredObject> {
    let bucket: Bucket = bucket.parse()?;
    let stored = upload_object(state.blobs.as_ref(), &owner, bucket, &request).await?;
    Ok(ApiReply::created("Uploaded", stored))
}
