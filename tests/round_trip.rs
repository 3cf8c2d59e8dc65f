//! Client Round Trips
//!
//! Feature stores against a real backend bound to an ephemeral port.

use std::path::Path;
use std::sync::Arc;

use activity_hub_client::commands::Bucket;
use activity_hub_client::models::{
    FoodPhoto, ListQuery, NewNote, NewPhoto, NewPokemon, NewReview, NewTodo, Note, Photo,
    Pokemon, ReviewPatch, SortOrder, Todo, TodoPatch,
};
use activity_hub_client::{ApiClient, ClientError, FeatureStore};
use activity_hub_lib::config::Config;
use activity_hub_lib::domain::{DomainError, DomainResult, OwnerId, Species};
use activity_hub_lib::pokeapi::PokemonCatalog;
use activity_hub_lib::repository::init_db;
use activity_hub_lib::state::{AppState, SharedState};
use activity_hub_lib::storage::LocalBucketStore;
use async_trait::async_trait;
use optimistic_list::{Busy, Phase};
use tempfile::TempDir;

struct FakeCatalog;

#[async_trait]
impl PokemonCatalog for FakeCatalog {
    async fn lookup(&self, name: &str) -> DomainResult<Species> {
        match name {
            "eevee" => Ok(Species {
                name: "eevee".to_string(),
                pokedex_number: 133,
                sprite_url: None,
                types: vec!["normal".to_string()],
            }),
            _ => Err(DomainError::NotFound(format!("Pokemon '{}'", name))),
        }
    }
}

struct Backend {
    base: String,
    state: SharedState,
    _storage: TempDir,
}

impl Backend {
    async fn start() -> Self {
        let storage = tempfile::tempdir().unwrap();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let mut config = Config::for_tests(storage.path());
        config.public_url = base.clone();
        let db = init_db(Path::new(":memory:")).await.unwrap();
        let blobs = Arc::new(LocalBucketStore::new(storage.path(), &base));
        let state = AppState::new(config, db, blobs, Arc::new(FakeCatalog));

        let app = activity_hub_lib::http::router(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base,
            state,
            _storage: storage,
        }
    }

    async fn client(&self, subject: &str) -> ApiClient {
        let token = self
            .state
            .sessions
            .issue(&OwnerId::new(subject), subject)
            .await
            .unwrap();
        ApiClient::new(&self.base, &token)
    }
}

fn todo(title: &str) -> NewTodo {
    NewTodo {
        title: title.to_string(),
    }
}

#[tokio::test]
async fn test_created_item_replaces_placeholder() {
    let backend = Backend::start().await;
    let store = FeatureStore::<Todo>::new(backend.client("alice").await);
    store.refresh().await.unwrap();
    assert!(store.items().await.is_empty());

    let created = store.create(todo("Buy milk")).await.unwrap();
    assert!(created.id > 0);

    let items = store.items().await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, created.id);
    assert_eq!(items[0].title, "Buy milk");
    assert_eq!(items[0].owner_id, "alice");
    assert_eq!(store.phase().await, Phase::Idle);
}

#[tokio::test]
async fn test_placeholder_is_visible_while_pending() {
    let backend = Backend::start().await;
    let client = backend.client("alice").await;
    let store = FeatureStore::<Todo>::new(client);

    // Concurrent mutations on one store are serialized
    let create = store.create(todo("Walk dog"));
    let observe = async {
        loop {
            let items = store.items().await;
            if let Some(first) = items.first() {
                assert!(first.id < 0);
                assert_eq!(first.title, "Walk dog");
                let second = store.delete(first.id).await;
                assert_eq!(second, Err(ClientError::Busy(Busy)));
                break;
            }
            tokio::task::yield_now().await;
        }
    };
    let (created, ()) = tokio::join!(create, observe);
    let created = created.unwrap();

    assert_eq!(store.items().await.iter().map(|t| t.id).collect::<Vec<_>>(), vec![created.id]);
}

#[tokio::test]
async fn test_update_and_delete_follow_the_server() {
    let backend = Backend::start().await;
    let store = FeatureStore::<Todo>::new(backend.client("alice").await);
    let created = store.create(todo("Read")).await.unwrap();

    store
        .update(
            created.id,
            TodoPatch {
                title: None,
                is_completed: Some(true),
            },
        )
        .await
        .unwrap();
    let items = store.items().await;
    assert!(items[0].is_completed);
    assert_eq!(items[0].title, "Read");

    store.delete(created.id).await.unwrap();
    assert!(store.items().await.is_empty());
}

#[tokio::test]
async fn test_rejected_delete_keeps_the_row() {
    let backend = Backend::start().await;
    let alice = FeatureStore::<Note>::new(backend.client("alice").await);
    let note = alice
        .create(NewNote {
            title: "Secret".to_string(),
            content: "mine".to_string(),
        })
        .await
        .unwrap();

    // Bob's view has the id but not the row; the server refuses the delete
    let bob_client = backend.client("bob").await;
    let err = bob_client.delete::<Note>(note.id).await.unwrap_err();
    assert!(matches!(err, ClientError::PermissionDenied(_)));

    alice.refresh().await.unwrap();
    assert_eq!(alice.items().await.len(), 1);
}

#[tokio::test]
async fn test_server_failure_reverts_the_view() {
    let backend = Backend::start().await;
    let store = FeatureStore::<Pokemon>::new(backend.client("alice").await);

    // Valid locally, unknown to the catalog
    let err = store
        .create(NewPokemon {
            name: "missingno".to_string(),
            nickname: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)));
    assert!(store.items().await.is_empty());
    assert!(!store.is_pending().await);

    let caught = store
        .create(NewPokemon {
            name: "Eevee".to_string(),
            nickname: Some("Fluffy".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(caught.pokedex_number, 133);
    assert_eq!(store.items().await[0].nickname.as_deref(), Some("Fluffy"));
}

#[tokio::test]
async fn test_invalid_draft_never_shows() {
    let backend = Backend::start().await;
    let store = FeatureStore::<Todo>::new(backend.client("alice").await);

    let err = store.create(todo("   ")).await.unwrap_err();
    assert!(matches!(err, ClientError::ValidationFailed(_)));
    assert_eq!(store.phase().await, Phase::Idle);
    assert!(store.items().await.is_empty());
}

#[tokio::test]
async fn test_unauthenticated_client() {
    let backend = Backend::start().await;
    let store = FeatureStore::<Todo>::new(ApiClient::new(&backend.base, "forged"));

    let err = store.refresh().await.unwrap_err();
    assert!(matches!(err, ClientError::AuthenticationRequired(_)));
}

#[tokio::test]
async fn test_query_changes_reload() {
    let backend = Backend::start().await;
    let store = FeatureStore::<Todo>::new(backend.client("alice").await);
    for title in ["Water plants", "Pay rent", "water lawn"] {
        store.create(todo(title)).await.unwrap();
    }

    store
        .set_query(ListQuery {
            filter: Some("WATER".to_string()),
            sort: Some("title".to_string()),
            order: SortOrder::Asc,
        })
        .await
        .unwrap();
    let titles: Vec<_> = store.items().await.into_iter().map(|t| t.title).collect();
    assert_eq!(titles, vec!["Water plants", "water lawn"]);

    let err = store
        .set_query(ListQuery {
            sort: Some("owner_id".to_string()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::ValidationFailed(_)));
}

#[tokio::test]
async fn test_query_change_is_refused_while_pending() {
    let backend = Backend::start().await;
    let store = FeatureStore::<Todo>::new(backend.client("alice").await);
    store.create(todo("Pay rent")).await.unwrap();

    let create = store.create(todo("Water plants"));
    let change = async {
        while !store.is_pending().await {
            tokio::task::yield_now().await;
        }
        store
            .set_query(ListQuery {
                filter: Some("water".to_string()),
                ..Default::default()
            })
            .await
    };
    let (created, changed) = tokio::join!(create, change);
    let created = created.unwrap();

    assert_eq!(changed, Err(ClientError::Busy(Busy)));
    assert_eq!(store.query().await, ListQuery::default());
    let items = store.items().await;
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|t| t.id > 0));

    store
        .set_query(ListQuery {
            filter: Some("water".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    let ids: Vec<_> = store.items().await.into_iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![created.id]);
}

#[tokio::test]
async fn test_uploaded_photo_and_reviews() {
    let backend = Backend::start().await;
    let client = backend.client("alice").await;

    let stored = client
        .upload(Bucket::FoodPhotos, "ramen.png", None, b"\x89PNG fake bytes")
        .await
        .unwrap();
    assert!(stored.storage_path.starts_with("alice/"));

    let store = FeatureStore::<FoodPhoto>::new(client.clone());
    let photo = store
        .create(NewPhoto {
            name: "Ramen".to_string(),
            url: stored.url.clone(),
            storage_path: stored.storage_path.clone(),
        })
        .await
        .unwrap();

    let review = store
        .add_review(
            photo.id,
            NewReview {
                content: "Rich broth".to_string(),
                rating: 5,
            },
        )
        .await
        .unwrap();
    assert!(review.id > 0);
    let reviews = &store.items().await[0].reviews;
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].id, review.id);

    store
        .edit_review(
            photo.id,
            review.id,
            ReviewPatch {
                content: None,
                rating: Some(4),
            },
        )
        .await
        .unwrap();
    assert_eq!(store.items().await[0].reviews[0].rating, 4);

    store.remove_review(photo.id, review.id).await.unwrap();
    assert!(store.items().await[0].reviews.is_empty());

    store.delete(photo.id).await.unwrap();
    assert!(store.items().await.is_empty());
}

#[tokio::test]
async fn test_rejected_upload_leaves_photos_alone() {
    let backend = Backend::start().await;
    let client = backend.client("alice").await;
    let store = FeatureStore::<Photo>::new(client.clone());

    let err = client
        .upload(Bucket::Photos, "scan.pdf", Some("application/pdf"), b"%PDF")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::ValidationFailed(_)));

    // A path outside the caller's prefix is refused by the server
    let err = store
        .create(NewPhoto {
            name: "Borrowed".to_string(),
            url: format!("{}/storage/photos/bob/x.png", backend.base),
            storage_path: "bob/x.png".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::PermissionDenied(_)));
    assert!(store.items().await.is_empty());
}
