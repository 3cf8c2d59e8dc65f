//! HTTP API Tests
//!
//! Drives the router over a real socket with an in-memory database.

use std::path::Path;
use std::sync::Arc;

use activity_hub_lib::config::Config;
use activity_hub_lib::domain::{DomainError, DomainResult, OwnerId, Species};
use activity_hub_lib::http::router;
use activity_hub_lib::pokeapi::PokemonCatalog;
use activity_hub_lib::repository::init_db;
use activity_hub_lib::state::{AppState, SharedState};
use activity_hub_lib::storage::LocalBucketStore;
use async_trait::async_trait;
use base64::Engine;
use reqwest::StatusCode;
use serde_json::{json, Value};
use tempfile::TempDir;

struct FakeCatalog;

#[async_trait]
impl PokemonCatalog for FakeCatalog {
    async fn lookup(&self, name: &str) -> DomainResult<Species> {
        match name {
            "pikachu" => Ok(Species {
                name: "pikachu".to_string(),
                pokedex_number: 25,
                sprite_url: Some("https://sprites/25.png".to_string()),
                types: vec!["electric".to_string()],
            }),
            "outage" => Err(DomainError::upstream("pokeapi: connection reset by peer")),
            _ => Err(DomainError::NotFound(format!("Pokemon '{}'", name))),
        }
    }
}

struct TestServer {
    base: String,
    client: reqwest::Client,
    state: SharedState,
    _storage: TempDir,
}

impl TestServer {
    async fn start() -> Self {
        let storage = tempfile::tempdir().unwrap();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let mut config = Config::for_tests(storage.path());
        config.public_url = base.clone();
        let db = init_db(Path::new(":memory:")).await.unwrap();
        let blobs = Arc::new(LocalBucketStore::new(storage.path(), &base));
        let state = AppState::new(config, db, blobs, Arc::new(FakeCatalog));

        let app = router(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base,
            client: reqwest::Client::new(),
            state,
            _storage: storage,
        }
    }

    async fn login(&self, subject: &str) -> String {
        self.state
            .sessions
            .issue(&OwnerId::new(subject), subject)
            .await
            .unwrap()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = self.client.request(method, self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await.unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }
}

fn encoded(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

#[tokio::test]
async fn test_health() {
    let server = TestServer::start().await;
    let (status, body) = server.send(reqwest::Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_missing_token_is_401_envelope() {
    let server = TestServer::start().await;

    let (status, body) = server.send(reqwest::Method::GET, "/api/todos", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "success": false, "message": "Authentication required" }));

    let (status, _) = server
        .send(reqwest::Method::GET, "/api/todos", Some("forged"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_then_list_contains_item_once() {
    let server = TestServer::start().await;
    let token = server.login("alice").await;

    let (status, created) = server
        .send(
            reqwest::Method::POST,
            "/api/todos",
            Some(&token),
            Some(json!({ "title": "Buy milk" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["message"], "Todo created");
    let id = created["data"]["id"].as_i64().unwrap();
    assert!(id > 0);
    assert_eq!(created["data"]["isCompleted"], false);

    let (status, listed) = server
        .send(reqwest::Method::GET, "/api/todos", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let items = listed["data"].as_array().unwrap();
    assert_eq!(items.iter().filter(|t| t["id"] == id).count(), 1);
}

#[tokio::test]
async fn test_partial_update_and_query_params() {
    let server = TestServer::start().await;
    let token = server.login("alice").await;

    for title in ["Beta", "alpha", "Gamma"] {
        server
            .send(
                reqwest::Method::POST,
                "/api/notes",
                Some(&token),
                Some(json!({ "title": title, "content": "# heading" })),
            )
            .await;
    }

    let (_, listed) = server
        .send(
            reqwest::Method::GET,
            "/api/notes?sort=title&order=asc",
            Some(&token),
            None,
        )
        .await;
    let titles: Vec<_> = listed["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["Beta", "Gamma", "alpha"]);

    let (status, body) = server
        .send(reqwest::Method::GET, "/api/notes?sort=owner", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (_, filtered) = server
        .send(reqwest::Method::GET, "/api/notes?filter=ALP", Some(&token), None)
        .await;
    let id = filtered["data"][0]["id"].as_i64().unwrap();

    let (status, _) = server
        .send(
            reqwest::Method::PATCH,
            &format!("/api/notes/{}", id),
            Some(&token),
            Some(json!({ "content": "updated" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, fetched) = server
        .send(reqwest::Method::GET, &format!("/api/notes/{}", id), Some(&token), None)
        .await;
    assert_eq!(fetched["data"]["title"], "alpha");
    assert_eq!(fetched["data"]["content"], "updated");
}

#[tokio::test]
async fn test_validation_failure_is_400() {
    let server = TestServer::start().await;
    let token = server.login("alice").await;

    let (status, body) = server
        .send(
            reqwest::Method::POST,
            "/api/todos",
            Some(&token),
            Some(json!({ "title": "" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Title is required");

    let (status, body) = server
        .send(
            reqwest::Method::POST,
            "/api/todos",
            Some(&token),
            Some(json!({ "heading": "wrong field" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_cross_owner_delete_is_403_and_list_unchanged() {
    let server = TestServer::start().await;
    let alice = server.login("alice").await;
    let bob = server.login("bob").await;

    let (_, created) = server
        .send(
            reqwest::Method::POST,
            "/api/todos",
            Some(&alice),
            Some(json!({ "title": "Alice only" })),
        )
        .await;
    let id = created["data"]["id"].as_i64().unwrap();

    let (status, body) = server
        .send(reqwest::Method::DELETE, &format!("/api/todos/{}", id), Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Permission denied");

    let (_, listed) = server
        .send(reqwest::Method::GET, "/api/todos", Some(&alice), None)
        .await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);

    let (status, body) = server
        .send(reqwest::Method::DELETE, "/api/todos/777", Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Todo 777 not found");
}

#[tokio::test]
async fn test_pdf_upload_is_rejected() {
    let server = TestServer::start().await;
    let token = server.login("alice").await;

    let (status, body) = server
        .send(
            reqwest::Method::POST,
            "/api/storage/photos",
            Some(&token),
            Some(json!({
                "fileName": "taxes.pdf",
                "contentType": "application/pdf",
                "data": encoded(b"%PDF-1.7"),
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = server
        .send(
            reqwest::Method::POST,
            "/api/storage/avatars",
            Some(&token),
            Some(json!({ "fileName": "a.png", "data": encoded(b"png") })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_photo_upload_register_serve_delete() {
    let server = TestServer::start().await;
    let token = server.login("alice").await;

    let (status, uploaded) = server
        .send(
            reqwest::Method::POST,
            "/api/storage/photos",
            Some(&token),
            Some(json!({
                "fileName": "beach day.png",
                "data": format!("data:image/png;base64,{}", encoded(b"fake-png")),
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let url = uploaded["data"]["url"].as_str().unwrap().to_string();
    let storage_path = uploaded["data"]["storagePath"].as_str().unwrap().to_string();

    let served = server.client.get(&url).send().await.unwrap();
    assert_eq!(served.status(), StatusCode::OK);
    assert_eq!(served.headers()["content-type"], "image/png");
    assert_eq!(served.bytes().await.unwrap().as_ref(), b"fake-png");

    let (status, created) = server
        .send(
            reqwest::Method::POST,
            "/api/photos",
            Some(&token),
            Some(json!({ "name": "Beach", "url": url, "storagePath": storage_path })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["data"]["id"].as_i64().unwrap();

    let (status, _) = server
        .send(reqwest::Method::DELETE, &format!("/api/photos/{}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let gone = server.client.get(&url).send().await.unwrap();
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_food_reviews_follow_their_photo() {
    let server = TestServer::start().await;
    let token = server.login("alice").await;

    let (_, created) = server
        .send(
            reqwest::Method::POST,
            "/api/food-photos",
            Some(&token),
            Some(json!({
                "name": "Ramen",
                "url": "http://localhost/storage/food-photos/alice/x-ramen.jpg",
                "storagePath": "alice/x-ramen.jpg",
            })),
        )
        .await;
    let photo_id = created["data"]["id"].as_i64().unwrap();

    let (status, review) = server
        .send(
            reqwest::Method::POST,
            &format!("/api/food-photos/{}/reviews", photo_id),
            Some(&token),
            Some(json!({ "content": "Rich broth", "rating": 5 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let review_id = review["data"]["id"].as_i64().unwrap();

    let (status, _) = server
        .send(
            reqwest::Method::POST,
            &format!("/api/food-photos/{}/reviews", photo_id),
            Some(&token),
            Some(json!({ "content": "Too spicy", "rating": 9 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = server
        .send(
            reqwest::Method::PATCH,
            &format!("/api/food-reviews/{}", review_id),
            Some(&token),
            Some(json!({ "rating": 4 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, fetched) = server
        .send(
            reqwest::Method::GET,
            &format!("/api/food-photos/{}", photo_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(fetched["data"]["reviews"][0]["rating"], 4);
    assert_eq!(fetched["data"]["reviews"][0]["parentId"], photo_id);
}

#[tokio::test]
async fn test_pokemon_catalog_outcomes() {
    let server = TestServer::start().await;
    let token = server.login("alice").await;

    let (status, caught) = server
        .send(
            reqwest::Method::POST,
            "/api/pokemon",
            Some(&token),
            Some(json!({ "name": "Pikachu", "nickname": "Sparky" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(caught["data"]["pokedexNumber"], 25);
    assert_eq!(caught["data"]["types"], json!(["electric"]));

    let (status, body) = server
        .send(
            reqwest::Method::POST,
            "/api/pokemon",
            Some(&token),
            Some(json!({ "name": "agumon" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, body) = server
        .send(
            reqwest::Method::POST,
            "/api/pokemon",
            Some(&token),
            Some(json!({ "name": "outage" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["message"], "Something went wrong. Please try again.");
}
