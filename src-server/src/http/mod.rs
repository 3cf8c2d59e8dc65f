//! HTTP Layer
//!
//! axum router over the command layer. Every `/api` route requires a
//! bearer token and answers with the `{success, message, data?}` envelope.

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    routing::{get, patch, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

mod assets;
mod extract;
mod handlers;
mod reply;

pub use reply::{status_for, ApiError, ApiReply, HandlerResult};

use crate::domain::{FoodPhoto, Note, Photo, Pokemon, Todo};
use crate::state::SharedState;
use handlers::*;

/// Base64 inflates a 10 MiB image by a third; leave room for the JSON around it
const BODY_LIMIT: usize = 16 * 1024 * 1024;

pub fn router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    let api = Router::new()
        .route("/todos", get(list::<Todo>).post(create::<Todo>))
        .route(
            "/todos/{id}",
            get(fetch::<Todo>).patch(update::<Todo>).delete(delete::<Todo>),
        )
        .route(
            "/photos",
            get(list::<Photo>).post(create_bucket_backed::<Photo>),
        )
        .route(
            "/photos/{id}",
            get(fetch::<Photo>)
                .patch(update::<Photo>)
                .delete(delete_bucket_backed::<Photo>),
        )
        .route(
            "/food-photos",
            get(list::<FoodPhoto>).post(create_bucket_backed::<FoodPhoto>),
        )
        .route(
            "/food-photos/{id}",
            get(fetch::<FoodPhoto>)
                .patch(update::<FoodPhoto>)
                .delete(delete_bucket_backed::<FoodPhoto>),
        )
        .route("/food-photos/{id}/reviews", post(add_review::<FoodPhoto>))
        .route(
            "/food-reviews/{id}",
            patch(edit_review::<FoodPhoto>).delete(remove_review::<FoodPhoto>),
        )
        .route("/pokemon", get(list::<Pokemon>).post(create_pokemon))
        .route(
            "/pokemon/{id}",
            get(fetch::<Pokemon>)
                .patch(update::<Pokemon>)
                .delete(delete::<Pokemon>),
        )
        .route("/pokemon/{id}/reviews", post(add_review::<Pokemon>))
        .route(
            "/pokemon-reviews/{id}",
            patch(edit_review::<Pokemon>).delete(remove_review::<Pokemon>),
        )
        .route("/notes", get(list::<Note>).post(create::<Note>))
        .route(
            "/notes/{id}",
            get(fetch::<Note>).patch(update::<Note>).delete(delete::<Note>),
        )
        .route("/storage/{bucket}", post(upload));

    Router::new()
        .route("/health", get(health))
        .route("/storage/{bucket}/{*path}", get(assets::serve_object))
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(cors)
        .with_state(state)
}
