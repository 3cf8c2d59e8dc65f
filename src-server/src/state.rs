use std::sync::Arc;

use crate::auth::IdentityProvider;
use crate::config::Config;
use crate::pokeapi::PokemonCatalog;
use crate::repository::{
    DbState, FoodPhotoRepository, NoteRepository, PhotoRepository, PokemonRepository,
    ReviewRepository, SessionRepository, TodoRepository, FOOD_REVIEWS, POKEMON_REVIEWS,
};
use crate::storage::BlobStore;

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub db: DbState,
    pub todos: TodoRepository,
    pub photos: PhotoRepository,
    pub food_photos: FoodPhotoRepository,
    pub food_reviews: ReviewRepository,
    pub pokemon: PokemonRepository,
    pub pokemon_reviews: ReviewRepository,
    pub notes: NoteRepository,
    pub sessions: SessionRepository,
    pub identity: Arc<dyn IdentityProvider>,
    pub blobs: Arc<dyn BlobStore>,
    pub catalog: Arc<dyn PokemonCatalog>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(
        config: Config,
        db: DbState,
        blobs: Arc<dyn BlobStore>,
        catalog: Arc<dyn PokemonCatalog>,
    ) -> SharedState {
        let sessions = SessionRepository::new(db.clone());

        Arc::new(Self {
            todos: TodoRepository::new(db.clone()),
            photos: PhotoRepository::new(db.clone()),
            food_photos: FoodPhotoRepository::new(db.clone()),
            food_reviews: ReviewRepository::new(db.clone(), FOOD_REVIEWS),
            pokemon: PokemonRepository::new(db.clone()),
            pokemon_reviews: ReviewRepository::new(db.clone(), POKEMON_REVIEWS),
            notes: NoteRepository::new(db.clone()),
            identity: Arc::new(sessions.clone()),
            sessions,
            config,
            db,
            blobs,
            catalog,
        })
    }
}
