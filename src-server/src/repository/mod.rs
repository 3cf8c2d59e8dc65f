//! Repository Layer
//!
//! Data access abstractions and implementations.

mod db;
mod note_repo;
mod ownership;
mod photo_repo;
mod pokemon_repo;
mod review_repo;
mod session_repo;
mod todo_repo;
mod traits;


pub use db::{init_db, DbState};
pub use note_repo::NoteRepository;
pub use photo_repo::{FoodPhotoRepository, PhotoRepository};
pub use pokemon_repo::PokemonRepository;
pub use review_repo::{ReviewRepository, ReviewTable, FOOD_REVIEWS, POKEMON_REVIEWS};
pub use session_repo::SessionRepository;
pub use todo_repo::TodoRepository;
pub use traits::OwnedRepository;
