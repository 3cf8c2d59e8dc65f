//! Domain Layer
//!
//! Contains all domain entities and core abstractions.
//! This layer has no storage or transport dependencies.

mod entity;
mod list_query;
mod note;
mod photo;
mod pokemon;
mod profile;
mod review;
mod todo;

pub use entity::{
    DomainError, DomainResult, Entity, OwnedEntity, OwnerId, Validate, GENERIC_FAILURE,
};
pub use list_query::{ListQuery, SortOrder};
pub use note::{NewNote, Note, NotePatch};
pub use photo::{FoodPhoto, NewPhoto, Photo, PhotoPatch};
pub use pokemon::{normalize_name, NewPokemon, Pokemon, PokemonDraft, PokemonPatch, Species};
pub use profile::Profile;
pub use review::{NewReview, Review, ReviewPatch};
pub use todo::{NewTodo, Todo, TodoPatch};
