//! Client Models
//!
//! Data structures matching the server entities, plus the form types each
//! feature submits. Forms are checked here before any request is sent.

use optimistic_list::Keyed;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Response body of every API call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub data: Option<T>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Query string of a list request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    pub order: SortOrder,
}

// ========================
// Entities
// ========================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub owner_id: String,
    pub title: String,
    pub is_completed: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: i64,
    pub owner_id: String,
    pub name: String,
    pub url: String,
    pub storage_path: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: i64,
    pub owner_id: String,
    pub parent_id: i64,
    pub content: String,
    pub rating: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodPhoto {
    pub id: i64,
    pub owner_id: String,
    pub name: String,
    pub url: String,
    pub storage_path: String,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pokemon {
    pub id: i64,
    pub owner_id: String,
    pub name: String,
    pub nickname: Option<String>,
    pub pokedex_number: i64,
    pub sprite_url: Option<String>,
    pub types: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: i64,
    pub owner_id: String,
    pub title: String,
    pub content: String,
    pub created_at: i64,
    pub updated_at: i64,
}

// ========================
// Forms
// ========================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTodo {
    pub title: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPhoto {
    pub name: String,
    pub url: String,
    pub storage_path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPokemon {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PokemonPatch {
    /// Empty string clears the nickname
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNote {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub content: String,
    pub rating: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: String,
}

/// Where an upload landed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    pub url: String,
    pub storage_path: String,
}

// ========================
// Form checks
// ========================

/// Same rules the server applies, so bad input never leaves the client
pub trait Check {
    fn check(&self) -> ClientResult<()>;
}

fn text(field: &str, value: &str, max: usize) -> ClientResult<()> {
    let len = value.trim().chars().count();
    if len == 0 {
        return Err(ClientError::invalid(format!("{} is required", field)));
    }
    if len > max {
        return Err(ClientError::invalid(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(())
}

fn rating(value: i64) -> ClientResult<()> {
    if (1..=5).contains(&value) {
        Ok(())
    } else {
        Err(ClientError::invalid("Rating must be between 1 and 5"))
    }
}

fn nothing_to_update() -> ClientError {
    ClientError::invalid("Nothing to update")
}

impl Check for NewTodo {
    fn check(&self) -> ClientResult<()> {
        text("Title", &self.title, 200)
    }
}

impl Check for TodoPatch {
    fn check(&self) -> ClientResult<()> {
        match (&self.title, self.is_completed) {
            (None, None) => Err(nothing_to_update()),
            (Some(title), _) => text("Title", title, 200),
            _ => Ok(()),
        }
    }
}

impl Check for NewPhoto {
    fn check(&self) -> ClientResult<()> {
        text("Name", &self.name, 100)?;
        if self.url.trim().is_empty() || self.storage_path.trim().is_empty() {
            return Err(ClientError::invalid("Upload the photo first"));
        }
        Ok(())
    }
}

impl Check for PhotoPatch {
    fn check(&self) -> ClientResult<()> {
        let name = self.name.as_deref().ok_or_else(nothing_to_update)?;
        text("Name", name, 100)
    }
}

impl Check for NewPokemon {
    fn check(&self) -> ClientResult<()> {
        let name = self.name.trim().to_lowercase();
        text("Pokemon name", &name, 50)?;
        if !name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(ClientError::invalid(
                "Pokemon name may only contain letters, digits and '-'",
            ));
        }
        if let Some(nickname) = &self.nickname {
            if nickname.trim().chars().count() > 50 {
                return Err(ClientError::invalid("Nickname must be at most 50 characters"));
            }
        }
        Ok(())
    }
}

impl Check for PokemonPatch {
    fn check(&self) -> ClientResult<()> {
        let nickname = self.nickname.as_deref().ok_or_else(nothing_to_update)?;
        if nickname.trim().chars().count() > 50 {
            return Err(ClientError::invalid("Nickname must be at most 50 characters"));
        }
        Ok(())
    }
}

impl Check for NewNote {
    fn check(&self) -> ClientResult<()> {
        text("Title", &self.title, 200)?;
        if self.content.chars().count() > 50_000 {
            return Err(ClientError::invalid(
                "Note content must be at most 50000 characters",
            ));
        }
        Ok(())
    }
}

impl Check for NotePatch {
    fn check(&self) -> ClientResult<()> {
        if self.title.is_none() && self.content.is_none() {
            return Err(nothing_to_update());
        }
        if let Some(title) = &self.title {
            text("Title", title, 200)?;
        }
        if let Some(content) = &self.content {
            if content.chars().count() > 50_000 {
                return Err(ClientError::invalid(
                    "Note content must be at most 50000 characters",
                ));
            }
        }
        Ok(())
    }
}

impl Check for NewReview {
    fn check(&self) -> ClientResult<()> {
        text("Review", &self.content, 1000)?;
        rating(self.rating)
    }
}

impl Check for ReviewPatch {
    fn check(&self) -> ClientResult<()> {
        if self.content.is_none() && self.rating.is_none() {
            return Err(nothing_to_update());
        }
        if let Some(content) = &self.content {
            text("Review", content, 1000)?;
        }
        if let Some(value) = self.rating {
            rating(value)?;
        }
        Ok(())
    }
}

// ========================
// Features
// ========================

/// A list-backed feature served under `/api/{PATH}`
pub trait Feature: Keyed<Key = i64> + DeserializeOwned + Send + Sync + 'static {
    type Draft: Check + Serialize + Send + Sync;
    type Patch: Check + Serialize + Send + Sync;

    const PATH: &'static str;

    /// Speculative item shown until the refetch lands
    fn placeholder(id: i64, draft: &Self::Draft, now: i64) -> Self;

    /// Speculative result of applying `patch`
    fn patched(&self, patch: &Self::Patch, now: i64) -> Self;
}

macro_rules! keyed_by_id {
    ($($ty:ty),*) => {
        $(impl Keyed for $ty {
            type Key = i64;

            fn key(&self) -> i64 {
                self.id
            }
        })*
    };
}

keyed_by_id!(Todo, Photo, FoodPhoto, Pokemon, Note, Review);

impl Feature for Todo {
    type Draft = NewTodo;
    type Patch = TodoPatch;
    const PATH: &'static str = "todos";

    fn placeholder(id: i64, draft: &NewTodo, now: i64) -> Self {
        Todo {
            id,
            owner_id: String::new(),
            title: draft.title.trim().to_string(),
            is_completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn patched(&self, patch: &TodoPatch, now: i64) -> Self {
        Todo {
            title: patch
                .title
                .as_deref()
                .map(|t| t.trim().to_string())
                .unwrap_or_else(|| self.title.clone()),
            is_completed: patch.is_completed.unwrap_or(self.is_completed),
            updated_at: now,
            ..self.clone()
        }
    }
}

impl Feature for Photo {
    type Draft = NewPhoto;
    type Patch = PhotoPatch;
    const PATH: &'static str = "photos";

    fn placeholder(id: i64, draft: &NewPhoto, now: i64) -> Self {
        Photo {
            id,
            owner_id: String::new(),
            name: draft.name.trim().to_string(),
            url: draft.url.clone(),
            storage_path: draft.storage_path.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    fn patched(&self, patch: &PhotoPatch, now: i64) -> Self {
        Photo {
            name: patch
                .name
                .as_deref()
                .map(|n| n.trim().to_string())
                .unwrap_or_else(|| self.name.clone()),
            updated_at: now,
            ..self.clone()
        }
    }
}

impl Feature for FoodPhoto {
    type Draft = NewPhoto;
    type Patch = PhotoPatch;
    const PATH: &'static str = "food-photos";

    fn placeholder(id: i64, draft: &NewPhoto, now: i64) -> Self {
        FoodPhoto {
            id,
            owner_id: String::new(),
            name: draft.name.trim().to_string(),
            url: draft.url.clone(),
            storage_path: draft.storage_path.clone(),
            created_at: now,
            updated_at: now,
            reviews: Vec::new(),
        }
    }

    fn patched(&self, patch: &PhotoPatch, now: i64) -> Self {
        FoodPhoto {
            name: patch
                .name
                .as_deref()
                .map(|n| n.trim().to_string())
                .unwrap_or_else(|| self.name.clone()),
            updated_at: now,
            ..self.clone()
        }
    }
}

impl Feature for Pokemon {
    type Draft = NewPokemon;
    type Patch = PokemonPatch;
    const PATH: &'static str = "pokemon";

    /// Catalog fields stay empty until the server resolves the species
    fn placeholder(id: i64, draft: &NewPokemon, now: i64) -> Self {
        Pokemon {
            id,
            owner_id: String::new(),
            name: draft.name.trim().to_lowercase(),
            nickname: draft.nickname.clone().filter(|n| !n.trim().is_empty()),
            pokedex_number: 0,
            sprite_url: None,
            types: Vec::new(),
            created_at: now,
            updated_at: now,
            reviews: Vec::new(),
        }
    }

    fn patched(&self, patch: &PokemonPatch, now: i64) -> Self {
        let nickname = match patch.nickname.as_deref().map(str::trim) {
            Some("") => None,
            Some(n) => Some(n.to_string()),
            None => self.nickname.clone(),
        };
        Pokemon {
            nickname,
            updated_at: now,
            ..self.clone()
        }
    }
}

impl Feature for Note {
    type Draft = NewNote;
    type Patch = NotePatch;
    const PATH: &'static str = "notes";

    fn placeholder(id: i64, draft: &NewNote, now: i64) -> Self {
        Note {
            id,
            owner_id: String::new(),
            title: draft.title.trim().to_string(),
            content: draft.content.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    fn patched(&self, patch: &NotePatch, now: i64) -> Self {
        Note {
            title: patch
                .title
                .as_deref()
                .map(|t| t.trim().to_string())
                .unwrap_or_else(|| self.title.clone()),
            content: patch.content.clone().unwrap_or_else(|| self.content.clone()),
            updated_at: now,
            ..self.clone()
        }
    }
}

/// Features whose items carry reviews
pub trait Reviewed: Feature {
    /// Path of the review collection, e.g. `food-reviews`
    const REVIEW_PATH: &'static str;

    fn owner_id(&self) -> &str;

    fn reviews(&self) -> &[Review];

    fn with_reviews(&self, reviews: Vec<Review>) -> Self;
}

impl Reviewed for FoodPhoto {
    const REVIEW_PATH: &'static str = "food-reviews";

    fn owner_id(&self) -> &str {
        &self.owner_id
    }

    fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    fn with_reviews(&self, reviews: Vec<Review>) -> Self {
        FoodPhoto {
            reviews,
            ..self.clone()
        }
    }
}

impl Reviewed for Pokemon {
    const REVIEW_PATH: &'static str = "pokemon-reviews";

    fn owner_id(&self) -> &str {
        &self.owner_id
    }

    fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    fn with_reviews(&self, reviews: Vec<Review>) -> Self {
        Pokemon {
            reviews,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forms_are_checked() {
        assert!(NewTodo { title: " ".into() }.check().is_err());
        assert!(TodoPatch::default().check().is_err());
        assert!(NewReview { content: "ok".into(), rating: 6 }.check().is_err());
        assert!(NewPokemon { name: "Mr Mime".into(), nickname: None }.check().is_err());
        assert!(NewPokemon { name: "Mr-Mime".into(), nickname: None }.check().is_ok());
    }

    #[test]
    fn test_patch_serializes_present_fields_only() {
        let patch = TodoPatch { title: None, is_completed: Some(true) };
        assert_eq!(serde_json::to_string(&patch).unwrap(), r#"{"isCompleted":true}"#);
    }

    #[test]
    fn test_pokemon_nickname_patch() {
        let base = Pokemon::placeholder(
            -1,
            &NewPokemon { name: "Eevee".into(), nickname: Some("Fluffy".into()) },
            0,
        );
        assert_eq!(base.name, "eevee");
        let cleared = base.patched(&PokemonPatch { nickname: Some(String::new()) }, 1);
        assert_eq!(cleared.nickname, None);
        let kept = base.patched(&PokemonPatch::default(), 1);
        assert_eq!(kept.nickname.as_deref(), Some("Fluffy"));
    }
}
