//! Pokemon Entity
//!
//! A caught pokemon resolved against the public catalog, plus its reviews.

use serde::{Deserialize, Serialize};

use super::entity::{DomainError, DomainResult, Entity, OwnedEntity, OwnerId, Validate};
use super::review::Review;

pub const NAME_MAX: usize = 50;
pub const NICKNAME_MAX: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pokemon {
    pub id: i64,
    pub owner_id: OwnerId,
    /// Catalog name, lowercase
    pub name: String,
    pub nickname: Option<String>,
    pub pokedex_number: i64,
    pub sprite_url: Option<String>,
    pub types: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
    /// Newest first
    #[serde(default)]
    pub reviews: Vec<Review>,
}

/// Create form as submitted by the user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPokemon {
    pub name: String,
    #[serde(default)]
    pub nickname: Option<String>,
}

/// Catalog entry for one species
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Species {
    pub name: String,
    pub pokedex_number: i64,
    pub sprite_url: Option<String>,
    pub types: Vec<String>,
}

/// Row to insert once the species is resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PokemonDraft {
    pub species: Species,
    #[serde(default)]
    pub nickname: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PokemonPatch {
    /// Empty string clears the nickname
    #[serde(default)]
    pub nickname: Option<String>,
}

/// Lowercase catalog key, or a validation error
pub fn normalize_name(raw: &str) -> DomainResult<String> {
    let name = raw.trim().to_lowercase();
    if name.is_empty() {
        return Err(DomainError::invalid("Pokemon name is required"));
    }
    if name.chars().count() > NAME_MAX {
        return Err(DomainError::invalid(format!(
            "Pokemon name must be at most {} characters",
            NAME_MAX
        )));
    }
    if !name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
        return Err(DomainError::invalid(
            "Pokemon name may only contain letters, digits and '-'",
        ));
    }
    Ok(name)
}

fn check_nickname(nickname: &str) -> DomainResult<()> {
    if nickname.trim().chars().count() > NICKNAME_MAX {
        return Err(DomainError::invalid(format!(
            "Nickname must be at most {} characters",
            NICKNAME_MAX
        )));
    }
    Ok(())
}

impl Validate for NewPokemon {
    fn validate(&self) -> DomainResult<()> {
        normalize_name(&self.name)?;
        if let Some(nickname) = &self.nickname {
            check_nickname(nickname)?;
        }
        Ok(())
    }
}

impl Validate for PokemonDraft {
    fn validate(&self) -> DomainResult<()> {
        normalize_name(&self.species.name)?;
        if self.species.pokedex_number <= 0 {
            return Err(DomainError::invalid("Pokedex number must be positive"));
        }
        if let Some(nickname) = &self.nickname {
            check_nickname(nickname)?;
        }
        Ok(())
    }
}

impl Validate for PokemonPatch {
    fn validate(&self) -> DomainResult<()> {
        match &self.nickname {
            Some(nickname) => check_nickname(nickname),
            None => Err(DomainError::invalid("Nothing to update")),
        }
    }
}

impl Entity for Pokemon {
    type Id = i64;

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl OwnedEntity for Pokemon {
    type Draft = PokemonDraft;
    type Patch = PokemonPatch;

    const NOUN: &'static str = "Pokemon";

    fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }
}
