//! Pokemon Repository Implementation

use async_trait::async_trait;
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};

use crate::domain::{
    DomainError, DomainResult, ListQuery, OwnedEntity, OwnerId, Pokemon, PokemonDraft,
    PokemonPatch,
};

use super::db::DbState;
use super::ownership::{ensure_owner, filter_clause, now_millis};
use super::review_repo::{reviews_for, POKEMON_REVIEWS};
use super::traits::OwnedRepository;

const TABLE: &str = "pokemon";
const COLUMNS: &str =
    "id, owner_id, name, nickname, pokedex_number, sprite_url, types, created_at, updated_at";
const SORTABLE: &[&str] = &["created_at", "updated_at", "name", "pokedex_number"];

fn row_to_pokemon(row: &Row<'_>) -> rusqlite::Result<Pokemon> {
    let types_json: String = row.get(6)?;
    let types: Vec<String> = serde_json::from_str(&types_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))?;
    Ok(Pokemon {
        id: row.get(0)?,
        owner_id: OwnerId::new(row.get::<_, String>(1)?),
        name: row.get(2)?,
        nickname: row.get(3)?,
        pokedex_number: row.get(4)?,
        sprite_url: row.get(5)?,
        types,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
        reviews: Vec::new(),
    })
}

fn attach_reviews(conn: &Connection, mut pokemon: Vec<Pokemon>) -> DomainResult<Vec<Pokemon>> {
    let ids: Vec<i64> = pokemon.iter().map(|p| p.id).collect();
    let mut reviews = reviews_for(conn, &POKEMON_REVIEWS, &ids)?;
    for entry in &mut pokemon {
        entry.reviews = reviews.remove(&entry.id).unwrap_or_default();
    }
    Ok(pokemon)
}

/// Blank nicknames are stored as NULL
fn clean_nickname(nickname: Option<&str>) -> Option<String> {
    nickname
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}

/// SQLite implementation of Pokemon repository
#[derive(Clone)]
pub struct PokemonRepository {
    db: DbState,
}

impl PokemonRepository {
    pub fn new(db: DbState) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OwnedRepository<Pokemon> for PokemonRepository {
    async fn create(&self, owner: &OwnerId, draft: &PokemonDraft) -> DomainResult<Pokemon> {
        let types = serde_json::to_string(&draft.species.types)
            .map_err(|e| DomainError::upstream(format!("encode types: {}", e)))?;
        self.db
            .call(|conn| {
                let now = now_millis();
                let nickname = clean_nickname(draft.nickname.as_deref());
                conn.execute(
                    "INSERT INTO pokemon (owner_id, name, nickname, pokedex_number, sprite_url, types, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
                    params![
                        owner.as_str(),
                        draft.species.name,
                        nickname,
                        draft.species.pokedex_number,
                        draft.species.sprite_url,
                        types,
                        now
                    ],
                )?;
                Ok(Pokemon {
                    id: conn.last_insert_rowid(),
                    owner_id: owner.clone(),
                    name: draft.species.name.clone(),
                    nickname,
                    pokedex_number: draft.species.pokedex_number,
                    sprite_url: draft.species.sprite_url.clone(),
                    types: draft.species.types.clone(),
                    created_at: now,
                    updated_at: now,
                    reviews: Vec::new(),
                })
            })
            .await
    }

    async fn find_by_id(&self, owner: &OwnerId, id: i64) -> DomainResult<Pokemon> {
        self.db
            .call(|conn| {
                ensure_owner(conn, TABLE, Pokemon::NOUN, id, owner)?;
                let pokemon = conn.query_row(
                    &format!("SELECT {} FROM pokemon WHERE id = ?1", COLUMNS),
                    params![id],
                    row_to_pokemon,
                )?;
                Ok(attach_reviews(conn, vec![pokemon])?.remove(0))
            })
            .await
    }

    async fn list(&self, owner: &OwnerId, query: &ListQuery) -> DomainResult<Vec<Pokemon>> {
        let column = query.sort_column(SORTABLE)?;
        let order = query.order.as_sql();
        let pattern = query.like_pattern();

        self.db
            .call(|conn| {
                let sql = format!(
                    "SELECT {} FROM pokemon WHERE owner_id = ?1 AND {} ORDER BY {} {}, id {}",
                    COLUMNS,
                    filter_clause("name", 2),
                    column,
                    order,
                    order
                );
                let mut stmt = conn.prepare(&sql)?;
                let pokemon = stmt
                    .query_map(params![owner.as_str(), pattern], row_to_pokemon)?
                    .collect::<Result<Vec<_>, _>>()?;
                attach_reviews(conn, pokemon)
            })
            .await
    }

    async fn update(&self, owner: &OwnerId, id: i64, patch: &PokemonPatch) -> DomainResult<()> {
        self.db
            .call(|conn| {
                ensure_owner(conn, TABLE, Pokemon::NOUN, id, owner)?;
                if patch.nickname.is_some() {
                    conn.execute(
                        "UPDATE pokemon SET nickname = ?1, updated_at = ?2 WHERE id = ?3",
                        params![clean_nickname(patch.nickname.as_deref()), now_millis(), id],
                    )?;
                }
                Ok(())
            })
            .await
    }

    async fn delete(&self, owner: &OwnerId, id: i64) -> DomainResult<()> {
        self.db
            .call(|conn| {
                ensure_owner(conn, TABLE, Pokemon::NOUN, id, owner)?;
                conn.execute("DELETE FROM pokemon WHERE id = ?1", params![id])?;
                Ok(())
            })
            .await
    }
}
