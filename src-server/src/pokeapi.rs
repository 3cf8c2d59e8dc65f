//! Pokemon catalog
//!
//! Species lookup against PokeAPI (`GET {base}/pokemon/{name}`).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::domain::{normalize_name, DomainError, DomainResult, Species};

#[async_trait]
pub trait PokemonCatalog: Send + Sync {
    /// NotFound for unknown species, UpstreamFailure for anything else
    async fn lookup(&self, name: &str) -> DomainResult<Species>;
}

#[derive(Debug, Deserialize)]
struct PokemonResponse {
    id: i64,
    name: String,
    sprites: Sprites,
    types: Vec<TypeSlot>,
}

#[derive(Debug, Deserialize)]
struct Sprites {
    front_default: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TypeSlot {
    slot: u32,
    #[serde(rename = "type")]
    kind: NamedResource,
}

#[derive(Debug, Deserialize)]
struct NamedResource {
    name: String,
}

impl From<PokemonResponse> for Species {
    fn from(mut resp: PokemonResponse) -> Self {
        resp.types.sort_by_key(|t| t.slot);
        Species {
            name: resp.name,
            pokedex_number: resp.id,
            sprite_url: resp.sprites.front_default,
            types: resp.types.into_iter().map(|t| t.kind.name).collect(),
        }
    }
}

pub struct PokeApiCatalog {
    client: reqwest::Client,
    base_url: String,
}

impl PokeApiCatalog {
    pub fn new(base_url: &str) -> DomainResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| DomainError::upstream(format!("http client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PokemonCatalog for PokeApiCatalog {
    async fn lookup(&self, name: &str) -> DomainResult<Species> {
        let name = normalize_name(name)?;
        let url = format!("{}/pokemon/{}", self.base_url, name);
        log::debug!("Catalog lookup {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DomainError::upstream(format!("pokeapi request: {}", e)))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(DomainError::NotFound(format!("Pokemon '{}'", name))),
            status if !status.is_success() => Err(DomainError::upstream(format!(
                "pokeapi returned {} for {}",
                status, name
            ))),
            _ => {
                let body: PokemonResponse = response
                    .json()
                    .await
                    .map_err(|e| DomainError::upstream(format!("pokeapi body: {}", e)))?;
                Ok(body.into())
            }
        }
    }
}
