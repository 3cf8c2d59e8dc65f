//! Pokemon commands
//!
//! The user names a species; the catalog supplies number, sprite and types.

use crate::domain::{
    normalize_name, DomainResult, NewPokemon, OwnerId, Pokemon, PokemonDraft, Validate,
};
use crate::pokeapi::PokemonCatalog;
use crate::repository::OwnedRepository;

pub async fn catch_pokemon(
    repo: &dyn OwnedRepository<Pokemon>,
    catalog: &dyn PokemonCatalog,
    owner: &OwnerId,
    input: &NewPokemon,
) -> DomainResult<Pokemon> {
    input.validate()?;
    let name = normalize_name(&input.name)?;
    let species = catalog.lookup(&name).await?;

    let draft = PokemonDraft {
        species,
        nickname: input.nickname.clone(),
    };
    draft.validate()?;

    let pokemon = repo.create(owner, &draft).await?;
    log::info!(
        "Pokemon {} (#{}) caught by {}",
        pokemon.name,
        pokemon.pokedex_number,
        owner
    );
    Ok(pokemon)
}
