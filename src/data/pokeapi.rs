//! PokeAPI v2 payload shapes (only the fields the bracket reads) and their
//! conversion into tournament types.

use serde::Deserialize;

use crate::tournament::{BaseStat, CategoryRelations, Contestant};

pub const DEFAULT_API_BASE_URL: &str = "https://pokeapi.co/api/v2/";

#[derive(Debug, Clone, Deserialize)]
pub struct NamedResource {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// `GET pokemon` (first page); only the total is used.
#[derive(Debug, Clone, Deserialize)]
pub struct PokemonListPayload {
    pub count: u32,
}

/// `GET pokemon/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct PokemonPayload {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub types: Vec<PokemonTypeSlot>,
    #[serde(default)]
    pub stats: Vec<PokemonStat>,
    #[serde(default)]
    pub sprites: Option<Sprites>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PokemonTypeSlot {
    pub slot: u8,
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PokemonStat {
    pub base_stat: i64,
    pub stat: NamedResource,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Sprites {
    #[serde(default)]
    pub front_default: Option<String>,
}

/// `GET type`.
#[derive(Debug, Clone, Deserialize)]
pub struct TypeListPayload {
    pub results: Vec<NamedResource>,
}

/// `GET type/{name}`. Relations are optional so malformed records still parse.
#[derive(Debug, Clone, Deserialize)]
pub struct TypeDetailsPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub damage_relations: Option<DamageRelations>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DamageRelations {
    #[serde(default)]
    pub double_damage_to: Option<Vec<NamedResource>>,
}

impl PokemonPayload {
    pub fn into_contestant(self) -> Contestant {
        let mut types = self.types;
        types.sort_by_key(|t| t.slot);

        let contestant = Contestant::new(
            self.id,
            self.name,
            types.into_iter().map(|t| t.kind.name),
            self.stats
                .into_iter()
                .map(|s| BaseStat::new(s.stat.name, s.base_stat)),
        );
        match self.sprites.and_then(|s| s.front_default) {
            Some(sprite) => contestant.with_sprite(sprite),
            None => contestant,
        }
    }
}

impl TypeDetailsPayload {
    /// `listed_name` is the name from the type index, used when the detail
    /// record does not carry its own.
    pub fn into_relations(self, listed_name: &str) -> CategoryRelations {
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| listed_name.to_string());
        let double_damage_to = self
            .damage_relations
            .and_then(|r| r.double_damage_to)
            .map(|targets| targets.into_iter().map(|t| t.name).collect());
        CategoryRelations {
            name,
            double_damage_to,
        }
    }
}
