//! Tournament contestants and their raw strength.
//! Contestants are built once by the data layer and never mutated afterwards.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// One named base attribute (e.g. `hp = 45`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStat {
    pub name: String,
    pub value: i64,
}

impl BaseStat {
    pub fn new(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A Pokémon entered into the bracket.
///
/// Identity is the PokeAPI id: two records with the same id are the same
/// contestant even if incidental fields (sprite, stat names) differ.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contestant {
    pub id: u32,
    pub name: String,
    /// Category tags in slot order (one or two).
    pub types: Vec<String>,
    /// Base attributes in API order.
    pub stats: Vec<BaseStat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite_url: Option<String>,
}

impl Contestant {
    pub fn new(
        id: u32,
        name: impl Into<String>,
        types: impl IntoIterator<Item = impl Into<String>>,
        stats: impl IntoIterator<Item = BaseStat>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            types: types.into_iter().map(Into::into).collect(),
            stats: stats.into_iter().collect(),
            sprite_url: None,
        }
    }

    pub fn with_sprite(mut self, sprite_url: impl Into<String>) -> Self {
        self.sprite_url = Some(sprite_url.into());
        self
    }

    pub fn strength(&self) -> i64 {
        strength(self)
    }
}

impl PartialEq for Contestant {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Contestant {}

impl Hash for Contestant {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Sum of every base-attribute value. Zero when the contestant has no stats.
pub fn strength(contestant: &Contestant) -> i64 {
    contestant.stats.iter().map(|stat| stat.value).sum()
}
