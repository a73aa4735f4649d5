//! Where contestants and type relations come from: the live PokeAPI or a
//! JSON snapshot on disk. The tournament core never calls these directly.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::config::AppConfig;
use crate::data::pokeapi::{PokemonListPayload, PokemonPayload, TypeDetailsPayload, TypeListPayload};
use crate::data::pool::PoolSnapshot;
use crate::error::DataError;
use crate::tournament::{CategoryRelations, Contestant};

/// Catalog of drawable Pokémon plus the type relation data.
///
/// Draw numbers run from 1 to [`PokemonSource::pokemon_count`]; a number with
/// no Pokémon behind it yields `Ok(None)`.
pub trait PokemonSource: Send + Sync {
    fn pokemon_count(&self) -> Result<u32, DataError>;

    fn fetch_pokemon(&self, number: u32) -> Result<Option<Contestant>, DataError>;

    /// Relations for every known category. Individual categories that fail
    /// to load are logged and left out.
    fn category_relations(&self) -> Result<Vec<CategoryRelations>, DataError>;

    /// Short label for logs and snapshots.
    fn describe(&self) -> String;
}

pub struct HttpSource {
    client: Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DataError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("pokebracket/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, DataError> {
        Self::new(
            &config.api_base_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, DataError> {
        tracing::debug!(url, "GET");
        let response = self.client.get(url).send()?.error_for_status()?;
        Ok(response.json()?)
    }
}

impl PokemonSource for HttpSource {
    fn pokemon_count(&self) -> Result<u32, DataError> {
        let list: PokemonListPayload = self.get_json(&self.url("pokemon"))?;
        Ok(list.count)
    }

    fn fetch_pokemon(&self, number: u32) -> Result<Option<Contestant>, DataError> {
        let url = self.url(&format!("pokemon/{number}"));
        tracing::debug!(url = %url, "GET");
        let response = self.client.get(&url).send()?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let payload: PokemonPayload = response.error_for_status()?.json()?;
        Ok(Some(payload.into_contestant()))
    }

    fn category_relations(&self) -> Result<Vec<CategoryRelations>, DataError> {
        let index: TypeListPayload = self.get_json(&self.url("type"))?;
        let mut relations = Vec::with_capacity(index.results.len());
        for entry in index.results {
            let Some(url) = entry.url.as_deref() else {
                tracing::warn!(category = %entry.name, "type entry has no url, skipping");
                continue;
            };
            match self.get_json::<TypeDetailsPayload>(url) {
                Ok(details) => relations.push(details.into_relations(&entry.name)),
                Err(err) => {
                    tracing::warn!(category = %entry.name, error = %err, "failed to load type relations, skipping");
                }
            }
        }
        Ok(relations)
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

/// Offline catalog backed by a [`PoolSnapshot`]. Draw number `n` is the
/// `n`-th contestant of the snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    label: String,
    snapshot: PoolSnapshot,
}

impl SnapshotSource {
    pub fn new(label: impl Into<String>, snapshot: PoolSnapshot) -> Self {
        Self {
            label: label.into(),
            snapshot,
        }
    }

    pub fn load(path: &str) -> Result<Self, DataError> {
        Ok(Self::new(path, PoolSnapshot::load(path)?))
    }
}

impl PokemonSource for SnapshotSource {
    fn pokemon_count(&self) -> Result<u32, DataError> {
        u32::try_from(self.snapshot.contestants.len()).map_err(|_| DataError::Payload {
            url: self.label.clone(),
            reason: "snapshot holds more contestants than can be drawn".to_string(),
        })
    }

    fn fetch_pokemon(&self, number: u32) -> Result<Option<Contestant>, DataError> {
        let index = (number as usize).checked_sub(1);
        Ok(index.and_then(|i| self.snapshot.contestants.get(i)).cloned())
    }

    fn category_relations(&self) -> Result<Vec<CategoryRelations>, DataError> {
        Ok(self.snapshot.categories.clone())
    }

    fn describe(&self) -> String {
        format!("snapshot:{}", self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tournament::BaseStat;

    fn snapshot() -> PoolSnapshot {
        PoolSnapshot {
            fetched_at: "2024-01-01T00:00:00+00:00".to_string(),
            source: "test".to_string(),
            contestants: vec![
                Contestant::new(25, "pikachu", ["electric"], [BaseStat::new("hp", 35)]),
                Contestant::new(133, "eevee", ["normal"], [BaseStat::new("hp", 55)]),
            ],
            categories: vec![CategoryRelations::new("electric", &["water", "flying"])],
        }
    }

    #[test]
    fn snapshot_source_draws_by_position() {
        let source = SnapshotSource::new("mem", snapshot());
        assert_eq!(source.pokemon_count().expect("count"), 2);
        assert_eq!(source.fetch_pokemon(2).expect("fetch").map(|c| c.id), Some(133));
        assert!(source.fetch_pokemon(0).expect("fetch").is_none());
        assert!(source.fetch_pokemon(3).expect("fetch").is_none());
        assert_eq!(source.category_relations().expect("relations").len(), 1);
        assert_eq!(source.describe(), "snapshot:mem");
    }

    #[test]
    fn http_source_joins_urls_without_double_slashes() {
        let source = HttpSource::new("https://pokeapi.co/api/v2/", Duration::from_secs(1))
            .expect("client builds");
        assert_eq!(source.url("pokemon/25"), "https://pokeapi.co/api/v2/pokemon/25");
        assert_eq!(source.url("/type"), "https://pokeapi.co/api/v2/type");
    }
}
