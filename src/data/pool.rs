//! Random contestant pool drawing and JSON pool snapshots.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::source::PokemonSource;
use crate::data::types::fetch_category_table_source;
use crate::error::DataError;
use crate::tournament::{CategoryRelations, Contestant, Rng};

/// Draw `size` unique Pokémon from `source`.
///
/// Draw numbers are uniform over `1..=count`. Missing numbers and failed
/// fetches are skipped and redrawn; duplicates are detected by id. Gives up
/// with [`DataError::PoolExhausted`] after `max_attempts` draws.
pub fn fetch_contestant_pool(
    source: &dyn PokemonSource,
    size: usize,
    max_attempts: usize,
    rng: &mut Rng,
) -> Result<Vec<Contestant>, DataError> {
    let pool = draw_pool(source, size, max_attempts, rng)?;
    tracing::info!(size, source = %source.describe(), "contestant pool ready");
    Ok(pool)
}

/// [`fetch_contestant_pool`] without the milestone log, for bulk callers
/// that draw thousands of pools.
pub(crate) fn draw_pool(
    source: &dyn PokemonSource,
    size: usize,
    max_attempts: usize,
    rng: &mut Rng,
) -> Result<Vec<Contestant>, DataError> {
    let count = source.pokemon_count()?;
    if count == 0 {
        return Err(DataError::EmptyCatalog);
    }

    let mut pool = Vec::with_capacity(size);
    let mut seen = HashSet::with_capacity(size);
    let mut attempts = 0;

    while pool.len() < size {
        if attempts >= max_attempts {
            return Err(DataError::PoolExhausted {
                wanted: size,
                found: pool.len(),
                attempts,
            });
        }
        attempts += 1;

        let number = rng.range_inclusive(1, count);
        match source.fetch_pokemon(number) {
            Ok(Some(contestant)) => {
                if seen.insert(contestant.id) {
                    tracing::debug!(id = contestant.id, name = %contestant.name, "drawn");
                    pool.push(contestant);
                }
            }
            Ok(None) => tracing::warn!(number, "no pokemon with this id"),
            Err(err) => tracing::warn!(number, error = %err, "failed to fetch pokemon, drawing again"),
        }
    }

    tracing::debug!(size, attempts, "pool drawn");
    Ok(pool)
}

/// Fetched pool plus the type data it was fetched with, saved as JSON so a
/// bracket can be rerun offline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSnapshot {
    /// RFC 3339 timestamp.
    pub fetched_at: String,
    pub source: String,
    pub contestants: Vec<Contestant>,
    #[serde(default)]
    pub categories: Vec<CategoryRelations>,
}

impl PoolSnapshot {
    pub fn capture(
        source: &dyn PokemonSource,
        size: usize,
        max_attempts: usize,
        rng: &mut Rng,
    ) -> Result<Self, DataError> {
        let categories = fetch_category_table_source(source);
        let contestants = fetch_contestant_pool(source, size, max_attempts, rng)?;
        Ok(Self {
            fetched_at: chrono::Utc::now().to_rfc3339(),
            source: source.describe(),
            contestants,
            categories,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DataError> {
        let payload = serde_json::to_string_pretty(self)?;
        fs::write(path, payload)?;
        Ok(())
    }
}
