//! Champion frequencies over many independently drawn brackets.
//!
//! Each run draws its own pool from the catalog and plays it out with a
//! generator seeded from `seed + run`, so a fixed seed reproduces the table.

use std::collections::HashMap;

use rayon::prelude::*;
use serde::Serialize;

use crate::data::pool::draw_pool;
use crate::data::PokemonSource;
use crate::error::AppError;
use crate::parallel::pool::WorkerPool;
use crate::tournament::{validate_pool_size, Rng, TournamentEngine, TypeAdvantageTable};

#[derive(Debug, Clone, Serialize)]
pub struct OddsConfig {
    pub pool_size: usize,
    pub runs: usize,
    pub seed: u64,
    pub max_fetch_attempts: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChampionOdds {
    pub id: u32,
    pub name: String,
    /// Runs this Pokémon was drawn into.
    pub appearances: usize,
    pub titles: usize,
    /// `titles / appearances`.
    pub title_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BracketOdds {
    pub config: OddsConfig,
    /// Sorted by titles, then title rate, then id.
    pub champions: Vec<ChampionOdds>,
}

#[derive(Debug, Default)]
struct Tally {
    names: HashMap<u32, String>,
    appearances: HashMap<u32, usize>,
    titles: HashMap<u32, usize>,
}

impl Tally {
    fn merge(mut self, other: Tally) -> Tally {
        self.names.extend(other.names);
        for (id, n) in other.appearances {
            *self.appearances.entry(id).or_default() += n;
        }
        for (id, n) in other.titles {
            *self.titles.entry(id).or_default() += n;
        }
        self
    }

    /// Draw and play run number `run`, seeded from `config.seed + run`.
    /// Uses the quiet pool draw and engine so thousands of runs do not flood
    /// the info log.
    fn record_run(
        &mut self,
        source: &dyn PokemonSource,
        table: &TypeAdvantageTable,
        config: &OddsConfig,
        run: usize,
    ) -> Result<(), AppError> {
        let mut rng = Rng::new(config.seed.wrapping_add(run as u64));
        let pool = draw_pool(source, config.pool_size, config.max_fetch_attempts, &mut rng)?;
        for contestant in &pool {
            *self.appearances.entry(contestant.id).or_default() += 1;
            self.names
                .entry(contestant.id)
                .or_insert_with(|| contestant.name.clone());
        }
        let result = TournamentEngine::new(pool, table)?.run(&mut rng)?;
        *self.titles.entry(result.champion.id).or_default() += 1;
        Ok(())
    }

    fn into_odds(self, config: OddsConfig) -> BracketOdds {
        let mut champions: Vec<ChampionOdds> = self
            .titles
            .iter()
            .map(|(&id, &titles)| {
                let appearances = self.appearances.get(&id).copied().unwrap_or(titles).max(1);
                ChampionOdds {
                    id,
                    name: self.names.get(&id).cloned().unwrap_or_default(),
                    appearances,
                    titles,
                    title_rate: titles as f64 / appearances as f64,
                }
            })
            .collect();
        champions.sort_by(|a, b| {
            b.titles
                .cmp(&a.titles)
                .then(b.title_rate.total_cmp(&a.title_rate))
                .then(a.id.cmp(&b.id))
        });
        BracketOdds { config, champions }
    }
}

/// Play `config.runs` brackets in parallel and count champions.
pub fn run_bracket_odds(
    source: &dyn PokemonSource,
    table: &TypeAdvantageTable,
    config: OddsConfig,
    workers: &WorkerPool,
) -> Result<BracketOdds, AppError> {
    validate_pool_size(config.pool_size)?;

    let tally = workers.install(|| {
        (0..config.runs)
            .into_par_iter()
            .try_fold(Tally::default, |mut tally, run| -> Result<Tally, AppError> {
                tally.record_run(source, table, &config, run)?;
                Ok(tally)
            })
            .try_reduce(Tally::default, |a, b| Ok(a.merge(b)))
    })?;

    tracing::info!(runs = config.runs, champions = tally.titles.len(), "bracket odds computed");
    Ok(tally.into_odds(config))
}
