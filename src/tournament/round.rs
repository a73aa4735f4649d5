//! One bracket round: adjacent pairs fight, winners advance in pair order.

use serde::Serialize;

use crate::error::TournamentError;
use crate::tournament::advantage::TypeAdvantageTable;
use crate::tournament::battle::{resolve_battle, Battle};
use crate::tournament::contestant::Contestant;
use crate::tournament::rng::TieBreaker;

#[derive(Debug, Clone, Serialize)]
pub struct Round {
    /// 0-based position in the bracket.
    pub index: usize,
    pub battles: Vec<Battle>,
}

impl Round {
    /// 1-based label for display.
    pub fn number(&self) -> usize {
        self.index + 1
    }

    pub fn contestant_count(&self) -> usize {
        self.battles.len() * 2
    }

    pub fn winners(&self) -> impl Iterator<Item = &Contestant> {
        self.battles.iter().map(Battle::winner)
    }
}

/// Play round `index` over `contestants`, pairing (0,1), (2,3), ...
///
/// Returns the round record and the survivors, where survivor `i` is the
/// winner of pair `(2i, 2i + 1)`.
pub fn reduce(
    index: usize,
    contestants: &[Contestant],
    table: &TypeAdvantageTable,
    tie_breaker: &mut dyn TieBreaker,
) -> Result<(Round, Vec<Contestant>), TournamentError> {
    if contestants.is_empty() {
        return Err(TournamentError::EmptyPool);
    }
    if contestants.len() % 2 != 0 {
        return Err(TournamentError::OddContestantCount(contestants.len()));
    }

    tracing::debug!(round = index + 1, contestants = contestants.len(), "round started");

    let battles: Vec<Battle> = contestants
        .chunks_exact(2)
        .map(|pair| resolve_battle(&pair[0], &pair[1], table, &mut *tie_breaker))
        .collect();
    let survivors = battles.iter().map(|b| b.winner().clone()).collect();

    Ok((Round { index, battles }, survivors))
}
