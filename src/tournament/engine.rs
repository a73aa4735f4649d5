//! Bracket driver: reduces the pool round by round until one champion remains.

use serde::Serialize;

use crate::error::TournamentError;
use crate::tournament::advantage::TypeAdvantageTable;
use crate::tournament::contestant::Contestant;
use crate::tournament::rng::TieBreaker;
use crate::tournament::round::{reduce, Round};

/// Smallest pool that forms a bracket.
pub const MIN_POOL_SIZE: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    Running,
    Complete,
}

#[derive(Debug, Clone, Serialize)]
pub struct TournamentResult {
    pub rounds: Vec<Round>,
    pub champion: Contestant,
}

impl TournamentResult {
    pub fn pool_size(&self) -> usize {
        self.rounds.first().map_or(1, Round::contestant_count)
    }

    /// Round by 1-based number, as shown to users.
    pub fn round_by_number(&self, number: usize) -> Option<&Round> {
        number.checked_sub(1).and_then(|index| self.rounds.get(index))
    }
}

/// Pool sizes must be a power of two and at least [`MIN_POOL_SIZE`].
pub fn validate_pool_size(size: usize) -> Result<(), TournamentError> {
    match size {
        0 => Err(TournamentError::EmptyPool),
        n if n < MIN_POOL_SIZE || !n.is_power_of_two() => Err(TournamentError::InvalidPoolSize(n)),
        _ => Ok(()),
    }
}

/// Owns the current contestant list and the round history.
#[derive(Debug)]
pub struct TournamentEngine<'t> {
    table: &'t TypeAdvantageTable,
    current: Vec<Contestant>,
    rounds: Vec<Round>,
}

impl<'t> TournamentEngine<'t> {
    /// Fails before any round is played when the pool is not a valid bracket.
    pub fn new(pool: Vec<Contestant>, table: &'t TypeAdvantageTable) -> Result<Self, TournamentError> {
        validate_pool_size(pool.len())?;
        Ok(Self {
            table,
            current: pool,
            rounds: Vec::new(),
        })
    }

    pub fn state(&self) -> EngineState {
        if self.current.len() > 1 {
            EngineState::Running
        } else {
            EngineState::Complete
        }
    }

    pub fn remaining(&self) -> &[Contestant] {
        &self.current
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    /// Play the next round and return it.
    pub fn step(&mut self, tie_breaker: &mut dyn TieBreaker) -> Result<&Round, TournamentError> {
        if self.state() == EngineState::Complete {
            return Err(TournamentError::AlreadyComplete);
        }
        let (round, survivors) = reduce(self.rounds.len(), &self.current, self.table, tie_breaker)?;
        self.current = survivors;
        self.rounds.push(round);
        Ok(&self.rounds[self.rounds.len() - 1])
    }

    /// Play every remaining round.
    pub fn run(mut self, tie_breaker: &mut dyn TieBreaker) -> Result<TournamentResult, TournamentError> {
        while self.state() == EngineState::Running {
            self.step(tie_breaker)?;
        }
        self.finish()
    }

    fn finish(mut self) -> Result<TournamentResult, TournamentError> {
        let champion = self.current.pop().ok_or(TournamentError::EmptyPool)?;
        tracing::debug!(champion = %champion.name, rounds = self.rounds.len(), "tournament complete");
        Ok(TournamentResult {
            rounds: self.rounds,
            champion,
        })
    }
}

/// Run a whole bracket in one call and log the champion.
pub fn run_tournament(
    pool: Vec<Contestant>,
    table: &TypeAdvantageTable,
    tie_breaker: &mut dyn TieBreaker,
) -> Result<TournamentResult, TournamentError> {
    let result = TournamentEngine::new(pool, table)?.run(tie_breaker)?;
    tracing::info!(champion = %result.champion.name, rounds = result.rounds.len(), "champion crowned");
    Ok(result)
}
