//! Single battle resolution: raw strength scaled by type advantage, random
//! pick on an exact tie.

use serde::Serialize;

use crate::tournament::advantage::{multiplier, TypeAdvantageTable};
use crate::tournament::contestant::{strength, Contestant};
use crate::tournament::rng::TieBreaker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    First,
    Second,
}

/// Everything computed while resolving one pairing.
#[derive(Debug, Clone, Serialize)]
pub struct Battle {
    pub first: Contestant,
    pub second: Contestant,
    pub first_strength: i64,
    pub second_strength: i64,
    pub first_multiplier: f64,
    pub second_multiplier: f64,
    /// Strength times own multiplier; the scores that were compared.
    pub first_adjusted: f64,
    pub second_adjusted: f64,
    #[serde(rename = "winner")]
    pub winner_side: Side,
    /// True when adjusted scores were equal and the tie-breaker decided.
    pub tie_break: bool,
}

impl Battle {
    pub fn winner(&self) -> &Contestant {
        match self.winner_side {
            Side::First => &self.first,
            Side::Second => &self.second,
        }
    }

    pub fn loser(&self) -> &Contestant {
        match self.winner_side {
            Side::First => &self.second,
            Side::Second => &self.first,
        }
    }
}

struct Scores {
    strength: (i64, i64),
    multiplier: (f64, f64),
}

impl Scores {
    fn compute(a: &Contestant, b: &Contestant, table: &TypeAdvantageTable) -> Self {
        Self {
            strength: (strength(a), strength(b)),
            multiplier: (multiplier(a, b, table), multiplier(b, a, table)),
        }
    }

    fn adjusted(&self) -> (f64, f64) {
        (
            self.strength.0 as f64 * self.multiplier.0,
            self.strength.1 as f64 * self.multiplier.1,
        )
    }

    /// Winning side and whether a tie-break was needed.
    fn decide(&self, tie_breaker: &mut dyn TieBreaker) -> (Side, bool) {
        let (adjusted_a, adjusted_b) = self.adjusted();
        if adjusted_a > adjusted_b {
            (Side::First, false)
        } else if adjusted_b > adjusted_a {
            (Side::Second, false)
        } else if tie_breaker.pick_first() {
            (Side::First, true)
        } else {
            (Side::Second, true)
        }
    }
}

/// Winner of `a` vs `b`. Always one of the two inputs.
pub fn resolve<'a>(
    a: &'a Contestant,
    b: &'a Contestant,
    table: &TypeAdvantageTable,
    tie_breaker: &mut dyn TieBreaker,
) -> &'a Contestant {
    match Scores::compute(a, b, table).decide(tie_breaker).0 {
        Side::First => a,
        Side::Second => b,
    }
}

/// Resolve `a` vs `b` and keep the full record. Logs a battle summary.
pub fn resolve_battle(
    a: &Contestant,
    b: &Contestant,
    table: &TypeAdvantageTable,
    tie_breaker: &mut dyn TieBreaker,
) -> Battle {
    let scores = Scores::compute(a, b, table);
    let (winner_side, tie_break) = scores.decide(tie_breaker);
    let (first_adjusted, second_adjusted) = scores.adjusted();
    let battle = Battle {
        first: a.clone(),
        second: b.clone(),
        first_strength: scores.strength.0,
        second_strength: scores.strength.1,
        first_multiplier: scores.multiplier.0,
        second_multiplier: scores.multiplier.1,
        first_adjusted,
        second_adjusted,
        winner_side,
        tie_break,
    };

    tracing::debug!(
        first = %battle.first.name,
        first_strength = battle.first_strength,
        first_adjusted = battle.first_adjusted,
        second = %battle.second.name,
        second_strength = battle.second_strength,
        second_adjusted = battle.second_adjusted,
        winner = %battle.winner().name,
        tie_break,
        "battle resolved"
    );

    battle
}
