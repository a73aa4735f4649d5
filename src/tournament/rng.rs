//! Randomness used by the bracket. Only exact ties consume random values.
//!
//! [`Rng`] is a SplitMix64 generator: fast, deterministic for a given seed,
//! not cryptographically secure. [`TieBreaker`] is the capability handed to
//! the battle resolver so tests can swap in a scripted source.

const SPLITMIX64_GOLDEN: u64 = 0x9e3779b97f4a7c15;
const SPLITMIX64_M1: u64 = 0xbf58476d1ce4e5b9;
const SPLITMIX64_M2: u64 = 0x94d049bb133111eb;

/// Chooses the winner of a battle whose adjusted scores are exactly equal.
pub trait TieBreaker {
    /// Returns `true` to pick the first contestant, `false` for the second.
    /// Implementations should pick each side with equal probability.
    fn pick_first(&mut self) -> bool;
}

#[derive(Debug, Clone, Copy)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Seed from the operating system. Falls back to the clock if the OS
    /// source is unavailable.
    pub fn from_entropy() -> Self {
        let mut buf = [0_u8; 8];
        match getrandom::getrandom(&mut buf) {
            Ok(()) => Self::new(u64::from_le_bytes(buf)),
            Err(err) => {
                tracing::warn!(error = %err, "os entropy unavailable, seeding from clock");
                let nanos = std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .map(|d| d.as_nanos() as u64)
                    .unwrap_or(0);
                Self::new(nanos)
            }
        }
    }

    /// Seeded when `seed` is given, entropy otherwise.
    pub fn from_seed_or_entropy(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::new)
    }

    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(SPLITMIX64_GOLDEN);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(SPLITMIX64_M1);
        z = (z ^ (z >> 27)).wrapping_mul(SPLITMIX64_M2);
        z ^ (z >> 31)
    }

    /// Uniform value in `low..=high` (Lemire's widening multiply; bias is
    /// negligible for the ranges used here). Returns `low` when `high < low`.
    pub fn range_inclusive(&mut self, low: u32, high: u32) -> u32 {
        if high <= low {
            return low;
        }
        let span = u64::from(high - low) + 1;
        let scaled = (u128::from(self.next_u64()) * u128::from(span)) >> 64;
        low + scaled as u32
    }
}

impl TieBreaker for Rng {
    fn pick_first(&mut self) -> bool {
        self.next_u64() >> 63 == 0
    }
}

/// Scripted tie-breaker: replays `picks` in order and cycles when exhausted.
/// Counts how many ties it was asked to break.
#[derive(Debug, Clone)]
pub struct FixedTieBreaker {
    picks: Vec<bool>,
    cursor: usize,
    pub calls: usize,
}

impl FixedTieBreaker {
    pub fn new(picks: Vec<bool>) -> Self {
        Self {
            picks,
            cursor: 0,
            calls: 0,
        }
    }

    pub fn always_first() -> Self {
        Self::new(vec![true])
    }

    pub fn always_second() -> Self {
        Self::new(vec![false])
    }
}

impl TieBreaker for FixedTieBreaker {
    fn pick_first(&mut self) -> bool {
        self.calls += 1;
        if self.picks.is_empty() {
            return true;
        }
        let pick = self.picks[self.cursor % self.picks.len()];
        self.cursor += 1;
        pick
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splitmix64_deterministic() {
        let mut a = Rng::new(7);
        let mut b = Rng::new(7);
        for _ in 0..100 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn splitmix64_different_seeds_differ() {
        let mut a = Rng::new(1);
        let mut b = Rng::new(2);
        assert_ne!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn range_inclusive_stays_in_bounds() {
        let mut rng = Rng::new(42);
        for _ in 0..10_000 {
            let v = rng.range_inclusive(1, 1025);
            assert!((1..=1025).contains(&v));
        }
        assert_eq!(rng.range_inclusive(5, 5), 5);
        assert_eq!(rng.range_inclusive(9, 3), 9);
    }

    #[test]
    fn tie_picks_are_roughly_balanced() {
        let mut rng = Rng::new(2024);
        let firsts = (0..10_000).filter(|_| rng.pick_first()).count();
        assert!((4_500..=5_500).contains(&firsts), "firsts = {firsts}");
    }

    #[test]
    fn fixed_tie_breaker_cycles_and_counts() {
        let mut fixed = FixedTieBreaker::new(vec![true, false]);
        assert!(fixed.pick_first());
        assert!(!fixed.pick_first());
        assert!(fixed.pick_first());
        assert_eq!(fixed.calls, 3);
    }
}
