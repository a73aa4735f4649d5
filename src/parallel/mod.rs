pub mod odds;
pub mod pool;

pub use odds::{run_bracket_odds, BracketOdds, ChampionOdds, OddsConfig};
pub use pool::WorkerPool;
