pub mod advantage;
pub mod battle;
pub mod contestant;
pub mod engine;
pub mod export;
pub mod rng;
pub mod round;

pub use advantage::{multiplier, CategoryRelations, TypeAdvantageTable, ADVANTAGE_FACTOR};
pub use battle::{resolve, resolve_battle, Battle, Side};
pub use contestant::{strength, BaseStat, Contestant};
pub use engine::{
    run_tournament, validate_pool_size, EngineState, TournamentEngine, TournamentResult,
    MIN_POOL_SIZE,
};
pub use export::{render, render_csv, render_text, ExportFormat};
pub use rng::{FixedTieBreaker, Rng, TieBreaker};
pub use round::{reduce, Round};
