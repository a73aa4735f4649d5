pub mod pokeapi;
pub mod pool;
pub mod source;
pub mod types;

pub use pool::{fetch_contestant_pool, PoolSnapshot};
pub use source::{HttpSource, PokemonSource, SnapshotSource};
pub use types::{fetch_category_table_source, load_advantage_table};
