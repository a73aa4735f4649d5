use thiserror::Error;

/// Bracket preconditions. All of these are configuration mistakes and are
/// reported before any round is played.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TournamentError {
    #[error("contestant pool is empty")]
    EmptyPool,

    #[error("contestant pool size must be a power of two and at least 2, got {0}")]
    InvalidPoolSize(usize),

    #[error("a round needs an even number of contestants, got {0}")]
    OddContestantCount(usize),

    #[error("tournament already has a champion")]
    AlreadyComplete,
}

/// Failures of the contestant / category data layer.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("upstream reports no pokemon to draw from")]
    EmptyCatalog,

    #[error("pool exhausted: found {found} of {wanted} unique pokemon after {attempts} attempts")]
    PoolExhausted {
        wanted: usize,
        found: usize,
        attempts: usize,
    },

    #[error("unexpected payload from {url}: {reason}")]
    Payload { url: String, reason: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error(transparent)]
    PoolSize(#[from] TournamentError),
}

/// Umbrella error for the CLI and the HTTP layer.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Tournament(#[from] TournamentError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("export error: {0}")]
    Export(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
