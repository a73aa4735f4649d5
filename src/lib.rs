pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod parallel;
pub mod server;
pub mod tournament;

pub use error::{AppError, Result};
