use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::data::fetch_contestant_pool;
use crate::error::{DataError, TournamentError};
use crate::server::AppState;
use crate::tournament::{run_tournament, Contestant, Round};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request body: {0}")]
    BadRequest(#[source] serde_json::Error),

    #[error("unknown session {0}")]
    UnknownSession(Uuid),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Tournament(#[from] TournamentError),

    #[error("failed to serialize response: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TournamentRequest {
    #[serde(default)]
    pub session: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContestantsResponse {
    pub status: &'static str,
    pub session: Uuid,
    pub contestants: Vec<Contestant>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TournamentResponse {
    pub status: &'static str,
    /// Session the pool came from; absent when the pool was drawn for this request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<Uuid>,
    pub pool_size: usize,
    pub rounds: Vec<Round>,
    pub champion: Contestant,
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value).map_err(ApiError::Serialize)
}

pub fn health_payload(state: &AppState) -> Result<String, ApiError> {
    to_json(&serde_json::json!({
        "status": "ok",
        "service": "pokebracket-api",
        "version": env!("CARGO_PKG_VERSION"),
        "source": state.source.describe(),
        "pool_size": state.config.pool_size,
        "categories": state.table.len(),
        "open_sessions": state.sessions.len(),
    }))
}

fn draw_pool(state: &AppState) -> Result<Vec<Contestant>, ApiError> {
    let mut rng = state.rng();
    let pool = fetch_contestant_pool(
        state.source.as_ref(),
        state.config.pool_size,
        state.config.max_fetch_attempts,
        &mut *rng,
    )?;
    Ok(pool)
}

/// Draw a pool and park it in the session store until it is played.
pub fn contestants_payload(state: &AppState) -> Result<String, ApiError> {
    let contestants = draw_pool(state)?;
    let session = state.sessions.insert(contestants.clone());
    tracing::info!(%session, size = contestants.len(), "session opened");
    to_json(&ContestantsResponse {
        status: "ok",
        session,
        contestants,
    })
}

/// Play the session named in `body`, or a freshly drawn pool when the body
/// is empty or names no session.
pub fn tournament_payload(body: &str, state: &AppState) -> Result<String, ApiError> {
    let request: TournamentRequest = if body.trim().is_empty() {
        TournamentRequest::default()
    } else {
        serde_json::from_str(body).map_err(ApiError::BadRequest)?
    };

    let pool = match request.session {
        Some(id) => state.sessions.take(&id).ok_or(ApiError::UnknownSession(id))?,
        None => draw_pool(state)?,
    };

    let result = {
        let mut rng = state.rng();
        run_tournament(pool, &state.table, &mut *rng)?
    };
    tracing::debug!(session = ?request.session, "tournament played");

    to_json(&TournamentResponse {
        status: "ok",
        session: request.session,
        pool_size: result.pool_size(),
        rounds: result.rounds,
        champion: result.champion,
    })
}
