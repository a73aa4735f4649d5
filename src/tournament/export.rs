//! Render a finished bracket as plain text, JSON or CSV.

use std::fmt::Write as _;
use std::str::FromStr;

use serde::Serialize;

use crate::error::AppError;
use crate::tournament::engine::TournamentResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Text,
    Json,
    Csv,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(format!("unknown format '{other}' (expected text, json or csv)")),
        }
    }
}

/// One CSV line per battle.
#[derive(Debug, Serialize)]
struct BattleRow<'a> {
    round: usize,
    first: &'a str,
    first_strength: i64,
    first_multiplier: f64,
    first_adjusted: f64,
    second: &'a str,
    second_strength: i64,
    second_multiplier: f64,
    second_adjusted: f64,
    winner: &'a str,
    tie_break: bool,
}

pub fn render(result: &TournamentResult, format: ExportFormat) -> Result<String, AppError> {
    match format {
        ExportFormat::Text => Ok(render_text(result)),
        ExportFormat::Json => {
            serde_json::to_string_pretty(result).map_err(|err| AppError::Export(err.to_string()))
        }
        ExportFormat::Csv => render_csv(result),
    }
}

pub fn render_text(result: &TournamentResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "The {} contestants are:", result.pool_size());
    if let Some(first_round) = result.rounds.first() {
        let entrants = first_round
            .battles
            .iter()
            .flat_map(|battle| [&battle.first, &battle.second]);
        for (i, contestant) in entrants.enumerate() {
            let _ = writeln!(out, "{}. {}", i + 1, contestant.name);
        }
    }

    for round in &result.rounds {
        let _ = writeln!(out, "\n--- Round {} ---\n", round.number());
        for battle in &round.battles {
            let _ = writeln!(out, "Battle between {} and {}:", battle.first.name, battle.second.name);
            let _ = writeln!(
                out,
                " - {}: total strength = {} (after type advantage: {})",
                battle.first.name,
                battle.first_strength,
                battle.first_adjusted
            );
            let _ = writeln!(
                out,
                " - {}: total strength = {} (after type advantage: {})",
                battle.second.name,
                battle.second_strength,
                battle.second_adjusted
            );
            if battle.tie_break {
                let _ = writeln!(out, " --> Perfect tie, random winner: {}\n", battle.winner().name);
            } else {
                let _ = writeln!(out, " --> Winner: {}\n", battle.winner().name);
            }
        }
    }

    let _ = writeln!(out, "\nThe champion is:\n{}", result.champion.name);
    out
}

pub fn render_csv(result: &TournamentResult) -> Result<String, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for round in &result.rounds {
        for battle in &round.battles {
            writer
                .serialize(BattleRow {
                    round: round.number(),
                    first: &battle.first.name,
                    first_strength: battle.first_strength,
                    first_multiplier: battle.first_multiplier,
                    first_adjusted: battle.first_adjusted,
                    second: &battle.second.name,
                    second_strength: battle.second_strength,
                    second_multiplier: battle.second_multiplier,
                    second_adjusted: battle.second_adjusted,
                    winner: &battle.winner().name,
                    tie_break: battle.tie_break,
                })
                .map_err(|err| AppError::Export(err.to_string()))?;
        }
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| AppError::Export(err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| AppError::Export(err.to_string()))
}
