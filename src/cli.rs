use crate::config::AppConfig;
use crate::data::{fetch_contestant_pool, load_advantage_table, HttpSource, PokemonSource, PoolSnapshot, SnapshotSource};
use crate::error::AppError;
use crate::parallel::{run_bracket_odds, OddsConfig, WorkerPool};
use crate::server::{self, AppState};
use crate::tournament::{render, run_tournament, ExportFormat, Rng, TypeAdvantageTable};

const USAGE: &str = "usage: pokebracket <run|fetch|odds|serve>";
const DEFAULT_ODDS_RUNS: usize = 1_000;
const DEFAULT_ODDS_SEED: u64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Run,
    Fetch,
    Odds,
    Serve,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("run") => Some(Command::Run),
        Some("fetch") => Some(Command::Fetch),
        Some("odds") => Some(Command::Odds),
        Some("serve") => Some(Command::Serve),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Run) => handle_run(args),
        Some(Command::Fetch) => handle_fetch(args),
        Some(Command::Odds) => handle_odds(args),
        Some(Command::Serve) => handle_serve(args),
        None => {
            eprintln!("{USAGE}");
            2
        }
    }
}

fn report(result: Result<(), AppError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {err}");
            1
        }
    }
}

fn handle_run(args: &[String]) -> i32 {
    let format = match flag_value(args, "--format").map(str::parse::<ExportFormat>) {
        None => ExportFormat::Text,
        Some(Ok(format)) => format,
        Some(Err(err)) => {
            eprintln!("{err}");
            eprintln!("usage: pokebracket run [--snapshot PATH] [--seed N] [--format text|json|csv]");
            return 2;
        }
    };
    let seed = parse_seed(args);
    let snapshot = flag_value(args, "--snapshot");

    report(run_bracket(snapshot, seed, format))
}

fn run_bracket(snapshot: Option<&str>, seed: Option<u64>, format: ExportFormat) -> Result<(), AppError> {
    let mut rng = Rng::from_seed_or_entropy(seed);
    let (pool, table) = match snapshot {
        Some(path) => {
            let snapshot = PoolSnapshot::load(path)?;
            let table = TypeAdvantageTable::build(&snapshot.categories);
            (snapshot.contestants, table)
        }
        None => {
            let config = AppConfig::load()?;
            let source = HttpSource::from_config(&config)?;
            let table = load_advantage_table(&source);
            let pool = fetch_contestant_pool(
                &source,
                config.pool_size,
                config.max_fetch_attempts,
                &mut rng,
            )?;
            (pool, table)
        }
    };
    tracing::info!(contestants = pool.len(), categories = table.len(), "starting tournament");

    let result = run_tournament(pool, &table, &mut rng)?;
    println!("{}", render(&result, format)?);
    Ok(())
}

fn handle_fetch(args: &[String]) -> i32 {
    let Some(path) = args.get(2).filter(|arg| !arg.starts_with("--")) else {
        eprintln!("usage: pokebracket fetch <out.json> [--seed N]");
        return 2;
    };
    let seed = parse_seed(args);

    report(fetch_snapshot(path, seed))
}

fn fetch_snapshot(path: &str, seed: Option<u64>) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let source = HttpSource::from_config(&config)?;
    let mut rng = Rng::from_seed_or_entropy(seed);
    let snapshot = PoolSnapshot::capture(&source, config.pool_size, config.max_fetch_attempts, &mut rng)?;
    snapshot.save(path)?;
    println!(
        "snapshot saved: contestants={}, categories={}, path='{}'",
        snapshot.contestants.len(),
        snapshot.categories.len(),
        path
    );
    Ok(())
}

fn handle_odds(args: &[String]) -> i32 {
    let Some(path) = args.get(2) else {
        eprintln!("usage: pokebracket odds <snapshot.json> [runs] [seed]");
        return 2;
    };
    let runs = parse_usize_arg(args.get(3), "runs", DEFAULT_ODDS_RUNS);
    let seed = parse_u64_arg(args.get(4), "seed", DEFAULT_ODDS_SEED);

    report(print_odds(path, runs, seed))
}

fn print_odds(path: &str, runs: usize, seed: u64) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let source = SnapshotSource::load(path)?;
    let table = load_advantage_table(&source);
    let odds = run_bracket_odds(
        &source,
        &table,
        OddsConfig {
            pool_size: config.pool_size,
            runs,
            seed,
            max_fetch_attempts: config.max_fetch_attempts,
        },
        &WorkerPool::default(),
    )?;
    let payload = serde_json::to_string_pretty(&odds).map_err(|err| AppError::Export(err.to_string()))?;
    println!("{payload}");
    Ok(())
}

fn handle_serve(args: &[String]) -> i32 {
    report(serve(flag_value(args, "--snapshot"), parse_seed(args)))
}

fn serve(snapshot: Option<&str>, seed: Option<u64>) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let source: Box<dyn PokemonSource> = match snapshot {
        Some(path) => Box::new(SnapshotSource::load(path)?),
        None => Box::new(HttpSource::from_config(&config)?),
    };
    let state = AppState::load(config, source, seed);
    server::run_server(&state)?;
    Ok(())
}

/// Value following `flag`, e.g. `--seed 42`.
fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn parse_seed(args: &[String]) -> Option<u64> {
    let raw = flag_value(args, "--seed")?;
    match raw.parse::<u64>() {
        Ok(seed) => Some(seed),
        Err(_) => {
            eprintln!("invalid seed '{raw}', using a random seed");
            None
        }
    }
}

fn parse_usize_arg(raw: Option<&String>, name: &str, default: usize) -> usize {
    raw.and_then(|value| value.parse::<usize>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}

fn parse_u64_arg(raw: Option<&String>, name: &str, default: u64) -> u64 {
    raw.and_then(|value| value.parse::<u64>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}
