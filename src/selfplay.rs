//! Self-play game generation.
//!
//! Plays full games on the classic map with the heuristic bot in every
//! seat. Records the snapshot at the start of each turn together with what
//! the bot did, and writes finished games as JSONL.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::info;

use crate::board::{classic, TerritoryGraph};
use crate::bot::{play_turn, BotAction, BotConfig, DEFAULT_ATTACK_THRESHOLD};
use crate::combat::OddsTable;
use crate::error::EngineError;
use crate::protocol::{encode_snapshot, Snapshot};
use crate::resolve::Rules;
use crate::setup::{deal, SetupError, DEFAULT_INITIAL_TROOPS};

/// Errors that stop a self-play run.
#[derive(Debug, thiserror::Error)]
pub enum SelfPlayError {
    #[error("{0}")]
    Usage(String),

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("self-play worker thread panicked")]
    WorkerPanicked,
}

/// Configuration for self-play game generation.
#[derive(Debug, Clone)]
pub struct SelfPlayConfig {
    /// Number of games to play.
    pub num_games: usize,
    /// Seats per game.
    pub players: usize,
    /// Turns after which a game is stopped without a winner.
    pub max_turns: u32,
    /// Number of parallel threads for concurrent games.
    pub threads: usize,
    /// Random seed (0 = use entropy).
    pub seed: u64,
    pub initial_troops: u32,
    pub odds_simulations: u32,
    pub attack_threshold: f64,
    /// Output file; stdout when unset.
    pub output: Option<PathBuf>,
    /// Suppress per-game progress output.
    pub quiet: bool,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        SelfPlayConfig {
            num_games: 10,
            players: 3,
            max_turns: 500,
            threads: 4,
            seed: 0,
            initial_troops: DEFAULT_INITIAL_TROOPS,
            odds_simulations: 1_000,
            attack_threshold: DEFAULT_ATTACK_THRESHOLD,
            output: None,
            quiet: false,
        }
    }
}

impl SelfPlayConfig {
    /// Builds a config from command-line arguments (without the program
    /// name). Returns `Ok(None)` when help was requested.
    pub fn from_args<I>(args: I) -> Result<Option<Self>, SelfPlayError>
    where
        I: IntoIterator<Item = String>,
    {
        fn value<T: std::str::FromStr>(
            flag: &str,
            args: &mut impl Iterator<Item = String>,
        ) -> Result<T, SelfPlayError> {
            let raw = args
                .next()
                .ok_or_else(|| SelfPlayError::Usage(format!("missing value for {}", flag)))?;
            raw.parse()
                .map_err(|_| SelfPlayError::Usage(format!("invalid {} value: '{}'", flag, raw)))
        }

        let mut config = SelfPlayConfig::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--games" => config.num_games = value(&arg, &mut args)?,
                "--players" => config.players = value(&arg, &mut args)?,
                "--max-turns" => config.max_turns = value(&arg, &mut args)?,
                "--threads" => config.threads = value(&arg, &mut args)?,
                "--seed" => config.seed = value(&arg, &mut args)?,
                "--initial-troops" => config.initial_troops = value(&arg, &mut args)?,
                "--odds-simulations" => config.odds_simulations = value(&arg, &mut args)?,
                "--attack-threshold" => config.attack_threshold = value(&arg, &mut args)?,
                "--output" => config.output = Some(value(&arg, &mut args)?),
                "--quiet" => config.quiet = true,
                "--help" | "-h" => return Ok(None),
                other => return Err(SelfPlayError::Usage(format!("unknown argument: {}", other))),
            }
        }
        Ok(Some(config))
    }
}

/// One turn of a self-play game.
#[derive(Debug, Clone, Serialize)]
pub struct TurnRecord {
    pub turn: u32,
    pub player: String,
    /// State at the start of the turn.
    pub snapshot: Snapshot,
    pub attacks: u32,
    pub conquests: u32,
}

/// A complete self-play game record.
#[derive(Debug, Clone, Serialize)]
pub struct GameRecord {
    pub game_id: usize,
    pub turns: Vec<TurnRecord>,
    /// The player holding the whole map, if the game finished.
    pub winner: Option<String>,
    pub final_turn: u32,
    /// Territories held by each player at the end.
    pub final_territories: BTreeMap<String, usize>,
}

fn seat_names(players: usize) -> Vec<String> {
    (1..=players).map(|i| format!("Player{}", i)).collect()
}

/// Plays one game to a winner or `config.max_turns`.
pub fn play_game(
    config: &SelfPlayConfig,
    graph: &TerritoryGraph,
    game_id: usize,
    rng: &mut SmallRng,
) -> Result<GameRecord, SelfPlayError> {
    let rules = Rules::default();
    let bot = BotConfig {
        attack_threshold: config.attack_threshold,
    };
    let mut odds = OddsTable::new(config.odds_simulations, rng.gen::<u64>() | 1);
    let mut state = deal(&seat_names(config.players), graph, config.initial_troops, &rules, rng)?;
    state.game_id = Some(game_id as u32);

    let mut turns = Vec::new();
    while state.winner.is_none() && state.turn <= config.max_turns {
        let snapshot = encode_snapshot(&state, graph);
        let turn = state.turn;
        let player = state.current_player().name.clone();
        let actions = play_turn(&mut state, graph, &rules, &bot, &mut odds, rng)?;
        let attacks = actions.iter().filter(|a| matches!(a, BotAction::Attack(_))).count() as u32;
        let conquests = actions
            .iter()
            .filter(|a| matches!(a, BotAction::Conquer(_)))
            .count() as u32;
        turns.push(TurnRecord {
            turn,
            player,
            snapshot,
            attacks,
            conquests,
        });
    }

    let final_territories = state
        .player_ids()
        .map(|p| (state.player(p).name.clone(), state.owned_count(p)))
        .collect();
    Ok(GameRecord {
        game_id,
        winner: state.winner.map(|w| state.player(w).name.clone()),
        final_turn: turns.last().map_or(0, |t| t.turn),
        turns,
        final_territories,
    })
}

/// Runs self-play generation, producing multiple game records.
///
/// When `config.threads > 1`, games are played concurrently using rayon.
pub fn run_self_play(config: &SelfPlayConfig) -> Result<Vec<GameRecord>, SelfPlayError> {
    let mut games = Vec::with_capacity(config.num_games);
    run_self_play_with_callback(config, |game| {
        games.push(game);
    })?;
    games.sort_by_key(|g| g.game_id);
    Ok(games)
}

/// Runs self-play generation, calling `on_game` with each completed game
/// record in completion order.
pub fn run_self_play_with_callback<F>(
    config: &SelfPlayConfig,
    on_game: F,
) -> Result<(), SelfPlayError>
where
    F: FnMut(GameRecord) + Send,
{
    if config.threads > 1 {
        run_self_play_parallel(config, on_game)
    } else {
        run_self_play_sequential(config, on_game)
    }
}

fn game_rng(seed: u64, game_id: usize) -> SmallRng {
    if seed != 0 {
        SmallRng::seed_from_u64(seed.wrapping_add(game_id as u64))
    } else {
        SmallRng::from_entropy()
    }
}

fn log_game(config: &SelfPlayConfig, n: usize, game: &GameRecord, started: Instant) {
    if config.quiet {
        return;
    }
    info!(
        game = n,
        of = config.num_games,
        winner = game.winner.as_deref().unwrap_or("none"),
        turns = game.final_turn,
        secs = started.elapsed().as_secs_f64(),
        "game finished"
    );
}

/// Sequential self-play: plays games one at a time.
fn run_self_play_sequential<F>(config: &SelfPlayConfig, mut on_game: F) -> Result<(), SelfPlayError>
where
    F: FnMut(GameRecord),
{
    let graph = classic();
    for i in 0..config.num_games {
        let started = Instant::now();
        let mut rng = game_rng(config.seed, i);
        let game = play_game(config, &graph, i, &mut rng)?;
        log_game(config, i + 1, &game, started);
        on_game(game);
    }
    Ok(())
}

/// Parallel self-play: plays games concurrently using rayon.
/// Uses a channel to deliver completed games to the callback from worker threads.
fn run_self_play_parallel<F>(config: &SelfPlayConfig, mut on_game: F) -> Result<(), SelfPlayError>
where
    F: FnMut(GameRecord) + Send,
{
    use rayon::prelude::*;
    use std::sync::mpsc;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()?;
    let (tx, rx) = mpsc::channel::<Result<GameRecord, SelfPlayError>>();

    let config_clone = config.clone();
    let handle = std::thread::spawn(move || {
        let graph = classic();
        let completed = AtomicUsize::new(0);
        pool.install(|| {
            (0..config_clone.num_games)
                .into_par_iter()
                .for_each_with(tx, |tx, i| {
                    let started = Instant::now();
                    let mut rng = game_rng(config_clone.seed, i);
                    let game = play_game(&config_clone, &graph, i, &mut rng);
                    if let Ok(game) = &game {
                        let n = completed.fetch_add(1, Ordering::Relaxed) + 1;
                        log_game(&config_clone, n, game, started);
                    }
                    let _ = tx.send(game);
                });
        });
    });

    // Receive completed games on the calling thread and pass to callback.
    let mut first_error = None;
    for game in rx {
        match game {
            Ok(game) => on_game(game),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    handle.join().map_err(|_| SelfPlayError::WorkerPanicked)?;
    first_error.map_or(Ok(()), Err)
}

/// Writes game records as JSONL (one JSON object per game, one per line).
pub fn write_jsonl<W: Write>(games: &[GameRecord], out: &mut W) -> std::io::Result<()> {
    for game in games {
        serde_json::to_writer(&mut *out, game)?;
        writeln!(out)?;
    }
    out.flush()
}

/// Prints a summary of self-play results to stderr.
pub fn print_summary(games: &[GameRecord]) {
    let total = games.len();
    let mut wins: BTreeMap<&str, usize> = BTreeMap::new();
    let mut unfinished = 0usize;
    let mut total_turns = 0u64;

    for game in games {
        total_turns += game.final_turn as u64;
        match &game.winner {
            Some(w) => *wins.entry(w.as_str()).or_default() += 1,
            None => unfinished += 1,
        }
    }

    eprintln!("=== Self-Play Summary ===");
    eprintln!("Games: {}", total);
    eprintln!(
        "Avg turns/game: {:.1}",
        total_turns as f64 / total.max(1) as f64
    );
    eprintln!("Unfinished: {}", unfinished);
    eprintln!("Win distribution:");
    for (seat, count) in wins {
        let pct = 100.0 * count as f64 / total.max(1) as f64;
        eprintln!("  {:>8}: {} ({:.1}%)", seat, count, pct);
    }
}
