//! Self-play game generation CLI.
//!
//! Plays bot-vs-bot games on the classic map and writes them as JSONL.
//!
//! Usage:
//!   cargo run --release --bin selfplay -- [OPTIONS]
//!
//! Options:
//!   --games N             Number of games to play (default: 10)
//!   --players N           Players per game (default: 3)
//!   --max-turns N         Turn limit per game (default: 500)
//!   --threads N           Number of parallel threads (default: 4)
//!   --seed N              Random seed, 0 for entropy (default: 0)
//!   --initial-troops N    Starting troops per player (default: 35)
//!   --odds-simulations N  Battles simulated per odds estimate (default: 1000)
//!   --attack-threshold P  Minimum win probability to attack (default: 0.6)
//!   --output FILE         Output file path (default: stdout)
//!   --quiet               Suppress progress and summary output

use std::env;
use std::fs::File;
use std::io::{self, BufWriter};
use std::process::ExitCode;
use std::time::Instant;

use tracing_subscriber::EnvFilter;

use conquest::selfplay::{self, SelfPlayConfig};

fn main() -> ExitCode {
    let config = match SelfPlayConfig::from_args(env::args().skip(1)) {
        Ok(Some(config)) => config,
        Ok(None) => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("{}", e);
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    let level = if config.quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(config: &SelfPlayConfig) -> Result<(), Box<dyn std::error::Error>> {
    if !config.quiet {
        eprintln!(
            "Self-play: {} games, {} players, max {} turns, threshold {:.2}, {} threads",
            config.num_games,
            config.players,
            config.max_turns,
            config.attack_threshold,
            config.threads
        );
    }

    let start = Instant::now();
    let games = selfplay::run_self_play(config)?;
    let elapsed = start.elapsed();

    if !config.quiet {
        eprintln!(
            "Completed {} games in {:.1}s ({:.1} games/hour)",
            games.len(),
            elapsed.as_secs_f64(),
            games.len() as f64 / elapsed.as_secs_f64() * 3600.0
        );
        selfplay::print_summary(&games);
    }

    match &config.output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            selfplay::write_jsonl(&games, &mut writer)?;
            if !config.quiet {
                eprintln!("Wrote {} games to {}", games.len(), path.display());
            }
        }
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            selfplay::write_jsonl(&games, &mut writer)?;
        }
    }
    Ok(())
}

fn print_usage() {
    eprintln!("Usage: selfplay [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --games N             Number of games to play (default: 10)");
    eprintln!("  --players N           Players per game (default: 3)");
    eprintln!("  --max-turns N         Turn limit per game (default: 500)");
    eprintln!("  --threads N           Number of parallel threads (default: 4)");
    eprintln!("  --seed N              Random seed, 0 for entropy (default: 0)");
    eprintln!("  --initial-troops N    Starting troops per player (default: 35)");
    eprintln!("  --odds-simulations N  Battles simulated per odds estimate (default: 1000)");
    eprintln!("  --attack-threshold P  Minimum win probability to attack (default: 0.6)");
    eprintln!("  --output FILE         Output file path (default: stdout)");
    eprintln!("  --quiet               Suppress progress and summary output");
    eprintln!("  --help                Show this help");
}
