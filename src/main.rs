//! Conquest -- a territory-conquest rules engine on a line protocol.
//!
//! This binary reads commands from stdin and writes responses to stdout.
//! Logs go to stderr, filtered by `RUST_LOG`.

use std::io::{self, BufRead};

use tracing_subscriber::EnvFilter;

use conquest::engine::Engine;
use conquest::protocol::parser::{parse_command, Command};

/// Runs the main protocol loop, reading commands from stdin
/// and writing responses to stdout.
fn main() -> io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut engine = Engine::new();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };

        let cmd = match parse_command(&line) {
            Some(c) => c,
            None => continue,
        };

        match cmd {
            Command::Info => engine.handle_info(&mut out)?,
            Command::IsReady => engine.handle_isready(&mut out)?,
            Command::SetOption { name, value } => {
                engine.handle_setoption(&mut out, name, value)?
            }
            Command::NewGame { players } => engine.handle_newgame(&mut out, &players)?,
            Command::Snapshot { json } => engine.handle_snapshot(&mut out, &json)?,
            Command::Show => engine.handle_show(&mut out)?,
            Command::Place { territory, actor } => {
                engine.handle_place(&mut out, actor.as_deref(), &territory)?
            }
            Command::Attack { from, to, actor } => {
                engine.handle_attack(&mut out, actor.as_deref(), &from, &to)?
            }
            Command::Conquer { troops, actor } => {
                engine.handle_conquer(&mut out, actor.as_deref(), troops)?
            }
            Command::EndAttack { actor } => engine.handle_endattack(&mut out, actor.as_deref())?,
            Command::Fortify {
                from,
                to,
                troops,
                actor,
            } => engine.handle_fortify(&mut out, actor.as_deref(), &from, &to, troops)?,
            Command::EndTurn { actor } => engine.handle_endturn(&mut out, actor.as_deref())?,
            Command::Odds { attacker, defender } => {
                engine.handle_odds(&mut out, attacker, defender)?
            }
            Command::Go => engine.handle_go(&mut out)?,
            Command::Quit => break,
        }
    }
    Ok(())
}
