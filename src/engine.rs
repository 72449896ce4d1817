//! Engine state management.
//!
//! Holds the territory graph, the current game, engine options, and the
//! random source shared by battles, dealing and the bot. Each `handle_*`
//! method runs one protocol command and writes its response lines.

use std::collections::HashMap;
use std::io::{self, Write};

use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::board::{classic, GameState, TerritoryGraph, TerritoryId};
use crate::bot::{play_turn, BotAction, BotConfig, DEFAULT_ATTACK_THRESHOLD};
use crate::combat::{OddsTable, DEFAULT_SIMULATIONS};
use crate::error::EngineError;
use crate::protocol::{format_snapshot, parse_snapshot, territory_token, SnapshotError};
use crate::resolve::{
    apply_battle_outcome, attack, end_attack_stage, end_fortify_stage, ensure_turn, fortify,
    place_troop, AttackReport, Conquest, Rules, DEFAULT_MIN_REINFORCEMENT,
};
use crate::setup::{deal, SetupError, DEFAULT_INITIAL_TROOPS};

/// Typed view of the options the engine understands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineOptions {
    /// Seed for dice, dealing and odds; 0 draws from entropy.
    pub seed: u64,
    pub min_reinforcement: u32,
    pub initial_troops: u32,
    pub odds_simulations: u32,
    pub bot_attack_threshold: f64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            seed: 0,
            min_reinforcement: DEFAULT_MIN_REINFORCEMENT,
            initial_troops: DEFAULT_INITIAL_TROOPS,
            odds_simulations: DEFAULT_SIMULATIONS,
            bot_attack_threshold: DEFAULT_ATTACK_THRESHOLD,
        }
    }
}

/// Why a protocol command failed.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("no game in progress")]
    NoGame,

    #[error("invalid value '{value}' for option '{name}'")]
    OptionValue { name: String, value: String },

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Holds the mutable state of the engine between commands.
pub struct Engine {
    pub graph: TerritoryGraph,
    pub state: Option<GameState>,
    pub options: HashMap<String, String>,
    pub config: EngineOptions,
    rng: SmallRng,
    odds: OddsTable,
}

impl Engine {
    /// Creates an engine on the classic map with no game loaded.
    pub fn new() -> Self {
        Engine::with_graph(classic())
    }

    /// Creates an engine on a custom map.
    pub fn with_graph(graph: TerritoryGraph) -> Self {
        let config = EngineOptions::default();
        Engine {
            graph,
            state: None,
            options: HashMap::new(),
            config,
            rng: SmallRng::from_entropy(),
            odds: OddsTable::new(config.odds_simulations, config.seed),
        }
    }

    pub fn rules(&self) -> Rules {
        Rules {
            min_reinforcement: self.config.min_reinforcement,
        }
    }

    pub fn bot_config(&self) -> BotConfig {
        BotConfig {
            attack_threshold: self.config.bot_attack_threshold,
        }
    }

    /// Sets an engine option. Known options must parse; unknown ones are
    /// stored as given.
    pub fn set_option(&mut self, name: String, value: Option<String>) -> Result<(), CommandError> {
        let raw = value.unwrap_or_default();
        let bad = || CommandError::OptionValue {
            name: name.clone(),
            value: raw.clone(),
        };
        match name.as_str() {
            "Seed" => {
                self.config.seed = raw.parse().map_err(|_| bad())?;
                self.reseed();
            }
            "MinReinforcement" => {
                self.config.min_reinforcement = raw.parse().map_err(|_| bad())?;
            }
            "InitialTroops" => {
                self.config.initial_troops = raw.parse().map_err(|_| bad())?;
            }
            "OddsSimulations" => {
                let sims: u32 = raw.parse().map_err(|_| bad())?;
                if sims == 0 {
                    return Err(bad());
                }
                self.config.odds_simulations = sims;
                self.odds = OddsTable::new(sims, self.config.seed);
            }
            "BotAttackThreshold" => {
                let threshold: f64 = raw.parse().map_err(|_| bad())?;
                if !(0.0..=1.0).contains(&threshold) {
                    return Err(bad());
                }
                self.config.bot_attack_threshold = threshold;
            }
            other => warn!("unknown option '{}' stored as given", other),
        }
        self.options.insert(name, raw);
        Ok(())
    }

    fn reseed(&mut self) {
        self.rng = match self.config.seed {
            0 => SmallRng::from_entropy(),
            seed => SmallRng::seed_from_u64(seed),
        };
        self.odds = OddsTable::new(self.config.odds_simulations, self.config.seed);
    }

    /// Deals a fresh game for the named players.
    pub fn new_game(&mut self, players: &[String]) -> Result<(), CommandError> {
        let rules = self.rules();
        let state = deal(players, &self.graph, self.config.initial_troops, &rules, &mut self.rng)?;
        self.state = Some(state);
        Ok(())
    }

    /// Replaces the current game with one loaded from snapshot JSON.
    pub fn load_snapshot(&mut self, json: &str) -> Result<(), CommandError> {
        let state = parse_snapshot(json, &self.graph)?;
        info!(player = %state.current_player().name, "snapshot loaded");
        self.state = Some(state);
        Ok(())
    }

    fn territory(&self, name: &str) -> Result<TerritoryId, CommandError> {
        Ok(self.graph.id_of(name)?)
    }

    /// Places one reinforcement troop for the current player.
    ///
    /// Every turn action takes the acting player's name when the caller
    /// knows it; a name other than the current player's is rejected.
    pub fn place(&mut self, actor: Option<&str>, territory: &str) -> Result<(), CommandError> {
        let territory = self.territory(territory)?;
        let rules = self.rules();
        let state = acting_game(&mut self.state, actor)?;
        place_troop(state, &self.graph, territory, &rules)?;
        Ok(())
    }

    /// Attacks with the engine's own dice.
    pub fn attack(
        &mut self,
        actor: Option<&str>,
        from: &str,
        to: &str,
    ) -> Result<AttackReport, CommandError> {
        let (from, to) = (self.territory(from)?, self.territory(to)?);
        let state = acting_game(&mut self.state, actor)?;
        Ok(attack(state, &self.graph, from, to, &mut self.rng)?)
    }

    pub fn conquer(&mut self, actor: Option<&str>, troops: u32) -> Result<Conquest, CommandError> {
        let state = acting_game(&mut self.state, actor)?;
        Ok(apply_battle_outcome(state, &self.graph, troops)?)
    }

    pub fn end_attack(&mut self, actor: Option<&str>) -> Result<(), CommandError> {
        let rules = self.rules();
        let state = acting_game(&mut self.state, actor)?;
        Ok(end_attack_stage(state, &self.graph, &rules)?)
    }

    pub fn fortify(
        &mut self,
        actor: Option<&str>,
        from: &str,
        to: &str,
        troops: u32,
    ) -> Result<(), CommandError> {
        let (from, to) = (self.territory(from)?, self.territory(to)?);
        let rules = self.rules();
        let state = acting_game(&mut self.state, actor)?;
        Ok(fortify(state, &self.graph, from, to, troops, &rules)?)
    }

    pub fn end_turn(&mut self, actor: Option<&str>) -> Result<(), CommandError> {
        let rules = self.rules();
        let state = acting_game(&mut self.state, actor)?;
        Ok(end_fortify_stage(state, &self.graph, &rules)?)
    }

    /// Lets the bot play the current player's turn.
    pub fn play_bot_turn(&mut self) -> Result<Vec<BotAction>, CommandError> {
        let rules = self.rules();
        let bot = self.bot_config();
        let state = self.state.as_mut().ok_or(CommandError::NoGame)?;
        Ok(play_turn(state, &self.graph, &rules, &bot, &mut self.odds, &mut self.rng)?)
    }

    /// Writes `ok`, or the error line, and logs rejections.
    fn respond<W: Write>(out: &mut W, result: Result<(), CommandError>) -> io::Result<()> {
        match result {
            Ok(()) => writeln!(out, "ok")?,
            Err(e) => {
                warn!("command rejected: {}", e);
                writeln!(out, "error {}", e)?;
            }
        }
        out.flush()
    }

    /// Writes the lines announcing a completed conquest.
    fn write_conquest<W: Write>(&self, out: &mut W, conquest: &Conquest) -> io::Result<()> {
        writeln!(out, "conquered {}", territory_token(self.graph.name(conquest.territory)))?;
        if let (Some(winner), Some(state)) = (conquest.winner, &self.state) {
            writeln!(out, "winner {}", state.player(winner).name)?;
        }
        Ok(())
    }

    /// Handles the `info` handshake: identity, options, then `infook`.
    pub fn handle_info<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "id name conquest")?;
        writeln!(out, "id territories {}", self.graph.len())?;
        writeln!(out, "option name Seed type spin default 0")?;
        writeln!(
            out,
            "option name MinReinforcement type spin default {}",
            DEFAULT_MIN_REINFORCEMENT
        )?;
        writeln!(
            out,
            "option name InitialTroops type spin default {}",
            DEFAULT_INITIAL_TROOPS
        )?;
        writeln!(
            out,
            "option name OddsSimulations type spin default {} min 1",
            DEFAULT_SIMULATIONS
        )?;
        writeln!(
            out,
            "option name BotAttackThreshold type string default {}",
            DEFAULT_ATTACK_THRESHOLD
        )?;
        writeln!(out, "infook")?;
        out.flush()
    }

    /// Handles the `isready` command.
    pub fn handle_isready<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "readyok")?;
        out.flush()
    }

    pub fn handle_setoption<W: Write>(
        &mut self,
        out: &mut W,
        name: String,
        value: Option<String>,
    ) -> io::Result<()> {
        let result = self.set_option(name, value);
        Self::respond(out, result)
    }

    pub fn handle_newgame<W: Write>(&mut self, out: &mut W, players: &[String]) -> io::Result<()> {
        let result = self.new_game(players);
        Self::respond(out, result)
    }

    pub fn handle_snapshot<W: Write>(&mut self, out: &mut W, json: &str) -> io::Result<()> {
        let result = self.load_snapshot(json);
        Self::respond(out, result)
    }

    /// Handles `show`: prints the state as `snapshot <json>`.
    pub fn handle_show<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let json = match &self.state {
            Some(state) => format_snapshot(state, &self.graph).map_err(CommandError::from),
            None => Err(CommandError::NoGame),
        };
        match json {
            Ok(json) => {
                writeln!(out, "snapshot {}", json)?;
                out.flush()
            }
            Err(e) => Self::respond(out, Err(e)),
        }
    }

    pub fn handle_place<W: Write>(
        &mut self,
        out: &mut W,
        actor: Option<&str>,
        territory: &str,
    ) -> io::Result<()> {
        let result = self.place(actor, territory);
        Self::respond(out, result)
    }

    /// Handles `attack`: prints `battle <attacker> <defender>` with the
    /// surviving troops. A defender count of 0 awaits `conquer`.
    pub fn handle_attack<W: Write>(
        &mut self,
        out: &mut W,
        actor: Option<&str>,
        from: &str,
        to: &str,
    ) -> io::Result<()> {
        match self.attack(actor, from, to) {
            Ok(report) => {
                write_battle(out, &report)?;
                out.flush()
            }
            Err(e) => Self::respond(out, Err(e)),
        }
    }

    /// Handles `conquer`: prints `conquered <territory>`, then
    /// `winner <player>` if that conquest ended the game.
    pub fn handle_conquer<W: Write>(
        &mut self,
        out: &mut W,
        actor: Option<&str>,
        troops: u32,
    ) -> io::Result<()> {
        match self.conquer(actor, troops) {
            Ok(conquest) => {
                self.write_conquest(out, &conquest)?;
                out.flush()
            }
            Err(e) => Self::respond(out, Err(e)),
        }
    }

    pub fn handle_endattack<W: Write>(
        &mut self,
        out: &mut W,
        actor: Option<&str>,
    ) -> io::Result<()> {
        let result = self.end_attack(actor);
        Self::respond(out, result)
    }

    pub fn handle_fortify<W: Write>(
        &mut self,
        out: &mut W,
        actor: Option<&str>,
        from: &str,
        to: &str,
        troops: u32,
    ) -> io::Result<()> {
        let result = self.fortify(actor, from, to, troops);
        Self::respond(out, result)
    }

    pub fn handle_endturn<W: Write>(
        &mut self,
        out: &mut W,
        actor: Option<&str>,
    ) -> io::Result<()> {
        let result = self.end_turn(actor);
        Self::respond(out, result)
    }

    /// Handles `odds`: prints the estimated win probability.
    pub fn handle_odds<W: Write>(
        &mut self,
        out: &mut W,
        attacker: u32,
        defender: u32,
    ) -> io::Result<()> {
        let p = self.odds.win_probability(attacker, defender);
        writeln!(out, "odds {:.4}", p)?;
        out.flush()
    }

    /// Handles `go`: the bot plays the current player's turn. Battles and
    /// conquests are reported as they would be for a human, then `ok`.
    pub fn handle_go<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let actions = match self.play_bot_turn() {
            Ok(actions) => actions,
            Err(e) => return Self::respond(out, Err(e)),
        };
        for action in &actions {
            match action {
                BotAction::Attack(report) => write_battle(out, report)?,
                BotAction::Conquer(conquest) => self.write_conquest(out, conquest)?,
                _ => {}
            }
        }
        Self::respond(out, Ok(()))
    }
}

/// The running game, once `actor` (if named) is confirmed as the player to move.
fn acting_game<'a>(
    state: &'a mut Option<GameState>,
    actor: Option<&str>,
) -> Result<&'a mut GameState, CommandError> {
    let state = state.as_mut().ok_or(CommandError::NoGame)?;
    if let Some(actor) = actor {
        ensure_turn(state, actor)?;
    }
    Ok(state)
}

fn write_battle<W: Write>(out: &mut W, report: &AttackReport) -> io::Result<()> {
    writeln!(
        out,
        "battle {} {}",
        report.outcome.attacker_remaining, report.outcome.defender_remaining
    )
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}
