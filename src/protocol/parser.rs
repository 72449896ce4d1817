//! Command parser for the line protocol.
//!
//! Parses incoming commands from raw text into structured `Command` variants
//! that the engine main loop can dispatch on. Territory names with spaces
//! are written with underscores (`North_Africa`).
//!
//! Turn actions may end in `as <player>`; the engine then rejects the
//! action unless that player is the one to move.

use tracing::warn;

/// A parsed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Identify the engine and list its options.
    Info,

    /// Synchronization ping; engine must reply `readyok`.
    IsReady,

    /// Set an engine option: `setoption name <id> [value <x>]`.
    SetOption { name: String, value: Option<String> },

    /// Deal a fresh game on the classic map for the named players.
    NewGame { players: Vec<String> },

    /// Replace the whole state with a JSON snapshot.
    Snapshot { json: String },

    /// Print the current state as a snapshot.
    Show,

    /// Place one reinforcement troop.
    Place {
        territory: String,
        actor: Option<String>,
    },

    /// Attack a rival neighbor.
    Attack {
        from: String,
        to: String,
        actor: Option<String>,
    },

    /// Move troops into a conquered territory.
    Conquer { troops: u32, actor: Option<String> },

    /// End the attack stage.
    EndAttack { actor: Option<String> },

    /// Move troops between connected territories, ending the turn.
    Fortify {
        from: String,
        to: String,
        troops: u32,
        actor: Option<String>,
    },

    /// End the turn without fortifying.
    EndTurn { actor: Option<String> },

    /// Estimate the attacker's chance of taking a territory.
    Odds { attacker: u32, defender: u32 },

    /// Let the built-in bot play the current player's turn.
    Go,

    /// Terminate the engine process.
    Quit,
}

/// Converts a protocol token to a territory name.
pub fn territory_name(token: &str) -> String {
    token.replace('_', " ")
}

/// Converts a territory name to a protocol token.
pub fn territory_token(name: &str) -> String {
    name.replace(' ', "_")
}

/// Parses a single line of input into a `Command`.
///
/// Returns `None` for empty lines or unrecognized commands. Malformed
/// arguments for known commands also return `None` after logging a warning.
pub fn parse_command(line: &str) -> Option<Command> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }

    match tokens[0] {
        "info" => Some(Command::Info),
        "isready" => Some(Command::IsReady),
        "quit" => Some(Command::Quit),
        "show" => Some(Command::Show),
        "go" => Some(Command::Go),

        "setoption" => parse_setoption(&tokens),
        "newgame" => parse_newgame(&tokens),
        "snapshot" => parse_snapshot_line(trimmed),
        "place" => parse_place(&tokens),
        "attack" => parse_attack(&tokens),
        "conquer" => parse_conquer(&tokens),
        "endattack" => parse_bare_action(&tokens, |actor| Command::EndAttack { actor }),
        "endturn" => parse_bare_action(&tokens, |actor| Command::EndTurn { actor }),
        "fortify" => parse_fortify(&tokens),
        "odds" => parse_odds(&tokens),

        other => {
            warn!("unknown command: {}", other);
            None
        }
    }
}

/// Parses `setoption name <id> [value <x>]`.
fn parse_setoption(tokens: &[&str]) -> Option<Command> {
    if tokens.len() < 3 || tokens[1] != "name" {
        warn!("malformed setoption: expected 'setoption name <id> [value <x>]'");
        return None;
    }

    let value_idx = tokens.iter().position(|&t| t == "value");
    let (name, value) = match value_idx {
        Some(vi) => {
            let name_parts = &tokens[2..vi];
            let value_parts = &tokens[vi + 1..];
            if name_parts.is_empty() {
                warn!("malformed setoption: empty name");
                return None;
            }
            let value = if value_parts.is_empty() {
                None
            } else {
                Some(value_parts.join(" "))
            };
            (name_parts.join(" "), value)
        }
        None => (tokens[2..].join(" "), None),
    };

    Some(Command::SetOption { name, value })
}

/// Parses `newgame <player> <player> [...]`.
fn parse_newgame(tokens: &[&str]) -> Option<Command> {
    if tokens.len() < 3 {
        warn!("malformed newgame: expected at least two player names");
        return None;
    }
    let players = tokens[1..].iter().map(|t| t.to_string()).collect();
    Some(Command::NewGame { players })
}

/// Parses `snapshot <json>`; the JSON may contain spaces.
fn parse_snapshot_line(line: &str) -> Option<Command> {
    let json = line.strip_prefix("snapshot").unwrap_or("").trim();
    if json.is_empty() {
        warn!("malformed snapshot: expected 'snapshot <json>'");
        return None;
    }
    Some(Command::Snapshot {
        json: json.to_string(),
    })
}

/// Splits a trailing `as <player>` off an action's tokens.
fn split_actor<'a>(tokens: &'a [&'a str]) -> (&'a [&'a str], Option<String>) {
    match tokens {
        [rest @ .., "as", player] if !rest.is_empty() => (rest, Some(player.to_string())),
        _ => (tokens, None),
    }
}

/// Parses `endattack` and `endturn`, which take no arguments.
fn parse_bare_action(
    tokens: &[&str],
    build: impl FnOnce(Option<String>) -> Command,
) -> Option<Command> {
    let (tokens, actor) = split_actor(tokens);
    if tokens.len() != 1 {
        warn!("malformed {}: expected no arguments besides 'as <player>'", tokens[0]);
        return None;
    }
    Some(build(actor))
}

/// Parses `place <territory> [as <player>]`.
fn parse_place(tokens: &[&str]) -> Option<Command> {
    let (tokens, actor) = split_actor(tokens);
    if tokens.len() != 2 {
        warn!("malformed place: expected 'place <territory>'");
        return None;
    }
    Some(Command::Place {
        territory: territory_name(tokens[1]),
        actor,
    })
}

/// Parses `attack <from> <to> [as <player>]`.
fn parse_attack(tokens: &[&str]) -> Option<Command> {
    let (tokens, actor) = split_actor(tokens);
    if tokens.len() != 3 {
        warn!("malformed attack: expected 'attack <from> <to>'");
        return None;
    }
    Some(Command::Attack {
        from: territory_name(tokens[1]),
        to: territory_name(tokens[2]),
        actor,
    })
}

/// Parses `conquer <troops> [as <player>]`.
fn parse_conquer(tokens: &[&str]) -> Option<Command> {
    let (tokens, actor) = split_actor(tokens);
    if tokens.len() != 2 {
        warn!("malformed conquer: expected 'conquer <troops>'");
        return None;
    }
    match tokens[1].parse::<u32>() {
        Ok(troops) => Some(Command::Conquer { troops, actor }),
        Err(_) => {
            warn!("invalid troop count: '{}'", tokens[1]);
            None
        }
    }
}

/// Parses `fortify <from> <to> <troops> [as <player>]`.
fn parse_fortify(tokens: &[&str]) -> Option<Command> {
    let (tokens, actor) = split_actor(tokens);
    if tokens.len() != 4 {
        warn!("malformed fortify: expected 'fortify <from> <to> <troops>'");
        return None;
    }
    match tokens[3].parse::<u32>() {
        Ok(troops) => Some(Command::Fortify {
            from: territory_name(tokens[1]),
            to: territory_name(tokens[2]),
            troops,
            actor,
        }),
        Err(_) => {
            warn!("invalid troop count: '{}'", tokens[3]);
            None
        }
    }
}

/// Parses `odds <attacker> <defender>`.
fn parse_odds(tokens: &[&str]) -> Option<Command> {
    if tokens.len() != 3 {
        warn!("malformed odds: expected 'odds <attacker> <defender>'");
        return None;
    }
    match (tokens[1].parse::<u32>(), tokens[2].parse::<u32>()) {
        (Ok(attacker), Ok(defender)) => Some(Command::Odds { attacker, defender }),
        _ => {
            warn!("invalid troop counts: '{} {}'", tokens[1], tokens[2]);
            None
        }
    }
}
