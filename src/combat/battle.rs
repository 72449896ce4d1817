//! Dice battle between an attacking and a defending territory.

use tracing::trace;

use super::dice::DiceRoller;

/// Most dice the attacker may roll in one round.
pub const MAX_ATTACK_DICE: u32 = 3;

/// Most dice the defender may roll in one round.
pub const MAX_DEFEND_DICE: u32 = 2;

/// Troops left on each side when a battle stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BattleOutcome {
    pub attacker_remaining: u32,
    pub defender_remaining: u32,
}

impl BattleOutcome {
    /// True if the defending territory was emptied.
    pub const fn is_conquest(&self) -> bool {
        self.defender_remaining == 0
    }
}

/// Compares one round of dice, both sorted highest first.
///
/// Dice are paired positionally; the attacker takes a pair only with a
/// strictly higher value, so ties go to the defender. Returns
/// `(attacker_losses, defender_losses)`.
pub fn resolve_round(attacker_dice: &[u8], defender_dice: &[u8]) -> (u32, u32) {
    let mut attacker_losses = 0;
    let mut defender_losses = 0;
    for (a, d) in attacker_dice.iter().zip(defender_dice) {
        if a > d {
            defender_losses += 1;
        } else {
            attacker_losses += 1;
        }
    }
    (attacker_losses, defender_losses)
}

/// Fights rounds until the defender is wiped out or the attacker is down
/// to a single troop.
///
/// An attacker with one troop, or a defender with none, returns unchanged.
pub fn resolve_battle<D: DiceRoller + ?Sized>(
    attacker: u32,
    defender: u32,
    dice: &mut D,
) -> BattleOutcome {
    let mut attacker = attacker;
    let mut defender = defender;

    while attacker > 1 && defender > 0 {
        let attacker_dice = dice.roll_sorted(MAX_ATTACK_DICE.min(attacker - 1) as usize);
        let defender_dice = dice.roll_sorted(MAX_DEFEND_DICE.min(defender) as usize);
        let (attacker_losses, defender_losses) = resolve_round(&attacker_dice, &defender_dice);
        trace!(?attacker_dice, ?defender_dice, attacker_losses, defender_losses, "battle round");
        attacker -= attacker_losses;
        defender -= defender_losses;
    }

    BattleOutcome {
        attacker_remaining: attacker,
        defender_remaining: defender,
    }
}
