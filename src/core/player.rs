//! Player representation

use crate::core::{EntityId, GameEntity, PlayerName, UsageLedger};
use serde::{Deserialize, Serialize};

pub type PlayerId = EntityId<Player>;

/// Who makes this player's decisions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerKind {
    /// Decisions come from the synchronous selection heuristic
    #[default]
    Bot,
    /// Decisions come from the UI collaborator and may suspend
    Human,
}

/// Represents a player in the game
#[derive(Debug, Clone)]
pub struct Player {
    /// Unique ID for this player
    pub id: PlayerId,

    /// Player name
    pub name: PlayerName,

    /// Life points
    pub lp: i32,

    pub controller: ControllerKind,

    /// Has the player lost?
    pub has_lost: bool,

    /// Player-scoped once-per-turn/duel usage
    pub usage: UsageLedger,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<PlayerName>, starting_lp: i32) -> Self {
        Player {
            id,
            name: name.into(),
            lp: starting_lp,
            controller: ControllerKind::Bot,
            has_lost: false,
            usage: UsageLedger::new(),
        }
    }

    pub fn is_human(&self) -> bool {
        self.controller == ControllerKind::Human
    }

    pub fn gain_lp(&mut self, amount: i32) {
        self.lp += amount;
    }

    /// LP never goes below zero; reaching zero loses the duel
    pub fn lose_lp(&mut self, amount: i32) {
        self.lp = (self.lp - amount).max(0);
        if self.lp == 0 {
            self.has_lost = true;
        }
    }
}

impl GameEntity<Player> for Player {
    fn id(&self) -> PlayerId {
        self.id
    }

    fn name(&self) -> &str {
        self.name.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_creation() {
        let id = PlayerId::new(1);
        let player = Player::new(id, "Alice", 8000);

        assert_eq!(player.id, id);
        assert_eq!(player.name.as_str(), "Alice");
        assert_eq!(player.lp, 8000);
        assert!(!player.is_human());
        assert!(!player.has_lost);
    }

    #[test]
    fn test_player_lp() {
        let mut player = Player::new(PlayerId::new(1), "Bob", 8000);

        player.lose_lp(3000);
        assert_eq!(player.lp, 5000);
        assert!(!player.has_lost);

        player.lose_lp(6000);
        assert_eq!(player.lp, 0);
        assert!(player.has_lost);

        player.gain_lp(1000);
        assert_eq!(player.lp, 1000);
        // has_lost stays true once triggered
        assert!(player.has_lost);
    }
}
