//! Bot decision making
//!
//! Heuristics run synchronously and never suspend.

use crate::core::{CardId, Position};
use crate::game::selection::{SelectionPurpose, SelectionRequirement};
use crate::game::GameState;

pub trait SelectionHeuristic {
    /// Pick between `min` and `effective_max` candidates
    fn select(&mut self, game: &GameState, requirement: &SelectionRequirement) -> Vec<CardId>;

    fn summon_position(&mut self, game: &GameState, card: CardId) -> Position {
        game.preferred_position(card)
    }

    /// "You may" prompts
    fn confirm(&mut self, _game: &GameState, _prompt: &str) -> bool {
        true
    }

    fn choose_number(&mut self, _game: &GameState, _min: i32, max: i32) -> i32 {
        max
    }
}

/// Deterministic greedy choices
///
/// Costs and tributes take the weakest cards and as few as allowed;
/// targets and summons take the strongest and as many as allowed. Ties
/// keep zone order.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyHeuristic;

impl GreedyHeuristic {
    pub fn new() -> Self {
        GreedyHeuristic
    }

    fn score(game: &GameState, card: CardId) -> i32 {
        game.cards
            .get(card)
            .map(|c| if c.is_monster() { c.atk.max(c.def) } else { 0 })
            .unwrap_or(0)
    }
}

impl SelectionHeuristic for GreedyHeuristic {
    fn select(&mut self, game: &GameState, requirement: &SelectionRequirement) -> Vec<CardId> {
        let mut ranked = requirement.candidates.clone();
        let take = match requirement.purpose {
            SelectionPurpose::Cost | SelectionPurpose::Tribute => {
                ranked.sort_by_key(|id| Self::score(game, *id));
                requirement.min
            }
            SelectionPurpose::Target | SelectionPurpose::Summon => {
                ranked.sort_by_key(|id| std::cmp::Reverse(Self::score(game, *id)));
                requirement.effective_max()
            }
        };
        ranked.truncate(take.min(requirement.candidates.len()));
        ranked
    }
}
