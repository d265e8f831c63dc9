//! UI collaborator interface
//!
//! The engine never renders anything. When a human has to decide, it asks
//! the installed `DuelUi`; the UI either answers right away, reports that
//! the player declined, or defers, in which case the effect suspends and
//! the host resumes it later with `Engine::resume`.

use crate::core::{CardId, Position};
use crate::game::selection::SelectionRequirement;
use crate::game::GameState;

/// Answer to a UI request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiReply<T> {
    Ready(T),
    /// The player declined
    Cancelled,
    /// Ask again later; the effect suspends
    Deferred,
}

pub trait DuelUi {
    fn log(&mut self, message: &str);

    fn select_cards(
        &mut self,
        game: &GameState,
        requirement: &SelectionRequirement,
    ) -> UiReply<Vec<CardId>>;

    fn confirm(&mut self, game: &GameState, prompt: &str) -> UiReply<bool>;

    fn choose_number(
        &mut self,
        _game: &GameState,
        _prompt: &str,
        _min: i32,
        _max: i32,
    ) -> UiReply<i32> {
        UiReply::Deferred
    }

    /// Dedicated position prompt for special summons
    fn summon_position(&mut self, game: &GameState, card: CardId) -> UiReply<Position>;
}
