//! Scripted UI for testing and the demo
//!
//! Replays a queue of prepared replies. When the queue is empty, or the
//! next reply doesn't fit the request, it defers, which lets tests drive
//! the suspend/resume path deterministically.

use crate::core::{CardId, Position};
use crate::game::selection::SelectionRequirement;
use crate::game::ui::{DuelUi, UiReply};
use crate::game::GameState;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// One prepared answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedReply {
    Cards(Vec<CardId>),
    Confirm(bool),
    Number(i32),
    Position(Position),
    Cancel,
}

/// Shared view of what a `ScriptedUi` was asked and told
#[derive(Debug, Clone, Default)]
pub struct UiTranscript {
    inner: Rc<RefCell<Transcript>>,
}

#[derive(Debug, Default)]
struct Transcript {
    messages: Vec<String>,
    prompts: Vec<String>,
}

impl UiTranscript {
    pub fn messages(&self) -> Vec<String> {
        self.inner.borrow().messages.clone()
    }

    /// Every request the UI received, in order
    pub fn prompts(&self) -> Vec<String> {
        self.inner.borrow().prompts.clone()
    }

    pub fn prompt_count(&self) -> usize {
        self.inner.borrow().prompts.len()
    }
}

pub struct ScriptedUi {
    replies: VecDeque<ScriptedReply>,
    transcript: UiTranscript,
}

impl ScriptedUi {
    pub fn new(replies: Vec<ScriptedReply>) -> Self {
        ScriptedUi {
            replies: replies.into(),
            transcript: UiTranscript::default(),
        }
    }

    /// A UI that defers everything
    pub fn deferring() -> Self {
        Self::new(Vec::new())
    }

    pub fn transcript(&self) -> UiTranscript {
        self.transcript.clone()
    }

    pub fn push(&mut self, reply: ScriptedReply) {
        self.replies.push_back(reply);
    }

    fn record(&self, prompt: String) {
        self.transcript.inner.borrow_mut().prompts.push(prompt);
    }

    /// Take the next reply if `fits` accepts it
    fn next<T>(&mut self, fits: impl FnOnce(&ScriptedReply) -> Option<T>) -> UiReply<T> {
        match self.replies.front() {
            Some(ScriptedReply::Cancel) => {
                self.replies.pop_front();
                UiReply::Cancelled
            }
            Some(reply) => match fits(reply) {
                Some(value) => {
                    self.replies.pop_front();
                    UiReply::Ready(value)
                }
                None => UiReply::Deferred,
            },
            None => UiReply::Deferred,
        }
    }
}

impl DuelUi for ScriptedUi {
    fn log(&mut self, message: &str) {
        self.transcript.inner.borrow_mut().messages.push(message.to_string());
    }

    fn select_cards(
        &mut self,
        _game: &GameState,
        requirement: &SelectionRequirement,
    ) -> UiReply<Vec<CardId>> {
        self.record(format!("select:{}", requirement.id));
        self.next(|reply| match reply {
            ScriptedReply::Cards(cards) => Some(cards.clone()),
            _ => None,
        })
    }

    fn confirm(&mut self, _game: &GameState, prompt: &str) -> UiReply<bool> {
        self.record(format!("confirm:{prompt}"));
        self.next(|reply| match reply {
            ScriptedReply::Confirm(yes) => Some(*yes),
            _ => None,
        })
    }

    fn choose_number(
        &mut self,
        _game: &GameState,
        prompt: &str,
        min: i32,
        max: i32,
    ) -> UiReply<i32> {
        self.record(format!("number:{prompt}"));
        self.next(|reply| match reply {
            ScriptedReply::Number(n) => Some((*n).clamp(min, max)),
            _ => None,
        })
    }

    fn summon_position(&mut self, _game: &GameState, card: CardId) -> UiReply<Position> {
        self.record(format!("position:{card}"));
        self.next(|reply| match reply {
            ScriptedReply::Position(p) => Some(*p),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::DuelConfig;

    #[test]
    fn test_replies_in_order_then_defer() {
        let game = GameState::new_two_player("A", "B", DuelConfig::default());
        let mut ui = ScriptedUi::new(vec![ScriptedReply::Confirm(false), ScriptedReply::Cancel]);
        let transcript = ui.transcript();

        assert_eq!(ui.confirm(&game, "draw?"), UiReply::Ready(false));
        assert_eq!(ui.summon_position(&game, CardId::new(3)), UiReply::Cancelled);
        assert_eq!(ui.confirm(&game, "again?"), UiReply::Deferred);
        assert_eq!(transcript.prompt_count(), 3);
    }

    #[test]
    fn test_mismatched_reply_is_kept() {
        let game = GameState::new_two_player("A", "B", DuelConfig::default());
        let mut ui = ScriptedUi::new(vec![ScriptedReply::Position(Position::Defense)]);
        assert_eq!(ui.confirm(&game, "x"), UiReply::Deferred);
        assert_eq!(ui.summon_position(&game, CardId::new(1)), UiReply::Ready(Position::Defense));
    }
}
