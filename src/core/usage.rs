//! Once-per-turn / once-per-duel usage ledger
//!
//! A turn-limited use is stored as the turn counter at the time of use. An
//! effect counts as used this turn only when the stored value equals the
//! current counter, so no explicit reset pass is needed at turn change.

use crate::core::EffectKey;
use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageLedger {
    last_used_turn: FxHashMap<EffectKey, u32>,
    used_in_duel: FxHashSet<EffectKey>,
}

impl UsageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn used_this_turn(&self, key: &EffectKey, turn: u32) -> bool {
        self.last_used_turn.get(key) == Some(&turn)
    }

    pub fn mark_turn(&mut self, key: EffectKey, turn: u32) {
        self.last_used_turn.insert(key, turn);
    }

    pub fn last_used_turn(&self, key: &EffectKey) -> Option<u32> {
        self.last_used_turn.get(key).copied()
    }

    pub fn used_in_duel(&self, key: &EffectKey) -> bool {
        self.used_in_duel.contains(key)
    }

    pub fn mark_duel(&mut self, key: EffectKey) {
        self.used_in_duel.insert(key);
    }

    pub fn clear(&mut self) {
        self.last_used_turn.clear();
        self.used_in_duel.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.last_used_turn.is_empty() && self.used_in_duel.is_empty()
    }
}
