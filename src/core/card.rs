//! Card types and definitions

use crate::core::{
    Archetype, CardName, CounterKind, Duration, EffectDescriptor, EffectKey, EntityId, GameEntity,
    MonsterType, PlayerId, ProtectionKind, StatDelta, StatusFlag, UsageLedger,
};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::sync::Arc;

pub type CardId = EntityId<Card>;

/// Coarse card category, governs which zones accept the card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardKind {
    Monster,
    Spell,
    Trap,
}

/// Spell/trap subtype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardSubtype {
    Normal,
    QuickPlay,
    Continuous,
    Equip,
    Field,
    Ritual,
    Counter,
}

/// Battle position of a monster
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    #[default]
    Attack,
    Defense,
}

/// Flags that only make sense while the card stays on the field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnFlags {
    pub attacks_made: u8,
    pub extra_attacks: u8,
    /// Extra attacks expire at end of turn unless granted permanently
    pub extra_attacks_permanent: bool,
    pub summoned_this_turn: bool,
    pub set_this_turn: bool,
    pub position_changed: bool,
    /// Cannot attack while `turn_counter <= cannot_attack_until`
    pub cannot_attack_until: Option<u32>,
    /// Unaffected by opponent effects while `turn_counter <= immune_until`
    pub immune_until: Option<u32>,
}

/// A protection entry granted by some effect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Protection {
    pub kind: ProtectionKind,
    pub duration: Duration,
    pub source: Option<CardId>,
}

/// What a passive effect currently contributes to a card
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppliedPassive {
    /// Nominal contribution; the clamped total lives on `Card::passive_applied`
    pub delta: StatDelta,
    pub status: Option<StatusFlag>,
}

/// A card instance during a duel
///
/// Created once from a database definition and afterwards only relocated
/// between zones. Everything that depends on being on the field is reset by
/// the zone transition engine when the card leaves it.
#[derive(Debug, Clone)]
pub struct Card {
    pub id: CardId,
    /// Id of the database record this instance was created from (0 for tokens)
    pub db_id: u32,
    pub name: CardName,
    pub kind: CardKind,
    pub subtype: Option<CardSubtype>,
    pub monster_types: SmallVec<[MonsterType; 2]>,
    pub archetypes: SmallVec<[Archetype; 2]>,
    pub level: u8,
    pub base_atk: i32,
    pub base_def: i32,
    /// Current stats, never negative
    pub atk: i32,
    pub def: i32,
    pub position: Position,
    pub face_up: bool,
    pub owner: PlayerId,
    pub controller: PlayerId,
    pub is_token: bool,
    /// Fusion/Synchro/Xyz/Link style monsters that live in the extra deck
    pub extra_deck: bool,

    pub flags: TurnFlags,
    /// Counters, which only exist while the card is on the field
    pub counters: SmallVec<[(CounterKind, u32); 2]>,
    /// Sum of temporary boosts actually applied this turn
    pub temp_boost: StatDelta,
    /// Permanently tracked deltas keyed by the source that granted them
    pub permanent_buffs: FxHashMap<String, StatDelta>,
    /// Contributions of passive effects, rebuilt on every recompute
    pub passive_buffs: FxHashMap<EffectKey, AppliedPassive>,
    /// Sum of all passive contributions as actually applied
    pub passive_applied: StatDelta,
    pub statuses: SmallVec<[StatusFlag; 4]>,
    pub protections: SmallVec<[Protection; 2]>,

    /// Identifier of the current stay on the field
    pub presence_id: Option<u64>,
    pub entered_field_turn: Option<u32>,
    pub summoned_turn: Option<u32>,
    pub set_turn: Option<u32>,
    pub revealed_turn: Option<u32>,

    pub usage: UsageLedger,
    pub effects: Arc<[EffectDescriptor]>,
}

impl Card {
    pub fn new(id: CardId, name: impl Into<CardName>, kind: CardKind, owner: PlayerId) -> Self {
        Card {
            id,
            db_id: 0,
            name: name.into(),
            kind,
            subtype: None,
            monster_types: SmallVec::new(),
            archetypes: SmallVec::new(),
            level: 0,
            base_atk: 0,
            base_def: 0,
            atk: 0,
            def: 0,
            position: Position::Attack,
            face_up: false,
            owner,
            controller: owner,
            is_token: false,
            extra_deck: false,
            flags: TurnFlags::default(),
            counters: SmallVec::new(),
            temp_boost: StatDelta::ZERO,
            permanent_buffs: FxHashMap::default(),
            passive_buffs: FxHashMap::default(),
            passive_applied: StatDelta::ZERO,
            statuses: SmallVec::new(),
            protections: SmallVec::new(),
            presence_id: None,
            entered_field_turn: None,
            summoned_turn: None,
            set_turn: None,
            revealed_turn: None,
            usage: UsageLedger::new(),
            effects: Arc::from(Vec::new()),
        }
    }

    /// Convenience constructor for a monster with base stats
    pub fn monster(
        id: CardId,
        name: impl Into<CardName>,
        owner: PlayerId,
        level: u8,
        atk: i32,
        def: i32,
    ) -> Self {
        let mut card = Card::new(id, name, CardKind::Monster, owner);
        card.level = level;
        card.base_atk = atk;
        card.base_def = def;
        card.atk = atk;
        card.def = def;
        card
    }

    pub fn is_monster(&self) -> bool {
        self.kind == CardKind::Monster
    }

    pub fn is_subtype(&self, subtype: CardSubtype) -> bool {
        self.subtype == Some(subtype)
    }

    pub fn has_type(&self, monster_type: &MonsterType) -> bool {
        self.monster_types.contains(monster_type)
    }

    pub fn has_archetype(&self, archetype: &Archetype) -> bool {
        self.archetypes.contains(archetype)
    }

    pub fn stats(&self) -> StatDelta {
        StatDelta::new(self.atk, self.def)
    }

    /// Apply a delta, clamping both stats at zero
    ///
    /// Returns the delta that was actually applied so that reversing it
    /// restores the previous values exactly.
    pub fn apply_delta(&mut self, delta: StatDelta) -> StatDelta {
        let atk = (self.atk + delta.atk).max(0);
        let def = (self.def + delta.def).max(0);
        let applied = StatDelta::new(atk - self.atk, def - self.def);
        self.atk = atk;
        self.def = def;
        applied
    }

    /// Undo a previously applied delta, clamping at zero
    pub fn reverse_delta(&mut self, applied: StatDelta) {
        self.atk = (self.atk - applied.atk).max(0);
        self.def = (self.def - applied.def).max(0);
    }

    pub fn add_temp_boost(&mut self, delta: StatDelta) -> StatDelta {
        let applied = self.apply_delta(delta);
        self.temp_boost += applied;
        applied
    }

    /// Reverse every temporary boost and reset the tracker to zero
    pub fn clear_temp_boost(&mut self) {
        let boost = std::mem::take(&mut self.temp_boost);
        self.reverse_delta(boost);
    }

    /// Add to the permanent buff total tracked under `source`
    pub fn add_permanent_buff(&mut self, source: &str, delta: StatDelta) -> StatDelta {
        let applied = self.apply_delta(delta);
        *self.permanent_buffs.entry(source.to_string()).or_default() += applied;
        applied
    }

    /// Reverse and forget the total tracked under `source`
    pub fn remove_permanent_buff(&mut self, source: &str) -> Option<StatDelta> {
        let total = self.permanent_buffs.remove(source)?;
        self.reverse_delta(total);
        Some(total)
    }

    /// Reverse every passive contribution and clear the map
    ///
    /// The total is reversed in one step so intermediate clamping can't
    /// skew the result.
    pub fn clear_passive_buffs(&mut self) {
        self.passive_buffs.clear();
        let total = std::mem::take(&mut self.passive_applied);
        self.reverse_delta(total);
    }

    /// Drop every tracked modifier and return to base stats
    ///
    /// Only valid once nothing else contributes, i.e. after equips are gone.
    pub fn reset_stats(&mut self) {
        self.temp_boost = StatDelta::ZERO;
        self.permanent_buffs.clear();
        self.passive_buffs.clear();
        self.passive_applied = StatDelta::ZERO;
        self.atk = self.base_atk.max(0);
        self.def = self.base_def.max(0);
    }

    /// Install a fresh set of passive contributions
    pub fn apply_passive_buffs(
        &mut self,
        entries: impl IntoIterator<Item = (EffectKey, AppliedPassive)>,
    ) {
        let mut total = StatDelta::ZERO;
        for (key, entry) in entries {
            total += entry.delta;
            self.passive_buffs.insert(key, entry);
        }
        let applied = self.apply_delta(total);
        self.passive_applied += applied;
    }

    /// Status from actions, or from a passive contribution
    pub fn has_status(&self, status: StatusFlag) -> bool {
        self.statuses.contains(&status)
            || self
                .passive_buffs
                .values()
                .any(|entry| entry.status == Some(status))
    }

    pub fn set_status(&mut self, status: StatusFlag, value: bool) -> bool {
        let present = self.statuses.contains(&status);
        match (present, value) {
            (false, true) => {
                self.statuses.push(status);
                true
            }
            (true, false) => {
                self.statuses.retain(|s| *s != status);
                true
            }
            _ => false,
        }
    }

    pub fn is_protected_from(&self, kind: ProtectionKind) -> bool {
        self.protections.iter().any(|p| p.kind == kind)
    }

    pub fn add_counter(&mut self, counter: CounterKind, amount: u32) {
        if let Some((_, count)) = self.counters.iter_mut().find(|(c, _)| *c == counter) {
            *count += amount;
        } else {
            self.counters.push((counter, amount));
        }
    }

    pub fn counter(&self, counter: &CounterKind) -> u32 {
        self.counters
            .iter()
            .find(|(c, _)| c == counter)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    /// Attacks still available this turn
    pub fn attacks_remaining(&self) -> u8 {
        (1 + self.flags.extra_attacks).saturating_sub(self.flags.attacks_made)
    }

    pub fn effect_key(&self, index: usize) -> EffectKey {
        match self.effects.get(index).and_then(|e| e.id.as_ref()) {
            Some(id) => EffectKey::named(id.clone()),
            None => EffectKey::indexed(self.db_id, index),
        }
    }
}

impl GameEntity<Card> for Card {
    fn id(&self) -> CardId {
        self.id
    }

    fn name(&self) -> &str {
        self.name.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_monster() -> Card {
        Card::monster(CardId::new(1), "Test Monster", PlayerId::new(100), 4, 1500, 1200)
    }

    #[test]
    fn test_card_creation() {
        let card = test_monster();
        assert_eq!(card.name.as_str(), "Test Monster");
        assert_eq!(card.owner, card.controller);
        assert!(card.is_monster());
        assert_eq!(card.stats(), StatDelta::new(1500, 1200));
    }

    #[test]
    fn test_clamped_delta_reverses_exactly() {
        let mut card = test_monster();
        let applied = card.apply_delta(StatDelta::new(-2000, 300));
        assert_eq!(card.atk, 0);
        assert_eq!(applied, StatDelta::new(-1500, 300));

        card.reverse_delta(applied);
        assert_eq!(card.stats(), StatDelta::new(1500, 1200));
    }

    #[test]
    fn test_reset_stats_ignores_clamping_history() {
        let mut card = test_monster();
        card.add_temp_boost(StatDelta::new(500, 0));
        card.add_permanent_buff("Curse", StatDelta::new(-2000, 0));
        assert_eq!(card.atk, 0);

        card.reset_stats();
        assert_eq!(card.stats(), StatDelta::new(1500, 1200));
        assert_eq!(card.temp_boost, StatDelta::ZERO);
        assert!(card.permanent_buffs.is_empty());
    }

    #[test]
    fn test_temp_boost_clears_to_zero() {
        let mut card = test_monster();
        card.add_temp_boost(StatDelta::new(500, 0));
        card.add_temp_boost(StatDelta::new(300, 100));
        assert_eq!(card.atk, 2300);

        card.clear_temp_boost();
        assert_eq!(card.temp_boost, StatDelta::ZERO);
        assert_eq!(card.stats(), StatDelta::new(1500, 1200));
    }

    #[test]
    fn test_permanent_buffs_keyed_by_source() {
        let mut card = test_monster();
        card.add_permanent_buff("Blessing", StatDelta::new(200, 0));
        card.add_permanent_buff("Blessing", StatDelta::new(200, 0));
        card.add_permanent_buff("Curse", StatDelta::new(-100, -100));
        assert_eq!(card.atk, 1800);

        assert_eq!(card.remove_permanent_buff("Blessing"), Some(StatDelta::new(400, 0)));
        assert_eq!(card.atk, 1400);
        assert_eq!(card.remove_permanent_buff("Blessing"), None);

        assert_eq!(card.remove_permanent_buff("Curse"), Some(StatDelta::new(-100, -100)));
        assert_eq!(card.stats(), StatDelta::new(1500, 1200));
        assert!(card.permanent_buffs.is_empty());
    }

    #[test]
    fn test_passive_buffs_reverse_as_one_total() {
        let mut card = test_monster();
        card.apply_passive_buffs([
            (
                EffectKey::named("a"),
                AppliedPassive { delta: StatDelta::new(-2000, 0), status: None },
            ),
            (
                EffectKey::named("b"),
                AppliedPassive { delta: StatDelta::new(800, 0), status: None },
            ),
        ]);
        assert_eq!(card.atk, 300);

        card.clear_passive_buffs();
        assert_eq!(card.atk, 1500);
        assert!(card.passive_buffs.is_empty());
    }

    #[test]
    fn test_status_toggle_reports_change() {
        let mut card = test_monster();
        assert!(card.set_status(StatusFlag::Piercing, true));
        assert!(!card.set_status(StatusFlag::Piercing, true));
        assert!(card.has_status(StatusFlag::Piercing));
        assert!(card.set_status(StatusFlag::Piercing, false));
        assert!(!card.has_status(StatusFlag::Piercing));
    }

    #[test]
    fn test_counters_and_attacks() {
        let mut card = test_monster();
        card.add_counter(CounterKind::summons_seen(), 2);
        card.add_counter(CounterKind::summons_seen(), 1);
        assert_eq!(card.counter(&CounterKind::summons_seen()), 3);

        assert_eq!(card.attacks_remaining(), 1);
        card.flags.extra_attacks = 1;
        card.flags.attacks_made = 1;
        assert_eq!(card.attacks_remaining(), 1);
    }
}
