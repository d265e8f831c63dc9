//! Passive buffs and once-per-turn/duel bookkeeping
//!
//! Passive contributions are derived from board state and rebuilt from
//! scratch: every recompute first reverses everything previously applied,
//! then re-evaluates each face-up monster's passive effects. Running it
//! twice in a row is a no-op.

use crate::core::{
    AppliedPassive, Card, CardId, CounterKind, EffectKey, PassiveSpec, PlayerId, StatDelta,
    StatusFlag, Timing, UsageScope,
};
use crate::game::GameState;
use crate::zones::ZoneKind;
use crate::{DuelError, Result};

/// Who is activating, for resolving a usage scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageContext {
    pub player: PlayerId,
    pub card: Option<CardId>,
}

impl UsageContext {
    pub fn new(player: PlayerId, card: Option<CardId>) -> Self {
        UsageContext { player, card }
    }
}

impl GameState {
    /// Rebuild passive contributions on every monster on the field
    pub fn recompute_passive_buffs(&mut self) {
        let on_field = self.monsters_on_field();

        for id in &on_field {
            if let Ok(card) = self.cards.get_mut(*id) {
                card.clear_passive_buffs();
            }
        }

        // Contributions only depend on counts and positions, never on
        // stats, so evaluating against the cleared board is stable.
        let mut contributions: Vec<(CardId, Vec<(EffectKey, AppliedPassive)>)> = Vec::new();
        for id in &on_field {
            let Ok(card) = self.cards.get(*id) else {
                continue;
            };
            if !card.face_up {
                continue;
            }
            let entries: Vec<(EffectKey, AppliedPassive)> = card
                .effects
                .iter()
                .enumerate()
                .filter(|(_, effect)| effect.timing == Timing::Passive)
                .filter_map(|(index, effect)| {
                    let spec = effect.passive.as_ref()?;
                    let applied = self.evaluate_passive(card, spec)?;
                    Some((card.effect_key(index), applied))
                })
                .collect();
            if !entries.is_empty() {
                contributions.push((*id, entries));
            }
        }

        for (id, entries) in contributions {
            if let Ok(card) = self.cards.get_mut(id) {
                card.apply_passive_buffs(entries);
            }
        }
    }

    fn evaluate_passive(&self, card: &Card, spec: &PassiveSpec) -> Option<AppliedPassive> {
        let per = |n: usize, atk_per: i32, def_per: i32| {
            let n = n as i32;
            StatDelta::new(atk_per * n, def_per * n)
        };

        match spec {
            PassiveSpec::PositionStatus { position, status } => {
                (card.position == *position).then_some(AppliedPassive {
                    delta: StatDelta::ZERO,
                    status: Some(*status),
                })
            }
            PassiveSpec::GraveyardTypeCount {
                monster_type,
                atk_per,
                def_per,
                side,
            } => {
                let count: usize = self
                    .side_players(card.controller, *side)
                    .iter()
                    .map(|p| {
                        self.count_in_zone(*p, ZoneKind::Graveyard, |c| {
                            c.is_monster() && c.has_type(monster_type)
                        })
                    })
                    .sum();
                stat_contribution(per(count, *atk_per, *def_per))
            }
            PassiveSpec::SpecialSummonTypeCount {
                monster_type,
                atk_per,
                def_per,
            } => {
                let count = self
                    .special_summons_by_type
                    .get(monster_type)
                    .copied()
                    .unwrap_or(0);
                stat_contribution(per(count as usize, *atk_per, *def_per))
            }
            PassiveSpec::PresenceSummonCount { atk_per, def_per } => {
                let count = card.counter(&CounterKind::summons_seen());
                stat_contribution(per(count as usize, *atk_per, *def_per))
            }
            PassiveSpec::ArchetypePopulation {
                archetype,
                atk_per,
                def_per,
                include_opponent,
                include_self,
            } => {
                let mut players = vec![card.controller];
                if *include_opponent {
                    players.push(self.opponent(card.controller));
                }
                let count: usize = players
                    .iter()
                    .map(|p| {
                        self.count_in_zone(*p, ZoneKind::Field, |c| {
                            c.face_up
                                && c.has_archetype(archetype)
                                && (*include_self || c.id != card.id)
                        })
                    })
                    .sum();
                stat_contribution(per(count, *atk_per, *def_per))
            }
        }
    }

    /// True if the effect may still be used this turn
    pub fn check_once_per_turn(
        &self,
        key: &EffectKey,
        scope: UsageScope,
        ctx: &UsageContext,
    ) -> Result<bool> {
        let turn = self.turn_counter;
        match scope {
            UsageScope::Player => {
                Ok(!self.get_player(ctx.player)?.usage.used_this_turn(key, turn))
            }
            UsageScope::Card => {
                let card = self.cards.get(scoped_card(ctx)?)?;
                Ok(!card.usage.used_this_turn(key, turn))
            }
        }
    }

    pub fn mark_once_per_turn(
        &mut self,
        key: &EffectKey,
        scope: UsageScope,
        ctx: &UsageContext,
    ) -> Result<()> {
        let turn = self.turn_counter;
        match scope {
            UsageScope::Player => {
                self.get_player_mut(ctx.player)?.usage.mark_turn(key.clone(), turn)
            }
            UsageScope::Card => self
                .cards
                .get_mut(scoped_card(ctx)?)?
                .usage
                .mark_turn(key.clone(), turn),
        }
        Ok(())
    }

    /// True if the effect has not been used yet this duel
    pub fn check_once_per_duel(
        &self,
        key: &EffectKey,
        scope: UsageScope,
        ctx: &UsageContext,
    ) -> Result<bool> {
        match scope {
            UsageScope::Player => Ok(!self.get_player(ctx.player)?.usage.used_in_duel(key)),
            UsageScope::Card => Ok(!self.cards.get(scoped_card(ctx)?)?.usage.used_in_duel(key)),
        }
    }

    pub fn mark_once_per_duel(
        &mut self,
        key: &EffectKey,
        scope: UsageScope,
        ctx: &UsageContext,
    ) -> Result<()> {
        match scope {
            UsageScope::Player => self.get_player_mut(ctx.player)?.usage.mark_duel(key.clone()),
            UsageScope::Card => self
                .cards
                .get_mut(scoped_card(ctx)?)?
                .usage
                .mark_duel(key.clone()),
        }
        Ok(())
    }

    /// Whether any monster currently shows `status` through a passive
    pub fn passive_status_holders(&self, status: StatusFlag) -> Vec<CardId> {
        self.monsters_on_field()
            .into_iter()
            .filter(|id| {
                self.cards
                    .get(*id)
                    .is_ok_and(|c| c.passive_buffs.values().any(|p| p.status == Some(status)))
            })
            .collect()
    }
}

fn stat_contribution(delta: StatDelta) -> Option<AppliedPassive> {
    (!delta.is_zero()).then_some(AppliedPassive {
        delta,
        status: None,
    })
}

fn scoped_card(ctx: &UsageContext) -> Result<CardId> {
    ctx.card.ok_or_else(|| {
        DuelError::InvalidAction("card-scoped usage check without a source card".to_string())
    })
}
