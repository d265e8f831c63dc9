//! Zone transition engine
//!
//! `GameState::move_card` is the only path that changes which zone a card
//! is in. It locates the card, runs leaving-the-field cleanup, keeps the
//! equip and binding tables consistent, applies destination rules, and
//! commits. Follow-up destroys issued by cleanup are queued and drained
//! once the top-level move has committed.

use crate::core::{
    CardId, CardKind, CounterKind, Duration, PlayerId, Position, StatDelta, TokenSpec, TurnFlags,
};
use crate::game::hooks::ZoneOp;
use crate::game::relations::EquipLink;
use crate::game::state::{GameState, SecondaryOp};
use crate::game::{GameEvent, SummonMethod};
use crate::undo::MoveRecord;
use crate::zones::{ZoneKind, ZonePosition};
use crate::{DuelError, Result};
use thiserror::Error;

/// Why a move is happening, for logs and the journal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MoveReason {
    #[default]
    Effect,
    Summon,
    Destroy,
    Cost,
    Draw,
    /// Engine-driven follow-up (equip relocation, field spell replacement)
    Rule,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveOptions {
    /// Zone to look in first when locating the card
    pub preferred_zone: Option<ZoneKind>,
    /// Battle position on arrival; defaults to attack, or defense when set
    pub position: Option<Position>,
    pub face_down: bool,
    pub summon: SummonMethod,
    pub placement: ZonePosition,
    pub reason: MoveReason,
}

impl MoveOptions {
    pub fn from_zone(zone: ZoneKind) -> Self {
        MoveOptions {
            preferred_zone: Some(zone),
            ..Default::default()
        }
    }

    pub fn summon(method: SummonMethod, position: Position) -> Self {
        MoveOptions {
            position: Some(position),
            summon: method,
            reason: MoveReason::Summon,
            ..Default::default()
        }
    }

    pub fn with_reason(mut self, reason: MoveReason) -> Self {
        self.reason = reason;
        self
    }

    pub fn face_down(mut self) -> Self {
        self.face_down = true;
        self
    }

    pub fn at(mut self, placement: ZonePosition) -> Self {
        self.placement = placement;
        self
    }
}

/// A committed relocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Moved {
    pub card: CardId,
    pub from_player: PlayerId,
    pub from_zone: ZoneKind,
    pub to_player: PlayerId,
    /// `None` when a token left the field and was removed from the game
    pub to_zone: Option<ZoneKind>,
    pub token_removed: bool,
    /// Extra-deck monster sent back to the extra deck instead of hand/deck
    pub redirected: bool,
}

/// Why a move was refused; in every case nothing was mutated
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveRejection {
    #[error("player {player} has no {zone} zone")]
    UnknownZone { player: PlayerId, zone: ZoneKind },

    #[error("{zone} of player {player} is full")]
    ZoneFull { player: PlayerId, zone: ZoneKind },

    #[error("card {card} is a {kind:?} and cannot enter {zone}")]
    KindMismatch {
        card: CardId,
        kind: CardKind,
        zone: ZoneKind,
    },

    #[error("card {0} is not in any zone")]
    CardNotFound(CardId),

    #[error("zone invariant breached: {0}")]
    InvariantBreach(String),

    #[error("rejected by hook: {0}")]
    HookRejected(String),
}

pub type MoveResult = std::result::Result<Moved, MoveRejection>;

impl GameState {
    /// Move a card to `dest_zone` of `dest_player`
    ///
    /// Wrapped by the installed zone-op hooks. On rejection the state is
    /// untouched. Secondary operations queued by cleanup run after commit.
    pub fn move_card(
        &mut self,
        card: CardId,
        dest_player: PlayerId,
        dest_zone: ZoneKind,
        options: MoveOptions,
    ) -> MoveResult {
        let op = ZoneOp {
            card,
            dest_player,
            dest_zone,
        };

        let mut hooks = std::mem::take(&mut self.hooks);
        let verdict = hooks.iter_mut().try_for_each(|hook| hook.before(&op));
        let result = match verdict {
            Ok(()) => self.transition(card, dest_player, dest_zone, &options),
            Err(reason) => {
                self.logger
                    .normal(&format!("Move of {card} to {dest_zone} rejected: {reason}"));
                Err(MoveRejection::HookRejected(reason))
            }
        };
        for hook in hooks.iter_mut() {
            hook.after(&op, &result);
        }
        // Hooks registered during the move go after the existing ones
        hooks.append(&mut self.hooks);
        self.hooks = hooks;

        if !self.draining {
            self.drain_secondary_ops();
        }
        result
    }

    /// Destroy a card: send it to its owner's graveyard and announce it
    pub fn destroy_card(&mut self, card: CardId) -> MoveResult {
        let owner = self
            .cards
            .get(card)
            .map(|c| c.owner)
            .map_err(|_| MoveRejection::CardNotFound(card))?;
        let options = MoveOptions::default().with_reason(MoveReason::Destroy);
        let moved = self.move_card(card, owner, ZoneKind::Graveyard, options)?;
        self.emit(GameEvent::CardDestroyed {
            card,
            from_zone: moved.from_zone,
        });
        Ok(moved)
    }

    fn drain_secondary_ops(&mut self) {
        self.draining = true;
        while let Some(op) = self.pending.pop_front() {
            match op {
                SecondaryOp::Destroy { card, cause } => {
                    // Already gone by some other path
                    if self.locate(card).is_none() {
                        continue;
                    }
                    if let Err(e) = self.destroy_card(card) {
                        self.logger.normal(&format!(
                            "Follow-up destroy of {card} (from {cause}) failed: {e}"
                        ));
                    }
                }
            }
        }
        self.draining = false;
    }

    /// The relocation algorithm proper; nested moves call this directly
    fn transition(
        &mut self,
        card_id: CardId,
        dest_player: PlayerId,
        dest_zone: ZoneKind,
        options: &MoveOptions,
    ) -> MoveResult {
        if self.get_player_zones(dest_player).is_none() {
            return Err(MoveRejection::UnknownZone {
                player: dest_player,
                zone: dest_zone,
            });
        }
        let (kind, owner, is_token, extra_deck) = match self.cards.get(card_id) {
            Ok(c) => (c.kind, c.owner, c.is_token, c.extra_deck),
            Err(_) => return Err(MoveRejection::CardNotFound(card_id)),
        };

        let redirected = extra_deck && matches!(dest_zone, ZoneKind::Hand | ZoneKind::Deck);
        let (dest_player, dest_zone) = if redirected {
            (owner, ZoneKind::ExtraDeck)
        } else {
            (dest_player, dest_zone)
        };

        if dest_zone == ZoneKind::Field && kind != CardKind::Monster {
            self.logger.fault(
                "move_card",
                &format!("{card_id} is a {kind:?} and may not enter the monster field"),
            );
            return Err(MoveRejection::KindMismatch {
                card: card_id,
                kind,
                zone: dest_zone,
            });
        }

        let (from_player, from_zone) = self.find_source(card_id, options.preferred_zone)?;

        if from_player == dest_player && from_zone == dest_zone {
            return Ok(self.reposition(card_id, from_player, from_zone, options));
        }

        let has_room = self
            .get_player_zones(dest_player)
            .is_some_and(|z| z.has_room(dest_zone));
        if !has_room {
            return Err(MoveRejection::ZoneFull {
                player: dest_player,
                zone: dest_zone,
            });
        }

        // Replacing a field spell evicts the current one first
        if dest_zone == ZoneKind::FieldSpell {
            let occupant = self
                .get_player_zones(dest_player)
                .and_then(|z| z.field_spell)
                .filter(|id| *id != card_id);
            if let Some(occupant) = occupant {
                let occupant_owner =
                    self.cards.get(occupant).map(|c| c.owner).unwrap_or(dest_player);
                let evict =
                    MoveOptions::from_zone(ZoneKind::FieldSpell).with_reason(MoveReason::Rule);
                let evicted =
                    self.transition(occupant, occupant_owner, ZoneKind::Graveyard, &evict);
                if let Err(e) = evicted {
                    self.logger.fault(
                        "move_card",
                        &format!("could not evict field spell {occupant}: {e}"),
                    );
                    return Err(MoveRejection::InvariantBreach(format!(
                        "field spell slot of {dest_player} could not be cleared"
                    )));
                }
            }
        }

        // Commit point: from here on nothing is refused
        if let Some(zones) = self.get_player_zones_mut(from_player) {
            zones.remove(from_zone, card_id);
        }

        // A change of control between fields keeps the card's presence
        let leaving_field = from_zone == ZoneKind::Field && dest_zone != ZoneKind::Field;
        let leaving_spell_trap = matches!(from_zone, ZoneKind::SpellTrap | ZoneKind::FieldSpell)
            && dest_zone != from_zone;

        if leaving_spell_trap {
            self.release_spell_trap_links(card_id);
        } else if leaving_field {
            self.release_monster_links(card_id);
        }
        // Links first: the reset puts stats back to base
        if leaving_field {
            self.reset_field_state(card_id);
        }

        if is_token && leaving_field {
            self.cards.remove(card_id);
            self.emit(GameEvent::TokenRemoved { card: card_id });
            self.journal.log(MoveRecord {
                card: card_id,
                from_player,
                from_zone,
                to_player: dest_player,
                to_zone: None,
                turn: self.turn_counter,
            });
            #[cfg(feature = "verbose-logging")]
            self.logger
                .event("zone_move", &format!("token {card_id} left the field and was removed"));
            return Ok(Moved {
                card: card_id,
                from_player,
                from_zone,
                to_player: dest_player,
                to_zone: None,
                token_removed: true,
                redirected: false,
            });
        }

        self.arrive(card_id, Some(from_zone), dest_player, dest_zone, options);

        self.journal.log(MoveRecord {
            card: card_id,
            from_player,
            from_zone,
            to_player: dest_player,
            to_zone: Some(dest_zone),
            turn: self.turn_counter,
        });
        #[cfg(feature = "verbose-logging")]
        self.logger.event(
            "zone_move",
            &format!(
                "{card_id}: {from_zone}({from_player}) -> {dest_zone}({dest_player}) [{:?}]",
                options.reason
            ),
        );

        Ok(Moved {
            card: card_id,
            from_player,
            from_zone,
            to_player: dest_player,
            to_zone: Some(dest_zone),
            token_removed: false,
            redirected,
        })
    }

    /// Find the single container holding the card
    fn find_source(
        &self,
        card: CardId,
        hint: Option<ZoneKind>,
    ) -> std::result::Result<(PlayerId, ZoneKind), MoveRejection> {
        if let Some(zone) = hint {
            if let Some((pid, _)) = self
                .player_zones
                .iter()
                .find(|(_, zones)| zones.contains(zone, card))
            {
                return Ok((*pid, zone));
            }
        }

        let holdings = self.holdings(card);
        match holdings.as_slice() {
            [] => Err(MoveRejection::CardNotFound(card)),
            [single] => Ok(*single),
            many => {
                let detail = format!("{card} is held by {} containers: {many:?}", many.len());
                self.logger.fault("move_card", &detail);
                Err(MoveRejection::InvariantBreach(detail))
            }
        }
    }

    /// Same player, same zone: reorder and optionally change position
    fn reposition(
        &mut self,
        card_id: CardId,
        player: PlayerId,
        zone: ZoneKind,
        options: &MoveOptions,
    ) -> Moved {
        if zone != ZoneKind::FieldSpell {
            let container = self
                .get_player_zones_mut(player)
                .and_then(|z| z.get_zone_mut(zone));
            if let Some(container) = container {
                container.remove(card_id);
                container.insert(card_id, options.placement);
            }
        }
        if let (Some(position), Ok(card)) = (options.position, self.cards.get_mut(card_id)) {
            if card.position != position {
                card.position = position;
                card.flags.position_changed = true;
            }
        }
        Moved {
            card: card_id,
            from_player: player,
            from_zone: zone,
            to_player: player,
            to_zone: Some(zone),
            token_removed: false,
            redirected: false,
        }
    }

    /// Reset everything that only exists while a monster is on the field
    fn reset_field_state(&mut self, card_id: CardId) {
        let Ok(card) = self.cards.get_mut(card_id) else {
            return;
        };
        card.flags = TurnFlags::default();
        card.reset_stats();
        card.counters.clear();
        card.statuses.clear();
        card.protections.retain(|p| p.duration != Duration::WhileFaceUp);
        card.presence_id = None;
        card.entered_field_turn = None;
        card.summoned_turn = None;
        card.set_turn = None;
        card.revealed_turn = None;
        card.position = Position::Attack;
    }

    /// A spell/trap left its zone: drop its equip link and binding
    fn release_spell_trap_links(&mut self, card_id: CardId) {
        if let Ok(card) = self.cards.get_mut(card_id) {
            card.counters.clear();
        }
        if let Some(link) = self.relations.detach(card_id) {
            if let Ok(host) = self.cards.get_mut(link.host) {
                host.reverse_delta(link.bonus);
            }
            if link.destroy_host_on_leave {
                self.pending.push_back(SecondaryOp::Destroy {
                    card: link.host,
                    cause: card_id,
                });
            }
        }
        if let Some(monster) = self.relations.unbind(card_id) {
            self.pending.push_back(SecondaryOp::Destroy {
                card: monster,
                cause: card_id,
            });
        }
    }

    /// A monster left the field: its equips follow it out, its bindings end
    fn release_monster_links(&mut self, card_id: CardId) {
        for equip in self.relations.equips_of(card_id) {
            if let Some(link) = self.relations.detach(equip) {
                if let Ok(host) = self.cards.get_mut(card_id) {
                    host.reverse_delta(link.bonus);
                }
            }
            let Ok(equip_owner) = self.cards.get(equip).map(|c| c.owner) else {
                continue;
            };
            let options = MoveOptions::from_zone(ZoneKind::SpellTrap).with_reason(MoveReason::Rule);
            if let Err(e) = self.transition(equip, equip_owner, ZoneKind::Graveyard, &options) {
                self.logger.fault(
                    "move_card",
                    &format!("equip {equip} could not follow its host out: {e}"),
                );
            }
        }
        self.relations.release_monster(card_id);
    }

    /// Destination rules and the final insert
    fn arrive(
        &mut self,
        card_id: CardId,
        from_zone: Option<ZoneKind>,
        dest_player: PlayerId,
        dest_zone: ZoneKind,
        options: &MoveOptions,
    ) {
        let turn = self.turn_counter;
        let entering_field = dest_zone == ZoneKind::Field && from_zone != Some(ZoneKind::Field);
        let presence = if entering_field {
            let id = self.next_presence_id;
            self.next_presence_id += 1;
            Some(id)
        } else {
            None
        };

        let Ok(card) = self.cards.get_mut(card_id) else {
            self.logger
                .fault("move_card", &format!("{card_id} vanished during its own move"));
            return;
        };
        card.controller = if dest_zone.is_on_field() {
            dest_player
        } else {
            card.owner
        };
        match dest_zone {
            ZoneKind::Field if entering_field => {
                card.presence_id = presence;
                card.entered_field_turn = Some(turn);
                card.face_up = !options.face_down;
                card.position = options.position.unwrap_or(if options.face_down {
                    Position::Defense
                } else {
                    Position::Attack
                });
                if options.face_down {
                    card.set_turn = Some(turn);
                    card.flags.set_this_turn = true;
                } else {
                    card.summoned_turn = Some(turn);
                    card.revealed_turn = Some(turn);
                    card.flags.summoned_this_turn = true;
                }
            }
            ZoneKind::Field => {
                if let Some(position) = options.position {
                    card.position = position;
                }
            }
            ZoneKind::SpellTrap | ZoneKind::FieldSpell => {
                card.face_up = !options.face_down;
                if options.face_down {
                    card.set_turn = Some(turn);
                } else {
                    card.revealed_turn = Some(turn);
                }
            }
            ZoneKind::Graveyard => card.face_up = true,
            ZoneKind::Banished => card.face_up = !options.face_down,
            ZoneKind::Hand | ZoneKind::Deck | ZoneKind::ExtraDeck => card.face_up = false,
        }
        let summoned_types = card.monster_types.clone();

        if let Some(zones) = self.get_player_zones_mut(dest_player) {
            match dest_zone {
                ZoneKind::FieldSpell => zones.field_spell = Some(card_id),
                other => {
                    if let Some(container) = zones.get_zone_mut(other) {
                        container.insert(card_id, options.placement);
                    }
                }
            }
        }

        if entering_field {
            let method = if options.face_down {
                SummonMethod::Set
            } else {
                options.summon
            };
            if method == SummonMethod::Special {
                for monster_type in summoned_types {
                    *self.special_summons_by_type.entry(monster_type).or_insert(0) += 1;
                }
            }
            if method != SummonMethod::Set {
                let observers: Vec<CardId> = self
                    .monsters_on_field()
                    .into_iter()
                    .filter(|id| *id != card_id)
                    .collect();
                for observer in observers {
                    if let Ok(c) = self.cards.get_mut(observer) {
                        c.add_counter(CounterKind::summons_seen(), 1);
                    }
                }
                self.emit(GameEvent::AfterSummon {
                    card: card_id,
                    player: dest_player,
                    from_zone,
                    method,
                    presence_id: presence.unwrap_or_default(),
                });
            }
        }

        if dest_zone == ZoneKind::Graveyard {
            if let Some(from) = from_zone.filter(|z| *z != ZoneKind::Graveyard) {
                self.emit(GameEvent::CardToGrave {
                    card: card_id,
                    player: dest_player,
                    from_zone: from,
                });
            }
        }
    }

    /// Create a token and put it onto `owner`'s field
    pub fn create_token(
        &mut self,
        owner: PlayerId,
        spec: &TokenSpec,
        position: Position,
    ) -> std::result::Result<CardId, MoveRejection> {
        let has_room = self
            .get_player_zones(owner)
            .ok_or(MoveRejection::UnknownZone {
                player: owner,
                zone: ZoneKind::Field,
            })?
            .has_room(ZoneKind::Field);
        if !has_room {
            return Err(MoveRejection::ZoneFull {
                player: owner,
                zone: ZoneKind::Field,
            });
        }
        let token = self.new_token(owner, spec);
        let id = token.id;
        self.cards.insert(id, token);
        let options = MoveOptions::summon(SummonMethod::Special, position);
        self.arrive(id, None, owner, ZoneKind::Field, &options);
        self.logger
            .normal(&format!("{} token created for {owner}", spec.name));
        Ok(id)
    }

    /// Attach an equip in the spell/trap zone to a monster on the field
    ///
    /// Returns the bonus actually applied. Re-attaching an equip reverses
    /// its bonus on the previous host first.
    pub fn attach_equip(
        &mut self,
        equip: CardId,
        host: CardId,
        bonus: StatDelta,
        destroy_host_on_leave: bool,
    ) -> Result<StatDelta> {
        if !matches!(self.locate(equip), Some((_, ZoneKind::SpellTrap))) {
            return Err(DuelError::InvalidAction(format!(
                "equip {equip} is not in a spell/trap zone"
            )));
        }
        if !matches!(self.locate(host), Some((_, ZoneKind::Field))) {
            return Err(DuelError::InvalidAction(format!(
                "equip target {host} is not on the field"
            )));
        }
        if let Some(previous) = self.relations.detach(equip) {
            if let Ok(old_host) = self.cards.get_mut(previous.host) {
                old_host.reverse_delta(previous.bonus);
            }
        }
        let applied = self.cards.get_mut(host)?.apply_delta(bonus);
        self.relations.attach(
            equip,
            EquipLink {
                host,
                bonus: applied,
                destroy_host_on_leave,
            },
        );
        Ok(applied)
    }

    /// Bind a monster to a continuous trap: the monster goes when the trap goes
    pub fn bind_monster(&mut self, trap: CardId, monster: CardId) -> Result<()> {
        if !matches!(self.locate(trap), Some((_, ZoneKind::SpellTrap))) {
            return Err(DuelError::InvalidAction(format!(
                "{trap} is not in a spell/trap zone"
            )));
        }
        if !matches!(self.locate(monster), Some((_, ZoneKind::Field))) {
            return Err(DuelError::InvalidAction(format!(
                "{monster} is not on the field"
            )));
        }
        self.relations.bind(trap, monster);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Card, CardSubtype};
    use crate::game::DuelConfig;

    fn setup() -> (GameState, PlayerId, PlayerId) {
        let mut game = GameState::new_two_player("Alice", "Bob", DuelConfig::default());
        game.logger.enable_capture();
        let [p1, p2] = game.player_ids();
        (game, p1, p2)
    }

    fn monster_in(game: &mut GameState, owner: PlayerId, zone: ZoneKind, atk: i32) -> CardId {
        let id = game.next_card_id();
        game.add_card(Card::monster(id, format!("M{}", id.as_u32()), owner, 4, atk, 1000), zone)
            .unwrap();
        id
    }

    #[test]
    fn test_simple_move_updates_zones() {
        let (mut game, p1, _) = setup();
        let id = monster_in(&mut game, p1, ZoneKind::Hand, 1500);

        let summon = MoveOptions::summon(SummonMethod::Normal, Position::Attack);
        let moved = game.move_card(id, p1, ZoneKind::Field, summon).unwrap();
        assert_eq!(moved.from_zone, ZoneKind::Hand);
        assert_eq!(moved.to_zone, Some(ZoneKind::Field));
        assert_eq!(game.locate(id), Some((p1, ZoneKind::Field)));
        assert!(game.zone(p1, ZoneKind::Hand).is_empty());

        let card = game.card(id).unwrap();
        assert!(card.face_up);
        assert!(card.presence_id.is_some());
        assert_eq!(card.summoned_turn, Some(1));
        assert_eq!(game.journal.len(), 1);
    }

    #[test]
    fn test_full_zone_rejects_without_mutation() {
        let (mut game, p1, _) = setup();
        for _ in 0..5 {
            monster_in(&mut game, p1, ZoneKind::Field, 100);
        }
        let extra = monster_in(&mut game, p1, ZoneKind::Hand, 100);

        let err = game
            .move_card(extra, p1, ZoneKind::Field, MoveOptions::default())
            .unwrap_err();
        assert_eq!(err, MoveRejection::ZoneFull { player: p1, zone: ZoneKind::Field });
        assert_eq!(game.locate(extra), Some((p1, ZoneKind::Hand)));
        assert!(game.journal.is_empty());
    }

    #[test]
    fn test_spell_cannot_enter_monster_field() {
        let (mut game, p1, _) = setup();
        let id = game.next_card_id();
        game.add_card(Card::new(id, "Pot", CardKind::Spell, p1), ZoneKind::Hand)
            .unwrap();

        let err = game
            .move_card(id, p1, ZoneKind::Field, MoveOptions::default())
            .unwrap_err();
        assert!(matches!(err, MoveRejection::KindMismatch { .. }));
        assert_eq!(game.locate(id), Some((p1, ZoneKind::Hand)));
        assert_eq!(game.logger.logs_in("engine_fault").len(), 1);
    }

    #[test]
    fn test_duplicate_holding_is_refused() {
        let (mut game, p1, p2) = setup();
        let id = monster_in(&mut game, p1, ZoneKind::Hand, 100);
        // corrupt the state on purpose
        game.get_player_zones_mut(p2).unwrap().graveyard.add(id);

        let err = game
            .move_card(id, p1, ZoneKind::Banished, MoveOptions::default())
            .unwrap_err();
        assert!(matches!(err, MoveRejection::InvariantBreach(_)));
        assert_eq!(game.holdings(id).len(), 2);
    }

    #[test]
    fn test_leaving_field_resets_stats_and_flags() {
        let (mut game, p1, _) = setup();
        let id = monster_in(&mut game, p1, ZoneKind::Field, 1000);
        {
            let card = game.card_mut(id).unwrap();
            card.add_temp_boost(StatDelta::new(300, 0));
            card.add_permanent_buff("Aura", StatDelta::new(200, 200));
            card.add_counter(CounterKind::summons_seen(), 2);
            card.flags.attacks_made = 1;
        }

        game.move_card(id, p1, ZoneKind::Hand, MoveOptions::default())
            .unwrap();
        let card = game.card(id).unwrap();
        assert_eq!(card.stats(), StatDelta::new(1000, 1000));
        assert!(card.permanent_buffs.is_empty());
        assert!(card.counters.is_empty());
        assert_eq!(card.flags, TurnFlags::default());
        assert_eq!(card.presence_id, None);
        assert!(!card.face_up);
    }

    #[test]
    fn test_token_leaving_field_is_removed() {
        let (mut game, p1, _) = setup();
        let spec = TokenSpec {
            name: "Sheep".into(),
            atk: 0,
            def: 0,
            level: 1,
            monster_type: None,
        };
        let token = game.create_token(p1, &spec, Position::Defense).unwrap();
        assert_eq!(game.locate(token), Some((p1, ZoneKind::Field)));

        let moved = game.destroy_card(token).unwrap();
        assert!(moved.token_removed);
        assert_eq!(moved.to_zone, None);
        assert!(!game.cards.contains(token));
        assert!(game.holdings(token).is_empty());
        assert!(game
            .events()
            .iter()
            .any(|e| *e == GameEvent::TokenRemoved { card: token }));
    }

    #[test]
    fn test_extra_deck_monster_redirected() {
        let (mut game, p1, p2) = setup();
        let id = monster_in(&mut game, p1, ZoneKind::Field, 2500);
        game.card_mut(id).unwrap().extra_deck = true;

        let moved = game
            .move_card(id, p2, ZoneKind::Hand, MoveOptions::default())
            .unwrap();
        assert!(moved.redirected);
        assert_eq!(game.locate(id), Some((p1, ZoneKind::ExtraDeck)));
    }

    #[test]
    fn test_field_spell_replacement_evicts_old() {
        let (mut game, p1, _) = setup();
        let old = game.next_card_id();
        let mut card = Card::new(old, "Old Field", CardKind::Spell, p1);
        card.subtype = Some(CardSubtype::Field);
        game.add_card(card, ZoneKind::FieldSpell).unwrap();
        let new = game.next_card_id();
        let mut card = Card::new(new, "New Field", CardKind::Spell, p1);
        card.subtype = Some(CardSubtype::Field);
        game.add_card(card, ZoneKind::Hand).unwrap();

        game.move_card(new, p1, ZoneKind::FieldSpell, MoveOptions::default())
            .unwrap();
        assert_eq!(game.get_player_zones(p1).unwrap().field_spell, Some(new));
        assert_eq!(game.locate(old), Some((p1, ZoneKind::Graveyard)));
    }

    #[test]
    fn test_arrival_counts_summons_and_special_types() {
        let (mut game, p1, p2) = setup();
        let watcher = monster_in(&mut game, p2, ZoneKind::Field, 100);
        let id = game.next_card_id();
        let mut dragon = Card::monster(id, "Dragon", p1, 8, 3000, 2500);
        dragon.monster_types.push("Dragon".into());
        game.add_card(dragon, ZoneKind::Graveyard).unwrap();

        let summon = MoveOptions::summon(SummonMethod::Special, Position::Attack);
        game.move_card(id, p1, ZoneKind::Field, summon).unwrap();
        assert_eq!(game.card(watcher).unwrap().counter(&CounterKind::summons_seen()), 1);
        let dragons = crate::core::MonsterType::new("Dragon");
        assert_eq!(game.special_summons_by_type.get(&dragons), Some(&1));
    }

    #[test]
    fn test_set_does_not_announce_summon() {
        let (mut game, p1, _) = setup();
        let id = monster_in(&mut game, p1, ZoneKind::Hand, 100);
        game.move_card(id, p1, ZoneKind::Field, MoveOptions::default().face_down())
            .unwrap();

        let card = game.card(id).unwrap();
        assert!(!card.face_up);
        assert_eq!(card.position, Position::Defense);
        assert_eq!(card.set_turn, Some(1));
        assert!(game.events().is_empty());
    }
}
