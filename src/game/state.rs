//! Main game state structure

use crate::core::{
    Card, CardId, CardKind, EntityId, EntityStore, MonsterType, Player, PlayerId, Position, Side,
    TokenSpec,
};
use crate::game::hooks::{FaultInjector, ZoneOpHook};
use crate::game::relations::Relations;
use crate::game::{DuelConfig, GameEvent, GameLogger};
use crate::undo::MoveJournal;
use crate::zones::{PlayerZones, ZoneKind};
use crate::{DuelError, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use rustc_hash::FxHashMap;
use smallvec::{smallvec, SmallVec};
use std::cell::RefCell;
use std::collections::VecDeque;

/// Follow-up operation issued by a cleanup pass
///
/// Queued rather than executed inline. The cross-reference that caused it
/// has already been cleared when it is queued, so a re-entrant cleanup can
/// never find the same link again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecondaryOp {
    Destroy { card: CardId, cause: CardId },
}

/// Complete duel state
///
/// Holds every card, both players, their zones, and the engine-owned
/// relation table. All zone mutation goes through `move_card`.
pub struct GameState {
    /// All cards in the game
    pub cards: EntityStore<Card>,

    /// Both players (Vec for stable ordering)
    pub players: Vec<Player>,

    /// Zones for each player
    pub player_zones: Vec<(PlayerId, PlayerZones)>,

    /// Monotonic turn counter, starts at 1
    pub turn_counter: u32,

    pub active_player: PlayerId,

    pub config: DuelConfig,

    /// Special summons performed this duel, per monster type
    pub special_summons_by_type: FxHashMap<MonsterType, u32>,

    /// Gameplay RNG (deck shuffles). RefCell so read-only views can draw.
    pub rng: RefCell<ChaCha12Rng>,

    pub journal: MoveJournal,

    pub logger: GameLogger,

    pub(crate) relations: Relations,
    pub(crate) pending: VecDeque<SecondaryOp>,
    pub(crate) draining: bool,
    pub(crate) hooks: Vec<Box<dyn ZoneOpHook>>,
    pub(crate) next_presence_id: u64,
    events: Vec<GameEvent>,
    next_entity_id: u32,
}

impl GameState {
    /// Create a new duel with two players
    pub fn new_two_player(player1_name: &str, player2_name: &str, config: DuelConfig) -> Self {
        let p1_id = PlayerId::new(0);
        let p2_id = PlayerId::new(1);

        let players = vec![
            Player::new(p1_id, player1_name, config.starting_lp),
            Player::new(p2_id, player2_name, config.starting_lp),
        ];
        let player_zones = vec![
            (
                p1_id,
                PlayerZones::new(p1_id, config.field_capacity, config.spell_trap_capacity),
            ),
            (
                p2_id,
                PlayerZones::new(p2_id, config.field_capacity, config.spell_trap_capacity),
            ),
        ];

        let mut hooks: Vec<Box<dyn ZoneOpHook>> = Vec::new();
        if config.diagnostics.enabled {
            if let Some(every) = config.diagnostics.fail_move_every {
                hooks.push(Box::new(FaultInjector::new(every)));
            }
        }

        let mut logger = GameLogger::with_verbosity(config.verbosity);
        logger.set_format(config.log_format);

        GameState {
            cards: EntityStore::new(),
            players,
            player_zones,
            turn_counter: 1,
            active_player: p1_id,
            special_summons_by_type: FxHashMap::default(),
            rng: RefCell::new(ChaCha12Rng::seed_from_u64(config.seed)),
            journal: MoveJournal::new(),
            logger,
            relations: Relations::new(),
            pending: VecDeque::new(),
            draining: false,
            hooks,
            next_presence_id: 1,
            events: Vec::new(),
            next_entity_id: 2,
            config,
        }
    }

    /// Reseed the gameplay RNG
    pub fn seed_rng(&mut self, seed: u64) {
        *self.rng.borrow_mut() = ChaCha12Rng::seed_from_u64(seed);
    }

    /// Next entity ID (shared counter across entity types)
    pub fn next_id<T>(&mut self) -> EntityId<T> {
        let id = EntityId::new(self.next_entity_id);
        self.next_entity_id += 1;
        id
    }

    pub fn next_card_id(&mut self) -> CardId {
        self.next_id()
    }

    pub fn player_ids(&self) -> [PlayerId; 2] {
        [self.players[0].id, self.players[1].id]
    }

    pub fn get_player(&self, id: PlayerId) -> Result<&Player> {
        self.players
            .iter()
            .find(|p| p.id == id)
            .ok_or(DuelError::EntityNotFound(id.as_u32()))
    }

    pub fn get_player_mut(&mut self, id: PlayerId) -> Result<&mut Player> {
        self.players
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(DuelError::EntityNotFound(id.as_u32()))
    }

    /// The other player of a two-player duel
    pub fn opponent(&self, player: PlayerId) -> PlayerId {
        self.players
            .iter()
            .map(|p| p.id)
            .find(|id| *id != player)
            .unwrap_or(player)
    }

    /// Players covered by `side`, seen from `player`
    pub fn side_players(&self, player: PlayerId, side: Side) -> SmallVec<[PlayerId; 2]> {
        match side {
            Side::Own => smallvec![player],
            Side::Opponent => smallvec![self.opponent(player)],
            Side::Both => smallvec![player, self.opponent(player)],
        }
    }

    pub fn get_player_zones(&self, player_id: PlayerId) -> Option<&PlayerZones> {
        self.player_zones
            .iter()
            .find(|(id, _)| *id == player_id)
            .map(|(_, zones)| zones)
    }

    pub fn get_player_zones_mut(&mut self, player_id: PlayerId) -> Option<&mut PlayerZones> {
        self.player_zones
            .iter_mut()
            .find(|(id, _)| *id == player_id)
            .map(|(_, zones)| zones)
    }

    /// Cards in one of a player's zones, in zone order
    pub fn zone(&self, player: PlayerId, zone: ZoneKind) -> &[CardId] {
        self.get_player_zones(player)
            .map(|z| z.cards(zone))
            .unwrap_or(&[])
    }

    pub fn card(&self, id: CardId) -> Result<&Card> {
        self.cards.get(id)
    }

    pub fn card_mut(&mut self, id: CardId) -> Result<&mut Card> {
        self.cards.get_mut(id)
    }

    /// Every (player, zone) holding the card, in scan order
    pub fn holdings(&self, card: CardId) -> Vec<(PlayerId, ZoneKind)> {
        self.player_zones
            .iter()
            .flat_map(|(pid, zones)| zones.zones_holding(card).map(move |z| (*pid, z)))
            .collect()
    }

    /// Where the card currently is
    pub fn locate(&self, card: CardId) -> Option<(PlayerId, ZoneKind)> {
        ZoneKind::SCAN_ORDER.into_iter().find_map(|zone| {
            self.player_zones
                .iter()
                .find(|(_, zones)| zones.contains(zone, card))
                .map(|(pid, _)| (*pid, zone))
        })
    }

    /// Face-up or face-down monsters on both fields, player 1 first
    pub fn monsters_on_field(&self) -> Vec<CardId> {
        self.player_zones
            .iter()
            .flat_map(|(_, zones)| zones.field.cards.iter().copied())
            .collect()
    }

    /// Put a freshly created card straight into a zone (duel setup)
    ///
    /// Bypasses the transition engine; monsters placed on the field still
    /// get a presence id and face-up attack position.
    pub fn add_card(&mut self, mut card: Card, zone: ZoneKind) -> Result<CardId> {
        let id = card.id;
        let owner = card.owner;
        if zone == ZoneKind::Field {
            if !card.is_monster() {
                return Err(DuelError::InvalidAction(format!(
                    "{} is not a monster and cannot be placed on the field",
                    card.name
                )));
            }
            card.face_up = true;
            card.presence_id = Some(self.next_presence_id);
            self.next_presence_id += 1;
            card.entered_field_turn = Some(self.turn_counter);
        }
        if zone == ZoneKind::SpellTrap || zone == ZoneKind::FieldSpell {
            card.face_up = true;
        }

        let zones = self
            .get_player_zones_mut(owner)
            .ok_or(DuelError::EntityNotFound(owner.as_u32()))?;
        match zone {
            ZoneKind::FieldSpell => {
                if zones.field_spell.is_some() {
                    return Err(DuelError::InvalidAction("field spell slot occupied".to_string()));
                }
                zones.field_spell = Some(id);
            }
            other => {
                let container = zones
                    .get_zone_mut(other)
                    .ok_or_else(|| DuelError::InvalidAction(format!("no container for {other}")))?;
                if container.is_full() {
                    return Err(DuelError::InvalidAction(format!("{other} is full")));
                }
                container.add(id);
            }
        }
        self.cards.insert(id, card);
        Ok(id)
    }

    /// Build a token card (not yet in any zone)
    pub fn new_token(&mut self, owner: PlayerId, spec: &TokenSpec) -> Card {
        let id = self.next_card_id();
        let mut card = Card::monster(id, spec.name.clone(), owner, spec.level, spec.atk, spec.def);
        card.is_token = true;
        if let Some(t) = &spec.monster_type {
            card.monster_types.push(t.clone());
        }
        card
    }

    /// Buffer an event for the orchestrator
    pub fn emit(&mut self, event: GameEvent) {
        #[cfg(feature = "verbose-logging")]
        self.logger.event("event", &format!("{event:?}"));
        self.events.push(event);
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn add_hook(&mut self, hook: Box<dyn ZoneOpHook>) {
        self.hooks.push(hook);
    }

    /// Read-only view of the equip/binding table
    pub fn relations(&self) -> &Relations {
        &self.relations
    }

    pub fn pending_secondary(&self) -> usize {
        self.pending.len()
    }

    /// Draw up to `count` cards from the top of the deck
    pub fn draw_cards(&mut self, player: PlayerId, count: usize) -> Vec<CardId> {
        let mut drawn = Vec::with_capacity(count);
        for _ in 0..count {
            let Some(top) = self
                .get_player_zones(player)
                .and_then(|z| z.deck.peek_top())
            else {
                break;
            };
            let options = crate::game::MoveOptions {
                preferred_zone: Some(ZoneKind::Deck),
                reason: crate::game::MoveReason::Draw,
                ..Default::default()
            };
            if self.move_card(top, player, ZoneKind::Hand, options).is_ok() {
                drawn.push(top);
                self.emit(GameEvent::CardDrawn { card: top, player });
            } else {
                break;
            }
        }
        drawn
    }

    /// Shuffle a player's deck with the duel RNG
    pub fn shuffle_deck(&mut self, player: PlayerId) {
        use rand::seq::SliceRandom;
        if let Some(zones) = self
            .player_zones
            .iter_mut()
            .find(|(id, _)| *id == player)
            .map(|(_, z)| z)
        {
            zones.deck.cards.shuffle(&mut *self.rng.borrow_mut());
        }
    }

    /// End the current turn
    ///
    /// Expires end-of-turn grants on both fields and advances the counter.
    /// Once-per-turn ledgers need no reset: they compare against the counter.
    pub fn end_turn(&mut self) {
        let on_field: Vec<CardId> = self
            .player_zones
            .iter()
            .flat_map(|(_, z)| z.field.cards.iter().chain(z.spell_trap.cards.iter()).copied())
            .collect();
        for id in on_field {
            if let Ok(card) = self.cards.get_mut(id) {
                card.clear_temp_boost();
                card.protections
                    .retain(|p| p.duration != crate::core::Duration::EndOfTurn);
                card.flags.attacks_made = 0;
                card.flags.summoned_this_turn = false;
                card.flags.set_this_turn = false;
                card.flags.position_changed = false;
                if !card.flags.extra_attacks_permanent {
                    card.flags.extra_attacks = 0;
                }
            }
        }
        self.turn_counter += 1;
        self.active_player = self.opponent(self.active_player);
        self.logger.set_turn(self.turn_counter);
        self.logger
            .normal(&format!("Turn {} begins", self.turn_counter));
    }

    /// Count cards in a zone matching a predicate
    pub fn count_in_zone(
        &self,
        player: PlayerId,
        zone: ZoneKind,
        pred: impl Fn(&Card) -> bool,
    ) -> usize {
        self.zone(player, zone)
            .iter()
            .filter_map(|id| self.cards.get(*id).ok())
            .filter(|c| pred(c))
            .count()
    }

    /// Default summon position for a monster: the better stat faces out
    pub fn preferred_position(&self, card: CardId) -> Position {
        match self.cards.get(card) {
            Ok(c) if c.kind == CardKind::Monster && c.def > c.atk => Position::Defense,
            _ => Position::Attack,
        }
    }
}

impl std::fmt::Debug for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameState")
            .field("turn_counter", &self.turn_counter)
            .field("players", &self.players)
            .field("player_zones", &self.player_zones)
            .field("cards", &self.cards.len())
            .field("pending", &self.pending)
            .finish()
    }
}
