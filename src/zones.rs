//! Game zones (Hand, Deck, Field, Graveyard, etc.)

use crate::core::{CardId, PlayerId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Different zones where cards can exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ZoneKind {
    Hand,
    Deck,
    /// Monster zones
    Field,
    Graveyard,
    SpellTrap,
    /// Singleton field spell slot
    FieldSpell,
    Banished,
    ExtraDeck,
}

impl ZoneKind {
    /// Order in which zones are scanned when locating a card
    pub const SCAN_ORDER: [ZoneKind; 8] = [
        ZoneKind::Field,
        ZoneKind::SpellTrap,
        ZoneKind::FieldSpell,
        ZoneKind::Hand,
        ZoneKind::Graveyard,
        ZoneKind::Banished,
        ZoneKind::Deck,
        ZoneKind::ExtraDeck,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneKind::Hand => "hand",
            ZoneKind::Deck => "deck",
            ZoneKind::Field => "field",
            ZoneKind::Graveyard => "graveyard",
            ZoneKind::SpellTrap => "spellTrap",
            ZoneKind::FieldSpell => "fieldSpell",
            ZoneKind::Banished => "banished",
            ZoneKind::ExtraDeck => "extraDeck",
        }
    }

    /// Zones that count as "on the field" for card effects
    pub fn is_on_field(&self) -> bool {
        matches!(self, ZoneKind::Field | ZoneKind::SpellTrap | ZoneKind::FieldSpell)
    }
}

impl fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where in an ordered zone a card is inserted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZonePosition {
    /// Top of the zone (end of the vector; draws come from here)
    #[default]
    Top,
    Bottom,
}

/// A zone containing cards (ordered for Deck/Graveyard, unordered for others)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardZone {
    /// Zone type
    pub zone_type: ZoneKind,

    /// Owner of this zone (each player has their own zones)
    pub owner: PlayerId,

    /// Maximum number of cards, if bounded
    pub capacity: Option<usize>,

    /// Cards in this zone (order matters for Deck and Graveyard)
    pub cards: Vec<CardId>,
}

impl CardZone {
    pub fn new(zone_type: ZoneKind, owner: PlayerId) -> Self {
        CardZone {
            zone_type,
            owner,
            capacity: None,
            cards: Vec::new(),
        }
    }

    pub fn with_capacity(zone_type: ZoneKind, owner: PlayerId, capacity: usize) -> Self {
        CardZone {
            capacity: Some(capacity),
            ..CardZone::new(zone_type, owner)
        }
    }

    pub fn add(&mut self, card_id: CardId) {
        self.cards.push(card_id);
    }

    pub fn insert(&mut self, card_id: CardId, position: ZonePosition) {
        match position {
            ZonePosition::Top => self.cards.push(card_id),
            ZonePosition::Bottom => self.cards.insert(0, card_id),
        }
    }

    pub fn remove(&mut self, card_id: CardId) -> bool {
        if let Some(pos) = self.cards.iter().position(|&id| id == card_id) {
            // remove() rather than swap_remove(): iteration order must stay
            // stable because candidate lists are returned in zone order.
            self.cards.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, card_id: CardId) -> bool {
        self.cards.contains(&card_id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.capacity.is_some_and(|cap| self.cards.len() >= cap)
    }

    /// Draw from top (for Deck)
    pub fn draw_top(&mut self) -> Option<CardId> {
        self.cards.pop()
    }

    /// Look at top card without removing it
    pub fn peek_top(&self) -> Option<CardId> {
        self.cards.last().copied()
    }

    /// Shuffle the zone (for Deck)
    pub fn shuffle(&mut self, rng: &mut impl rand::Rng) {
        use rand::seq::SliceRandom;
        self.cards.shuffle(rng);
    }
}

/// Collection of all zones for a player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerZones {
    pub hand: CardZone,
    pub deck: CardZone,
    pub field: CardZone,
    pub graveyard: CardZone,
    pub spell_trap: CardZone,
    pub banished: CardZone,
    pub extra_deck: CardZone,
    /// Singleton slot; at most one card
    pub field_spell: Option<CardId>,
}

impl PlayerZones {
    pub fn new(player_id: PlayerId, field_capacity: usize, spell_trap_capacity: usize) -> Self {
        PlayerZones {
            hand: CardZone::new(ZoneKind::Hand, player_id),
            deck: CardZone::new(ZoneKind::Deck, player_id),
            field: CardZone::with_capacity(ZoneKind::Field, player_id, field_capacity),
            graveyard: CardZone::new(ZoneKind::Graveyard, player_id),
            spell_trap: CardZone::with_capacity(
                ZoneKind::SpellTrap,
                player_id,
                spell_trap_capacity,
            ),
            banished: CardZone::new(ZoneKind::Banished, player_id),
            extra_deck: CardZone::new(ZoneKind::ExtraDeck, player_id),
            field_spell: None,
        }
    }

    /// The container for a zone; `None` for the singleton slot
    pub fn get_zone(&self, zone: ZoneKind) -> Option<&CardZone> {
        match zone {
            ZoneKind::Hand => Some(&self.hand),
            ZoneKind::Deck => Some(&self.deck),
            ZoneKind::Field => Some(&self.field),
            ZoneKind::Graveyard => Some(&self.graveyard),
            ZoneKind::SpellTrap => Some(&self.spell_trap),
            ZoneKind::Banished => Some(&self.banished),
            ZoneKind::ExtraDeck => Some(&self.extra_deck),
            ZoneKind::FieldSpell => None,
        }
    }

    pub fn get_zone_mut(&mut self, zone: ZoneKind) -> Option<&mut CardZone> {
        match zone {
            ZoneKind::Hand => Some(&mut self.hand),
            ZoneKind::Deck => Some(&mut self.deck),
            ZoneKind::Field => Some(&mut self.field),
            ZoneKind::Graveyard => Some(&mut self.graveyard),
            ZoneKind::SpellTrap => Some(&mut self.spell_trap),
            ZoneKind::Banished => Some(&mut self.banished),
            ZoneKind::ExtraDeck => Some(&mut self.extra_deck),
            ZoneKind::FieldSpell => None,
        }
    }

    /// Cards in a zone as a slice, the singleton slot included
    pub fn cards(&self, zone: ZoneKind) -> &[CardId] {
        match zone {
            ZoneKind::FieldSpell => self.field_spell.as_slice(),
            other => self
                .get_zone(other)
                .map(|z| z.cards.as_slice())
                .unwrap_or(&[]),
        }
    }

    pub fn contains(&self, zone: ZoneKind, card_id: CardId) -> bool {
        self.cards(zone).contains(&card_id)
    }

    /// Remove a card from one zone; true if it was there
    pub fn remove(&mut self, zone: ZoneKind, card_id: CardId) -> bool {
        match zone {
            ZoneKind::FieldSpell => {
                if self.field_spell == Some(card_id) {
                    self.field_spell = None;
                    true
                } else {
                    false
                }
            }
            other => self
                .get_zone_mut(other)
                .map(|z| z.remove(card_id))
                .unwrap_or(false),
        }
    }

    /// Every zone currently holding `card_id`
    pub fn zones_holding(&self, card_id: CardId) -> impl Iterator<Item = ZoneKind> + '_ {
        ZoneKind::SCAN_ORDER
            .into_iter()
            .filter(move |zone| self.contains(*zone, card_id))
    }

    pub fn has_room(&self, zone: ZoneKind) -> bool {
        match zone {
            ZoneKind::FieldSpell => true,
            other => self.get_zone(other).map(|z| !z.is_full()).unwrap_or(false),
        }
    }
}
