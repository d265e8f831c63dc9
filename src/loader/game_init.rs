//! Game initialization from deck lists
//!
//! Creates card instances from the database, routes extra-deck monsters,
//! shuffles with the duel RNG and draws opening hands.

use crate::core::PlayerId;
use crate::game::{DuelConfig, GameState};
use crate::loader::CardDatabase;
use crate::zones::ZoneKind;
use crate::{DuelError, Result};
use serde::{Deserialize, Serialize};

/// A card named in a deck list, by database id or by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CardRef {
    Id(u32),
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckEntry {
    pub card: CardRef,
    #[serde(default = "one")]
    pub count: u8,
}

fn one() -> u8 {
    1
}

/// A deck list; extra-deck cards may be listed with the rest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckList {
    pub cards: Vec<DeckEntry>,
}

impl DeckList {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn push(&mut self, card: CardRef, count: u8) {
        self.cards.push(DeckEntry { card, count });
    }

    pub fn total(&self) -> usize {
        self.cards.iter().map(|e| e.count as usize).sum()
    }
}

/// Game builder for initializing duels from deck lists
pub struct GameInitializer<'a> {
    card_db: &'a CardDatabase,
}

impl<'a> GameInitializer<'a> {
    pub fn new(card_db: &'a CardDatabase) -> Self {
        GameInitializer { card_db }
    }

    /// Set up a two-player duel: decks loaded and shuffled, opening hands drawn
    pub fn init_game(
        &self,
        player1: (&str, &DeckList),
        player2: (&str, &DeckList),
        config: DuelConfig,
    ) -> Result<GameState> {
        config.validate()?;
        let hand = config.starting_hand;
        let mut game = GameState::new_two_player(player1.0, player2.0, config);
        let [p1, p2] = game.player_ids();

        self.load_deck_into_game(&mut game, p1, player1.1)?;
        self.load_deck_into_game(&mut game, p2, player2.1)?;

        for player in [p1, p2] {
            game.shuffle_deck(player);
            game.draw_cards(player, hand);
        }
        // Opening draws are setup, not events effects react to
        game.drain_events();
        Ok(game)
    }

    /// Instantiate every card of a deck list into the player's deck or extra deck
    pub fn load_deck_into_game(
        &self,
        game: &mut GameState,
        player_id: PlayerId,
        deck: &DeckList,
    ) -> Result<()> {
        for entry in &deck.cards {
            let card_def = match &entry.card {
                CardRef::Id(id) => self.card_db.get(*id),
                CardRef::Name(name) => self.card_db.get_by_name(name),
            }
            .ok_or_else(|| {
                DuelError::InvalidCardFormat(format!(
                    "Card not found in database: {:?}",
                    entry.card
                ))
            })?;

            let zone = if card_def.extra_deck {
                ZoneKind::ExtraDeck
            } else {
                ZoneKind::Deck
            };
            for _ in 0..entry.count {
                let card_id = game.next_card_id();
                game.add_card(card_def.instantiate(card_id, player_id), zone)?;
            }
        }
        Ok(())
    }
}
