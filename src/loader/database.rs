//! Card database for looking up card definitions
//!
//! Provides lookup of validated card definitions by id and by name

use crate::actions::ActionRegistry;
use crate::core::{
    Archetype, Card, CardId, CardKind, CardName, CardSubtype, EffectDescriptor, MonsterType,
    PlayerId,
};
use crate::loader::validate::{validate_database, ValidationReport};
use crate::{DuelError, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

/// One card record of the database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDefinition {
    pub id: u32,
    pub name: CardName,
    pub card_kind: CardKind,
    #[serde(default)]
    pub subtype: Option<CardSubtype>,
    #[serde(default)]
    pub types: Vec<MonsterType>,
    #[serde(default)]
    pub archetypes: Vec<Archetype>,
    #[serde(default)]
    pub atk: i32,
    #[serde(default)]
    pub def: i32,
    #[serde(default)]
    pub level: u8,
    #[serde(default)]
    pub extra_deck: bool,
    #[serde(default = "no_effects")]
    pub effects: Arc<[EffectDescriptor]>,
}

fn no_effects() -> Arc<[EffectDescriptor]> {
    Arc::from(Vec::new())
}

impl CardDefinition {
    /// Create a card instance owned by `owner`
    pub fn instantiate(&self, id: CardId, owner: PlayerId) -> Card {
        let mut card = match self.card_kind {
            CardKind::Monster => {
                Card::monster(id, self.name.clone(), owner, self.level, self.atk, self.def)
            }
            kind => Card::new(id, self.name.clone(), kind, owner),
        };
        card.db_id = self.id;
        card.subtype = self.subtype;
        card.monster_types = self.types.iter().cloned().collect();
        card.archetypes = self.archetypes.iter().cloned().collect();
        card.extra_deck = self.extra_deck;
        card.effects = Arc::clone(&self.effects);
        card
    }
}

/// Database of validated card definitions
#[derive(Debug, Clone, Default)]
pub struct CardDatabase {
    cards: FxHashMap<u32, Arc<CardDefinition>>,
    /// Lowercased name -> id
    names: FxHashMap<String, u32>,
    report: ValidationReport,
}

impl CardDatabase {
    /// Create an empty database
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a raw JSON database and compile it
    ///
    /// Validation errors are returned as `DuelError::Validation`; warnings
    /// are kept and available through `report()`.
    pub fn from_value(raw: Value, registry: &ActionRegistry) -> Result<Self> {
        let report = validate_database(&raw, &registry.list_types());
        if report.has_errors() {
            return Err(DuelError::Validation(report));
        }
        let definitions: Vec<CardDefinition> = serde_json::from_value(raw)?;
        let mut db = CardDatabase::from_definitions(definitions);
        db.report = report;
        Ok(db)
    }

    pub fn from_json_str(json: &str, registry: &ActionRegistry) -> Result<Self> {
        Self::from_value(serde_json::from_str(json)?, registry)
    }

    pub fn load_from_file(path: &Path, registry: &ActionRegistry) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents, registry)
    }

    /// Index already-deserialized definitions without validation
    pub fn from_definitions(definitions: impl IntoIterator<Item = CardDefinition>) -> Self {
        let mut db = CardDatabase::new();
        for definition in definitions {
            db.add_card(definition);
        }
        db
    }

    /// Add a single card definition; a later definition replaces an earlier one
    pub fn add_card(&mut self, card_def: CardDefinition) {
        self.names.insert(card_def.name.as_str().to_lowercase(), card_def.id);
        self.cards.insert(card_def.id, Arc::new(card_def));
    }

    pub fn get(&self, id: u32) -> Option<&Arc<CardDefinition>> {
        self.cards.get(&id)
    }

    /// Look up a card by name (case-insensitive)
    pub fn get_by_name(&self, name: &str) -> Option<&Arc<CardDefinition>> {
        let id = self.names.get(&name.to_lowercase())?;
        self.cards.get(id)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(&name.to_lowercase())
    }

    /// Warnings collected while loading
    pub fn report(&self) -> &ValidationReport {
        &self.report
    }

    /// Definitions in ascending id order
    pub fn definitions(&self) -> Vec<&Arc<CardDefinition>> {
        let mut defs: Vec<_> = self.cards.values().collect();
        defs.sort_by_key(|d| d.id);
        defs
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ActionKind, Timing};

    const DB: &str = r#"[
        {"id": 10, "name": "Blue Drake", "cardKind": "monster", "types": ["Dragon"],
         "archetypes": ["Drake"], "atk": 1800, "def": 1200, "level": 4},
        {"id": 11, "name": "Drake Sovereign", "cardKind": "monster", "types": ["Dragon"],
         "atk": 3000, "def": 2500, "level": 8, "extraDeck": true},
        {"id": 20, "name": "Drake Lance", "cardKind": "spell", "subtype": "equip", "effects": [
            {"timing": "on_play", "actions": [{"type": "equip", "atk": 500}]}
        ]},
        {"id": 30, "name": "Odd Omen", "cardKind": "trap", "effects": [
            {"timing": "on_event", "event": "moon_rises", "actions": [{"type": "draw"}]}
        ]}
    ]"#;

    #[test]
    fn test_empty_database() {
        let db = CardDatabase::new();
        assert_eq!(db.len(), 0);
        assert!(db.is_empty());
        assert!(db.get_by_name("Blue Drake").is_none());
    }

    #[test]
    fn test_load_and_lookup() {
        let db = CardDatabase::from_json_str(DB, &ActionRegistry::with_builtins()).unwrap();
        assert_eq!(db.len(), 4);
        assert!(db.contains("blue drake"));
        assert_eq!(db.get_by_name("DRAKE LANCE").unwrap().id, 20);
        assert!(db.get(11).unwrap().extra_deck);

        let lance = db.get(20).unwrap();
        assert_eq!(lance.subtype, Some(CardSubtype::Equip));
        assert_eq!(lance.effects[0].timing, Timing::OnPlay);
        assert_eq!(lance.effects[0].actions[0].kind, ActionKind::Equip);

        // Unknown event survives as a warning and is dropped from the effect
        assert_eq!(db.report().warnings().count(), 1);
        assert_eq!(db.get(30).unwrap().effects[0].event, None);
    }

    #[test]
    fn test_validation_errors_block_loading() {
        let json = r#"[{"id": 1, "name": "A", "cardKind": "monster"},
                       {"id": 1, "name": "B", "cardKind": "monster"}]"#;
        match CardDatabase::from_json_str(json, &ActionRegistry::with_builtins()) {
            Err(DuelError::Validation(report)) => assert_eq!(report.errors().count(), 1),
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_instantiate_copies_definition() {
        let db = CardDatabase::from_json_str(DB, &ActionRegistry::with_builtins()).unwrap();
        let card = db.get(10).unwrap().instantiate(CardId::new(99), PlayerId::new(0));
        assert_eq!(card.db_id, 10);
        assert_eq!((card.atk, card.def, card.level), (1800, 1200, 4));
        assert!(card.has_type(&MonsterType::new("Dragon")));
        assert!(card.has_archetype(&Archetype::new("Drake")));
        assert!(!card.face_up);
    }
}
