//! Static card database validation
//!
//! Runs over the raw JSON before anything is deserialized, so every
//! problem in a database is reported at once instead of the first serde
//! error. Errors block loading; warnings are informational.

use crate::core::{ActionKind, Timing, TriggerEvent};
use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::{Map, Value};
use std::fmt;

/// Card record fields that were renamed: (old, replacement)
const DEPRECATED_CARD_FIELDS: &[(&str, &str)] = &[
    ("type", "types"),
    ("archetype", "archetypes"),
    ("attack", "atk"),
    ("defense", "def"),
    ("extra_deck", "extraDeck"),
];

const DEPRECATED_EFFECT_FIELDS: &[(&str, &str)] = &[
    ("trigger", "event"),
    ("oncePerTurnName", "id"),
    ("effects", "actions"),
];

const DEPRECATED_ACTION_FIELDS: &[(&str, &str)] = &[
    ("target", "targetRef"),
    ("zone", "from"),
    ("cardCount", "count"),
];

const CARD_KINDS: [&str; 3] = ["monster", "spell", "trap"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub severity: Severity,
    /// Index of the record in the database array
    pub record: usize,
    pub card_id: Option<i64>,
    pub card_name: Option<String>,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{label}: record #{}", self.record)?;
        if let Some(id) = self.card_id {
            write!(f, " (id {id}")?;
            if let Some(name) = &self.card_name {
                write!(f, ", \"{name}\"")?;
            }
            write!(f, ")")?;
        }
        write!(f, ": {}", self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for issue in &self.issues {
            writeln!(f, "{issue}")?;
        }
        write!(
            f,
            "{} error(s), {} warning(s)",
            self.errors().count(),
            self.warnings().count()
        )
    }
}

/// Per-record context for issue reporting
struct Record<'a> {
    index: usize,
    id: Option<i64>,
    name: Option<&'a str>,
}

struct Validator<'a> {
    registered: &'a [ActionKind],
    report: ValidationReport,
}

impl<'a> Validator<'a> {
    fn push(&mut self, record: &Record<'_>, severity: Severity, message: String) {
        self.report.issues.push(ValidationIssue {
            severity,
            record: record.index,
            card_id: record.id,
            card_name: record.name.map(str::to_string),
            message,
        });
    }

    fn deprecated(
        &mut self,
        record: &Record<'_>,
        object: &Map<String, Value>,
        table: &[(&str, &str)],
        what: &str,
    ) {
        for (old, new) in table {
            if object.contains_key(*old) {
                self.push(
                    record,
                    Severity::Error,
                    format!("{what} uses deprecated field '{old}', use '{new}'"),
                );
            }
        }
    }

    fn card(&mut self, record: &Record<'_>, object: &Map<String, Value>) {
        match record.id {
            None => self.push(record, Severity::Error, "missing or non-integer id".to_string()),
            Some(id) if id <= 0 => {
                self.push(record, Severity::Error, format!("id must be positive, got {id}"))
            }
            Some(_) => {}
        }
        match object.get("name") {
            Some(Value::String(name)) if !name.trim().is_empty() => {}
            _ => self.push(record, Severity::Error, "missing or empty name".to_string()),
        }
        match object.get("cardKind").and_then(Value::as_str) {
            Some(kind) if CARD_KINDS.contains(&kind) => {}
            Some(kind) => self.push(record, Severity::Error, format!("unknown cardKind '{kind}'")),
            None => self.push(record, Severity::Error, "missing cardKind".to_string()),
        }
        self.deprecated(record, object, DEPRECATED_CARD_FIELDS, "card");

        match object.get("effects") {
            None | Some(Value::Null) => {}
            Some(Value::Array(effects)) => {
                for (i, effect) in effects.iter().enumerate() {
                    match effect.as_object() {
                        Some(effect) => self.effect(record, i, effect),
                        None => {
                            let message = format!("effect {i} is not an object");
                            self.push(record, Severity::Error, message)
                        }
                    }
                }
            }
            Some(_) => self.push(record, Severity::Error, "effects must be an array".to_string()),
        }
    }

    fn effect(&mut self, record: &Record<'_>, index: usize, effect: &Map<String, Value>) {
        let timing = match effect.get("timing").and_then(Value::as_str) {
            Some(raw) => match raw.parse::<Timing>() {
                Ok(timing) => Some(timing),
                Err(e) => {
                    self.push(record, Severity::Error, format!("effect {index}: {e}"));
                    None
                }
            },
            None => {
                self.push(record, Severity::Error, format!("effect {index}: missing timing"));
                None
            }
        };
        self.deprecated(record, effect, DEPRECATED_EFFECT_FIELDS, &format!("effect {index}"));

        let event = effect.get("event").and_then(Value::as_str);
        if let Some(raw) = event {
            if let Err(e) = raw.parse::<TriggerEvent>() {
                let message = format!("effect {index}: {e}, it will never fire");
                self.push(record, Severity::Warning, message);
            }
        }
        match (timing, event) {
            (Some(Timing::OnEvent), None) => self.push(
                record,
                Severity::Warning,
                format!("effect {index}: on_event timing without an event"),
            ),
            (Some(t), Some(e)) if t != Timing::OnEvent => self.push(
                record,
                Severity::Warning,
                format!("effect {index}: event '{e}' ignored for {} timing", t.as_str()),
            ),
            _ => {}
        }

        let actions = effect.get("actions").and_then(Value::as_array);
        if timing == Some(Timing::Passive) {
            if effect.get("passive").is_none() {
                self.push(
                    record,
                    Severity::Warning,
                    format!("effect {index}: passive effect without a passive spec"),
                );
            }
        } else if actions.map_or(true, Vec::is_empty) {
            self.push(record, Severity::Warning, format!("effect {index}: no actions"));
        }

        for (i, action) in actions.into_iter().flatten().enumerate() {
            self.action(record, &format!("effect {index} action {i}"), action);
        }
    }

    fn action(&mut self, record: &Record<'_>, path: &str, action: &Value) {
        let Some(object) = action.as_object() else {
            self.push(record, Severity::Error, format!("{path}: not an object"));
            return;
        };
        match object.get("type").and_then(Value::as_str) {
            Some(raw) => match raw.parse::<ActionKind>() {
                Ok(kind) if self.registered.contains(&kind) => {}
                _ => self.push(
                    record,
                    Severity::Error,
                    format!("{path}: unregistered action type '{raw}'"),
                ),
            },
            None => self.push(record, Severity::Error, format!("{path}: missing type")),
        }
        self.deprecated(record, object, DEPRECATED_ACTION_FIELDS, path);

        if let Some(then) = object.get("then").and_then(Value::as_array) {
            for (i, next) in then.iter().enumerate() {
                self.action(record, &format!("{path} then {i}"), next);
            }
        }
    }
}

/// Validate a raw card database against the registered action kinds
pub fn validate_database(raw: &Value, registered: &[ActionKind]) -> ValidationReport {
    let mut validator = Validator {
        registered,
        report: ValidationReport::default(),
    };

    let Some(records) = raw.as_array() else {
        let top = Record {
            index: 0,
            id: None,
            name: None,
        };
        validator.push(&top, Severity::Error, "database must be a JSON array".to_string());
        return validator.report;
    };

    let mut ids: FxHashMap<i64, usize> = FxHashMap::default();
    let mut names: FxHashSet<String> = FxHashSet::default();

    for (index, value) in records.iter().enumerate() {
        let Some(object) = value.as_object() else {
            let record = Record {
                index,
                id: None,
                name: None,
            };
            validator.push(&record, Severity::Error, "record is not an object".to_string());
            continue;
        };
        let record = Record {
            index,
            id: object.get("id").and_then(Value::as_i64),
            name: object.get("name").and_then(Value::as_str),
        };

        if let Some(id) = record.id {
            if let Some(first) = ids.insert(id, index) {
                let message = format!("duplicate id {id} (first at record #{first})");
                validator.push(&record, Severity::Error, message);
            }
        }
        if let Some(name) = record.name.filter(|n| !n.trim().is_empty()) {
            if !names.insert(name.to_lowercase()) {
                validator.push(&record, Severity::Error, format!("duplicate name '{name}'"));
            }
        }
        validator.card(&record, object);
    }

    validator.report
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validate(raw: Value) -> ValidationReport {
        validate_database(&raw, &ActionKind::ALL)
    }

    #[test]
    fn test_clean_database() {
        let report = validate(json!([
            {"id": 1, "name": "Vanguard", "cardKind": "monster", "atk": 1500},
            {"id": 2, "name": "Pot", "cardKind": "spell", "effects": [
                {"timing": "on_play", "actions": [{"type": "draw", "amount": 2}]}
            ]}
        ]));
        assert!(report.is_clean(), "{report}");
    }

    #[test]
    fn test_duplicates_and_bad_fields_are_errors() {
        let report = validate(json!([
            {"id": 1, "name": "Vanguard", "cardKind": "monster"},
            {"id": 1, "name": "vanguard", "cardKind": "dragon"},
            {"id": -4, "name": "", "cardKind": "trap", "attack": 100}
        ]));
        let messages: Vec<&str> = report.errors().map(|i| i.message.as_str()).collect();
        assert!(messages.iter().any(|m| m.starts_with("duplicate id 1")));
        assert!(messages.iter().any(|m| m.starts_with("duplicate name")));
        assert!(messages.iter().any(|m| m.contains("unknown cardKind 'dragon'")));
        assert!(messages.iter().any(|m| m.contains("id must be positive")));
        assert!(messages.iter().any(|m| m.contains("missing or empty name")));
        assert!(messages.iter().any(|m| m.contains("deprecated field 'attack'")));
        assert_eq!(report.warnings().count(), 0);
    }

    #[test]
    fn test_unregistered_action_type_in_continuation() {
        let raw = json!([{"id": 7, "name": "Tribute Pact", "cardKind": "spell", "effects": [
            {"timing": "ignition", "actions": [
                {"type": "pay_cost", "from": "hand", "then": [{"type": "summon_dragon"}]}
            ]}
        ]}]);
        let report = validate(raw.clone());
        assert_eq!(report.errors().count(), 1);
        let message = &report.issues()[0].message;
        assert!(message.contains("then 0: unregistered action type 'summon_dragon'"));

        // A registry without draw rejects a draw action that is otherwise fine
        let report = validate_database(
            &json!([{"id": 8, "name": "Pot", "cardKind": "spell", "effects": [
                {"timing": "on_play", "actions": [{"type": "draw"}]}
            ]}]),
            &[ActionKind::Destroy],
        );
        assert!(report.has_errors());
    }

    #[test]
    fn test_timing_errors_and_event_warnings() {
        let report = validate(json!([{"id": 3, "name": "Watcher", "cardKind": "monster",
            "effects": [
            {"timing": "whenever", "actions": [{"type": "draw"}]},
            {"timing": "on_event", "event": "moon_rises", "actions": [{"type": "draw"}]},
            {"timing": "ignition", "event": "after_summon", "actions": [{"type": "draw"}]},
            {"timing": "on_event", "actions": []},
            {"timing": "passive"}
        ]}]));
        assert_eq!(report.errors().count(), 1);
        assert!(report.errors().all(|i| i.message.contains("unknown timing 'whenever'")));
        // unknown event, event on ignition, on_event without event, no actions and
        // passive without spec
        assert_eq!(report.warnings().count(), 5);
    }

    #[test]
    fn test_non_array_database() {
        let report = validate(json!({"cards": []}));
        assert!(report.has_errors());
    }
}
