//! Strongly-typed wrappers for game concepts
//!
//! This module provides newtypes to prevent type confusion and make the code
//! more self-documenting. Instead of using bare Strings for different concepts,
//! we wrap them in distinct types that cannot be mixed up.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

macro_rules! string_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                $name(s.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                $name(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name(s.to_string())
            }
        }
    };
}

string_newtype!(
    /// Card name (distinct from other string types)
    CardName
);

string_newtype!(
    /// Player name (distinct from other string types)
    PlayerName
);

string_newtype!(
    /// Monster type, e.g. "Dragon", "Spellcaster", "Machine"
    MonsterType
);

string_newtype!(
    /// Archetype a card belongs to, e.g. "Blue-Eyes"
    Archetype
);

string_newtype!(
    /// Counter type, e.g. "spell", "summons_seen"
    CounterKind
);

impl CardName {
    pub fn to_lowercase(&self) -> String {
        self.0.to_lowercase()
    }
}

impl CounterKind {
    /// Summons observed while the holder has been on the field
    pub fn summons_seen() -> Self {
        CounterKind("summons_seen".to_string())
    }
}

/// Stable identifier of one effect, used by usage ledgers and passive buffs
///
/// Effects that declare an explicit `id` in the database are `Named`;
/// otherwise the key is derived from the card's database id and the
/// effect's index in its effect list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EffectKey {
    Named(String),
    Indexed { card: u32, effect: u16 },
}

impl EffectKey {
    pub fn named(s: impl Into<String>) -> Self {
        EffectKey::Named(s.into())
    }

    pub fn indexed(card: u32, effect: usize) -> Self {
        EffectKey::Indexed {
            card,
            effect: effect as u16,
        }
    }
}

impl fmt::Display for EffectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EffectKey::Named(name) => write!(f, "{name}"),
            EffectKey::Indexed { card, effect } => write!(f, "{card}#{effect}"),
        }
    }
}

/// Accepts either a single value or a list in card data
///
/// `"type": "Dragon"` and `"type": ["Dragon", "Warrior"]` both deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn as_slice(&self) -> &[T] {
        match self {
            OneOrMany::One(value) => std::slice::from_ref(value),
            OneOrMany::Many(values) => values,
        }
    }

    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.as_slice().contains(value)
    }

    /// True if any element of `values` is accepted
    pub fn matches_any(&self, values: &[T]) -> bool
    where
        T: PartialEq,
    {
        values.iter().any(|v| self.contains(v))
    }
}

impl<T: Clone> OneOrMany<T> {
    pub fn to_smallvec(&self) -> SmallVec<[T; 2]> {
        self.as_slice().iter().cloned().collect()
    }
}

impl<T> From<T> for OneOrMany<T> {
    fn from(value: T) -> Self {
        OneOrMany::One(value)
    }
}

/// An atk/def delta
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatDelta {
    pub atk: i32,
    pub def: i32,
}

impl StatDelta {
    pub const ZERO: StatDelta = StatDelta { atk: 0, def: 0 };

    pub fn new(atk: i32, def: i32) -> Self {
        StatDelta { atk, def }
    }

    pub fn is_zero(&self) -> bool {
        self.atk == 0 && self.def == 0
    }
}

impl std::ops::Add for StatDelta {
    type Output = StatDelta;

    fn add(self, rhs: StatDelta) -> StatDelta {
        StatDelta::new(self.atk + rhs.atk, self.def + rhs.def)
    }
}

impl std::ops::AddAssign for StatDelta {
    fn add_assign(&mut self, rhs: StatDelta) {
        self.atk += rhs.atk;
        self.def += rhs.def;
    }
}

impl fmt::Display for StatDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+}/{:+}", self.atk, self.def)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_or_many_deserializes_both_shapes() {
        let one: OneOrMany<MonsterType> = serde_json::from_str("\"Dragon\"").unwrap();
        assert_eq!(one.as_slice(), &[MonsterType::new("Dragon")]);

        let many: OneOrMany<MonsterType> =
            serde_json::from_str("[\"Dragon\",\"Warrior\"]").unwrap();
        assert_eq!(many.as_slice().len(), 2);
        assert!(many.contains(&MonsterType::new("Warrior")));
    }

    #[test]
    fn test_effect_key_display() {
        assert_eq!(EffectKey::indexed(12, 1).to_string(), "12#1");
        assert_eq!(EffectKey::named("draw_once").to_string(), "draw_once");
    }

    #[test]
    fn test_stat_delta_arithmetic() {
        let mut d = StatDelta::new(300, 0);
        d += StatDelta::new(200, -100);
        assert_eq!(d, StatDelta::new(500, -100));
        assert_eq!(d.to_string(), "+500/-100");
        assert!(StatDelta::ZERO.is_zero());
    }
}
