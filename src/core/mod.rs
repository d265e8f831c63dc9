//! Core game types and entities

pub mod card;
pub mod effects;
pub mod entity;
pub mod player;
pub mod types;
pub mod usage;

pub use card::{
    AppliedPassive, Card, CardId, CardKind, CardSubtype, Position, Protection, TurnFlags,
};
pub use effects::{
    ActionDescriptor, ActionKind, CandidateFilter, Condition, Duration, EffectDescriptor,
    LevelComparator, PassiveSpec, ProtectionKind, Side, StatusFlag, TargetRef, TargetSentinel,
    Timing, TokenSpec, TriggerEvent, UsageScope,
};
pub use entity::{EntityId, EntityStore, GameEntity};
pub use player::{ControllerKind, Player, PlayerId};
pub use types::{
    Archetype, CardName, CounterKind, EffectKey, MonsterType, OneOrMany, PlayerName, StatDelta,
};
pub use usage::UsageLedger;
