//! Declarative effect and action descriptors
//!
//! Card content is data: an effect is a timing plus an ordered list of
//! actions, and every action names its behaviour through a closed
//! [`ActionKind`]. The dispatcher only ever looks at `kind`; the rest of an
//! [`ActionDescriptor`] is interpreted by the handler registered for it.

use crate::core::{Archetype, CardId, CardKind, CardName, MonsterType, OneOrMany, Position};
use crate::zones::ZoneKind;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// When an effect can be used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timing {
    /// Resolves when the card is played/activated from hand or set zone
    OnPlay,
    /// Triggered by a game event (requires `event`)
    OnEvent,
    /// Activated by the controller while the card is in place
    Ignition,
    /// Continuous stat/status contribution recomputed from board state
    Passive,
}

impl Timing {
    pub const ALL: [Timing; 4] =
        [Timing::OnPlay, Timing::OnEvent, Timing::Ignition, Timing::Passive];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timing::OnPlay => "on_play",
            Timing::OnEvent => "on_event",
            Timing::Ignition => "ignition",
            Timing::Passive => "passive",
        }
    }
}

impl FromStr for Timing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timing::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown timing '{s}'"))
    }
}

/// Events an `on_event` effect can listen for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerEvent {
    AfterSummon,
    CardToGrave,
    CardDestroyed,
    CardDrawn,
    AttackDeclared,
    BattleDestroy,
    StandbyPhase,
    EndPhase,
}

impl TriggerEvent {
    pub const ALL: [TriggerEvent; 8] = [
        TriggerEvent::AfterSummon,
        TriggerEvent::CardToGrave,
        TriggerEvent::CardDestroyed,
        TriggerEvent::CardDrawn,
        TriggerEvent::AttackDeclared,
        TriggerEvent::BattleDestroy,
        TriggerEvent::StandbyPhase,
        TriggerEvent::EndPhase,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerEvent::AfterSummon => "after_summon",
            TriggerEvent::CardToGrave => "card_to_grave",
            TriggerEvent::CardDestroyed => "card_destroyed",
            TriggerEvent::CardDrawn => "card_drawn",
            TriggerEvent::AttackDeclared => "attack_declared",
            TriggerEvent::BattleDestroy => "battle_destroy",
            TriggerEvent::StandbyPhase => "standby_phase",
            TriggerEvent::EndPhase => "end_phase",
        }
    }
}

impl FromStr for TriggerEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TriggerEvent::ALL
            .iter()
            .copied()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| format!("unknown event '{s}'"))
    }
}

/// Unknown event names are reported by the validator as warnings and
/// dropped here rather than failing the whole card.
fn lenient_event<'de, D>(deserializer: D) -> Result<Option<TriggerEvent>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

/// The closed set of behaviours an action can name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    MoveCards,
    Destroy,
    SendToGraveyard,
    Banish,
    ReturnToHand,
    ReturnToDeck,
    SpecialSummon,
    Draw,
    SetStatus,
    BoostStats,
    ApplyBuff,
    RemoveBuff,
    PayCost,
    GrantExtraAttack,
    GrantProtection,
    Equip,
    CreateToken,
    ModifyLp,
}

impl ActionKind {
    pub const ALL: [ActionKind; 18] = [
        ActionKind::MoveCards,
        ActionKind::Destroy,
        ActionKind::SendToGraveyard,
        ActionKind::Banish,
        ActionKind::ReturnToHand,
        ActionKind::ReturnToDeck,
        ActionKind::SpecialSummon,
        ActionKind::Draw,
        ActionKind::SetStatus,
        ActionKind::BoostStats,
        ActionKind::ApplyBuff,
        ActionKind::RemoveBuff,
        ActionKind::PayCost,
        ActionKind::GrantExtraAttack,
        ActionKind::GrantProtection,
        ActionKind::Equip,
        ActionKind::CreateToken,
        ActionKind::ModifyLp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::MoveCards => "move_cards",
            ActionKind::Destroy => "destroy",
            ActionKind::SendToGraveyard => "send_to_graveyard",
            ActionKind::Banish => "banish",
            ActionKind::ReturnToHand => "return_to_hand",
            ActionKind::ReturnToDeck => "return_to_deck",
            ActionKind::SpecialSummon => "special_summon",
            ActionKind::Draw => "draw",
            ActionKind::SetStatus => "set_status",
            ActionKind::BoostStats => "boost_stats",
            ActionKind::ApplyBuff => "apply_buff",
            ActionKind::RemoveBuff => "remove_buff",
            ActionKind::PayCost => "pay_cost",
            ActionKind::GrantExtraAttack => "grant_extra_attack",
            ActionKind::GrantProtection => "grant_protection",
            ActionKind::Equip => "equip",
            ActionKind::CreateToken => "create_token",
            ActionKind::ModifyLp => "modify_lp",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown action type '{s}'"))
    }
}

/// Context sentinels a target reference can name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetSentinel {
    /// The effect's source card
    Source,
    Attacker,
    Defender,
    Destroyed,
    SummonedCard,
    /// The single target chosen when the effect was activated
    Target,
    /// Only the first card of the last draw
    LastDrawnCard,
    /// Every card of the last draw
    LastDrawn,
}

impl TargetSentinel {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "self" | "source" => TargetSentinel::Source,
            "attacker" => TargetSentinel::Attacker,
            "defender" => TargetSentinel::Defender,
            "destroyed" => TargetSentinel::Destroyed,
            "summonedCard" | "summoned_card" => TargetSentinel::SummonedCard,
            "target" => TargetSentinel::Target,
            "last_drawn_card" | "lastDrawnCard" => TargetSentinel::LastDrawnCard,
            "last_drawn" | "lastDrawn" => TargetSentinel::LastDrawn,
            _ => return None,
        })
    }
}

/// Where an action's targets come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TargetRef {
    Sentinel(TargetSentinel),
    /// Explicit card ids
    Literal(Vec<CardId>),
    /// Cards stored under this key by an earlier action of the same effect
    Resolved(String),
}

impl From<TargetSentinel> for TargetRef {
    fn from(s: TargetSentinel) -> Self {
        TargetRef::Sentinel(s)
    }
}

impl<'de> Deserialize<'de> for TargetRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Name(String),
            Ids(Vec<u32>),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Name(name) => match TargetSentinel::parse(&name) {
                Some(sentinel) => TargetRef::Sentinel(sentinel),
                None => TargetRef::Resolved(name),
            },
            Raw::Ids(ids) => TargetRef::Literal(ids.into_iter().map(CardId::new).collect()),
        })
    }
}

/// Which player's zones an action looks at, relative to the acting player
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    #[serde(rename = "self")]
    Own,
    Opponent,
    Both,
}

/// Level comparison operator for candidate filters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelComparator {
    #[default]
    Eq,
    Lte,
    Gte,
    Lt,
    Gt,
}

impl LevelComparator {
    pub fn compare(&self, actual: u8, wanted: u8) -> bool {
        match self {
            LevelComparator::Eq => actual == wanted,
            LevelComparator::Lte => actual <= wanted,
            LevelComparator::Gte => actual >= wanted,
            LevelComparator::Lt => actual < wanted,
            LevelComparator::Gt => actual > wanted,
        }
    }
}

/// Declarative zone filter applied by `collect_zone_candidates`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CandidateFilter {
    pub card_kind: Option<OneOrMany<CardKind>>,
    #[serde(rename = "type")]
    pub monster_type: Option<OneOrMany<MonsterType>>,
    pub archetype: Option<OneOrMany<Archetype>>,
    pub level: Option<u8>,
    pub level_op: LevelComparator,
    pub min_level: Option<u8>,
    pub max_level: Option<u8>,
    pub name: Option<CardName>,
    pub exclude_self: bool,
    pub face_up: Option<bool>,
}

impl CandidateFilter {
    pub fn monsters() -> Self {
        CandidateFilter {
            card_kind: Some(OneOrMany::One(CardKind::Monster)),
            ..Default::default()
        }
    }
}

/// Named boolean statuses an action or passive can toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFlag {
    CannotAttack,
    CannotBeTargeted,
    CannotChangePosition,
    Piercing,
    DirectAttack,
    Negated,
}

/// What a protection entry shields against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtectionKind {
    Battle,
    Effect,
    Targeting,
}

/// How long a granted flag lasts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Duration {
    EndOfTurn,
    WhileFaceUp,
    Permanent,
}

/// Template for a token created by `create_token`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSpec {
    pub name: CardName,
    #[serde(default)]
    pub atk: i32,
    #[serde(default)]
    pub def: i32,
    #[serde(default = "default_token_level")]
    pub level: u8,
    #[serde(default, rename = "type")]
    pub monster_type: Option<MonsterType>,
}

fn default_token_level() -> u8 {
    1
}

fn default_true() -> bool {
    true
}

/// One declarative instruction, interpreted by the handler for `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDescriptor {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    #[serde(default, rename = "targetRef", alias = "target")]
    pub target: Option<TargetRef>,
    #[serde(default)]
    pub from: Option<ZoneKind>,
    #[serde(default)]
    pub to: Option<ZoneKind>,
    #[serde(default)]
    pub player: Side,
    #[serde(default)]
    pub filter: CandidateFilter,
    #[serde(default)]
    pub count: Option<u8>,
    #[serde(default)]
    pub min: Option<u8>,
    #[serde(default)]
    pub max: Option<u8>,
    #[serde(default)]
    pub atk: i32,
    #[serde(default)]
    pub def: i32,
    #[serde(default)]
    pub amount: i32,
    #[serde(default)]
    pub status: Option<StatusFlag>,
    #[serde(default = "default_true")]
    pub value: bool,
    #[serde(default)]
    pub source_name: Option<String>,
    #[serde(default)]
    pub duration: Option<Duration>,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub protection: Option<ProtectionKind>,
    #[serde(default)]
    pub token: Option<TokenSpec>,
    /// Ask the controller before resolving ("you may")
    #[serde(default)]
    pub optional: bool,
    /// Tie a special-summoned monster to the source continuous trap
    #[serde(default)]
    pub bind: bool,
    /// Equip: destroy the host when this equip leaves the field
    #[serde(default)]
    pub destroy_host: bool,
    /// Store this action's resolved cards under a key for later actions
    #[serde(default)]
    pub store_as: Option<String>,
    /// Continuation run after a paid cost
    #[serde(default)]
    pub then: Vec<ActionDescriptor>,
}

impl ActionDescriptor {
    pub fn new(kind: ActionKind) -> Self {
        ActionDescriptor {
            kind,
            target: None,
            from: None,
            to: None,
            player: Side::Own,
            filter: CandidateFilter::default(),
            count: None,
            min: None,
            max: None,
            atk: 0,
            def: 0,
            amount: 0,
            status: None,
            value: true,
            source_name: None,
            duration: None,
            position: None,
            protection: None,
            token: None,
            optional: false,
            bind: false,
            destroy_host: false,
            store_as: None,
            then: Vec::new(),
        }
    }

    pub fn with_target(mut self, target: impl Into<TargetRef>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_zones(mut self, from: ZoneKind, to: ZoneKind) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    pub fn with_count(mut self, count: u8) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_filter(mut self, filter: CandidateFilter) -> Self {
        self.filter = filter;
        self
    }

    /// (min, max) selection bounds: `count` pins both, otherwise min
    /// defaults to 1 and max to min.
    pub fn bounds(&self) -> (usize, usize) {
        if let Some(count) = self.count {
            return (count as usize, count as usize);
        }
        let min = self.min.unwrap_or(1) as usize;
        let max = self.max.map(|m| m as usize).unwrap_or(min).max(min);
        (min, max)
    }
}

/// Whose ledger a usage limit is recorded in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageScope {
    Player,
    #[default]
    Card,
}

/// Board-derived passive contribution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PassiveSpec {
    /// Status is on while the card is in `position`
    PositionStatus { position: Position, status: StatusFlag },
    /// Per monster of `type` in graveyards on `side`
    #[serde(rename_all = "camelCase")]
    GraveyardTypeCount {
        #[serde(rename = "type")]
        monster_type: MonsterType,
        #[serde(default)]
        atk_per: i32,
        #[serde(default)]
        def_per: i32,
        #[serde(default)]
        side: Side,
    },
    /// Per special summon of a `type` monster this duel, by anyone
    #[serde(rename_all = "camelCase")]
    SpecialSummonTypeCount {
        #[serde(rename = "type")]
        monster_type: MonsterType,
        #[serde(default)]
        atk_per: i32,
        #[serde(default)]
        def_per: i32,
    },
    /// Per summon observed since this card arrived on the field
    #[serde(rename_all = "camelCase")]
    PresenceSummonCount {
        #[serde(default)]
        atk_per: i32,
        #[serde(default)]
        def_per: i32,
    },
    /// Per face-up `archetype` monster on the field
    #[serde(rename_all = "camelCase")]
    ArchetypePopulation {
        archetype: Archetype,
        #[serde(default)]
        atk_per: i32,
        #[serde(default)]
        def_per: i32,
        #[serde(default)]
        include_opponent: bool,
        #[serde(default)]
        include_self: bool,
    },
}

/// Activation condition checked by the effect runner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    SourceInZone { zone: ZoneKind },
    SourceFaceUp,
    LpAtMost { amount: i32 },
    ZoneCountAtLeast {
        zone: ZoneKind,
        #[serde(default)]
        side: Side,
        count: usize,
        #[serde(default)]
        filter: CandidateFilter,
    },
}

/// A trigger condition plus an ordered list of actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectDescriptor {
    #[serde(default)]
    pub id: Option<String>,
    pub timing: Timing,
    #[serde(default, deserialize_with = "lenient_event")]
    pub event: Option<TriggerEvent>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub once_per_turn: bool,
    #[serde(default)]
    pub once_per_duel: bool,
    #[serde(default)]
    pub scope: UsageScope,
    #[serde(default)]
    pub passive: Option<PassiveSpec>,
    #[serde(default)]
    pub actions: Vec<ActionDescriptor>,
}

impl EffectDescriptor {
    pub fn new(timing: Timing, actions: Vec<ActionDescriptor>) -> Self {
        EffectDescriptor {
            id: None,
            timing,
            event: None,
            conditions: Vec::new(),
            once_per_turn: false,
            once_per_duel: false,
            scope: UsageScope::Card,
            passive: None,
            actions,
        }
    }

    pub fn passive(spec: PassiveSpec) -> Self {
        EffectDescriptor {
            passive: Some(spec),
            ..EffectDescriptor::new(Timing::Passive, Vec::new())
        }
    }
}
