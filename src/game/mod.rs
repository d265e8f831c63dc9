//! Duel state, the zone transition engine and its collaborators

pub mod buffs;
pub mod config;
pub mod events;
pub mod heuristic;
pub mod hooks;
pub mod logger;
pub mod relations;
pub mod scripted_ui;
pub mod selection;
pub mod state;
pub mod targeting;
pub mod transition;
pub mod ui;

pub use buffs::UsageContext;
pub use config::{DiagnosticsConfig, DuelConfig};
pub use events::{GameEvent, SummonMethod};
pub use heuristic::{GreedyHeuristic, SelectionHeuristic};
pub use hooks::{FaultInjector, ZoneOp, ZoneOpCounter, ZoneOpHook};
pub use logger::{GameLogger, LogEntry, LogSink, OutputFormat, VerbosityLevel};
pub use relations::{EquipLink, Relations};
pub use scripted_ui::{ScriptedReply, ScriptedUi, UiTranscript};
pub use selection::{Selection, SelectionPurpose, SelectionRequirement, SelectionStep};
pub use state::{GameState, SecondaryOp};
pub use targeting::{
    collect_candidates, collect_zone_candidates, matches_filter, resolve_target_cards,
    ActionContext, CandidateOptions, ResolvedTargets, TargetOptions,
};
pub use transition::{MoveOptions, MoveReason, MoveRejection, MoveResult, Moved};
pub use ui::{DuelUi, UiReply};
