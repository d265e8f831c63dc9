//! Action handler registry
//!
//! Card data names behaviour through `ActionKind`; code supplies it through
//! handlers registered here when the engine is composed.

use crate::actions::Engine;
use crate::core::{ActionDescriptor, ActionKind, CardId, Position};
use crate::game::{ActionContext, ResolvedTargets, SelectionRequirement};
use crate::{DuelError, Result};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// What a handler did
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Finished; `true` if anything observable happened
    Done(bool),
    /// A cost was paid; run these actions next
    Then(Vec<ActionDescriptor>),
    /// The player cancelled; the rest of the effect is skipped
    Aborted,
    /// Waiting on a human decision
    Suspend(PendingDecision),
}

/// The question a suspended handler is waiting on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    Select(SelectionRequirement),
    Confirm(String),
    SummonPosition(CardId),
    Number { prompt: String, min: i32, max: i32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDecision {
    pub prompt: Prompt,
    /// Handler-defined stage for handlers that ask more than once
    pub stage: u8,
    /// Cards picked before the suspension
    pub carried: Vec<CardId>,
}

impl PendingDecision {
    pub fn new(prompt: Prompt) -> Self {
        PendingDecision {
            prompt,
            stage: 0,
            carried: Vec::new(),
        }
    }

    pub fn at_stage(mut self, stage: u8, carried: Vec<CardId>) -> Self {
        self.stage = stage;
        self.carried = carried;
        self
    }

    /// Requirement id, when waiting on a card selection
    pub fn requirement_id(&self) -> Option<&str> {
        match &self.prompt {
            Prompt::Select(req) => Some(req.id.as_str()),
            _ => None,
        }
    }
}

/// Answer supplied by the host when resuming
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resume {
    Cards(Vec<CardId>),
    Confirmed(bool),
    Position(Position),
    Number(i32),
    /// The human backed out
    Aborted,
}

pub trait ActionHandler: Send + Sync {
    fn execute(
        &self,
        action: &ActionDescriptor,
        ctx: &mut ActionContext,
        resolved: &ResolvedTargets,
        engine: &mut Engine,
    ) -> Result<Step>;

    /// Continue after `Step::Suspend`
    fn resume(
        &self,
        action: &ActionDescriptor,
        _ctx: &mut ActionContext,
        _resolved: &ResolvedTargets,
        _pending: PendingDecision,
        _input: Resume,
        _engine: &mut Engine,
    ) -> Result<Step> {
        Err(DuelError::InvalidResume(format!("{} never suspends", action.kind)))
    }
}

#[derive(Clone, Default)]
pub struct ActionRegistry {
    handlers: FxHashMap<ActionKind, Arc<dyn ActionHandler>>,
}

impl ActionRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in handler
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::actions::handlers::register_builtins(&mut registry);
        registry
    }

    /// Install a handler; returns the one it replaced
    pub fn register(
        &mut self,
        kind: ActionKind,
        handler: impl ActionHandler + 'static,
    ) -> Option<Arc<dyn ActionHandler>> {
        self.handlers.insert(kind, Arc::new(handler))
    }

    pub fn get(&self, kind: ActionKind) -> Option<Arc<dyn ActionHandler>> {
        self.handlers.get(&kind).cloned()
    }

    pub fn has(&self, kind: ActionKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Registered kinds in declaration order
    pub fn list_types(&self) -> Vec<ActionKind> {
        ActionKind::ALL.into_iter().filter(|k| self.has(*k)).collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("types", &self.list_types())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    impl ActionHandler for Noop {
        fn execute(
            &self,
            _action: &ActionDescriptor,
            _ctx: &mut ActionContext,
            _resolved: &ResolvedTargets,
            _engine: &mut Engine,
        ) -> Result<Step> {
            Ok(Step::Done(false))
        }
    }

    #[test]
    fn test_builtins_cover_every_kind() {
        let registry = ActionRegistry::with_builtins();
        assert_eq!(registry.list_types(), ActionKind::ALL.to_vec());
    }

    #[test]
    fn test_register_and_replace() {
        let mut registry = ActionRegistry::new();
        assert!(!registry.has(ActionKind::Draw));
        assert!(registry.register(ActionKind::Draw, Noop).is_none());
        assert!(registry.has(ActionKind::Draw));
        assert!(registry.register(ActionKind::Draw, Noop).is_some());
        assert_eq!(registry.list_types(), vec![ActionKind::Draw]);
    }
}
