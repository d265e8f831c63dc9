//! Effect runner
//!
//! Checks usage limits and conditions, dispatches each action to its
//! handler, and recomputes passive buffs once the effect is over. A
//! human decision suspends the run into a `SuspendedEffect`, which the
//! host hands back to `Engine::resume` with the answer.

use crate::actions::registry::{
    ActionHandler, ActionRegistry, PendingDecision, Prompt, Resume, Step,
};
use crate::core::{
    ActionDescriptor, CardId, Condition, EffectKey, PlayerId, Position, Timing, UsageScope,
};
use crate::game::{
    collect_candidates, ActionContext, CandidateOptions, DuelUi, GameEvent, GameState,
    GreedyHeuristic, ResolvedTargets, Selection, SelectionHeuristic, SelectionRequirement,
    SelectionStep, UiReply, UsageContext,
};
use crate::zones::ZoneKind;
use crate::{DuelError, Result};
use std::collections::VecDeque;
use std::sync::Arc;

/// Why an effect did not start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    UsedThisTurn,
    UsedThisDuel,
    ConditionUnmet,
}

/// Outcome of activating or resuming an effect
#[derive(Debug)]
pub enum Activation {
    Resolved { effective: bool },
    Blocked(BlockReason),
    /// A human declined part of the effect; nothing after it resolved
    Cancelled,
    Suspended(Box<SuspendedEffect>),
}

impl Activation {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Activation::Resolved { .. })
    }

    pub fn into_suspended(self) -> Option<Box<SuspendedEffect>> {
        match self {
            Activation::Suspended(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct UsageLimits {
    key: EffectKey,
    once_per_turn: bool,
    once_per_duel: bool,
    scope: UsageScope,
}

impl UsageLimits {
    fn reservation(&self, usage: &UsageContext) -> Option<Reservation> {
        if !self.once_per_turn && !self.once_per_duel {
            return None;
        }
        let holder = match self.scope {
            UsageScope::Player => UsageHolder::Player(usage.player),
            UsageScope::Card => UsageHolder::Card(usage.card?),
        };
        Some(Reservation {
            holder,
            key: self.key.clone(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UsageHolder {
    Player(PlayerId),
    Card(CardId),
}

/// A limited effect that started resolving and has not finished yet
#[derive(Debug, Clone, PartialEq, Eq)]
struct Reservation {
    holder: UsageHolder,
    key: EffectKey,
}

/// Everything needed to continue an effect
#[derive(Debug, Clone)]
struct Frame {
    limits: Option<UsageLimits>,
    usage: UsageContext,
    queue: VecDeque<ActionDescriptor>,
    ctx: ActionContext,
    resolved: ResolvedTargets,
    effective: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Handler,
    /// The runner's own "you may" prompt for an optional action
    OptionalConfirm,
}

/// An effect paused on a human decision
#[derive(Debug, Clone)]
pub struct SuspendedEffect {
    frame: Frame,
    action: ActionDescriptor,
    origin: Origin,
    pending: PendingDecision,
}

impl SuspendedEffect {
    pub fn pending(&self) -> &PendingDecision {
        &self.pending
    }

    pub fn prompt(&self) -> &Prompt {
        &self.pending.prompt
    }

    pub fn requirement_id(&self) -> Option<&str> {
        self.pending.requirement_id()
    }

    /// The action being waited on
    pub fn action(&self) -> &ActionDescriptor {
        &self.action
    }
}

enum Flow {
    Continue(Frame),
    Stop(Activation),
}

pub struct Engine {
    pub state: GameState,
    registry: ActionRegistry,
    heuristic: Box<dyn SelectionHeuristic>,
    ui: Option<Box<dyn DuelUi>>,
    /// Limited effects currently suspended; they count as used until they
    /// resolve or are cancelled
    in_flight: Vec<Reservation>,
}

impl Engine {
    /// Engine with built-in handlers, the greedy heuristic, and no UI
    pub fn new(state: GameState) -> Self {
        Engine {
            state,
            registry: ActionRegistry::with_builtins(),
            heuristic: Box::new(GreedyHeuristic::new()),
            ui: None,
            in_flight: Vec::new(),
        }
    }

    pub fn with_registry(mut self, registry: ActionRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_ui(mut self, ui: impl DuelUi + 'static) -> Self {
        self.ui = Some(Box::new(ui));
        self
    }

    pub fn with_heuristic(mut self, heuristic: impl SelectionHeuristic + 'static) -> Self {
        self.heuristic = Box::new(heuristic);
        self
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    pub fn has_ui(&self) -> bool {
        self.ui.is_some()
    }

    /// Humans are asked through the UI; without one they get the heuristic
    fn asks_ui(&self, player: PlayerId) -> bool {
        self.ui.is_some() && self.state.get_player(player).is_ok_and(|p| p.is_human())
    }

    /// Game log plus the UI's message area
    pub fn log(&mut self, message: &str) {
        self.state.logger.normal(message);
        if let Some(ui) = self.ui.as_mut() {
            ui.log(message);
        }
    }

    /// Resolve a selection requirement
    pub fn choose_cards(&mut self, requirement: SelectionRequirement) -> Result<SelectionStep> {
        if !requirement.is_satisfiable() {
            return Ok(SelectionStep::Unsatisfiable);
        }
        self.state.journal.mark_choice_point();

        if !self.asks_ui(requirement.chooser) {
            let picked = self.heuristic.select(&self.state, &requirement);
            let picked = requirement.validate(&picked)?;
            #[cfg(feature = "verbose-logging")]
            self.state
                .logger
                .event("selection", &format!("'{}' chose {picked:?}", requirement.id));
            return Ok(SelectionStep::Ready(Selection::Chosen(picked)));
        }

        if let Some(picked) = requirement.auto_resolve(self.state.config.prompt_single_choice) {
            return Ok(SelectionStep::Ready(Selection::Chosen(picked)));
        }

        let reply = match self.ui.as_mut() {
            Some(ui) => ui.select_cards(&self.state, &requirement),
            None => UiReply::Deferred,
        };
        match reply {
            UiReply::Ready(picked) => Ok(SelectionStep::Ready(Selection::Chosen(
                requirement.validate(&picked)?,
            ))),
            UiReply::Cancelled => Ok(SelectionStep::Ready(Selection::Cancelled)),
            UiReply::Deferred => Ok(SelectionStep::Pending(requirement)),
        }
    }

    pub fn choose_position(&mut self, player: PlayerId, card: CardId) -> UiReply<Position> {
        if !self.asks_ui(player) {
            return UiReply::Ready(self.heuristic.summon_position(&self.state, card));
        }
        match self.ui.as_mut() {
            Some(ui) => ui.summon_position(&self.state, card),
            None => UiReply::Deferred,
        }
    }

    pub fn confirm(&mut self, player: PlayerId, prompt: &str) -> UiReply<bool> {
        if !self.asks_ui(player) {
            return UiReply::Ready(self.heuristic.confirm(&self.state, prompt));
        }
        match self.ui.as_mut() {
            Some(ui) => ui.confirm(&self.state, prompt),
            None => UiReply::Deferred,
        }
    }

    pub fn choose_number(
        &mut self,
        player: PlayerId,
        prompt: &str,
        min: i32,
        max: i32,
    ) -> UiReply<i32> {
        if !self.asks_ui(player) {
            let picked = self.heuristic.choose_number(&self.state, min, max);
            return UiReply::Ready(picked.clamp(min, max));
        }
        match self.ui.as_mut() {
            Some(ui) => ui.choose_number(&self.state, prompt, min, max),
            None => UiReply::Deferred,
        }
    }

    fn handler(&self, action: &ActionDescriptor) -> Result<Arc<dyn ActionHandler>> {
        self.registry
            .get(action.kind)
            .ok_or_else(|| DuelError::UnregisteredAction(action.kind.to_string()))
    }

    /// Activate effect `index` of `card`
    pub fn activate_effect(
        &mut self,
        card: CardId,
        index: usize,
        mut ctx: ActionContext,
    ) -> Result<Activation> {
        let (effect, key, name) = {
            let c = self.state.card(card)?;
            let effect = c
                .effects
                .get(index)
                .cloned()
                .ok_or_else(|| {
                    DuelError::InvalidAction(format!("{} has no effect #{index}", c.name))
                })?;
            (effect, c.effect_key(index), c.name.clone())
        };
        if effect.timing == Timing::Passive {
            return Err(DuelError::InvalidAction(format!(
                "passive effect {key} of {name} cannot be activated"
            )));
        }

        let usage = UsageContext::new(ctx.player, Some(card));
        if effect.once_per_turn && !self.state.check_once_per_turn(&key, effect.scope, &usage)? {
            return Ok(Activation::Blocked(BlockReason::UsedThisTurn));
        }
        if effect.once_per_duel && !self.state.check_once_per_duel(&key, effect.scope, &usage)? {
            return Ok(Activation::Blocked(BlockReason::UsedThisDuel));
        }
        for condition in &effect.conditions {
            if !self.condition_met(condition, card, ctx.player)? {
                return Ok(Activation::Blocked(BlockReason::ConditionUnmet));
            }
        }

        let limits = UsageLimits {
            key,
            once_per_turn: effect.once_per_turn,
            once_per_duel: effect.once_per_duel,
            scope: effect.scope,
        };
        let reservation = limits.reservation(&usage);
        if let Some(reservation) = &reservation {
            if self.in_flight.contains(reservation) {
                return Ok(Activation::Blocked(if effect.once_per_turn {
                    BlockReason::UsedThisTurn
                } else {
                    BlockReason::UsedThisDuel
                }));
            }
        }

        ctx.source.get_or_insert(card);
        self.log(&format!("{name} activates effect {}", limits.key));

        let frame = Frame {
            limits: Some(limits),
            usage,
            queue: effect.actions.into(),
            ctx,
            resolved: ResolvedTargets::default(),
            effective: false,
        };
        let outcome = self.run_frame(frame);
        self.track_reservation(reservation, &outcome);
        outcome
    }

    /// Hold the reservation while the effect is suspended, drop it otherwise
    fn track_reservation(
        &mut self,
        reservation: Option<Reservation>,
        outcome: &Result<Activation>,
    ) {
        let Some(reservation) = reservation else {
            return;
        };
        let suspended = matches!(outcome, Ok(Activation::Suspended(_)));
        let held = self.in_flight.iter().position(|r| *r == reservation);
        match (suspended, held) {
            (true, None) => self.in_flight.push(reservation),
            (false, Some(i)) => {
                self.in_flight.swap_remove(i);
            }
            _ => {}
        }
    }

    /// Run loose actions with no usage limits attached
    pub fn run_actions(
        &mut self,
        actions: Vec<ActionDescriptor>,
        ctx: ActionContext,
    ) -> Result<Activation> {
        let frame = Frame {
            limits: None,
            usage: UsageContext::new(ctx.player, ctx.source),
            queue: actions.into(),
            ctx,
            resolved: ResolvedTargets::default(),
            effective: false,
        };
        self.run_frame(frame)
    }

    /// Continue a suspended effect with the human's answer
    pub fn resume(&mut self, suspended: Box<SuspendedEffect>, input: Resume) -> Result<Activation> {
        let reservation = suspended
            .frame
            .limits
            .as_ref()
            .and_then(|limits| limits.reservation(&suspended.frame.usage));
        let outcome = self.resume_frame(suspended, input);
        self.track_reservation(reservation, &outcome);
        outcome
    }

    fn resume_frame(
        &mut self,
        suspended: Box<SuspendedEffect>,
        input: Resume,
    ) -> Result<Activation> {
        let SuspendedEffect {
            mut frame,
            mut action,
            origin,
            pending,
        } = *suspended;

        match origin {
            Origin::OptionalConfirm => match input {
                Resume::Confirmed(true) => {
                    action.optional = false;
                    frame.queue.push_front(action);
                    self.run_frame(frame)
                }
                Resume::Confirmed(false) => self.run_frame(frame),
                Resume::Aborted => Ok(self.cancel(frame)),
                other => Err(DuelError::InvalidResume(format!(
                    "expected a confirmation, got {other:?}"
                ))),
            },
            Origin::Handler => {
                let handler = self.handler(&action)?;
                let step = handler.resume(
                    &action,
                    &mut frame.ctx,
                    &frame.resolved,
                    pending,
                    input,
                    self,
                )?;
                match self.settle(frame, action, step) {
                    Flow::Continue(frame) => self.run_frame(frame),
                    Flow::Stop(activation) => Ok(activation),
                }
            }
        }
    }

    fn run_frame(&mut self, mut frame: Frame) -> Result<Activation> {
        while let Some(action) = frame.queue.pop_front() {
            if action.optional {
                let prompt = format!("Resolve {}?", action.kind);
                match self.confirm(frame.ctx.player, &prompt) {
                    UiReply::Ready(true) => {}
                    UiReply::Ready(false) => continue,
                    UiReply::Cancelled => return Ok(self.cancel(frame)),
                    UiReply::Deferred => {
                        return Ok(Activation::Suspended(Box::new(SuspendedEffect {
                            frame,
                            action,
                            origin: Origin::OptionalConfirm,
                            pending: PendingDecision::new(Prompt::Confirm(prompt)),
                        })))
                    }
                }
            }

            let handler = self.handler(&action)?;
            let step = handler.execute(&action, &mut frame.ctx, &frame.resolved, self)?;
            frame = match self.settle(frame, action, step) {
                Flow::Continue(frame) => frame,
                Flow::Stop(activation) => return Ok(activation),
            };
        }
        self.finish(frame)
    }

    fn settle(&mut self, mut frame: Frame, action: ActionDescriptor, step: Step) -> Flow {
        let affected = std::mem::take(&mut frame.ctx.last_affected);
        if let Some(key) = &action.store_as {
            frame.resolved.insert(key.clone(), affected);
        }
        match step {
            Step::Done(effective) => {
                frame.effective |= effective;
                Flow::Continue(frame)
            }
            Step::Then(next) => {
                frame.effective = true;
                for follow_up in next.into_iter().rev() {
                    frame.queue.push_front(follow_up);
                }
                Flow::Continue(frame)
            }
            Step::Aborted => Flow::Stop(self.cancel(frame)),
            Step::Suspend(pending) => Flow::Stop(Activation::Suspended(Box::new(SuspendedEffect {
                frame,
                action,
                origin: Origin::Handler,
                pending,
            }))),
        }
    }

    fn finish(&mut self, frame: Frame) -> Result<Activation> {
        if let Some(limits) = &frame.limits {
            if limits.once_per_turn {
                self.state
                    .mark_once_per_turn(&limits.key, limits.scope, &frame.usage)?;
            }
            if limits.once_per_duel {
                self.state
                    .mark_once_per_duel(&limits.key, limits.scope, &frame.usage)?;
            }
        }
        self.state.recompute_passive_buffs();
        Ok(Activation::Resolved {
            effective: frame.effective,
        })
    }

    fn cancel(&mut self, frame: Frame) -> Activation {
        self.state.recompute_passive_buffs();
        self.log(&format!(
            "Effect cancelled, {} action(s) skipped",
            frame.queue.len()
        ));
        Activation::Cancelled
    }

    fn condition_met(
        &self,
        condition: &Condition,
        source: CardId,
        player: PlayerId,
    ) -> Result<bool> {
        Ok(match condition {
            Condition::SourceInZone { zone } => {
                matches!(self.state.locate(source), Some((_, z)) if z == *zone)
            }
            Condition::SourceFaceUp => self.state.card(source)?.face_up,
            Condition::LpAtMost { amount } => self.state.get_player(player)?.lp <= *amount,
            Condition::ZoneCountAtLeast {
                zone,
                side,
                count,
                filter,
            } => {
                let options = CandidateOptions {
                    source: Some(source),
                    ..Default::default()
                };
                let found =
                    collect_candidates(&self.state, player, *side, &[*zone], filter, &options);
                found.len() >= *count
            }
        })
    }

    /// Activate every face-up effect listening for the buffered events
    ///
    /// Events raised while these effects resolve stay buffered for the
    /// next call. A listener that errors is logged as an engine fault and
    /// skipped.
    pub fn process_events(&mut self) -> Result<Vec<Activation>> {
        let events = self.state.drain_events();
        let mut activations = Vec::new();
        for event in events {
            let Some(trigger) = event.trigger() else {
                continue;
            };
            for (card, index) in self.listeners(trigger, &event) {
                let Ok(controller) = self.state.card(card).map(|c| c.controller) else {
                    continue;
                };
                let ctx = ActionContext::new(controller).with_source(card).with_event(&event);
                match self.activate_effect(card, index, ctx) {
                    Ok(Activation::Blocked(_)) => {}
                    Ok(other) => activations.push(other),
                    Err(e) => self.state.logger.fault(
                        "process_events",
                        &format!("{card} effect #{index} failed on {trigger:?}: {e}"),
                    ),
                }
            }
        }
        Ok(activations)
    }

    /// (card, effect index) pairs triggered by `event`
    ///
    /// Listeners are face-up cards on either field, plus the event's own
    /// card wherever it now is.
    fn listeners(
        &self,
        trigger: crate::core::TriggerEvent,
        event: &GameEvent,
    ) -> Vec<(CardId, usize)> {
        let mut cards: Vec<CardId> = Vec::new();
        for player in self.state.player_ids() {
            for zone in [ZoneKind::Field, ZoneKind::SpellTrap, ZoneKind::FieldSpell] {
                cards.extend(
                    self.state
                        .zone(player, zone)
                        .iter()
                        .filter(|id| self.state.card(**id).is_ok_and(|c| c.face_up)),
                );
            }
        }
        if !cards.contains(&event.card()) {
            cards.push(event.card());
        }

        let mut out = Vec::new();
        for id in cards {
            let Ok(card) = self.state.card(id) else {
                continue;
            };
            for (index, effect) in card.effects.iter().enumerate() {
                if effect.timing == Timing::OnEvent && effect.event == Some(trigger) {
                    out.push((id, index));
                }
            }
        }
        out
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("state", &self.state)
            .field("registry", &self.registry)
            .field("has_ui", &self.ui.is_some())
            .finish()
    }
}
