//! Stat and flag handlers
//!
//! Each of these applies to its target reference, or to the source card
//! when the action names none.

use super::{on_field, targets_or_source};
use crate::actions::registry::{ActionHandler, Step};
use crate::actions::Engine;
use crate::core::{ActionDescriptor, CardId, Duration, Protection, StatDelta};
use crate::game::{ActionContext, ResolvedTargets};
use crate::{DuelError, Result};

fn finish(ctx: &mut ActionContext, touched: Vec<CardId>) -> Result<Step> {
    let effective = !touched.is_empty();
    ctx.last_affected = touched;
    Ok(Step::Done(effective))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SetStatus;

impl ActionHandler for SetStatus {
    fn execute(
        &self,
        action: &ActionDescriptor,
        ctx: &mut ActionContext,
        resolved: &ResolvedTargets,
        engine: &mut Engine,
    ) -> Result<Step> {
        let status = action
            .status
            .ok_or_else(|| DuelError::InvalidAction("set_status needs a status".to_string()))?;
        let mut touched = Vec::new();
        for card in targets_or_source(&engine.state, action, ctx, resolved) {
            if engine.state.card_mut(card)?.set_status(status, action.value) {
                touched.push(card);
            }
        }
        finish(ctx, touched)
    }
}

/// Temporary delta, gone at end of turn or when the card leaves the field
#[derive(Debug, Clone, Copy, Default)]
pub struct BoostStats;

impl ActionHandler for BoostStats {
    fn execute(
        &self,
        action: &ActionDescriptor,
        ctx: &mut ActionContext,
        resolved: &ResolvedTargets,
        engine: &mut Engine,
    ) -> Result<Step> {
        let delta = StatDelta::new(action.atk, action.def);
        let candidates = targets_or_source(&engine.state, action, ctx, resolved);
        let targets = on_field(&engine.state, candidates);
        let mut touched = Vec::new();
        for card in targets {
            let c = engine.state.card_mut(card)?;
            if !c.add_temp_boost(delta).is_zero() {
                touched.push(card);
            }
        }
        finish(ctx, touched)
    }
}

fn buff_source(action: &ActionDescriptor, ctx: &ActionContext, engine: &Engine) -> Result<String> {
    if let Some(name) = &action.source_name {
        return Ok(name.clone());
    }
    let source = ctx.source.ok_or_else(|| {
        DuelError::InvalidAction(format!("{} needs a sourceName or a source card", action.kind))
    })?;
    Ok(engine.state.card(source)?.name.to_string())
}

/// Permanent delta tracked under a source name
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyBuff;

impl ActionHandler for ApplyBuff {
    fn execute(
        &self,
        action: &ActionDescriptor,
        ctx: &mut ActionContext,
        resolved: &ResolvedTargets,
        engine: &mut Engine,
    ) -> Result<Step> {
        let source = buff_source(action, ctx, engine)?;
        let delta = StatDelta::new(action.atk, action.def);
        let candidates = targets_or_source(&engine.state, action, ctx, resolved);
        let targets = on_field(&engine.state, candidates);
        let mut touched = Vec::new();
        for card in targets {
            engine.state.card_mut(card)?.add_permanent_buff(&source, delta);
            touched.push(card);
        }
        finish(ctx, touched)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveBuff;

impl ActionHandler for RemoveBuff {
    fn execute(
        &self,
        action: &ActionDescriptor,
        ctx: &mut ActionContext,
        resolved: &ResolvedTargets,
        engine: &mut Engine,
    ) -> Result<Step> {
        let source = buff_source(action, ctx, engine)?;
        let mut touched = Vec::new();
        for card in targets_or_source(&engine.state, action, ctx, resolved) {
            if engine.state.card_mut(card)?.remove_permanent_buff(&source).is_some() {
                touched.push(card);
            }
        }
        finish(ctx, touched)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GrantExtraAttack;

impl ActionHandler for GrantExtraAttack {
    fn execute(
        &self,
        action: &ActionDescriptor,
        ctx: &mut ActionContext,
        resolved: &ResolvedTargets,
        engine: &mut Engine,
    ) -> Result<Step> {
        let extra = action.amount.clamp(1, i32::from(u8::MAX)) as u8;
        let permanent = action.duration == Some(Duration::Permanent);
        let candidates = targets_or_source(&engine.state, action, ctx, resolved);
        let targets = on_field(&engine.state, candidates);
        for &card in &targets {
            let flags = &mut engine.state.card_mut(card)?.flags;
            flags.extra_attacks = flags.extra_attacks.saturating_add(extra);
            flags.extra_attacks_permanent |= permanent;
        }
        finish(ctx, targets)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GrantProtection;

impl ActionHandler for GrantProtection {
    fn execute(
        &self,
        action: &ActionDescriptor,
        ctx: &mut ActionContext,
        resolved: &ResolvedTargets,
        engine: &mut Engine,
    ) -> Result<Step> {
        let kind = action.protection.ok_or_else(|| {
            DuelError::InvalidAction("grant_protection needs a protection kind".to_string())
        })?;
        let duration = action.duration.unwrap_or(Duration::WhileFaceUp);
        let candidates = targets_or_source(&engine.state, action, ctx, resolved);
        let targets = on_field(&engine.state, candidates);
        for &card in &targets {
            engine.state.card_mut(card)?.protections.push(Protection {
                kind,
                duration,
                source: ctx.source,
            });
        }
        finish(ctx, targets)
    }
}
