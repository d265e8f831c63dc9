//! draw and modify_lp

use crate::actions::registry::{ActionHandler, PendingDecision, Prompt, Resume, Step};
use crate::actions::Engine;
use crate::core::{ActionDescriptor, PlayerId};
use crate::game::{ActionContext, ResolvedTargets, UiReply};
use crate::{DuelError, Result};
use smallvec::SmallVec;

#[derive(Debug, Clone, Copy, Default)]
pub struct Draw;

impl ActionHandler for Draw {
    fn execute(
        &self,
        action: &ActionDescriptor,
        ctx: &mut ActionContext,
        _resolved: &ResolvedTargets,
        engine: &mut Engine,
    ) -> Result<Step> {
        let count = action
            .count
            .map(usize::from)
            .unwrap_or_else(|| action.amount.max(1) as usize);

        let mut drawn = Vec::with_capacity(count);
        for player in engine.state.side_players(ctx.player, action.player) {
            let cards = engine.state.draw_cards(player, count);
            if cards.len() < count {
                let name = engine.state.get_player(player)?.name.clone();
                engine.log(&format!("{name} could only draw {} of {count}", cards.len()));
            }
            drawn.extend(cards);
        }

        ctx.last_drawn_cards = drawn.clone();
        ctx.last_affected = drawn;
        Ok(Step::Done(!ctx.last_drawn_cards.is_empty()))
    }
}

/// Gain LP for a positive `amount`, take damage for a negative one
///
/// With `amount` zero and `max` set, the controller picks how much
/// damage to deal, up to `max`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModifyLp;

impl ModifyLp {
    fn apply(
        delta: i32,
        action: &ActionDescriptor,
        ctx: &ActionContext,
        engine: &mut Engine,
    ) -> Result<Step> {
        if delta == 0 {
            return Ok(Step::Done(false));
        }
        let players: SmallVec<[PlayerId; 2]> = engine.state.side_players(ctx.player, action.player);
        for player in players {
            let p = engine.state.get_player_mut(player)?;
            if delta > 0 {
                p.gain_lp(delta);
            } else {
                p.lose_lp(-delta);
            }
            let verb = if delta > 0 { "gains" } else { "loses" };
            let message = format!("{} {verb} {} LP (now {})", p.name, delta.abs(), p.lp);
            engine.log(&message);
        }
        Ok(Step::Done(true))
    }
}

impl ActionHandler for ModifyLp {
    fn execute(
        &self,
        action: &ActionDescriptor,
        ctx: &mut ActionContext,
        _resolved: &ResolvedTargets,
        engine: &mut Engine,
    ) -> Result<Step> {
        let Some(max) = action.max.filter(|_| action.amount == 0) else {
            return Self::apply(action.amount, action, ctx, engine);
        };

        let max = i32::from(max);
        let prompt = format!("How much damage? (0-{max})");
        match engine.choose_number(ctx.player, &prompt, 0, max) {
            UiReply::Ready(value) => Self::apply(-value.clamp(0, max), action, ctx, engine),
            UiReply::Cancelled => Ok(Step::Aborted),
            UiReply::Deferred => {
                let pending = PendingDecision::new(Prompt::Number { prompt, min: 0, max });
                Ok(Step::Suspend(pending))
            }
        }
    }

    fn resume(
        &self,
        action: &ActionDescriptor,
        ctx: &mut ActionContext,
        _resolved: &ResolvedTargets,
        pending: PendingDecision,
        input: Resume,
        engine: &mut Engine,
    ) -> Result<Step> {
        let Prompt::Number { min, max, .. } = pending.prompt else {
            return Err(DuelError::InvalidResume("modify_lp only asks for numbers".to_string()));
        };
        match input {
            Resume::Number(value) if (min..=max).contains(&value) => {
                Self::apply(-value, action, ctx, engine)
            }
            Resume::Number(value) => Err(DuelError::InvalidResume(format!(
                "{value} is outside {min}..={max}"
            ))),
            Resume::Aborted => Ok(Step::Aborted),
            other => Err(DuelError::InvalidResume(format!(
                "{other:?} does not answer a number prompt"
            ))),
        }
    }
}
