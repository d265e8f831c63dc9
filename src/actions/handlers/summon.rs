//! special_summon and create_token

use super::{existing_targets, requirement_for, resumed_pick, select, Pick};
use crate::actions::registry::{ActionHandler, PendingDecision, Prompt, Resume, Step};
use crate::actions::Engine;
use crate::core::{ActionDescriptor, CardId, Position};
use crate::game::{
    ActionContext, MoveOptions, MoveRejection, ResolvedTargets, SelectionPurpose, SummonMethod,
    UiReply,
};
use crate::zones::ZoneKind;
use crate::{DuelError, Result};

/// Stage of a suspended special summon
const PICKING: u8 = 0;
const POSITIONING: u8 = 1;

#[derive(Debug, Clone, Copy, Default)]
pub struct SpecialSummon;

impl SpecialSummon {
    fn free_slots(engine: &Engine, ctx: &ActionContext) -> usize {
        engine
            .state
            .get_player_zones(ctx.player)
            .map(|zones| {
                let field = &zones.field;
                field.capacity.map_or(usize::MAX, |cap| cap.saturating_sub(field.len()))
            })
            .unwrap_or(0)
    }

    fn settle(
        pick: Pick,
        action: &ActionDescriptor,
        ctx: &mut ActionContext,
        engine: &mut Engine,
    ) -> Result<Step> {
        match pick {
            Pick::Cards(cards) => Self::position_and_summon(cards, action, ctx, engine),
            Pick::Cancelled => Ok(Step::Aborted),
            Pick::Pending(pending) => Ok(Step::Suspend(pending)),
            Pick::Unsatisfiable => Ok(Step::Done(false)),
        }
    }

    /// Pick a position for the chosen cards, suspending if a human must answer
    fn position_and_summon(
        cards: Vec<CardId>,
        action: &ActionDescriptor,
        ctx: &mut ActionContext,
        engine: &mut Engine,
    ) -> Result<Step> {
        let position = match (action.position, cards.first()) {
            (Some(position), _) => position,
            (None, None) => return Ok(Step::Done(false)),
            (None, Some(&first)) => match engine.choose_position(ctx.player, first) {
                UiReply::Ready(position) => position,
                UiReply::Cancelled => return Ok(Step::Aborted),
                UiReply::Deferred => {
                    let pending = PendingDecision::new(Prompt::SummonPosition(first))
                        .at_stage(POSITIONING, cards);
                    return Ok(Step::Suspend(pending));
                }
            },
        };
        Self::summon(cards, position, action, ctx, engine)
    }

    fn summon(
        cards: Vec<CardId>,
        position: Position,
        action: &ActionDescriptor,
        ctx: &mut ActionContext,
        engine: &mut Engine,
    ) -> Result<Step> {
        let mut summoned = Vec::with_capacity(cards.len());
        for card in cards {
            let options = MoveOptions::summon(SummonMethod::Special, position);
            match engine.state.move_card(card, ctx.player, ZoneKind::Field, options) {
                Ok(_) => summoned.push(card),
                Err(MoveRejection::ZoneFull { .. }) => {
                    engine.log("No free monster zone for the rest of the summon");
                    break;
                }
                Err(e) => engine.log(&format!("Could not summon {card}: {e}")),
            }
        }

        if action.bind {
            if let Some(source) = ctx.source {
                for &card in &summoned {
                    engine.state.bind_monster(source, card)?;
                }
            }
        }

        if let Some(&first) = summoned.first() {
            ctx.summoned_card = Some(first);
        }
        ctx.last_affected = summoned.clone();
        Ok(Step::Done(!summoned.is_empty()))
    }
}

impl ActionHandler for SpecialSummon {
    fn execute(
        &self,
        action: &ActionDescriptor,
        ctx: &mut ActionContext,
        resolved: &ResolvedTargets,
        engine: &mut Engine,
    ) -> Result<Step> {
        let free = Self::free_slots(engine, ctx);

        if action.target.is_some() {
            let mut cards = existing_targets(&engine.state, action, ctx, resolved);
            cards.truncate(free);
            return Self::position_and_summon(cards, action, ctx, engine);
        }

        let purpose = SelectionPurpose::Summon;
        let mut requirement =
            requirement_for(&engine.state, action, ctx, purpose, ZoneKind::Graveyard);
        if free < requirement.min {
            engine.log("Not enough free monster zones to summon");
            return Ok(Step::Done(false));
        }
        requirement.max = requirement.max.min(free);
        let pick = select(engine, requirement, PICKING)?;
        Self::settle(pick, action, ctx, engine)
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
        match (pending.stage, input) {
            (POSITIONING, Resume::Position(position)) => {
                Self::summon(pending.carried, position, action, ctx, engine)
            }
            (POSITIONING, Resume::Aborted) => Ok(Step::Aborted),
            (POSITIONING, other) => Err(DuelError::InvalidResume(format!(
                "{other:?} does not answer a summon position prompt"
            ))),
            (_, input) => {
                let pick = resumed_pick(&pending, input)?;
                Self::settle(pick, action, ctx, engine)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CreateToken;

impl ActionHandler for CreateToken {
    fn execute(
        &self,
        action: &ActionDescriptor,
        ctx: &mut ActionContext,
        _resolved: &ResolvedTargets,
        engine: &mut Engine,
    ) -> Result<Step> {
        let spec = action.token.as_ref().ok_or_else(|| {
            DuelError::InvalidAction("create_token needs a token template".to_string())
        })?;
        let count = action
            .count
            .map(usize::from)
            .unwrap_or_else(|| action.amount.max(1) as usize);
        let position = action.position.unwrap_or(Position::Attack);

        let mut created = Vec::with_capacity(count);
        for _ in 0..count {
            match engine.state.create_token(ctx.player, spec, position) {
                Ok(token) => created.push(token),
                Err(MoveRejection::ZoneFull { .. }) => break,
                Err(e) => return Err(DuelError::InvalidAction(e.to_string())),
            }
        }
        if created.len() < count {
            engine.log(&format!("Only {} of {count} {} tokens fit", created.len(), spec.name));
        }
        ctx.last_affected = created.clone();
        Ok(Step::Done(!created.is_empty()))
    }
}
