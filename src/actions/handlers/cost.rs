//! pay_cost: relocate chosen cards (or pay LP), then run the continuation

use super::{pick_cards, resumed_pick, Pick};
use crate::actions::registry::{ActionHandler, PendingDecision, Resume, Step};
use crate::actions::Engine;
use crate::core::{ActionDescriptor, CardId};
use crate::game::{ActionContext, MoveOptions, MoveReason, ResolvedTargets, SelectionPurpose};
use crate::zones::ZoneKind;
use crate::{DuelError, Result};

#[derive(Debug, Clone, Copy, Default)]
pub struct PayCost;

impl PayCost {
    fn destination(action: &ActionDescriptor) -> Result<ZoneKind> {
        match action.to.unwrap_or(ZoneKind::Graveyard) {
            zone @ (ZoneKind::Graveyard | ZoneKind::Banished) => Ok(zone),
            other => Err(DuelError::InvalidAction(format!(
                "costs go to the graveyard or banishment, not {other}"
            ))),
        }
    }

    /// An LP cost: `amount` with nothing to select
    fn is_life_cost(action: &ActionDescriptor) -> bool {
        action.amount > 0 && action.target.is_none() && action.from.is_none()
    }

    fn pay_life(
        action: &ActionDescriptor,
        ctx: &ActionContext,
        engine: &mut Engine,
    ) -> Result<Step> {
        let player = engine.state.get_player_mut(ctx.player)?;
        if player.lp < action.amount {
            return Ok(Step::Done(false));
        }
        player.lose_lp(action.amount);
        let message = format!("{} pays {} LP", player.name, action.amount);
        engine.log(&message);
        Ok(Step::Then(action.then.clone()))
    }

    fn settle(
        pick: Pick,
        action: &ActionDescriptor,
        ctx: &mut ActionContext,
        engine: &mut Engine,
    ) -> Result<Step> {
        match pick {
            Pick::Cards(cards) => Self::pay(cards, action, ctx, engine),
            // Declining the cost pays nothing and skips the continuation
            Pick::Cancelled => Ok(Step::Aborted),
            Pick::Pending(pending) => Ok(Step::Suspend(pending)),
            Pick::Unsatisfiable => {
                engine.log(&format!("Cost of {} cannot be paid", action.kind));
                Ok(Step::Done(false))
            }
        }
    }

    fn pay(
        cards: Vec<CardId>,
        action: &ActionDescriptor,
        ctx: &mut ActionContext,
        engine: &mut Engine,
    ) -> Result<Step> {
        let dest = Self::destination(action)?;
        let mut paid = Vec::with_capacity(cards.len());
        for card in cards {
            let owner = engine.state.card(card)?.owner;
            let options = MoveOptions::default().with_reason(MoveReason::Cost);
            match engine.state.move_card(card, owner, dest, options) {
                Ok(_) => paid.push(card),
                Err(e) => engine.log(&format!("Could not pay with {card}: {e}")),
            }
        }
        let (min, _) = action.bounds();
        ctx.last_affected = paid.clone();
        if paid.len() < min {
            return Ok(Step::Done(!paid.is_empty()));
        }
        Ok(Step::Then(action.then.clone()))
    }
}

impl ActionHandler for PayCost {
    fn execute(
        &self,
        action: &ActionDescriptor,
        ctx: &mut ActionContext,
        resolved: &ResolvedTargets,
        engine: &mut Engine,
    ) -> Result<Step> {
        if Self::is_life_cost(action) {
            return Self::pay_life(action, ctx, engine);
        }
        Self::destination(action)?;
        let purpose = SelectionPurpose::Cost;
        let pick = pick_cards(engine, action, ctx, resolved, purpose, ZoneKind::Hand)?;
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
        let pick = resumed_pick(&pending, input)?;
        Self::settle(pick, action, ctx, engine)
    }
}
