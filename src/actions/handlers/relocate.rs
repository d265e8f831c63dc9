//! Relocation handlers: move_cards, destroy, send_to_graveyard, banish,
//! return_to_hand, return_to_deck

use super::{pick_cards, resumed_pick, Pick};
use crate::actions::registry::{ActionHandler, PendingDecision, Resume, Step};
use crate::actions::Engine;
use crate::core::{ActionDescriptor, CardId, ProtectionKind};
use crate::game::{
    ActionContext, MoveOptions, MoveReason, ResolvedTargets, SelectionPurpose, SummonMethod,
};
use crate::zones::ZoneKind;
use crate::{DuelError, Result};

#[derive(Debug, Clone, Copy)]
pub struct Relocate {
    /// Fixed destination; `None` reads `to` from the action
    dest: Option<ZoneKind>,
    destroy: bool,
}

impl Relocate {
    /// `move_cards`: both zones come from the action
    pub fn selected() -> Self {
        Relocate {
            dest: None,
            destroy: false,
        }
    }

    pub fn destroying() -> Self {
        Relocate {
            dest: Some(ZoneKind::Graveyard),
            destroy: true,
        }
    }

    pub fn to(dest: ZoneKind) -> Self {
        Relocate {
            dest: Some(dest),
            destroy: false,
        }
    }

    fn destination(&self, action: &ActionDescriptor) -> Result<ZoneKind> {
        self.dest.or(action.to).ok_or_else(|| {
            DuelError::InvalidAction(format!("{} needs a destination zone", action.kind))
        })
    }

    fn default_from(&self, action: &ActionDescriptor) -> Result<ZoneKind> {
        match (self.dest, action.from) {
            (_, Some(from)) => Ok(from),
            (Some(_), None) => Ok(ZoneKind::Field),
            (None, None) if action.target.is_some() => Ok(ZoneKind::Field),
            (None, None) => Err(DuelError::InvalidAction(
                "move_cards without a target needs a source zone".to_string(),
            )),
        }
    }

    fn settle(
        &self,
        pick: Pick,
        action: &ActionDescriptor,
        ctx: &mut ActionContext,
        engine: &mut Engine,
    ) -> Result<Step> {
        match pick {
            Pick::Cards(cards) => self.relocate(cards, action, ctx, engine),
            Pick::Cancelled => Ok(Step::Aborted),
            Pick::Pending(pending) => Ok(Step::Suspend(pending)),
            Pick::Unsatisfiable => Ok(Step::Done(false)),
        }
    }

    fn relocate(
        &self,
        cards: Vec<CardId>,
        action: &ActionDescriptor,
        ctx: &mut ActionContext,
        engine: &mut Engine,
    ) -> Result<Step> {
        let dest = self.destination(action)?;
        let mut moved = Vec::with_capacity(cards.len());

        for card in cards {
            let Ok(c) = engine.state.card(card) else {
                continue;
            };
            let (owner, name) = (c.owner, c.name.clone());
            let shielded = c.controller != ctx.player
                && c.is_protected_from(ProtectionKind::Effect)
                && matches!(engine.state.locate(card), Some((_, ZoneKind::Field)));
            if shielded {
                engine.log(&format!("{name} is protected and unaffected"));
                continue;
            }

            let result = if self.destroy {
                engine.state.destroy_card(card)
            } else if dest == ZoneKind::Field {
                let position = engine.state.preferred_position(card);
                let options = MoveOptions {
                    position: Some(position),
                    summon: SummonMethod::Special,
                    ..Default::default()
                };
                engine.state.move_card(card, ctx.player, dest, options)
            } else {
                let options = MoveOptions::default().with_reason(MoveReason::Effect);
                engine.state.move_card(card, owner, dest, options)
            };

            match result {
                Ok(_) => moved.push(card),
                Err(e) => engine.log(&format!("{name} stays where it is: {e}")),
            }
        }

        ctx.last_affected = moved.clone();
        Ok(Step::Done(!moved.is_empty()))
    }
}

impl ActionHandler for Relocate {
    fn execute(
        &self,
        action: &ActionDescriptor,
        ctx: &mut ActionContext,
        resolved: &ResolvedTargets,
        engine: &mut Engine,
    ) -> Result<Step> {
        let from = self.default_from(action)?;
        self.destination(action)?;
        let pick = pick_cards(engine, action, ctx, resolved, SelectionPurpose::Target, from)?;
        self.settle(pick, action, ctx, engine)
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
        self.settle(pick, action, ctx, engine)
    }
}
