//! equip: attach the source equip spell to a monster

use super::{existing_targets, on_field, requirement_for, resumed_pick, select, Pick};
use crate::actions::registry::{ActionHandler, PendingDecision, Resume, Step};
use crate::actions::Engine;
use crate::core::{ActionDescriptor, CandidateFilter, CardId, StatDelta};
use crate::game::{ActionContext, ResolvedTargets, SelectionPurpose};
use crate::zones::ZoneKind;
use crate::{DuelError, Result};

#[derive(Debug, Clone, Copy, Default)]
pub struct Equip;

impl Equip {
    fn source(ctx: &ActionContext) -> Result<CardId> {
        ctx.source
            .ok_or_else(|| DuelError::InvalidAction("equip needs a source card".to_string()))
    }

    fn attach(
        host: CardId,
        action: &ActionDescriptor,
        ctx: &mut ActionContext,
        engine: &mut Engine,
    ) -> Result<Step> {
        let equip = Self::source(ctx)?;
        let bonus = StatDelta::new(action.atk, action.def);
        engine.state.attach_equip(equip, host, bonus, action.destroy_host)?;
        let message = format!(
            "{} equipped to {}",
            engine.state.card(equip)?.name,
            engine.state.card(host)?.name
        );
        engine.log(&message);
        ctx.target = Some(host);
        ctx.last_affected = vec![host];
        Ok(Step::Done(true))
    }

    fn settle(
        pick: Pick,
        action: &ActionDescriptor,
        ctx: &mut ActionContext,
        engine: &mut Engine,
    ) -> Result<Step> {
        match pick {
            Pick::Cards(cards) => match cards.first() {
                Some(&host) => Self::attach(host, action, ctx, engine),
                None => Ok(Step::Done(false)),
            },
            Pick::Cancelled => Ok(Step::Aborted),
            Pick::Pending(pending) => Ok(Step::Suspend(pending)),
            Pick::Unsatisfiable => Ok(Step::Done(false)),
        }
    }
}

impl ActionHandler for Equip {
    fn execute(
        &self,
        action: &ActionDescriptor,
        ctx: &mut ActionContext,
        resolved: &ResolvedTargets,
        engine: &mut Engine,
    ) -> Result<Step> {
        let equip = Self::source(ctx)?;
        if !matches!(engine.state.locate(equip), Some((_, ZoneKind::SpellTrap))) {
            engine.log("Equip spell is no longer in place");
            return Ok(Step::Done(false));
        }

        if action.target.is_some() {
            let targets = existing_targets(&engine.state, action, ctx, resolved);
            let hosts = on_field(&engine.state, targets);
            return Self::settle(Pick::Cards(hosts), action, ctx, engine);
        }

        let mut host_pick = action.clone();
        host_pick.count = Some(1);
        if host_pick.filter == CandidateFilter::default() {
            host_pick.filter = CandidateFilter::monsters();
        }
        let purpose = SelectionPurpose::Target;
        let requirement =
            requirement_for(&engine.state, &host_pick, ctx, purpose, ZoneKind::Field);
        let pick = select(engine, requirement, 0)?;
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
