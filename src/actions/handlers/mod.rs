//! Built-in action handlers

mod cost;
mod equip;
mod relocate;
mod resources;
mod stats;
mod summon;

pub use cost::PayCost;
pub use equip::Equip;
pub use relocate::Relocate;
pub use resources::{Draw, ModifyLp};
pub use stats::{ApplyBuff, BoostStats, GrantExtraAttack, GrantProtection, RemoveBuff, SetStatus};
pub use summon::{CreateToken, SpecialSummon};

use crate::actions::registry::{ActionRegistry, PendingDecision, Prompt, Resume};
use crate::actions::Engine;
use crate::core::{ActionDescriptor, ActionKind, Card, CardId, PlayerId, ProtectionKind, StatusFlag};
use crate::game::{
    collect_candidates, resolve_target_cards, ActionContext, CandidateOptions, GameState,
    ResolvedTargets, Selection, SelectionPurpose, SelectionRequirement, SelectionStep,
    TargetOptions,
};
use crate::zones::ZoneKind;
use crate::{DuelError, Result};
use smallvec::smallvec;

pub(crate) fn register_builtins(registry: &mut ActionRegistry) {
    registry.register(ActionKind::MoveCards, Relocate::selected());
    registry.register(ActionKind::Destroy, Relocate::destroying());
    registry.register(ActionKind::SendToGraveyard, Relocate::to(ZoneKind::Graveyard));
    registry.register(ActionKind::Banish, Relocate::to(ZoneKind::Banished));
    registry.register(ActionKind::ReturnToHand, Relocate::to(ZoneKind::Hand));
    registry.register(ActionKind::ReturnToDeck, Relocate::to(ZoneKind::Deck));
    registry.register(ActionKind::SpecialSummon, SpecialSummon);
    registry.register(ActionKind::Draw, Draw);
    registry.register(ActionKind::SetStatus, SetStatus);
    registry.register(ActionKind::BoostStats, BoostStats);
    registry.register(ActionKind::ApplyBuff, ApplyBuff);
    registry.register(ActionKind::RemoveBuff, RemoveBuff);
    registry.register(ActionKind::PayCost, PayCost);
    registry.register(ActionKind::GrantExtraAttack, GrantExtraAttack);
    registry.register(ActionKind::GrantProtection, GrantProtection);
    registry.register(ActionKind::Equip, Equip);
    registry.register(ActionKind::CreateToken, CreateToken);
    registry.register(ActionKind::ModifyLp, ModifyLp);
}

/// Outcome of working out which cards an action applies to
pub(crate) enum Pick {
    Cards(Vec<CardId>),
    Cancelled,
    Pending(PendingDecision),
    Unsatisfiable,
}

/// Opponent cards shielded from targeting are never candidates
fn targetable_by(player: PlayerId) -> impl Fn(&Card) -> bool {
    move |card: &Card| {
        card.controller == player
            || !(card.has_status(StatusFlag::CannotBeTargeted)
                || card.is_protected_from(ProtectionKind::Targeting))
    }
}

/// Selection requirement over the action's `from` zone
pub(crate) fn requirement_for(
    state: &GameState,
    action: &ActionDescriptor,
    ctx: &ActionContext,
    purpose: SelectionPurpose,
    default_from: ZoneKind,
) -> SelectionRequirement {
    let zone = action.from.unwrap_or(default_from);
    let targetable = targetable_by(ctx.player);
    let options = CandidateOptions {
        source: ctx.source,
        predicate: match purpose {
            SelectionPurpose::Target => Some(&targetable as &dyn Fn(&Card) -> bool),
            _ => None,
        },
        ..Default::default()
    };
    let candidates =
        collect_candidates(state, ctx.player, action.player, &[zone], &action.filter, &options);
    let (min, max) = action.bounds();
    let id = action
        .store_as
        .clone()
        .unwrap_or_else(|| action.kind.to_string());

    let mut requirement =
        SelectionRequirement::new(id, ctx.player, candidates, min, max).with_purpose(purpose);
    requirement.zones = smallvec![zone];
    requirement.owner = action.player;
    requirement.filter = action.filter.clone();
    requirement
}

/// Run a requirement through the selection protocol
pub(crate) fn select(
    engine: &mut Engine,
    requirement: SelectionRequirement,
    stage: u8,
) -> Result<Pick> {
    Ok(match engine.choose_cards(requirement)? {
        SelectionStep::Ready(Selection::Chosen(cards)) => Pick::Cards(cards),
        SelectionStep::Ready(Selection::Cancelled) => Pick::Cancelled,
        SelectionStep::Pending(requirement) => {
            let pending = PendingDecision::new(Prompt::Select(requirement));
            Pick::Pending(pending.at_stage(stage, Vec::new()))
        }
        SelectionStep::Unsatisfiable => Pick::Unsatisfiable,
    })
}

/// The action's target reference if it has one, otherwise a selection
pub(crate) fn pick_cards(
    engine: &mut Engine,
    action: &ActionDescriptor,
    ctx: &ActionContext,
    resolved: &ResolvedTargets,
    purpose: SelectionPurpose,
    default_from: ZoneKind,
) -> Result<Pick> {
    if action.target.is_some() {
        return Ok(Pick::Cards(existing_targets(&engine.state, action, ctx, resolved)));
    }
    let requirement = requirement_for(&engine.state, action, ctx, purpose, default_from);
    select(engine, requirement, 0)
}

/// Turn a resumed selection answer into a pick
pub(crate) fn resumed_pick(pending: &PendingDecision, input: Resume) -> Result<Pick> {
    match (input, &pending.prompt) {
        (Resume::Aborted, _) => Ok(Pick::Cancelled),
        (Resume::Cards(cards), Prompt::Select(requirement)) => {
            Ok(Pick::Cards(requirement.validate(&cards)?))
        }
        (other, prompt) => Err(DuelError::InvalidResume(format!(
            "{other:?} does not answer {prompt:?}"
        ))),
    }
}

/// Resolved target reference, dropping cards that no longer exist
pub(crate) fn existing_targets(
    state: &GameState,
    action: &ActionDescriptor,
    ctx: &ActionContext,
    resolved: &ResolvedTargets,
) -> Vec<CardId> {
    let exists = |_: &Card| true;
    resolve_target_cards(action, ctx, resolved, &TargetOptions::filtered(&state.cards, &exists))
}

/// Target reference, or the source card when the action names none
pub(crate) fn targets_or_source(
    state: &GameState,
    action: &ActionDescriptor,
    ctx: &ActionContext,
    resolved: &ResolvedTargets,
) -> Vec<CardId> {
    if action.target.is_some() {
        existing_targets(state, action, ctx, resolved)
    } else {
        ctx.source.into_iter().filter(|id| state.cards.contains(*id)).collect()
    }
}

/// Targets that are monsters currently on a field
pub(crate) fn on_field(state: &GameState, cards: Vec<CardId>) -> Vec<CardId> {
    cards
        .into_iter()
        .filter(|id| matches!(state.locate(*id), Some((_, ZoneKind::Field))))
        .collect()
}
