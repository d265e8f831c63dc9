//! Suspend/resume sessions for human players

use duel_engine::actions::{Activation, Engine, Prompt, Resume};
use duel_engine::core::{
    ActionDescriptor, ActionKind, CandidateFilter, Card, CardId, ControllerKind, PlayerId, Position,
    TargetRef,
};
use duel_engine::game::{ActionContext, DuelConfig, GameState, ScriptedReply, ScriptedUi};
use duel_engine::zones::ZoneKind;
use duel_engine::{DuelError, Result};
use similar_asserts::assert_eq;

/// A duel where Alice is human, with monsters of the given atk in `zone`
fn human_duel(zone: ZoneKind, atks: &[i32]) -> Result<(GameState, PlayerId, Vec<CardId>)> {
    let mut game = GameState::new_two_player("Alice", "Bob", DuelConfig::default());
    game.logger.enable_capture();
    let [p1, _] = game.player_ids();
    game.get_player_mut(p1)?.controller = ControllerKind::Human;
    let mut ids = Vec::new();
    for atk in atks {
        let id = game.next_card_id();
        let card = Card::monster(id, format!("Monster {atk}"), p1, 4, *atk, 1000);
        ids.push(game.add_card(card, zone)?);
    }
    Ok((game, p1, ids))
}

fn discard_one() -> ActionDescriptor {
    ActionDescriptor::new(ActionKind::MoveCards)
        .with_zones(ZoneKind::Hand, ZoneKind::Graveyard)
        .with_filter(CandidateFilter::monsters())
        .with_count(1)
}

#[test]
fn test_move_cards_suspends_then_resumes_with_choice() -> Result<()> {
    let (game, p1, ids) = human_duel(ZoneKind::Hand, &[1000, 1500, 2000])?;
    let mut engine = Engine::new(game).with_ui(ScriptedUi::deferring());

    let mut action = discard_one();
    action.store_as = Some("discarded".to_string());
    let outcome = engine.run_actions(vec![action], ActionContext::new(p1))?;
    let suspended = outcome.into_suspended().expect("waits for the human");
    assert_eq!(suspended.requirement_id(), Some("discarded"));
    match suspended.prompt() {
        Prompt::Select(requirement) => assert_eq!(requirement.candidates, ids),
        other => panic!("expected a selection prompt, got {other:?}"),
    }
    // Nothing moved while waiting
    assert_eq!(engine.state.zone(p1, ZoneKind::Hand), ids.as_slice());

    let outcome = engine.resume(suspended, Resume::Cards(vec![ids[1]]))?;
    assert!(matches!(outcome, Activation::Resolved { effective: true }));
    assert_eq!(engine.state.zone(p1, ZoneKind::Graveyard), &[ids[1]]);
    assert_eq!(engine.state.zone(p1, ZoneKind::Hand), &[ids[0], ids[2]]);
    // The decision was journaled before the move it led to
    assert_eq!(engine.state.journal.choice_points(), &[0usize]);
    assert_eq!(engine.state.journal.len(), 1);
    Ok(())
}

#[test]
fn test_resume_rejects_non_candidate() -> Result<()> {
    let (mut game, p1, _) = human_duel(ZoneKind::Hand, &[1000, 1500])?;
    let id = game.next_card_id();
    let outsider =
        game.add_card(Card::monster(id, "Outsider", p1, 4, 900, 900), ZoneKind::Graveyard)?;
    let mut engine = Engine::new(game).with_ui(ScriptedUi::deferring());

    let outcome = engine.run_actions(vec![discard_one()], ActionContext::new(p1))?;
    let suspended = outcome.into_suspended().expect("waits for the human");
    let err = engine.resume(suspended, Resume::Cards(vec![outsider])).unwrap_err();
    assert!(matches!(err, DuelError::InvalidResume(_)));
    Ok(())
}

#[test]
fn test_aborted_resume_cancels_the_rest_of_the_effect() -> Result<()> {
    let (mut game, p1, ids) = human_duel(ZoneKind::Hand, &[1000, 1500])?;
    for _ in 0..3 {
        let id = game.next_card_id();
        game.add_card(Card::monster(id, "Deck Monster", p1, 3, 500, 500), ZoneKind::Deck)?;
    }
    let mut engine = Engine::new(game).with_ui(ScriptedUi::deferring());

    let actions = vec![discard_one(), ActionDescriptor::new(ActionKind::Draw)];
    let outcome = engine.run_actions(actions, ActionContext::new(p1))?;
    let suspended = outcome.into_suspended().expect("waits for the human");

    let outcome = engine.resume(suspended, Resume::Aborted)?;
    assert!(matches!(outcome, Activation::Cancelled));
    assert_eq!(engine.state.zone(p1, ZoneKind::Hand), ids.as_slice());
    assert_eq!(engine.state.zone(p1, ZoneKind::Deck).len(), 3);
    Ok(())
}

#[test]
fn test_special_summon_asks_for_position_after_the_pick() -> Result<()> {
    let (game, p1, ids) = human_duel(ZoneKind::Graveyard, &[1200, 2500])?;
    let ui = ScriptedUi::new(vec![ScriptedReply::Cards(vec![ids[0]])]);
    let transcript = ui.transcript();
    let mut engine = Engine::new(game).with_ui(ui);

    let summon =
        ActionDescriptor::new(ActionKind::SpecialSummon).with_filter(CandidateFilter::monsters());
    let outcome = engine.run_actions(vec![summon], ActionContext::new(p1))?;
    let suspended = outcome.into_suspended().expect("position is deferred");
    assert!(matches!(suspended.prompt(), Prompt::SummonPosition(card) if *card == ids[0]));
    assert_eq!(
        transcript.prompts(),
        vec!["select:special_summon".to_string(), format!("position:{}", ids[0])]
    );

    let outcome = engine.resume(suspended, Resume::Position(Position::Defense))?;
    assert!(matches!(outcome, Activation::Resolved { effective: true }));
    let card = engine.state.card(ids[0])?;
    assert_eq!(card.position, Position::Defense);
    assert_eq!(engine.state.locate(ids[0]), Some((p1, ZoneKind::Field)));
    assert_eq!(engine.state.locate(ids[1]), Some((p1, ZoneKind::Graveyard)));
    Ok(())
}

#[test]
fn test_summon_position_prompt_rejects_card_answer() -> Result<()> {
    let (game, p1, ids) = human_duel(ZoneKind::Graveyard, &[1200])?;
    let mut engine = Engine::new(game).with_ui(ScriptedUi::deferring());

    let summon = ActionDescriptor::new(ActionKind::SpecialSummon)
        .with_target(TargetRef::Literal(ids.clone()));
    let outcome = engine.run_actions(vec![summon], ActionContext::new(p1))?;
    let suspended = outcome.into_suspended().expect("position is deferred");
    let err = engine.resume(suspended, Resume::Cards(ids)).unwrap_err();
    assert!(matches!(err, DuelError::InvalidResume(_)));
    Ok(())
}

#[test]
fn test_optional_action_waits_for_confirmation() -> Result<()> {
    let (mut game, p1, _) = human_duel(ZoneKind::Hand, &[])?;
    for _ in 0..2 {
        let id = game.next_card_id();
        game.add_card(Card::monster(id, "Deck Monster", p1, 3, 500, 500), ZoneKind::Deck)?;
    }
    let mut engine = Engine::new(game).with_ui(ScriptedUi::deferring());

    let mut draw = ActionDescriptor::new(ActionKind::Draw);
    draw.optional = true;
    let outcome = engine.run_actions(vec![draw.clone()], ActionContext::new(p1))?;
    let suspended = outcome.into_suspended().expect("confirm is deferred");
    assert!(matches!(suspended.prompt(), Prompt::Confirm(text) if text == "Resolve draw?"));

    let outcome = engine.resume(suspended, Resume::Confirmed(true))?;
    assert!(matches!(outcome, Activation::Resolved { effective: true }));
    assert_eq!(engine.state.zone(p1, ZoneKind::Hand).len(), 1);

    // Declining skips the action without cancelling the effect
    let outcome = engine.run_actions(vec![draw], ActionContext::new(p1))?;
    let suspended = outcome.into_suspended().expect("confirm is deferred");
    let outcome = engine.resume(suspended, Resume::Confirmed(false))?;
    assert!(matches!(outcome, Activation::Resolved { effective: false }));
    assert_eq!(engine.state.zone(p1, ZoneKind::Hand).len(), 1);
    Ok(())
}

#[test]
fn test_empty_answer_is_valid_when_minimum_is_zero() -> Result<()> {
    let (game, p1, ids) = human_duel(ZoneKind::Hand, &[1000, 1500, 2000])?;
    let mut engine = Engine::new(game).with_ui(ScriptedUi::deferring());

    let mut action = ActionDescriptor::new(ActionKind::MoveCards)
        .with_zones(ZoneKind::Hand, ZoneKind::Graveyard);
    action.min = Some(0);
    action.max = Some(2);
    let outcome = engine.run_actions(vec![action], ActionContext::new(p1))?;
    let suspended = outcome.into_suspended().expect("waits for the human");

    let outcome = engine.resume(suspended, Resume::Cards(Vec::new()))?;
    assert!(matches!(outcome, Activation::Resolved { effective: false }));
    assert_eq!(engine.state.zone(p1, ZoneKind::Hand), ids.as_slice());
    Ok(())
}

#[test]
fn test_scripted_cancel_aborts_effect() -> Result<()> {
    let (game, p1, ids) = human_duel(ZoneKind::Hand, &[1000, 1500])?;
    let mut engine = Engine::new(game).with_ui(ScriptedUi::new(vec![ScriptedReply::Cancel]));

    let outcome = engine.run_actions(vec![discard_one()], ActionContext::new(p1))?;
    assert!(matches!(outcome, Activation::Cancelled));
    assert_eq!(engine.state.zone(p1, ZoneKind::Hand), ids.as_slice());
    Ok(())
}

#[test]
fn test_bot_never_suspends() -> Result<()> {
    let (mut game, p1, ids) = human_duel(ZoneKind::Hand, &[1000, 1500, 2000])?;
    game.get_player_mut(p1)?.controller = ControllerKind::Bot;
    let ui = ScriptedUi::deferring();
    let transcript = ui.transcript();
    let mut engine = Engine::new(game).with_ui(ui);

    let outcome = engine.run_actions(vec![discard_one()], ActionContext::new(p1))?;
    assert!(matches!(outcome, Activation::Resolved { effective: true }));
    assert_eq!(transcript.prompt_count(), 0);
    // Targets go to the strongest card
    assert_eq!(engine.state.zone(p1, ZoneKind::Graveyard), &[ids[2]]);
    Ok(())
}
