//! End-to-end rule scenarios and board invariants

use duel_engine::actions::{Activation, Engine};
use duel_engine::core::{
    ActionDescriptor, ActionKind, CandidateFilter, Card, CardId, CardKind, CardSubtype,
    ControllerKind, EffectDescriptor, OneOrMany, PlayerId, Position, StatDelta, TargetRef,
    TargetSentinel, Timing, TokenSpec, TriggerEvent,
};
use duel_engine::game::{
    collect_zone_candidates, resolve_target_cards, ActionContext, CandidateOptions, DuelConfig,
    GameState, MoveOptions, ResolvedTargets, ScriptedUi, TargetOptions,
};
use duel_engine::zones::ZoneKind;
use duel_engine::Result;
use similar_asserts::assert_eq;
use std::sync::Arc;

fn new_game() -> GameState {
    let mut game = GameState::new_two_player("Alice", "Bob", DuelConfig::default());
    game.logger.enable_capture();
    game
}

fn monster(
    game: &mut GameState,
    owner: PlayerId,
    zone: ZoneKind,
    level: u8,
    atk: i32,
) -> Result<CardId> {
    let id = game.next_card_id();
    let card = Card::monster(id, format!("Monster {}", id.as_u32()), owner, level, atk, 1000);
    game.add_card(card, zone)
}

fn equip_spell(game: &mut GameState, owner: PlayerId) -> Result<CardId> {
    let id = game.next_card_id();
    let mut card = Card::new(id, "Iron Gauntlet", CardKind::Spell, owner);
    card.subtype = Some(CardSubtype::Equip);
    game.add_card(card, ZoneKind::SpellTrap)
}

fn field_stats(game: &GameState) -> Result<Vec<StatDelta>> {
    game.monsters_on_field()
        .iter()
        .map(|id| game.card(*id).map(|c| c.stats()))
        .collect()
}

/// Every card sits in at most one container across both players
fn assert_unique_placement(game: &GameState) {
    for (id, _) in game.cards.iter() {
        assert!(game.holdings(*id).len() <= 1, "{id} is held by {:?}", game.holdings(*id));
    }
}

#[test]
fn test_scenario_a_boosted_equipped_monster_to_graveyard() -> Result<()> {
    let mut game = new_game();
    let [p1, _] = game.player_ids();
    let host = monster(&mut game, p1, ZoneKind::Field, 4, 1600)?;
    let equip = equip_spell(&mut game, p1)?;

    game.card_mut(host)?.add_temp_boost(StatDelta::new(500, 0));
    game.attach_equip(equip, host, StatDelta::new(300, 200), false)?;
    assert_eq!(game.card(host)?.stats(), StatDelta::new(2400, 1200));

    game.move_card(host, p1, ZoneKind::Graveyard, MoveOptions::default())
        .expect("host moves");

    let host_card = game.card(host)?;
    assert_eq!(host_card.temp_boost, StatDelta::ZERO);
    assert_eq!(host_card.stats(), StatDelta::new(1600, 1000));
    assert_eq!(game.locate(equip), Some((p1, ZoneKind::Graveyard)));
    assert_eq!(game.relations().host_of(equip), None);
    assert!(game.relations().equips_of(host).is_empty());
    assert!(!game.relations().mentions(host));
    assert_unique_placement(&game);
    Ok(())
}

#[test]
fn test_scenario_b_bounced_token_leaves_the_game() -> Result<()> {
    let mut engine = Engine::new(new_game());
    let [p1, _] = engine.state.player_ids();
    let spec = TokenSpec {
        name: "Sheep".into(),
        atk: 0,
        def: 0,
        level: 1,
        monster_type: None,
    };
    let token = engine.state.create_token(p1, &spec, Position::Defense).expect("room for a token");
    let equip = equip_spell(&mut engine.state, p1)?;
    engine.state.attach_equip(equip, token, StatDelta::new(500, 0), false)?;

    let bounce = ActionDescriptor::new(ActionKind::ReturnToHand)
        .with_target(TargetRef::Literal(vec![token]));
    let outcome = engine.run_actions(vec![bounce], ActionContext::new(p1))?;
    assert!(matches!(outcome, Activation::Resolved { effective: true }));

    assert!(engine.state.locate(token).is_none());
    assert!(!engine.state.cards.contains(token));
    assert!(!engine.state.zone(p1, ZoneKind::Hand).contains(&token));
    assert_eq!(engine.state.locate(equip), Some((p1, ZoneKind::Graveyard)));
    assert_unique_placement(&engine.state);
    Ok(())
}

#[test]
fn test_scenario_c_level_window_over_mixed_zone() -> Result<()> {
    let mut game = new_game();
    let [p1, _] = game.player_ids();
    let levels = [1, 4, 7, 5, 0, 6, 3, 4, 8, 0];
    let mut ids = Vec::new();
    for (i, level) in levels.iter().enumerate() {
        let id = if *level == 0 {
            let id = game.next_card_id();
            let kind = if i % 2 == 0 { CardKind::Spell } else { CardKind::Trap };
            game.add_card(Card::new(id, format!("Card {i}"), kind, p1), ZoneKind::Hand)?
        } else {
            monster(&mut game, p1, ZoneKind::Hand, *level, 1000)?
        };
        ids.push(id);
    }

    let filter = CandidateFilter {
        card_kind: Some(OneOrMany::One(CardKind::Monster)),
        min_level: Some(4),
        max_level: Some(6),
        ..Default::default()
    };
    let zone = game.zone(p1, ZoneKind::Hand).to_vec();
    let found = collect_zone_candidates(&game.cards, &zone, &filter, &CandidateOptions::default());

    let expected: Vec<CardId> = ids
        .iter()
        .zip(levels)
        .filter(|(_, level)| (4..=6).contains(level))
        .map(|(id, _)| *id)
        .collect();
    assert_eq!(found, expected);
    assert_eq!(found.len(), 4);
    assert_eq!(game.zone(p1, ZoneKind::Hand), zone.as_slice());
    Ok(())
}

#[test]
fn test_scenario_d_last_drawn_card_vs_last_drawn() {
    let (x, y) = (CardId::new(40), CardId::new(41));
    let ctx = ActionContext {
        last_drawn_cards: vec![x, y],
        ..ActionContext::new(PlayerId::new(0))
    };
    let resolved = ResolvedTargets::default();

    let first =
        ActionDescriptor::new(ActionKind::Banish).with_target(TargetSentinel::LastDrawnCard);
    assert_eq!(resolve_target_cards(&first, &ctx, &resolved, &TargetOptions::default()), vec![x]);

    let all = ActionDescriptor::new(ActionKind::Banish).with_target(TargetSentinel::LastDrawn);
    assert_eq!(resolve_target_cards(&all, &ctx, &resolved, &TargetOptions::default()), vec![x, y]);
}

#[test]
fn test_scenario_e_exact_cost_needs_no_prompt() -> Result<()> {
    let mut state = new_game();
    let [p1, _] = state.player_ids();
    state.get_player_mut(p1)?.controller = ControllerKind::Human;
    let fodder = vec![
        monster(&mut state, p1, ZoneKind::Hand, 3, 800)?,
        monster(&mut state, p1, ZoneKind::Hand, 4, 1200)?,
    ];
    let id = state.next_card_id();
    state.add_card(Card::new(id, "Rally", CardKind::Spell, p1), ZoneKind::Hand)?;

    let ui = ScriptedUi::deferring();
    let transcript = ui.transcript();
    let mut engine = Engine::new(state).with_ui(ui);

    let mut cost = ActionDescriptor::new(ActionKind::PayCost)
        .with_filter(CandidateFilter::monsters())
        .with_count(2);
    cost.from = Some(ZoneKind::Hand);
    cost.to = Some(ZoneKind::Graveyard);

    let outcome = engine.run_actions(vec![cost], ActionContext::new(p1))?;
    assert!(matches!(outcome, Activation::Resolved { effective: true }));
    assert_eq!(transcript.prompt_count(), 0);
    assert_eq!(engine.state.zone(p1, ZoneKind::Graveyard), fodder.as_slice());
    assert_eq!(engine.state.zone(p1, ZoneKind::Hand).len(), 1);
    Ok(())
}

#[test]
fn test_passive_recompute_is_idempotent_on_a_busy_board() -> Result<()> {
    use duel_engine::core::{MonsterType, PassiveSpec, Side};

    let mut game = new_game();
    let [p1, p2] = game.player_ids();
    let zombie = MonsterType::new("Zombie");
    for owner in [p1, p2] {
        let id = monster(&mut game, owner, ZoneKind::Field, 4, 1000)?;
        let card = game.card_mut(id)?;
        card.effects = Arc::from(vec![EffectDescriptor::passive(PassiveSpec::GraveyardTypeCount {
            monster_type: zombie.clone(),
            atk_per: 300,
            def_per: -400,
            side: Side::Both,
        })]);
        for _ in 0..4 {
            let g = monster(&mut game, owner, ZoneKind::Graveyard, 2, 100)?;
            game.card_mut(g)?.monster_types.push(zombie.clone());
        }
    }

    game.recompute_passive_buffs();
    let snapshot = field_stats(&game)?;
    // 8 zombies: +2400 atk, def clamps at zero
    assert!(snapshot.iter().all(|s| *s == StatDelta::new(3400, 0)));

    game.recompute_passive_buffs();
    let again = field_stats(&game)?;
    assert_eq!(snapshot, again);
    Ok(())
}

#[test]
fn test_equip_round_trip_many_times() -> Result<()> {
    let mut game = new_game();
    let [p1, _] = game.player_ids();
    let host = monster(&mut game, p1, ZoneKind::Field, 4, 200)?;
    let before = game.card(host)?.stats();

    for _ in 0..5 {
        let equip = equip_spell(&mut game, p1)?;
        // Negative bonus larger than the stat clamps; the reversal still lands exactly
        game.attach_equip(equip, host, StatDelta::new(-700, 300), false)?;
        game.move_card(equip, p1, ZoneKind::Graveyard, MoveOptions::default())
            .expect("equip leaves");
        assert_eq!(game.card(host)?.stats(), before);
    }
    assert_unique_placement(&game);
    Ok(())
}

#[test]
fn test_once_per_turn_effect_resolves_once_each_turn() -> Result<()> {
    use duel_engine::actions::BlockReason;

    let mut game = new_game();
    let [p1, _] = game.player_ids();
    for _ in 0..10 {
        monster(&mut game, p1, ZoneKind::Deck, 3, 500)?;
    }
    let source = monster(&mut game, p1, ZoneKind::Field, 4, 1500)?;
    let draw = ActionDescriptor::new(ActionKind::Draw);
    let mut effect = EffectDescriptor::new(Timing::Ignition, vec![draw]);
    effect.once_per_turn = true;
    game.card_mut(source)?.effects = Arc::from(vec![effect]);

    let mut engine = Engine::new(game);
    for _ in 0..3 {
        let first = engine.activate_effect(source, 0, ActionContext::new(p1))?;
        assert!(first.is_resolved());
        for _ in 0..3 {
            let again = engine.activate_effect(source, 0, ActionContext::new(p1))?;
            assert!(matches!(again, Activation::Blocked(BlockReason::UsedThisTurn)));
        }
        engine.state.end_turn();
    }
    assert_eq!(engine.state.zone(p1, ZoneKind::Hand).len(), 3);
    Ok(())
}

#[test]
fn test_failing_listener_does_not_drop_other_triggers() -> Result<()> {
    let mut game = new_game();
    let [p1, _] = game.player_ids();
    monster(&mut game, p1, ZoneKind::Deck, 3, 500)?;

    let mut listeners = Vec::new();
    for action in [
        // No token template: the handler errors
        ActionDescriptor::new(ActionKind::CreateToken),
        ActionDescriptor::new(ActionKind::Draw),
    ] {
        let mut effect = EffectDescriptor::new(Timing::OnEvent, vec![action]);
        effect.event = Some(TriggerEvent::CardToGrave);
        let id = game.next_card_id();
        let mut card = Card::monster(id, format!("Mourner {}", id.as_u32()), p1, 4, 1000, 1000);
        card.effects = Arc::from(vec![effect]);
        listeners.push(game.add_card(card, ZoneKind::Field)?);
    }
    let victim = monster(&mut game, p1, ZoneKind::Hand, 4, 1200)?;
    game.move_card(victim, p1, ZoneKind::Graveyard, MoveOptions::default())
        .expect("discarded");

    let mut engine = Engine::new(game);
    let activations = engine.process_events()?;
    assert_eq!(activations.len(), 1);
    assert!(activations[0].is_resolved());
    assert_eq!(engine.state.zone(p1, ZoneKind::Hand).len(), 1);
    assert!(engine.state.zone(p1, ZoneKind::Deck).is_empty());

    let faults = engine.state.logger.logs_in("engine_fault");
    assert_eq!(faults.len(), 1);
    assert!(faults[0].message.contains(&listeners[0].to_string()));
    Ok(())
}
