//! Target resolution
//!
//! Pure lookups that turn target references and zone filters into card
//! lists. Nothing here mutates the game.

use crate::core::{
    ActionDescriptor, CandidateFilter, Card, CardId, EntityStore, PlayerId, Side, TargetRef,
    TargetSentinel,
};
use crate::game::{GameEvent, GameState};
use crate::zones::ZoneKind;
use rustc_hash::FxHashMap;

/// Cards stored by earlier actions of the same effect, by key
pub type ResolvedTargets = FxHashMap<String, Vec<CardId>>;

/// Who and what an effect resolution is about
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionContext {
    pub player: PlayerId,
    pub source: Option<CardId>,
    pub attacker: Option<CardId>,
    pub defender: Option<CardId>,
    pub destroyed: Option<CardId>,
    pub summoned_card: Option<CardId>,
    pub target: Option<CardId>,
    pub last_drawn_cards: Vec<CardId>,
    /// Cards affected by the last finished action, picked up by `store_as`
    pub last_affected: Vec<CardId>,
}

impl ActionContext {
    pub fn new(player: PlayerId) -> Self {
        ActionContext {
            player,
            ..Default::default()
        }
    }

    pub fn with_source(mut self, source: CardId) -> Self {
        self.source = Some(source);
        self
    }

    /// Fill the sentinels an event exposes
    pub fn with_event(mut self, event: &GameEvent) -> Self {
        match event {
            GameEvent::AfterSummon { card, .. } => self.summoned_card = Some(*card),
            GameEvent::CardDestroyed { card, .. } => self.destroyed = Some(*card),
            GameEvent::CardToGrave { card, .. } => self.target = Some(*card),
            GameEvent::CardDrawn { card, .. } => self.last_drawn_cards = vec![*card],
            GameEvent::TokenRemoved { .. } => {}
        }
        self
    }
}

/// Extra knobs for `resolve_target_cards`
#[derive(Default, Clone, Copy)]
pub struct TargetOptions<'a> {
    filter: Option<(&'a EntityStore<Card>, &'a dyn Fn(&Card) -> bool)>,
}

impl<'a> TargetOptions<'a> {
    /// Keep only cards that exist and satisfy `predicate`
    pub fn filtered(cards: &'a EntityStore<Card>, predicate: &'a dyn Fn(&Card) -> bool) -> Self {
        TargetOptions {
            filter: Some((cards, predicate)),
        }
    }
}

/// Resolve an action's target reference into cards, in order
///
/// Single-valued sentinels come back as a one-element vector; an unset
/// sentinel or missing key yields an empty one.
pub fn resolve_target_cards(
    action: &ActionDescriptor,
    ctx: &ActionContext,
    resolved: &ResolvedTargets,
    options: &TargetOptions<'_>,
) -> Vec<CardId> {
    let cards: Vec<CardId> = match &action.target {
        None => Vec::new(),
        Some(TargetRef::Literal(ids)) => ids.clone(),
        Some(TargetRef::Resolved(key)) => resolved.get(key).cloned().unwrap_or_default(),
        Some(TargetRef::Sentinel(sentinel)) => match sentinel {
            TargetSentinel::Source => ctx.source.into_iter().collect(),
            TargetSentinel::Attacker => ctx.attacker.into_iter().collect(),
            TargetSentinel::Defender => ctx.defender.into_iter().collect(),
            TargetSentinel::Destroyed => ctx.destroyed.into_iter().collect(),
            TargetSentinel::SummonedCard => ctx.summoned_card.into_iter().collect(),
            TargetSentinel::Target => ctx.target.into_iter().collect(),
            TargetSentinel::LastDrawnCard => {
                ctx.last_drawn_cards.first().copied().into_iter().collect()
            }
            TargetSentinel::LastDrawn => ctx.last_drawn_cards.clone(),
        },
    };

    match options.filter {
        Some((store, predicate)) => cards
            .into_iter()
            .filter(|id| store.get(*id).is_ok_and(|c| predicate(c)))
            .collect(),
        None => cards,
    }
}

/// Extra knobs for `collect_zone_candidates`
#[derive(Default, Clone, Copy)]
pub struct CandidateOptions<'a> {
    /// The effect's source, for `exclude_self`
    pub source: Option<CardId>,
    /// Cards that may not be picked (restriction list)
    pub exclude: &'a [CardId],
    pub face_up_only: bool,
    pub predicate: Option<&'a dyn Fn(&Card) -> bool>,
}

/// Filter a zone's contents; candidates keep zone order
pub fn collect_zone_candidates(
    cards: &EntityStore<Card>,
    zone: &[CardId],
    filter: &CandidateFilter,
    options: &CandidateOptions<'_>,
) -> Vec<CardId> {
    zone.iter()
        .copied()
        .filter(|id| !options.exclude.contains(id))
        .filter(|id| !(filter.exclude_self && options.source == Some(*id)))
        .filter(|id| {
            cards.get(*id).is_ok_and(|card| {
                matches_filter(card, filter)
                    && (!options.face_up_only || card.face_up)
                    && options.predicate.map_or(true, |p| p(card))
            })
        })
        .collect()
}

/// Does a single card pass a declarative filter
pub fn matches_filter(card: &Card, filter: &CandidateFilter) -> bool {
    if let Some(kinds) = &filter.card_kind {
        if !kinds.contains(&card.kind) {
            return false;
        }
    }
    if let Some(types) = &filter.monster_type {
        if !types.matches_any(&card.monster_types) {
            return false;
        }
    }
    if let Some(archetypes) = &filter.archetype {
        if !archetypes.matches_any(&card.archetypes) {
            return false;
        }
    }
    if let Some(level) = filter.level {
        if !filter.level_op.compare(card.level, level) {
            return false;
        }
    }
    if filter.min_level.is_some_and(|min| card.level < min) {
        return false;
    }
    if filter.max_level.is_some_and(|max| card.level > max) {
        return false;
    }
    if let Some(name) = &filter.name {
        if !card.name.as_str().eq_ignore_ascii_case(name.as_str()) {
            return false;
        }
    }
    if let Some(face_up) = filter.face_up {
        if card.face_up != face_up {
            return false;
        }
    }
    true
}

/// Candidates across the zones of every player on `side`
///
/// Player order is acting player first, then zone order within the list.
pub fn collect_candidates(
    game: &GameState,
    player: PlayerId,
    side: Side,
    zones: &[ZoneKind],
    filter: &CandidateFilter,
    options: &CandidateOptions<'_>,
) -> Vec<CardId> {
    let mut out = Vec::new();
    for p in game.side_players(player, side) {
        for zone in zones {
            out.extend(collect_zone_candidates(&game.cards, game.zone(p, *zone), filter, options));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ActionKind, CardKind, LevelComparator, MonsterType, OneOrMany};

    fn store_with(cards: Vec<Card>) -> (EntityStore<Card>, Vec<CardId>) {
        let mut store = EntityStore::new();
        let ids = cards.iter().map(|c| c.id).collect();
        for card in cards {
            store.insert(card.id, card);
        }
        (store, ids)
    }

    fn monster(id: u32, level: u8) -> Card {
        Card::monster(CardId::new(id), format!("Monster {id}"), PlayerId::new(0), level, 1000, 1000)
    }

    #[test]
    fn test_last_drawn_card_vs_last_drawn() {
        let x = CardId::new(10);
        let y = CardId::new(11);
        let mut ctx = ActionContext::new(PlayerId::new(0));
        ctx.last_drawn_cards = vec![x, y];
        let resolved = ResolvedTargets::default();

        let single = ActionDescriptor::new(ActionKind::SetStatus)
            .with_target(TargetSentinel::LastDrawnCard);
        let all =
            ActionDescriptor::new(ActionKind::SetStatus).with_target(TargetSentinel::LastDrawn);
        let options = TargetOptions::default();
        assert_eq!(resolve_target_cards(&single, &ctx, &resolved, &options), vec![x]);
        assert_eq!(resolve_target_cards(&all, &ctx, &resolved, &options), vec![x, y]);
    }

    #[test]
    fn test_resolved_key_and_predicate() {
        let (store, ids) = store_with(vec![monster(1, 2), monster(2, 7), monster(3, 4)]);
        let mut resolved = ResolvedTargets::default();
        resolved.insert("paid".to_string(), ids.clone());
        let ctx = ActionContext::new(PlayerId::new(0));
        let action = ActionDescriptor::new(ActionKind::Banish)
            .with_target(TargetRef::Resolved("paid".into()));

        let high = |c: &Card| c.level >= 4;
        let options = TargetOptions::filtered(&store, &high);
        let out = resolve_target_cards(&action, &ctx, &resolved, &options);
        assert_eq!(out, vec![ids[1], ids[2]]);

        let missing = ActionDescriptor::new(ActionKind::Banish)
            .with_target(TargetRef::Resolved("nope".into()));
        let options = TargetOptions::default();
        assert!(resolve_target_cards(&missing, &ctx, &resolved, &options).is_empty());
    }

    #[test]
    fn test_unset_sentinel_is_empty() {
        let ctx = ActionContext::new(PlayerId::new(0));
        let action =
            ActionDescriptor::new(ActionKind::Destroy).with_target(TargetSentinel::Attacker);
        let resolved = ResolvedTargets::default();
        let options = TargetOptions::default();
        assert!(resolve_target_cards(&action, &ctx, &resolved, &options).is_empty());
    }

    #[test]
    fn test_level_comparators_and_bounds() {
        let (store, ids) = store_with((1..=8).map(|l| monster(l as u32, l)).collect());
        let mut filter = CandidateFilter {
            level: Some(4),
            level_op: LevelComparator::Gt,
            ..Default::default()
        };
        let out = collect_zone_candidates(&store, &ids, &filter, &CandidateOptions::default());
        assert_eq!(out, ids[4..].to_vec());

        filter.max_level = Some(6);
        let out = collect_zone_candidates(&store, &ids, &filter, &CandidateOptions::default());
        assert_eq!(out, ids[4..6].to_vec());
    }

    #[test]
    fn test_type_filter_against_card_type_list() {
        let mut a = monster(1, 4);
        a.monster_types.push(MonsterType::new("Dragon"));
        a.monster_types.push(MonsterType::new("Warrior"));
        let mut b = monster(2, 4);
        b.monster_types.push(MonsterType::new("Fiend"));
        let (store, ids) = store_with(vec![a, b]);

        let filter = CandidateFilter {
            monster_type: Some(OneOrMany::Many(vec![
                MonsterType::new("Warrior"),
                MonsterType::new("Zombie"),
            ])),
            ..Default::default()
        };
        assert_eq!(
            collect_zone_candidates(&store, &ids, &filter, &CandidateOptions::default()),
            vec![ids[0]]
        );
    }

    #[test]
    fn test_exclusions_and_predicate() {
        let (store, ids) = store_with((1..=4).map(|id| monster(id, 1)).collect());
        let filter = CandidateFilter {
            exclude_self: true,
            card_kind: Some(OneOrMany::One(CardKind::Monster)),
            ..Default::default()
        };
        let not_four = |c: &Card| c.id != CardId::new(4);
        let restricted = [ids[1]];
        let options = CandidateOptions {
            source: Some(ids[0]),
            exclude: &restricted,
            predicate: Some(&not_four),
            ..Default::default()
        };
        assert_eq!(collect_zone_candidates(&store, &ids, &filter, &options), vec![ids[2]]);
    }
}
