//! Notifications raised by the engine for the orchestrator

use crate::core::{CardId, PlayerId, TriggerEvent};
use crate::zones::ZoneKind;

/// How a monster arrived on the field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SummonMethod {
    #[default]
    Normal,
    Tribute,
    Special,
    Flip,
    /// Placed face-down without being summoned
    Set,
}

/// Game events, buffered on `GameState` until drained
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    AfterSummon {
        card: CardId,
        player: PlayerId,
        /// `None` for tokens, which come from outside the game
        from_zone: Option<ZoneKind>,
        method: SummonMethod,
        presence_id: u64,
    },
    CardToGrave {
        card: CardId,
        player: PlayerId,
        from_zone: ZoneKind,
    },
    CardDestroyed {
        card: CardId,
        from_zone: ZoneKind,
    },
    CardDrawn {
        card: CardId,
        player: PlayerId,
    },
    TokenRemoved {
        card: CardId,
    },
}

impl GameEvent {
    /// The trigger name effects listen for, if any
    pub fn trigger(&self) -> Option<TriggerEvent> {
        match self {
            GameEvent::AfterSummon { .. } => Some(TriggerEvent::AfterSummon),
            GameEvent::CardToGrave { .. } => Some(TriggerEvent::CardToGrave),
            GameEvent::CardDestroyed { .. } => Some(TriggerEvent::CardDestroyed),
            GameEvent::CardDrawn { .. } => Some(TriggerEvent::CardDrawn),
            GameEvent::TokenRemoved { .. } => None,
        }
    }

    pub fn card(&self) -> CardId {
        match self {
            GameEvent::AfterSummon { card, .. }
            | GameEvent::CardToGrave { card, .. }
            | GameEvent::CardDestroyed { card, .. }
            | GameEvent::CardDrawn { card, .. }
            | GameEvent::TokenRemoved { card } => *card,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_trigger_names() {
        let event = GameEvent::CardToGrave {
            card: CardId::new(4),
            player: PlayerId::new(0),
            from_zone: ZoneKind::Field,
        };
        assert_eq!(event.trigger(), Some(TriggerEvent::CardToGrave));
        assert_eq!(event.card(), CardId::new(4));
        assert_eq!(GameEvent::TokenRemoved { card: CardId::new(1) }.trigger(), None);
    }
}
