//! Move journal
//!
//! A transaction log of committed zone moves, kept for replay and
//! debugging. Choice points mark where a decision was taken so a search or
//! replay tool can truncate back to them.

use crate::core::{CardId, PlayerId};
use crate::zones::ZoneKind;

/// One committed relocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    pub card: CardId,
    pub from_player: PlayerId,
    pub from_zone: ZoneKind,
    pub to_player: PlayerId,
    /// `None` when a token left the game
    pub to_zone: Option<ZoneKind>,
    pub turn: u32,
}

#[derive(Debug, Clone)]
pub struct MoveJournal {
    /// Stack of records (most recent at end)
    records: Vec<MoveRecord>,

    /// Is journaling enabled? (disabled for benchmarks)
    enabled: bool,

    choice_points: Vec<usize>,
}

impl MoveJournal {
    pub fn new() -> Self {
        MoveJournal {
            records: Vec::new(),
            enabled: true,
            choice_points: Vec::new(),
        }
    }

    /// Create a disabled journal (for benchmarking)
    pub fn disabled() -> Self {
        MoveJournal {
            enabled: false,
            ..MoveJournal::new()
        }
    }

    pub fn log(&mut self, record: MoveRecord) {
        if self.enabled {
            self.records.push(record);
        }
    }

    pub fn mark_choice_point(&mut self) {
        if self.enabled {
            self.choice_points.push(self.records.len());
        }
    }

    /// Drop records back to the most recent choice point
    pub fn rewind_to_choice_point(&mut self) {
        if let Some(checkpoint) = self.choice_points.pop() {
            self.records.truncate(checkpoint);
        }
    }

    pub fn last(&self) -> Option<&MoveRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[MoveRecord] {
        &self.records
    }

    /// Record counts at each decision, oldest first
    pub fn choice_points(&self) -> &[usize] {
        &self.choice_points
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.choice_points.clear();
    }
}

impl Default for MoveJournal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(card: u32) -> MoveRecord {
        MoveRecord {
            card: CardId::new(card),
            from_player: PlayerId::new(0),
            from_zone: ZoneKind::Hand,
            to_player: PlayerId::new(0),
            to_zone: Some(ZoneKind::Field),
            turn: 1,
        }
    }

    #[test]
    fn test_journal() {
        let mut journal = MoveJournal::new();
        assert!(journal.is_empty());

        journal.log(record(1));
        assert_eq!(journal.len(), 1);
        assert_eq!(journal.last().unwrap().card, CardId::new(1));
    }

    #[test]
    fn test_choice_points() {
        let mut journal = MoveJournal::new();
        journal.log(record(1));
        journal.log(record(2));
        journal.mark_choice_point();
        journal.log(record(3));
        journal.log(record(4));
        assert_eq!(journal.len(), 4);

        journal.rewind_to_choice_point();
        assert_eq!(journal.len(), 2);
    }

    #[test]
    fn test_disabled_journal() {
        let mut journal = MoveJournal::disabled();
        journal.log(record(1));
        journal.mark_choice_point();
        assert!(journal.is_empty());
    }
}
