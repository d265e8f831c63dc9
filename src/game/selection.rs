//! Selection contracts
//!
//! A requirement describes one choice (targets, costs, tributes) as a
//! candidate list plus bounds. Bots resolve it through a
//! [`SelectionHeuristic`](crate::game::SelectionHeuristic) on the spot;
//! humans get trivial cases resolved automatically and everything else
//! goes to the UI, which may answer, cancel, or defer.

use crate::core::{CandidateFilter, CardId, PlayerId, Side};
use crate::zones::ZoneKind;
use crate::{DuelError, Result};
use smallvec::SmallVec;

/// What the chosen cards will be used for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SelectionPurpose {
    #[default]
    Target,
    Cost,
    Summon,
    Tribute,
}

/// One choice to be made
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionRequirement {
    /// Key the answer is returned under; also identifies a deferred prompt
    pub id: String,
    pub min: usize,
    pub max: usize,
    pub zones: SmallVec<[ZoneKind; 2]>,
    pub owner: Side,
    pub filter: CandidateFilter,
    /// Eligible cards, in zone order
    pub candidates: Vec<CardId>,
    pub purpose: SelectionPurpose,
    /// Player making the choice
    pub chooser: PlayerId,
}

impl SelectionRequirement {
    pub fn new(
        id: impl Into<String>,
        chooser: PlayerId,
        candidates: Vec<CardId>,
        min: usize,
        max: usize,
    ) -> Self {
        SelectionRequirement {
            id: id.into(),
            min,
            max: max.max(min),
            zones: SmallVec::new(),
            owner: Side::Own,
            filter: CandidateFilter::default(),
            candidates,
            purpose: SelectionPurpose::Target,
            chooser,
        }
    }

    pub fn with_purpose(mut self, purpose: SelectionPurpose) -> Self {
        self.purpose = purpose;
        self
    }

    /// Can the minimum be met at all
    pub fn is_satisfiable(&self) -> bool {
        self.candidates.len() >= self.min
    }

    /// Upper bound after accounting for how many candidates exist
    pub fn effective_max(&self) -> usize {
        self.max.min(self.candidates.len())
    }

    /// Answer without asking anyone, when there is only one legal answer
    ///
    /// Covers: nothing to choose from with `min == 0`, exactly as many
    /// candidates as the minimum demands, and a single candidate for a
    /// single pick when `prompt_single_choice` is off.
    pub fn auto_resolve(&self, prompt_single_choice: bool) -> Option<Vec<CardId>> {
        let available = self.candidates.len();
        if available == 0 && self.min == 0 {
            return Some(Vec::new());
        }
        if self.min > 0 && available == self.min {
            return Some(self.candidates.clone());
        }
        if !prompt_single_choice && self.max == 1 && available == 1 {
            return Some(self.candidates.clone());
        }
        None
    }

    /// Check an answer against the requirement
    ///
    /// Duplicates are dropped, order is kept.
    pub fn validate(&self, chosen: &[CardId]) -> Result<Vec<CardId>> {
        let mut picked: Vec<CardId> = Vec::with_capacity(chosen.len());
        for id in chosen {
            if !self.candidates.contains(id) {
                return Err(DuelError::InvalidResume(format!(
                    "{id} is not a candidate for '{}'",
                    self.id
                )));
            }
            if !picked.contains(id) {
                picked.push(*id);
            }
        }
        if picked.len() < self.min || picked.len() > self.effective_max() {
            return Err(DuelError::InvalidResume(format!(
                "'{}' needs {}..={} cards, got {}",
                self.id,
                self.min,
                self.effective_max(),
                picked.len()
            )));
        }
        Ok(picked)
    }
}

/// Outcome of a resolved selection
///
/// `Chosen(vec![])` is a legitimate answer when the minimum is zero and is
/// not the same thing as `Cancelled`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Chosen(Vec<CardId>),
    Cancelled,
}

/// Where a selection stands after asking for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionStep {
    Ready(Selection),
    /// Waiting on a human; resume with the requirement id
    Pending(SelectionRequirement),
    /// Fewer candidates than the minimum; nothing can be chosen
    Unsatisfiable,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: u32) -> Vec<CardId> {
        (1..=n).map(CardId::new).collect()
    }

    fn req(candidates: Vec<CardId>, min: usize, max: usize) -> SelectionRequirement {
        SelectionRequirement::new("cost", PlayerId::new(0), candidates, min, max)
    }

    #[test]
    fn test_exact_count_resolves_all() {
        let r = req(ids(3), 3, 3);
        assert_eq!(r.auto_resolve(true), Some(ids(3)));
    }

    #[test]
    fn test_single_candidate_single_pick_respects_setting() {
        let r = req(ids(1), 0, 1);
        assert_eq!(r.auto_resolve(false), Some(ids(1)));
        assert_eq!(r.auto_resolve(true), None);
    }

    #[test]
    fn test_real_choice_is_not_auto_resolved() {
        assert_eq!(req(ids(4), 1, 2).auto_resolve(false), None);
    }

    #[test]
    fn test_empty_optional_selection_is_zero_not_cancel() {
        assert_eq!(req(Vec::new(), 0, 2).auto_resolve(true), Some(Vec::new()));
    }

    #[test]
    fn test_validate_answers() {
        let r = req(ids(4), 1, 2);
        assert_eq!(r.validate(&[CardId::new(2), CardId::new(2)]).unwrap(), vec![CardId::new(2)]);
        assert!(r.validate(&[]).is_err());
        assert!(r.validate(&[CardId::new(9)]).is_err());
        assert!(r.validate(&ids(3)).is_err());
    }

    #[test]
    fn test_satisfiable() {
        assert!(!req(ids(1), 2, 2).is_satisfiable());
        assert!(req(ids(2), 2, 2).is_satisfiable());
    }
}
