//! Equip and binding relations
//!
//! The single authority for "which equip is attached to which monster" and
//! "which continuous trap holds which monster". Cards never point at each
//! other directly; the zone transition engine is the only writer.

use crate::core::{CardId, StatDelta};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// One equip attached to a host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EquipLink {
    pub host: CardId,
    /// Bonus actually applied to the host
    pub bonus: StatDelta,
    /// Destroy the host when the equip leaves the field
    pub destroy_host_on_leave: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Relations {
    equips: FxHashMap<CardId, EquipLink>,
    hosts: FxHashMap<CardId, SmallVec<[CardId; 2]>>,
    /// continuous trap -> bound monster
    bindings: FxHashMap<CardId, CardId>,
}

impl Relations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, equip: CardId, link: EquipLink) {
        if let Some(previous) = self.equips.insert(equip, link) {
            self.remove_from_host(previous.host, equip);
        }
        self.hosts.entry(link.host).or_default().push(equip);
    }

    /// Remove an equip's link from both directions
    pub fn detach(&mut self, equip: CardId) -> Option<EquipLink> {
        let link = self.equips.remove(&equip)?;
        self.remove_from_host(link.host, equip);
        Some(link)
    }

    fn remove_from_host(&mut self, host: CardId, equip: CardId) {
        if let Some(list) = self.hosts.get_mut(&host) {
            list.retain(|e| *e != equip);
            if list.is_empty() {
                self.hosts.remove(&host);
            }
        }
    }

    pub fn link(&self, equip: CardId) -> Option<&EquipLink> {
        self.equips.get(&equip)
    }

    pub fn host_of(&self, equip: CardId) -> Option<CardId> {
        self.equips.get(&equip).map(|l| l.host)
    }

    /// Equips attached to `host`, in attach order
    pub fn equips_of(&self, host: CardId) -> SmallVec<[CardId; 2]> {
        self.hosts.get(&host).cloned().unwrap_or_default()
    }

    pub fn bind(&mut self, trap: CardId, monster: CardId) {
        self.bindings.insert(trap, monster);
    }

    pub fn unbind(&mut self, trap: CardId) -> Option<CardId> {
        self.bindings.remove(&trap)
    }

    pub fn bound_monster(&self, trap: CardId) -> Option<CardId> {
        self.bindings.get(&trap).copied()
    }

    /// Drop every binding that holds `monster`; returns the traps
    pub fn release_monster(&mut self, monster: CardId) -> SmallVec<[CardId; 1]> {
        let traps: SmallVec<[CardId; 1]> = self
            .bindings
            .iter()
            .filter(|(_, m)| **m == monster)
            .map(|(t, _)| *t)
            .collect();
        for trap in &traps {
            self.bindings.remove(trap);
        }
        traps
    }

    /// True if any relation mentions `card`
    pub fn mentions(&self, card: CardId) -> bool {
        self.equips.contains_key(&card)
            || self.hosts.contains_key(&card)
            || self.bindings.contains_key(&card)
            || self.bindings.values().any(|m| *m == card)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(host: u32) -> EquipLink {
        EquipLink {
            host: CardId::new(host),
            bonus: StatDelta::new(500, 0),
            destroy_host_on_leave: false,
        }
    }

    #[test]
    fn test_attach_detach_both_directions() {
        let mut rel = Relations::new();
        let equip_a = CardId::new(10);
        let equip_b = CardId::new(11);
        let host = CardId::new(1);

        rel.attach(equip_a, link(1));
        rel.attach(equip_b, link(1));
        assert_eq!(rel.equips_of(host).as_slice(), &[equip_a, equip_b]);
        assert_eq!(rel.host_of(equip_a), Some(host));

        assert!(rel.detach(equip_a).is_some());
        assert_eq!(rel.equips_of(host).as_slice(), &[equip_b]);
        assert!(rel.detach(equip_a).is_none());

        rel.detach(equip_b);
        assert!(!rel.mentions(host));
    }

    #[test]
    fn test_reattach_moves_equip_to_new_host() {
        let mut rel = Relations::new();
        let equip = CardId::new(10);
        rel.attach(equip, link(1));
        rel.attach(equip, link(2));
        assert!(rel.equips_of(CardId::new(1)).is_empty());
        assert_eq!(rel.host_of(equip), Some(CardId::new(2)));
    }

    #[test]
    fn test_bindings() {
        let mut rel = Relations::new();
        let trap = CardId::new(20);
        let monster = CardId::new(2);
        rel.bind(trap, monster);
        assert_eq!(rel.bound_monster(trap), Some(monster));
        assert!(rel.mentions(monster));

        assert_eq!(rel.release_monster(monster).as_slice(), &[trap]);
        assert_eq!(rel.bound_monster(trap), None);
    }
}
