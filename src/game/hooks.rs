//! Hooks wrapped around every top-level zone operation
//!
//! Hosts use these for cross-cutting concerns such as invalidating a
//! render cache. In diagnostics mode the engine installs a
//! [`FaultInjector`] that rejects moves on a fixed cadence.

use crate::core::{CardId, PlayerId};
use crate::game::transition::MoveResult;
use crate::zones::ZoneKind;
use std::cell::Cell;
use std::rc::Rc;

/// A zone operation about to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneOp {
    pub card: CardId,
    pub dest_player: PlayerId,
    pub dest_zone: ZoneKind,
}

pub trait ZoneOpHook {
    /// Return `Err(reason)` to reject the operation before anything moves
    fn before(&mut self, _op: &ZoneOp) -> Result<(), String> {
        Ok(())
    }

    fn after(&mut self, _op: &ZoneOp, _result: &MoveResult) {}
}

/// Rejects every Nth zone operation
#[derive(Debug, Clone)]
pub struct FaultInjector {
    every: u32,
    seen: u32,
}

impl FaultInjector {
    pub fn new(every: u32) -> Self {
        FaultInjector {
            every: every.max(1),
            seen: 0,
        }
    }
}

impl ZoneOpHook for FaultInjector {
    fn before(&mut self, op: &ZoneOp) -> Result<(), String> {
        self.seen += 1;
        if self.seen % self.every == 0 {
            Err(format!(
                "diagnostics: injected fault on operation {} (card {} -> {})",
                self.seen, op.card, op.dest_zone
            ))
        } else {
            Ok(())
        }
    }
}

/// Counts successful zone operations; clone the handle to read it
#[derive(Debug, Clone, Default)]
pub struct ZoneOpCounter {
    committed: Rc<Cell<u32>>,
}

impl ZoneOpCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn committed(&self) -> u32 {
        self.committed.get()
    }
}

impl ZoneOpHook for ZoneOpCounter {
    fn after(&mut self, _op: &ZoneOp, result: &MoveResult) {
        if result.is_ok() {
            self.committed.set(self.committed.get() + 1);
        }
    }
}
