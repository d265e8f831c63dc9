//! Duel engine - rules core for a two-player monster/spell/trap card game
//!
//! Card behaviour is declarative data dispatched through a closed set of
//! action kinds; every change of zone goes through one transition engine
//! that keeps equips, bindings and per-presence state consistent.

pub mod actions;
pub mod core;
pub mod error;
pub mod game;
pub mod loader;
pub mod undo;
pub mod zones;

pub use error::{DuelError, Result};
