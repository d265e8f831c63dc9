//! Action dispatch: handler registry, built-in handlers and the effect runner

pub mod engine;
pub mod handlers;
pub mod registry;

pub use engine::{Activation, BlockReason, Engine, SuspendedEffect};
pub use registry::{ActionHandler, ActionRegistry, PendingDecision, Prompt, Resume, Step};
