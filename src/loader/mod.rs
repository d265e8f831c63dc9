//! Card database loading, validation and duel setup

pub mod database;
pub mod database_async;
pub mod game_init;
pub mod validate;

pub use database::{CardDatabase, CardDefinition};
pub use database_async::load_directory;
pub use game_init::{CardRef, DeckEntry, DeckList, GameInitializer};
pub use validate::{validate_database, Severity, ValidationIssue, ValidationReport};
