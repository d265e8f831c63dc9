//! Duel configuration
//!
//! Every field has a default, so a config file only needs the values it
//! changes: `{"startingLp": 4000}` is a complete config.

use crate::game::{OutputFormat, VerbosityLevel};
use crate::{DuelError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DuelConfig {
    pub starting_lp: i32,
    pub field_capacity: usize,
    pub spell_trap_capacity: usize,
    pub starting_hand: usize,
    /// Ask humans even when max = available = 1
    pub prompt_single_choice: bool,
    pub verbosity: VerbosityLevel,
    pub log_format: OutputFormat,
    pub seed: u64,
    pub diagnostics: DiagnosticsConfig,
}

/// Diagnostics mode: fault injection around zone operations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiagnosticsConfig {
    pub enabled: bool,
    /// Reject every Nth top-level zone operation
    pub fail_move_every: Option<u32>,
}

impl Default for DuelConfig {
    fn default() -> Self {
        DuelConfig {
            starting_lp: 8000,
            field_capacity: 5,
            spell_trap_capacity: 5,
            starting_hand: 5,
            prompt_single_choice: false,
            verbosity: VerbosityLevel::Normal,
            log_format: OutputFormat::Text,
            seed: 0,
            diagnostics: DiagnosticsConfig::default(),
        }
    }
}

impl DuelConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: DuelConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.starting_lp <= 0 {
            return Err(DuelError::Config(format!(
                "startingLp must be positive, got {}",
                self.starting_lp
            )));
        }
        if self.field_capacity == 0 || self.spell_trap_capacity == 0 {
            return Err(DuelError::Config("zone capacities must be at least 1".to_string()));
        }
        if self.diagnostics.fail_move_every == Some(0) {
            return Err(DuelError::Config("failMoveEvery must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DuelConfig::default();
        assert_eq!(config.starting_lp, 8000);
        assert_eq!(config.field_capacity, 5);
        assert_eq!(config.spell_trap_capacity, 5);
        assert!(!config.diagnostics.enabled);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{"startingLp": 4000, "verbosity": "verbose", "logFormat": "json"}"#;
        let config = DuelConfig::from_json_str(json).unwrap();
        assert_eq!(config.starting_lp, 4000);
        assert_eq!(config.verbosity, VerbosityLevel::Verbose);
        assert_eq!(config.log_format, OutputFormat::Json);
        assert_eq!(config.field_capacity, 5);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(DuelConfig::from_json_str(r#"{"startingLp": 0}"#).is_err());
        assert!(DuelConfig::from_json_str(r#"{"fieldCapacity": 0}"#).is_err());
        assert!(
            DuelConfig::from_json_str(r#"{"diagnostics": {"enabled": true, "failMoveEvery": 0}}"#)
                .is_err()
        );
    }
}
