//! Engine configuration - YAML file loading with environment overrides
//!
//! ```yaml
//! string_comparison: ignore_case
//! register_default_evaluators: true
//! evaluation_mode: production
//! ```

use crate::engine::evaluator::StringComparison;
use crate::rules::action::EvaluationMode;
use crate::rules::error::EngineError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

pub const STRING_COMPARISON_ENV: &str = "RULEKIT_STRING_COMPARISON";
pub const EVALUATION_MODE_ENV: &str = "RULEKIT_EVALUATION_MODE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Case sensitivity of the built-in string evaluator
    pub string_comparison: StringComparison,
    /// Whether registries built from this config start with the built-ins
    pub register_default_evaluators: bool,
    pub evaluation_mode: EvaluationMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            string_comparison: StringComparison::default(),
            register_default_evaluators: true,
            evaluation_mode: EvaluationMode::default(),
        }
    }
}

impl EngineConfig {
    /// Load a config file, then apply environment overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        let content = fs::read_to_string(path)?;
        let mut config = Self::parse_yaml(&content)?;
        config.apply_env()?;
        Ok(config)
    }

    /// Parse a config from a YAML string; an empty document yields the defaults
    pub fn parse_yaml(content: &str) -> Result<Self, EngineError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn apply_env(&mut self) -> Result<(), EngineError> {
        self.apply_overrides(|name| env::var(name).ok())
    }

    /// Apply overrides from any variable source
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), EngineError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(STRING_COMPARISON_ENV) {
            self.string_comparison = parse_override(STRING_COMPARISON_ENV, &raw)?;
        }
        if let Some(raw) = lookup(EVALUATION_MODE_ENV) {
            self.evaluation_mode = parse_override(EVALUATION_MODE_ENV, &raw)?;
        }
        Ok(())
    }
}

fn parse_override<T: DeserializeOwned>(name: &str, raw: &str) -> Result<T, EngineError> {
    serde_yaml::from_str(raw.trim())
        .map_err(|_| EngineError::config(format!("Invalid value '{}' for {}", raw, name)))
}
