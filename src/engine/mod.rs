// SPDX-License-Identifier: MIT

//! Rule evaluation runtime

pub mod actions;
pub mod condition;
pub mod config;
pub mod evaluator;
pub mod executor;

pub use actions::{ActionFactory, ActionRegistry};
pub use condition::ConditionEvaluator;
pub use config::EngineConfig;
pub use evaluator::{StringComparison, ValueEvaluator, ValueEvaluatorRegistry};
pub use executor::{EngineBuilder, RulesEngine};
