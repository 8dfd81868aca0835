// SPDX-License-Identifier: MIT

//! rulekit-rs - a rules evaluation engine
//!
//! Rules are declarative: conditions reference input values by key and are
//! compiled against each input set. Passing rules fire their actions.
//!
//! ```rust,ignore
//! let engine = RulesEngine::builder()
//!     .evaluators(ValueEvaluatorRegistry::with_defaults(StringComparison::CaseSensitive))
//!     .actions(Arc::new(actions))
//!     .build()?;
//!
//! let session = engine
//!     .evaluate_rules(EvaluationMode::Test, &inputs, &rules, &cancel)
//!     .await;
//! ```

pub mod engine;
pub mod rules;

pub use engine::{
    ActionRegistry, EngineConfig, RulesEngine, StringComparison, ValueEvaluator,
    ValueEvaluatorRegistry,
};
pub use rules::{
    Action, ActionKey, DataValue, EvaluationMode, ModalAction, Rule, RuleBuilder, RuleCondition,
    SessionResult, Value,
};
