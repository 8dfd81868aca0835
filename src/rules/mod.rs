// SPDX-License-Identifier: MIT

//! Rule data model
//!
//! Values, operators, compiled conditions, declarative rule conditions,
//! rules, action contracts and the results of an evaluation session.

pub mod action;
pub mod builder;
pub mod condition;
pub mod error;
pub mod operator;
pub mod result;
pub mod rule;
pub mod value;

pub use action::{Action, ActionContext, ActionResolver, EvaluationMode, ModalAction};
pub use builder::RuleBuilder;
pub use condition::{Condition, LogicalCondition, ValueCondition};
pub use error::{
    ActionError, AggregateError, ConditionError, ConstructionError, EngineError, OperandSide,
    RegistryError, RuleFault,
};
pub use operator::ConditionOperator;
pub use result::{
    ActionExecutionResult, ConditionEvaluationResult, Operand, RuleEvaluationResult, SessionResult,
};
pub use rule::{ActionKey, LogicalRuleCondition, Rule, RuleCondition, ValueRuleCondition};
pub use value::{DataValue, Value, ValueType};
