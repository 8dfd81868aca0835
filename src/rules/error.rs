// SPDX-License-Identifier: MIT

//! Typed error handling for rulekit-rs
//!
//! Failures are split by the unit they belong to. Condition and action
//! failures are recoverable and end up inside result objects; construction
//! and engine errors are returned synchronously to the caller.

use crate::rules::operator::ConditionOperator;
use crate::rules::value::ValueType;
use std::fmt;
use thiserror::Error;

/// Which side of a value condition an operand sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandSide {
    Left,
    Right,
}

impl fmt::Display for OperandSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperandSide::Left => write!(f, "left"),
            OperandSide::Right => write!(f, "right"),
        }
    }
}

/// Causes of a failed condition compilation or evaluation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConditionError {
    /// No condition was handed to the evaluator
    #[error("A condition must be provided for evaluation")]
    NullConditionProvided,

    /// Both operands are null, so there is no type to compare with
    #[error("Unable to determine the value type of the condition")]
    UnableToDetermineValueType,

    /// The condition kind is not one the evaluator knows how to process
    #[error("Unable to determine how to process the condition")]
    UnableToDetermineConditionType,

    /// The operator does not apply here
    #[error("Operator {operator} is not supported by {context}")]
    UnsupportedOperator {
        operator: ConditionOperator,
        context: String,
    },

    /// One of the operands of a value condition is absent
    #[error("The {side} operand is missing")]
    OperandMissing { side: OperandSide },

    /// Left and right operands carry different value types
    #[error("Operand types mismatch: left is {left}, right is {right}")]
    ValueTypeMismatch { left: String, right: String },

    /// Neither a specific nor a default evaluator is registered
    #[error("No value evaluator found for type {value_type}")]
    EvaluatorNotFound { value_type: ValueType },

    /// The rule references a key absent from the input set
    #[error("No data value found with the key '{key}'")]
    NoDataValueFound { key: String },

    /// A logical rule condition compiled to fewer than two conditions
    #[error("A logical condition needs at least 2 nested conditions, got {count}")]
    InvalidConditionValueCount { count: usize },

    /// Anything unexpected, e.g. a panicking evaluator
    #[error("Unexpected condition failure: {0}")]
    Unspecified(String),
}

impl ConditionError {
    pub fn unsupported_operator(operator: ConditionOperator, context: impl Into<String>) -> Self {
        Self::UnsupportedOperator {
            operator,
            context: context.into(),
        }
    }

    pub fn type_mismatch(left: Option<ValueType>, right: Option<ValueType>) -> Self {
        let describe =
            |t: Option<ValueType>| t.map_or_else(|| "null".to_string(), |t| t.to_string());
        Self::ValueTypeMismatch {
            left: describe(left),
            right: describe(right),
        }
    }
}

/// Causes of a failed action registration, resolution or execution
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionError {
    /// Registration-time: the key is already taken
    #[error("An action is already registered with the key '{key}'")]
    ActionAlreadyRegistered { key: String },

    /// Nothing is registered under the key
    #[error("No action found with the key '{key}'")]
    ActionNotFound { key: String },

    /// The action factory could not build an instance
    #[error("Unable to create an instance of action '{key}': {reason}")]
    CannotInstantiateAction { key: String, reason: String },

    /// A data value the action depends on is not in the input set
    #[error("No data value found with the key '{key}' for the action")]
    NoMatchingDataValueFound { key: String },

    /// Failures raised by the action itself
    #[error("{0}")]
    Unspecified(String),
}

impl ActionError {
    pub fn cannot_instantiate(key: impl fmt::Display, reason: impl Into<String>) -> Self {
        Self::CannotInstantiateAction {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Unspecified(message.into())
    }
}

impl From<&str> for ActionError {
    fn from(s: &str) -> Self {
        Self::Unspecified(s.to_string())
    }
}

impl From<String> for ActionError {
    fn from(s: String) -> Self {
        Self::Unspecified(s)
    }
}

/// Invariant violations detected while building conditions
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConstructionError {
    #[error("Operator {operator} is not supported by {kind}")]
    InvalidOperator {
        operator: ConditionOperator,
        kind: &'static str,
    },

    #[error("Value key cannot be empty")]
    EmptyValueKey,
}

/// Errors raised while mutating a value evaluator registry
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// An unexpected fault caught at rule granularity
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleFault {
    #[error("Rule '{rule}' panicked: {message}")]
    Panicked { rule: String, message: String },

    #[error("Session aborted: {0}")]
    SessionAborted(String),
}

/// Every fault collected over a session
#[derive(Debug, Clone, PartialEq, Default, Error)]
#[error("{} fault(s) occurred while processing rules", .faults.len())]
pub struct AggregateError {
    pub faults: Vec<RuleFault>,
}

impl AggregateError {
    pub fn new(faults: Vec<RuleFault>) -> Self {
        Self { faults }
    }
}

/// Top-level error type for engine setup and configuration
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine was built without one of its collaborators
    #[error("Missing engine collaborator: {0}")]
    MissingCollaborator(&'static str),

    /// Configuration errors (invalid values, bad env overrides)
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl EngineError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Extract a readable message from a caught panic payload
pub(crate) fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
