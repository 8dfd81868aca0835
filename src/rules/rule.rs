// SPDX-License-Identifier: MIT

//! Declarative rules
//!
//! Rule conditions reference input data by key. Compiling one against an
//! input set resolves the keys and produces a `Condition` tree.

use crate::rules::condition::{Condition, LogicalCondition, ValueCondition};
use crate::rules::error::{ConditionError, ConstructionError};
use crate::rules::operator::ConditionOperator;
use crate::rules::value::{find_value, DataValue, Value};
use std::fmt;
use uuid::Uuid;

/// Opaque identifier of an action fired by a rule
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionKey {
    Id(Uuid),
    Name(String),
}

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKey::Id(id) => write!(f, "{}", id),
            ActionKey::Name(name) => write!(f, "{}", name),
        }
    }
}

impl From<Uuid> for ActionKey {
    fn from(id: Uuid) -> Self {
        ActionKey::Id(id)
    }
}

impl From<&str> for ActionKey {
    fn from(name: &str) -> Self {
        ActionKey::Name(name.to_string())
    }
}

impl From<String> for ActionKey {
    fn from(name: String) -> Self {
        ActionKey::Name(name)
    }
}

/// A condition description that has not been resolved against inputs yet
#[derive(Debug, Clone, PartialEq)]
pub enum RuleCondition {
    Value(ValueRuleCondition),
    Logical(LogicalRuleCondition),
}

impl RuleCondition {
    /// `key operator expected`
    pub fn value(
        operator: ConditionOperator,
        key: impl Into<String>,
        expected: impl Into<Value>,
    ) -> Result<Self, ConstructionError> {
        ValueRuleCondition::new(operator, key, Some(expected.into())).map(RuleCondition::Value)
    }

    pub fn logical(
        operator: ConditionOperator,
        nested: Vec<RuleCondition>,
    ) -> Result<Self, ConstructionError> {
        LogicalRuleCondition::new(operator, nested).map(RuleCondition::Logical)
    }

    pub fn operator(&self) -> ConditionOperator {
        match self {
            RuleCondition::Value(c) => c.operator(),
            RuleCondition::Logical(c) => c.operator(),
        }
    }

    /// Resolve the condition against `inputs`
    pub fn compile(&self, inputs: &[DataValue]) -> Result<Condition, ConditionError> {
        match self {
            RuleCondition::Value(c) => c.compile(inputs).map(Condition::Value),
            RuleCondition::Logical(c) => c.compile(inputs),
        }
    }
}

/// Compares the input stored under `key` with an expected literal
#[derive(Debug, Clone, PartialEq)]
pub struct ValueRuleCondition {
    operator: ConditionOperator,
    key: String,
    expected: Option<Value>,
}

impl ValueRuleCondition {
    pub fn new(
        operator: ConditionOperator,
        key: impl Into<String>,
        expected: Option<Value>,
    ) -> Result<Self, ConstructionError> {
        if !operator.is_value() {
            return Err(ConstructionError::InvalidOperator {
                operator,
                kind: "value rule conditions",
            });
        }

        let key = key.into();
        if key.trim().is_empty() {
            return Err(ConstructionError::EmptyValueKey);
        }

        Ok(Self {
            operator,
            key,
            expected,
        })
    }

    pub fn operator(&self) -> ConditionOperator {
        self.operator
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn expected(&self) -> Option<&Value> {
        self.expected.as_ref()
    }

    /// Builds `actual operator expected`.
    ///
    /// The located input is always the left operand and the literal the
    /// right one, which matters for the ordering operators.
    pub fn compile(&self, inputs: &[DataValue]) -> Result<ValueCondition, ConditionError> {
        let actual = find_value(inputs, &self.key).ok_or_else(|| ConditionError::NoDataValueFound {
            key: self.key.clone(),
        })?;

        let expected = DataValue::with_value(self.key.clone(), self.expected.clone());

        ValueCondition::new(self.operator, actual.clone(), expected)
            .map_err(|e| ConditionError::unsupported_operator(self.operator, e.to_string()))
    }
}

/// Combines two or more nested rule conditions with a logical operator
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalRuleCondition {
    operator: ConditionOperator,
    nested: Vec<RuleCondition>,
}

impl LogicalRuleCondition {
    pub fn new(
        operator: ConditionOperator,
        nested: Vec<RuleCondition>,
    ) -> Result<Self, ConstructionError> {
        if !operator.is_logical() {
            return Err(ConstructionError::InvalidOperator {
                operator,
                kind: "logical rule conditions",
            });
        }

        Ok(Self { operator, nested })
    }

    pub fn operator(&self) -> ConditionOperator {
        self.operator
    }

    pub fn nested(&self) -> &[RuleCondition] {
        &self.nested
    }

    /// Compiles every nested condition and left-folds them pairwise, so
    /// `[c1, c2, c3]` under AND becomes `And(And(c1, c2), c3)`.
    pub fn compile(&self, inputs: &[DataValue]) -> Result<Condition, ConditionError> {
        let compiled = self
            .nested
            .iter()
            .map(|c| c.compile(inputs))
            .collect::<Result<Vec<_>, _>>()?;

        if compiled.len() < 2 {
            return Err(ConditionError::InvalidConditionValueCount {
                count: compiled.len(),
            });
        }

        let mut conditions = compiled.into_iter();
        let first = conditions
            .next()
            .ok_or(ConditionError::InvalidConditionValueCount { count: 0 })?;

        Ok(conditions.fold(first, |acc, next| {
            Condition::Logical(LogicalCondition::combine(self.operator, acc, next))
        }))
    }
}

/// Conditions (implicitly ANDed) plus the actions fired when they all pass
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Rule {
    name: Option<String>,
    conditions: Vec<RuleCondition>,
    actions: Vec<ActionKey>,
}

impl Rule {
    pub fn new(conditions: Vec<RuleCondition>, actions: Vec<ActionKey>) -> Self {
        Self {
            name: None,
            conditions,
            actions,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn conditions(&self) -> &[RuleCondition] {
        &self.conditions
    }

    pub fn actions(&self) -> &[ActionKey] {
        &self.actions
    }
}
