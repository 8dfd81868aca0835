// SPDX-License-Identifier: MIT

//! Fluent construction of rules
//!
//! ```rust,ignore
//! let rule = RuleBuilder::new()
//!     .value_condition(ConditionOperator::LessThan, "Age", 18)?
//!     .action("MarkAsChild")
//!     .build();
//! ```

use crate::rules::error::ConstructionError;
use crate::rules::operator::ConditionOperator;
use crate::rules::rule::{ActionKey, Rule, RuleCondition};
use crate::rules::value::Value;

/// Accumulates conditions and actions, then hands out a `Rule`
#[derive(Debug, Default)]
pub struct RuleBuilder {
    name: Option<String>,
    conditions: Vec<RuleCondition>,
    actions: Vec<ActionKey>,
}

impl RuleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn condition(mut self, condition: RuleCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn value_condition(
        self,
        operator: ConditionOperator,
        key: impl Into<String>,
        expected: impl Into<Value>,
    ) -> Result<Self, ConstructionError> {
        Ok(self.condition(RuleCondition::value(operator, key, expected)?))
    }

    pub fn logical_condition(
        self,
        operator: ConditionOperator,
        nested: Vec<RuleCondition>,
    ) -> Result<Self, ConstructionError> {
        Ok(self.condition(RuleCondition::logical(operator, nested)?))
    }

    /// Passes when the value under `key` equals any of `allowed`
    pub fn in_condition<V: Into<Value>>(
        self,
        key: &str,
        allowed: impl IntoIterator<Item = V>,
    ) -> Result<Self, ConstructionError> {
        let nested = allowed
            .into_iter()
            .map(|v| RuleCondition::value(ConditionOperator::Equal, key, v))
            .collect::<Result<Vec<_>, _>>()?;
        self.logical_condition(ConditionOperator::Or, nested)
    }

    /// Passes when the value under `key` equals none of `excluded`
    pub fn not_in_condition<V: Into<Value>>(
        self,
        key: &str,
        excluded: impl IntoIterator<Item = V>,
    ) -> Result<Self, ConstructionError> {
        let nested = excluded
            .into_iter()
            .map(|v| RuleCondition::value(ConditionOperator::NotEqual, key, v))
            .collect::<Result<Vec<_>, _>>()?;
        self.logical_condition(ConditionOperator::And, nested)
    }

    pub fn action(mut self, key: impl Into<ActionKey>) -> Self {
        self.actions.push(key.into());
        self
    }

    /// Produce the rule, leaving the builder empty for the next one
    pub fn build(&mut self) -> Rule {
        let builder = std::mem::take(self);
        let rule = Rule::new(builder.conditions, builder.actions);
        match builder.name {
            Some(name) => rule.named(name),
            None => rule,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::error::ConditionError;
    use crate::rules::value::DataValue;

    #[test]
    fn test_build_rule() {
        let rule = RuleBuilder::new()
            .named("children")
            .value_condition(ConditionOperator::LessThan, "Age", 18)
            .unwrap()
            .action("MarkAsChild")
            .build();

        assert_eq!(rule.name(), Some("children"));
        assert_eq!(rule.conditions().len(), 1);
        assert_eq!(rule.actions(), &[ActionKey::from("MarkAsChild")]);
    }

    #[test]
    fn test_build_resets_builder() {
        let mut builder = RuleBuilder::new()
            .value_condition(ConditionOperator::Equal, "Age", 1)
            .unwrap()
            .action("A");

        let first = builder.build();
        let second = builder.build();

        assert_eq!(first.conditions().len(), 1);
        assert!(second.conditions().is_empty());
        assert!(second.actions().is_empty());
    }

    #[test]
    fn test_invalid_operator_is_rejected() {
        let result = RuleBuilder::new().value_condition(ConditionOperator::Or, "Age", 1);
        assert!(result.is_err());
    }

    #[test]
    fn test_in_condition_compiles_to_or_chain() {
        let rule = RuleBuilder::new()
            .in_condition("Color", ["red", "green", "blue"])
            .unwrap()
            .build();

        let inputs = vec![DataValue::new("Color", "green")];
        let compiled = rule.conditions()[0].compile(&inputs).unwrap();
        assert_eq!(compiled.operator(), ConditionOperator::Or);
    }

    #[test]
    fn test_not_in_condition_compiles_to_and_chain() {
        let rule = RuleBuilder::new()
            .not_in_condition("Age", [1, 2])
            .unwrap()
            .build();

        let inputs = vec![DataValue::new("Age", 3)];
        let compiled = rule.conditions()[0].compile(&inputs).unwrap();
        assert_eq!(compiled.operator(), ConditionOperator::And);
    }

    #[test]
    fn test_in_condition_with_single_value_fails_to_compile() {
        let rule = RuleBuilder::new()
            .in_condition("Age", [1])
            .unwrap()
            .build();

        let inputs = vec![DataValue::new("Age", 1)];
        assert_eq!(
            rule.conditions()[0].compile(&inputs).unwrap_err(),
            ConditionError::InvalidConditionValueCount { count: 1 }
        );
    }
}
