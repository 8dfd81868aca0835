//! Compiled condition tree
//!
//! Conditions only hold data and check operator classes on construction.
//! Evaluation lives in `engine::condition`.

use crate::rules::error::ConstructionError;
use crate::rules::operator::ConditionOperator;
use crate::rules::value::DataValue;

/// A compiled boolean expression node
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Comparison of two values
    Value(ValueCondition),
    /// Logical combination of two conditions
    Logical(LogicalCondition),
}

impl Condition {
    pub fn operator(&self) -> ConditionOperator {
        match self {
            Condition::Value(c) => c.operator(),
            Condition::Logical(c) => c.operator(),
        }
    }

    /// Build a value condition from two present operands
    pub fn value(
        operator: ConditionOperator,
        left: DataValue,
        right: DataValue,
    ) -> Result<Self, ConstructionError> {
        ValueCondition::new(operator, left, right).map(Condition::Value)
    }

    /// Build a logical condition over two child conditions
    pub fn logical(
        operator: ConditionOperator,
        left: Condition,
        right: Condition,
    ) -> Result<Self, ConstructionError> {
        LogicalCondition::new(operator, left, right).map(Condition::Logical)
    }
}

/// `left operator right` over data values
#[derive(Debug, Clone, PartialEq)]
pub struct ValueCondition {
    operator: ConditionOperator,
    left: Option<DataValue>,
    right: Option<DataValue>,
}

impl ValueCondition {
    pub fn new(
        operator: ConditionOperator,
        left: DataValue,
        right: DataValue,
    ) -> Result<Self, ConstructionError> {
        Self::with_operands(operator, Some(left), Some(right))
    }

    /// Build a value condition where either operand may be absent
    pub fn with_operands(
        operator: ConditionOperator,
        left: Option<DataValue>,
        right: Option<DataValue>,
    ) -> Result<Self, ConstructionError> {
        if !operator.is_value() {
            return Err(ConstructionError::InvalidOperator {
                operator,
                kind: "value conditions",
            });
        }

        Ok(Self {
            operator,
            left,
            right,
        })
    }

    pub fn operator(&self) -> ConditionOperator {
        self.operator
    }

    pub fn left(&self) -> Option<&DataValue> {
        self.left.as_ref()
    }

    pub fn right(&self) -> Option<&DataValue> {
        self.right.as_ref()
    }
}

/// `left AND right` / `left OR right`
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalCondition {
    operator: ConditionOperator,
    left: Box<Condition>,
    right: Box<Condition>,
}

impl LogicalCondition {
    pub fn new(
        operator: ConditionOperator,
        left: Condition,
        right: Condition,
    ) -> Result<Self, ConstructionError> {
        if !operator.is_logical() {
            return Err(ConstructionError::InvalidOperator {
                operator,
                kind: "logical conditions",
            });
        }

        Ok(Self::combine(operator, left, right))
    }

    /// Join two conditions under an operator already known to be logical
    pub(crate) fn combine(operator: ConditionOperator, left: Condition, right: Condition) -> Self {
        debug_assert!(operator.is_logical());
        Self {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn operator(&self) -> ConditionOperator {
        self.operator
    }

    pub fn left(&self) -> &Condition {
        &self.left
    }

    pub fn right(&self) -> &Condition {
        &self.right
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn equal(a: i32, b: i32) -> Condition {
        Condition::value(
            ConditionOperator::Equal,
            DataValue::new("x", a),
            DataValue::new("x", b),
        )
        .unwrap()
    }

    #[test]
    fn test_value_condition_rejects_logical_operators() {
        for op in [
            ConditionOperator::And,
            ConditionOperator::Or,
            ConditionOperator::Unspecified,
        ] {
            let result = ValueCondition::new(op, DataValue::new("x", 1), DataValue::new("x", 1));
            assert!(matches!(
                result,
                Err(ConstructionError::InvalidOperator { operator, .. }) if operator == op
            ));
        }
    }

    #[test]
    fn test_value_condition_accepts_value_operators() {
        for op in ConditionOperator::VALUE {
            let condition =
                ValueCondition::new(op, DataValue::new("x", 1), DataValue::new("x", 2)).unwrap();
            assert_eq!(condition.operator(), op);
            assert_eq!(condition.left(), Some(&DataValue::new("x", 1)));
            assert_eq!(condition.right(), Some(&DataValue::new("x", 2)));
        }
    }

    #[test]
    fn test_logical_condition_rejects_value_operators() {
        for op in ConditionOperator::VALUE
            .into_iter()
            .chain([ConditionOperator::Unspecified])
        {
            let result = LogicalCondition::new(op, equal(1, 1), equal(2, 2));
            assert!(result.is_err(), "{op} should be rejected");
        }
    }

    #[test]
    fn test_logical_condition_owns_children() {
        let condition =
            Condition::logical(ConditionOperator::Or, equal(1, 1), equal(1, 2)).unwrap();

        match condition {
            Condition::Logical(logical) => {
                assert_eq!(logical.operator(), ConditionOperator::Or);
                assert_eq!(logical.left(), &equal(1, 1));
                assert_eq!(logical.right(), &equal(1, 2));
            }
            Condition::Value(_) => panic!("Expected Logical, got Value"),
        }
    }

    #[test]
    fn test_with_operands_allows_missing_operands() {
        let condition = ValueCondition::with_operands(
            ConditionOperator::Equal,
            None,
            Some(DataValue::new("x", 1)),
        )
        .unwrap();
        assert!(condition.left().is_none());
        assert!(condition.right().is_some());
    }
}
