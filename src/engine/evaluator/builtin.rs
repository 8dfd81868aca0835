// SPDX-License-Identifier: MIT

//! Built-in value evaluators
//!
//! Ordered kinds (integers, floats, decimal, char, dates) support all six
//! comparison operators. Booleans, strings and UUIDs only support equality
//! and inequality, as does the structural fallback used for everything else.

use super::ValueEvaluator;
use crate::rules::error::ConditionError;
use crate::rules::operator::ConditionOperator;
use crate::rules::value::Value;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Case sensitivity of string equality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringComparison {
    #[default]
    CaseSensitive,
    IgnoreCase,
}

fn ordering<T: PartialOrd + ?Sized>(
    operator: ConditionOperator,
    left: &T,
    right: &T,
) -> Result<bool, ConditionError> {
    match operator {
        ConditionOperator::Equal => Ok(left == right),
        ConditionOperator::NotEqual => Ok(left != right),
        ConditionOperator::LessThan => Ok(left < right),
        ConditionOperator::LessOrEqual => Ok(left <= right),
        ConditionOperator::GreaterThan => Ok(left > right),
        ConditionOperator::GreaterOrEqual => Ok(left >= right),
        op => Err(ConditionError::unsupported_operator(op, "ordered values")),
    }
}

fn equality<T: PartialEq + ?Sized>(
    operator: ConditionOperator,
    left: &T,
    right: &T,
    context: &str,
) -> Result<bool, ConditionError> {
    match operator {
        ConditionOperator::Equal => Ok(left == right),
        ConditionOperator::NotEqual => Ok(left != right),
        op => Err(ConditionError::unsupported_operator(op, context)),
    }
}

/// Values handed to an evaluator that does not know their type
fn unhandled(evaluator: &str, left: &Value, right: &Value) -> ConditionError {
    if left.value_type() != right.value_type() {
        ConditionError::type_mismatch(Some(left.value_type()), Some(right.value_type()))
    } else {
        ConditionError::Unspecified(format!(
            "The {} evaluator cannot compare {} values",
            evaluator,
            left.value_type()
        ))
    }
}

#[derive(Debug, Default)]
pub struct BooleanEvaluator;

#[async_trait]
impl ValueEvaluator for BooleanEvaluator {
    fn name(&self) -> &str {
        "boolean"
    }

    async fn evaluate(
        &self,
        operator: ConditionOperator,
        left: &Value,
        right: &Value,
    ) -> Result<bool, ConditionError> {
        match (left, right) {
            (Value::Bool(a), Value::Bool(b)) => equality(operator, a, b, "boolean values"),
            _ => Err(unhandled(self.name(), left, right)),
        }
    }
}

#[derive(Debug, Default)]
pub struct StringEvaluator {
    comparison: StringComparison,
}

impl StringEvaluator {
    pub fn new(comparison: StringComparison) -> Self {
        Self { comparison }
    }

    pub fn comparison(&self) -> StringComparison {
        self.comparison
    }

    fn equal(&self, left: &str, right: &str) -> bool {
        match self.comparison {
            StringComparison::CaseSensitive => left == right,
            StringComparison::IgnoreCase => left
                .chars()
                .flat_map(char::to_lowercase)
                .eq(right.chars().flat_map(char::to_lowercase)),
        }
    }
}

#[async_trait]
impl ValueEvaluator for StringEvaluator {
    fn name(&self) -> &str {
        "string"
    }

    async fn evaluate(
        &self,
        operator: ConditionOperator,
        left: &Value,
        right: &Value,
    ) -> Result<bool, ConditionError> {
        let (a, b) = match (left, right) {
            (Value::String(a), Value::String(b)) => (a, b),
            _ => return Err(unhandled(self.name(), left, right)),
        };

        match operator {
            ConditionOperator::Equal => Ok(self.equal(a, b)),
            ConditionOperator::NotEqual => Ok(!self.equal(a, b)),
            op => Err(ConditionError::unsupported_operator(op, "string values")),
        }
    }
}

/// Handles every kind with a natural order
#[derive(Debug, Default)]
pub struct OrderedEvaluator;

macro_rules! compare_ordered {
    ($operator:expr, $left:expr, $right:expr, $name:expr; $($variant:ident),* $(,)?) => {
        match ($left, $right) {
            $(
                (Value::$variant(a), Value::$variant(b)) => ordering($operator, a, b),
            )*
            (l, r) => Err(unhandled($name, l, r)),
        }
    };
}

#[async_trait]
impl ValueEvaluator for OrderedEvaluator {
    fn name(&self) -> &str {
        "ordered"
    }

    async fn evaluate(
        &self,
        operator: ConditionOperator,
        left: &Value,
        right: &Value,
    ) -> Result<bool, ConditionError> {
        compare_ordered!(
            operator, left, right, self.name();
            Char, I8, I16, I32, I64, U8, U16, U32, U64, F32, F64,
            Decimal, Date, DateTime, DateTimeOffset,
        )
    }
}

#[derive(Debug, Default)]
pub struct UuidEvaluator;

#[async_trait]
impl ValueEvaluator for UuidEvaluator {
    fn name(&self) -> &str {
        "uuid"
    }

    async fn evaluate(
        &self,
        operator: ConditionOperator,
        left: &Value,
        right: &Value,
    ) -> Result<bool, ConditionError> {
        match (left, right) {
            (Value::Uuid(a), Value::Uuid(b)) => equality(operator, a, b, "uuid values"),
            _ => Err(unhandled(self.name(), left, right)),
        }
    }
}

/// Equality over any value; the registry's default
#[derive(Debug, Default)]
pub struct StructuralEvaluator;

#[async_trait]
impl ValueEvaluator for StructuralEvaluator {
    fn name(&self) -> &str {
        "structural"
    }

    async fn evaluate(
        &self,
        operator: ConditionOperator,
        left: &Value,
        right: &Value,
    ) -> Result<bool, ConditionError> {
        equality(operator, left, right, "structural equality")
    }
}
