// SPDX-License-Identifier: MIT

//! Condition tree evaluation
//!
//! Every failure is folded into the returned `ConditionEvaluationResult`;
//! evaluating a condition never errors out to the caller.

use crate::engine::evaluator::ValueEvaluatorRegistry;
use crate::rules::condition::{Condition, LogicalCondition, ValueCondition};
use crate::rules::error::{panic_message, ConditionError, OperandSide};
use crate::rules::operator::ConditionOperator;
use crate::rules::result::{ConditionEvaluationResult, Operand};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;

/// Evaluates compiled conditions against a value evaluator registry
#[derive(Clone)]
pub struct ConditionEvaluator {
    registry: ValueEvaluatorRegistry,
}

impl ConditionEvaluator {
    pub fn new(registry: ValueEvaluatorRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ValueEvaluatorRegistry {
        &self.registry
    }

    /// Evaluate a condition that may not have been provided at all
    pub async fn evaluate_condition(
        &self,
        condition: Option<&Condition>,
    ) -> ConditionEvaluationResult {
        match condition {
            Some(condition) => self.evaluate(condition).await,
            None => ConditionEvaluationResult::failed(
                ConditionOperator::Unspecified,
                ConditionError::NullConditionProvided,
            ),
        }
    }

    pub fn evaluate<'a>(
        &'a self,
        condition: &'a Condition,
    ) -> BoxFuture<'a, ConditionEvaluationResult> {
        async move {
            match condition {
                Condition::Value(c) => self.evaluate_value(c).await,
                Condition::Logical(c) => self.evaluate_logical(c).await,
            }
        }
        .boxed()
    }

    /// Both children are evaluated concurrently and always reported,
    /// whatever the operator.
    async fn evaluate_logical(&self, condition: &LogicalCondition) -> ConditionEvaluationResult {
        let (left, right) = futures::join!(
            self.evaluate(condition.left()),
            self.evaluate(condition.right())
        );

        let passed = match condition.operator() {
            ConditionOperator::And => left.passed && right.passed,
            ConditionOperator::Or => left.passed || right.passed,
            op => {
                return ConditionEvaluationResult::failed(
                    op,
                    ConditionError::unsupported_operator(op, "logical conditions"),
                )
            }
        };

        ConditionEvaluationResult {
            passed,
            operator: condition.operator(),
            left: Some(Operand::Condition(condition.left().clone())),
            right: Some(Operand::Condition(condition.right().clone())),
            nested: vec![left, right],
            error: None,
        }
    }

    async fn evaluate_value(&self, condition: &ValueCondition) -> ConditionEvaluationResult {
        let mut result = ConditionEvaluationResult {
            operator: condition.operator(),
            left: condition.left().cloned().map(Operand::Value),
            right: condition.right().cloned().map(Operand::Value),
            ..Default::default()
        };

        match self.compare(condition).await {
            Ok(passed) => result.passed = passed,
            Err(e) => {
                log::debug!("Condition {} failed: {}", condition.operator(), e);
                result.error = Some(e);
            }
        }

        result
    }

    async fn compare(&self, condition: &ValueCondition) -> Result<bool, ConditionError> {
        let left = condition.left().ok_or(ConditionError::OperandMissing {
            side: OperandSide::Left,
        })?;
        let right = condition.right().ok_or(ConditionError::OperandMissing {
            side: OperandSide::Right,
        })?;

        let (a, b) = match (left.value(), right.value()) {
            (None, None) => return Err(ConditionError::UnableToDetermineValueType),
            (Some(a), Some(b)) if a.value_type() == b.value_type() => (a, b),
            _ => {
                return Err(ConditionError::type_mismatch(
                    left.value_type(),
                    right.value_type(),
                ))
            }
        };

        let value_type = a.value_type();
        let evaluator = self
            .registry
            .get(value_type)
            .await
            .ok_or(ConditionError::EvaluatorNotFound { value_type })?;

        log::trace!(
            "Evaluating {} {} {} with the {} evaluator",
            left,
            condition.operator(),
            right,
            evaluator.name()
        );

        AssertUnwindSafe(evaluator.evaluate(condition.operator(), a, b))
            .catch_unwind()
            .await
            .map_err(|payload| ConditionError::Unspecified(panic_message(payload)))?
    }
}
