// SPDX-License-Identifier: MIT

//! Per-type value comparison strategies

pub mod builtin;
pub mod registry;

use crate::rules::error::ConditionError;
use crate::rules::operator::ConditionOperator;
use crate::rules::value::Value;
use async_trait::async_trait;

pub use builtin::{
    BooleanEvaluator, OrderedEvaluator, StringComparison, StringEvaluator, StructuralEvaluator,
    UuidEvaluator,
};
pub use registry::ValueEvaluatorRegistry;

/// Compares two values of the same type under a value operator.
///
/// Operands are never null here; the condition evaluator rejects null and
/// mismatched operands before dispatching.
#[async_trait]
pub trait ValueEvaluator: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Fails with `UnsupportedOperator` when `operator` does not apply to the type
    async fn evaluate(
        &self,
        operator: ConditionOperator,
        left: &Value,
        right: &Value,
    ) -> Result<bool, ConditionError>;
}
