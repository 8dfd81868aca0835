// SPDX-License-Identifier: MIT

use super::builtin::{
    BooleanEvaluator, OrderedEvaluator, StringComparison, StringEvaluator, StructuralEvaluator,
    UuidEvaluator,
};
use super::ValueEvaluator;
use crate::engine::config::EngineConfig;
use crate::rules::error::RegistryError;
use crate::rules::value::ValueType;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Maps value types to evaluators, with a fallback for unregistered types
#[derive(Clone)]
pub struct ValueEvaluatorRegistry {
    evaluators: Arc<RwLock<HashMap<ValueType, Arc<dyn ValueEvaluator>>>>,
    default: Arc<RwLock<Option<Arc<dyn ValueEvaluator>>>>,
}

impl ValueEvaluatorRegistry {
    /// An empty registry with no default
    pub fn new() -> Self {
        Self {
            evaluators: Arc::new(RwLock::new(HashMap::new())),
            default: Arc::new(RwLock::new(None)),
        }
    }

    /// A registry holding every built-in evaluator, with structural
    /// equality as the default
    pub fn with_defaults(comparison: StringComparison) -> Self {
        let ordered: Arc<dyn ValueEvaluator> = Arc::new(OrderedEvaluator);
        let structural: Arc<dyn ValueEvaluator> = Arc::new(StructuralEvaluator);

        let mut evaluators: HashMap<ValueType, Arc<dyn ValueEvaluator>> = HashMap::new();
        evaluators.insert(ValueType::Bool, Arc::new(BooleanEvaluator));
        evaluators.insert(ValueType::String, Arc::new(StringEvaluator::new(comparison)));
        evaluators.insert(ValueType::Uuid, Arc::new(UuidEvaluator));
        evaluators.insert(ValueType::Json, Arc::clone(&structural));
        for value_type in ValueType::ORDERED {
            evaluators.insert(value_type, Arc::clone(&ordered));
        }

        Self {
            evaluators: Arc::new(RwLock::new(evaluators)),
            default: Arc::new(RwLock::new(Some(structural))),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        if config.register_default_evaluators {
            Self::with_defaults(config.string_comparison)
        } else {
            Self::new()
        }
    }

    /// The evaluator for `value_type`, else the default, else `None`
    pub async fn get(&self, value_type: ValueType) -> Option<Arc<dyn ValueEvaluator>> {
        if let Some(evaluator) = self.evaluators.read().await.get(&value_type) {
            return Some(Arc::clone(evaluator));
        }
        self.default.read().await.clone()
    }

    /// Register an evaluator, replacing any previous one for the type
    pub async fn register(&self, value_type: ValueType, evaluator: Arc<dyn ValueEvaluator>) {
        log::debug!(
            "Registering {} evaluator for {} values",
            evaluator.name(),
            value_type
        );
        let mut evaluators = self.evaluators.write().await;
        evaluators.insert(value_type, evaluator);
    }

    /// Set the fallback evaluator
    pub async fn register_default(
        &self,
        evaluator: impl Into<Option<Arc<dyn ValueEvaluator>>>,
    ) -> Result<(), RegistryError> {
        let evaluator = evaluator.into().ok_or_else(|| {
            RegistryError::InvalidArgument("a default evaluator must be provided".to_string())
        })?;

        log::debug!("Registering {} evaluator as default", evaluator.name());
        *self.default.write().await = Some(evaluator);
        Ok(())
    }

    pub async fn default_evaluator(&self) -> Option<Arc<dyn ValueEvaluator>> {
        self.default.read().await.clone()
    }

    /// Types with a specific evaluator, sorted
    pub async fn registered_types(&self) -> Vec<ValueType> {
        let mut types: Vec<ValueType> = self.evaluators.read().await.keys().copied().collect();
        types.sort();
        types
    }
}

impl Default for ValueEvaluatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
