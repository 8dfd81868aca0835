// SPDX-License-Identifier: MIT

//! Action registry - resolves action keys through registered factories

use crate::rules::action::{Action, ActionContext, ActionResolver};
use crate::rules::error::ActionError;
use crate::rules::rule::ActionKey;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Builds an action for one execution, with dependencies captured at
/// registration time
pub type ActionFactory =
    dyn Fn(&ActionContext<'_>) -> Result<Arc<dyn Action>, ActionError> + Send + Sync;

#[derive(Clone)]
pub struct ActionRegistry {
    factories: Arc<RwLock<HashMap<ActionKey, Arc<ActionFactory>>>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self {
            factories: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a factory; each key can only be registered once
    pub async fn register<F>(
        &self,
        key: impl Into<ActionKey>,
        factory: F,
    ) -> Result<(), ActionError>
    where
        F: Fn(&ActionContext<'_>) -> Result<Arc<dyn Action>, ActionError> + Send + Sync + 'static,
    {
        let key = key.into();
        let mut factories = self.factories.write().await;
        if factories.contains_key(&key) {
            return Err(ActionError::ActionAlreadyRegistered {
                key: key.to_string(),
            });
        }

        log::debug!("Registered action: {}", key);
        factories.insert(key, Arc::new(factory));
        Ok(())
    }

    /// Register one shared instance, handed out on every resolution
    pub async fn register_action(
        &self,
        key: impl Into<ActionKey>,
        action: Arc<dyn Action>,
    ) -> Result<(), ActionError> {
        self.register(key, move |_| Ok(Arc::clone(&action))).await
    }

    pub async fn contains(&self, key: &ActionKey) -> bool {
        self.factories.read().await.contains_key(key)
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ActionResolver for ActionRegistry {
    async fn resolve(
        &self,
        key: &ActionKey,
        context: ActionContext<'_>,
    ) -> Result<Option<Arc<dyn Action>>, ActionError> {
        let factory = self.factories.read().await.get(key).cloned();
        match factory {
            Some(factory) => factory(&context).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::action::EvaluationMode;
    use crate::rules::value::{DataValue, Value};
    use std::sync::Mutex;

    /// Records the greeting it was built with
    struct GreetAction {
        name: String,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Action for GreetAction {
        async fn execute(&self, _mode: EvaluationMode) -> Result<(), ActionError> {
            self.log.lock().unwrap().push(format!("hello {}", self.name));
            Ok(())
        }
    }

    fn greet_factory(
        log: Arc<Mutex<Vec<String>>>,
    ) -> impl Fn(&ActionContext<'_>) -> Result<Arc<dyn Action>, ActionError> + Send + Sync + 'static
    {
        move |context: &ActionContext<'_>| -> Result<Arc<dyn Action>, ActionError> {
            let name = match context.require("Name")? {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Ok(Arc::new(GreetAction {
                name,
                log: Arc::clone(&log),
            }))
        }
    }

    #[tokio::test]
    async fn test_register_and_resolve() {
        let registry = ActionRegistry::new();
        let log = Arc::new(Mutex::new(vec![]));
        registry
            .register("Greet", greet_factory(Arc::clone(&log)))
            .await
            .unwrap();

        let inputs = vec![DataValue::new("Name", "Kimmy")];
        let context = ActionContext::new(EvaluationMode::Test, &inputs);
        let action = registry
            .resolve(&"Greet".into(), context)
            .await
            .unwrap()
            .unwrap();

        action.execute(EvaluationMode::Test).await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["hello Kimmy".to_string()]);
    }

    #[tokio::test]
    async fn test_duplicate_registration_fails() {
        let registry = ActionRegistry::new();
        let log = Arc::new(Mutex::new(vec![]));

        registry
            .register("Greet", greet_factory(Arc::clone(&log)))
            .await
            .unwrap();
        let err = registry
            .register("Greet", greet_factory(log))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ActionError::ActionAlreadyRegistered {
                key: "Greet".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_resolve_unknown_key() {
        let registry = ActionRegistry::new();
        let context = ActionContext::new(EvaluationMode::Production, &[]);

        let resolved = registry.resolve(&"Missing".into(), context).await.unwrap();
        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn test_factory_missing_input() {
        let registry = ActionRegistry::new();
        registry
            .register("Greet", greet_factory(Arc::new(Mutex::new(vec![]))))
            .await
            .unwrap();

        let context = ActionContext::new(EvaluationMode::Test, &[]);
        let err = registry
            .resolve(&"Greet".into(), context)
            .await
            .err()
            .unwrap();

        assert_eq!(
            err,
            ActionError::NoMatchingDataValueFound {
                key: "Name".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_register_shared_instance() {
        let registry = ActionRegistry::new();
        let log = Arc::new(Mutex::new(vec![]));
        let action: Arc<dyn Action> = Arc::new(GreetAction {
            name: "Dave".to_string(),
            log: Arc::clone(&log),
        });

        registry
            .register_action(uuid::Uuid::nil(), Arc::clone(&action))
            .await
            .unwrap();

        assert!(registry.contains(&ActionKey::Id(uuid::Uuid::nil())).await);
        let context = ActionContext::new(EvaluationMode::Test, &[]);
        let resolved = registry
            .resolve(&ActionKey::Id(uuid::Uuid::nil()), context)
            .await
            .unwrap()
            .unwrap();
        assert!(Arc::ptr_eq(&resolved, &action));
    }
}
