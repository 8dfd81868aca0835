use crate::rules::error::ActionError;
use crate::rules::rule::ActionKey;
use crate::rules::value::{find_value, DataValue, Value};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// How actions should behave during a session.
///
/// The engine only passes the mode through; honouring it is up to each action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationMode {
    /// Real side effects
    Production,
    /// Dry run, report only
    #[default]
    Test,
}

impl fmt::Display for EvaluationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationMode::Production => write!(f, "production"),
            EvaluationMode::Test => write!(f, "test"),
        }
    }
}

/// Work fired by a passing rule
#[async_trait]
pub trait Action: Send + Sync {
    async fn execute(&self, mode: EvaluationMode) -> Result<(), ActionError>;
}

/// An action with separate production and test behaviour.
///
/// Every `ModalAction` is an `Action` that dispatches on the mode.
#[async_trait]
pub trait ModalAction: Send + Sync {
    async fn execute_production(&self) -> Result<(), ActionError>;

    async fn execute_test(&self) -> Result<(), ActionError>;
}

#[async_trait]
impl<T: ModalAction> Action for T {
    async fn execute(&self, mode: EvaluationMode) -> Result<(), ActionError> {
        match mode {
            EvaluationMode::Production => self.execute_production().await,
            EvaluationMode::Test => self.execute_test().await,
        }
    }
}

/// What an action sees of the session while being resolved
#[derive(Debug, Clone, Copy)]
pub struct ActionContext<'a> {
    pub mode: EvaluationMode,
    pub inputs: &'a [DataValue],
}

impl<'a> ActionContext<'a> {
    pub fn new(mode: EvaluationMode, inputs: &'a [DataValue]) -> Self {
        Self { mode, inputs }
    }

    /// Look up an input value, `None` if absent or null
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        find_value(self.inputs, key).and_then(DataValue::value)
    }

    /// Look up an input value the action cannot do without
    pub fn require(&self, key: &str) -> Result<&'a Value, ActionError> {
        self.get(key)
            .ok_or_else(|| ActionError::NoMatchingDataValueFound {
                key: key.to_string(),
            })
    }
}

/// Turns an action key into something executable
#[async_trait]
pub trait ActionResolver: Send + Sync {
    /// `Ok(None)` when nothing is registered under `key`
    async fn resolve(
        &self,
        key: &ActionKey,
        context: ActionContext<'_>,
    ) -> Result<Option<Arc<dyn Action>>, ActionError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingAction {
        calls: Mutex<Vec<&'static str>>,
    }

    #[async_trait]
    impl ModalAction for RecordingAction {
        async fn execute_production(&self) -> Result<(), ActionError> {
            self.calls.lock().unwrap().push("production");
            Ok(())
        }

        async fn execute_test(&self) -> Result<(), ActionError> {
            self.calls.lock().unwrap().push("test");
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_modal_action_dispatches_on_mode() {
        let action = RecordingAction {
            calls: Mutex::new(vec![]),
        };

        action.execute(EvaluationMode::Test).await.unwrap();
        action.execute(EvaluationMode::Production).await.unwrap();

        assert_eq!(*action.calls.lock().unwrap(), vec!["test", "production"]);
    }

    #[test]
    fn test_context_require() {
        let inputs = vec![DataValue::new("Name", "Kimmy"), DataValue::null("Nickname")];
        let context = ActionContext::new(EvaluationMode::Test, &inputs);

        assert_eq!(context.require("Name").unwrap(), &Value::from("Kimmy"));
        assert_eq!(
            context.require("Nickname").unwrap_err(),
            ActionError::NoMatchingDataValueFound {
                key: "Nickname".to_string()
            }
        );
        assert!(context.get("Age").is_none());
    }

    #[test]
    fn test_default_mode_is_test() {
        assert_eq!(EvaluationMode::default(), EvaluationMode::Test);
    }
}
