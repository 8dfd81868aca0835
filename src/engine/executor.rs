// SPDX-License-Identifier: MIT

//! Session execution
//!
//! Rules are processed one after another. Within a rule, top-level
//! conditions are compiled and evaluated as concurrent tasks, then the
//! rule's actions run sequentially. Once an action fails the remaining
//! ones are skipped but still reported.

use crate::engine::condition::ConditionEvaluator;
use crate::engine::evaluator::ValueEvaluatorRegistry;
use crate::rules::action::{ActionContext, ActionResolver, EvaluationMode};
use crate::rules::error::{panic_message, ActionError, ConditionError, EngineError, RuleFault};
use crate::rules::result::{
    ActionExecutionResult, ConditionEvaluationResult, RuleEvaluationResult, SessionResult,
};
use crate::rules::rule::{ActionKey, Rule, RuleCondition};
use crate::rules::value::DataValue;
use chrono::Utc;
use futures::future::join_all;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Clone)]
pub struct RulesEngine {
    conditions: ConditionEvaluator,
    actions: Arc<dyn ActionResolver>,
}

impl RulesEngine {
    pub fn new(evaluators: ValueEvaluatorRegistry, actions: Arc<dyn ActionResolver>) -> Self {
        Self {
            conditions: ConditionEvaluator::new(evaluators),
            actions,
        }
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn evaluators(&self) -> &ValueEvaluatorRegistry {
        self.conditions.registry()
    }

    /// Evaluate `rules` in order against `inputs`.
    ///
    /// Never fails: faults are reported through the returned session.
    /// `cancel` is checked before each rule starts; `true` stops the session.
    pub async fn evaluate_rules(
        &self,
        mode: EvaluationMode,
        inputs: &[DataValue],
        rules: &[Rule],
        cancel: &watch::Receiver<bool>,
    ) -> SessionResult {
        let mut session = SessionResult::start(mode);
        log::info!(
            "Session {} started: {} rule(s), {} input(s), {} mode",
            session.session_id,
            rules.len(),
            inputs.len(),
            mode
        );

        let outcome = AssertUnwindSafe(self.run_session(&mut session, inputs, rules, cancel))
            .catch_unwind()
            .await;

        if let Err(payload) = outcome {
            let fault = RuleFault::SessionAborted(panic_message(payload));
            log::error!("Session {} aborted: {}", session.session_id, fault);
            session.error.get_or_insert_with(Default::default).faults.push(fault);
        }

        session.ran_to_completion = session.error.is_none();
        session.end_time = Some(Utc::now());

        log::info!(
            "Session {} finished in {}ms: {}/{} rule(s) passed, cancelled: {}, completed: {}",
            session.session_id,
            session.duration().num_milliseconds(),
            session.passed_rules(),
            session.rule_results.len(),
            session.was_cancelled,
            session.ran_to_completion
        );

        session
    }

    async fn run_session(
        &self,
        session: &mut SessionResult,
        inputs: &[DataValue],
        rules: &[Rule],
        cancel: &watch::Receiver<bool>,
    ) {
        let inputs: Arc<[DataValue]> = Arc::from(inputs);

        for (index, rule) in rules.iter().enumerate() {
            if *cancel.borrow() {
                log::warn!(
                    "Session {} cancelled before rule {}",
                    session.session_id,
                    rule_label(rule, index)
                );
                session.was_cancelled = true;
                break;
            }

            let mut result = RuleEvaluationResult {
                rule_name: rule.name().map(str::to_string),
                ..Default::default()
            };

            let outcome =
                AssertUnwindSafe(self.evaluate_rule(session.mode, &inputs, rule, &mut result))
                    .catch_unwind()
                    .await;

            // Whatever was gathered before the panic stays on the result
            if let Err(payload) = outcome {
                let fault = RuleFault::Panicked {
                    rule: rule_label(rule, index),
                    message: panic_message(payload),
                };
                log::error!("{}", fault);
                session
                    .error
                    .get_or_insert_with(Default::default)
                    .faults
                    .push(fault.clone());

                result.passed = false;
                result.fault = Some(fault);
            }

            session.rule_results.push(result);
        }
    }

    /// Fills `result` in as evaluation progresses, so a caller catching a
    /// panic still sees the conditions and actions that completed
    async fn evaluate_rule(
        &self,
        mode: EvaluationMode,
        inputs: &Arc<[DataValue]>,
        rule: &Rule,
        result: &mut RuleEvaluationResult,
    ) {
        result.condition_results = self.evaluate_conditions(inputs, rule.conditions()).await;
        result.conditions_passed = result.condition_results.iter().all(|r| r.passed);

        if result.conditions_passed {
            self.execute_actions(mode, inputs, rule.actions(), &mut result.action_results)
                .await;
        }

        let actions_passed = result.action_results.iter().all(|a| a.ran && a.succeeded);
        result.passed = result.conditions_passed && actions_passed;

        log::debug!(
            "Rule {} evaluated: conditions passed: {}, passed: {}",
            rule.name().unwrap_or("<unnamed>"),
            result.conditions_passed,
            result.passed
        );
    }

    /// Compile and evaluate each condition on its own task; results keep
    /// the declared order
    async fn evaluate_conditions(
        &self,
        inputs: &Arc<[DataValue]>,
        conditions: &[RuleCondition],
    ) -> Vec<ConditionEvaluationResult> {
        let handles: Vec<_> = conditions
            .iter()
            .cloned()
            .map(|rule_condition| {
                let evaluator = self.conditions.clone();
                let inputs = Arc::clone(inputs);
                tokio::spawn(async move {
                    match rule_condition.compile(&inputs) {
                        Ok(condition) => evaluator.evaluate(&condition).await,
                        Err(e) => ConditionEvaluationResult::failed(rule_condition.operator(), e),
                    }
                })
            })
            .collect();

        join_all(handles)
            .await
            .into_iter()
            .zip(conditions)
            .map(|(joined, condition)| {
                joined.unwrap_or_else(|e| {
                    let message = if e.is_panic() {
                        panic_message(e.into_panic())
                    } else {
                        e.to_string()
                    };
                    ConditionEvaluationResult::failed(
                        condition.operator(),
                        ConditionError::Unspecified(message),
                    )
                })
            })
            .inspect(|result| {
                if let Some(e) = &result.error {
                    log::warn!("Condition {} failed: {}", result.operator, e);
                }
            })
            .collect()
    }

    async fn execute_actions(
        &self,
        mode: EvaluationMode,
        inputs: &[DataValue],
        keys: &[ActionKey],
        results: &mut Vec<ActionExecutionResult>,
    ) {
        results.reserve(keys.len());
        let mut stop = false;

        for key in keys {
            if stop {
                log::debug!("Skipping action {}", key);
                results.push(ActionExecutionResult::skipped(key.clone()));
                continue;
            }

            let result = self.execute_action(mode, inputs, key).await;
            if !result.succeeded {
                stop = true;
            }
            results.push(result);
        }
    }

    async fn execute_action(
        &self,
        mode: EvaluationMode,
        inputs: &[DataValue],
        key: &ActionKey,
    ) -> ActionExecutionResult {
        let mut result = ActionExecutionResult::skipped(key.clone());
        let context = ActionContext::new(mode, inputs);

        let resolved = AssertUnwindSafe(async { self.actions.resolve(key, context).await })
            .catch_unwind()
            .await;

        let action = match resolved {
            Ok(Ok(Some(action))) => action,
            Ok(Ok(None)) => {
                let e = ActionError::ActionNotFound {
                    key: key.to_string(),
                };
                log::warn!("{}", e);
                result.error = Some(e);
                return result;
            }
            Ok(Err(e)) => {
                log::warn!("Action {} could not be resolved: {}", key, e);
                result.error = Some(e);
                return result;
            }
            Err(payload) => {
                let e = ActionError::Unspecified(panic_message(payload));
                log::error!("Action {} panicked while being resolved: {}", key, e);
                result.error = Some(e);
                return result;
            }
        };

        result.ran = true;
        match AssertUnwindSafe(async { action.execute(mode).await })
            .catch_unwind()
            .await
        {
            Ok(Ok(())) => {
                log::debug!("Action {} succeeded", key);
                result.succeeded = true;
            }
            Ok(Err(e)) => {
                log::warn!("Action {} failed: {}", key, e);
                result.error = Some(e);
            }
            Err(payload) => {
                let e = ActionError::Unspecified(panic_message(payload));
                log::error!("Action {} panicked: {}", key, e);
                result.error = Some(e);
            }
        }

        result
    }
}

fn rule_label(rule: &Rule, index: usize) -> String {
    match rule.name() {
        Some(name) => name.to_string(),
        None => format!("#{}", index + 1),
    }
}

/// Assembles a `RulesEngine`, requiring both collaborators
#[derive(Default)]
pub struct EngineBuilder {
    evaluators: Option<ValueEvaluatorRegistry>,
    actions: Option<Arc<dyn ActionResolver>>,
}

impl EngineBuilder {
    pub fn evaluators(mut self, registry: ValueEvaluatorRegistry) -> Self {
        self.evaluators = Some(registry);
        self
    }

    pub fn actions(mut self, resolver: Arc<dyn ActionResolver>) -> Self {
        self.actions = Some(resolver);
        self
    }

    pub fn build(self) -> Result<RulesEngine, EngineError> {
        let evaluators = self
            .evaluators
            .ok_or(EngineError::MissingCollaborator("value evaluator registry"))?;
        let actions = self
            .actions
            .ok_or(EngineError::MissingCollaborator("action resolver"))?;
        Ok(RulesEngine::new(evaluators, actions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::actions::ActionRegistry;
    use crate::engine::evaluator::{StringComparison, ValueEvaluator};
    use crate::rules::action::Action;
    use crate::rules::operator::ConditionOperator;
    use crate::rules::value::{Value, ValueType};
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::Barrier;

    struct NoopAction;

    #[async_trait]
    impl Action for NoopAction {
        async fn execute(&self, _mode: EvaluationMode) -> Result<(), ActionError> {
            Ok(())
        }
    }

    /// Passes only once two comparisons are in flight at the same time
    struct RendezvousEvaluator {
        barrier: Barrier,
    }

    #[async_trait]
    impl ValueEvaluator for RendezvousEvaluator {
        fn name(&self) -> &str {
            "rendezvous"
        }

        async fn evaluate(
            &self,
            _operator: ConditionOperator,
            _left: &Value,
            _right: &Value,
        ) -> Result<bool, ConditionError> {
            self.barrier.wait().await;
            Ok(true)
        }
    }

    fn running() -> watch::Receiver<bool> {
        watch::channel(false).1
    }

    async fn engine() -> RulesEngine {
        let actions = ActionRegistry::new();
        actions
            .register_action("Noop", Arc::new(NoopAction))
            .await
            .unwrap();

        RulesEngine::builder()
            .evaluators(ValueEvaluatorRegistry::with_defaults(
                StringComparison::CaseSensitive,
            ))
            .actions(Arc::new(actions))
            .build()
            .unwrap()
    }

    fn age_rule(limit: i32) -> Rule {
        Rule::new(
            vec![RuleCondition::value(ConditionOperator::LessThan, "Age", limit).unwrap()],
            vec!["Noop".into()],
        )
    }

    #[test]
    fn test_builder_requires_collaborators() {
        let err = RulesEngine::builder()
            .actions(Arc::new(ActionRegistry::new()))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, EngineError::MissingCollaborator(_)));

        let err = RulesEngine::builder()
            .evaluators(ValueEvaluatorRegistry::new())
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, EngineError::MissingCollaborator("action resolver")));
    }

    #[tokio::test]
    async fn test_rule_without_conditions_passes() {
        let rule = Rule::new(vec![], vec!["Noop".into()]);
        let session = engine()
            .await
            .evaluate_rules(EvaluationMode::Test, &[], &[rule], &running())
            .await;

        assert!(session.ran_to_completion);
        assert!(session.rule_results[0].passed);
        assert!(session.rule_results[0].fired());
        assert!(session.end_time.is_some());
    }

    #[tokio::test]
    async fn test_missing_input_fails_condition() {
        let session = engine()
            .await
            .evaluate_rules(
                EvaluationMode::Test,
                &[DataValue::new("Name", "Kimmy")],
                &[age_rule(18)],
                &running(),
            )
            .await;

        let rule = &session.rule_results[0];
        assert!(!rule.passed);
        assert!(rule.action_results.is_empty());
        assert_eq!(
            rule.condition_results[0].error,
            Some(ConditionError::NoDataValueFound {
                key: "Age".to_string()
            })
        );
        assert!(session.ran_to_completion);
    }

    #[tokio::test]
    async fn test_condition_results_keep_declared_order() {
        let rule = Rule::new(
            (0..8)
                .map(|i| RuleCondition::value(ConditionOperator::Equal, "Age", i).unwrap())
                .collect(),
            vec![],
        );

        let session = engine()
            .await
            .evaluate_rules(
                EvaluationMode::Test,
                &[DataValue::new("Age", 5)],
                &[rule],
                &running(),
            )
            .await;

        let passed: Vec<bool> = session.rule_results[0]
            .condition_results
            .iter()
            .map(|r| r.passed)
            .collect();
        assert_eq!(passed, (0..8).map(|i| i == 5).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_top_level_conditions_run_concurrently() {
        let evaluators = ValueEvaluatorRegistry::new();
        evaluators
            .register(
                ValueType::I32,
                Arc::new(RendezvousEvaluator {
                    barrier: Barrier::new(2),
                }),
            )
            .await;
        let engine = RulesEngine::new(evaluators, Arc::new(ActionRegistry::new()));

        let rule = Rule::new(
            vec![
                RuleCondition::value(ConditionOperator::Equal, "Age", 1).unwrap(),
                RuleCondition::value(ConditionOperator::Equal, "Age", 2).unwrap(),
            ],
            vec![],
        );
        let inputs = [DataValue::new("Age", 5)];
        let rules = [rule];
        let cancel = running();

        let session = tokio::time::timeout(
            Duration::from_secs(5),
            engine.evaluate_rules(EvaluationMode::Test, &inputs, &rules, &cancel),
        )
        .await
        .expect("conditions were evaluated one after another");

        assert!(session.rule_results[0].conditions_passed);
        assert_eq!(session.rule_results[0].condition_results.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_action_is_reported() {
        let rule = Rule::new(vec![], vec!["Missing".into(), "Noop".into()]);
        let session = engine()
            .await
            .evaluate_rules(EvaluationMode::Test, &[], &[rule], &running())
            .await;

        let result = &session.rule_results[0];
        assert!(!result.passed);
        assert!(!result.action_results[0].ran);
        assert_eq!(
            result.action_results[0].error,
            Some(ActionError::ActionNotFound {
                key: "Missing".to_string()
            })
        );
        assert_eq!(
            result.action_results[1],
            ActionExecutionResult::skipped("Noop".into())
        );
    }

    #[test]
    fn test_rule_label() {
        let unnamed = Rule::default();
        assert_eq!(rule_label(&unnamed, 2), "#3");
        assert_eq!(rule_label(&unnamed.named("adults"), 0), "adults");
    }
}
