//! Results produced by an evaluation session

use crate::rules::action::EvaluationMode;
use crate::rules::condition::Condition;
use crate::rules::error::{ActionError, AggregateError, ConditionError, RuleFault};
use crate::rules::operator::ConditionOperator;
use crate::rules::rule::ActionKey;
use crate::rules::value::DataValue;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// An operand echoed back in a condition result
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Value(DataValue),
    Condition(Condition),
}

/// Outcome of evaluating one condition
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConditionEvaluationResult {
    pub passed: bool,
    pub operator: ConditionOperator,
    pub left: Option<Operand>,
    pub right: Option<Operand>,
    /// Child results of a logical condition, left then right
    pub nested: Vec<ConditionEvaluationResult>,
    pub error: Option<ConditionError>,
}

impl ConditionEvaluationResult {
    /// A failed result carrying its cause
    pub fn failed(operator: ConditionOperator, error: ConditionError) -> Self {
        Self {
            passed: false,
            operator,
            error: Some(error),
            ..Default::default()
        }
    }
}

/// Outcome of one action of a passing rule
#[derive(Debug, Clone, PartialEq)]
pub struct ActionExecutionResult {
    pub action: ActionKey,
    /// Whether the action was resolved and started
    pub ran: bool,
    pub succeeded: bool,
    pub error: Option<ActionError>,
}

impl ActionExecutionResult {
    /// An action that was not attempted because an earlier one failed
    pub fn skipped(action: ActionKey) -> Self {
        Self {
            action,
            ran: false,
            succeeded: false,
            error: None,
        }
    }
}

/// Outcome of one rule
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RuleEvaluationResult {
    pub rule_name: Option<String>,
    /// Conditions passed and every action ran and succeeded
    pub passed: bool,
    pub conditions_passed: bool,
    pub condition_results: Vec<ConditionEvaluationResult>,
    pub action_results: Vec<ActionExecutionResult>,
    pub fault: Option<RuleFault>,
}

impl RuleEvaluationResult {
    /// Whether any action of the rule actually ran
    pub fn fired(&self) -> bool {
        self.action_results.iter().any(|a| a.ran)
    }
}

/// Outcome of one `evaluate_rules` call
#[derive(Debug, Clone)]
pub struct SessionResult {
    pub session_id: Uuid,
    pub mode: EvaluationMode,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub ran_to_completion: bool,
    pub was_cancelled: bool,
    pub error: Option<AggregateError>,
    pub rule_results: Vec<RuleEvaluationResult>,
}

impl SessionResult {
    /// Start a new session now
    pub fn start(mode: EvaluationMode) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            mode,
            start_time: Utc::now(),
            end_time: None,
            ran_to_completion: true,
            was_cancelled: false,
            error: None,
            rule_results: Vec::new(),
        }
    }

    /// Time between start and end, or until now while still running
    pub fn duration(&self) -> Duration {
        self.end_time.unwrap_or_else(Utc::now) - self.start_time
    }

    pub fn passed_rules(&self) -> usize {
        self.rule_results.iter().filter(|r| r.passed).count()
    }
}
