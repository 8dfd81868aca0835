use anyhow::Context;
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use rulekit_rs::engine::{ActionRegistry, EngineConfig, RulesEngine, ValueEvaluatorRegistry};
use rulekit_rs::rules::{
    Action, ActionContext, ActionError, ConditionOperator, DataValue, EvaluationMode, ModalAction,
    Rule, RuleBuilder, SessionResult, Value,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate the people register demo rules
    Run {
        /// Evaluation mode, overrides the config file
        #[arg(short, long, value_enum)]
        mode: Option<EvaluationMode>,

        /// Path to an engine config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

struct Person {
    name: &'static str,
    age: i32,
}

impl Person {
    fn data_values(&self) -> Vec<DataValue> {
        vec![
            DataValue::new("Name", self.name),
            DataValue::new("Age", self.age),
        ]
    }
}

fn require_name(context: &ActionContext<'_>) -> Result<String, ActionError> {
    match context.require("Name")? {
        Value::String(name) => Ok(name.clone()),
        other => Ok(other.to_string()),
    }
}

struct CreatePersonEntryAction {
    name: String,
}

#[async_trait]
impl ModalAction for CreatePersonEntryAction {
    async fn execute_production(&self) -> Result<(), ActionError> {
        println!("\t\tCreated person entry for {}", self.name);
        Ok(())
    }

    async fn execute_test(&self) -> Result<(), ActionError> {
        println!("\t\t[test] Would create person entry for {}", self.name);
        Ok(())
    }
}

struct MarkAsChildAction {
    name: String,
}

#[async_trait]
impl ModalAction for MarkAsChildAction {
    async fn execute_production(&self) -> Result<(), ActionError> {
        println!("\t\tMarked {} as a child", self.name);
        Ok(())
    }

    async fn execute_test(&self) -> Result<(), ActionError> {
        println!("\t\t[test] Would mark {} as a child", self.name);
        Ok(())
    }
}

async fn register_actions(registry: &ActionRegistry) -> Result<(), ActionError> {
    registry
        .register(
            "CreatePersonEntryAction",
            |context: &ActionContext<'_>| -> Result<Arc<dyn Action>, ActionError> {
                Ok(Arc::new(CreatePersonEntryAction {
                    name: require_name(context)?,
                }))
            },
        )
        .await?;

    registry
        .register(
            "MarkAsChildAction",
            |context: &ActionContext<'_>| -> Result<Arc<dyn Action>, ActionError> {
                Ok(Arc::new(MarkAsChildAction {
                    name: require_name(context)?,
                }))
            },
        )
        .await
}

fn demo_rules() -> anyhow::Result<Vec<Rule>> {
    // Fires for every person
    let register = RuleBuilder::new()
        .named("register person")
        .action("CreatePersonEntryAction")
        .build();

    let children = RuleBuilder::new()
        .named("mark children")
        .value_condition(ConditionOperator::LessThan, "Age", 18)?
        .action("MarkAsChildAction")
        .build();

    Ok(vec![register, children])
}

fn print_session(person: &Person, session: &SessionResult) {
    println!("Evaluation results for {} ({})", person.name, person.age);
    println!("------------------------------------");
    for (i, rule) in session.rule_results.iter().enumerate() {
        println!(
            "\tRule {} ({}) passed: {}",
            i + 1,
            rule.rule_name.as_deref().unwrap_or("unnamed"),
            rule.passed
        );
        for action in rule.action_results.iter().filter(|a| a.ran) {
            println!("\t\tAction fired: {}", action.action);
        }
    }
    if let Some(error) = &session.error {
        println!("\tErrors: {}", error);
    }
    println!(
        "\tCompleted: {} in {}ms",
        session.ran_to_completion,
        session.duration().num_milliseconds()
    );
    println!("------------------------------------");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    match args.command {
        Commands::Run { mode, config } => {
            let config = match config {
                Some(path) => EngineConfig::load(&path)
                    .with_context(|| format!("Failed to load config {}", path.display()))?,
                None => {
                    let mut config = EngineConfig::default();
                    config.apply_env()?;
                    config
                }
            };
            let mode = mode.unwrap_or(config.evaluation_mode);
            log::info!("Running demo rules in {} mode", mode);

            let actions = ActionRegistry::new();
            register_actions(&actions).await?;

            let engine = RulesEngine::builder()
                .evaluators(ValueEvaluatorRegistry::from_config(&config))
                .actions(Arc::new(actions))
                .build()?;

            let rules = demo_rules()?;
            let people = [
                Person {
                    name: "John",
                    age: 20,
                },
                Person {
                    name: "Kimmy",
                    age: 15,
                },
                Person {
                    name: "Dave",
                    age: 30,
                },
            ];

            let (_stop, cancel) = watch::channel(false);
            for person in &people {
                let session = engine
                    .evaluate_rules(mode, &person.data_values(), &rules, &cancel)
                    .await;
                print_session(person, &session);
            }
        }
    }

    Ok(())
}
