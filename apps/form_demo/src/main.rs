use std::{collections::BTreeMap, sync::Arc};

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use form_core::{FormController, FormEvent, SubmitOutcome, ValidationStrategy};
use gateway::{SimulatedGateway, SubmissionGateway};
use shared::field_errors::FieldErrors;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, OutcomeMode, Settings};

#[derive(Parser, Debug)]
#[command(about = "Fill in, validate and submit the sign-up form from the command line")]
struct Cli {
    #[arg(long)]
    strategy: Option<ValidationStrategy>,
    #[arg(long, value_enum)]
    outcome: Option<OutcomeMode>,
    #[arg(long)]
    delay_ms: Option<u64>,
    #[arg(long)]
    seed: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct FormInput {
    /// Field assignment such as `firstName=Ada`, `address.city=London` or `hobbies.1.years=3`.
    #[arg(long = "set", value_name = "PATH=VALUE")]
    assignments: Vec<String>,
    /// Number of hobby rows the form is opened with.
    #[arg(long, default_value_t = 1)]
    hobbies: usize,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the errors the selected strategy reports, without submitting.
    Validate(FormInput),
    /// Validate and, if clean, submit to the simulated gateway.
    Submit(FormInput),
    /// Run every strategy over the same input and print their errors side by side.
    Compare(FormInput),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings()?;
    apply_overrides(&mut settings, &cli);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let gateway = build_gateway(&settings);

    match cli.command {
        Command::Validate(input) => {
            let form = open_form(settings.strategy, gateway, &input).await?;
            let errors = form.validate().await;
            print_errors(form.strategy_name(), &errors)?;
        }
        Command::Submit(input) => {
            let form = open_form(settings.strategy, gateway, &input).await?;
            let log_task = tokio::spawn(log_events(form.subscribe_events()));

            println!("Submitting with {} validation...", form.strategy_name());
            match form.submit().await {
                SubmitOutcome::Succeeded(ack) => {
                    println!("Success: {}", serde_json::to_string_pretty(&ack)?);
                }
                SubmitOutcome::Failed(message) => println!("Error: {message}"),
                SubmitOutcome::Invalid(errors) => print_errors(form.strategy_name(), &errors)?,
                other => println!("Submission did not run: {other:?}"),
            }
            println!(
                "State: {}",
                serde_json::to_string(&form.submission_state().await)?
            );

            form.close();
            drop(form);
            log_task.abort();
        }
        Command::Compare(input) => {
            let mut report = BTreeMap::new();
            for strategy in ValidationStrategy::ALL {
                let form = open_form(strategy, Arc::clone(&gateway), &input).await?;
                report.insert(strategy.as_str(), form.validate().await);
            }
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn apply_overrides(settings: &mut Settings, cli: &Cli) {
    if let Some(strategy) = cli.strategy {
        settings.strategy = strategy;
    }
    if let Some(outcome) = cli.outcome {
        settings.outcome = outcome;
    }
    if let Some(delay_ms) = cli.delay_ms {
        settings.gateway_delay_ms = delay_ms;
    }
    if let Some(seed) = cli.seed {
        settings.seed = Some(seed);
    }
}

fn build_gateway(settings: &Settings) -> Arc<dyn SubmissionGateway> {
    let gateway = SimulatedGateway::new(settings.gateway_delay(), settings.outcome_policy());
    match settings.seed {
        Some(seed) => Arc::new(gateway.with_seed(seed)),
        None => Arc::new(gateway),
    }
}

async fn open_form(
    strategy: ValidationStrategy,
    gateway: Arc<dyn SubmissionGateway>,
    input: &FormInput,
) -> Result<Arc<FormController>> {
    let form = FormController::with_strategy(strategy, gateway);
    for _ in 1..input.hobbies {
        form.add_hobby().await;
    }
    for assignment in &input.assignments {
        let (path, value) = assignment
            .split_once('=')
            .ok_or_else(|| anyhow!("expected PATH=VALUE, got '{assignment}'"))?;
        form.set_field_raw(path, value)
            .await
            .with_context(|| format!("failed to apply '{assignment}'"))?;
    }
    Ok(form)
}

fn print_errors(strategy: &str, errors: &FieldErrors) -> Result<()> {
    if errors.is_empty() {
        println!("{strategy}: no validation errors");
        return Ok(());
    }
    println!("{strategy}: {} problem(s)", errors.field_error_count());
    for (path, message) in errors.iter() {
        println!("  {path}: {message}");
    }
    println!("{}", serde_json::to_string_pretty(errors)?);
    Ok(())
}

async fn log_events(mut events: tokio::sync::broadcast::Receiver<FormEvent>) {
    while let Ok(event) = events.recv().await {
        info!(?event, "form event");
    }
}
