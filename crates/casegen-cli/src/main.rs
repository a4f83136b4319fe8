mod registry;

use std::path::{Path, PathBuf};
use std::time::Instant;

use casegen_core::{
    Error as CoreError, OptionSchema, load_schema, option_schema_json_schema, validate_option_schema,
};
use casegen_eval::{EvalError, collect_suite_metrics_with_schema, evaluate_master_file};
use casegen_generate::{GenerateOptions, GenerationEngine, GenerationError};
use casegen_plan::{
    PlanError, StrategyPlan, ValidationReport, load_plan, load_plan_value, plan_json_schema,
    validate_plan,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use registry::{PlannedCategory, RunContext, RunOptions, init_run_logging, start_run, write_metrics};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
enum CliError {
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),
    #[error("schema error: {0}")]
    Core(#[from] CoreError),
    #[error("plan error: {0}")]
    Plan(#[from] PlanError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("evaluation error: {0}")]
    Eval(#[from] EvalError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("validation failed with {0} error(s)")]
    Validation(usize),
}

#[derive(Parser, Debug)]
#[command(name = "casegen", version, about = "Option-based test case generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate batch files and the master index for every planned category.
    Generate(GenerateArgs),
    /// Check a schema, and optionally a plan, without writing anything.
    Validate(ValidateArgs),
    /// Print the JSON Schema of an input document.
    JsonSchema(JsonSchemaArgs),
    /// Print metrics for a previously written master index.
    Metrics(MetricsArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Option schema document.
    #[arg(long)]
    schema: PathBuf,
    /// Strategy plan (.toml or .json). Defaults to the builtin plan.
    #[arg(long)]
    strategies: Option<PathBuf>,
    /// Output directory for generated cases.
    #[arg(long, default_value = "test_case_data")]
    out: PathBuf,
    /// Output directory for runs.
    #[arg(long, default_value = "runs")]
    run_dir: PathBuf,
    /// Cases per batch file.
    #[arg(long)]
    batch_size: Option<usize>,
    /// Timeout assigned to each case, in milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// Suite date (YYYY-MM-DD).
    #[arg(long)]
    date: Option<String>,
    /// Fail on missing categories or unknown strategy names.
    #[arg(long, default_value_t = false)]
    strict: bool,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    #[arg(long)]
    schema: PathBuf,
    #[arg(long)]
    strategies: Option<PathBuf>,
    /// Report warnings as errors.
    #[arg(long, default_value_t = false)]
    strict: bool,
}

#[derive(Args, Debug)]
struct JsonSchemaArgs {
    #[arg(long, value_enum)]
    kind: SchemaKind,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SchemaKind {
    Schema,
    Plan,
}

#[derive(Args, Debug)]
struct MetricsArgs {
    /// Path to all_generated_tests.json.
    #[arg(long)]
    master: PathBuf,
    /// Option schema, enables pair coverage.
    #[arg(long)]
    schema: Option<PathBuf>,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Validate(args) => run_validate(args),
        Command::JsonSchema(args) => run_json_schema(args),
        Command::Metrics(args) => run_metrics(args),
    }
}

fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let GenerateArgs {
        schema: schema_path,
        strategies,
        out,
        run_dir,
        batch_size,
        timeout_ms,
        date,
        strict,
    } = args;

    if batch_size == Some(0) {
        return Err(CliError::InvalidConfig(
            "batch size must be greater than zero".to_string(),
        ));
    }
    if let Some(date) = &date {
        check_date(date)?;
    }

    let schema = load_schema(&schema_path)?;
    let mut plan = match &strategies {
        Some(path) => load_plan(path)?,
        None => StrategyPlan::builtin(),
    };
    if let Some(batch_size) = batch_size {
        plan.batch_size = batch_size;
    }
    if let Some(timeout_ms) = timeout_ms {
        plan.timeout_ms = timeout_ms;
    }

    let run_id = Uuid::new_v4().to_string();
    let run_ctx = RunContext {
        run_id: run_id.clone(),
        started_at: chrono::Utc::now(),
        schema_path: schema_path.clone(),
        plan_path: strategies,
        strict,
        run_dir,
        out_dir: out.clone(),
        options: run_options(&plan, date.clone()),
    };

    let run_paths = start_run(&run_ctx)?;
    init_run_logging(&run_paths.logs_path)?;

    tracing::info!(event = "run_started", run_id = %run_id, schema = %schema_path.display());
    let timer = Instant::now();

    let engine = GenerationEngine::new(GenerateOptions {
        out_dir: out,
        strict,
        date,
    });
    let result = match engine.run(&schema, &plan) {
        Ok(result) => result,
        Err(err) => {
            tracing::error!(event = "run_finished", status = "failed", error = %err);
            return Err(err.into());
        }
    };

    let metrics = collect_suite_metrics_with_schema(&result.master.test_cases, &schema);
    write_metrics(&run_paths, &metrics)?;
    tracing::info!(event = "metrics_written", path = %run_paths.metrics_path.display());

    for warning in &metrics.warnings {
        tracing::warn!(event = "metrics_warning", message = %warning);
    }

    let duration_ms = timer.elapsed().as_millis();
    tracing::info!(
        event = "run_finished",
        status = "success",
        total_tests = result.report.total_tests,
        duration_ms = duration_ms
    );

    println!(
        "generated {} test cases into {} (run {})",
        result.report.total_tests,
        result.out_dir.display(),
        run_paths.root.display()
    );
    if !result.report.skipped_categories.is_empty() {
        println!(
            "skipped categories: {}",
            result.report.skipped_categories.join(", ")
        );
    }

    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), CliError> {
    let schema = load_schema(&args.schema)?;
    validate_option_schema(&schema)?;

    let mut report = ValidationReport::default();
    if let Some(path) = &args.strategies {
        report.merge(check_plan_file(path, &schema)?);
    }
    if args.strict {
        report = report.escalate_warnings();
    }

    for issue in report.issues() {
        println!("{issue}");
    }

    if !report.is_ok() {
        return Err(CliError::Validation(report.errors.len()));
    }

    println!(
        "ok: {} categories, {} warning(s)",
        schema.test_categories.len(),
        report.warnings.len()
    );
    Ok(())
}

fn run_json_schema(args: JsonSchemaArgs) -> Result<(), CliError> {
    let schema = match args.kind {
        SchemaKind::Schema => option_schema_json_schema(),
        SchemaKind::Plan => plan_json_schema(),
    };
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

fn run_metrics(args: MetricsArgs) -> Result<(), CliError> {
    let schema = args.schema.as_deref().map(load_schema).transpose()?;
    let metrics = evaluate_master_file(&args.master, schema.as_ref())?;
    println!("{}", serde_json::to_string_pretty(&metrics)?);
    Ok(())
}

/// Run a plan file through structural, decode and schema checks.
fn check_plan_file(path: &Path, schema: &OptionSchema) -> Result<ValidationReport, CliError> {
    let plan_json = load_plan_value(path)?;
    let plan_schema = serde_json::to_value(plan_json_schema())?;

    Ok(match validate_plan(&plan_json, &plan_schema, schema) {
        Ok(validated) => ValidationReport {
            errors: Vec::new(),
            warnings: validated.warnings,
        },
        Err(report) => report,
    })
}

fn run_options(plan: &StrategyPlan, date: Option<String>) -> RunOptions {
    RunOptions {
        plan_version: plan.version.clone(),
        generation_strategy: plan.generation_strategy.clone(),
        batch_size: plan.batch_size,
        timeout_ms: plan.timeout_ms,
        date: date.or_else(|| plan.date.clone()),
        categories: plan
            .categories
            .iter()
            .map(|entry| PlannedCategory {
                category: entry.category.clone(),
                strategy: entry.strategy.clone(),
            })
            .collect(),
    }
}

fn check_date(date: &str) -> Result<(), CliError> {
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| CliError::InvalidConfig(format!("date must be YYYY-MM-DD, got '{date}'")))
}
