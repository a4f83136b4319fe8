use std::path::PathBuf;
use std::time::Instant;

use casegen_core::{CategoryConfig, OptionSchema};
use casegen_plan::{CategoryStrategy, Strategy, StrategyPlan, validate_plan_against_schema};
use tracing::{info, warn};

use crate::errors::GenerationError;
use crate::model::{CategoryReport, CategorySuite, GenerateOptions, GenerationReport};
use crate::output::atomic::write_json_atomic;
use crate::output::json::{MasterIndex, write_category_batches, write_master_index};
use crate::strategies::generate_combinations;
use crate::synth::{SequenceCounter, TestCase, synthesize_case};

const REPORT_FILE_NAME: &str = "generation_report.json";

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub out_dir: PathBuf,
    pub master_path: PathBuf,
    pub master: MasterIndex,
    pub report: GenerationReport,
}

/// Entry point for generating fixture suites from an option schema + plan.
#[derive(Debug, Clone)]
pub struct GenerationEngine {
    options: GenerateOptions,
}

impl GenerationEngine {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    pub fn run(
        &self,
        schema: &OptionSchema,
        plan: &StrategyPlan,
    ) -> Result<GenerationResult, GenerationError> {
        let start = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let out_dir = self.options.out_dir.clone();
        let date = self
            .options
            .date
            .clone()
            .or_else(|| plan.date.clone())
            .unwrap_or_else(|| chrono::Utc::now().format("%Y-%m-%d").to_string());

        check_plan(schema, plan, self.options.strict)?;
        std::fs::create_dir_all(&out_dir)?;

        info!(
            run_id = %run_id,
            categories = plan.categories.len(),
            strict = self.options.strict,
            out_dir = %out_dir.display(),
            "generation started"
        );

        let mut report = GenerationReport::new(run_id.clone(), date.clone());
        let mut all_cases: Vec<TestCase> = Vec::new();

        // Every category is generated before the first file is written, so a
        // bad dimension in a late category leaves no partial batches behind.
        let outcome = build_suites(schema, plan, |entry| {
            info!(category = %entry.category, "category skipped");
            report.record_skipped(&entry.category);
        })
        .and_then(|suites| {
            for suite in suites {
                if !Strategy::is_known_name(&suite.requested_strategy) {
                    report.record_fallback(&suite.category, &suite.requested_strategy);
                }

                let written = write_category_batches(
                    &out_dir,
                    &suite.category,
                    &suite.cases,
                    plan.batch_size,
                )?;

                info!(
                    category = %suite.category,
                    strategy = %suite.strategy,
                    cases = suite.cases.len(),
                    batches = written.len(),
                    "category generated"
                );

                report.record_category(CategoryReport::from_suite(&suite, written.len()));
                all_cases.extend(suite.cases);
            }
            Ok(())
        });

        let report_path = out_dir.join(REPORT_FILE_NAME);

        if let Err(err) = outcome {
            report.record_failure(err.to_string());
            report.duration_ms = start.elapsed().as_millis() as u64;
            write_json_atomic(&report_path, &report)?;
            warn!(run_id = %run_id, error = %err, "generation failed");
            return Err(err);
        }

        let master = MasterIndex::new(
            plan.version.clone(),
            date,
            plan.generation_strategy.clone(),
            all_cases,
        );
        let master_path = write_master_index(&out_dir, &master)?;

        report.status = "success".to_string();
        report.files_written += 1;
        report.duration_ms = start.elapsed().as_millis() as u64;
        write_json_atomic(&report_path, &report)?;

        info!(
            run_id = %run_id,
            total_tests = report.total_tests,
            skipped = report.skipped_categories.len(),
            duration_ms = report.duration_ms,
            "generation completed"
        );

        Ok(GenerationResult {
            out_dir,
            master_path,
            master,
            report,
        })
    }
}

/// Generate every planned category in memory, without writing files.
///
/// Case ids run across categories in plan order; missing categories are skipped.
pub fn generate_suite(
    schema: &OptionSchema,
    plan: &StrategyPlan,
) -> Result<Vec<CategorySuite>, GenerationError> {
    build_suites(schema, plan, |_| {})
}

fn build_suites(
    schema: &OptionSchema,
    plan: &StrategyPlan,
    mut on_skipped: impl FnMut(&CategoryStrategy),
) -> Result<Vec<CategorySuite>, GenerationError> {
    let mut counter = SequenceCounter::new();
    let mut suites = Vec::new();

    for entry in &plan.categories {
        match schema.category(&entry.category) {
            Some(config) => {
                suites.push(generate_category(entry, config, plan.timeout_ms, &mut counter)?)
            }
            None => on_skipped(entry),
        }
    }

    Ok(suites)
}

fn generate_category(
    entry: &CategoryStrategy,
    config: &CategoryConfig,
    timeout_ms: u64,
    counter: &mut SequenceCounter,
) -> Result<CategorySuite, GenerationError> {
    let strategy = entry.resolved();
    let combinations =
        generate_combinations(&config.option_dimensions, strategy).map_err(|err| match err {
            GenerationError::InvalidSchema(message) => {
                GenerationError::InvalidSchema(format!("{}: {message}", entry.category))
            }
            other => other,
        })?;

    let cases = combinations
        .into_iter()
        .map(|combination| {
            synthesize_case(
                &config.base_type,
                combination,
                counter.advance(),
                &entry.category,
            )
            .with_timeout(timeout_ms)
        })
        .collect();

    Ok(CategorySuite {
        category: entry.category.clone(),
        base_type: config.base_type.clone(),
        requested_strategy: entry.strategy.clone(),
        strategy,
        cases,
    })
}

fn check_plan(
    schema: &OptionSchema,
    plan: &StrategyPlan,
    strict: bool,
) -> Result<(), GenerationError> {
    let report = validate_plan_against_schema(plan, schema);
    let report = if strict {
        report.escalate_warnings()
    } else {
        report
    };

    if report.is_ok() {
        return Ok(());
    }

    let messages: Vec<String> = report
        .errors
        .iter()
        .map(|issue| format!("{} ({})", issue.message, issue.path))
        .collect();
    Err(GenerationError::InvalidPlan(messages.join("; ")))
}
