use std::collections::BTreeMap;
use std::path::PathBuf;

use casegen_plan::Strategy;
use serde::{Deserialize, Serialize};

use crate::synth::TestCase;

/// Options for the generation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Directory receiving category folders and the master index.
    pub out_dir: PathBuf,
    /// Treat skipped categories and unknown strategy names as errors.
    pub strict: bool,
    /// Suite date override; falls back to the plan date, then today.
    pub date: Option<String>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("test_case_data"),
            strict: false,
            date: None,
        }
    }
}

/// Cases generated for one category, before anything is written.
#[derive(Debug, Clone)]
pub struct CategorySuite {
    pub category: String,
    pub base_type: String,
    /// Strategy name as written in the plan.
    pub requested_strategy: String,
    pub strategy: Strategy,
    pub cases: Vec<TestCase>,
}

/// Summary of a generated category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryReport {
    pub category: String,
    pub base_type: String,
    pub requested_strategy: String,
    pub strategy: Strategy,
    pub cases: usize,
    pub batches: usize,
    pub first_id: Option<String>,
    pub last_id: Option<String>,
    pub expected_results: BTreeMap<String, usize>,
}

impl CategoryReport {
    pub fn from_suite(suite: &CategorySuite, batches: usize) -> Self {
        let mut expected_results = BTreeMap::new();
        for case in &suite.cases {
            *expected_results
                .entry(case.expected_result.as_str().to_string())
                .or_insert(0) += 1;
        }

        Self {
            category: suite.category.clone(),
            base_type: suite.base_type.clone(),
            requested_strategy: suite.requested_strategy.clone(),
            strategy: suite.strategy,
            cases: suite.cases.len(),
            batches,
            first_id: suite.cases.first().map(|case| case.id.clone()),
            last_id: suite.cases.last().map(|case| case.id.clone()),
            expected_results,
        }
    }
}

/// Report for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: String,
    pub status: String,
    pub date: String,
    pub total_tests: usize,
    pub categories: Vec<CategoryReport>,
    pub skipped_categories: Vec<String>,
    /// Category → unrecognized strategy name that fell back to pairwise.
    pub fallback_strategies: BTreeMap<String, String>,
    pub files_written: usize,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerationReport {
    pub fn new(run_id: String, date: String) -> Self {
        Self {
            run_id,
            status: "running".to_string(),
            date,
            total_tests: 0,
            categories: Vec::new(),
            skipped_categories: Vec::new(),
            fallback_strategies: BTreeMap::new(),
            files_written: 0,
            duration_ms: 0,
            error: None,
        }
    }

    pub fn record_skipped(&mut self, category: &str) {
        self.skipped_categories.push(category.to_string());
    }

    pub fn record_fallback(&mut self, category: &str, requested: &str) {
        self.fallback_strategies
            .insert(category.to_string(), requested.to_string());
    }

    pub fn record_category(&mut self, report: CategoryReport) {
        self.total_tests += report.cases;
        self.files_written += report.batches;
        self.categories.push(report);
    }

    pub fn record_failure(&mut self, message: String) {
        self.status = "failed".to_string();
        self.error = Some(message);
    }
}
