use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use casegen_core::{CategoryConfig, OptionSchema};
use casegen_generate::{TestCase, load_master_index};

use crate::errors::EvalError;

/// Top-level metrics report for a generated suite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteMetrics {
    pub total_tests: usize,
    /// True when ids are `0001..=total_tests` in order.
    pub ids_sequential: bool,
    pub expected_results: BTreeMap<String, usize>,
    pub categories: Vec<CategoryMetrics>,
    pub warnings: Vec<String>,
}

/// Metrics for one category, in first-appearance order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryMetrics {
    pub category: String,
    pub test_type: String,
    pub cases: usize,
    pub distinct_fingerprints: usize,
    /// Fingerprints shared by more than one case of the category.
    pub duplicate_fingerprints: Vec<String>,
    pub expected_results: BTreeMap<String, usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pair_coverage: Option<PairCoverage>,
}

/// How many cross-dimension value pairs the cases exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairCoverage {
    pub possible_pairs: usize,
    pub covered_pairs: usize,
    pub ratio: f64,
}

/// Collect metrics without schema context (no pair coverage).
pub fn collect_suite_metrics(cases: &[TestCase]) -> SuiteMetrics {
    collect(cases, None)
}

/// Collect metrics, measuring pair coverage against the schema's dimensions.
pub fn collect_suite_metrics_with_schema(cases: &[TestCase], schema: &OptionSchema) -> SuiteMetrics {
    collect(cases, Some(schema))
}

/// Load a master index from disk and collect its metrics.
pub fn evaluate_master_file(
    path: &Path,
    schema: Option<&OptionSchema>,
) -> Result<SuiteMetrics, EvalError> {
    let index = load_master_index(path)?;
    if index.metadata.total_tests != index.test_cases.len() {
        return Err(EvalError::InvalidSuite(format!(
            "total_tests is {} but {} cases are listed",
            index.metadata.total_tests,
            index.test_cases.len()
        )));
    }
    Ok(collect(&index.test_cases, schema))
}

fn collect(cases: &[TestCase], schema: Option<&OptionSchema>) -> SuiteMetrics {
    let mut order: Vec<&str> = Vec::new();
    let mut grouped: BTreeMap<&str, Vec<&TestCase>> = BTreeMap::new();
    let mut expected_results = BTreeMap::new();

    for case in cases {
        let entry = grouped.entry(case.category.as_str()).or_default();
        if entry.is_empty() {
            order.push(case.category.as_str());
        }
        entry.push(case);
        *expected_results
            .entry(case.expected_result.as_str().to_string())
            .or_insert(0) += 1;
    }

    let ids_sequential = cases
        .iter()
        .enumerate()
        .all(|(idx, case)| case.id == format!("{:04}", idx + 1));

    let mut warnings = Vec::new();
    let mut categories = Vec::new();

    for category in order {
        let members = grouped.get(category).map(Vec::as_slice).unwrap_or_default();
        let config = schema.and_then(|schema| schema.category(category));
        if schema.is_some() && config.is_none() {
            warnings.push(format!(
                "category '{category}' is not in the schema; pair coverage unavailable"
            ));
        }
        categories.push(category_metrics(category, members, config));
    }

    if !ids_sequential {
        warnings.push("case ids are not sequential".to_string());
    }

    SuiteMetrics {
        total_tests: cases.len(),
        ids_sequential,
        expected_results,
        categories,
        warnings,
    }
}

fn category_metrics(
    category: &str,
    cases: &[&TestCase],
    config: Option<&CategoryConfig>,
) -> CategoryMetrics {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    let mut expected_results = BTreeMap::new();

    for case in cases {
        if !seen.insert(case.option_set_id.as_str()) && !duplicates.contains(&case.option_set_id) {
            duplicates.push(case.option_set_id.clone());
        }
        *expected_results
            .entry(case.expected_result.as_str().to_string())
            .or_insert(0) += 1;
    }

    CategoryMetrics {
        category: category.to_string(),
        test_type: cases
            .first()
            .map(|case| case.test_type.clone())
            .unwrap_or_default(),
        cases: cases.len(),
        distinct_fingerprints: seen.len(),
        duplicate_fingerprints: duplicates,
        expected_results,
        pair_coverage: config.map(|config| pair_coverage(cases, config)),
    }
}

fn pair_coverage(cases: &[&TestCase], config: &CategoryConfig) -> PairCoverage {
    let dimensions: Vec<(&str, &[serde_json::Value])> = config
        .option_dimensions
        .iter()
        .map(|(name, spec)| (name, spec.values.as_slice()))
        .collect();

    let mut possible_pairs = 0usize;
    for left in 0..dimensions.len() {
        for right in left + 1..dimensions.len() {
            possible_pairs += dimensions[left].1.len() * dimensions[right].1.len();
        }
    }

    let mut covered: HashSet<(usize, usize, usize, usize)> = HashSet::new();
    for case in cases {
        let positions: Vec<Option<usize>> = dimensions
            .iter()
            .map(|(name, values)| {
                let selected = case.options().get(name)?;
                values.iter().position(|value| value == selected)
            })
            .collect();

        for left in 0..positions.len() {
            for right in left + 1..positions.len() {
                if let (Some(a), Some(b)) = (positions[left], positions[right]) {
                    covered.insert((left, right, a, b));
                }
            }
        }
    }

    let covered_pairs = covered.len();
    PairCoverage {
        possible_pairs,
        covered_pairs,
        ratio: if possible_pairs > 0 {
            covered_pairs as f64 / possible_pairs as f64
        } else {
            1.0
        },
    }
}
