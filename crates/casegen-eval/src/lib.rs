//! Evaluation helpers for generated fixture suites.

pub mod errors;
pub mod suite_metrics;

pub use errors::EvalError;
pub use suite_metrics::{
    CategoryMetrics, PairCoverage, SuiteMetrics, collect_suite_metrics,
    collect_suite_metrics_with_schema, evaluate_master_file,
};
