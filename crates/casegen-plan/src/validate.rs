use std::collections::HashSet;

use casegen_core::OptionSchema;
use jsonschema::JSONSchema;
use serde_json::Value;

use crate::errors::{PlanError, ValidationIssue, ValidationReport};
use crate::model::{Strategy, StrategyPlan};

/// Plan that passed validation, with the warnings it still carries.
#[derive(Debug, Clone)]
pub struct ValidatedPlan {
    pub plan: StrategyPlan,
    pub warnings: Vec<ValidationIssue>,
}

/// Check a plan document against the plan JSON Schema.
///
/// Every violation becomes a `schema_violation` error at the offending
/// instance path. `Err` means the schema itself did not compile.
pub fn validate_plan_json(
    plan_json: &Value,
    plan_schema: &Value,
) -> Result<ValidationReport, PlanError> {
    let compiled =
        JSONSchema::compile(plan_schema).map_err(|err| PlanError::Schema(err.to_string()))?;

    let mut report = ValidationReport::default();
    if let Err(violations) = compiled.validate(plan_json) {
        for violation in violations {
            let pointer = violation.instance_path.to_string();
            let path = if pointer.is_empty() { "/".to_string() } else { pointer };
            report.push(ValidationIssue::error(
                "schema_violation",
                path,
                violation.to_string(),
            ));
        }
    }

    Ok(report)
}

/// Cross-check a parsed plan with the option schema.
///
/// Only `batch_size = 0` is an error. Missing categories are skipped and
/// unknown strategy names fall back to pairwise, so both are warnings.
pub fn validate_plan_against_schema(plan: &StrategyPlan, schema: &OptionSchema) -> ValidationReport {
    let mut report = ValidationReport::default();

    if plan.batch_size == 0 {
        report.push(
            ValidationIssue::error(
                "invalid_batch_size",
                "/batch_size",
                "batch_size must be greater than zero",
            )
            .with_hint("set batch_size to a positive integer (default 10)"),
        );
    }

    if plan.categories.is_empty() {
        report.push(ValidationIssue::warning(
            "categories_empty",
            "/categories",
            "plan assigns no categories; nothing will be generated",
        ));
    }

    let mut seen = HashSet::new();
    for (idx, entry) in plan.categories.iter().enumerate() {
        let category_path = format!("/categories/{idx}/category");

        if !seen.insert(entry.category.as_str()) {
            report.push(
                ValidationIssue::warning(
                    "duplicate_category",
                    category_path.clone(),
                    format!("category '{}' is assigned more than once", entry.category),
                )
                .with_hint("each assignment generates the category again"),
            );
        }

        if schema.category(&entry.category).is_none() {
            report.push(
                ValidationIssue::warning(
                    "category_not_found",
                    category_path,
                    format!("category '{}' not found in option schema", entry.category),
                )
                .with_hint("the category will be skipped"),
            );
        }

        if !Strategy::is_known_name(&entry.strategy) {
            report.push(
                ValidationIssue::warning(
                    "unknown_strategy",
                    format!("/categories/{idx}/strategy"),
                    format!(
                        "strategy '{}' is not recognized; using '{}'",
                        entry.strategy,
                        Strategy::Pairwise
                    ),
                )
                .with_hint("use exhaustive, boundary, critical_path or pairwise"),
            );
        }
    }

    report
}

/// Structural check, decode, then schema cross-check.
///
/// Stops at the first stage that reports errors.
pub fn validate_plan(
    plan_json: &Value,
    plan_schema: &Value,
    schema: &OptionSchema,
) -> Result<ValidatedPlan, ValidationReport> {
    let structural = validate_plan_json(plan_json, plan_schema).map_err(|err| {
        single_error("schema_validation_error", err.to_string())
    })?;
    if !structural.is_ok() {
        return Err(structural);
    }

    let plan: StrategyPlan = serde_json::from_value(plan_json.clone())
        .map_err(|err| single_error("invalid_plan_json", err.to_string()))?;

    let report = validate_plan_against_schema(&plan, schema);
    if !report.is_ok() {
        return Err(report);
    }

    Ok(ValidatedPlan {
        plan,
        warnings: report.warnings,
    })
}

fn single_error(code: &str, message: String) -> ValidationReport {
    let mut report = ValidationReport::default();
    report.push(ValidationIssue::error(code, "/", message));
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::IssueSeverity;
    use crate::model::CategoryStrategy;

    fn schema() -> OptionSchema {
        serde_json::from_str(
            r#"{ "test_categories": {
                "buffer_creation": {
                    "base_type": "BufferCreation",
                    "option_dimensions": { "size": { "values": [0, 256] } }
                }
            } }"#,
        )
        .expect("parse schema")
    }

    fn codes(issues: &[ValidationIssue]) -> Vec<&str> {
        issues.iter().map(|issue| issue.code.as_str()).collect()
    }

    #[test]
    fn missing_category_and_unknown_strategy_are_warnings() {
        let plan = StrategyPlan::new(vec![
            CategoryStrategy::new("buffer_creation", "random"),
            CategoryStrategy::new("shader_module", "boundary"),
        ]);

        let report = validate_plan_against_schema(&plan, &schema());
        assert!(report.is_ok());
        assert_eq!(codes(&report.warnings), vec!["unknown_strategy", "category_not_found"]);
        assert_eq!(report.warnings[1].path, "/categories/1/category");
    }

    #[test]
    fn duplicate_category_is_flagged() {
        let plan = StrategyPlan::new(vec![
            CategoryStrategy::new("buffer_creation", "boundary"),
            CategoryStrategy::new("buffer_creation", "exhaustive"),
        ]);

        let report = validate_plan_against_schema(&plan, &schema());
        assert_eq!(codes(&report.warnings), vec!["duplicate_category"]);
    }

    #[test]
    fn zero_batch_size_is_an_error() {
        let mut plan = StrategyPlan::new(vec![CategoryStrategy::new("buffer_creation", "boundary")]);
        plan.batch_size = 0;

        let report = validate_plan_against_schema(&plan, &schema());
        assert!(!report.is_ok());
        assert_eq!(codes(&report.errors), vec!["invalid_batch_size"]);
    }

    #[test]
    fn escalated_warnings_become_errors() {
        let plan = StrategyPlan::new(vec![CategoryStrategy::new("missing", "pairwise")]);
        let report = validate_plan_against_schema(&plan, &schema()).escalate_warnings();

        assert!(report.warnings.is_empty());
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].severity, IssueSeverity::Error);
    }
}
