//! Strategy plans: which categories to generate, in which order, and with
//! which combination strategy.

pub mod errors;
pub mod load;
pub mod model;
pub mod schema;
pub mod validate;

pub use errors::{IssueSeverity, PlanError, Result, ValidationIssue, ValidationReport};
pub use load::{load_plan, load_plan_value};
pub use model::{CategoryStrategy, Strategy, StrategyPlan};
pub use schema::plan_json_schema;
pub use validate::{ValidatedPlan, validate_plan, validate_plan_against_schema, validate_plan_json};
