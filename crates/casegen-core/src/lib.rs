//! Core contracts and helpers for casegen.
//!
//! This crate defines the option schema document, value comparison helpers,
//! and the validation shared by the planner, the generator, and the CLI.

pub mod error;
pub mod json_schema;
pub mod schema;
pub mod validation;
pub mod value;

pub use error::{Error, Result};
pub use json_schema::option_schema_json_schema;
pub use schema::{CategoryConfig, DimensionSpec, OptionDimensions, OptionSchema, load_schema};
pub use validation::validate_option_schema;

/// Dimension that toggles validation layers in the component under test.
pub const VALIDATION_DIMENSION: &str = "validation";
/// Dimension carrying an allocation size in bytes.
pub const SIZE_DIMENSION: &str = "size";
/// Dimension selecting the backend implementation.
pub const BACKEND_DIMENSION: &str = "backend_type";
