//! Combination generation and case synthesis for casegen.
//!
//! This crate expands the option dimensions of each category into
//! combinations using the strategy assigned by the plan, turns every
//! combination into a test case, and writes batch files plus a master index.

pub mod canonical;
pub mod combination;
pub mod engine;
pub mod errors;
pub mod model;
pub mod output;
pub mod strategies;
pub mod synth;

pub use combination::OptionCombination;
pub use engine::{GenerationEngine, GenerationResult, generate_suite};
pub use errors::GenerationError;
pub use model::{CategoryReport, CategorySuite, GenerateOptions, GenerationReport};
pub use output::json::{Batch, MasterIndex, MasterMetadata, load_master_index};
pub use strategies::{CRITICAL_SIZES, generate_combinations, pairwise_count};
pub use synth::{
    CaseInput, CaseMetadata, ExpectedResult, SequenceCounter, TestCase, expected_result,
    fingerprint, synthesize_case,
};
