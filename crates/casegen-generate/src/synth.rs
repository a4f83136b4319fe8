use casegen_core::value::{is_numeric, is_str, is_true};
use casegen_core::{BACKEND_DIMENSION, SIZE_DIMENSION, VALIDATION_DIMENSION};
use serde::{Deserialize, Serialize};
use md5::{Digest, Md5};

use crate::combination::OptionCombination;

/// Timeout assigned to generated cases unless the plan overrides it.
pub const DEFAULT_TIMEOUT_MS: u64 = 1000;

const FINGERPRINT_LEN: usize = 8;

/// A single generated test case, as persisted in batch and master files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    /// Zero-padded sequence number, unique within a run.
    pub id: String,
    pub category: String,
    pub test_type: String,
    /// Content fingerprint of the option combination.
    pub option_set_id: String,
    pub input: CaseInput,
    pub expected_result: ExpectedResult,
    pub timeout_ms: u64,
    pub enabled: bool,
    pub metadata: CaseMetadata,
}

impl TestCase {
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn options(&self) -> &OptionCombination {
        match &self.input {
            CaseInput::OptionBased { options } => options,
        }
    }
}

/// Case input, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CaseInput {
    OptionBased { options: OptionCombination },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseMetadata {
    pub generated: bool,
    pub option_hash: String,
}

/// Outcome the component under test is expected to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExpectedResult {
    #[serde(rename = "Returns nullptr")]
    ReturnsNull,
    #[serde(rename = "Valid with validation")]
    ValidWithValidation,
    #[serde(rename = "Success with fallback")]
    SuccessWithFallback,
    #[serde(rename = "Success with options")]
    SuccessWithOptions,
}

impl ExpectedResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpectedResult::ReturnsNull => "Returns nullptr",
            ExpectedResult::ValidWithValidation => "Valid with validation",
            ExpectedResult::SuccessWithFallback => "Success with fallback",
            ExpectedResult::SuccessWithOptions => "Success with options",
        }
    }
}

/// Run-wide sequence of case ids. Never reset between categories.
#[derive(Debug, Clone)]
pub struct SequenceCounter {
    next: u64,
}

impl SequenceCounter {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Return the current id and move to the next one.
    pub fn advance(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u64 {
        self.next - 1
    }
}

impl Default for SequenceCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Short content hash of a combination, independent of entry order.
///
/// First 8 hex characters of the MD5 of [`OptionCombination::canonical_json`].
pub fn fingerprint(combination: &OptionCombination) -> String {
    let digest = Md5::digest(combination.canonical_json().as_bytes());
    let mut encoded = hex::encode(digest);
    encoded.truncate(FINGERPRINT_LEN);
    encoded
}

/// Derive the expected outcome. The first matching rule wins:
///
/// 1. `size` is 0
/// 2. `validation` is `true`
/// 3. `backend_type` is `"Fallback"`
/// 4. anything else
pub fn expected_result(combination: &OptionCombination) -> ExpectedResult {
    if combination
        .get(SIZE_DIMENSION)
        .is_some_and(|value| is_numeric(value, 0))
    {
        ExpectedResult::ReturnsNull
    } else if combination.get(VALIDATION_DIMENSION).is_some_and(is_true) {
        ExpectedResult::ValidWithValidation
    } else if combination
        .get(BACKEND_DIMENSION)
        .is_some_and(|value| is_str(value, "Fallback"))
    {
        ExpectedResult::SuccessWithFallback
    } else {
        ExpectedResult::SuccessWithOptions
    }
}

/// Build the test case for one combination.
pub fn synthesize_case(
    base_type: &str,
    combination: OptionCombination,
    sequence_id: u64,
    category: &str,
) -> TestCase {
    let option_hash = fingerprint(&combination);
    let expected_result = expected_result(&combination);

    TestCase {
        id: format!("{sequence_id:04}"),
        category: category.to_string(),
        test_type: base_type.to_string(),
        option_set_id: option_hash.clone(),
        input: CaseInput::OptionBased {
            options: combination,
        },
        expected_result,
        timeout_ms: DEFAULT_TIMEOUT_MS,
        enabled: true,
        metadata: CaseMetadata {
            generated: true,
            option_hash,
        },
    }
}
