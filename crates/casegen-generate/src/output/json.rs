use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::GenerationError;
use crate::output::atomic::write_json_atomic;
use crate::synth::TestCase;

/// File name of the run-wide case list.
pub const MASTER_FILE_NAME: &str = "all_generated_tests.json";

/// Up to `batch_size` consecutive cases of one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub metadata: BatchMetadata,
    pub test_cases: Vec<TestCase>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchMetadata {
    pub category: String,
    /// Zero-based batch index within the category.
    pub batch: usize,
    pub count: usize,
}

/// Every case of a run, in generation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterIndex {
    pub metadata: MasterMetadata,
    pub test_cases: Vec<TestCase>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterMetadata {
    pub version: String,
    pub date: String,
    pub total_tests: usize,
    pub generation_strategy: String,
}

impl MasterIndex {
    pub fn new(
        version: impl Into<String>,
        date: impl Into<String>,
        generation_strategy: impl Into<String>,
        test_cases: Vec<TestCase>,
    ) -> Self {
        Self {
            metadata: MasterMetadata {
                version: version.into(),
                date: date.into(),
                total_tests: test_cases.len(),
                generation_strategy: generation_strategy.into(),
            },
            test_cases,
        }
    }
}

/// Split a category's cases into consecutive batches.
pub fn batches(category: &str, cases: &[TestCase], batch_size: usize) -> Vec<Batch> {
    cases
        .chunks(batch_size.max(1))
        .enumerate()
        .map(|(batch, chunk)| Batch {
            metadata: BatchMetadata {
                category: category.to_string(),
                batch,
                count: chunk.len(),
            },
            test_cases: chunk.to_vec(),
        })
        .collect()
}

/// Path of batch `index` for `category` under `out_dir`.
pub fn batch_path(out_dir: &Path, category: &str, index: usize) -> PathBuf {
    out_dir
        .join(category)
        .join(format!("option_set_{index:03}.json"))
}

/// Write `<out_dir>/<category>/option_set_NNN.json` files; returns their paths.
pub fn write_category_batches(
    out_dir: &Path,
    category: &str,
    cases: &[TestCase],
    batch_size: usize,
) -> Result<Vec<PathBuf>, GenerationError> {
    let mut written = Vec::new();
    for batch in batches(category, cases, batch_size) {
        let path = batch_path(out_dir, category, batch.metadata.batch);
        write_json_atomic(&path, &batch)?;
        written.push(path);
    }
    Ok(written)
}

/// Write `<out_dir>/all_generated_tests.json`.
pub fn write_master_index(out_dir: &Path, index: &MasterIndex) -> Result<PathBuf, GenerationError> {
    let path = out_dir.join(MASTER_FILE_NAME);
    write_json_atomic(&path, index)?;
    Ok(path)
}

/// Read a master index written by a previous run.
pub fn load_master_index(path: &Path) -> Result<MasterIndex, GenerationError> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::combination::OptionCombination;
    use crate::synth::synthesize_case;

    fn cases(count: u64) -> Vec<TestCase> {
        (1..=count)
            .map(|id| {
                let combination: OptionCombination =
                    [("size", json!(id))].into_iter().collect();
                synthesize_case("BufferCreation", combination, id, "buffer_creation")
            })
            .collect()
    }

    #[test]
    fn twenty_three_cases_make_three_batches() {
        let all = cases(23);
        let split = batches("buffer_creation", &all, 10);

        let counts: Vec<usize> = split.iter().map(|batch| batch.metadata.count).collect();
        let indices: Vec<usize> = split.iter().map(|batch| batch.metadata.batch).collect();
        assert_eq!(counts, vec![10, 10, 3]);
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(split[2].test_cases[0].id, "0021");
    }

    #[test]
    fn no_cases_make_no_batches() {
        assert!(batches("buffer_creation", &[], 10).is_empty());
    }

    #[test]
    fn batch_paths_are_zero_padded() {
        let path = batch_path(Path::new("out"), "queue_creation", 2);
        assert_eq!(path, Path::new("out/queue_creation/option_set_002.json"));
    }

    #[test]
    fn master_index_counts_cases() {
        let index = MasterIndex::new("2.0.0", "2025-01-02", "option_based", cases(4));
        let encoded = serde_json::to_value(&index).expect("encode master");
        assert_eq!(
            encoded["metadata"],
            json!({
                "version": "2.0.0",
                "date": "2025-01-02",
                "total_tests": 4,
                "generation_strategy": "option_based"
            })
        );
        assert_eq!(encoded["test_cases"].as_array().map(Vec::len), Some(4));
    }
}
