use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Combination strategy applied to one category.
///
/// Plans carry strategy names as free strings. Names other than the four
/// below are accepted and resolve to [`Strategy::Pairwise`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Full Cartesian product.
    Exhaustive,
    /// First/last/middle plus one-dimension-at-a-time variation.
    Boundary,
    /// Defaults plus validation, critical sizes and backends.
    CriticalPath,
    /// Rotating selection; an approximation, not a covering array.
    Pairwise,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::Exhaustive,
        Strategy::Boundary,
        Strategy::CriticalPath,
        Strategy::Pairwise,
    ];

    /// Exact match on a strategy literal.
    pub fn parse(name: &str) -> Option<Strategy> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == name)
    }

    /// Resolve a plan strategy name, falling back to pairwise.
    pub fn from_name(name: &str) -> Strategy {
        Self::parse(name).unwrap_or(Strategy::Pairwise)
    }

    pub fn is_known_name(name: &str) -> bool {
        Self::parse(name).is_some()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Exhaustive => "exhaustive",
            Strategy::Boundary => "boundary",
            Strategy::CriticalPath => "critical_path",
            Strategy::Pairwise => "pairwise",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strategy assignment for a single category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CategoryStrategy {
    /// Category name as it appears under `test_categories`.
    pub category: String,
    /// Strategy literal. Unknown names fall back to pairwise.
    pub strategy: String,
}

impl CategoryStrategy {
    pub fn new(category: impl Into<String>, strategy: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            strategy: strategy.into(),
        }
    }

    pub fn resolved(&self) -> Strategy {
        Strategy::from_name(&self.strategy)
    }
}

/// Canonical plan definition for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StrategyPlan {
    /// Suite version recorded in the master index.
    #[serde(default = "default_version")]
    pub version: String,
    /// Suite date (`YYYY-MM-DD`). Defaults to the run date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Label recorded as `generation_strategy` in the master index.
    #[serde(default = "default_generation_strategy")]
    pub generation_strategy: String,
    /// Cases per batch file.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Timeout assigned to every generated case.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Categories in processing order.
    #[serde(default)]
    pub categories: Vec<CategoryStrategy>,
}

impl StrategyPlan {
    pub fn new(categories: Vec<CategoryStrategy>) -> Self {
        Self {
            version: default_version(),
            date: None,
            generation_strategy: default_generation_strategy(),
            batch_size: default_batch_size(),
            timeout_ms: default_timeout_ms(),
            categories,
        }
    }

    /// Assignment table used when no plan file is given.
    pub fn builtin() -> Self {
        Self::new(vec![
            CategoryStrategy::new("instance_creation", "critical_path"),
            CategoryStrategy::new("adapter_request", "boundary"),
            CategoryStrategy::new("device_creation", "critical_path"),
            CategoryStrategy::new("queue_creation", "boundary"),
            CategoryStrategy::new("command_encoder", "pairwise"),
            CategoryStrategy::new("buffer_creation", "critical_path"),
        ])
    }
}

impl Default for StrategyPlan {
    fn default() -> Self {
        Self::builtin()
    }
}

fn default_version() -> String {
    "2.0.0".to_string()
}

fn default_generation_strategy() -> String {
    "option_based".to_string()
}

fn default_batch_size() -> usize {
    10
}

fn default_timeout_ms() -> u64 {
    1000
}
