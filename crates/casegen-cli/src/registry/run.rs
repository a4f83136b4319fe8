use std::fs::{OpenOptions, create_dir_all};
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, Utc};
use serde::Serialize;

use casegen_eval::SuiteMetrics;

use super::{RegistryError, RegistryResult};

/// Effective generation settings after CLI overrides.
#[derive(Debug, Clone, Serialize)]
pub struct RunOptions {
    pub plan_version: String,
    pub generation_strategy: String,
    pub batch_size: usize,
    pub timeout_ms: u64,
    pub date: Option<String>,
    pub categories: Vec<PlannedCategory>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlannedCategory {
    pub category: String,
    pub strategy: String,
}

/// Metadata captured at run start.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub schema_path: PathBuf,
    /// Plan file, or `None` for the builtin plan.
    pub plan_path: Option<PathBuf>,
    pub strict: bool,
    pub run_dir: PathBuf,
    pub out_dir: PathBuf,
    pub options: RunOptions,
}

/// JSON config written to each run directory.
#[derive(Debug, Serialize)]
pub struct RunConfig {
    pub run_id: String,
    pub started_at: String,
    pub schema_path: String,
    pub plan: String,
    pub strict: bool,
    pub out_dir: String,
    pub options: RunOptions,
    pub git: GitInfo,
}

/// Git metadata for reproducibility.
#[derive(Debug, Serialize)]
pub struct GitInfo {
    pub commit: Option<String>,
    pub dirty: Option<bool>,
}

/// Paths for run artifacts.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub root: PathBuf,
    pub logs_path: PathBuf,
    pub metrics_path: PathBuf,
}

pub fn start_run(ctx: &RunContext) -> RegistryResult<RunPaths> {
    let timestamp = ctx.started_at.format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let root = ctx.run_dir.join(format!("{timestamp}__run_{}", ctx.run_id));

    create_dir_all(&root)?;

    let config_path = root.join("config.json");
    let logs_path = root.join("logs.ndjson");
    let metrics_path = root.join("metrics.json");

    let config = RunConfig {
        run_id: ctx.run_id.clone(),
        started_at: ctx.started_at.to_rfc3339(),
        schema_path: ctx.schema_path.display().to_string(),
        plan: ctx
            .plan_path
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "builtin".to_string()),
        strict: ctx.strict,
        out_dir: ctx.out_dir.display().to_string(),
        options: ctx.options.clone(),
        git: collect_git_info(),
    };

    write_json(&config_path, &config)?;

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&logs_path)?;

    Ok(RunPaths {
        root,
        logs_path,
        metrics_path,
    })
}

pub fn write_metrics(paths: &RunPaths, metrics: &SuiteMetrics) -> RegistryResult<()> {
    write_json(&paths.metrics_path, metrics)
}

/// Commit and dirty flag of the working directory; both `None` outside a repo.
fn collect_git_info() -> GitInfo {
    let commit = git(&["rev-parse", "HEAD"])
        .map(|stdout| stdout.trim().to_string())
        .filter(|commit| !commit.is_empty());
    let dirty = commit
        .as_ref()
        .and_then(|_| git(&["status", "--porcelain"]))
        .map(|stdout| !stdout.trim().is_empty());

    GitInfo { commit, dirty }
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    output
        .status
        .success()
        .then(|| String::from_utf8_lossy(&output.stdout).into_owned())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> RegistryResult<()> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)?;
    serde_json::to_writer_pretty(file, value).map_err(RegistryError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("casegen_registry_{}", uuid::Uuid::new_v4()))
    }

    fn context(run_dir: PathBuf) -> RunContext {
        RunContext {
            run_id: "abc".to_string(),
            started_at: DateTime::parse_from_rfc3339("2025-01-02T03:04:05Z")
                .expect("parse timestamp")
                .with_timezone(&Utc),
            schema_path: PathBuf::from("fixtures/test_option_schema.json"),
            plan_path: None,
            strict: false,
            run_dir,
            out_dir: PathBuf::from("test_case_data"),
            options: RunOptions {
                plan_version: "2.0.0".to_string(),
                generation_strategy: "option_based".to_string(),
                batch_size: 10,
                timeout_ms: 1000,
                date: None,
                categories: vec![PlannedCategory {
                    category: "buffer_creation".to_string(),
                    strategy: "critical_path".to_string(),
                }],
            },
        }
    }

    #[test]
    fn start_run_lays_out_artifacts() {
        let run_dir = temp_dir();
        let paths = start_run(&context(run_dir.clone())).expect("start run");

        assert_eq!(paths.root, run_dir.join("2025-01-02T03-04-05Z__run_abc"));
        assert!(paths.logs_path.exists());
        assert!(!paths.metrics_path.exists());

        let config: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(paths.root.join("config.json")).expect("read config"),
        )
        .expect("parse config");
        assert_eq!(config["plan"], "builtin");
        assert_eq!(config["options"]["batch_size"], 10);
        assert_eq!(config["options"]["categories"][0]["strategy"], "critical_path");

        let _ = std::fs::remove_dir_all(run_dir);
    }
}
