//! Run directories: `<run_dir>/<timestamp>__run_<uuid>/` holding the effective
//! configuration, the NDJSON log and the suite metrics of one `generate` call.

mod logging;
mod run;

pub use logging::init_run_logging;
pub use run::{PlannedCategory, RunContext, RunOptions, start_run, write_metrics};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("run directory io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("run artifact encoding error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cannot install run logger: {0}")]
    Logging(String),
}

pub type RegistryResult<T> = std::result::Result<T, RegistryError>;
