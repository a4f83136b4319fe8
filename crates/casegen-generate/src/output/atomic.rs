use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::errors::GenerationError;

/// Pretty-print `value` to `path`, creating parent directories.
///
/// Readers of `path` see either the previous file or the complete new one.
/// Temp siblings are named `<file>.<uuid>.tmp`.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), GenerationError> {
    let file_name = path.file_name().ok_or_else(|| {
        GenerationError::InvalidPlan(format!("output path has no file name: {}", path.display()))
    })?;
    let parent = path.parent().filter(|dir| !dir.as_os_str().is_empty());
    if let Some(dir) = parent {
        fs::create_dir_all(dir)?;
    }

    let tmp_path = path.with_file_name(format!(
        "{}.{}.tmp",
        file_name.to_string_lossy(),
        uuid::Uuid::new_v4().simple()
    ));

    let mut data = serde_json::to_vec_pretty(value)?;
    data.push(b'\n');

    let written = File::create(&tmp_path)
        .and_then(|mut file| {
            file.write_all(&data)?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&tmp_path, path));
    if let Err(err) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(err.into());
    }

    // Directory handles cannot be opened for sync on windows.
    if cfg!(unix) {
        if let Some(dir) = parent {
            File::open(dir)?.sync_all()?;
        }
    }

    Ok(())
}
