use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing::debug;

use crate::error::{Error, Result};

/// Default filename of the transit dataset.
pub const DATASET_FILENAME: &str = "mobility.db";

/// Environment variable consulted when no explicit dataset path is given.
pub const DATA_DIR_ENV: &str = "MOBILITYGRAPH_DATA_DIR";

/// Resolve the default dataset location using platform-specific project directories.
pub fn default_dataset_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("org", "mobilitygraph", "mobilitygraph")
        .ok_or(Error::ProjectDirsUnavailable)?;
    Ok(dirs.data_dir().join(DATASET_FILENAME))
}

/// Locate the dataset file and check that it exists.
///
/// The resolution order is:
/// 1. Explicit `target` argument when provided.
/// 2. `MOBILITYGRAPH_DATA_DIR` environment variable.
/// 3. Platform-specific project data directory.
///
/// A directory (or extension-less path) resolves to `<dir>/mobility.db`.
pub fn resolve_dataset_path(target: Option<&Path>) -> Result<PathBuf> {
    resolve_with_env(target, env::var_os(DATA_DIR_ENV))
}

fn resolve_with_env(target: Option<&Path>, env_value: Option<OsString>) -> Result<PathBuf> {
    let resolved = match (target, env_value) {
        (Some(explicit), _) => canonical_dataset_path(explicit),
        (None, Some(env_path)) if !env_path.is_empty() => {
            canonical_dataset_path(Path::new(&env_path))
        }
        _ => default_dataset_path()?,
    };

    debug!(path = %resolved.display(), "resolved dataset path");
    if !resolved.is_file() {
        return Err(Error::DatasetNotFound { path: resolved });
    }
    Ok(resolved)
}

fn canonical_dataset_path(path: &Path) -> PathBuf {
    if path.is_dir() || path.extension().is_none() {
        return path.join(DATASET_FILENAME);
    }

    path.to_path_buf()
}
