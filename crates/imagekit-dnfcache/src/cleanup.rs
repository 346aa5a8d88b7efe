use crate::error::{CacheError, Result};
use crate::repo_id::is_repo_shaped;
use crate::util::{remove_path_nofollow, validate_under_root};
use std::collections::HashSet;
use std::fs::DirEntry;
use std::io;
use std::path::{Path, PathBuf};

/// Outcome of [`cleanup_old_cache_dirs`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Distribution directories that are no longer known.
    pub removed_distros: Vec<PathBuf>,
    /// Repository files and directories left over from the flat pre-distro layout.
    pub removed_legacy: Vec<PathBuf>,
    pub failed: Vec<CleanupFailure>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CleanupFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Remove cache directories of distributions that are not in `known_distros`,
/// plus any repository-shaped entries directly under `cache_root`.
///
/// A missing `cache_root` is not an error. Short-named files directly under the
/// root are left alone. Failures to remove individual entries are collected in
/// the report and do not stop the sweep.
pub fn cleanup_old_cache_dirs<I, S>(
    cache_root: impl AsRef<Path>,
    known_distros: I,
) -> Result<CleanupReport>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let cache_root = cache_root.as_ref();
    let known: HashSet<String> = known_distros
        .into_iter()
        .map(|name| name.as_ref().to_string())
        .collect();

    let mut report = CleanupReport::default();
    let entries = match std::fs::read_dir(cache_root) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(report),
        Err(err) => return Err(CacheError::from(err)),
    };

    let children = readable_children(cache_root, entries, &mut report);

    for entry in children {
        let path = entry.path();
        let name = entry.file_name();
        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            // Entries can race with deletion.
            Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
            Err(err) => {
                let message = "failed to read cache entry file type";
                record_failure(&mut report, path, &err, message);
                continue;
            }
        };

        let legacy = is_repo_shaped(&name);
        let retired_distro = file_type.is_dir()
            && !name.to_str().is_some_and(|name| known.contains(name));
        if !legacy && !retired_distro {
            continue;
        }

        match remove_child(cache_root, &path) {
            Ok(()) => {
                tracing::debug!(
                    target = "imagekit.dnfcache",
                    path = %path.display(),
                    legacy,
                    "removed stale cache entry"
                );
                if legacy {
                    report.removed_legacy.push(path);
                } else {
                    report.removed_distros.push(path);
                }
            }
            Err(err) => {
                record_failure(&mut report, path, &err, "failed to remove stale cache entry")
            }
        }
    }

    Ok(report)
}

/// Collect the directory entries of `cache_root` sorted by name. Entries that
/// cannot be read are recorded against the root.
fn readable_children(
    cache_root: &Path,
    entries: impl IntoIterator<Item = io::Result<DirEntry>>,
    report: &mut CleanupReport,
) -> Vec<DirEntry> {
    let mut children = Vec::new();
    for entry in entries {
        match entry {
            Ok(entry) => children.push(entry),
            Err(err) => record_failure(
                report,
                cache_root.to_path_buf(),
                &err,
                "failed to read cache root directory entry",
            ),
        }
    }
    children.sort_by_key(|entry| entry.file_name());
    children
}

fn record_failure(
    report: &mut CleanupReport,
    path: PathBuf,
    err: &dyn std::fmt::Display,
    message: &'static str,
) {
    tracing::warn!(
        target = "imagekit.dnfcache",
        path = %path.display(),
        error = %err,
        "{message}"
    );
    report.failed.push(CleanupFailure {
        path,
        error: err.to_string(),
    });
}

fn remove_child(cache_root: &Path, path: &Path) -> Result<()> {
    validate_under_root(cache_root, path)?;
    remove_path_nofollow(path)?;
    Ok(())
}
