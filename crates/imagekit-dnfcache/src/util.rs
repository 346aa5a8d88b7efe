use crate::error::CacheError;
use std::fs::Metadata;
use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

pub(crate) fn system_time_millis(time: SystemTime) -> Option<u64> {
    time.duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| d.as_millis() as u64)
}

/// Modification time of an already-stat'ed path, in unix millis.
///
/// Timestamps that are unavailable or predate the epoch sort as oldest.
pub(crate) fn modified_millis(path: &Path, meta: &Metadata) -> u64 {
    let modified = match meta.modified() {
        Ok(modified) => modified,
        Err(err) => {
            tracing::debug!(
                target = "imagekit.dnfcache",
                path = %path.display(),
                error = %err,
                "failed to read file modified time"
            );
            return 0;
        }
    };

    match system_time_millis(modified) {
        Some(millis) => millis,
        None => {
            tracing::debug!(
                target = "imagekit.dnfcache",
                path = %path.display(),
                "file modified time predates unix epoch"
            );
            0
        }
    }
}

pub(crate) fn validate_under_root(cache_root: &Path, path: &Path) -> Result<(), CacheError> {
    // Lexical check only; do not follow symlinks.
    if path.strip_prefix(cache_root).is_err() {
        return Err(CacheError::PathNotUnderCacheRoot {
            path: path.to_path_buf(),
            cache_root: cache_root.to_path_buf(),
        });
    }
    Ok(())
}

/// Remove a file, symlink or directory tree without following symlinks.
///
/// A path that is already gone counts as removed.
pub(crate) fn remove_path_nofollow(path: &Path) -> io::Result<()> {
    let meta = match std::fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err),
    };
    if !meta.is_dir() {
        return remove_file_or_link(path);
    }

    for entry in walkdir::WalkDir::new(path)
        .follow_links(false)
        .contents_first(true)
    {
        let entry = entry.map_err(io::Error::other)?;
        if entry.file_type().is_dir() {
            std::fs::remove_dir(entry.path())?;
        } else {
            remove_file_or_link(entry.path())?;
        }
    }
    Ok(())
}

fn remove_file_or_link(path: &Path) -> io::Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::IsADirectory => std::fs::remove_dir(path),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}
