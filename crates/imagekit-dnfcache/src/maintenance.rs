use crate::cleanup::{cleanup_old_cache_dirs, CleanupReport};
use crate::config::DnfCacheConfig;
use crate::error::Result;
use crate::repo_cache::{RepoCache, ShrinkReport};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MaintenanceReport {
    pub cleanup: CleanupReport,
    pub shrink: ShrinkReport,
}

/// One housekeeping pass over the configured cache root.
///
/// Retires unknown distributions and legacy flat-layout files first, then evicts
/// the oldest repositories across the remaining distributions until the root fits
/// `config.max_size`. Must not run while a depsolve is writing into the root.
pub fn run_maintenance<I, S>(
    config: &DnfCacheConfig,
    known_distros: I,
) -> Result<MaintenanceReport>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let cleanup = cleanup_old_cache_dirs(&config.root, known_distros)?;

    let shrink = if config.root.is_dir() {
        let mut cache = RepoCache::new(&config.root, config.max_size.0)?;
        cache.shrink()?
    } else {
        ShrinkReport::default()
    };

    tracing::info!(
        target = "imagekit.dnfcache",
        root = %config.root.display(),
        removed_distros = cleanup.removed_distros.len(),
        removed_legacy = cleanup.removed_legacy.len(),
        cleanup_failures = cleanup.failed.len(),
        evicted_repos = shrink.evicted.len(),
        size_bytes = shrink.after_bytes,
        "repository metadata cache maintenance finished"
    );

    Ok(MaintenanceReport { cleanup, shrink })
}
