use crate::error::{CacheError, Result};
use crate::repo_id::RepoId;
use crate::util::modified_millis;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Identifies a repository element: a repository ID within one distribution.
///
/// `distro` is the first path component below the scan root, or empty for
/// members that sit directly in the root (a scan of a single distribution's
/// directory). Keys order by repository ID first.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementKey {
    pub repo_id: RepoId,
    pub distro: PathBuf,
}

impl ElementKey {
    pub fn new(distro: impl Into<PathBuf>, repo_id: RepoId) -> Self {
        Self {
            repo_id,
            distro: distro.into(),
        }
    }
}

impl fmt::Display for ElementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.distro.as_os_str().is_empty() {
            write!(f, "{}", self.repo_id)
        } else {
            write!(f, "{}/{}", self.distro.display(), self.repo_id)
        }
    }
}

/// A top-level path of a repository element: a solv file or a metadata directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepoMember {
    pub path: PathBuf,
    /// Bytes attributed to this path; for directories the whole tree beneath it.
    pub size: u64,
}

/// All cache paths belonging to one repository ID within one distribution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepoElement {
    pub members: Vec<RepoMember>,
    /// Sum of the member sizes.
    pub size: u64,
    /// Newest modification time across the member paths (unix millis).
    pub mtime_millis: u64,
}

impl RepoElement {
    pub fn paths(&self) -> impl Iterator<Item = &Path> + '_ {
        self.members.iter().map(|member| member.path.as_path())
    }
}

/// Result of walking a cache root.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheScan {
    /// Repository element bytes plus the size of every non-element directory
    /// below the root. Loose files are not counted.
    pub size: u64,
    pub elements: BTreeMap<ElementKey, RepoElement>,
    /// Eviction queue: oldest first, ties broken by key.
    pub recency: Vec<ElementKey>,
    /// Number of short-named files seen outside any repository element.
    pub loose_files: usize,
}

/// Walk `root` and classify every path below it.
///
/// Any error while walking or stat-ing is fatal: a cache with unreliable size
/// accounting is never returned.
pub fn scan_cache(root: impl AsRef<Path>) -> Result<CacheScan> {
    let root = root.as_ref();
    let mut scan = CacheScan::default();

    let mut walker = WalkDir::new(root)
        .follow_links(false)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = entry.map_err(|err| CacheError::scan(root, err))?;
        let file_type = entry.file_type();

        let Some(repo_id) = RepoId::from_file_name(entry.file_name()) else {
            if file_type.is_dir() {
                let meta = entry.metadata().map_err(|err| CacheError::scan(root, err))?;
                scan.size = scan.size.saturating_add(meta.len());
            } else {
                scan.loose_files += 1;
            }
            continue;
        };

        let meta = entry.metadata().map_err(|err| CacheError::scan(root, err))?;
        let member_size = if file_type.is_dir() {
            walker.skip_current_dir();
            subtree_size(root, entry.path())?
        } else {
            meta.len()
        };
        let mtime_millis = modified_millis(entry.path(), &meta);

        let key = ElementKey::new(distro_scope(root, entry.path(), entry.depth()), repo_id);
        let element = scan
            .elements
            .entry(key)
            .or_insert_with(|| RepoElement {
                members: Vec::new(),
                size: 0,
                mtime_millis: 0,
            });
        element.members.push(RepoMember {
            path: entry.into_path(),
            size: member_size,
        });
        element.size = element.size.saturating_add(member_size);
        element.mtime_millis = element.mtime_millis.max(mtime_millis);
        scan.size = scan.size.saturating_add(member_size);
    }

    scan.recency = recency_order(&scan.elements);

    tracing::debug!(
        target = "imagekit.dnfcache",
        root = %root.display(),
        size_bytes = scan.size,
        repos = scan.elements.len(),
        loose_files = scan.loose_files,
        "scanned repository metadata cache"
    );

    Ok(scan)
}

pub(crate) fn recency_order(elements: &BTreeMap<ElementKey, RepoElement>) -> Vec<ElementKey> {
    let mut keys: Vec<&ElementKey> = elements.keys().collect();
    // `BTreeMap` keys are already ordered, so the stable sort keeps ties in key order.
    keys.sort_by_key(|key| elements[*key].mtime_millis);
    keys.into_iter().cloned().collect()
}

/// Distribution a member at `depth` below `root` belongs to.
fn distro_scope(root: &Path, path: &Path, depth: usize) -> PathBuf {
    if depth < 2 {
        return PathBuf::new();
    }
    path.strip_prefix(root)
        .ok()
        .and_then(|relative| relative.components().next())
        .map(|component| PathBuf::from(component.as_os_str()))
        .unwrap_or_default()
}

/// Size of a metadata directory: the directory itself plus everything beneath it.
fn subtree_size(root: &Path, dir: &Path) -> Result<u64> {
    let mut total = 0_u64;
    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry.map_err(|err| CacheError::scan(root, err))?;
        let meta = entry.metadata().map_err(|err| CacheError::scan(root, err))?;
        total = total.saturating_add(meta.len());
    }
    Ok(total)
}
