use crate::error::{CacheError, Result};
use crate::repo_id::RepoId;
use crate::scan::{recency_order, scan_cache, ElementKey, RepoElement};
use crate::util::{remove_path_nofollow, system_time_millis, validate_under_root};
use filetime::FileTime;
use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Size-bounded view of the repository metadata under one cache root.
///
/// Built from a fresh scan and meant to be dropped after one maintenance pass;
/// nothing is persisted between instances.
#[derive(Debug)]
pub struct RepoCache {
    root: PathBuf,
    max_size: u64,
    size: u64,
    elements: BTreeMap<ElementKey, RepoElement>,
    /// Front = oldest.
    recency: VecDeque<ElementKey>,
}

/// Summary of a [`RepoCache::shrink`] call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShrinkReport {
    pub before_bytes: u64,
    pub after_bytes: u64,
    /// Evicted repository elements, oldest first.
    pub evicted: Vec<ElementKey>,
}

impl ShrinkReport {
    pub fn freed_bytes(&self) -> u64 {
        self.before_bytes.saturating_sub(self.after_bytes)
    }
}

impl RepoCache {
    /// Scan `root` (a whole cache root or one distribution's subtree).
    pub fn new(root: impl AsRef<Path>, max_size: u64) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let scan = scan_cache(&root)?;
        Ok(Self {
            root,
            max_size,
            size: scan.size,
            elements: scan.elements,
            recency: scan.recency.into(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Number of repository elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Whether any distribution under the root holds `repo_id`.
    pub fn contains(&self, repo_id: &str) -> bool {
        self.elements
            .keys()
            .any(|key| key.repo_id.as_str() == repo_id)
    }

    pub fn element(&self, key: &ElementKey) -> Option<&RepoElement> {
        self.elements.get(key)
    }

    /// Element keys in key order.
    pub fn keys(&self) -> impl ExactSizeIterator<Item = &ElementKey> + '_ {
        self.elements.keys()
    }

    /// Repository ID of every element in key order. An ID cached by several
    /// distributions repeats.
    pub fn repo_ids(&self) -> impl ExactSizeIterator<Item = &RepoId> + '_ {
        self.elements.keys().map(|key| &key.repo_id)
    }

    /// Eviction order: oldest first.
    pub fn recency(&self) -> impl ExactSizeIterator<Item = &ElementKey> + '_ {
        self.recency.iter()
    }

    /// Evict whole repository elements, oldest first, until the cache is below `max_size`
    /// or no repository is left.
    ///
    /// Loose files and directory overhead are never evicted, so the size can stay
    /// above the budget once every repository is gone. On a deletion failure the
    /// evictions already done stay in effect and the error is returned; the failed
    /// repository keeps only the members that are still on disk.
    pub fn shrink(&mut self) -> Result<ShrinkReport> {
        let before_bytes = self.size;
        let mut evicted = Vec::new();

        while self.size >= self.max_size {
            let Some(key) = self.recency.front().cloned() else {
                break;
            };
            self.evict(&key)?;
            self.recency.pop_front();
            evicted.push(key);
        }

        if !evicted.is_empty() {
            tracing::debug!(
                target = "imagekit.dnfcache",
                root = %self.root.display(),
                evicted = evicted.len(),
                before_bytes,
                after_bytes = self.size,
                max_bytes = self.max_size,
                "shrank repository metadata cache"
            );
        }

        Ok(ShrinkReport {
            before_bytes,
            after_bytes: self.size,
            evicted,
        })
    }

    /// Delete one element's members, committing the bookkeeping per member.
    fn evict(&mut self, key: &ElementKey) -> Result<()> {
        let Some(element) = self.elements.get_mut(key) else {
            return Ok(());
        };

        while let Some(member) = element.members.first() {
            validate_under_root(&self.root, &member.path)?;
            if let Err(source) = remove_path_nofollow(&member.path) {
                tracing::warn!(
                    target = "imagekit.dnfcache",
                    repo_id = %key.repo_id,
                    distro = %key.distro.display(),
                    path = %member.path.display(),
                    error = %source,
                    "failed to evict cached repository"
                );
                return Err(CacheError::Evict {
                    element: key.clone(),
                    path: member.path.clone(),
                    source,
                });
            }
            let member = element.members.remove(0);
            element.size = element.size.saturating_sub(member.size);
            self.size = self.size.saturating_sub(member.size);
        }

        self.elements.remove(key);
        tracing::debug!(
            target = "imagekit.dnfcache",
            repo_id = %key.repo_id,
            distro = %key.distro.display(),
            "evicted cached repository"
        );
        Ok(())
    }

    /// Mark a repository as used at `time`, moving it back in the eviction queue.
    ///
    /// Sets the modification time of every member path so the next scan sees the
    /// same recency.
    pub fn touch_repo(&mut self, key: &ElementKey, time: SystemTime) -> Result<()> {
        let element = self
            .elements
            .get_mut(key)
            .ok_or_else(|| CacheError::UnknownRepo {
                element: key.clone(),
            })?;

        let stamp = FileTime::from_system_time(time);
        for member in &element.members {
            filetime::set_symlink_file_times(&member.path, stamp, stamp)?;
        }
        element.mtime_millis = system_time_millis(time).unwrap_or(0);

        self.recency = recency_order(&self.elements).into();
        Ok(())
    }
}
