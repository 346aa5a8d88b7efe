//! Repository metadata caching for depsolving.
//!
//! The external depsolver downloads repository metadata (solv files, repodata
//! XML) into a per-distribution cache directory. This crate keeps that
//! directory bounded and memoizes depsolve results:
//! - [`RepoCache`]: scans a cache root and evicts whole repositories, oldest first,
//!   to fit a byte budget
//! - [`ResultCache`]: in-memory depsolve results with a fixed time-to-live
//! - [`cleanup_old_cache_dirs`]: retires caches of distributions that are no
//!   longer built, and the legacy flat layout
//!
//! ## On-disk layout
//!
//! ```text
//! <cache_root>/<distro>/<repo_id>.solv
//! <cache_root>/<distro>/<repo_id>-filenames.solvx
//! <cache_root>/<distro>/<repo_id>-<hash>/repodata/repomd.xml
//! <cache_root>/<distro>/<repo_id>-<hash>/repodata/<hash>-<kind>.xml.gz
//! ```
//!
//! A repository element is keyed by distribution and `repo_id`: the same
//! repository cached for two distributions is two independent elements.
//! `repo_id` is the 64-character content hash of the repository configuration
//! (see `imagekit_rpmmd::RepoConfig::hash`). Names shorter than that are "loose"
//! files: never grouped into a repository and never evicted.

mod cleanup;
mod config;
mod error;
mod maintenance;
mod repo_cache;
mod repo_id;
mod result_cache;
mod scan;
mod util;

pub use cleanup::{cleanup_old_cache_dirs, CleanupFailure, CleanupReport};
pub use config::{ByteSize, DnfCacheConfig, DEFAULT_MAX_CACHE_SIZE, DEFAULT_RESULT_TTL_SECS};
pub use error::{CacheError, Result};
pub use maintenance::{run_maintenance, MaintenanceReport};
pub use repo_cache::{RepoCache, ShrinkReport};
pub use repo_id::{RepoId, REPO_ID_LEN};
pub use result_cache::{RequestKey, ResultCache};
pub use scan::{scan_cache, CacheScan, ElementKey, RepoElement, RepoMember};
