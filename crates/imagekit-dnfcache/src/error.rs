use crate::scan::ElementKey;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, CacheError>;

/// Errors produced by repository metadata cache maintenance.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to scan cache at {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to evict repository {element} (removing {path}): {source}")]
    Evict {
        element: ElementKey,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("repository {element} is not present in the cache")]
    UnknownRepo { element: ElementKey },

    #[error("path {path} is not under cache root {cache_root}")]
    PathNotUnderCacheRoot { path: PathBuf, cache_root: PathBuf },

    #[error("invalid repository id {value:?}: expected 64 lowercase hex characters")]
    InvalidRepoId { value: String },

    #[error("invalid cache config: {message}")]
    Config { message: String },
}

impl From<toml::de::Error> for CacheError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config {
            message: err.message().to_string(),
        }
    }
}

impl CacheError {
    pub(crate) fn scan(root: &std::path::Path, err: walkdir::Error) -> Self {
        let path = err
            .path()
            .map(|path| path.to_path_buf())
            .unwrap_or_else(|| root.to_path_buf());
        Self::Scan { path, source: err }
    }
}
