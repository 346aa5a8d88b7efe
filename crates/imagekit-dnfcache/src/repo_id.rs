use crate::error::CacheError;
use std::borrow::Borrow;
use std::ffi::OsStr;
use std::fmt;

/// Length of the content hash that prefixes every repository cache path.
pub const REPO_ID_LEN: usize = 64;

/// Content-derived identifier of a cached repository.
///
/// IDs recovered from the filesystem are whatever the first [`REPO_ID_LEN`]
/// characters of a qualifying name are; only [`RepoId::parse`] insists on hex.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RepoId(String);

impl RepoId {
    /// Strictly parse a caller-provided ID: exactly 64 lowercase hex characters.
    pub fn parse(value: &str) -> Result<Self, CacheError> {
        let valid = value.len() == REPO_ID_LEN
            && value
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if !valid {
            return Err(CacheError::InvalidRepoId {
                value: value.to_string(),
            });
        }
        Ok(Self(value.to_string()))
    }

    /// Extract the repository ID carried by a cache path's final component.
    ///
    /// Returns `None` for loose names: shorter than [`REPO_ID_LEN`], not UTF-8,
    /// or not splittable at the ID boundary.
    pub fn from_file_name(name: &OsStr) -> Option<Self> {
        let name = name.to_str()?;
        if name.len() < REPO_ID_LEN {
            return None;
        }
        name.get(..REPO_ID_LEN).map(|id| Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RepoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for RepoId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Whether a direct child name follows the repository element naming convention.
pub(crate) fn is_repo_shaped(name: &OsStr) -> bool {
    RepoId::from_file_name(name).is_some()
}
