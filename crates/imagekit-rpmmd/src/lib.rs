//! RPM metadata value types shared between the depsolver front-end and the
//! metadata cache.
//!
//! [`RepoConfig::hash`] produces the 64-character repository ID that prefixes
//! every cache path written for a repository.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A single resolved RPM package.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub epoch: u32,
    pub version: String,
    pub release: String,
    pub arch: String,
    #[serde(default)]
    pub license: String,
}

impl Package {
    /// `name-[epoch:]version-release.arch`, omitting a zero epoch.
    pub fn nevra(&self) -> String {
        if self.epoch == 0 {
            format!(
                "{}-{}-{}.{}",
                self.name, self.version, self.release, self.arch
            )
        } else {
            format!(
                "{}-{}:{}-{}.{}",
                self.name, self.epoch, self.version, self.release, self.arch
            )
        }
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.nevra())
    }
}

/// The result of a depsolve request.
pub type PackageList = Vec<Package>;

/// Configuration of a single remote repository.
///
/// Only the fields that change what gets downloaded take part in [`RepoConfig::hash`];
/// `id` and `name` are display labels.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoConfig {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub base_urls: Vec<String>,
    #[serde(default)]
    pub metalink: Option<String>,
    #[serde(default)]
    pub mirrorlist: Option<String>,
    #[serde(default)]
    pub gpg_keys: Vec<String>,
    #[serde(default)]
    pub check_gpg: Option<bool>,
    #[serde(default)]
    pub check_repo_gpg: Option<bool>,
    #[serde(default)]
    pub ignore_ssl: Option<bool>,
    #[serde(default)]
    pub module_hotfixes: Option<bool>,
}

impl RepoConfig {
    /// Content hash identifying this repository's cached metadata.
    ///
    /// Always 64 lowercase hex characters.
    pub fn hash(&self) -> String {
        let mut hasher = Sha256::new();
        push_list(&mut hasher, &self.base_urls);
        push_opt_str(&mut hasher, self.metalink.as_deref());
        push_opt_str(&mut hasher, self.mirrorlist.as_deref());
        push_list(&mut hasher, &self.gpg_keys);
        for flag in [
            self.check_gpg,
            self.check_repo_gpg,
            self.ignore_ssl,
            self.module_hotfixes,
        ] {
            hasher.update([match flag {
                None => 0u8,
                Some(false) => 1,
                Some(true) => 2,
            }]);
        }
        hex::encode(hasher.finalize())
    }
}

fn push_str(hasher: &mut Sha256, value: &str) {
    hasher.update((value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}

fn push_opt_str(hasher: &mut Sha256, value: Option<&str>) {
    match value {
        Some(value) => {
            hasher.update([1u8]);
            push_str(hasher, value);
        }
        None => hasher.update([0u8]),
    }
}

fn push_list(hasher: &mut Sha256, values: &[String]) {
    hasher.update((values.len() as u64).to_le_bytes());
    for value in values {
        push_str(hasher, value);
    }
}
