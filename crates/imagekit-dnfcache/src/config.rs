use crate::error::{CacheError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default on-disk budget for repository metadata across all distributions.
pub const DEFAULT_MAX_CACHE_SIZE: u64 = 1024 * 1024 * 1024;

/// Default lifetime of a memoized depsolve result.
pub const DEFAULT_RESULT_TTL_SECS: u64 = 60;

/// Cache settings owned by the embedding build tool, loaded from TOML:
///
/// ```toml
/// root = "/var/cache/imagekit/rpmmd"
/// max_size = "2GiB"
/// result_ttl_secs = 120
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DnfCacheConfig {
    /// Cache root; holds one subdirectory per distribution.
    pub root: PathBuf,
    #[serde(default = "default_max_size")]
    pub max_size: ByteSize,
    #[serde(default = "default_result_ttl_secs")]
    pub result_ttl_secs: u64,
}

fn default_max_size() -> ByteSize {
    ByteSize(DEFAULT_MAX_CACHE_SIZE)
}

fn default_result_ttl_secs() -> u64 {
    DEFAULT_RESULT_TTL_SECS
}

impl DnfCacheConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_size: default_max_size(),
            result_ttl_secs: DEFAULT_RESULT_TTL_SECS,
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    pub fn result_ttl(&self) -> Duration {
        Duration::from_secs(self.result_ttl_secs)
    }

    /// Cache directory for one distribution.
    pub fn distro_dir(&self, distro: &str) -> PathBuf {
        self.root.join(distro)
    }
}

/// A byte size which supports both raw byte counts and human-friendly suffixes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct ByteSize(pub u64);

impl ByteSize {
    /// Parse `"512"`, `"100KB"`, `"1.5 GiB"` etc. Decimal (`KB`, `MB`, `GB`, `TB`)
    /// and binary (`KiB` … `TiB`) suffixes are case-insensitive.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let split = text
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(text.len());
        let (number, unit) = text.split_at(split);
        let invalid = || CacheError::Config {
            message: format!("invalid byte size {text:?}"),
        };

        let number: f64 = number.parse().map_err(|_| invalid())?;
        let multiplier: u64 = match unit.trim().to_ascii_lowercase().as_str() {
            "" | "b" => 1,
            "k" | "kb" => 1000,
            "m" | "mb" => 1000 * 1000,
            "g" | "gb" => 1000 * 1000 * 1000,
            "t" | "tb" => 1000 * 1000 * 1000 * 1000,
            "kib" => 1 << 10,
            "mib" => 1 << 20,
            "gib" => 1 << 30,
            "tib" => 1 << 40,
            _ => return Err(invalid()),
        };

        let bytes = number * multiplier as f64;
        if !bytes.is_finite() || bytes < 0.0 || bytes > u64::MAX as f64 {
            return Err(invalid());
        }
        Ok(Self(bytes as u64))
    }
}

impl Serialize for ByteSize {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> Deserialize<'de> for ByteSize {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Bytes(u64),
            Human(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Bytes(value) => Ok(ByteSize(value)),
            Repr::Human(value) => ByteSize::parse(&value).map_err(serde::de::Error::custom),
        }
    }
}
