use imagekit_rpmmd::PackageList;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct CachedResult {
    packages: PackageList,
    stored_at: Instant,
}

/// In-memory memoization of depsolve results with a fixed time-to-live.
///
/// Readers share the lock; `store` and `clean_cache` take it exclusively. Share
/// one instance across workers with an `Arc`.
#[derive(Debug)]
pub struct ResultCache {
    ttl: Duration,
    results: RwLock<HashMap<String, CachedResult>>,
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            results: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Insert or overwrite the result for `key`, stamped with the current time.
    pub fn store(&self, key: impl Into<String>, packages: PackageList) {
        let entry = CachedResult {
            packages,
            stored_at: Instant::now(),
        };
        self.results.write().insert(key.into(), entry);
    }

    /// Returns the stored result unless it is missing or older than the TTL.
    ///
    /// Expired entries are left in place for [`ResultCache::clean_cache`].
    pub fn get(&self, key: &str) -> Option<PackageList> {
        let results = self.results.read();
        let entry = results.get(key)?;
        if entry.stored_at.elapsed() > self.ttl {
            return None;
        }
        Some(entry.packages.clone())
    }

    /// Drop every entry older than the TTL. Returns how many were removed.
    pub fn clean_cache(&self) -> usize {
        let mut results = self.results.write();
        let before = results.len();
        results.retain(|_, entry| entry.stored_at.elapsed() <= self.ttl);
        let removed = before - results.len();
        if removed > 0 {
            tracing::debug!(
                target = "imagekit.dnfcache",
                removed,
                remaining = results.len(),
                "dropped expired depsolve results"
            );
        }
        removed
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.results.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.read().is_empty()
    }
}

/// Builds an opaque [`ResultCache`] key by hashing a sequence of request fields.
///
/// Each field is length-prefixed, so `["ab", "c"]` and `["a", "bc"]` differ.
pub struct RequestKey {
    hasher: Sha256,
}

impl RequestKey {
    pub fn new(namespace: &'static str) -> Self {
        let mut key = Self {
            hasher: Sha256::new(),
        };
        key.push_str(namespace);
        key
    }

    pub fn push_str(&mut self, value: &str) -> &mut Self {
        self.hasher.update((value.len() as u64).to_le_bytes());
        self.hasher.update(value.as_bytes());
        self
    }

    /// Hash an unordered set of strings (package names, repository IDs) canonically.
    pub fn push_set<I, S>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut values: Vec<String> = values
            .into_iter()
            .map(|value| value.as_ref().to_string())
            .collect();
        values.sort();
        values.dedup();
        self.hasher.update((values.len() as u64).to_le_bytes());
        for value in &values {
            self.push_str(value);
        }
        self
    }

    /// Hex-encoded sha256 of everything pushed so far.
    pub fn finish(&self) -> String {
        hex::encode(self.hasher.clone().finalize())
    }
}
