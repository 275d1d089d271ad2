//! Named cache buckets for the offline proxy.
//!
//! Each bucket is a map of request URL to cached response. File-backed
//! storage keeps one `<bucket>.json` file per bucket under the cache
//! directory and rewrites it whole on every change.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::storage::{write_atomic, StoreError};

use super::network::AssetResponse;

const MINUTES_PER_DAY: i64 = 24 * 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.cached_at).num_minutes()
    }

    /// Whole units only; a timestamp in the future reads as "just now".
    pub fn age_display(&self) -> String {
        match self.age_minutes() {
            m if m < 1 => "just now".to_string(),
            m if m < 60 => format!("{}m ago", m),
            m if m < MINUTES_PER_DAY => format!("{}h ago", m / 60),
            m => format!("{}d ago", m / MINUTES_PER_DAY),
        }
    }
}

type Bucket = BTreeMap<String, CachedData<AssetResponse>>;

/// All cache buckets known to the proxy.
pub struct CacheStorage {
    dir: Option<PathBuf>,
    buckets: BTreeMap<String, Bucket>,
}

impl CacheStorage {
    /// Storage that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self {
            dir: None,
            buckets: BTreeMap::new(),
        }
    }

    /// Open file-backed storage, loading every bucket already on disk.
    /// Bucket files that fail to parse are skipped.
    pub fn open(dir: PathBuf) -> Result<Self, StoreError> {
        let key = dir.display().to_string();
        std::fs::create_dir_all(&dir).map_err(|e| StoreError::io(&key, e))?;

        let mut buckets = BTreeMap::new();
        let entries = std::fs::read_dir(&dir).map_err(|e| StoreError::io(&key, e))?;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };
            let parsed = std::fs::read_to_string(&path)
                .ok()
                .and_then(|contents| serde_json::from_str::<Bucket>(&contents).ok());
            match parsed {
                Some(bucket) => {
                    debug!(bucket = %name, entries = bucket.len(), "Loaded cache bucket");
                    buckets.insert(name, bucket);
                }
                None => warn!(path = %path.display(), "Skipping unreadable cache bucket"),
            }
        }

        Ok(Self {
            dir: Some(dir),
            buckets,
        })
    }

    /// Names of all buckets, sorted.
    pub fn keys(&self) -> Vec<String> {
        self.buckets.keys().cloned().collect()
    }

    pub fn has(&self, name: &str) -> bool {
        self.buckets.contains_key(name)
    }

    /// Create the bucket if it does not exist yet.
    pub fn open_bucket(&mut self, name: &str) -> Result<(), StoreError> {
        if !self.buckets.contains_key(name) {
            self.buckets.insert(name.to_string(), Bucket::new());
            self.persist(name)?;
        }
        Ok(())
    }

    /// Delete a bucket and its file. Returns false if it did not exist.
    pub fn delete(&mut self, name: &str) -> Result<bool, StoreError> {
        if self.buckets.remove(name).is_none() {
            return Ok(false);
        }
        if let Some(path) = self.bucket_path(name) {
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(StoreError::io(name, e)),
            }
        }
        Ok(true)
    }

    pub fn put(&mut self, name: &str, url: &str, response: AssetResponse) -> Result<(), StoreError> {
        self.put_all(name, vec![(url.to_string(), response)])
    }

    /// Store several responses with a single write.
    pub fn put_all(
        &mut self,
        name: &str,
        entries: Vec<(String, AssetResponse)>,
    ) -> Result<(), StoreError> {
        let bucket = self.buckets.entry(name.to_string()).or_default();
        for (url, response) in entries {
            bucket.insert(url, CachedData::new(response));
        }
        self.persist(name)
    }

    /// Look `url` up in one bucket.
    pub fn match_in(&self, name: &str, url: &str) -> Option<&CachedData<AssetResponse>> {
        self.buckets.get(name).and_then(|bucket| bucket.get(url))
    }

    /// Look `url` up in `preferred` first, then in every other bucket.
    pub fn match_any(&self, preferred: &str, url: &str) -> Option<AssetResponse> {
        self.match_in(preferred, url)
            .or_else(|| {
                self.buckets
                    .iter()
                    .filter(|(name, _)| name.as_str() != preferred)
                    .find_map(|(_, bucket)| bucket.get(url))
            })
            .map(|cached| cached.data.clone())
    }

    pub fn entry_count(&self, name: &str) -> usize {
        self.buckets.get(name).map(|b| b.len()).unwrap_or(0)
    }

    /// Most recently stored entry in a bucket, for "last updated" display.
    pub fn newest_entry(&self, name: &str) -> Option<&CachedData<AssetResponse>> {
        self.buckets
            .get(name)
            .and_then(|bucket| bucket.values().max_by_key(|cached| cached.cached_at))
    }

    fn bucket_path(&self, name: &str) -> Option<PathBuf> {
        self.dir.as_ref().map(|dir| dir.join(format!("{}.json", name)))
    }

    fn persist(&self, name: &str) -> Result<(), StoreError> {
        let (Some(path), Some(bucket)) = (self.bucket_path(name), self.buckets.get(name)) else {
            return Ok(());
        };
        let contents = serde_json::to_string(bucket).map_err(|source| StoreError::Encode {
            key: name.to_string(),
            source,
        })?;
        write_atomic(&path, &contents).map_err(|e| StoreError::io(name, e))
    }
}

// ============================================================================
// Tests
// ============================================================================
