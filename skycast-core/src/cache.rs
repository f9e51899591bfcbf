//! Two-layer response cache: a concurrent in-memory map in front of a
//! directory of JSON files.
//!
//! Expired entries are evicted when read and swept from disk when a cache is
//! opened. Writes always overwrite. The memory layer keeps at most
//! [`MEMORY_CAPACITY`] entries, dropping the oldest. The disk layer is
//! bounded too: once it grows past the quota the oldest files (by
//! modification time) are removed until usage is back under 80 % of it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

pub const DEFAULT_WEATHER_TTL: Duration = Duration::from_secs(15 * 60);
pub const DEFAULT_SEARCH_TTL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_MAX_DISK_BYTES: u64 = 100 * 1024 * 1024;
pub const MEMORY_CAPACITY: usize = 50;
const TRIM_TARGET_PERCENT: u64 = 80;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    value: serde_json::Value,
    stored_at: DateTime<Utc>,
    ttl_secs: u64,
}

impl CacheEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(self.stored_at).num_seconds();
        age < 0 || age as u64 > self.ttl_secs
    }
}

#[derive(Debug)]
pub struct ResponseCache {
    memory: DashMap<String, CacheEntry>,
    dir: Option<PathBuf>,
    max_disk_bytes: u64,
}

impl ResponseCache {
    /// Cache backed by `dir`, created if missing.
    pub fn new(dir: impl Into<PathBuf>, max_disk_bytes: u64) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            memory: DashMap::new(),
            dir: Some(dir),
            max_disk_bytes,
        })
    }

    /// Like [`ResponseCache::new`], then sweeps entries that expired while
    /// nothing was running.
    pub fn open(dir: impl Into<PathBuf>, max_disk_bytes: u64) -> io::Result<Self> {
        let cache = Self::new(dir, max_disk_bytes)?;
        match cache.purge_expired(Utc::now()) {
            Ok(0) => {}
            Ok(removed) => tracing::debug!(removed, "swept expired cache files"),
            Err(err) => tracing::warn!(error = %err, "failed to sweep expired cache files"),
        }
        Ok(cache)
    }

    /// Disk cache in [`ResponseCache::default_dir`], or memory only when that
    /// directory is missing or unusable.
    pub fn open_default(max_disk_bytes: u64) -> Self {
        let Some(dir) = Self::default_dir() else {
            return Self::in_memory();
        };
        Self::open(&dir, max_disk_bytes).unwrap_or_else(|err| {
            tracing::warn!(
                dir = %dir.display(),
                error = %err,
                "disk cache unavailable, using memory only"
            );
            Self::in_memory()
        })
    }

    /// Cache that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self {
            memory: DashMap::new(),
            dir: None,
            max_disk_bytes: DEFAULT_MAX_DISK_BYTES,
        }
    }

    /// Platform cache directory, e.g. `~/.cache/skycast` on Linux.
    pub fn default_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "skycast", "skycast").map(|dirs| dirs.cache_dir().to_path_buf())
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_at(key, Utc::now())
    }

    pub fn get_at<T: DeserializeOwned>(&self, key: &str, now: DateTime<Utc>) -> Option<T> {
        let cached = self.memory.get(key).map(|e| e.value().clone());
        let entry = match cached {
            Some(entry) => entry,
            None => {
                let entry = self.read_disk(key)?;
                self.remember(key, entry.clone());
                entry
            }
        };

        if entry.is_expired(now) {
            tracing::debug!(key, "cache entry expired");
            self.remove(key);
            return None;
        }

        match serde_json::from_value(entry.value) {
            Ok(value) => {
                tracing::debug!(key, "cache hit");
                Some(value)
            }
            Err(err) => {
                tracing::debug!(key, error = %err, "cached value has a different shape, dropping");
                self.remove(key);
                None
            }
        }
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> io::Result<()> {
        self.set_at(key, value, ttl, Utc::now())
    }

    pub fn set_at<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> io::Result<()> {
        let entry = CacheEntry {
            value: serde_json::to_value(value)?,
            stored_at: now,
            ttl_secs: ttl.as_secs(),
        };

        if let Some(path) = self.path_for(key) {
            fs::write(&path, serde_json::to_vec(&entry)?)?;
        }
        self.remember(key, entry);

        if self.dir.is_some() {
            self.trim_disk()?;
        }
        Ok(())
    }

    pub fn remove(&self, key: &str) {
        self.memory.remove(key);
        if let Some(path) = self.path_for(key) {
            if let Err(err) = fs::remove_file(&path) {
                if err.kind() != io::ErrorKind::NotFound {
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to remove cache file"
                    );
                }
            }
        }
    }

    pub fn clear(&self) -> io::Result<()> {
        self.memory.clear();
        for (path, _, _) in self.disk_files()? {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Drop every expired entry from both layers. Returns how many disk files
    /// were removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> io::Result<usize> {
        self.memory.retain(|_, entry| !entry.is_expired(now));

        let mut removed = 0;
        for (path, _, _) in self.disk_files()? {
            let keep = fs::read(&path)
                .ok()
                .and_then(|bytes| serde_json::from_slice::<CacheEntry>(&bytes).ok())
                .is_some_and(|entry| !entry.is_expired(now));
            if !keep {
                fs::remove_file(&path)?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Bytes used by the disk layer.
    pub fn disk_usage(&self) -> io::Result<u64> {
        Ok(self.disk_files()?.iter().map(|(_, len, _)| len).sum())
    }

    fn remember(&self, key: &str, entry: CacheEntry) {
        if !self.memory.contains_key(key) && self.memory.len() >= MEMORY_CAPACITY {
            let oldest = self
                .memory
                .iter()
                .min_by_key(|e| e.value().stored_at)
                .map(|e| e.key().clone());
            if let Some(oldest) = oldest {
                self.memory.remove(&oldest);
            }
        }
        self.memory.insert(key.to_string(), entry);
    }

    fn trim_disk(&self) -> io::Result<()> {
        let mut files = self.disk_files()?;
        let mut total: u64 = files.iter().map(|(_, len, _)| len).sum();
        if total <= self.max_disk_bytes {
            return Ok(());
        }

        let target = self.max_disk_bytes / 100 * TRIM_TARGET_PERCENT;
        files.sort_by_key(|(_, _, modified)| *modified);

        let mut removed = 0;
        for (path, len, _) in files {
            if total <= target {
                break;
            }
            fs::remove_file(&path)?;
            if let Some(key) = path.file_stem().and_then(|s| s.to_str()).map(decode_key) {
                self.memory.remove(&key);
            }
            total = total.saturating_sub(len);
            removed += 1;
        }
        tracing::debug!(removed, remaining_bytes = total, "trimmed disk cache");
        Ok(())
    }

    fn disk_files(&self) -> io::Result<Vec<(PathBuf, u64, SystemTime)>> {
        let Some(dir) = &self.dir else {
            return Ok(Vec::new());
        };
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let meta = entry.metadata()?;
            if meta.is_file() {
                let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
                files.push((entry.path(), meta.len(), modified));
            }
        }
        Ok(files)
    }

    fn read_disk(&self, key: &str) -> Option<CacheEntry> {
        let path = self.path_for(key)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(_) => {
                tracing::debug!(key, "cache miss");
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::debug!(key, error = %err, "unreadable cache file, removing");
                let _ = fs::remove_file(&path);
                None
            }
        }
    }

    fn path_for(&self, key: &str) -> Option<PathBuf> {
        self.dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.json", encode_key(key))))
    }
}

/// Percent-encode everything outside `[A-Za-z0-9._-]` so any key is a safe
/// file name.
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'.' | b'_' | b'-' => out.push(byte as char),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

fn decode_key(name: &str) -> String {
    let bytes = name.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(byte) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Cache key builders shared by the service and its tests.
pub mod keys {
    use crate::model::Coordinates;

    pub fn weather(coords: &Coordinates) -> String {
        format!("weather_{}_{}", coords.lat, coords.lon)
    }

    pub fn forecast(coords: &Coordinates) -> String {
        format!("forecast_{}_{}", coords.lat, coords.lon)
    }

    pub fn search(query: &str) -> String {
        format!("search_{}", query.trim().to_lowercase())
    }
}
