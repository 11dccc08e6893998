// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Read-through TTL cache placed in front of every upstream call (repos, calendars, comparisons, events, commits)
// role: cache/read-through
// inputs: string keys, per-family TTLs, a compute closure returning Result
// outputs: cached or freshly computed values; hit/miss counters
// side_effects: FileCache writes one JSON file per key under its directory
// invariants:
// - A hit only ever returns a value produced by a successful compute
// - A failed compute is returned to the caller and never stored
// - Expired and undecodable entries behave as misses
// - Writes prune every expired entry, so dead keys do not accumulate
// - Stores are injected (Arc<dyn CacheStore>), never process-global
// errors: Store IO/lock failures degrade to cache misses; logged at debug/warn
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Source of "now" for expiry decisions.
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> {
    Utc::now()
  }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
  now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
  pub fn new(start: DateTime<Utc>) -> Self {
    Self { now: Mutex::new(start) }
  }

  pub fn advance(&self, by: Duration) {
    if let Ok(mut now) = self.now.lock() {
      *now += to_chrono(by);
    }
  }
}

impl Clock for ManualClock {
  fn now(&self) -> DateTime<Utc> {
    self.now.lock().map(|n| *n).unwrap_or_else(|_| Utc::now())
  }
}

fn to_chrono(d: Duration) -> chrono::Duration {
  chrono::Duration::from_std(d).unwrap_or_else(|_| chrono::Duration::days(365 * 100))
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
  pub hits: u64,
  pub misses: u64,
}

#[derive(Debug, Default)]
struct Counters {
  hits: AtomicU64,
  misses: AtomicU64,
}

impl Counters {
  fn record(&self, hit: bool) {
    if hit {
      self.hits.fetch_add(1, Ordering::Relaxed);
    } else {
      self.misses.fetch_add(1, Ordering::Relaxed);
    }
  }

  /// Turn an already-counted hit into a miss.
  fn demote_hit(&self) {
    if self.hits.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |h| h.checked_sub(1)).is_ok() {
      self.misses.fetch_add(1, Ordering::Relaxed);
    }
  }

  fn snapshot(&self) -> CacheStats {
    CacheStats {
      hits: self.hits.load(Ordering::Relaxed),
      misses: self.misses.load(Ordering::Relaxed),
    }
  }
}

/// Key/value storage with per-entry expiry. Values are kept as JSON.
pub trait CacheStore: Send + Sync {
  /// The live value for `key`, or `None` when absent or expired.
  fn get(&self, key: &str) -> Option<serde_json::Value>;

  fn put(&self, key: &str, value: serde_json::Value, ttl: Duration);

  /// The value last returned for `key` was unusable: drop it and count that lookup as a miss.
  fn discard(&self, _key: &str) {}

  fn stats(&self) -> CacheStats {
    CacheStats::default()
  }
}

/// Read-through access on top of any [`CacheStore`].
pub trait CacheExt {
  /// Return the cached value for `key`, or run `compute` and store its `Ok` result for `ttl`.
  ///
  /// An `Err` from `compute` is handed back untouched and nothing is written,
  /// so the next call goes upstream again.
  fn get_or_compute<T, E, F>(&self, key: &str, ttl: Duration, compute: F) -> Result<T, E>
  where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Result<T, E>;
}

impl<C: CacheStore + ?Sized> CacheExt for C {
  fn get_or_compute<T, E, F>(&self, key: &str, ttl: Duration, compute: F) -> Result<T, E>
  where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Result<T, E>,
  {
    if let Some(stored) = self.get(key) {
      match serde_json::from_value::<T>(stored) {
        Ok(v) => {
          debug!(key, "cache hit");
          return Ok(v);
        }
        Err(e) => {
          debug!(key, error = %e, "cached value no longer decodes; recomputing");
          self.discard(key);
        }
      }
    }

    let value = compute()?;

    match serde_json::to_value(&value) {
      Ok(json) => self.put(key, json, ttl),
      Err(e) => warn!(key, error = %e, "value not serializable; returning uncached"),
    }

    Ok(value)
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
  value: serde_json::Value,
  expires_at: DateTime<Utc>,
}

/// In-process store guarded by a mutex.
pub struct MemoryCache {
  entries: Mutex<HashMap<String, Entry>>,
  clock: Arc<dyn Clock>,
  counters: Counters,
}

impl MemoryCache {
  pub fn new() -> Self {
    Self::with_clock(Arc::new(SystemClock))
  }

  pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
    Self {
      entries: Mutex::new(HashMap::new()),
      clock,
      counters: Counters::default(),
    }
  }

  pub fn len(&self) -> usize {
    self.entries.lock().map(|m| m.len()).unwrap_or(0)
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl Default for MemoryCache {
  fn default() -> Self {
    Self::new()
  }
}

impl CacheStore for MemoryCache {
  fn get(&self, key: &str) -> Option<serde_json::Value> {
    let now = self.clock.now();
    let found = match self.entries.lock() {
      Ok(mut map) => {
        let live = map.get(key).map(|e| (e.expires_at > now).then(|| e.value.clone()));

        match live {
          Some(Some(v)) => Some(v),
          Some(None) => {
            map.remove(key);
            None
          }
          None => None,
        }
      }
      Err(_) => None,
    };

    self.counters.record(found.is_some());
    found
  }

  fn put(&self, key: &str, value: serde_json::Value, ttl: Duration) {
    let now = self.clock.now();
    let expires_at = now + to_chrono(ttl);

    if let Ok(mut map) = self.entries.lock() {
      map.retain(|_, e| e.expires_at > now);
      map.insert(key.to_string(), Entry { value, expires_at });
    }
  }

  fn discard(&self, key: &str) {
    if let Ok(mut map) = self.entries.lock() {
      map.remove(key);
    }
    self.counters.demote_hit();
  }

  fn stats(&self) -> CacheStats {
    self.counters.snapshot()
  }
}

/// Directory-backed store: one JSON document per key, shareable across processes.
pub struct FileCache {
  dir: PathBuf,
  clock: Arc<dyn Clock>,
  counters: Counters,
}

impl FileCache {
  pub fn new<P: AsRef<Path>>(dir: P) -> Self {
    Self::with_clock(dir, Arc::new(SystemClock))
  }

  pub fn with_clock<P: AsRef<Path>>(dir: P, clock: Arc<dyn Clock>) -> Self {
    Self {
      dir: dir.as_ref().to_path_buf(),
      clock,
      counters: Counters::default(),
    }
  }

  fn path_for(&self, key: &str) -> PathBuf {
    self.dir.join(format!("{}.json", file_stem(key)))
  }

  fn read_entry(&self, key: &str) -> Option<Entry> {
    let data = std::fs::read(self.path_for(key)).ok()?;
    serde_json::from_slice::<Entry>(&data).ok()
  }

  fn write_entry(&self, key: &str, entry: &Entry) -> std::io::Result<()> {
    std::fs::create_dir_all(&self.dir)?;

    let path = self.path_for(key);
    let tmp = path.with_extension("json.tmp");
    let bytes = serde_json::to_vec(entry)?;

    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, &path)
  }

  /// Remove every entry file whose expiry has passed. Returns how many went.
  fn prune_expired(&self, now: DateTime<Utc>) -> usize {
    let Ok(dir) = std::fs::read_dir(&self.dir) else {
      return 0;
    };

    let mut removed = 0;
    for path in dir.filter_map(|d| d.ok()).map(|d| d.path()) {
      if path.extension().and_then(|e| e.to_str()) != Some("json") {
        continue;
      }

      let expired = std::fs::read(&path)
        .ok()
        .and_then(|data| serde_json::from_slice::<Entry>(&data).ok())
        .is_some_and(|e| e.expires_at <= now);

      if expired && std::fs::remove_file(&path).is_ok() {
        removed += 1;
      }
    }

    if removed > 0 {
      debug!(removed, dir = %self.dir.display(), "pruned expired cache files");
    }
    removed
  }
}

impl CacheStore for FileCache {
  fn get(&self, key: &str) -> Option<serde_json::Value> {
    let found = self
      .read_entry(key)
      .filter(|e| e.expires_at > self.clock.now())
      .map(|e| e.value);

    self.counters.record(found.is_some());
    found
  }

  fn put(&self, key: &str, value: serde_json::Value, ttl: Duration) {
    let now = self.clock.now();
    let entry = Entry {
      value,
      expires_at: now + to_chrono(ttl),
    };

    if let Err(e) = self.write_entry(key, &entry) {
      warn!(key, dir = %self.dir.display(), error = %e, "failed to persist cache entry");
    }

    self.prune_expired(now);
  }

  fn discard(&self, key: &str) {
    let _ = std::fs::remove_file(self.path_for(key));
    self.counters.demote_hit();
  }

  fn stats(&self) -> CacheStats {
    self.counters.snapshot()
  }
}

/// Escape a cache key into a portable file stem. Keys carry `owner/repo` segments.
fn file_stem(key: &str) -> String {
  let mut out = String::with_capacity(key.len());

  for b in key.bytes() {
    match b {
      b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' => out.push(b as char),
      _ => out.push_str(&format!("%{:02X}", b)),
    }
  }

  out
}
