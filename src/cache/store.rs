use std::future::Future;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, warn};

/// Key-value persistence for raw JSON payloads. The schema of the stored
/// documents is owned by the remote API; they round-trip untouched.
pub trait CacheStore {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn put(&self, key: &str, value: &Value) -> Result<()>;
}

/// Read-through access: return the cached payload if present, otherwise
/// fetch, persist the raw result under `key`, and return it.
///
/// An unreadable cache entry falls through to the fetch; the run only
/// aborts when the fetch fails too.
pub async fn get_or_fetch<S, F, Fut>(store: &S, key: &str, fetch: F) -> Result<Value>
where
    S: CacheStore,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Value>>,
{
    match store.get(key) {
        Ok(Some(value)) => {
            debug!(key, "Cache hit");
            return Ok(value);
        }
        Ok(None) => debug!(key, "Cache miss, fetching"),
        Err(e) => warn!(key, error = %e, "Cache read failed, refetching"),
    }

    let value = fetch()
        .await
        .with_context(|| format!("Fetch failed for cache key {:?}", key))?;
    store
        .put(key, &value)
        .with_context(|| format!("Failed to persist cache key {:?}", key))?;
    Ok(value)
}

/// File-backed store: one `<key>.json` document per key under the cache
/// directory.
pub struct FileStore {
    cache_dir: PathBuf,
}

impl FileStore {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)
            .with_context(|| format!("Failed to create cache directory {}", cache_dir.display()))?;
        Ok(Self { cache_dir })
    }

    fn path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", key))
    }
}

impl CacheStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file {}", path.display()))?;
        let value = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache file {}", path.display()))?;
        Ok(Some(value))
    }

    fn put(&self, key: &str, value: &Value) -> Result<()> {
        let path = self.path(key);
        let contents = serde_json::to_string(value)?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write cache file {}", path.display()))?;
        Ok(())
    }
}

/// In-memory store for tests.
#[cfg(test)]
pub use memory::MemoryStore;


// ============================================================================
// Tests
// ============================================================================
