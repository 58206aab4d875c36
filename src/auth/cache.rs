//! Credential/Session Token Cache
//!
//! A time-bounded in-memory cache that short-circuits repeated
//! authentication of the same credential pair. It is a correctness-irrelevant
//! accelerator: a miss always falls through to full re-authentication, and
//! losing the cache only costs latency.
//!
//! Expired entries read as misses immediately (lazy expiry); a periodic
//! sweep additionally removes entries nobody re-reads, bounding memory.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, Instant};

/// Interval between background sweeps of expired entries
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Derive the cache key for a credential pair. The plaintext pair never
/// becomes a map key.
pub fn credential_key(username: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"auth:");
    hasher.update(username.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

/// TTL cache guarding concurrent reads and exclusive writes.
///
/// Process-local and never a system of record. The sweep task holds only a
/// weak handle to the entry map, so dropping the cache ends the sweep.
pub struct TokenCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    sweeper: Option<JoinHandle<()>>,
}

impl TokenCache {
    /// Create an empty cache with no sweep task.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            sweeper: None,
        }
    }

    /// Spawn the periodic sweep. Replaces any previously running sweep.
    pub fn start_sweeper(&mut self, period: Duration) {
        let entries = Arc::downgrade(&self.entries);

        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            // The first tick completes immediately; skip it.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if !sweep_once(&entries).await {
                    break;
                }
            }
        });

        if let Some(old) = self.sweeper.replace(handle) {
            old.abort();
        }
    }

    /// Cache a value under `key` for `ttl`.
    pub async fn set(&self, key: String, value: String, ttl: Duration) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().await.insert(key, entry);
    }

    /// Look up `key`. An entry past its expiry reads as a miss even before
    /// the sweep removes it.
    pub async fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if Instant::now() >= entry.expires_at {
            return None;
        }
        Some(entry.value.clone())
    }

    /// Remove `key` from the cache.
    pub async fn delete(&self, key: &str) {
        self.entries.write().await.remove(key);
    }

    /// Drop every entry.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Number of entries currently stored, expired ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the cache currently holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

/// One sweep pass. Returns false once the cache itself is gone.
async fn sweep_once(entries: &Weak<RwLock<HashMap<String, CacheEntry>>>) -> bool {
    let Some(entries) = entries.upgrade() else {
        return false;
    };
    let now = Instant::now();
    let mut map = entries.write().await;
    let before = map.len();
    map.retain(|_, entry| entry.expires_at > now);
    let removed = before - map.len();
    if removed > 0 {
        tracing::debug!(target: "merchstore::auth", removed, "swept expired cache entries");
    }
    true
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TokenCache {
    fn drop(&mut self) {
        if let Some(handle) = self.sweeper.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = TokenCache::new();

        cache
            .set("k1".to_string(), "token-1".to_string(), Duration::from_secs(60))
            .await;

        assert_eq!(cache.get("k1").await.as_deref(), Some("token-1"));
        assert_eq!(cache.get("missing").await, None);
    }

    #[tokio::test]
    async fn test_expired_entry_reads_as_miss() {
        let cache = TokenCache::new();

        cache
            .set("k1".to_string(), "token-1".to_string(), Duration::from_millis(10))
            .await;
        tokio::time::sleep(Duration::from_millis(30)).await;

        // No sweep has run; lazy expiry alone hides the entry.
        assert_eq!(cache.get("k1").await, None);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let cache = TokenCache::new();

        cache
            .set("k1".to_string(), "v1".to_string(), Duration::from_secs(60))
            .await;
        cache
            .set("k2".to_string(), "v2".to_string(), Duration::from_secs(60))
            .await;

        cache.delete("k1").await;
        assert_eq!(cache.get("k1").await, None);
        assert_eq!(cache.get("k2").await.as_deref(), Some("v2"));

        cache.clear().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_sweeper_removes_expired_entries() {
        let mut cache = TokenCache::new();
        cache.start_sweeper(Duration::from_millis(20));

        cache
            .set("k1".to_string(), "v1".to_string(), Duration::from_millis(5))
            .await;
        cache
            .set("k2".to_string(), "v2".to_string(), Duration::from_secs(60))
            .await;

        tokio::time::sleep(Duration::from_millis(60)).await;

        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get("k2").await.as_deref(), Some("v2"));
    }

    #[test]
    fn test_credential_key_is_stable_and_distinct() {
        let a = credential_key("alice", "pw");
        let b = credential_key("alice", "pw");
        let c = credential_key("alice", "other");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(!a.contains("pw"));
    }
}
