use dashmap::DashMap;
use doctopic_core::config::CacheSettings;
use doctopic_core::model::TopicTree;
use std::time::{Duration, Instant};

/// Content-hash keyed store of validated per-chunk trees.
pub trait TopicCache: Send + Sync {
    fn get(&self, key: &str) -> Option<TopicTree>;
    fn put(&self, key: &str, tree: TopicTree);
    fn invalidate(&self, key: &str) -> bool;
    fn clear(&self);
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
pub struct TopicCacheConfig {
    /// If false, put/get are no-ops.
    pub enabled: bool,
    pub max_entries: usize,
    /// None means entries never expire.
    pub ttl: Option<Duration>,
}

impl Default for TopicCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 256,
            ttl: None,
        }
    }
}

impl From<&CacheSettings> for TopicCacheConfig {
    fn from(settings: &CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            max_entries: settings.max_entries,
            ttl: settings.ttl_seconds.map(Duration::from_secs),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    tree: TopicTree,
    inserted_at: Instant,
    last_accessed: Instant,
}

/// In-process cache with TTL expiry and least-recently-used eviction.
pub struct InMemoryTopicCache {
    config: TopicCacheConfig,
    entries: DashMap<String, CacheEntry>,
}

impl InMemoryTopicCache {
    pub fn new() -> Self {
        Self::with_config(TopicCacheConfig::default())
    }

    pub fn with_config(config: TopicCacheConfig) -> Self {
        Self {
            config,
            entries: DashMap::new(),
        }
    }

    fn is_expired(&self, entry: &CacheEntry) -> bool {
        self.config
            .ttl
            .is_some_and(|ttl| entry.inserted_at.elapsed() > ttl)
    }

    fn evict_one(&self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|entry| entry.last_accessed)
            .map(|entry| entry.key().clone());

        if let Some(key) = oldest {
            tracing::debug!(key = %key, "evicting cached topic tree");
            self.entries.remove(&key);
        }
    }
}

impl Default for InMemoryTopicCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TopicCache for InMemoryTopicCache {
    fn get(&self, key: &str) -> Option<TopicTree> {
        if !self.config.enabled {
            return None;
        }

        {
            let mut entry = self.entries.get_mut(key)?;
            if !self.is_expired(&entry) {
                entry.last_accessed = Instant::now();
                return Some(entry.tree.clone());
            }
        }

        // Shard lock released above; removing while holding it would deadlock.
        self.entries.remove(key);
        None
    }

    fn put(&self, key: &str, tree: TopicTree) {
        if !self.config.enabled || self.config.max_entries == 0 {
            return;
        }

        if !self.entries.contains_key(key) {
            while self.entries.len() >= self.config.max_entries {
                self.evict_one();
            }
        }

        let now = Instant::now();
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                tree,
                inserted_at: now,
                last_accessed: now,
            },
        );
    }

    fn invalidate(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    fn clear(&self) {
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
