//! Time-boxed caches for introspection results and their derived views.
//!
//! Every cache shares one TTL and one size bound. When a cache is full, expired
//! entries are purged first and then the entry closest to expiry is evicted.
//! Reads do not refresh an entry.
//!
//! Views derived from a schema are keyed by that schema's generation, so a view
//! computed from a schema that has since been refetched is never served.

use crate::schema::{ContentTypeInfo, SchemaModel};
use apollo_compiler::Node;
use apollo_compiler::ast::FragmentDefinition;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// The default lifetime of a cached entry
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// The default number of entries held by each cache
pub const DEFAULT_MAX_ENTRIES: usize = 500;

/// Key-value storage with per-entry expiry
pub trait CacheStore<V>: Send + Sync {
    /// Get a live entry, if any
    fn get(&self, key: &str) -> Option<V>;

    /// Store an entry that expires after `ttl`
    fn set(&self, key: &str, value: V, ttl: Duration);

    /// Remove an entry
    fn remove(&self, key: &str);

    /// Remove every entry
    fn clear(&self);
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expiry: Instant,
}

/// The key of a view derived from `schema`
pub fn derived_key(schema: &SchemaModel, name: &str) -> String {
    format!("{}:{name}", schema.generation())
}

impl<V> CacheEntry<V> {
    fn is_live(&self, now: Instant) -> bool {
        self.expiry > now
    }
}

/// An in-memory [`CacheStore`]
pub struct MemoryCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    max_entries: usize,
}

impl<V> MemoryCache<V> {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_entries: max_entries.max(1),
        }
    }

    /// The number of stored entries, including ones that have expired but not yet been purged
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V> Default for MemoryCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

impl<V: Clone + Send> CacheStore<V> for MemoryCache<V> {
    fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.is_live(now) => Some(entry.value.clone()),
            Some(_) => {
                trace!(key, "Cache entry expired");
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn set(&self, key: &str, value: V, ttl: Duration) {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        if !entries.contains_key(key) && entries.len() >= self.max_entries {
            entries.retain(|_, entry| entry.is_live(now));
            if entries.len() >= self.max_entries {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.expiry)
                    .map(|(key, _)| key.clone());
                if let Some(oldest) = oldest {
                    trace!(key = %oldest, "Evicting cache entry closest to expiry");
                    entries.remove(&oldest);
                }
            }
        }

        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expiry: now + ttl,
            },
        );
    }

    fn remove(&self, key: &str) {
        self.entries.lock().remove(key);
    }

    fn clear(&self) {
        self.entries.lock().clear();
    }
}

/// Cache sizing and lifetime
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    pub ttl: Duration,
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

/// The caches used by schema discovery and query synthesis.
///
/// Cloning shares the underlying stores, so one instance built at startup can be
/// handed to every component that needs it.
#[derive(Clone)]
pub struct SchemaCache {
    ttl: Duration,
    schemas: Arc<dyn CacheStore<Arc<SchemaModel>>>,
    content_types: Arc<dyn CacheStore<Arc<ContentTypeInfo>>>,
    fragments: Arc<dyn CacheStore<Node<FragmentDefinition>>>,
}

impl SchemaCache {
    pub fn new(
        ttl: Duration,
        schemas: Arc<dyn CacheStore<Arc<SchemaModel>>>,
        content_types: Arc<dyn CacheStore<Arc<ContentTypeInfo>>>,
        fragments: Arc<dyn CacheStore<Node<FragmentDefinition>>>,
    ) -> Self {
        Self {
            ttl,
            schemas,
            content_types,
            fragments,
        }
    }

    /// Build a cache backed by fresh [`MemoryCache`] stores
    pub fn in_memory(config: CacheConfig) -> Self {
        Self::new(
            config.ttl,
            Arc::new(MemoryCache::new(config.max_entries)),
            Arc::new(MemoryCache::new(config.max_entries)),
            Arc::new(MemoryCache::new(config.max_entries)),
        )
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn schemas(&self) -> &dyn CacheStore<Arc<SchemaModel>> {
        self.schemas.as_ref()
    }

    pub fn content_types(&self) -> &dyn CacheStore<Arc<ContentTypeInfo>> {
        self.content_types.as_ref()
    }

    pub fn fragments(&self) -> &dyn CacheStore<Node<FragmentDefinition>> {
        self.fragments.as_ref()
    }

    /// The derived view of an OBJECT type in `schema`, computed once per schema
    pub fn content_type(&self, schema: &SchemaModel, name: &str) -> Option<Arc<ContentTypeInfo>> {
        let key = derived_key(schema, name);
        if let Some(info) = self.content_types.get(&key) {
            return Some(info);
        }

        let Some(info) = schema.content_type(name, schema.classifier()) else {
            debug!(content_type = name, "Not an object type in the schema");
            return None;
        };
        let info = Arc::new(info);
        self.content_types.set(&key, info.clone(), self.ttl);
        Some(info)
    }

    /// Drop every view derived from the schema
    pub fn clear_derived(&self) {
        self.content_types.clear();
        self.fragments.clear();
    }

    /// Drop everything
    pub fn clear(&self) {
        self.schemas.clear();
        self.clear_derived();
    }
}

impl Default for SchemaCache {
    fn default() -> Self {
        Self::in_memory(CacheConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{fragment, leaf};
    use crate::test_support::cms_schema;
    use apollo_compiler::name;

    #[test]
    fn returns_live_entries() {
        let cache = MemoryCache::new(4);
        cache.set("a", 1, DEFAULT_TTL);

        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.get("b"), None);
    }

    #[test]
    fn expired_entries_are_dropped_on_read() {
        let cache = MemoryCache::new(4);
        cache.set("a", 1, Duration::ZERO);

        assert_eq!(cache.get("a"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn evicts_the_entry_closest_to_expiry() {
        let cache = MemoryCache::new(2);
        cache.set("long", 1, Duration::from_secs(600));
        cache.set("short", 2, Duration::from_secs(60));
        cache.set("new", 3, Duration::from_secs(300));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("short"), None);
        assert_eq!(cache.get("long"), Some(1));
        assert_eq!(cache.get("new"), Some(3));
    }

    #[test]
    fn purges_expired_entries_before_evicting_live_ones() {
        let cache = MemoryCache::new(2);
        cache.set("live", 1, Duration::from_secs(60));
        cache.set("dead", 2, Duration::ZERO);
        cache.set("new", 3, Duration::from_secs(600));

        assert_eq!(cache.get("live"), Some(1));
        assert_eq!(cache.get("new"), Some(3));
    }

    #[test]
    fn overwriting_a_key_does_not_evict() {
        let cache = MemoryCache::new(2);
        cache.set("a", 1, DEFAULT_TTL);
        cache.set("b", 2, DEFAULT_TTL);
        cache.set("a", 3, DEFAULT_TTL);

        assert_eq!(cache.get("a"), Some(3));
        assert_eq!(cache.get("b"), Some(2));
    }

    #[test]
    fn clear_derived_keeps_the_schema() {
        let cache = SchemaCache::default();
        let schema = Arc::new(cms_schema());
        cache.schemas().set("schema", schema.clone(), cache.ttl());
        cache.fragments().set(
            "AllComponents",
            Node::new(fragment(
                name!("AllComponents"),
                name!("_IComponent"),
                vec![leaf(name!("__typename"))],
            )),
            cache.ttl(),
        );
        assert!(cache.content_type(&schema, "ArticlePage").is_some());
        cache.clear_derived();

        assert!(cache.fragments().get("AllComponents").is_none());
        assert!(cache.content_types().get(&derived_key(&schema, "ArticlePage")).is_none());
        assert!(cache.schemas().get("schema").is_some());
    }

    #[test]
    fn content_types_are_computed_once_per_schema() {
        let cache = SchemaCache::default();
        let schema = cms_schema();

        let first = cache.content_type(&schema, "ArticlePage").unwrap();
        let second = cache.content_type(&schema, "ArticlePage").unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let refetched = cms_schema();
        let third = cache.content_type(&refetched, "ArticlePage").unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(first, third);
    }

    #[test]
    fn unknown_content_types_are_absent() {
        let cache = SchemaCache::default();
        let schema = cms_schema();

        assert!(cache.content_type(&schema, "Missing").is_none());
        assert!(cache.content_type(&schema, "_IContent").is_none());
        assert!(cache.content_types().get(&derived_key(&schema, "Missing")).is_none());
    }
}
