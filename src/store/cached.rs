//! Read-through LRU cache in front of another production store.
//!
//! Entity and task lookups are cached; only hits are stored, so an entity
//! created after a miss is found on the next call. Publish lookups and
//! registrations always go to the inner store so version numbering reads
//! the current maximum.

use async_trait::async_trait;
use lru::LruCache;
use parking_lot::RwLock;
use std::hash::Hasher;
use std::num::NonZeroUsize;
use std::sync::Arc;
use xxhash_rust::xxh64::Xxh64;

use crate::types::{EntityKind, EntityRef, NewPublish, ProjectRef, PublishRecord, TaskRef};
use super::{ProductionStore, TaskMatch};

/// Configuration for the lookup cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries per cache.
    pub max_entries: usize,
    /// Whether to enable the cache.
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            enabled: true,
        }
    }
}

impl CacheConfig {
    /// Load from `PIPELINE_CACHE_ENTRIES` and `PIPELINE_CACHE_ENABLED`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entries: std::env::var("PIPELINE_CACHE_ENTRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_entries),
            enabled: std::env::var("PIPELINE_CACHE_ENABLED")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.enabled),
        }
    }
}

/// Cache key for a lookup, hashed from every argument that affects the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct LookupKey(u64);

impl LookupKey {
    fn entity(project: &ProjectRef, kind: EntityKind, category: &str, code: &str) -> Self {
        let mut hasher = Xxh64::new(0);
        hasher.write_u64(project.id);
        hasher.write(kind.as_str().as_bytes());
        hasher.write_u8(0);
        hasher.write(category.as_bytes());
        hasher.write_u8(0);
        hasher.write(code.as_bytes());
        Self(hasher.finish())
    }

    fn task(entity: &EntityRef, by: &TaskMatch) -> Self {
        let mut hasher = Xxh64::new(1);
        hasher.write_u64(entity.id);
        match by {
            TaskMatch::ByName(name) => {
                hasher.write_u8(0);
                hasher.write(name.as_bytes());
            }
            TaskMatch::ByStep(step) => {
                hasher.write_u8(1);
                hasher.write(step.as_bytes());
            }
        }
        Self(hasher.finish())
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Cached entity rows.
    pub entities: usize,
    /// Cached task rows.
    pub tasks: usize,
    /// Capacity of each cache.
    pub cap: usize,
}

/// Caching decorator over any [`ProductionStore`].
pub struct CachedProductionStore<S> {
    inner: Arc<S>,
    entities: Option<RwLock<LruCache<LookupKey, EntityRef>>>,
    tasks: Option<RwLock<LruCache<LookupKey, TaskRef>>>,
}

impl<S: ProductionStore> CachedProductionStore<S> {
    /// Wrap a store with the default cache configuration.
    pub fn new(inner: Arc<S>) -> Self {
        Self::with_config(inner, CacheConfig::default())
    }

    /// Wrap a store with a custom cache configuration.
    pub fn with_config(inner: Arc<S>, config: CacheConfig) -> Self {
        let size = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);
        let (entities, tasks) = if config.enabled {
            (
                Some(RwLock::new(LruCache::new(size))),
                Some(RwLock::new(LruCache::new(size))),
            )
        } else {
            (None, None)
        };

        Self { inner, entities, tasks }
    }

    /// The wrapped store.
    pub fn inner(&self) -> &Arc<S> {
        &self.inner
    }

    /// Get cache statistics.
    ///
    /// Returns `None` if caching is disabled.
    pub fn cache_stats(&self) -> Option<CacheStats> {
        let entities = self.entities.as_ref()?.read();
        let tasks = self.tasks.as_ref()?.read();
        Some(CacheStats {
            entities: entities.len(),
            tasks: tasks.len(),
            cap: entities.cap().get(),
        })
    }

    /// Drop every cached row.
    pub fn clear_cache(&self) {
        if let Some(cache) = &self.entities {
            cache.write().clear();
        }
        if let Some(cache) = &self.tasks {
            cache.write().clear();
        }
    }
}

#[async_trait]
impl<S: ProductionStore> ProductionStore for CachedProductionStore<S> {
    type Error = S::Error;

    async fn find_entity(
        &self,
        project: &ProjectRef,
        kind: EntityKind,
        category: &str,
        code: &str,
    ) -> Result<Option<EntityRef>, Self::Error> {
        let key = LookupKey::entity(project, kind, category, code);

        if let Some(cache) = &self.entities {
            // Hash collisions fall through to the inner store.
            if let Some(hit) = cache.read().peek(&key) {
                if hit.kind == kind && hit.category == category && hit.code == code {
                    tracing::trace!(code = %code, "Entity cache hit");
                    return Ok(Some(hit.clone()));
                }
            }
        }

        let found = self.inner.find_entity(project, kind, category, code).await?;
        if let (Some(cache), Some(entity)) = (&self.entities, &found) {
            cache.write().put(key, entity.clone());
        }
        Ok(found)
    }

    async fn find_task(&self, entity: &EntityRef, by: &TaskMatch) -> Result<Option<TaskRef>, Self::Error> {
        let key = LookupKey::task(entity, by);

        if let Some(cache) = &self.tasks {
            if let Some(hit) = cache.read().peek(&key) {
                let matches = match by {
                    TaskMatch::ByName(name) => hit.name == *name,
                    TaskMatch::ByStep(step) => hit.step.short_name == *step,
                };
                if matches {
                    tracing::trace!(entity = %entity.code, task = %hit.name, "Task cache hit");
                    return Ok(Some(hit.clone()));
                }
            }
        }

        let found = self.inner.find_task(entity, by).await?;
        if let (Some(cache), Some(task)) = (&self.tasks, &found) {
            cache.write().put(key, task.clone());
        }
        Ok(found)
    }

    async fn find_publish(
        &self,
        project: &ProjectRef,
        entity: &EntityRef,
        base_name: &str,
    ) -> Result<Option<PublishRecord>, Self::Error> {
        self.inner.find_publish(project, entity, base_name).await
    }

    async fn register_publish(&self, publish: NewPublish) -> Result<PublishRecord, Self::Error> {
        self.inner.register_publish(publish).await
    }
}
