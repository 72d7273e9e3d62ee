//! Production database gateway backends.

pub mod memory;
pub mod cached;

#[cfg(feature = "postgres")]
pub mod postgres;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{EntityKind, EntityRef, NewPublish, ProjectRef, PublishRecord, TaskRef};

/// How a task is matched on an entity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TaskMatch {
    /// Task content/name equals the string exactly.
    ByName(String),
    /// Task's pipeline step short name equals the string exactly.
    ByStep(String),
}

impl fmt::Display for TaskMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ByName(name) => write!(f, "name={}", name),
            Self::ByStep(step) => write!(f, "step={}", step),
        }
    }
}

/// Trait for production database gateways.
///
/// Every lookup is scoped to a single project, and results must be
/// deterministic for unchanged database state. All methods are async to
/// support network-backed trackers.
#[async_trait]
pub trait ProductionStore: Send + Sync {
    /// Error type for store operations.
    type Error: std::error::Error + Send + Sync;

    /// Find an entity by exact `(category, code)` within a project.
    async fn find_entity(
        &self,
        project: &ProjectRef,
        kind: EntityKind,
        category: &str,
        code: &str,
    ) -> Result<Option<EntityRef>, Self::Error>;

    /// Find a task on an entity. When several tasks match, the lowest id wins.
    async fn find_task(&self, entity: &EntityRef, by: &TaskMatch) -> Result<Option<TaskRef>, Self::Error>;

    /// Latest publish (highest version) of `base_name` on an entity.
    async fn find_publish(
        &self,
        project: &ProjectRef,
        entity: &EntityRef,
        base_name: &str,
    ) -> Result<Option<PublishRecord>, Self::Error>;

    /// Register a new publish row. Registering an existing version fails.
    async fn register_publish(&self, publish: NewPublish) -> Result<PublishRecord, Self::Error>;
}

pub use memory::{InMemoryProductionStore, InMemoryError};
pub use cached::{CachedProductionStore, CacheConfig, CacheStats};

#[cfg(feature = "postgres")]
pub use postgres::{PostgresProductionStore, PostgresConfig, PostgresError};
