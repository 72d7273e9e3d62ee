//! # pipeline-context-kernel
//!
//! Scene-identifier parsing, production context resolution, publish
//! versioning and sequence edit-graph traversal for a content-creation
//! pipeline.
//!
//! The kernel answers two questions:
//!
//! > Which production entity, step and task does this scene object belong to,
//! > and under what version should its next publish land?
//!
//! > Through which chains of containing sequences is this sequence used?
//!
//! ## Architecture
//!
//! ```text
//! Identifier → NamingConvention → ParsedReference → ContextResolver → ProductionContext
//!                                                         ↓                  ↓
//!                                       ProductionStore (Memory/Cached/Postgres)
//!                                                         ↑                  ↓
//!                                        VersionResolver / PublishPlanner → PublishPlan
//!
//! EditSnapshot → EditGraph → all_paths / collect_edit_units → EditUnit
//! ```
//!
//! ## Guarantees
//!
//! - Parsers are total: malformed input yields `None`, never an error
//! - Resolution re-queries the store on every call; nothing is cached
//!   unless the caller wraps the store in [`CachedProductionStore`]
//! - Version numbers are 1-based and read the current maximum before use
//! - Edit-graph traversal terminates on cyclic graphs and reports each
//!   skipped cycle

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod naming;
pub mod store;
pub mod resolver;
pub mod version;
pub mod publish;
pub mod edits;
pub mod canonical;

// Re-exports
pub use types::{
    EntityKind, Identifier, ParsedReference,
    ProjectRef, EntityRef, StepRef, TaskRef, ProductionContext, ContextError,
    PublishType, PublishRecord, NewPublish,
    SequenceId, SequenceInfo, TrackRef, EditRelationship, EditPath,
};
pub use naming::{
    NamingConvention, NamingError,
    get_version, set_version, up_version, split_version,
    parse_entity_url, sanitize_asset_name, strip_publish_version,
};
pub use store::{
    ProductionStore, TaskMatch,
    InMemoryProductionStore, InMemoryError,
    CachedProductionStore, CacheConfig, CacheStats,
};
#[cfg(feature = "postgres")]
pub use store::{PostgresProductionStore, PostgresConfig, PostgresError};
pub use resolver::{ContextResolver, Resolution, ResolveError};
pub use version::{VersionResolver, VersionError, PublishCheck, next_version_after, is_stale};
pub use publish::{
    PublishTemplate, TemplateError, PublishPlanner, PublishRequest, PublishPlan,
    PlanOutcome, PublishError,
};
pub use edits::{
    EditGraph, EditGraphBuilder, EditGraphError, EditSnapshot, SnapshotEdit,
    CycleReport, Traversal, EditUnit, EditUnits, collect_edit_units,
};
pub use canonical::{to_canonical_bytes, canonical_hash, canonical_hash_hex};

/// Schema version of the serialized records (snapshots, plans, units).
/// Increment on breaking changes to any of them.
pub const PIPELINE_SCHEMA_VERSION: &str = "1.0.0";
