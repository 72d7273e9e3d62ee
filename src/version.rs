//! Version resolver: next publish version and staleness check.
//!
//! Numbering is 1-based and strictly monotonic per
//! `(project, entity, base_name)`. The next version is always computed from
//! the current maximum in the store, so it never collides with an existing
//! row; gaps are left as they are.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::store::ProductionStore;
use crate::types::{ProductionContext, PublishRecord};

/// Error type for version operations.
#[derive(Debug, thiserror::Error)]
pub enum VersionError {
    /// Store error.
    #[error("Store error: {0}")]
    Store(String),
    /// The artifact's modification time could not be read.
    #[error("Cannot read modification time of {}: {source}", .path.display())]
    Artifact {
        /// Artifact path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The latest version is the largest representable one.
    #[error("No version left after '{name}' v{version}")]
    Exhausted {
        /// Published base name.
        name: String,
        /// Latest registered version.
        version: u32,
    },
}

impl VersionError {
    /// Create a store error from any error type.
    pub fn from_store<E: std::error::Error>(e: E) -> Self {
        Self::Store(e.to_string())
    }
}

/// Next version after the latest record: 1 when there is none, `None` when
/// the latest version cannot be incremented.
pub fn next_version_after(latest: Option<&PublishRecord>) -> Option<u32> {
    match latest {
        Some(r) => r.version_number.checked_add(1),
        None => Some(1),
    }
}

fn next_or_exhausted(base_name: &str, latest: Option<&PublishRecord>) -> Result<u32, VersionError> {
    next_version_after(latest).ok_or_else(|| VersionError::Exhausted {
        name: base_name.to_string(),
        version: latest.map_or(0, |r| r.version_number),
    })
}

/// An artifact is stale when it was modified strictly before the latest
/// publish row was updated. Equal timestamps are not stale.
pub fn is_stale(latest: &PublishRecord, artifact_mtime: DateTime<Utc>) -> bool {
    artifact_mtime < latest.updated_at
}

/// Result of checking a candidate artifact against the latest publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishCheck {
    /// The artifact may be published under `next_version`.
    Accept {
        /// Version to publish under.
        next_version: u32,
        /// Latest existing record, if any.
        latest: Option<PublishRecord>,
    },
    /// The artifact predates the latest publish; nothing to do.
    Stale {
        /// Latest existing record.
        latest: PublishRecord,
        /// Modification time of the rejected artifact.
        artifact_mtime: DateTime<Utc>,
    },
}

impl PublishCheck {
    /// True when the candidate was rejected as stale.
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale { .. })
    }
}

/// Looks up publish history for a context.
pub struct VersionResolver<S: ProductionStore> {
    store: Arc<S>,
}

impl<S: ProductionStore> VersionResolver<S> {
    /// Create a version resolver over a store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Latest publish of `base_name` under the context's project and entity.
    pub async fn latest_publish_info(
        &self,
        context: &ProductionContext,
        base_name: &str,
    ) -> Result<Option<PublishRecord>, VersionError> {
        self.store
            .find_publish(context.project(), context.entity(), base_name)
            .await
            .map_err(VersionError::from_store)
    }

    /// Version the next publish of `base_name` should use.
    pub async fn next_version(&self, context: &ProductionContext, base_name: &str) -> Result<u32, VersionError> {
        let latest = self.latest_publish_info(context, base_name).await?;
        next_or_exhausted(base_name, latest.as_ref())
    }

    /// Apply the staleness rule to an artifact modified at `artifact_mtime`.
    pub async fn check_staleness(
        &self,
        context: &ProductionContext,
        base_name: &str,
        artifact_mtime: DateTime<Utc>,
    ) -> Result<PublishCheck, VersionError> {
        let latest = self.latest_publish_info(context, base_name).await?;

        match latest {
            Some(latest) if is_stale(&latest, artifact_mtime) => {
                tracing::info!(
                    name = %base_name,
                    version = latest.version_number,
                    artifact_mtime = %artifact_mtime,
                    updated_at = %latest.updated_at,
                    "Artifact is older than the latest publish, skipping"
                );
                Ok(PublishCheck::Stale { latest, artifact_mtime })
            }
            latest => Ok(PublishCheck::Accept {
                next_version: next_or_exhausted(base_name, latest.as_ref())?,
                latest,
            }),
        }
    }

    /// Read the artifact's modification time from disk and apply the
    /// staleness rule.
    pub async fn check_artifact(
        &self,
        context: &ProductionContext,
        base_name: &str,
        path: &Path,
    ) -> Result<PublishCheck, VersionError> {
        let mtime = artifact_mtime(path)?;
        self.check_staleness(context, base_name, mtime).await
    }

    /// Get the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

/// Modification time of a file on disk.
pub fn artifact_mtime(path: &Path) -> Result<DateTime<Utc>, VersionError> {
    let to_error = |source: std::io::Error| VersionError::Artifact {
        path: path.to_path_buf(),
        source,
    };
    let modified = std::fs::metadata(path).and_then(|m| m.modified()).map_err(to_error)?;
    Ok(DateTime::<Utc>::from(modified))
}
