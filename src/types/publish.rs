//! Published-file records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::context::{EntityRef, ProjectRef, TaskRef};

/// Published file type, as named in the tracking database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PublishType {
    /// Exported FBX geometry/animation.
    Fbx,
    /// Exported FBX camera.
    FbxCamera,
    /// Alembic geometry cache.
    AlembicCache,
    /// Alembic camera.
    AlembicCamera,
    /// Rendered movie.
    Render,
}

impl PublishType {
    /// Database name of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fbx => "FBX",
            Self::FbxCamera => "FBX Camera",
            Self::AlembicCache => "Alembic Cache",
            Self::AlembicCamera => "Alembic Camera",
            Self::Render => "Unreal Render",
        }
    }

    /// FBX type for an exported actor: cameras are recognised by name.
    pub fn for_actor(actor_name: &str) -> Self {
        if actor_name.to_lowercase().contains("camera") {
            Self::FbxCamera
        } else {
            Self::Fbx
        }
    }

    /// Whether publishes of this type are checked for staleness against
    /// the artifact on disk before being accepted.
    pub fn checks_staleness(&self) -> bool {
        matches!(self, Self::Render)
    }
}

impl fmt::Display for PublishType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a publish type from its database name (exact match).
impl std::str::FromStr for PublishType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FBX" => Ok(Self::Fbx),
            "FBX Camera" => Ok(Self::FbxCamera),
            "Alembic Cache" => Ok(Self::AlembicCache),
            "Alembic Camera" => Ok(Self::AlembicCamera),
            "Unreal Render" => Ok(Self::Render),
            _ => Err(format!("Invalid publish type: {}", s)),
        }
    }
}

/// Immutable snapshot of a published-file row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishRecord {
    /// Database id.
    pub id: u64,
    /// Published base name (no version token).
    pub name: String,
    /// 1-based version number.
    pub version_number: u32,
    /// Last modification of the row.
    pub updated_at: DateTime<Utc>,
    /// Path of the published artifact.
    pub path: String,
    /// Published file type, if known.
    pub publish_type: Option<PublishType>,
}

/// Write payload for registering a new publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPublish {
    /// Project scope.
    pub project: ProjectRef,
    /// Entity the publish is linked to.
    pub entity: EntityRef,
    /// Task the publish is linked to.
    pub task: TaskRef,
    /// Published base name.
    pub name: String,
    /// Version to register.
    pub version_number: u32,
    /// Destination path.
    pub path: String,
    /// Published file type.
    pub publish_type: PublishType,
}
