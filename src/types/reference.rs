//! Parsed references: the normalized output of the name/path parsers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which kind of production entity a reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// A reusable asset (prop, character, environment...).
    Asset,
    /// A shot inside a sequence/scene.
    Shot,
}

impl EntityKind {
    /// Type name as used by the tracking database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asset => "Asset",
            Self::Shot => "Shot",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse entity kind from the tracking database's type name (case-insensitive).
impl std::str::FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asset" => Ok(Self::Asset),
            "shot" => Ok(Self::Shot),
            _ => Err(format!("Invalid entity kind: {}. Use Asset or Shot", s)),
        }
    }
}

/// A raw identifier supplied by the scene graph.
///
/// The variant records which naming convention the string is expected to
/// follow; the parsers decide whether it actually does.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Identifier {
    /// Slash-delimited content path (`/Game/Assets/Prop/SM_Gun`).
    ObjectPath(String),
    /// Underscore-delimited sequence name (`SCN_010_LAY_sub`).
    SequenceName(String),
    /// Path of the level/map an actor lives in.
    LevelPath(String),
    /// File name of a rendered movie (`SCN_010_LGT.mov`).
    MediaFile(String),
}

impl Identifier {
    /// The raw string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::ObjectPath(s) | Self::SequenceName(s) | Self::LevelPath(s) | Self::MediaFile(s) => s,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized `(category, code, step[, task])` tuple.
///
/// `category` is the asset type for assets and the scene/sequence for shots.
/// Produced purely from an identifier; carries no database state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParsedReference {
    /// Entity table the code lives in.
    pub kind: EntityKind,
    /// Asset type or scene name.
    pub category: String,
    /// Entity code (asset name or full shot code).
    pub code: String,
    /// Pipeline step short name.
    pub step: String,
    /// Free-text task name guess, when the identifier carries one.
    pub task_hint: Option<String>,
}

impl ParsedReference {
    /// Reference to an asset.
    pub fn asset(category: impl Into<String>, code: impl Into<String>, step: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::Asset,
            category: category.into(),
            code: code.into(),
            step: step.into(),
            task_hint: None,
        }
    }

    /// Reference to a shot.
    pub fn shot(scene: impl Into<String>, code: impl Into<String>, step: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::Shot,
            category: scene.into(),
            code: code.into(),
            step: step.into(),
            task_hint: None,
        }
    }

    /// Attach a free-text task name guess.
    pub fn with_task_hint(mut self, hint: impl Into<String>) -> Self {
        self.task_hint = Some(hint.into());
        self
    }

    /// `(category, code, step)` as borrowed strings.
    pub fn as_tuple(&self) -> (&str, &str, &str) {
        (&self.category, &self.code, &self.step)
    }
}

impl fmt::Display for ParsedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{}/{}", self.kind, self.category, self.code, self.step)?;
        if let Some(task) = &self.task_hint {
            write!(f, " [{}]", task)?;
        }
        Ok(())
    }
}
