//! Production context records.
//!
//! A context is the `(project, entity, task, step)` tuple a scene object or
//! a publish belongs to. Contexts have value semantics: to change a field,
//! build a new one.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::reference::EntityKind;

/// Project scope for every gateway lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectRef {
    /// Database id.
    pub id: u64,
    /// Display name.
    pub name: String,
}

impl ProjectRef {
    /// Create a project reference.
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}

/// A production entity row (asset or shot).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    /// Asset or shot.
    pub kind: EntityKind,
    /// Database id.
    pub id: u64,
    /// Entity code (`SM_Gun`, `SCN_010`).
    pub code: String,
    /// Asset type for assets, scene/sequence for shots.
    pub category: String,
}

impl EntityRef {
    /// Create an entity reference.
    pub fn new(kind: EntityKind, id: u64, code: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            kind,
            id,
            code: code.into(),
            category: category.into(),
        }
    }
}

/// A pipeline step row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepRef {
    /// Database id.
    pub id: u64,
    /// Short name (`LAY`, `LGT`, `MDL`).
    pub short_name: String,
}

impl StepRef {
    /// Create a step reference.
    pub fn new(id: u64, short_name: impl Into<String>) -> Self {
        Self {
            id,
            short_name: short_name.into(),
        }
    }
}

/// A task row attached to an entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskRef {
    /// Database id.
    pub id: u64,
    /// Task content/name (`Lighting`, `Layout`).
    pub name: String,
    /// Pipeline step the task belongs to.
    pub step: StepRef,
}

impl TaskRef {
    /// Create a task reference.
    pub fn new(id: u64, name: impl Into<String>, step: StepRef) -> Self {
        Self {
            id,
            name: name.into(),
            step,
        }
    }
}

/// Error raised when a context is built from incomplete data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    /// A required field was empty.
    #[error("Context field '{0}' must not be empty")]
    EmptyField(&'static str),
}

/// Fully hydrated production context.
///
/// Deserialization goes through [`ProductionContext::new`], so a decoded
/// context is validated like a constructed one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ProductionContext {
    project: ProjectRef,
    entity: EntityRef,
    task: TaskRef,
}

/// Unvalidated wire form of [`ProductionContext`].
#[derive(Deserialize)]
struct RawContext {
    project: ProjectRef,
    entity: EntityRef,
    task: TaskRef,
}

impl<'de> Deserialize<'de> for ProductionContext {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawContext::deserialize(deserializer)?;
        Self::new(raw.project, raw.entity, raw.task).map_err(serde::de::Error::custom)
    }
}

impl ProductionContext {
    /// Build a context, validating that identifying fields are present.
    pub fn new(project: ProjectRef, entity: EntityRef, task: TaskRef) -> Result<Self, ContextError> {
        if entity.code.is_empty() {
            return Err(ContextError::EmptyField("entity.code"));
        }
        if task.name.is_empty() {
            return Err(ContextError::EmptyField("task.name"));
        }
        if task.step.short_name.is_empty() {
            return Err(ContextError::EmptyField("task.step.short_name"));
        }
        Ok(Self { project, entity, task })
    }

    /// Project this context is scoped to.
    pub fn project(&self) -> &ProjectRef {
        &self.project
    }

    /// Resolved entity.
    pub fn entity(&self) -> &EntityRef {
        &self.entity
    }

    /// Resolved task.
    pub fn task(&self) -> &TaskRef {
        &self.task
    }

    /// Short name of the task's pipeline step.
    pub fn step_short_name(&self) -> &str {
        &self.task.step.short_name
    }

    /// Template fields describing where this context lives on disk.
    ///
    /// Shots yield `Sequence`/`Shot`/`Step`, assets yield
    /// `AssetType`/`Asset`/`Step`.
    pub fn template_fields(&self) -> BTreeMap<String, String> {
        let mut fields = BTreeMap::new();
        match self.entity.kind {
            EntityKind::Shot => {
                fields.insert("Sequence".to_string(), self.entity.category.clone());
                fields.insert("Shot".to_string(), self.entity.code.clone());
            }
            EntityKind::Asset => {
                fields.insert("AssetType".to_string(), self.entity.category.clone());
                fields.insert("Asset".to_string(), self.entity.code.clone());
            }
        }
        fields.insert("Step".to_string(), self.task.step.short_name.clone());
        fields
    }
}

impl fmt::Display for ProductionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}, {} ({})",
            self.project.name, self.entity.kind, self.entity.code, self.task.name, self.task.step.short_name
        )
    }
}
