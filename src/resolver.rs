//! Context resolver.
//!
//! Turns a [`ParsedReference`] into a [`ProductionContext`] by looking the
//! entity up in the production store and attaching a task.
//!
//! ## Task selection
//!
//! 1. If the reference carries a task hint, the task whose name equals the
//!    hint exactly.
//! 2. Otherwise, or when (1) finds nothing, the task whose step short name
//!    equals the reference's step.
//!
//! A supplied hint always wins over the step match, even when the hinted
//! task belongs to another step.
//!
//! ## Actors
//!
//! An actor bound in a shot sub-sequence belongs to that shot: the binding
//! is searched below the active sequence and the binding sequence's name is
//! parsed. Only an actor bound nowhere falls back to the level it lives in.

use std::sync::Arc;

use crate::edits::EditGraph;
use crate::naming::NamingConvention;
use crate::store::{ProductionStore, TaskMatch};
use crate::types::{
    ContextError, EntityKind, EntityRef, Identifier, ParsedReference, ProductionContext, ProjectRef,
    SequenceId,
};

/// Error type for resolver operations.
///
/// Lookup misses are not errors; see [`Resolution`].
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// Store error.
    #[error("Store error: {0}")]
    Store(String),
    /// The store returned rows that do not form a valid context.
    #[error("Invalid context: {0}")]
    Context(#[from] ContextError),
}

impl ResolveError {
    /// Create a store error from any error type.
    pub fn from_store<E: std::error::Error>(e: E) -> Self {
        Self::Store(e.to_string())
    }
}

/// Outcome of a single resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Entity and task found.
    Resolved(ProductionContext),
    /// No entity with this category and code in the project.
    EntityNotFound {
        /// Asset or shot.
        kind: EntityKind,
        /// Category searched.
        category: String,
        /// Code searched.
        code: String,
    },
    /// Entity found, but neither the hint nor the step matched a task.
    TaskNotFound {
        /// The resolved entity.
        entity: EntityRef,
        /// Step searched.
        step: String,
        /// Task name searched, if any.
        task_hint: Option<String>,
    },
}

impl Resolution {
    /// The context, if resolved.
    pub fn into_context(self) -> Option<ProductionContext> {
        match self {
            Self::Resolved(context) => Some(context),
            _ => None,
        }
    }

    /// True when a context was produced.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

/// Resolves references against a production store, scoped to one project.
///
/// Holds no cache: repeating a resolution re-queries the store. Wrap the
/// store in a [`CachedProductionStore`](crate::store::CachedProductionStore)
/// to cache entity and task rows.
pub struct ContextResolver<S: ProductionStore> {
    store: Arc<S>,
    project: ProjectRef,
    naming: NamingConvention,
}

impl<S: ProductionStore> ContextResolver<S> {
    /// Create a resolver with the default naming convention.
    pub fn new(store: Arc<S>, project: ProjectRef) -> Self {
        Self::with_naming(store, project, NamingConvention::default())
    }

    /// Create a resolver with a custom naming convention.
    pub fn with_naming(store: Arc<S>, project: ProjectRef, naming: NamingConvention) -> Self {
        Self { store, project, naming }
    }

    /// Resolve a reference, reporting which lookup missed.
    pub async fn resolve_detailed(&self, reference: &ParsedReference) -> Result<Resolution, ResolveError> {
        let entity = self
            .store
            .find_entity(&self.project, reference.kind, &reference.category, &reference.code)
            .await
            .map_err(ResolveError::from_store)?;

        let Some(entity) = entity else {
            tracing::warn!(
                kind = %reference.kind,
                category = %reference.category,
                code = %reference.code,
                "Entity not found"
            );
            return Ok(Resolution::EntityNotFound {
                kind: reference.kind,
                category: reference.category.clone(),
                code: reference.code.clone(),
            });
        };

        let mut task = None;
        if let Some(hint) = &reference.task_hint {
            task = self
                .store
                .find_task(&entity, &TaskMatch::ByName(hint.clone()))
                .await
                .map_err(ResolveError::from_store)?;
            if task.is_none() {
                tracing::debug!(code = %entity.code, task = %hint, "No task named by hint, trying step");
            }
        }
        if task.is_none() {
            task = self
                .store
                .find_task(&entity, &TaskMatch::ByStep(reference.step.clone()))
                .await
                .map_err(ResolveError::from_store)?;
        }

        let Some(task) = task else {
            tracing::warn!(
                code = %entity.code,
                step = %reference.step,
                task_hint = ?reference.task_hint,
                "Task not found"
            );
            return Ok(Resolution::TaskNotFound {
                entity,
                step: reference.step.clone(),
                task_hint: reference.task_hint.clone(),
            });
        };

        let context = ProductionContext::new(self.project.clone(), entity, task)?;
        tracing::debug!(context = %context, "Resolved context");
        Ok(Resolution::Resolved(context))
    }

    /// Resolve a reference to a context, or `None` on any lookup miss.
    pub async fn resolve(&self, reference: &ParsedReference) -> Result<Option<ProductionContext>, ResolveError> {
        Ok(self.resolve_detailed(reference).await?.into_context())
    }

    /// Resolve raw fields without going through a parser.
    pub async fn resolve_fields(
        &self,
        kind: EntityKind,
        category: &str,
        code: &str,
        step: &str,
        task_hint: Option<&str>,
    ) -> Result<Option<ProductionContext>, ResolveError> {
        let reference = ParsedReference {
            kind,
            category: category.to_string(),
            code: code.to_string(),
            step: step.to_string(),
            task_hint: task_hint.map(str::to_string),
        };
        self.resolve(&reference).await
    }

    /// Parse an identifier with the convention its variant names, then
    /// resolve it.
    ///
    /// Object paths try the asset convention before the shot convention.
    /// Identifiers that match no convention resolve to `None`.
    pub async fn resolve_identifier(&self, identifier: &Identifier) -> Result<Option<ProductionContext>, ResolveError> {
        let parsed = match identifier {
            Identifier::ObjectPath(path) => self.naming.parse_object_path(path),
            Identifier::SequenceName(name) => self.naming.parse_sequence_name(name),
            Identifier::LevelPath(path) => self.naming.parse_level_path(path),
            Identifier::MediaFile(file) => self.naming.parse_media_file(file),
        };

        match parsed {
            Some(reference) => self.resolve(&reference).await,
            None => {
                tracing::debug!(identifier = %identifier, "Identifier matches no naming convention");
                Ok(None)
            }
        }
    }

    /// Resolve a rendered movie from its file name, using the task hint the
    /// name carries.
    pub async fn resolve_media(&self, file_name: &str) -> Result<Option<ProductionContext>, ResolveError> {
        self.resolve_identifier(&Identifier::MediaFile(file_name.to_string())).await
    }

    /// Resolve an actor through its sequence binding, else its level.
    ///
    /// With an `active` sequence, the first sequence at or below it that
    /// binds `actor` decides the context from its name. A binding sequence
    /// whose name matches no convention resolves to `None`; the level is
    /// only consulted when no binding exists.
    pub async fn resolve_actor(
        &self,
        graph: &EditGraph,
        active: Option<SequenceId>,
        actor: &str,
        level_path: &str,
    ) -> Result<Option<ProductionContext>, ResolveError> {
        let binding = active.and_then(|root| graph.find_binding(root, actor));

        let identifier = match binding.and_then(|id| graph.name(id)) {
            Some(sequence) => {
                tracing::debug!(actor = %actor, sequence = %sequence, "Actor bound in sequence");
                Identifier::SequenceName(sequence.to_string())
            }
            None => {
                tracing::debug!(actor = %actor, level = %level_path, "Actor not bound, using level");
                Identifier::LevelPath(level_path.to_string())
            }
        };
        self.resolve_identifier(&identifier).await
    }

    /// Resolve each reference independently.
    ///
    /// One failed lookup never prevents the others; results are in input
    /// order.
    pub async fn resolve_batch(
        &self,
        references: &[ParsedReference],
    ) -> Vec<Result<Option<ProductionContext>, ResolveError>> {
        let mut results = Vec::with_capacity(references.len());
        for reference in references {
            let result = self.resolve(reference).await;
            if let Err(e) = &result {
                tracing::error!(reference = %reference, error = %e, "Resolution failed");
            }
            results.push(result);
        }
        results
    }

    /// The project every lookup is scoped to.
    pub fn project(&self) -> &ProjectRef {
        &self.project
    }

    /// The naming convention used for identifiers.
    pub fn naming(&self) -> &NamingConvention {
        &self.naming
    }

    /// Get the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }
}
