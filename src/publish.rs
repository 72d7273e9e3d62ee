//! Publish planning: where, and under what version, an artifact belongs.
//!
//! The planner renders a path template for a resolved context, derives the
//! published base name, reads the latest record for that name and returns
//! the destination for the next version. Copying, transcoding and upload
//! belong to the caller.

use chrono::{DateTime, Utc};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use crate::naming::strip_publish_version;
use crate::store::ProductionStore;
use crate::types::{NewPublish, ProductionContext, PublishRecord, PublishType};
use crate::version::{artifact_mtime, PublishCheck, VersionError, VersionResolver};

/// Field rendered as the zero-padded publish version.
pub const VERSION_FIELD: &str = "version";

/// Field holding the request name.
pub const NAME_FIELD: &str = "name";

/// Error type for path templates.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    /// The template names a field with no value.
    #[error("Template field '{0}' has no value")]
    MissingField(String),
    /// A `{` at this byte offset has no closing `}`.
    #[error("Unclosed '{{' at offset {0}")]
    UnclosedBrace(usize),
}

/// Error type for publish planning.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// Version lookup failed.
    #[error(transparent)]
    Version(#[from] VersionError),
    /// Destination path could not be rendered.
    #[error(transparent)]
    Template(#[from] TemplateError),
    /// Registration failed in the store.
    #[error("Store error: {0}")]
    Store(String),
}

/// `{Field}` placeholder; the field name cannot contain braces.
fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{([^{}]*)\}").expect("static regex"))
}

/// Push `template[start..end]` as a literal. A `{` left in it never closed.
fn push_literal(segments: &mut Vec<Segment>, template: &str, start: usize, end: usize) -> Result<(), TemplateError> {
    let text = &template[start..end];
    if let Some(open) = text.find('{') {
        return Err(TemplateError::UnclosedBrace(start + open));
    }
    if !text.is_empty() {
        segments.push(Segment::Literal(text.to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(String),
}

/// Path template with `{Field}` placeholders.
///
/// `{version}` renders zero-padded to three digits; every other field is
/// looked up in the values passed to [`render`](Self::render).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl PublishTemplate {
    /// Parse a template string.
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal_start = 0;

        for caps in placeholder().captures_iter(template) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            push_literal(&mut segments, template, literal_start, whole.start())?;
            segments.push(Segment::Field(name.as_str().to_string()));
            literal_start = whole.end();
        }
        push_literal(&mut segments, template, literal_start, template.len())?;

        Ok(Self {
            source: template.to_string(),
            segments,
        })
    }

    /// Field names in order of appearance.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Field(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Render with `values` at `version`.
    pub fn render(&self, values: &BTreeMap<String, String>, version: u32) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(self.source.len() + 16);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(name) if name == VERSION_FIELD => out.push_str(&format!("{:03}", version)),
                Segment::Field(name) => {
                    let value = values
                        .get(name)
                        .ok_or_else(|| TemplateError::MissingField(name.clone()))?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }

    /// The template string.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// A candidate artifact to publish under a resolved context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    /// Resolved context.
    pub context: ProductionContext,
    /// Value of the `{name}` template field.
    pub name: String,
    /// Published file type.
    pub publish_type: PublishType,
    /// Modification time of the artifact on disk, when there is one.
    pub artifact_mtime: Option<DateTime<Utc>>,
}

impl PublishRequest {
    /// Create a request with no on-disk artifact.
    pub fn new(context: ProductionContext, name: impl Into<String>, publish_type: PublishType) -> Self {
        Self {
            context,
            name: name.into(),
            publish_type,
            artifact_mtime: None,
        }
    }

    /// Attach an artifact modification time.
    pub fn with_mtime(mut self, mtime: DateTime<Utc>) -> Self {
        self.artifact_mtime = Some(mtime);
        self
    }

    /// Attach the modification time of a file on disk.
    pub fn with_artifact(self, path: &Path) -> Result<Self, VersionError> {
        Ok(self.with_mtime(artifact_mtime(path)?))
    }
}

/// Destination and version for one publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishPlan {
    /// Resolved context.
    pub context: ProductionContext,
    /// Destination path at `version`.
    pub path: String,
    /// Published base name used for version lookups.
    pub base_name: String,
    /// Version to publish under.
    pub version: u32,
    /// Published file type.
    pub publish_type: PublishType,
}

/// Outcome of planning one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanOutcome {
    /// Publish at the planned destination.
    Planned(PublishPlan),
    /// The artifact predates the latest publish.
    Stale {
        /// Published base name.
        base_name: String,
        /// Latest existing record.
        latest: PublishRecord,
    },
}

impl PlanOutcome {
    /// The plan, if not stale.
    pub fn plan(&self) -> Option<&PublishPlan> {
        match self {
            Self::Planned(plan) => Some(plan),
            Self::Stale { .. } => None,
        }
    }
}

/// Plans publishes against a production store.
pub struct PublishPlanner<S: ProductionStore> {
    versions: VersionResolver<S>,
    template: PublishTemplate,
}

impl<S: ProductionStore> PublishPlanner<S> {
    /// Create a planner rendering destinations with `template`.
    pub fn new(store: Arc<S>, template: PublishTemplate) -> Self {
        Self {
            versions: VersionResolver::new(store),
            template,
        }
    }

    /// Plan one request.
    ///
    /// Only render publishes with an artifact time are checked for
    /// staleness; other types always get the next version.
    pub async fn plan(&self, request: &PublishRequest) -> Result<PlanOutcome, PublishError> {
        let mut values = request.context.template_fields();
        values.insert(NAME_FIELD.to_string(), request.name.clone());

        let first = self.template.render(&values, 1)?;
        let file_name = first.rsplit(['/', '\\']).next().unwrap_or(&first);
        let base_name = strip_publish_version(file_name);

        let version = match request.artifact_mtime {
            Some(mtime) if request.publish_type.checks_staleness() => {
                match self.versions.check_staleness(&request.context, &base_name, mtime).await? {
                    PublishCheck::Accept { next_version, .. } => next_version,
                    PublishCheck::Stale { latest, .. } => {
                        return Ok(PlanOutcome::Stale { base_name, latest });
                    }
                }
            }
            _ => self.versions.next_version(&request.context, &base_name).await?,
        };

        let path = self.template.render(&values, version)?;
        tracing::debug!(name = %base_name, version, path = %path, "Planned publish");

        Ok(PlanOutcome::Planned(PublishPlan {
            context: request.context.clone(),
            path,
            base_name,
            version,
            publish_type: request.publish_type,
        }))
    }

    /// Plan each request independently, in input order.
    pub async fn plan_batch(&self, requests: &[PublishRequest]) -> Vec<Result<PlanOutcome, PublishError>> {
        let mut results = Vec::with_capacity(requests.len());
        for request in requests {
            let result = self.plan(request).await;
            if let Err(e) = &result {
                tracing::error!(name = %request.name, error = %e, "Publish planning failed");
            }
            results.push(result);
        }
        results
    }

    /// Register a planned publish in the store.
    pub async fn register(&self, plan: &PublishPlan) -> Result<PublishRecord, PublishError> {
        let publish = NewPublish {
            project: plan.context.project().clone(),
            entity: plan.context.entity().clone(),
            task: plan.context.task().clone(),
            name: plan.base_name.clone(),
            version_number: plan.version,
            path: plan.path.clone(),
            publish_type: plan.publish_type,
        };

        let record = self
            .versions
            .store()
            .register_publish(publish)
            .await
            .map_err(|e| PublishError::Store(e.to_string()))?;
        tracing::info!(name = %record.name, version = record.version_number, "Registered publish");
        Ok(record)
    }

    /// The destination template.
    pub fn template(&self) -> &PublishTemplate {
        &self.template
    }
}
