//! Core types for the context kernel.

pub mod reference;
pub mod context;
pub mod publish;
pub mod edit;

pub use reference::{EntityKind, Identifier, ParsedReference};
pub use context::{ProjectRef, EntityRef, StepRef, TaskRef, ProductionContext, ContextError};
pub use publish::{PublishType, PublishRecord, NewPublish};
pub use edit::{SequenceId, SequenceInfo, TrackRef, EditRelationship, EditPath};
