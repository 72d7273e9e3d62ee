//! Edit relationship types for the sequence edit graph.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Arena index of a sequence in an [`EditGraph`](crate::edits::EditGraph).
///
/// Ids are only meaningful for the graph that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SequenceId(u32);

impl SequenceId {
    /// Wrap a raw arena index.
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    /// Raw arena index.
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SequenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seq#{}", self.0)
    }
}

/// A sequence node as seen by the scene graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceInfo {
    /// Object path, unique per sequence (`/Game/Cine/SCN_010.SCN_010`).
    pub path: String,
    /// Display name (`SCN_010`).
    pub name: String,
    /// Names of the actors bound in this sequence.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bindings: Vec<String>,
}

impl SequenceInfo {
    /// Create a sequence node with no bindings.
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            bindings: Vec::new(),
        }
    }

    /// Set the bound actor names.
    pub fn with_bindings<I, T>(mut self, bindings: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.bindings = bindings.into_iter().map(Into::into).collect();
        self
    }

    /// True when an actor with this exact name is bound here.
    pub fn binds(&self, actor: &str) -> bool {
        self.bindings.iter().any(|b| b == actor)
    }
}

/// Track/section through which a child sequence is embedded.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TrackRef {
    /// Track name inside the parent sequence.
    pub track: String,
    /// Section index on that track.
    pub section: u32,
}

impl TrackRef {
    /// Create a track reference.
    pub fn new(track: impl Into<String>, section: u32) -> Self {
        Self {
            track: track.into(),
            section,
        }
    }
}

/// "`child` is used as a sub-unit inside `parent`, through `via`."
///
/// Ordered by (child, parent, via) so adjacency lists are deterministic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EditRelationship {
    /// Embedded sequence.
    pub child: SequenceId,
    /// Containing sequence.
    pub parent: SequenceId,
    /// Track/section carrying the embed.
    pub via: TrackRef,
}

impl EditRelationship {
    /// Create an edit relationship.
    pub fn new(child: SequenceId, parent: SequenceId, via: TrackRef) -> Self {
        Self { child, parent, via }
    }
}

/// Root-first path of sequences ending at the requested node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EditPath(Vec<SequenceId>);

impl EditPath {
    /// Wrap a root-first node list.
    pub fn new(nodes: Vec<SequenceId>) -> Self {
        Self(nodes)
    }

    /// Outermost container.
    pub fn root(&self) -> Option<SequenceId> {
        self.0.first().copied()
    }

    /// The node the path was computed for.
    pub fn leaf(&self) -> Option<SequenceId> {
        self.0.last().copied()
    }

    /// Nodes, root first.
    pub fn nodes(&self) -> &[SequenceId] {
        &self.0
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for an empty path.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when the leaf is nested in at least one container.
    pub fn is_nested(&self) -> bool {
        self.0.len() > 1
    }
}
