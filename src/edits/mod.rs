//! Sequence edit graph.
//!
//! Sequences live in an arena indexed by [`SequenceId`]; the graph keeps,
//! for every sequence, the edits in which it is the embedded child. Walking
//! those edits upward from a sequence enumerates every path to a root
//! container.
//!
//! ## Traversal
//!
//! The walk carries a visited stack that is copied for every branch, so a
//! branch only ever sees its own ancestors. A parent already on the stack
//! closes a cycle: the edge is reported and skipped, and the walk goes on
//! with the remaining edges. Every branch's stack strictly grows, so the
//! walk terminates on any finite graph.
//!
//! Several edits between the same child and parent (the child cut in on
//! two sections) yield one path.
//!
//! ## Bindings
//!
//! The graph also keeps the reverse adjacency, parent to child edits, so
//! an actor binding can be searched downward from the sequence open in the
//! editor.

pub mod units;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::canonical::canonical_hash_hex;
use crate::types::{EditPath, EditRelationship, SequenceId, SequenceInfo, TrackRef};

pub use units::{collect_edit_units, EditUnit, EditUnits};

/// Error type for edit graph construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditGraphError {
    /// Id not issued by this builder.
    #[error("Unknown sequence: {0}")]
    UnknownSequence(SequenceId),
    /// No sequence with this object path.
    #[error("Unknown sequence path: {0}")]
    UnknownPath(String),
}

/// A cycle met during traversal: the visited stack followed by the parent
/// that was already on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    /// Sequences along the cycle, leaf first, repeated node last.
    pub path: Vec<SequenceId>,
}

impl CycleReport {
    /// Render with sequence names, e.g. `A->B->A`.
    pub fn render(&self, graph: &EditGraph) -> String {
        self.path
            .iter()
            .map(|id| graph.name(*id).unwrap_or("?"))
            .collect::<Vec<_>>()
            .join("->")
    }
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, id) in self.path.iter().enumerate() {
            if i > 0 {
                f.write_str("->")?;
            }
            write!(f, "{}", id)?;
        }
        Ok(())
    }
}

/// Result of walking from one sequence to its roots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Traversal {
    /// Every path, root first. Ordered by the parent chosen at each level
    /// going up from the leaf (parent id, then track and section), not by
    /// position in the edit.
    pub paths: Vec<EditPath>,
    /// Cyclic edges that were skipped.
    pub cycles: Vec<CycleReport>,
}

/// Serializable edit graph, keyed by object path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditSnapshot {
    /// Every sequence in the project.
    pub sequences: Vec<SequenceInfo>,
    /// Edits between them.
    pub edits: Vec<SnapshotEdit>,
}

/// One edit in an [`EditSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SnapshotEdit {
    /// Object path of the embedded sequence.
    pub child: String,
    /// Object path of the containing sequence.
    pub parent: String,
    /// Track name inside the parent.
    pub track: String,
    /// Section index on that track.
    #[serde(default)]
    pub section: u32,
}

/// Builds an [`EditGraph`], interning sequences by object path.
#[derive(Debug, Clone, Default)]
pub struct EditGraphBuilder {
    sequences: Vec<SequenceInfo>,
    by_path: BTreeMap<String, SequenceId>,
    edits: Vec<EditRelationship>,
}

impl EditGraphBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sequence, or return the id of the one with the same path.
    pub fn add_sequence(&mut self, info: SequenceInfo) -> SequenceId {
        if let Some(id) = self.by_path.get(&info.path) {
            return *id;
        }
        let id = SequenceId::new(self.sequences.len() as u32);
        self.by_path.insert(info.path.clone(), id);
        self.sequences.push(info);
        id
    }

    /// Record that `child` is embedded in `parent` through `via`.
    pub fn add_edit(&mut self, child: SequenceId, parent: SequenceId, via: TrackRef) -> Result<(), EditGraphError> {
        for id in [child, parent] {
            if id.index() >= self.sequences.len() {
                return Err(EditGraphError::UnknownSequence(id));
            }
        }
        self.edits.push(EditRelationship::new(child, parent, via));
        Ok(())
    }

    /// Record an edit between two sequences named by object path.
    pub fn add_edit_by_path(&mut self, child: &str, parent: &str, via: TrackRef) -> Result<(), EditGraphError> {
        let lookup = |path: &str| {
            self.by_path
                .get(path)
                .copied()
                .ok_or_else(|| EditGraphError::UnknownPath(path.to_string()))
        };
        let (child, parent) = (lookup(child)?, lookup(parent)?);
        self.add_edit(child, parent, via)
    }

    /// Finish the graph. Duplicate edits are dropped.
    pub fn build(mut self) -> EditGraph {
        self.edits.sort();
        self.edits.dedup();

        let mut parents: Vec<Vec<EditRelationship>> = vec![Vec::new(); self.sequences.len()];
        let mut children: Vec<Vec<EditRelationship>> = vec![Vec::new(); self.sequences.len()];
        for edit in &self.edits {
            parents[edit.child.index()].push(edit.clone());
            children[edit.parent.index()].push(edit.clone());
        }
        for list in &mut children {
            list.sort_by(|a, b| (&a.via, a.child).cmp(&(&b.via, b.child)));
        }

        EditGraph {
            sequences: self.sequences,
            by_path: self.by_path,
            parents,
            children,
            num_edits: self.edits.len(),
        }
    }
}

/// Immutable edit graph with child -> parent-edit adjacency.
#[derive(Debug, Clone, Default)]
pub struct EditGraph {
    sequences: Vec<SequenceInfo>,
    by_path: BTreeMap<String, SequenceId>,
    /// Indexed by child; each list sorted by (parent, track, section).
    parents: Vec<Vec<EditRelationship>>,
    /// Indexed by parent; each list sorted by (track, section, child).
    children: Vec<Vec<EditRelationship>>,
    num_edits: usize,
}

impl EditGraph {
    /// Build from a snapshot. Edits naming unknown sequences are skipped.
    pub fn from_snapshot(snapshot: &EditSnapshot) -> Self {
        let mut builder = EditGraphBuilder::new();
        for info in &snapshot.sequences {
            builder.add_sequence(info.clone());
        }
        for edit in &snapshot.edits {
            let via = TrackRef::new(edit.track.clone(), edit.section);
            if let Err(e) = builder.add_edit_by_path(&edit.child, &edit.parent, via) {
                tracing::warn!(child = %edit.child, parent = %edit.parent, error = %e, "Skipping edit");
            }
        }
        builder.build()
    }

    /// Snapshot of the graph, edits sorted by path.
    pub fn snapshot(&self) -> EditSnapshot {
        let mut edits: Vec<SnapshotEdit> = self
            .parents
            .iter()
            .flatten()
            .map(|e| SnapshotEdit {
                child: self.sequences[e.child.index()].path.clone(),
                parent: self.sequences[e.parent.index()].path.clone(),
                track: e.via.track.clone(),
                section: e.via.section,
            })
            .collect();
        edits.sort();

        let mut sequences = self.sequences.clone();
        sequences.sort_by(|a, b| a.path.cmp(&b.path));

        EditSnapshot { sequences, edits }
    }

    /// Deterministic fingerprint of the sequences and edits, independent of
    /// insertion order.
    pub fn snapshot_id(&self) -> String {
        canonical_hash_hex(&self.snapshot())
    }

    /// Look up a sequence by object path.
    pub fn id(&self, path: &str) -> Option<SequenceId> {
        self.by_path.get(path).copied()
    }

    /// Sequence details.
    pub fn info(&self, id: SequenceId) -> Option<&SequenceInfo> {
        self.sequences.get(id.index())
    }

    /// Sequence display name.
    pub fn name(&self, id: SequenceId) -> Option<&str> {
        self.info(id).map(|i| i.name.as_str())
    }

    /// Edits in which `id` is the child.
    pub fn parent_edits(&self, id: SequenceId) -> &[EditRelationship] {
        self.parents.get(id.index()).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Edits in which `id` is the parent, in track and section order.
    pub fn child_edits(&self, id: SequenceId) -> &[EditRelationship] {
        self.children.get(id.index()).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First sequence at or below `root` that binds `actor`.
    ///
    /// Depth first: a sequence's own bindings are checked before any of its
    /// sub-sequences, which are searched in track and section order. A
    /// sequence already searched is not entered again, so cycles end the
    /// branch.
    pub fn find_binding(&self, root: SequenceId, actor: &str) -> Option<SequenceId> {
        let mut searched = vec![false; self.sequences.len()];
        self.find_binding_from(root, actor, &mut searched)
    }

    fn find_binding_from(&self, node: SequenceId, actor: &str, searched: &mut [bool]) -> Option<SequenceId> {
        let seen = searched.get_mut(node.index())?;
        if *seen {
            return None;
        }
        *seen = true;

        if self.info(node)?.binds(actor) {
            return Some(node);
        }
        self.child_edits(node)
            .iter()
            .find_map(|edit| self.find_binding_from(edit.child, actor, searched))
    }

    /// All sequence ids, in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = SequenceId> + '_ {
        (0..self.sequences.len()).map(|i| SequenceId::new(i as u32))
    }

    /// Sequences with no parent edit.
    pub fn roots(&self) -> Vec<SequenceId> {
        self.ids().filter(|id| self.parent_edits(*id).is_empty()).collect()
    }

    /// Sequences that contain no other sequence.
    pub fn leaves(&self) -> Vec<SequenceId> {
        let mut is_parent = vec![false; self.sequences.len()];
        for edit in self.parents.iter().flatten() {
            is_parent[edit.parent.index()] = true;
        }
        self.ids().filter(|id| !is_parent[id.index()]).collect()
    }

    /// Number of sequences.
    pub fn num_sequences(&self) -> usize {
        self.sequences.len()
    }

    /// Number of distinct edits.
    pub fn num_edits(&self) -> usize {
        self.num_edits
    }

    /// Every path from `node` up to a root, reversed to read root first.
    ///
    /// A sequence with no parent edit yields the single path `[node]`. A
    /// sequence whose every parent edge closes a cycle yields no path.
    pub fn all_paths(&self, node: SequenceId) -> Traversal {
        let mut cycles = Vec::new();
        let paths = self
            .walk_up(node, Vec::new(), &mut cycles)
            .into_iter()
            .map(|mut upward| {
                upward.reverse();
                EditPath::new(upward)
            })
            .collect();

        Traversal { paths, cycles }
    }

    /// Root-first paths to `node`, logging cycles.
    pub fn edit_paths(&self, node: SequenceId) -> Vec<EditPath> {
        self.all_paths(node).paths
    }

    /// Leaf-first paths from `node` to every root.
    ///
    /// `visited` is owned by this branch: each parent branch receives its
    /// own copy.
    fn walk_up(
        &self,
        node: SequenceId,
        mut visited: Vec<SequenceId>,
        cycles: &mut Vec<CycleReport>,
    ) -> Vec<Vec<SequenceId>> {
        visited.push(node);

        let edits = self.parent_edits(node);
        if edits.is_empty() {
            return vec![vec![node]];
        }

        let mut paths = Vec::new();
        let mut previous = None;
        for edit in edits {
            // Sorted by parent, so repeated parents are adjacent.
            if previous == Some(edit.parent) {
                continue;
            }
            previous = Some(edit.parent);

            if visited.contains(&edit.parent) {
                let mut path = visited.clone();
                path.push(edit.parent);
                let report = CycleReport { path };
                tracing::warn!(cycle = %report.render(self), "Cycle in edit graph, skipping edge");
                cycles.push(report);
                continue;
            }

            for upward in self.walk_up(edit.parent, visited.clone(), cycles) {
                let mut path = Vec::with_capacity(upward.len() + 1);
                path.push(node);
                path.extend(upward);
                paths.push(path);
            }
        }
        paths
    }
}
