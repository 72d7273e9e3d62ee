//! Edit units: the per-leaf presentation of edit paths for publishing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{EditPath, SequenceId};
use super::{CycleReport, EditGraph};

/// One root-to-leaf path, ready to attach to a publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditUnit {
    /// Sequence the path was computed for.
    pub leaf: SequenceId,
    /// Root-first path.
    pub path: EditPath,
    /// Sequence names along the path, root first.
    pub names: Vec<String>,
    /// `"<root> (<leaf>)"` when nested, else the leaf name.
    pub display_name: String,
    /// Object path of the root, which is the sequence to open or render.
    pub object_path: String,
}

impl EditUnit {
    /// True when the leaf is used inside at least one container.
    pub fn is_nested(&self) -> bool {
        self.path.is_nested()
    }
}

/// Edit units for a set of leaves plus every cycle met on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditUnits {
    /// Units in leaf order, then path order.
    pub units: Vec<EditUnit>,
    /// Skipped cyclic edges.
    pub cycles: Vec<CycleReport>,
}

impl EditUnits {
    /// Units grouped by leaf.
    pub fn by_leaf(&self) -> BTreeMap<SequenceId, Vec<&EditUnit>> {
        let mut grouped: BTreeMap<SequenceId, Vec<&EditUnit>> = BTreeMap::new();
        for unit in &self.units {
            grouped.entry(unit.leaf).or_default().push(unit);
        }
        grouped
    }
}

/// Compute every root-to-leaf path for each leaf.
///
/// Leaves that are not in the graph are skipped.
pub fn collect_edit_units(graph: &EditGraph, leaves: &[SequenceId]) -> EditUnits {
    let mut out = EditUnits::default();

    for &leaf in leaves {
        let Some(leaf_info) = graph.info(leaf) else {
            tracing::debug!(leaf = %leaf, "Leaf not in edit graph");
            continue;
        };

        let traversal = graph.all_paths(leaf);
        out.cycles.extend(traversal.cycles);

        for path in traversal.paths {
            let Some(root_info) = path.root().and_then(|root| graph.info(root)) else {
                continue;
            };

            let names: Vec<String> = path
                .nodes()
                .iter()
                .filter_map(|id| graph.name(*id).map(str::to_string))
                .collect();

            let (display_name, object_path) = if path.is_nested() {
                (format!("{} ({})", root_info.name, leaf_info.name), root_info.path.clone())
            } else {
                (leaf_info.name.clone(), leaf_info.path.clone())
            };

            out.units.push(EditUnit {
                leaf,
                path,
                names,
                display_name,
                object_path,
            });
        }
    }

    out
}
