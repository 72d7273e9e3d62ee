//! Edit-graph traversal scenarios.
//!
//! Chains, alternate cuts, diamonds and cycles, checked by sequence name.

use pipeline_context::{
    collect_edit_units, EditGraph, EditGraphBuilder, EditPath, EditSnapshot, SequenceId,
    SequenceInfo, SnapshotEdit, TrackRef,
};

// ─────────────────────────────────────────────────────────────────────────────
// Test Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Build a graph from `(child, parent)` name pairs.
fn build(names: &[&str], edits: &[(&str, &str)]) -> EditGraph {
    let snapshot = EditSnapshot {
        sequences: names.iter().map(|n| SequenceInfo::new(format!("/Game/Cine/{}", n), *n)).collect(),
        edits: edits
            .iter()
            .enumerate()
            .map(|(i, (child, parent))| SnapshotEdit {
                child: format!("/Game/Cine/{}", child),
                parent: format!("/Game/Cine/{}", parent),
                track: "Shots".to_string(),
                section: i as u32,
            })
            .collect(),
    };
    EditGraph::from_snapshot(&snapshot)
}

fn id(graph: &EditGraph, name: &str) -> SequenceId {
    graph.id(&format!("/Game/Cine/{}", name)).unwrap()
}

fn named(graph: &EditGraph, paths: &[EditPath]) -> Vec<Vec<String>> {
    let mut out: Vec<Vec<String>> = paths
        .iter()
        .map(|p| p.nodes().iter().map(|n| graph.name(*n).unwrap().to_string()).collect())
        .collect();
    out.sort();
    out
}

fn strs(paths: &[&[&str]]) -> Vec<Vec<String>> {
    let mut out: Vec<Vec<String>> = paths
        .iter()
        .map(|p| p.iter().map(|s| s.to_string()).collect())
        .collect();
    out.sort();
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Path Enumeration
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_three_level_chain() {
    let graph = build(&["Leaf", "Seq", "Master"], &[("Leaf", "Seq"), ("Seq", "Master")]);

    let traversal = graph.all_paths(id(&graph, "Leaf"));
    assert_eq!(named(&graph, &traversal.paths), strs(&[&["Master", "Seq", "Leaf"]]));
    assert!(traversal.cycles.is_empty());
}

#[test]
fn test_alternate_cuts() {
    let graph = build(
        &["Leaf", "CutA", "CutB"],
        &[("Leaf", "CutA"), ("Leaf", "CutB")],
    );

    let paths = graph.edit_paths(id(&graph, "Leaf"));
    assert_eq!(named(&graph, &paths), strs(&[&["CutA", "Leaf"], &["CutB", "Leaf"]]));
    assert!(paths.iter().all(|p| p.len() == 2));
}

#[test]
fn test_diamond_gives_one_path_per_route() {
    //        Master
    //        /    \
    //     ActA    ActB
    //        \    /
    //         Leaf
    let graph = build(
        &["Leaf", "ActA", "ActB", "Master"],
        &[("Leaf", "ActA"), ("Leaf", "ActB"), ("ActA", "Master"), ("ActB", "Master")],
    );

    let paths = graph.edit_paths(id(&graph, "Leaf"));
    assert_eq!(
        named(&graph, &paths),
        strs(&[&["Master", "ActA", "Leaf"], &["Master", "ActB", "Leaf"]])
    );
}

#[test]
fn test_sibling_branches_do_not_share_visited() {
    // Both branches pass through Shared; the second branch must not see it
    // as visited by the first.
    let graph = build(
        &["Leaf", "A", "B", "Shared", "Master"],
        &[("Leaf", "A"), ("Leaf", "B"), ("A", "Shared"), ("B", "Shared"), ("Shared", "Master")],
    );

    let traversal = graph.all_paths(id(&graph, "Leaf"));
    assert!(traversal.cycles.is_empty());
    assert_eq!(
        named(&graph, &traversal.paths),
        strs(&[&["Master", "Shared", "A", "Leaf"], &["Master", "Shared", "B", "Leaf"]])
    );
}

#[test]
fn test_root_is_its_own_path() {
    let graph = build(&["Leaf", "Master"], &[("Leaf", "Master")]);

    let paths = graph.edit_paths(id(&graph, "Master"));
    assert_eq!(named(&graph, &paths), strs(&[&["Master"]]));
    assert_eq!(graph.roots(), vec![id(&graph, "Master")]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Cycles
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_two_node_cycle_terminates() {
    let graph = build(&["A", "B"], &[("A", "B"), ("B", "A")]);

    let traversal = graph.all_paths(id(&graph, "A"));
    assert!(traversal.paths.is_empty());
    assert_eq!(traversal.cycles.len(), 1);
    assert_eq!(traversal.cycles[0].render(&graph), "A->B->A");
}

#[test]
fn test_cycle_keeps_non_cyclic_paths() {
    // A <-> B, and B is also cut into Master.
    let graph = build(&["A", "B", "Master"], &[("A", "B"), ("B", "A"), ("B", "Master")]);

    let traversal = graph.all_paths(id(&graph, "A"));
    assert_eq!(named(&graph, &traversal.paths), strs(&[&["Master", "B", "A"]]));
    assert_eq!(traversal.cycles.len(), 1);
    assert_eq!(traversal.cycles[0].render(&graph), "A->B->A");
}

#[test]
fn test_cycle_above_the_leaf() {
    // Leaf -> X -> Y -> X, plus Y -> Master.
    let graph = build(
        &["Leaf", "X", "Y", "Master"],
        &[("Leaf", "X"), ("X", "Y"), ("Y", "X"), ("Y", "Master")],
    );

    let traversal = graph.all_paths(id(&graph, "Leaf"));
    assert_eq!(named(&graph, &traversal.paths), strs(&[&["Master", "Y", "X", "Leaf"]]));
    assert_eq!(traversal.cycles[0].render(&graph), "Leaf->X->Y->X");
}

#[test]
fn test_traversal_is_deterministic() {
    let edits = [("Leaf", "CutB"), ("Leaf", "CutA"), ("CutA", "Master"), ("CutB", "Master")];
    let graph = build(&["Leaf", "CutA", "CutB", "Master"], &edits);

    let first = graph.all_paths(id(&graph, "Leaf"));
    let second = graph.all_paths(id(&graph, "Leaf"));
    assert_eq!(first, second);
}

// ─────────────────────────────────────────────────────────────────────────────
// Edit Units
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_units_for_every_leaf() {
    // Per-shot sub-sequences feeding one master, plus a standalone teaser.
    let mut builder = EditGraphBuilder::new();
    let master = builder.add_sequence(SequenceInfo::new("/Game/Cine/SCN_Master", "SCN_Master"));
    let teaser = builder.add_sequence(SequenceInfo::new("/Game/Cine/Teaser", "Teaser"));
    let shots: Vec<SequenceId> = ["SCN_010_LAY_sub", "SCN_020_LAY_sub", "SCN_030_LAY_sub"]
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let id = builder.add_sequence(SequenceInfo::new(format!("/Game/Cine/{}", name), *name));
            builder.add_edit(id, master, TrackRef::new("Shots", i as u32)).unwrap();
            id
        })
        .collect();
    let graph = builder.build();

    let mut leaves = graph.leaves();
    leaves.sort();
    assert_eq!(leaves.len(), 4);
    assert!(leaves.contains(&teaser));

    let units = collect_edit_units(&graph, &leaves);
    assert_eq!(units.units.len(), 4);

    let grouped = units.by_leaf();
    for shot in &shots {
        let unit = grouped[shot][0];
        assert!(unit.is_nested());
        assert_eq!(unit.object_path, "/Game/Cine/SCN_Master");
        assert!(unit.display_name.starts_with("SCN_Master ("));
    }

    let teaser_unit = grouped[&teaser][0];
    assert_eq!(teaser_unit.display_name, "Teaser");
    assert_eq!(teaser_unit.object_path, "/Game/Cine/Teaser");
}

#[test]
fn test_snapshot_json_shape() {
    let json = r#"{
        "sequences": [
            {"path": "/Game/Cine/Leaf", "name": "Leaf"},
            {"path": "/Game/Cine/Master", "name": "Master"}
        ],
        "edits": [
            {"child": "/Game/Cine/Leaf", "parent": "/Game/Cine/Master", "track": "Shots"}
        ]
    }"#;

    let snapshot: EditSnapshot = serde_json::from_str(json).unwrap();
    assert_eq!(snapshot.edits[0].section, 0);

    let graph = EditGraph::from_snapshot(&snapshot);
    let units = collect_edit_units(&graph, &[id(&graph, "Leaf")]);
    assert_eq!(units.units[0].display_name, "Master (Leaf)");
    assert_eq!(units.units[0].names, vec!["Master", "Leaf"]);
}
