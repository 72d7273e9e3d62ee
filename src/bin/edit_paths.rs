//! Edit path report.
//!
//! Reads an edit graph snapshot and prints, for each requested sequence,
//! every root-to-leaf path as JSON on stdout. Cycles are logged and listed
//! in the report.
//!
//! ## Configuration
//!
//! - `SNAPSHOT` argument, or `EDIT_SNAPSHOT`: path of the snapshot JSON file
//! - remaining arguments: object paths or names of the sequences to report
//!   (default: every leaf sequence)
//! - `RUST_LOG`: Log level filter (default: info)
//! - `--log-format` / `LOG_FORMAT`: "json" for structured logs, "pretty" for development (default: json)
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin edit_paths -- snapshot.json SCN_010_LAY_sub
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pipeline_context::{
    collect_edit_units, EditGraph, EditSnapshot, SequenceId, PIPELINE_SCHEMA_VERSION,
};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Json,
    Pretty,
}

/// Print every root-to-leaf edit path of the selected sequences.
#[derive(Parser, Debug)]
#[command(name = "edit_paths")]
#[command(about = "Report the edit paths of sequences in an edit graph snapshot")]
struct Args {
    /// Edit graph snapshot (JSON)
    #[arg(env = "EDIT_SNAPSHOT")]
    snapshot: PathBuf,

    /// Object paths or names of the sequences to report (default: every leaf)
    sequences: Vec<String>,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value = "json")]
    log_format: LogFormat,
}

/// Initialize the tracing subscriber with JSON or pretty format on stderr.
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "edit_paths=info,pipeline_context=info".into());

    match format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .flatten_event(true),
                )
                .init();
        }
    }
}

/// Resolve a command-line selector to a sequence: object path first, then
/// display name.
fn find_sequence(graph: &EditGraph, selector: &str) -> Option<SequenceId> {
    graph
        .id(selector)
        .or_else(|| graph.ids().find(|id| graph.name(*id) == Some(selector)))
}

/// Sequences to report: the selected ones, or every leaf when none is given.
fn select_sequences(graph: &EditGraph, selectors: &[String]) -> Vec<SequenceId> {
    if selectors.is_empty() {
        return graph.leaves();
    }
    selectors
        .iter()
        .filter_map(|s| {
            let found = find_sequence(graph, s);
            if found.is_none() {
                warn!(sequence = %s, "Sequence not in snapshot");
            }
            found
        })
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(args.log_format);

    let data = std::fs::read_to_string(&args.snapshot)?;
    let snapshot: EditSnapshot = serde_json::from_str(&data)?;
    let graph = EditGraph::from_snapshot(&snapshot);

    info!(
        snapshot = %args.snapshot.display(),
        sequences = graph.num_sequences(),
        edits = graph.num_edits(),
        snapshot_id = %graph.snapshot_id(),
        "Loaded edit graph"
    );

    let leaves = select_sequences(&graph, &args.sequences);
    let units = collect_edit_units(&graph, &leaves);
    let cycles: Vec<String> = units.cycles.iter().map(|c| c.render(&graph)).collect();

    let report = serde_json::json!({
        "schema_version": PIPELINE_SCHEMA_VERSION,
        "snapshot_id": graph.snapshot_id(),
        "units": units.units,
        "cycles": cycles,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    info!(units = units.units.len(), cycles = cycles.len(), "Done");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline_context::{SequenceInfo, SnapshotEdit};

    fn graph() -> EditGraph {
        EditGraph::from_snapshot(&EditSnapshot {
            sequences: vec![
                SequenceInfo::new("/Game/Cine/SCN_010_LAY_sub", "SCN_010_LAY_sub"),
                SequenceInfo::new("/Game/Cine/SCN_Master", "SCN_Master"),
                SequenceInfo::new("/Game/Cine/Teaser", "Teaser"),
            ],
            edits: vec![SnapshotEdit {
                child: "/Game/Cine/SCN_010_LAY_sub".to_string(),
                parent: "/Game/Cine/SCN_Master".to_string(),
                track: "Shots".to_string(),
                section: 0,
            }],
        })
    }

    #[test]
    fn test_args_positional() {
        let args = Args::try_parse_from(["edit_paths", "snap.json", "SCN_010_LAY_sub", "Teaser"]).unwrap();
        assert_eq!(args.snapshot, PathBuf::from("snap.json"));
        assert_eq!(args.sequences, vec!["SCN_010_LAY_sub", "Teaser"]);
    }

    #[test]
    fn test_args_log_format() {
        let args = Args::try_parse_from(["edit_paths", "snap.json", "--log-format", "pretty"]).unwrap();
        assert_eq!(args.log_format, LogFormat::Pretty);
        assert!(args.sequences.is_empty());

        assert!(Args::try_parse_from(["edit_paths", "snap.json", "--log-format", "xml"]).is_err());
    }

    #[test]
    fn test_select_by_path_or_name() {
        let graph = graph();
        let selected = select_sequences(
            &graph,
            &["/Game/Cine/Teaser".to_string(), "SCN_010_LAY_sub".to_string(), "Gone".to_string()],
        );
        assert_eq!(
            selected,
            vec![graph.id("/Game/Cine/Teaser").unwrap(), graph.id("/Game/Cine/SCN_010_LAY_sub").unwrap()]
        );
    }

    #[test]
    fn test_select_defaults_to_leaves() {
        let graph = graph();
        assert_eq!(select_sequences(&graph, &[]), graph.leaves());
    }
}
