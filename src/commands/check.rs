//! `dlgedit check` — read-only normalization report.
//!
//! Parses a document the same way the editor would and reports what the
//! defensive import had to drop or migrate, without writing anything back.

use std::path::Path;

use anyhow::Result;

use crate::document::import::ImportReport;
use crate::store;

pub fn run(file: &Path) -> Result<()> {
    let (graph, report) = store::load(file)?;
    if report.is_clean() {
        println!(
            "  Document is clean ({} nodes, {} edges).",
            graph.nodes.len(),
            graph.edges.len()
        );
        return Ok(());
    }
    for line in report_lines(&report) {
        println!("  {}", line);
    }
    println!("  Run `dlgedit migrate` to rewrite the document in normalized form.");
    Ok(())
}

pub(crate) fn report_lines(report: &ImportReport) -> Vec<String> {
    let mut lines = Vec::new();
    if report.dropped_nodes > 0 {
        lines.push(format!("Dropped {} malformed node(s).", report.dropped_nodes));
    }
    if report.dropped_edges > 0 {
        lines.push(format!(
            "Dropped {} dangling or malformed edge(s).",
            report.dropped_edges
        ));
    }
    if report.migrated_outcomes > 0 {
        lines.push(format!(
            "Migrated {} outcome node(s) from legacy flat success flags.",
            report.migrated_outcomes
        ));
    }
    if report.reset_start_node {
        lines.push("Cleared a start node reference to a missing node.".to_string());
    }
    lines
}
