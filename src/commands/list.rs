//! `dlgedit list` — print all edges in graph order.

use std::path::Path;

use anyhow::Result;

use crate::graph::model::Graph;
use crate::graph::ports::PortRef;
use crate::store;

pub fn run(file: &Path) -> Result<()> {
    let (graph, _) = store::load(file)?;
    let lines = list_edges(&graph);
    if lines.is_empty() {
        println!("  No edges.");
    } else {
        for line in lines {
            println!("  {}", line);
        }
    }
    Ok(())
}

fn list_edges(graph: &Graph) -> Vec<String> {
    graph
        .edges
        .iter()
        .map(|e| {
            format!(
                "{} -> {}",
                endpoint_label(graph, &e.from),
                endpoint_label(graph, &e.to)
            )
        })
        .collect()
}

fn endpoint_label(graph: &Graph, port: &PortRef) -> String {
    let kind = graph
        .node(port.node_id)
        .map(|n| n.kind().as_str())
        .unwrap_or("?");
    if port.index > 0 {
        format!("{} #{} {}:{}", kind, port.node_id, port.kind.as_str(), port.index)
    } else {
        format!("{} #{} {}", kind, port.node_id, port.kind.as_str())
    }
}
