//! `dlgedit inspect` — query the graph for specific conditions.

use std::collections::HashSet;
use std::path::Path;

use anyhow::Result;

use crate::graph::model::{Graph, Node, NodeData, NodeId, NodeKind};
use crate::store;

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

pub fn run_stats(file: &Path) -> Result<()> {
    let (graph, _) = store::load(file)?;
    for line in stats_lines(&graph) {
        println!("  {}", line);
    }
    Ok(())
}

pub fn run_unreachable(file: &Path) -> Result<()> {
    let (graph, _) = store::load(file)?;
    let Some(start) = graph.start_node_id else {
        println!("  No start node set — reachability is undefined.");
        return Ok(());
    };
    let unreachable = unreachable_nodes(&graph, start);
    if unreachable.is_empty() {
        println!("  All nodes are reachable from the start node.");
    } else {
        for node in unreachable {
            println!("  {} #{}", node.kind(), node.id);
        }
    }
    Ok(())
}

pub fn run_empty_targets(file: &Path) -> Result<()> {
    let (graph, _) = store::load(file)?;
    let lines = blank_target_lines(&graph);
    if lines.is_empty() {
        println!("  No condition nodes with blank target ids.");
    } else {
        for line in lines {
            println!("  {}", line);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

fn stats_lines(graph: &Graph) -> Vec<String> {
    let mut lines = Vec::new();
    for &kind in NodeKind::ALL {
        let count = graph.nodes.iter().filter(|n| n.kind() == kind).count();
        lines.push(format!("{:<10} {}", kind.as_str(), count));
    }
    lines.push(format!("{:<10} {}", "edges", graph.edges.len()));
    lines.push(format!(
        "{:<10} {}",
        "start",
        graph
            .start_node_id
            .map(|id| format!("#{id}"))
            .unwrap_or_else(|| "unset".to_string())
    ));
    lines.push(format!("{:<10} {}", "ego", graph.global_ego));
    lines
}

/// Nodes with no path from the start node, following edges in their
/// direction (key gates feed forward into the dialogues they qualify).
fn unreachable_nodes(graph: &Graph, start: NodeId) -> Vec<&Node> {
    let mut seen: HashSet<NodeId> = HashSet::new();
    let mut queue = vec![start];
    while let Some(id) = queue.pop() {
        if !seen.insert(id) {
            continue;
        }
        for edge in graph.outgoing(id) {
            queue.push(edge.to.node_id);
        }
    }
    graph
        .nodes
        .iter()
        .filter(|n| !seen.contains(&n.id))
        .collect()
}

fn blank_target_lines(graph: &Graph) -> Vec<String> {
    graph
        .nodes
        .iter()
        .filter_map(|n| match &n.data {
            NodeData::Condition(c) => {
                let blank = c.blank_target_count();
                (blank > 0).then(|| {
                    format!(
                        "condition #{}: {} blank target id(s) of {}",
                        n.id,
                        blank,
                        c.target_ids.len()
                    )
                })
            }
            _ => None,
        })
        .collect()
}
