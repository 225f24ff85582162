//! Graph -> external JSON document.
//!
//! The wire shape belongs to the game engine, not to this editor: field
//! names are camelCase, enum values use the engine spellings, and two data
//! fields are renamed on the way out (`target_ids` -> `conditionTargetIds`,
//! `rewards` -> `outcomeRewards`). Internal mirrors never appear in output.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Value, json};

use crate::document::DOC_VERSION;
use crate::graph::model::{Edge, Graph, Node, NodeData};
use crate::graph::ports::PortRef;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DocumentOut {
    version: u32,
    start_node_id: i64,
    global_ego: &'static str,
    nodes: Vec<NodeOut>,
    edges: Vec<EdgeOut>,
}

#[derive(Serialize)]
struct NodeOut {
    id: u32,
    #[serde(rename = "type")]
    kind: &'static str,
    x: f64,
    y: f64,
    data: Value,
}

#[derive(Serialize)]
struct EdgeOut {
    from: EndpointOut,
    to: EndpointOut,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EndpointOut {
    node_id: u32,
    kind: &'static str,
    direction: &'static str,
    index: u32,
}

/// Export as a JSON value (used by tests and the round-trip contract).
pub fn to_value(graph: &Graph) -> Result<Value> {
    serde_json::to_value(build(graph)).context("failed to serialize document")
}

/// Export as the pretty-printed text written to disk.
pub fn to_json_string(graph: &Graph) -> Result<String> {
    let mut out =
        serde_json::to_string_pretty(&to_value(graph)?).context("failed to serialize document")?;
    out.push('\n');
    Ok(out)
}

fn build(graph: &Graph) -> DocumentOut {
    DocumentOut {
        version: DOC_VERSION,
        start_node_id: graph.start_node_id.map(i64::from).unwrap_or(-1),
        global_ego: graph.global_ego.as_str(),
        nodes: graph.nodes.iter().map(node_out).collect(),
        edges: graph.edges.iter().map(edge_out).collect(),
    }
}

fn node_out(node: &Node) -> NodeOut {
    NodeOut {
        id: node.id,
        kind: node.kind().as_str(),
        x: node.x,
        y: node.y,
        data: data_value(&node.data),
    }
}

fn edge_out(edge: &Edge) -> EdgeOut {
    EdgeOut {
        from: endpoint_out(&edge.from),
        to: endpoint_out(&edge.to),
    }
}

fn endpoint_out(port: &PortRef) -> EndpointOut {
    EndpointOut {
        node_id: port.node_id,
        kind: port.kind.as_str(),
        direction: port.direction.wire_str(),
        index: port.index,
    }
}

fn data_value(data: &NodeData) -> Value {
    match data {
        NodeData::Dialogue(d) => json!({
            "speaker": d.speaker.as_str(),
            "text": d.text,
            "stableText": d.stable_text,
            "stableEnd": d.stable_end,
            "fragmentedText": d.fragmented_text,
            "fragmentedEnd": d.fragmented_end,
            "ghostlyText": d.ghostly_text,
            "ghostlyEnd": d.ghostly_end,
        }),
        NodeData::Key(d) => json!({
            "social": d.social.as_str(),
            "gender": d.gender.as_str(),
            "ideology": d.ideology.as_str(),
            "purpose": d.purpose.as_str(),
            "label": d.label,
        }),
        NodeData::Ego(d) => json!({ "ego": d.ego.as_str() }),
        NodeData::Condition(d) => json!({ "conditionTargetIds": d.target_ids }),
        NodeData::Outcome(d) => json!({
            "outcomeRewards": d.rewards.iter().map(|r| json!({
                "rewardId": r.reward_id,
                "stableSuccess": r.stable_success,
                "fragmentedSuccess": r.fragmented_success,
                "ghostlySuccess": r.ghostly_success,
            })).collect::<Vec<_>>(),
            "isRemovePlayer": d.is_remove_player,
            "isDialogueConsumed": d.is_dialogue_consumed,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::model::{NodeKind, Reward};
    use crate::graph::ports::{PortDirection, PortKind};
    use crate::graph::vocab::Ego;

    fn port(node_id: u32, direction: PortDirection) -> PortRef {
        PortRef {
            node_id,
            kind: PortKind::Flow,
            direction,
            index: 0,
        }
    }

    #[test]
    fn empty_graph_exports_defaults() {
        let v = to_value(&Graph::new()).unwrap();
        assert_eq!(v["version"], 1);
        assert_eq!(v["startNodeId"], -1);
        assert_eq!(v["globalEgo"], "None");
        assert_eq!(v["nodes"].as_array().unwrap().len(), 0);
        assert_eq!(v["edges"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn outcome_rewards_are_renamed_on_export() {
        let mut g = Graph::new();
        let id = g.create_node(NodeKind::Outcome);
        match &mut g.node_mut(id).unwrap().data {
            NodeData::Outcome(d) => d.rewards.push(Reward {
                reward_id: "gold".into(),
                stable_success: true,
                fragmented_success: true,
                ghostly_success: true,
            }),
            _ => unreachable!(),
        }

        let v = to_value(&g).unwrap();
        let data = &v["nodes"][0]["data"];
        assert_eq!(
            data["outcomeRewards"],
            json!([{
                "rewardId": "gold",
                "stableSuccess": true,
                "fragmentedSuccess": true,
                "ghostlySuccess": true,
            }])
        );
        assert!(data.get("rewards").is_none());
        assert!(data.get("rewardIds").is_none());
        assert_eq!(data["isRemovePlayer"], false);
        assert_eq!(data["isDialogueConsumed"], false);
    }

    #[test]
    fn condition_targets_are_renamed_on_export() {
        let mut g = Graph::new();
        let id = g.create_node(NodeKind::Condition);
        match &mut g.node_mut(id).unwrap().data {
            NodeData::Condition(d) => d.target_ids = vec!["q1".into(), "q2".into()],
            _ => unreachable!(),
        }

        let data = &to_value(&g).unwrap()["nodes"][0]["data"];
        assert_eq!(data["conditionTargetIds"], json!(["q1", "q2"]));
        assert!(data.get("targetIds").is_none());
    }

    #[test]
    fn dialogue_exports_all_variant_fields() {
        let mut g = Graph::new();
        g.create_node(NodeKind::Dialogue);
        let data = &to_value(&g).unwrap()["nodes"][0]["data"];
        for key in [
            "speaker",
            "text",
            "stableText",
            "stableEnd",
            "fragmentedText",
            "fragmentedEnd",
            "ghostlyText",
            "ghostlyEnd",
        ] {
            assert!(data.get(key).is_some(), "missing {key}");
        }
        assert_eq!(data["speaker"], "NPC");
    }

    #[test]
    fn edges_export_wire_directions_without_id() {
        let mut g = Graph::new();
        let a = g.create_node(NodeKind::Dialogue);
        let b = g.create_node(NodeKind::Dialogue);
        g.connect(port(a, PortDirection::Out), port(b, PortDirection::In));

        let edge = &to_value(&g).unwrap()["edges"][0];
        assert_eq!(edge["from"]["direction"], "Output");
        assert_eq!(edge["to"]["direction"], "Input");
        assert_eq!(edge["from"]["nodeId"], a);
        assert_eq!(edge["to"]["nodeId"], b);
        assert_eq!(edge["from"]["index"], 0);
        assert!(edge.get("id").is_none());
    }

    #[test]
    fn graph_scalars_are_exported() {
        let mut g = Graph::new();
        let id = g.create_node(NodeKind::Ego);
        g.start_node_id = Some(id);
        g.global_ego = Ego::Ghostly;

        let v = to_value(&g).unwrap();
        assert_eq!(v["startNodeId"], id);
        assert_eq!(v["globalEgo"], "Ghostly");
    }
}
