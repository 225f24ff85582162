//! External JSON document -> graph, defensively.
//!
//! Documents arrive untrusted: hand-edited, produced by older builds, or
//! truncated. The policy is two-tier — a document that is not an object or
//! has no `nodes` array aborts the import (the live graph is replaced only
//! after the whole document parsed), while an individually malformed node or
//! edge is dropped and counted, never fatal. Every field the editor or the
//! export path touches exists after load; nothing is left absent.

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};

use crate::graph::model::{
    ConditionData, DialogueData, Edge, EgoData, Graph, KeyData, Node, NodeData, NodeId, NodeKind,
    OutcomeData, Reward,
};
use crate::graph::ports::{self, PortDirection, PortKind, PortRef};
use crate::graph::vocab::{Ego, Gender, Ideology, Purpose, Social, Speaker};

/// What normalization had to do. `check` and `migrate` report from this; a
/// clean report means the document round-trips byte-for-byte semantics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    /// Nodes too malformed to normalize (or carrying a duplicate id).
    pub dropped_nodes: usize,
    /// Edges missing endpoints, referencing unknown nodes/ports, or
    /// duplicating an earlier edge.
    pub dropped_edges: usize,
    /// Outcome nodes whose flat legacy success flags were migrated into
    /// structured per-reward entries.
    pub migrated_outcomes: usize,
    /// `startNodeId` referenced a node that is not in the document.
    pub reset_start_node: bool,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

pub fn from_str(text: &str) -> Result<(Graph, ImportReport)> {
    let value: Value = serde_json::from_str(text).context("document is not valid JSON")?;
    from_value(&value)
}

pub fn from_value(doc: &Value) -> Result<(Graph, ImportReport)> {
    let Some(obj) = doc.as_object() else {
        bail!("document is not a JSON object");
    };
    let Some(raw_nodes) = obj.get("nodes").and_then(Value::as_array) else {
        bail!("document has no nodes array");
    };

    let mut report = ImportReport::default();

    let mut nodes: Vec<Node> = Vec::with_capacity(raw_nodes.len());
    for raw in raw_nodes {
        match parse_node(raw, &mut report) {
            Some(node) if nodes.iter().any(|n| n.id == node.id) => report.dropped_nodes += 1,
            Some(node) => nodes.push(node),
            None => report.dropped_nodes += 1,
        }
    }

    // A missing edges array is an old-but-valid document, not an error.
    let raw_edges = obj
        .get("edges")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    let mut edges: Vec<Edge> = Vec::with_capacity(raw_edges.len());
    for raw in raw_edges {
        match parse_edge(raw, &nodes) {
            Some(edge) if edges.iter().any(|e| e.from == edge.from && e.to == edge.to) => {
                report.dropped_edges += 1;
            }
            Some(edge) => edges.push(edge),
            None => report.dropped_edges += 1,
        }
    }

    let start_node_id = match obj.get("startNodeId").and_then(Value::as_i64) {
        Some(id) if id >= 1 => {
            let id = NodeId::try_from(id).ok().filter(|id| nodes.iter().any(|n| n.id == *id));
            if id.is_none() {
                report.reset_start_node = true;
            }
            id
        }
        _ => None,
    };

    let global_ego = obj
        .get("globalEgo")
        .and_then(Value::as_str)
        .map(Ego::parse_or_default)
        .unwrap_or_default();

    Ok((
        Graph::from_parts(nodes, edges, start_node_id, global_ego),
        report,
    ))
}

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

fn parse_node(raw: &Value, report: &mut ImportReport) -> Option<Node> {
    let obj = raw.as_object()?;
    let id = obj.get("id").and_then(Value::as_u64)?;
    let id = NodeId::try_from(id).ok().filter(|id| *id >= 1)?;
    let kind = NodeKind::parse(obj.get("type").and_then(Value::as_str)?)?;

    let empty = Map::new();
    let data = obj.get("data").and_then(Value::as_object).unwrap_or(&empty);
    let data = match kind {
        NodeKind::Dialogue => NodeData::Dialogue(dialogue_data(data)),
        NodeKind::Key => NodeData::Key(key_data(data)),
        NodeKind::Ego => NodeData::Ego(EgoData {
            ego: enum_field(data, "ego", Ego::parse_or_default),
        }),
        NodeKind::Condition => NodeData::Condition(condition_data(data)),
        NodeKind::Outcome => NodeData::Outcome(outcome_data(data, report)),
    };

    Some(Node {
        id,
        x: f64_field(obj, "x"),
        y: f64_field(obj, "y"),
        data,
    })
}

fn dialogue_data(data: &Map<String, Value>) -> DialogueData {
    DialogueData {
        speaker: enum_field(data, "speaker", Speaker::parse_or_default),
        text: str_field(data, "text"),
        stable_text: str_field(data, "stableText"),
        stable_end: bool_field(data, "stableEnd"),
        fragmented_text: str_field(data, "fragmentedText"),
        fragmented_end: bool_field(data, "fragmentedEnd"),
        ghostly_text: str_field(data, "ghostlyText"),
        ghostly_end: bool_field(data, "ghostlyEnd"),
    }
}

fn key_data(data: &Map<String, Value>) -> KeyData {
    KeyData {
        social: enum_field(data, "social", Social::parse_or_default),
        gender: enum_field(data, "gender", Gender::parse_or_default),
        ideology: enum_field(data, "ideology", Ideology::parse_or_default),
        purpose: enum_field(data, "purpose", Purpose::parse_or_default),
        label: str_field(data, "label"),
    }
}

fn condition_data(data: &Map<String, Value>) -> ConditionData {
    // The wire name wins; the internal name is accepted from hand-edited
    // documents that copied the editor's state instead of an export.
    let targets = data
        .get("conditionTargetIds")
        .or_else(|| data.get("targetIds"))
        .and_then(Value::as_array);
    ConditionData {
        target_ids: targets
            .map(|arr| {
                arr.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
    }
}

fn outcome_data(data: &Map<String, Value>, report: &mut ImportReport) -> OutcomeData {
    let mut rewards: Vec<Reward> = data
        .get("outcomeRewards")
        .or_else(|| data.get("rewards"))
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(reward_entry).collect())
        .unwrap_or_default();

    // Legacy schema: one flat set of success flags beside a flat rewardIds
    // array. Synthesize a structured entry per id, applying the flags
    // uniformly, then the flat fields are gone for good — the structured
    // array is the sole source of truth from here on.
    if rewards.is_empty() {
        let legacy_ids: Vec<&str> = data
            .get("rewardIds")
            .and_then(Value::as_array)
            .map(|arr| arr.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        let has_legacy_flag = ["stableSuccess", "fragmentedSuccess", "ghostlySuccess"]
            .iter()
            .any(|k| data.contains_key(*k));
        if !legacy_ids.is_empty() && has_legacy_flag {
            let stable = data
                .get("stableSuccess")
                .and_then(Value::as_bool)
                .unwrap_or(true);
            let fragmented = bool_field(data, "fragmentedSuccess");
            let ghostly = bool_field(data, "ghostlySuccess");
            rewards = legacy_ids
                .into_iter()
                .map(|id| Reward {
                    reward_id: id.to_string(),
                    stable_success: stable,
                    fragmented_success: fragmented,
                    ghostly_success: ghostly,
                })
                .collect();
            report.migrated_outcomes += 1;
        }
    }

    OutcomeData {
        rewards,
        is_remove_player: bool_field(data, "isRemovePlayer"),
        is_dialogue_consumed: bool_field(data, "isDialogueConsumed"),
    }
}

fn reward_entry(raw: &Value) -> Option<Reward> {
    let obj = raw.as_object()?;
    Some(Reward {
        reward_id: str_field(obj, "rewardId"),
        stable_success: bool_field(obj, "stableSuccess"),
        fragmented_success: bool_field(obj, "fragmentedSuccess"),
        ghostly_success: bool_field(obj, "ghostlySuccess"),
    })
}

// ---------------------------------------------------------------------------
// Edges
// ---------------------------------------------------------------------------

fn parse_edge(raw: &Value, nodes: &[Node]) -> Option<Edge> {
    let obj = raw.as_object()?;
    let from = endpoint(obj.get("from")?, PortDirection::Out)?;
    let to = endpoint(obj.get("to")?, PortDirection::In)?;
    if from.direction != PortDirection::Out || to.direction != PortDirection::In {
        return None;
    }

    // Both endpoints must name loaded nodes with structurally existing ports;
    // anything else would be a dangling edge the moment it materialized.
    for port in [&from, &to] {
        let node = nodes.iter().find(|n| n.id == port.node_id)?;
        if !ports::port_exists(node.kind(), port.kind, port.direction, port.index) {
            return None;
        }
    }

    // The id, if the document carried one, is not trusted: it is always
    // rederived from the endpoint tuple.
    Some(Edge::new(from, to))
}

fn endpoint(raw: &Value, slot: PortDirection) -> Option<PortRef> {
    let obj = raw.as_object()?;
    let node_id = obj.get("nodeId").and_then(Value::as_u64)?;
    Some(PortRef {
        node_id: NodeId::try_from(node_id).ok()?,
        kind: PortKind::parse(obj.get("kind").and_then(Value::as_str)?)?,
        // Absent direction is trusted to match the slot ("from" is the
        // output side by construction).
        direction: obj
            .get("direction")
            .and_then(Value::as_str)
            .map_or(Some(slot), PortDirection::parse)?,
        // Documents created before multi-index ports existed carry none.
        index: obj
            .get("index")
            .and_then(Value::as_u64)
            .map_or(Some(0), |i| u32::try_from(i).ok())?,
    })
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

fn str_field(data: &Map<String, Value>, key: &str) -> String {
    data.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn bool_field(data: &Map<String, Value>, key: &str) -> bool {
    data.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn f64_field(data: &Map<String, Value>, key: &str) -> f64 {
    data.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

fn enum_field<T>(data: &Map<String, Value>, key: &str, parse: fn(&str) -> T) -> T
where
    T: Default,
{
    data.get(key)
        .and_then(Value::as_str)
        .map(parse)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::export;
    use crate::graph::model::ConnectOutcome;
    use serde_json::json;

    fn import(doc: Value) -> (Graph, ImportReport) {
        from_value(&doc).expect("import failed")
    }

    #[test]
    fn rejects_non_object_documents() {
        assert!(from_value(&json!([1, 2, 3])).is_err());
        assert!(from_value(&json!("nope")).is_err());
    }

    #[test]
    fn rejects_documents_without_nodes_array() {
        assert!(from_value(&json!({ "edges": [] })).is_err());
        assert!(from_value(&json!({ "nodes": 7 })).is_err());
    }

    #[test]
    fn missing_edges_array_is_fine() {
        let (g, report) = import(json!({ "nodes": [] }));
        assert!(g.edges.is_empty());
        assert!(report.is_clean());
    }

    #[test]
    fn type_strings_are_trimmed_and_lowercased() {
        let (g, _) = import(json!({
            "nodes": [{ "id": 1, "type": " Dialogue ", "x": 1.0, "y": 2.0 }],
        }));
        assert_eq!(g.nodes[0].kind(), NodeKind::Dialogue);
    }

    #[test]
    fn missing_data_takes_creation_defaults() {
        let (g, _) = import(json!({
            "nodes": [
                { "id": 1, "type": "dialogue", "x": 0, "y": 0 },
                { "id": 2, "type": "key", "x": 0, "y": 0, "data": {} },
            ],
        }));
        match &g.nodes[0].data {
            NodeData::Dialogue(d) => {
                assert_eq!(d.speaker, Speaker::NPC);
                assert_eq!(d.text, "");
                assert!(!d.ghostly_end);
            }
            other => panic!("unexpected data: {other:?}"),
        }
        match &g.nodes[1].data {
            NodeData::Key(k) => {
                assert_eq!(k.social, Social::None);
                assert_eq!(k.label, "");
            }
            other => panic!("unexpected data: {other:?}"),
        }
    }

    #[test]
    fn malformed_nodes_are_dropped_not_fatal() {
        let (g, report) = import(json!({
            "nodes": [
                "not an object",
                { "type": "dialogue" },          // no id
                { "id": 0, "type": "dialogue" }, // id below 1
                { "id": 3, "type": "wizard" },   // unknown type
                { "id": 4, "type": "ego" },
            ],
        }));
        assert_eq!(g.nodes.len(), 1);
        assert_eq!(g.nodes[0].id, 4);
        assert_eq!(report.dropped_nodes, 4);
    }

    #[test]
    fn duplicate_node_ids_keep_the_first() {
        let (g, report) = import(json!({
            "nodes": [
                { "id": 1, "type": "dialogue" },
                { "id": 1, "type": "key" },
            ],
        }));
        assert_eq!(g.nodes.len(), 1);
        assert_eq!(g.nodes[0].kind(), NodeKind::Dialogue);
        assert_eq!(report.dropped_nodes, 1);
    }

    #[test]
    fn condition_wire_name_is_copied_into_target_ids() {
        let (g, _) = import(json!({
            "nodes": [{
                "id": 1, "type": "condition", "x": 0, "y": 0,
                "data": { "conditionTargetIds": ["a", "", "a"] },
            }],
        }));
        match &g.nodes[0].data {
            NodeData::Condition(c) => assert_eq!(c.target_ids, vec!["a", "", "a"]),
            other => panic!("unexpected data: {other:?}"),
        }
    }

    #[test]
    fn structured_outcome_rewards_are_expanded() {
        let (g, report) = import(json!({
            "nodes": [{
                "id": 1, "type": "outcome", "x": 0, "y": 0,
                "data": {
                    "outcomeRewards": [
                        { "rewardId": "gold", "stableSuccess": true },
                        { "rewardId": "ash", "ghostlySuccess": true },
                        "garbage entry",
                    ],
                    "isRemovePlayer": true,
                },
            }],
        }));
        let NodeData::Outcome(o) = &g.nodes[0].data else {
            panic!("expected outcome data");
        };
        assert_eq!(o.rewards.len(), 2);
        assert_eq!(o.reward_ids(), vec!["gold", "ash"]);
        assert!(o.rewards[0].stable_success);
        assert!(!o.rewards[0].ghostly_success);
        assert!(o.rewards[1].ghostly_success);
        assert!(o.is_remove_player);
        assert!(!o.is_dialogue_consumed);
        assert_eq!(report.migrated_outcomes, 0);
    }

    #[test]
    fn legacy_flat_flags_migrate_to_structured_rewards() {
        let (g, report) = import(json!({
            "nodes": [{
                "id": 1, "type": "outcome", "x": 0, "y": 0,
                "data": {
                    "rewardIds": ["r1", "r2"],
                    "stableSuccess": true,
                    "fragmentedSuccess": false,
                    "ghostlySuccess": false,
                },
            }],
        }));
        let NodeData::Outcome(o) = &g.nodes[0].data else {
            panic!("expected outcome data");
        };
        assert_eq!(o.rewards.len(), 2);
        for (reward, id) in o.rewards.iter().zip(["r1", "r2"]) {
            assert_eq!(reward.reward_id, id);
            assert!(reward.stable_success);
            assert!(!reward.fragmented_success);
            assert!(!reward.ghostly_success);
        }
        assert_eq!(report.migrated_outcomes, 1);

        // The legacy flags must be gone from the re-exported document.
        let v = export::to_value(&g).unwrap();
        let data = &v["nodes"][0]["data"];
        assert!(data.get("stableSuccess").is_none());
        assert!(data.get("rewardIds").is_none());
        assert_eq!(data["outcomeRewards"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn legacy_migration_defaults_absent_flags() {
        // Only ghostlySuccess present: stable defaults true, fragmented false.
        let (g, _) = import(json!({
            "nodes": [{
                "id": 1, "type": "outcome",
                "data": { "rewardIds": ["r1"], "ghostlySuccess": true },
            }],
        }));
        let NodeData::Outcome(o) = &g.nodes[0].data else {
            panic!("expected outcome data");
        };
        assert!(o.rewards[0].stable_success);
        assert!(!o.rewards[0].fragmented_success);
        assert!(o.rewards[0].ghostly_success);
    }

    #[test]
    fn reward_ids_without_flags_do_not_migrate() {
        let (g, report) = import(json!({
            "nodes": [{
                "id": 1, "type": "outcome",
                "data": { "rewardIds": ["r1"] },
            }],
        }));
        let NodeData::Outcome(o) = &g.nodes[0].data else {
            panic!("expected outcome data");
        };
        assert!(o.rewards.is_empty());
        assert_eq!(report.migrated_outcomes, 0);
    }

    #[test]
    fn edges_regenerate_ids_and_default_indices() {
        let (g, report) = import(json!({
            "nodes": [
                { "id": 1, "type": "dialogue" },
                { "id": 2, "type": "dialogue" },
            ],
            "edges": [{
                "from": { "nodeId": 1, "kind": "flow", "direction": "Output" },
                "to": { "nodeId": 2, "kind": "flow", "direction": "Input" },
            }],
        }));
        assert_eq!(report.dropped_edges, 0);
        assert_eq!(g.edges[0].from.index, 0);
        assert_eq!(g.edges[0].id, "1:flow:0->2:flow:0");
    }

    #[test]
    fn edges_missing_direction_trust_their_slot() {
        let (g, _) = import(json!({
            "nodes": [
                { "id": 1, "type": "dialogue" },
                { "id": 2, "type": "outcome" },
            ],
            "edges": [{
                "from": { "nodeId": 1, "kind": "flow" },
                "to": { "nodeId": 2, "kind": "flow" },
            }],
        }));
        assert_eq!(g.edges.len(), 1);
        assert_eq!(g.edges[0].from.direction, PortDirection::Out);
        assert_eq!(g.edges[0].to.direction, PortDirection::In);
    }

    #[test]
    fn dangling_and_structurally_impossible_edges_are_dropped() {
        let (g, report) = import(json!({
            "nodes": [
                { "id": 1, "type": "dialogue" },
                { "id": 2, "type": "key" },
            ],
            "edges": [
                // Unknown node.
                { "from": { "nodeId": 9, "kind": "flow" }, "to": { "nodeId": 1, "kind": "flow" } },
                // Key has no flow output.
                { "from": { "nodeId": 2, "kind": "flow" }, "to": { "nodeId": 1, "kind": "flow" } },
                // Missing endpoints entirely.
                { "to": { "nodeId": 1, "kind": "flow" } },
                "garbage",
            ],
        }));
        assert!(g.edges.is_empty());
        assert_eq!(report.dropped_edges, 4);
    }

    #[test]
    fn duplicate_edges_collapse_to_one() {
        let edge = json!({
            "from": { "nodeId": 1, "kind": "flow" },
            "to": { "nodeId": 2, "kind": "flow" },
        });
        let (g, report) = import(json!({
            "nodes": [
                { "id": 1, "type": "dialogue" },
                { "id": 2, "type": "dialogue" },
            ],
            "edges": [edge.clone(), edge],
        }));
        assert_eq!(g.edges.len(), 1);
        assert_eq!(report.dropped_edges, 1);
    }

    #[test]
    fn stale_start_node_is_reset() {
        let (g, report) = import(json!({
            "startNodeId": 42,
            "nodes": [{ "id": 1, "type": "dialogue" }],
        }));
        assert_eq!(g.start_node_id, None);
        assert!(report.reset_start_node);

        let (g, report) = import(json!({
            "startNodeId": 1,
            "nodes": [{ "id": 1, "type": "dialogue" }],
        }));
        assert_eq!(g.start_node_id, Some(1));
        assert!(!report.reset_start_node);

        let (g, report) = import(json!({ "startNodeId": -1, "nodes": [] }));
        assert_eq!(g.start_node_id, None);
        assert!(!report.reset_start_node);
    }

    #[test]
    fn unknown_global_ego_defaults() {
        let (g, _) = import(json!({ "globalEgo": "Shattered", "nodes": [] }));
        assert_eq!(g.global_ego, Ego::None);
        let (g, _) = import(json!({ "globalEgo": "Fragmented", "nodes": [] }));
        assert_eq!(g.global_ego, Ego::Fragmented);
    }

    #[test]
    fn counter_resumes_past_loaded_ids() {
        let (mut g, _) = import(json!({
            "nodes": [
                { "id": 3, "type": "dialogue" },
                { "id": 7, "type": "key" },
            ],
        }));
        assert_eq!(g.create_node(NodeKind::Ego), 8);
    }

    #[test]
    fn every_kind_round_trips_through_export_and_import() {
        let mut g = Graph::new();
        for &kind in NodeKind::ALL {
            g.create_node(kind);
        }
        let exported = export::to_value(&g).unwrap();
        let (reloaded, report) = import(exported);
        assert!(report.is_clean());
        for (a, b) in g.nodes.iter().zip(reloaded.nodes.iter()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.data, b.data);
        }
    }

    #[test]
    fn export_import_export_is_idempotent() {
        let mut g = Graph::new();
        let a = g.create_node(NodeKind::Dialogue);
        let key = g.create_node(NodeKind::Key);
        let cond = g.create_node(NodeKind::Condition);
        let out = g.create_node(NodeKind::Outcome);
        g.start_node_id = Some(a);
        g.global_ego = Ego::Stable;
        let social_out = PortRef {
            node_id: key,
            kind: PortKind::Social,
            direction: PortDirection::Out,
            index: 0,
        };
        let flow_in = |node_id| PortRef {
            node_id,
            kind: PortKind::Flow,
            direction: PortDirection::In,
            index: 0,
        };
        let flow_out = |node_id, index| PortRef {
            node_id,
            kind: PortKind::Flow,
            direction: PortDirection::Out,
            index,
        };
        assert!(matches!(
            g.connect(social_out, flow_in(a)),
            ConnectOutcome::Connected(_)
        ));
        assert!(matches!(
            g.connect(flow_out(cond, 1), flow_in(out)),
            ConnectOutcome::Connected(_)
        ));

        let first = export::to_value(&g).unwrap();
        let (reloaded, report) = import(first.clone());
        assert!(report.is_clean());
        let second = export::to_value(&reloaded).unwrap();
        assert_eq!(first, second);
    }
}
