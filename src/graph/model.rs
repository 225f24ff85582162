//! The in-memory dialogue graph: nodes, edges, identity and selection.
//!
//! The graph is an owned aggregate passed by reference into the gesture
//! controller, the serialization layer and the TUI — no ambient statics.
//! Node ids are assigned monotonically and never reused within a session,
//! even across deletions.

use crate::graph::compat;
use crate::graph::ports::{self, PortRef};
use crate::graph::vocab::{Ego, Gender, Ideology, Purpose, Social, Speaker};

pub type NodeId = u32;

/// Edge ids are derived from the endpoint tuple, not random — equal endpoints
/// always yield the same id, which is what duplicate detection keys on.
pub type EdgeId = String;

// ---------------------------------------------------------------------------
// Node kinds and per-kind data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Dialogue,
    Key,
    Ego,
    Condition,
    Outcome,
}

impl NodeKind {
    pub const ALL: &[Self] = &[
        Self::Dialogue,
        Self::Key,
        Self::Ego,
        Self::Condition,
        Self::Outcome,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dialogue => "dialogue",
            Self::Key => "key",
            Self::Ego => "ego",
            Self::Condition => "condition",
            Self::Outcome => "outcome",
        }
    }

    /// Wire-tolerant lookup: trims and lowercases before matching, so a
    /// hand-edited `"Dialogue "` still imports.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dialogue" => Some(Self::Dialogue),
            "key" => Some(Self::Key),
            "ego" => Some(Self::Ego),
            "condition" => Some(Self::Condition),
            "outcome" => Some(Self::Outcome),
            _ => None,
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A spoken line. `text` is used for NPC/Narrator speakers; the three
/// per-ego variants (each with an end-of-dialogue flag) are used when the
/// speaker is the player.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialogueData {
    pub speaker: Speaker,
    pub text: String,
    pub stable_text: String,
    pub stable_end: bool,
    pub fragmented_text: String,
    pub fragmented_end: bool,
    pub ghostly_text: String,
    pub ghostly_end: bool,
}

/// A persona gate: its non-flow outputs qualify whether a dialogue line is
/// visible, they do not sequence the narrative.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyData {
    pub social: Social,
    pub gender: Gender,
    pub ideology: Ideology,
    pub purpose: Purpose,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EgoData {
    pub ego: Ego,
}

/// Branch targets are opaque external identifiers, evaluated by the engine.
/// Order matters and duplicates are allowed; blank ids are kept but count as
/// invalid (see `blank_target_count`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionData {
    pub target_ids: Vec<String>,
}

impl ConditionData {
    pub fn blank_target_count(&self) -> usize {
        self.target_ids
            .iter()
            .filter(|t| t.trim().is_empty())
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reward {
    pub reward_id: String,
    pub stable_success: bool,
    pub fragmented_success: bool,
    pub ghostly_success: bool,
}

impl Reward {
    pub fn new(reward_id: impl Into<String>) -> Self {
        Self {
            reward_id: reward_id.into(),
            stable_success: true,
            fragmented_success: false,
            ghostly_success: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutcomeData {
    pub rewards: Vec<Reward>,
    pub is_remove_player: bool,
    pub is_dialogue_consumed: bool,
}

impl OutcomeData {
    /// The denormalized id mirror of the wire format, derived on demand so it
    /// can never drift out of sync with `rewards`.
    pub fn reward_ids(&self) -> Vec<String> {
        self.rewards.iter().map(|r| r.reward_id.clone()).collect()
    }
}

/// Type-specific node payload. A node owns its data exclusively; only field
/// edits and import normalization write to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Dialogue(DialogueData),
    Key(KeyData),
    Ego(EgoData),
    Condition(ConditionData),
    Outcome(OutcomeData),
}

impl NodeData {
    pub fn default_for(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Dialogue => Self::Dialogue(DialogueData::default()),
            NodeKind::Key => Self::Key(KeyData::default()),
            NodeKind::Ego => Self::Ego(EgoData::default()),
            NodeKind::Condition => Self::Condition(ConditionData::default()),
            NodeKind::Outcome => Self::Outcome(OutcomeData::default()),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Dialogue(_) => NodeKind::Dialogue,
            Self::Key(_) => NodeKind::Key,
            Self::Ego(_) => NodeKind::Ego,
            Self::Condition(_) => NodeKind::Condition,
            Self::Outcome(_) => NodeKind::Outcome,
        }
    }
}

// ---------------------------------------------------------------------------
// Nodes and edges
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
    pub data: NodeData,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }
}

/// A directed connection from an output port to an input port. `from` is
/// always the output side and `to` always the input side, regardless of which
/// port the user interacted with first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub id: EdgeId,
    pub from: PortRef,
    pub to: PortRef,
}

impl Edge {
    pub fn new(from: PortRef, to: PortRef) -> Self {
        Self {
            id: Self::id_for(&from, &to),
            from,
            to,
        }
    }

    pub fn id_for(from: &PortRef, to: &PortRef) -> EdgeId {
        format!(
            "{}:{}:{}->{}:{}:{}",
            from.node_id,
            from.kind.as_str(),
            from.index,
            to.node_id,
            to.kind.as_str(),
            to.index
        )
    }

    fn touches(&self, node_id: NodeId) -> bool {
        self.from.node_id == node_id || self.to.node_id == node_id
    }
}

/// Transient UI state: at most one of node/edge is selected at any time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    Node(NodeId),
    Edge(EdgeId),
}

/// Result of an attempted connection. Both rejection and duplicate are silent
/// no-ops at the model level; the distinction only feeds the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    Connected(EdgeId),
    Duplicate,
    Rejected,
}

// ---------------------------------------------------------------------------
// The graph aggregate
// ---------------------------------------------------------------------------

/// Nodes in insertion order (creation/import order, not id order), edges, the
/// id counter, and the two graph-level scalars of the document.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    next_id: NodeId,
    pub start_node_id: Option<NodeId>,
    pub global_ego: Ego,
    selection: Selection,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            next_id: 1,
            start_node_id: None,
            global_ego: Ego::None,
            selection: Selection::None,
        }
    }

    /// Rebuild the graph wholesale (import path). The id counter resets to
    /// `max(existing ids) + 1`, never below 1, so freshly created nodes can
    /// never collide with loaded ones.
    pub fn from_parts(
        nodes: Vec<Node>,
        edges: Vec<Edge>,
        start_node_id: Option<NodeId>,
        global_ego: Ego,
    ) -> Self {
        let next_id = nodes.iter().map(|n| n.id + 1).max().unwrap_or(1).max(1);
        Self {
            nodes,
            edges,
            next_id,
            start_node_id,
            global_ego,
            selection: Selection::None,
        }
    }

    // -- lookup ------------------------------------------------------------

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Edges leaving a node (it is the `from` endpoint).
    pub fn outgoing(&self, id: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.from.node_id == id)
    }

    // -- mutation ----------------------------------------------------------

    /// Create a node with type-appropriate default data and select it.
    /// Spawn positions stagger so consecutive nodes don't stack exactly.
    pub fn create_node(&mut self, kind: NodeKind) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        let slot = f64::from(id - 1);
        self.nodes.push(Node {
            id,
            x: 120.0 + 42.0 * (slot % 6.0),
            y: 100.0 + 36.0 * (slot % 4.0),
            data: NodeData::default_for(kind),
        });
        self.selection = Selection::Node(id);
        id
    }

    /// Remove a node and every edge touching it. Callers never observe a
    /// dangling edge: the cascade happens in the same call.
    pub fn delete_node(&mut self, id: NodeId) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.id != id);
        if self.nodes.len() == before {
            return false;
        }
        self.edges.retain(|e| !e.touches(id));
        if self.start_node_id == Some(id) {
            self.start_node_id = None;
        }
        match self.selection.clone() {
            Selection::Node(sel) if sel == id => self.selection = Selection::None,
            Selection::Edge(sel) if self.edge(&sel).is_none() => self.selection = Selection::None,
            _ => {}
        }
        true
    }

    pub fn delete_edge(&mut self, id: &str) -> bool {
        let before = self.edges.len();
        self.edges.retain(|e| e.id != id);
        if self.edges.len() == before {
            return false;
        }
        if matches!(&self.selection, Selection::Edge(sel) if sel.as_str() == id) {
            self.selection = Selection::None;
        }
        true
    }

    /// Delete whatever is selected. Edge selection wins when both could
    /// apply, matching the editor's delete button.
    pub fn delete_selected(&mut self) -> bool {
        match self.selection.clone() {
            Selection::Edge(id) => self.delete_edge(&id),
            Selection::Node(id) => self.delete_node(id),
            Selection::None => false,
        }
    }

    /// Validate and create a connection between two ports, in either
    /// interaction order. See `compat` for the rules.
    pub fn connect(&mut self, a: PortRef, b: PortRef) -> ConnectOutcome {
        let Some((from, to)) = compat::normalize(a, b) else {
            return ConnectOutcome::Rejected;
        };
        let (Some(from_node), Some(to_node)) = (self.node(from.node_id), self.node(to.node_id))
        else {
            return ConnectOutcome::Rejected;
        };
        let (from_kind, to_kind) = (from_node.kind(), to_node.kind());
        if !ports::port_exists(from_kind, from.kind, from.direction, from.index)
            || !ports::port_exists(to_kind, to.kind, to.direction, to.index)
        {
            return ConnectOutcome::Rejected;
        }
        if !compat::compatible(from_kind, from.kind, to_kind, to.kind) {
            return ConnectOutcome::Rejected;
        }
        if self.edges.iter().any(|e| e.from == from && e.to == to) {
            return ConnectOutcome::Duplicate;
        }
        let edge = Edge::new(from, to);
        let id = edge.id.clone();
        self.edges.push(edge);
        ConnectOutcome::Connected(id)
    }

    // -- selection ---------------------------------------------------------

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn select_node(&mut self, id: NodeId) {
        if self.contains_node(id) {
            self.selection = Selection::Node(id);
        }
    }

    pub fn select_edge(&mut self, id: &str) {
        if self.edge(id).is_some() {
            self.selection = Selection::Edge(id.to_string());
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::None;
    }

    pub fn selected_node(&self) -> Option<&Node> {
        match &self.selection {
            Selection::Node(id) => self.node(*id),
            _ => None,
        }
    }
}
