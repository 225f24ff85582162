//! Port derivation: which ports a node exposes, computed from its kind alone.
//!
//! Ports are not stored anywhere — they exist exactly as long as their owning
//! node and are fully determined by its kind. The presentation layer maps
//! these descriptors to screen positions, never the other way around.

use crate::graph::model::{NodeId, NodeKind};

/// Connection channel carried by a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortKind {
    /// Primary narrative sequencing channel.
    Flow,
    Social,
    Gender,
    Ideology,
    Purpose,
    Consumed,
}

impl PortKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flow => "flow",
            Self::Social => "social",
            Self::Gender => "gender",
            Self::Ideology => "ideology",
            Self::Purpose => "purpose",
            Self::Consumed => "consumed",
        }
    }

    /// Wire-tolerant lookup: trims and lowercases before matching.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flow" => Some(Self::Flow),
            "social" => Some(Self::Social),
            "gender" => Some(Self::Gender),
            "ideology" => Some(Self::Ideology),
            "purpose" => Some(Self::Purpose),
            "consumed" => Some(Self::Consumed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortDirection {
    In,
    Out,
}

impl PortDirection {
    /// The spelling used in exported documents ("Input"/"Output").
    pub fn wire_str(self) -> &'static str {
        match self {
            Self::In => "Input",
            Self::Out => "Output",
        }
    }

    /// Accepts both the wire spellings and the short in/out forms.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in" | "input" => Some(Self::In),
            "out" | "output" => Some(Self::Out),
            _ => None,
        }
    }
}

/// A fully-qualified reference to one port of one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortRef {
    pub node_id: NodeId,
    pub kind: PortKind,
    pub direction: PortDirection,
    pub index: u32,
}

/// One port slot in a node kind's layout. `index` disambiguates multiple
/// same-kind same-direction ports (condition's false/true flow outputs).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortDescriptor {
    pub kind: PortKind,
    pub direction: PortDirection,
    pub index: u32,
}

impl PortDescriptor {
    pub const fn new(kind: PortKind, direction: PortDirection, index: u32) -> Self {
        Self {
            kind,
            direction,
            index,
        }
    }

    pub fn on(self, node_id: NodeId) -> PortRef {
        PortRef {
            node_id,
            kind: self.kind,
            direction: self.direction,
            index: self.index,
        }
    }
}

use PortDirection::{In, Out};
use PortKind::{Consumed, Flow, Gender, Ideology, Purpose, Social};

const DIALOGUE_PORTS: &[PortDescriptor] = &[
    PortDescriptor::new(Flow, In, 0),
    PortDescriptor::new(Flow, Out, 0),
];

const KEY_PORTS: &[PortDescriptor] = &[
    PortDescriptor::new(Flow, In, 0),
    PortDescriptor::new(Social, Out, 0),
    PortDescriptor::new(Gender, Out, 0),
    PortDescriptor::new(Ideology, Out, 0),
    PortDescriptor::new(Purpose, Out, 0),
    PortDescriptor::new(Consumed, Out, 0),
];

// index 0 = false branch, index 1 = true branch.
const CONDITION_PORTS: &[PortDescriptor] = &[
    PortDescriptor::new(Flow, In, 0),
    PortDescriptor::new(Flow, Out, 0),
    PortDescriptor::new(Flow, Out, 1),
];

const OUTCOME_PORTS: &[PortDescriptor] = &[PortDescriptor::new(Flow, In, 0)];

/// All ports a node of the given kind exposes. Ego nodes expose none: their
/// value is global state, not something other nodes wire into.
pub fn ports_for(kind: NodeKind) -> &'static [PortDescriptor] {
    match kind {
        NodeKind::Dialogue => DIALOGUE_PORTS,
        NodeKind::Key => KEY_PORTS,
        NodeKind::Ego => &[],
        NodeKind::Condition => CONDITION_PORTS,
        NodeKind::Outcome => OUTCOME_PORTS,
    }
}

/// Whether a port structurally exists on a node of the given kind.
pub fn port_exists(node: NodeKind, kind: PortKind, direction: PortDirection, index: u32) -> bool {
    ports_for(node)
        .iter()
        .any(|p| p.kind == kind && p.direction == direction && p.index == index)
}
