//! Which port pairs may be connected.
//!
//! Everything here is pure: direction normalization first, then a closed
//! rule table over (node kind, port kind) pairs. An incompatible pair is not
//! an error anywhere in the editor — the edge simply never appears.

use crate::graph::model::NodeKind;
use crate::graph::ports::{PortDirection, PortKind, PortRef};

/// Orient an arbitrary pair of interacted ports into (output, input) order.
///
/// Returns `None` for the pairings that are rejected before any type rule is
/// consulted: both ports on the same node, or both facing the same direction.
pub fn normalize(a: PortRef, b: PortRef) -> Option<(PortRef, PortRef)> {
    if a.node_id == b.node_id || a.direction == b.direction {
        return None;
    }
    match a.direction {
        PortDirection::Out => Some((a, b)),
        PortDirection::In => Some((b, a)),
    }
}

/// The compatibility table, applied to a normalized (from=out, to=in) pair.
///
/// `flow` is the narrative sequencing channel; a key's non-flow outputs are
/// persona gates that feed a dialogue's (or condition's) flow input to
/// qualify visibility, not to sequence it. Ego nodes expose no connectable
/// ports, so any ego endpoint is rejected outright.
pub fn compatible(
    from_node: NodeKind,
    from_port: PortKind,
    to_node: NodeKind,
    to_port: PortKind,
) -> bool {
    use NodeKind::{Condition, Dialogue, Ego, Key, Outcome};
    use PortKind::Flow;

    if from_node == Ego || to_node == Ego {
        return false;
    }
    // Any flow output may terminate into an outcome.
    if from_port == Flow && to_port == Flow && to_node == Outcome {
        return true;
    }
    match (from_node, from_port, to_node, to_port) {
        (Dialogue, Flow, Dialogue | Key | Condition, Flow) => true,
        (Key, p, Dialogue | Condition, Flow) if p != Flow => true,
        // Both the false (0) and true (1) branch use the same rule row.
        (Condition, Flow, Dialogue | Key | Condition, Flow) => true,
        _ => false,
    }
}
