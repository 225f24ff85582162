//! The connection gesture: one state machine for both connect workflows.
//!
//! A single pointer channel carries two intents — tap-tap (arm a port, tap a
//! second one) and press-drag-release — distinguished by whether the pointer
//! travelled past a small movement threshold before release. The controller
//! is presentation-agnostic: positions arrive in whatever unit the caller
//! measures, and port hit-testing at release time is the caller's job.

use crate::graph::model::{ConnectOutcome, Graph};
use crate::graph::ports::PortRef;

/// Movement (squared-distance compare) past which a press becomes a drag
/// instead of a tap. In browser pixels; cell-based presentations scale it.
pub const DEFAULT_DRAG_THRESHOLD: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn dist_sq(self, other: Self) -> f64 {
        let (dx, dy) = (self.x - other.x, self.y - other.y);
        dx * dx + dy * dy
    }
}

/// What a completed pointer interaction did. Everything except `Connected`
/// leaves the graph untouched; `Rejected`/`Duplicate` are silent no-ops by
/// design, surfaced only so the caller can phrase a status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureOutcome {
    /// No gesture was in progress.
    Idle,
    Armed(PortRef),
    Disarmed,
    Connected(String),
    Duplicate,
    Rejected,
    /// A drag released over empty space (or back on its origin port).
    Cancelled,
}

#[derive(Debug, Clone, Copy)]
struct Press {
    port: PortRef,
    start: Point,
    pos: Point,
    dragging: bool,
}

/// Per-interaction state. At most one gesture is active at a time; an armed
/// port survives between taps but is cancelled the moment a drag begins.
#[derive(Debug)]
pub struct ConnectGesture {
    threshold_sq: f64,
    armed: Option<PortRef>,
    press: Option<Press>,
}

impl Default for ConnectGesture {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectGesture {
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_DRAG_THRESHOLD)
    }

    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold_sq: threshold * threshold,
            armed: None,
            press: None,
        }
    }

    /// Pointer went down on a port: start tracking. Whether this turns out to
    /// be a tap or a drag is decided by subsequent movement.
    pub fn pointer_down(&mut self, port: PortRef, pos: Point) {
        self.press = Some(Press {
            port,
            start: pos,
            pos,
            dragging: false,
        });
    }

    /// Pointer moved. Crossing the threshold commits this press to the drag
    /// path and cancels any lingering tap-arm.
    pub fn pointer_move(&mut self, pos: Point) {
        let Some(press) = &mut self.press else {
            return;
        };
        press.pos = pos;
        if !press.dragging && press.start.dist_sq(pos) > self.threshold_sq {
            press.dragging = true;
            self.armed = None;
        }
    }

    /// Pointer released. `port_under` is the port found by hit-testing the
    /// release position against every port region — only consulted on the
    /// drag path; a tap always acts on the port it went down on.
    pub fn pointer_up(&mut self, graph: &mut Graph, port_under: Option<PortRef>) -> GestureOutcome {
        let Some(press) = self.press.take() else {
            return GestureOutcome::Idle;
        };

        if press.dragging {
            return match port_under {
                Some(target) if target != press.port => {
                    connect_outcome(graph.connect(press.port, target))
                }
                _ => GestureOutcome::Cancelled,
            };
        }

        match self.armed.take() {
            None => {
                self.armed = Some(press.port);
                GestureOutcome::Armed(press.port)
            }
            Some(armed) if armed == press.port => GestureOutcome::Disarmed,
            // A different port was armed: attempt the connection and disarm
            // regardless of how it went.
            Some(armed) => connect_outcome(graph.connect(armed, press.port)),
        }
    }

    /// The live preview endpoint while dragging: the origin port and the
    /// current pointer position, re-evaluated on every move.
    pub fn preview(&self) -> Option<(PortRef, Point)> {
        self.press
            .as_ref()
            .filter(|p| p.dragging)
            .map(|p| (p.port, p.pos))
    }

    pub fn armed(&self) -> Option<PortRef> {
        self.armed
    }

    #[allow(dead_code)] // exercised in tests; the TUI only needs is_tracking
    pub fn is_dragging(&self) -> bool {
        self.press.as_ref().is_some_and(|p| p.dragging)
    }

    /// A press is being tracked (tap or drag not yet resolved).
    pub fn is_tracking(&self) -> bool {
        self.press.is_some()
    }

    /// Abandon whatever is in flight — pure local state reset, nothing to
    /// undo on the graph.
    pub fn cancel(&mut self) {
        self.armed = None;
        self.press = None;
    }
}

fn connect_outcome(result: ConnectOutcome) -> GestureOutcome {
    match result {
        ConnectOutcome::Connected(id) => GestureOutcome::Connected(id),
        ConnectOutcome::Duplicate => GestureOutcome::Duplicate,
        ConnectOutcome::Rejected => GestureOutcome::Rejected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::model::{NodeId, NodeKind};
    use crate::graph::ports::{PortDirection, PortKind};

    fn flow_out(node_id: NodeId) -> PortRef {
        PortRef {
            node_id,
            kind: PortKind::Flow,
            direction: PortDirection::Out,
            index: 0,
        }
    }

    fn flow_in(node_id: NodeId) -> PortRef {
        PortRef {
            node_id,
            kind: PortKind::Flow,
            direction: PortDirection::In,
            index: 0,
        }
    }

    fn two_dialogues() -> (Graph, NodeId, NodeId) {
        let mut g = Graph::new();
        let a = g.create_node(NodeKind::Dialogue);
        let b = g.create_node(NodeKind::Dialogue);
        (g, a, b)
    }

    fn tap(gesture: &mut ConnectGesture, graph: &mut Graph, port: PortRef) -> GestureOutcome {
        gesture.pointer_down(port, Point::new(10.0, 10.0));
        gesture.pointer_up(graph, Some(port))
    }

    #[test]
    fn tap_arms_then_tap_connects() {
        let (mut g, a, b) = two_dialogues();
        let mut gesture = ConnectGesture::new();

        assert_eq!(tap(&mut gesture, &mut g, flow_out(a)), GestureOutcome::Armed(flow_out(a)));
        assert!(matches!(
            tap(&mut gesture, &mut g, flow_in(b)),
            GestureOutcome::Connected(_)
        ));
        assert_eq!(g.edges.len(), 1);
        assert_eq!(gesture.armed(), None);
    }

    #[test]
    fn tapping_armed_port_disarms() {
        let (mut g, a, _) = two_dialogues();
        let mut gesture = ConnectGesture::new();

        tap(&mut gesture, &mut g, flow_out(a));
        assert_eq!(tap(&mut gesture, &mut g, flow_out(a)), GestureOutcome::Disarmed);
        assert_eq!(gesture.armed(), None);
        assert!(g.edges.is_empty());
    }

    #[test]
    fn failed_tap_connect_still_disarms() {
        let (mut g, a, b) = two_dialogues();
        let mut gesture = ConnectGesture::new();

        // out -> out is rejected, but the armed state must clear anyway.
        tap(&mut gesture, &mut g, flow_out(a));
        assert_eq!(tap(&mut gesture, &mut g, flow_out(b)), GestureOutcome::Rejected);
        assert_eq!(gesture.armed(), None);
        assert!(g.edges.is_empty());
    }

    #[test]
    fn drag_connects_to_port_under_release() {
        let (mut g, a, b) = two_dialogues();
        let mut gesture = ConnectGesture::new();

        gesture.pointer_down(flow_out(a), Point::new(0.0, 0.0));
        gesture.pointer_move(Point::new(40.0, 0.0));
        assert!(gesture.is_dragging());
        let (origin, pos) = gesture.preview().unwrap();
        assert_eq!(origin, flow_out(a));
        assert_eq!(pos, Point::new(40.0, 0.0));

        assert!(matches!(
            gesture.pointer_up(&mut g, Some(flow_in(b))),
            GestureOutcome::Connected(_)
        ));
        assert_eq!(g.edges.len(), 1);
        assert_eq!(gesture.preview(), None);
    }

    #[test]
    fn drag_over_empty_space_cancels_silently() {
        let (mut g, a, _) = two_dialogues();
        let mut gesture = ConnectGesture::new();

        gesture.pointer_down(flow_out(a), Point::new(0.0, 0.0));
        gesture.pointer_move(Point::new(25.0, 25.0));
        assert_eq!(gesture.pointer_up(&mut g, None), GestureOutcome::Cancelled);
        assert!(g.edges.is_empty());
        assert_eq!(gesture.armed(), None);
    }

    #[test]
    fn sub_threshold_motion_is_a_tap_not_a_drag() {
        let (mut g, a, b) = two_dialogues();
        let mut gesture = ConnectGesture::new();

        // Wander a little under the threshold, release over a compatible
        // port elsewhere: must arm the pressed port, not connect.
        gesture.pointer_down(flow_out(a), Point::new(0.0, 0.0));
        gesture.pointer_move(Point::new(3.0, 2.0));
        gesture.pointer_move(Point::new(4.0, 4.0));
        assert!(!gesture.is_dragging());
        assert_eq!(
            gesture.pointer_up(&mut g, Some(flow_in(b))),
            GestureOutcome::Armed(flow_out(a))
        );
        assert!(g.edges.is_empty());
    }

    #[test]
    fn threshold_is_combined_squared_distance() {
        let mut gesture = ConnectGesture::new();
        gesture.pointer_down(flow_out(1), Point::new(0.0, 0.0));
        // 5,3 -> 34 < 36: still a tap. One more cell tips it over.
        gesture.pointer_move(Point::new(5.0, 3.0));
        assert!(!gesture.is_dragging());
        gesture.pointer_move(Point::new(5.0, 4.0));
        assert!(gesture.is_dragging());
    }

    #[test]
    fn starting_a_drag_cancels_stale_arm() {
        let (mut g, a, b) = two_dialogues();
        let mut gesture = ConnectGesture::new();

        tap(&mut gesture, &mut g, flow_out(a));
        assert_eq!(gesture.armed(), Some(flow_out(a)));

        gesture.pointer_down(flow_out(b), Point::new(0.0, 0.0));
        gesture.pointer_move(Point::new(50.0, 0.0));
        assert_eq!(gesture.armed(), None);

        // Release over empty space: the old arm must not come back.
        assert_eq!(gesture.pointer_up(&mut g, None), GestureOutcome::Cancelled);
        assert_eq!(gesture.armed(), None);
    }

    #[test]
    fn drag_back_onto_origin_port_is_a_cancel() {
        let (mut g, a, _) = two_dialogues();
        let mut gesture = ConnectGesture::new();

        gesture.pointer_down(flow_out(a), Point::new(0.0, 0.0));
        gesture.pointer_move(Point::new(30.0, 0.0));
        gesture.pointer_move(Point::new(0.0, 0.0));
        assert_eq!(
            gesture.pointer_up(&mut g, Some(flow_out(a))),
            GestureOutcome::Cancelled
        );
    }

    #[test]
    fn duplicate_connection_reports_as_duplicate() {
        let (mut g, a, b) = two_dialogues();
        let mut gesture = ConnectGesture::new();

        tap(&mut gesture, &mut g, flow_out(a));
        tap(&mut gesture, &mut g, flow_in(b));
        tap(&mut gesture, &mut g, flow_out(a));
        assert_eq!(tap(&mut gesture, &mut g, flow_in(b)), GestureOutcome::Duplicate);
        assert_eq!(g.edges.len(), 1);
    }

    #[test]
    fn release_without_press_is_idle() {
        let (mut g, _, _) = two_dialogues();
        let mut gesture = ConnectGesture::new();
        assert_eq!(gesture.pointer_up(&mut g, None), GestureOutcome::Idle);
    }

    #[test]
    fn cancel_resets_everything() {
        let (mut g, a, _) = two_dialogues();
        let mut gesture = ConnectGesture::new();

        tap(&mut gesture, &mut g, flow_out(a));
        gesture.pointer_down(flow_out(a), Point::new(0.0, 0.0));
        gesture.pointer_move(Point::new(50.0, 50.0));
        gesture.cancel();
        assert_eq!(gesture.armed(), None);
        assert_eq!(gesture.preview(), None);
        assert!(!gesture.is_dragging());
    }
}
