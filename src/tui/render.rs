//! Drawing the canvas: an edge underlay in braille, node boxes on top, and
//! the details/status chrome around them.
//!
//! All layout math lives in pure functions here (`node_origin`, `port_cell`,
//! `node_size`) so the canvas can hit-test with exactly the geometry that was
//! drawn. Ports are single border cells; the cell *is* the hit region.

use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Line as CanvasLine};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph, Wrap};

use crate::graph::model::{Graph, Node, NodeData, NodeKind, Selection};
use crate::graph::ports::{PortDirection, PortKind, PortRef, ports_for};

pub const DEFAULT_ZOOM: f64 = 0.18;
pub const MIN_ZOOM: f64 = 0.06;
pub const MAX_ZOOM: f64 = 0.50;

/// Terminal cells are roughly twice as tall as wide; vertical world distances
/// shrink by this factor so graphs keep their shape.
const Y_ASPECT: f64 = 0.55;

pub const NODE_WIDTH: u16 = 22;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: DEFAULT_ZOOM,
        }
    }
}

impl Viewport {
    pub fn world_to_cell(&self, wx: f64, wy: f64) -> (i32, i32) {
        (
            ((wx - self.x) * self.zoom).round() as i32,
            ((wy - self.y) * self.zoom * Y_ASPECT).round() as i32,
        )
    }

    pub fn cell_to_world(&self, col: f64, row: f64) -> (f64, f64) {
        (
            col / self.zoom + self.x,
            row / (self.zoom * Y_ASPECT) + self.y,
        )
    }

    /// Convert a cell-space displacement into a world-space one (used for
    /// node dragging and panning).
    pub fn cell_delta_to_world(&self, dcol: f64, drow: f64) -> (f64, f64) {
        (dcol / self.zoom, drow / (self.zoom * Y_ASPECT))
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * 1.25).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / 1.25).max(MIN_ZOOM);
    }
}

// ---------------------------------------------------------------------------
// Node geometry
// ---------------------------------------------------------------------------

pub fn node_size(kind: NodeKind) -> (u16, u16) {
    let height = match kind {
        NodeKind::Dialogue => 4,
        NodeKind::Key => 7,
        NodeKind::Ego => 3,
        NodeKind::Condition => 4,
        NodeKind::Outcome => 4,
    };
    (NODE_WIDTH, height)
}

/// Row of a port within its node box (0 = the top border/title row).
pub fn port_row(kind: NodeKind, port: PortKind, direction: PortDirection, index: u32) -> u16 {
    match (kind, port, direction) {
        (_, PortKind::Flow, PortDirection::In) => 1,
        (NodeKind::Dialogue, PortKind::Flow, PortDirection::Out) => 1,
        (NodeKind::Condition, PortKind::Flow, PortDirection::Out) => 1 + index as u16,
        (NodeKind::Key, PortKind::Social, PortDirection::Out) => 1,
        (NodeKind::Key, PortKind::Gender, PortDirection::Out) => 2,
        (NodeKind::Key, PortKind::Ideology, PortDirection::Out) => 3,
        (NodeKind::Key, PortKind::Purpose, PortDirection::Out) => 4,
        (NodeKind::Key, PortKind::Consumed, PortDirection::Out) => 5,
        _ => 1,
    }
}

/// Top-left cell of a node box, relative to the canvas inner area.
pub fn node_origin(node: &Node, viewport: &Viewport) -> (i32, i32) {
    viewport.world_to_cell(node.x, node.y)
}

/// Cell of one port, relative to the canvas inner area. Inputs sit on the
/// left border, outputs on the right.
pub fn port_cell(node: &Node, viewport: &Viewport, port: &PortRef) -> (i32, i32) {
    let (col, row) = node_origin(node, viewport);
    let x = match port.direction {
        PortDirection::In => col,
        PortDirection::Out => col + i32::from(NODE_WIDTH) - 1,
    };
    (
        x,
        row + i32::from(port_row(node.kind(), port.kind, port.direction, port.index)),
    )
}

// ---------------------------------------------------------------------------
// Drawing
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct CanvasView<'a> {
    pub graph: &'a Graph,
    pub viewport: Viewport,
    pub armed: Option<PortRef>,
    /// Origin port and current pointer cell (inner-relative) while dragging.
    pub preview: Option<(PortRef, (f64, f64))>,
    pub field_cursor: usize,
    pub fields: &'a [FieldLine],
    pub hints: &'a str,
    pub message: Option<&'a str>,
    pub file_label: &'a str,
    pub dirty: bool,
    pub add_menu: bool,
}

/// One row of the details panel, precomputed by the canvas.
#[derive(Debug, Clone)]
pub struct FieldLine {
    pub label: String,
    pub value: String,
}

/// Draw the whole frame and return the canvas inner area (absolute), which
/// the canvas records as the coordinate frame for mouse hit-testing.
pub fn draw(frame: &mut Frame, view: &CanvasView<'_>) -> Rect {
    let [canvas_zone, side_area] =
        Layout::horizontal([Constraint::Min(30), Constraint::Length(34)]).areas(frame.area());
    let [canvas_area, status_area] =
        Layout::vertical([Constraint::Min(5), Constraint::Length(2)]).areas(canvas_zone);

    let mut title_spans = vec![Span::styled(
        format!(
            " dlgedit — {}{} ",
            view.file_label,
            if view.dirty { " *" } else { "" }
        ),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if view.add_menu {
        title_spans.push(Span::styled(
            "[ADD: d/k/e/c/o]",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ));
    }
    let canvas_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(if view.add_menu {
            Color::Green
        } else {
            Color::DarkGray
        }))
        .title(Line::from(title_spans));
    let inner = canvas_block.inner(canvas_area);
    frame.render_widget(canvas_block, canvas_area);

    draw_edges(frame, inner, view);
    draw_nodes(frame, inner, view);
    draw_side_panel(frame, side_area, view);
    draw_status(frame, status_area, view);

    inner
}

fn draw_edges(frame: &mut Frame, inner: Rect, view: &CanvasView<'_>) {
    let selected_edge = match view.graph.selection() {
        Selection::Edge(id) => Some(id.as_str()),
        _ => None,
    };
    let (w, h) = (f64::from(inner.width), f64::from(inner.height));

    let canvas = Canvas::default()
        .marker(symbols::Marker::Braille)
        .x_bounds([0.0, w])
        .y_bounds([0.0, h])
        .paint(|ctx| {
            for edge in &view.graph.edges {
                let (Some(from_node), Some(to_node)) = (
                    view.graph.node(edge.from.node_id),
                    view.graph.node(edge.to.node_id),
                ) else {
                    continue;
                };
                let (x1, y1) = port_cell(from_node, &view.viewport, &edge.from);
                let (x2, y2) = port_cell(to_node, &view.viewport, &edge.to);
                let color = if selected_edge == Some(edge.id.as_str()) {
                    Color::Yellow
                } else if edge.from.kind != PortKind::Flow {
                    Color::Magenta
                } else {
                    Color::Gray
                };
                ctx.draw(&CanvasLine {
                    x1: f64::from(x1) + 0.5,
                    y1: h - (f64::from(y1) + 0.5),
                    x2: f64::from(x2) + 0.5,
                    y2: h - (f64::from(y2) + 0.5),
                    color,
                });
            }

            if let Some((origin, (px, py))) = &view.preview {
                if let Some(node) = view.graph.node(origin.node_id) {
                    let (x1, y1) = port_cell(node, &view.viewport, origin);
                    ctx.draw(&CanvasLine {
                        x1: f64::from(x1) + 0.5,
                        y1: h - (f64::from(y1) + 0.5),
                        x2: *px,
                        y2: h - *py,
                        color: Color::Green,
                    });
                }
            }
        });
    frame.render_widget(canvas, inner);
}

fn draw_nodes(frame: &mut Frame, inner: Rect, view: &CanvasView<'_>) {
    let selected = match view.graph.selection() {
        Selection::Node(id) => Some(*id),
        _ => None,
    };

    for node in &view.graph.nodes {
        let (col, row) = node_origin(node, &view.viewport);
        let (w, h) = node_size(node.kind());
        if col < 0
            || row < 0
            || col + i32::from(w) > i32::from(inner.width)
            || row + i32::from(h) > i32::from(inner.height)
        {
            continue;
        }
        let rect = Rect {
            x: inner.x + col as u16,
            y: inner.y + row as u16,
            width: w,
            height: h,
        };

        let is_selected = selected == Some(node.id);
        let is_start = view.graph.start_node_id == Some(node.id);
        let border_style = if is_selected {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(kind_color(node.kind()))
        };
        let title = format!(
            "{}{} #{}",
            if is_start { "▶" } else { "" },
            node.kind().as_str().to_uppercase(),
            node.id
        );

        frame.render_widget(Clear, rect);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(Span::styled(title, border_style));
        let body = block.inner(rect);
        frame.render_widget(block, rect);
        frame.render_widget(
            Paragraph::new(
                summary_lines(node)
                    .into_iter()
                    .map(Line::from)
                    .collect::<Vec<_>>(),
            ),
            body,
        );

        draw_ports(frame, inner, view, node);
    }
}

fn draw_ports(frame: &mut Frame, inner: Rect, view: &CanvasView<'_>, node: &Node) {
    for descriptor in ports_for(node.kind()) {
        let port = descriptor.on(node.id);
        let (col, row) = port_cell(node, &view.viewport, &port);
        if col < 0 || row < 0 {
            continue;
        }
        let position = Position::new(inner.x + col as u16, inner.y + row as u16);
        if !inner.contains(position) {
            continue;
        }
        let armed = view.armed == Some(port);
        let (glyph, color) = if armed {
            ('●', Color::Yellow)
        } else if port.direction == PortDirection::Out {
            ('○', Color::Green)
        } else {
            ('○', Color::Cyan)
        };
        if let Some(cell) = frame.buffer_mut().cell_mut(position) {
            cell.set_char(glyph).set_fg(color);
        }
    }
}

fn kind_color(kind: NodeKind) -> Color {
    match kind {
        NodeKind::Dialogue => Color::Blue,
        NodeKind::Key => Color::Magenta,
        NodeKind::Ego => Color::LightRed,
        NodeKind::Condition => Color::Yellow,
        NodeKind::Outcome => Color::Green,
    }
}

fn summary_lines(node: &Node) -> Vec<String> {
    let width = usize::from(NODE_WIDTH) - 2;
    match &node.data {
        NodeData::Dialogue(d) => {
            let preview = match d.speaker {
                crate::graph::vocab::Speaker::Player => "per-ego variants".to_string(),
                _ => d.text.clone(),
            };
            vec![
                truncate(&format!("speaker: {}", d.speaker), width),
                truncate(&preview, width),
            ]
        }
        NodeData::Key(k) => vec![
            truncate(&format!("social: {}", k.social), width),
            truncate(&format!("gender: {}", k.gender), width),
            truncate(&format!("ideology: {}", k.ideology), width),
            truncate(&format!("purpose: {}", k.purpose), width),
            truncate(&k.label, width),
        ],
        NodeData::Ego(e) => vec![truncate(&format!("ego: {}", e.ego), width)],
        NodeData::Condition(c) => vec![
            truncate(&format!("false · {} targets", c.target_ids.len()), width),
            "true".to_string(),
        ],
        NodeData::Outcome(o) => vec![
            truncate(&format!("rewards: {}", o.rewards.len()), width),
            truncate(
                &format!(
                    "remove:{} consume:{}",
                    yn(o.is_remove_player),
                    yn(o.is_dialogue_consumed)
                ),
                width,
            ),
        ],
    }
}

fn yn(value: bool) -> &'static str {
    if value { "y" } else { "n" }
}

fn draw_side_panel(frame: &mut Frame, area: Rect, view: &CanvasView<'_>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .padding(Padding::new(1, 1, 0, 0))
        .title(" details ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = Vec::new();
    match view.graph.selection() {
        Selection::Node(id) => {
            if let Some(node) = view.graph.node(*id) {
                lines.push(Line::from(Span::styled(
                    format!("{} #{}", node.kind().as_str().to_uppercase(), node.id),
                    Style::default().add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::default());
                for (idx, field) in view.fields.iter().enumerate() {
                    let style = if idx == view.field_cursor {
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                    };
                    lines.push(Line::from(Span::styled(
                        format!("{:<12} {}", field.label, field.value),
                        style,
                    )));
                }
            }
        }
        Selection::Edge(id) => {
            lines.push(Line::from(Span::styled(
                "EDGE",
                Style::default().add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::default());
            lines.push(Line::from(id.clone()));
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                "[D] delete",
                Style::default().fg(Color::DarkGray),
            )));
        }
        Selection::None => {
            lines.push(Line::from(format!("{} nodes", view.graph.nodes.len())));
            lines.push(Line::from(format!("{} edges", view.graph.edges.len())));
            lines.push(Line::from(format!("ego: {}", view.graph.global_ego)));
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                "click a node, or [a]dd one",
                Style::default().fg(Color::DarkGray),
            )));
        }
    }
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn draw_status(frame: &mut Frame, area: Rect, view: &CanvasView<'_>) {
    let [hint_area, message_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).areas(area);
    frame.render_widget(
        Paragraph::new(Span::styled(view.hints, Style::default().fg(Color::DarkGray))),
        hint_area,
    );
    if let Some(message) = view.message {
        frame.render_widget(
            Paragraph::new(Span::styled(message, Style::default().fg(Color::Yellow))),
            message_area,
        );
    }
}

// ---------------------------------------------------------------------------
// Overlays
// ---------------------------------------------------------------------------

pub fn centered_rect(area: Rect, width_percent: u16, height_percent: u16) -> Rect {
    let vertical = Layout::vertical([
        Constraint::Percentage((100 - height_percent) / 2),
        Constraint::Percentage(height_percent),
        Constraint::Percentage((100 - height_percent) / 2),
    ])
    .flex(Flex::Center)
    .split(area);
    Layout::horizontal([
        Constraint::Percentage((100 - width_percent) / 2),
        Constraint::Percentage(width_percent),
        Constraint::Percentage((100 - width_percent) / 2),
    ])
    .flex(Flex::Center)
    .split(vertical[1])[1]
}

pub fn draw_text_prompt(frame: &mut Frame, area: Rect, title: &str, buffer: &str, cursor: usize) {
    let area = centered_rect(area, 60, 20);
    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .padding(Padding::new(1, 1, 0, 0))
        .title(format!(" {title} — [Enter] apply, [Esc] cancel "));
    frame.render_widget(
        Paragraph::new(line_with_cursor(buffer, cursor)).block(block),
        area,
    );
}

pub fn draw_confirm(frame: &mut Frame, area: Rect, message: &str) {
    let area = centered_rect(area, 50, 16);
    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::LightRed))
        .padding(Padding::new(1, 1, 0, 0))
        .title(" confirm ");
    let lines = vec![
        Line::from(message.to_string()),
        Line::default(),
        Line::from(Span::styled(
            "[y] yes   [n]/[Esc] no",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }).block(block), area);
}

pub fn draw_help(frame: &mut Frame, area: Rect) {
    let area = centered_rect(area, 64, 70);
    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .padding(Padding::new(2, 2, 1, 1))
        .title(" help — [?] close ");
    let lines: Vec<Line> = [
        "mouse      tap a port to arm it, tap another to connect;",
        "           or press and drag between ports",
        "           drag a node title to move it; drag space to pan",
        "a          add node (then d/k/e/c/o)",
        "D          delete selection",
        "s          mark selected node as the start node",
        "Tab        cycle node selection",
        "j/k h/l    move between fields / change field value",
        "Enter      edit text field / toggle flag",
        "arrows     pan    +/- zoom",
        "w          write document    o settings    q quit",
    ]
    .into_iter()
    .map(Line::from)
    .collect();
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn line_with_cursor(text: &str, cursor: usize) -> Line<'static> {
    let caret_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let char_len = text.chars().count();
    let clamped = cursor.min(char_len);
    let split = byte_index_for_cursor(text, clamped);
    let (left, right) = text.split_at(split);

    let mut spans = Vec::new();
    if !left.is_empty() {
        spans.push(Span::raw(left.to_string()));
    }
    spans.push(Span::styled("▌", caret_style));
    if !right.is_empty() {
        spans.push(Span::raw(right.to_string()));
    }
    Line::from(spans)
}

fn byte_index_for_cursor(text: &str, cursor: usize) -> usize {
    text.char_indices()
        .nth(cursor)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let cut: String = text.chars().take(width.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::model::NodeId;

    fn node_at(id: NodeId, kind: NodeKind, x: f64, y: f64) -> Node {
        Node {
            id,
            x,
            y,
            data: NodeData::default_for(kind),
        }
    }

    #[test]
    fn world_cell_round_trip() {
        let viewport = Viewport {
            x: 40.0,
            y: -10.0,
            zoom: 0.2,
        };
        let (wx, wy) = viewport.cell_to_world(12.0, 7.0);
        let (col, row) = viewport.world_to_cell(wx, wy);
        assert_eq!((col, row), (12, 7));
    }

    #[test]
    fn zoom_is_clamped() {
        let mut viewport = Viewport::default();
        for _ in 0..50 {
            viewport.zoom_in();
        }
        assert_eq!(viewport.zoom, MAX_ZOOM);
        for _ in 0..50 {
            viewport.zoom_out();
        }
        assert_eq!(viewport.zoom, MIN_ZOOM);
    }

    #[test]
    fn condition_branch_ports_stack_by_index() {
        assert_eq!(
            port_row(NodeKind::Condition, PortKind::Flow, PortDirection::Out, 0),
            1
        );
        assert_eq!(
            port_row(NodeKind::Condition, PortKind::Flow, PortDirection::Out, 1),
            2
        );
    }

    #[test]
    fn key_ports_fit_inside_the_box() {
        let (_, height) = node_size(NodeKind::Key);
        for descriptor in ports_for(NodeKind::Key) {
            let row = port_row(
                NodeKind::Key,
                descriptor.kind,
                descriptor.direction,
                descriptor.index,
            );
            assert!(row < height - 1, "port row {row} outside box");
        }
    }

    #[test]
    fn ports_sit_on_the_borders() {
        let viewport = Viewport {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        };
        let node = node_at(1, NodeKind::Dialogue, 10.0, 10.0);
        let input = ports_for(NodeKind::Dialogue)[0].on(1);
        let output = ports_for(NodeKind::Dialogue)[1].on(1);
        let (origin_col, _) = node_origin(&node, &viewport);
        assert_eq!(port_cell(&node, &viewport, &input).0, origin_col);
        assert_eq!(
            port_cell(&node, &viewport, &output).0,
            origin_col + i32::from(NODE_WIDTH) - 1
        );
    }

    #[test]
    fn truncate_respects_width() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer sentence", 8), "a longe…");
    }
}
