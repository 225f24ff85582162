//! The interactive canvas: app state, the event loop, and the routing of
//! mouse and keyboard input into the graph, the gesture controller, and the
//! per-node field editors.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Frame;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Position, Rect};

use crate::commands::check;
use crate::config::{self, Config};
use crate::graph::gesture::{ConnectGesture, GestureOutcome, Point};
use crate::graph::model::{EdgeId, Graph, Node, NodeData, NodeId, Reward, Selection};
use crate::graph::ports::{PortRef, ports_for};
use crate::graph::vocab::Speaker;
use crate::store;
use crate::tui::input::{self, Action, Direction, InputMode};
use crate::tui::render::{self, CanvasView, FieldLine, NODE_WIDTH, Viewport};
use crate::tui::settings::{self, SettingsEvent, SettingsPanelState};

/// Drag threshold in terminal cells — the browser-pixel default is far too
/// coarse for a cell grid.
const CELL_DRAG_THRESHOLD: f64 = 2.0;
/// World units panned per arrow key press.
const PAN_STEP: f64 = 40.0;

const HINTS: &str = "a add · D delete · s start · Tab cycle · w write · o settings · ? help · q quit";

#[derive(Debug, Clone, Copy)]
struct NodeDrag {
    id: NodeId,
    last: (u16, u16),
}

#[derive(Debug, Clone)]
struct TextPrompt {
    title: String,
    buffer: String,
    node_id: NodeId,
    field: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingConfirm {
    DeleteSelected,
    Quit,
}

struct AppState {
    path: PathBuf,
    graph: Graph,
    config: Config,
    viewport: Viewport,
    gesture: ConnectGesture,
    canvas_inner: Rect,
    node_drag: Option<NodeDrag>,
    pan_drag: Option<(u16, u16)>,
    add_menu: bool,
    field_cursor: usize,
    text_prompt: Option<TextPrompt>,
    pending_confirm: Option<PendingConfirm>,
    show_help: bool,
    show_settings: bool,
    settings_state: SettingsPanelState,
    status: Option<String>,
    dirty: bool,
}

pub fn run(file: &Path) -> Result<()> {
    let mut app = AppState::load(file.to_path_buf())?;

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let _guard = TerminalGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    loop {
        terminal.draw(|f| app.draw(f))?;
        if !event::poll(Duration::from_millis(200))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) => {
                if matches!(key.kind, KeyEventKind::Release | KeyEventKind::Repeat) {
                    continue;
                }
                if app.handle_key(key)? {
                    break;
                }
            }
            Event::Mouse(mouse) => app.handle_mouse(mouse),
            _ => {}
        }
    }
    Ok(())
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen, DisableMouseCapture);
    }
}

impl AppState {
    fn load(path: PathBuf) -> Result<Self> {
        let (graph, status, dirty) = if path.exists() {
            let (graph, report) = store::load(&path)?;
            if report.is_clean() {
                (graph, None, false)
            } else {
                // The in-memory graph already differs from disk.
                let summary = check::report_lines(&report).join(" ");
                (graph, Some(summary), true)
            }
        } else {
            (
                Graph::new(),
                Some(format!("new document — will be written to {}", path.display())),
                false,
            )
        };

        Ok(Self {
            path,
            graph,
            config: config::load(),
            viewport: Viewport::default(),
            gesture: ConnectGesture::with_threshold(CELL_DRAG_THRESHOLD),
            canvas_inner: Rect::default(),
            node_drag: None,
            pan_drag: None,
            add_menu: false,
            field_cursor: 0,
            text_prompt: None,
            pending_confirm: None,
            show_help: false,
            show_settings: false,
            settings_state: SettingsPanelState::default(),
            status,
            dirty,
        })
    }

    // -- drawing -----------------------------------------------------------

    fn draw(&mut self, frame: &mut Frame) {
        let inner = {
            let fields = self
                .graph
                .selected_node()
                .map(field_lines)
                .unwrap_or_default();
            let file_label = self
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.path.display().to_string());
            let view = CanvasView {
                graph: &self.graph,
                viewport: self.viewport,
                armed: self.gesture.armed(),
                preview: self.gesture.preview().map(|(p, pt)| (p, (pt.x, pt.y))),
                field_cursor: self.field_cursor,
                fields: &fields,
                hints: HINTS,
                message: self.status.as_deref(),
                file_label: &file_label,
                dirty: self.dirty,
                add_menu: self.add_menu,
            };
            render::draw(frame, &view)
        };
        self.canvas_inner = inner;

        if self.show_help {
            render::draw_help(frame, frame.area());
        }
        if let Some(prompt) = &self.text_prompt {
            render::draw_text_prompt(
                frame,
                frame.area(),
                &prompt.title,
                &prompt.buffer,
                prompt.buffer.chars().count(),
            );
        }
        if let Some(confirm) = &self.pending_confirm {
            let message = match confirm {
                PendingConfirm::DeleteSelected => "Delete the selected item?",
                PendingConfirm::Quit => "Unsaved changes — quit without writing?",
            };
            render::draw_confirm(frame, frame.area(), message);
        }
        if self.show_settings {
            settings::draw(frame, frame.area(), &self.settings_state, &self.config);
        }
    }

    // -- keyboard ----------------------------------------------------------

    fn input_mode(&self) -> InputMode {
        if self.text_prompt.is_some() {
            InputMode::Text
        } else if self.add_menu {
            InputMode::AddNode
        } else {
            InputMode::Normal
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        if self.show_settings {
            match settings::handle_key(key, &mut self.settings_state, &mut self.config) {
                SettingsEvent::Close => self.show_settings = false,
                SettingsEvent::Changed => {
                    if let Err(err) = config::save(&self.config) {
                        self.status = Some(format!("could not save settings: {err:#}"));
                    }
                }
                SettingsEvent::None => {}
            }
            return Ok(false);
        }

        if let Some(confirm) = self.pending_confirm {
            match key.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    self.pending_confirm = None;
                    match confirm {
                        PendingConfirm::DeleteSelected => self.delete_selected(),
                        PendingConfirm::Quit => return Ok(true),
                    }
                }
                KeyCode::Char('n') | KeyCode::Esc => self.pending_confirm = None,
                _ => {}
            }
            return Ok(false);
        }

        match input::action_for_key(key, self.input_mode()) {
            Action::Quit => return self.request_quit(),
            Action::ToggleHelp => self.show_help = !self.show_help,
            Action::Save => self.save(),
            Action::AddNodeMenu => self.add_menu = true,
            Action::AddNode(kind) => {
                self.add_menu = false;
                self.add_node_at_center(kind);
            }
            Action::DeleteSelected => {
                if *self.graph.selection() == Selection::None {
                    self.status = Some("nothing selected".to_string());
                } else if self.config.confirm_delete {
                    self.pending_confirm = Some(PendingConfirm::DeleteSelected);
                } else {
                    self.delete_selected();
                }
            }
            Action::SetStart => self.set_start(),
            Action::NextNode => self.cycle_selection(),
            Action::Pan(direction) => {
                match direction {
                    Direction::Up => self.viewport.y -= PAN_STEP,
                    Direction::Down => self.viewport.y += PAN_STEP,
                    Direction::Left => self.viewport.x -= PAN_STEP,
                    Direction::Right => self.viewport.x += PAN_STEP,
                };
            }
            Action::ZoomIn => self.viewport.zoom_in(),
            Action::ZoomOut => self.viewport.zoom_out(),
            Action::FieldUp => self.move_field_cursor(-1),
            Action::FieldDown => self.move_field_cursor(1),
            Action::FieldPrev => self.adjust_field(false),
            Action::FieldNext => self.adjust_field(true),
            Action::Activate => self.activate_field(),
            Action::OpenSettings => self.show_settings = true,
            Action::Cancel => self.cancel(),
            Action::SubmitText => self.submit_text(),
            Action::Backspace => {
                if let Some(prompt) = &mut self.text_prompt {
                    prompt.buffer.pop();
                }
            }
            Action::InputChar(c) => {
                if let Some(prompt) = &mut self.text_prompt {
                    prompt.buffer.push(c);
                }
            }
            Action::Noop => {}
        }
        Ok(false)
    }

    fn request_quit(&mut self) -> Result<bool> {
        if !self.dirty {
            return Ok(true);
        }
        if self.config.autosave {
            store::save(&self.graph, &self.path)?;
            return Ok(true);
        }
        self.pending_confirm = Some(PendingConfirm::Quit);
        Ok(false)
    }

    fn save(&mut self) {
        match store::save(&self.graph, &self.path) {
            Ok(()) => {
                self.dirty = false;
                self.status = Some(format!("wrote {}", self.path.display()));
            }
            Err(err) => self.status = Some(format!("save failed: {err:#}")),
        }
    }

    fn cancel(&mut self) {
        if self.text_prompt.is_some() {
            self.text_prompt = None;
        } else if self.add_menu {
            self.add_menu = false;
        } else if self.show_help {
            self.show_help = false;
        } else {
            self.gesture.cancel();
            self.graph.clear_selection();
        }
    }

    fn set_start(&mut self) {
        let Selection::Node(id) = *self.graph.selection() else {
            self.status = Some("select a node first".to_string());
            return;
        };
        self.graph.start_node_id = Some(id);
        self.dirty = true;
        self.status = Some(format!("start node set to #{id}"));
    }

    fn delete_selected(&mut self) {
        if self.graph.delete_selected() {
            self.dirty = true;
            self.status = Some("deleted".to_string());
            self.field_cursor = 0;
        }
    }

    fn add_node_at_center(&mut self, kind: crate::graph::model::NodeKind) {
        let id = self.graph.create_node(kind);
        if self.canvas_inner.width > 0 {
            let (wx, wy) = self.viewport.cell_to_world(
                f64::from(self.canvas_inner.width) / 2.0 - f64::from(NODE_WIDTH) / 2.0,
                f64::from(self.canvas_inner.height) / 3.0,
            );
            if let Some(node) = self.graph.node_mut(id) {
                node.x = wx;
                node.y = wy;
            }
        }
        self.field_cursor = 0;
        self.dirty = true;
        self.status = Some(format!("added {kind} #{id}"));
    }

    fn cycle_selection(&mut self) {
        if self.graph.nodes.is_empty() {
            return;
        }
        let next = match self.graph.selection() {
            Selection::Node(id) => {
                let idx = self.graph.nodes.iter().position(|n| n.id == *id);
                let idx = idx.map(|i| (i + 1) % self.graph.nodes.len()).unwrap_or(0);
                self.graph.nodes[idx].id
            }
            _ => self.graph.nodes[0].id,
        };
        self.graph.select_node(next);
        self.field_cursor = 0;
    }

    // -- field editing -----------------------------------------------------

    fn move_field_cursor(&mut self, delta: i32) {
        let Some(node) = self.graph.selected_node() else {
            return;
        };
        let count = field_count(node);
        if count == 0 {
            return;
        }
        let current = self.field_cursor as i32;
        self.field_cursor = (current + delta).clamp(0, count as i32 - 1) as usize;
    }

    fn adjust_field(&mut self, forward: bool) {
        let Selection::Node(id) = *self.graph.selection() else {
            return;
        };
        let cursor = self.field_cursor;
        let mut mirrored_ego = None;
        if let Some(node) = self.graph.node_mut(id) {
            if cycle_field(&mut node.data, cursor, forward) {
                self.dirty = true;
                if let NodeData::Ego(e) = &node.data {
                    mirrored_ego = Some(e.ego);
                }
                let count = field_count(node);
                self.field_cursor = self.field_cursor.min(count.saturating_sub(1));
            }
        }
        // Last-written ego wins the graph-level mirror.
        if let Some(ego) = mirrored_ego {
            self.graph.global_ego = ego;
        }
    }

    fn activate_field(&mut self) {
        let Selection::Node(id) = *self.graph.selection() else {
            return;
        };
        let Some(node) = self.graph.node(id) else {
            return;
        };
        match text_field(node, self.field_cursor) {
            Some((title, current)) => {
                self.text_prompt = Some(TextPrompt {
                    title,
                    buffer: current,
                    node_id: id,
                    field: self.field_cursor,
                });
            }
            // Not a text field: treat Enter as "advance the value".
            None => self.adjust_field(true),
        }
    }

    fn submit_text(&mut self) {
        let Some(prompt) = self.text_prompt.take() else {
            return;
        };
        if let Some(node) = self.graph.node_mut(prompt.node_id) {
            set_text_field(&mut node.data, prompt.field, &prompt.buffer);
            let count = field_count(node);
            self.field_cursor = self.field_cursor.min(count.saturating_sub(1));
            self.dirty = true;
        }
    }

    // -- mouse -------------------------------------------------------------

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let position = Position::new(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if !self.canvas_inner.contains(position) {
                    return;
                }
                let cell = self.to_inner(position);
                match self.hit_test(cell) {
                    Hit::Port(port) => self
                        .gesture
                        .pointer_down(port, Point::new(f64::from(cell.0), f64::from(cell.1))),
                    Hit::NodeTitle(id) => {
                        self.graph.select_node(id);
                        self.field_cursor = 0;
                        self.node_drag = Some(NodeDrag {
                            id,
                            last: (mouse.column, mouse.row),
                        });
                    }
                    Hit::NodeBody(id) => {
                        self.graph.select_node(id);
                        self.field_cursor = 0;
                    }
                    Hit::Edge(id) => self.graph.select_edge(&id),
                    Hit::Empty => {
                        self.graph.clear_selection();
                        self.pan_drag = Some((mouse.column, mouse.row));
                    }
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if self.gesture.is_tracking() {
                    let cell = self.to_inner(position);
                    self.gesture
                        .pointer_move(Point::new(f64::from(cell.0), f64::from(cell.1)));
                } else if let Some(drag) = self.node_drag {
                    let (dx, dy) = (
                        f64::from(mouse.column) - f64::from(drag.last.0),
                        f64::from(mouse.row) - f64::from(drag.last.1),
                    );
                    let (dwx, dwy) = self.viewport.cell_delta_to_world(dx, dy);
                    if let Some(node) = self.graph.node_mut(drag.id) {
                        node.x += dwx;
                        node.y += dwy;
                        self.dirty = true;
                    }
                    self.node_drag = Some(NodeDrag {
                        id: drag.id,
                        last: (mouse.column, mouse.row),
                    });
                } else if let Some(last) = self.pan_drag {
                    let (dx, dy) = (
                        f64::from(mouse.column) - f64::from(last.0),
                        f64::from(mouse.row) - f64::from(last.1),
                    );
                    let (dwx, dwy) = self.viewport.cell_delta_to_world(dx, dy);
                    self.viewport.x -= dwx;
                    self.viewport.y -= dwy;
                    self.pan_drag = Some((mouse.column, mouse.row));
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if self.gesture.is_tracking() {
                    let cell = self.to_inner(position);
                    let port_under = match self.hit_test(cell) {
                        Hit::Port(port) => Some(port),
                        _ => None,
                    };
                    let outcome = self.gesture.pointer_up(&mut self.graph, port_under);
                    self.apply_gesture_outcome(outcome);
                }
                self.node_drag = None;
                self.pan_drag = None;
            }
            MouseEventKind::ScrollUp => self.viewport.zoom_in(),
            MouseEventKind::ScrollDown => self.viewport.zoom_out(),
            _ => {}
        }
    }

    fn apply_gesture_outcome(&mut self, outcome: GestureOutcome) {
        self.status = match outcome {
            GestureOutcome::Connected(_) => {
                self.dirty = true;
                Some("connected".to_string())
            }
            GestureOutcome::Duplicate => Some("already connected".to_string()),
            GestureOutcome::Rejected => Some("incompatible ports".to_string()),
            GestureOutcome::Armed(_) => Some("port armed — tap another to connect".to_string()),
            GestureOutcome::Disarmed => Some("disarmed".to_string()),
            GestureOutcome::Cancelled | GestureOutcome::Idle => None,
        };
    }

    fn to_inner(&self, position: Position) -> (i32, i32) {
        (
            i32::from(position.x) - i32::from(self.canvas_inner.x),
            i32::from(position.y) - i32::from(self.canvas_inner.y),
        )
    }

    fn hit_test(&self, cell: (i32, i32)) -> Hit {
        // Topmost node wins: nodes are drawn in collection order, so scan in
        // reverse. A node's box occludes anything underneath it.
        for node in self.graph.nodes.iter().rev() {
            for descriptor in ports_for(node.kind()) {
                let port = descriptor.on(node.id);
                if render::port_cell(node, &self.viewport, &port) == cell {
                    return Hit::Port(port);
                }
            }
            let (col, row) = render::node_origin(node, &self.viewport);
            let (w, h) = render::node_size(node.kind());
            let inside = cell.0 >= col
                && cell.0 < col + i32::from(w)
                && cell.1 >= row
                && cell.1 < row + i32::from(h);
            if inside {
                return if cell.1 == row {
                    Hit::NodeTitle(node.id)
                } else {
                    Hit::NodeBody(node.id)
                };
            }
        }

        let point = (f64::from(cell.0) + 0.5, f64::from(cell.1) + 0.5);
        for edge in &self.graph.edges {
            let (Some(from_node), Some(to_node)) = (
                self.graph.node(edge.from.node_id),
                self.graph.node(edge.to.node_id),
            ) else {
                continue;
            };
            let a = render::port_cell(from_node, &self.viewport, &edge.from);
            let b = render::port_cell(to_node, &self.viewport, &edge.to);
            let a = (f64::from(a.0) + 0.5, f64::from(a.1) + 0.5);
            let b = (f64::from(b.0) + 0.5, f64::from(b.1) + 0.5);
            if dist_to_segment(point, a, b) <= 0.8 {
                return Hit::Edge(edge.id.clone());
            }
        }
        Hit::Empty
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Hit {
    Port(PortRef),
    NodeTitle(NodeId),
    NodeBody(NodeId),
    Edge(EdgeId),
    Empty,
}

fn dist_to_segment(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (vx, vy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = vx * vx + vy * vy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((p.0 - a.0) * vx + (p.1 - a.1) * vy) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.0 + t * vx, a.1 + t * vy);
    ((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}

// ---------------------------------------------------------------------------
// Per-kind field tables
// ---------------------------------------------------------------------------
// The details panel edits node data through a flat field index. Dialogue
// fields depend on the speaker (player lines carry per-ego variants), and
// outcome fields grow with the reward list, so the tables are computed, not
// declared.

fn field_count(node: &Node) -> usize {
    match &node.data {
        NodeData::Dialogue(d) => {
            if d.speaker == Speaker::Player {
                7
            } else {
                2
            }
        }
        NodeData::Key(_) => 5,
        NodeData::Ego(_) => 1,
        NodeData::Condition(_) => 1,
        NodeData::Outcome(o) => 3 + o.rewards.len() * 3,
    }
}

fn field_lines(node: &Node) -> Vec<FieldLine> {
    fn line(label: impl Into<String>, value: impl Into<String>) -> FieldLine {
        FieldLine {
            label: label.into(),
            value: value.into(),
        }
    }
    fn onoff(value: bool) -> &'static str {
        if value { "yes" } else { "no" }
    }

    match &node.data {
        NodeData::Dialogue(d) => {
            if d.speaker == Speaker::Player {
                vec![
                    line("speaker", d.speaker.as_str()),
                    line("stable", d.stable_text.clone()),
                    line("stable end", onoff(d.stable_end)),
                    line("fragmented", d.fragmented_text.clone()),
                    line("fragm. end", onoff(d.fragmented_end)),
                    line("ghostly", d.ghostly_text.clone()),
                    line("ghostly end", onoff(d.ghostly_end)),
                ]
            } else {
                vec![
                    line("speaker", d.speaker.as_str()),
                    line("text", d.text.clone()),
                ]
            }
        }
        NodeData::Key(k) => vec![
            line("social", k.social.as_str()),
            line("gender", k.gender.as_str()),
            line("ideology", k.ideology.as_str()),
            line("purpose", k.purpose.as_str()),
            line("label", k.label.clone()),
        ],
        NodeData::Ego(e) => vec![line("ego", e.ego.as_str())],
        NodeData::Condition(c) => vec![line("targets", c.target_ids.join(", "))],
        NodeData::Outcome(o) => {
            let mut lines = vec![line("rewards", o.reward_ids().join(", "))];
            for reward in &o.rewards {
                lines.push(line(
                    format!("{} st", short(&reward.reward_id)),
                    onoff(reward.stable_success),
                ));
                lines.push(line(
                    format!("{} fr", short(&reward.reward_id)),
                    onoff(reward.fragmented_success),
                ));
                lines.push(line(
                    format!("{} gh", short(&reward.reward_id)),
                    onoff(reward.ghostly_success),
                ));
            }
            lines.push(line("removes", onoff(o.is_remove_player)));
            lines.push(line("consumes", onoff(o.is_dialogue_consumed)));
            lines
        }
    }
}

fn short(id: &str) -> String {
    if id.chars().count() <= 8 {
        id.to_string()
    } else {
        id.chars().take(8).collect()
    }
}

/// Cycle or toggle a non-text field. Returns whether anything changed.
fn cycle_field(data: &mut NodeData, idx: usize, forward: bool) -> bool {
    match data {
        NodeData::Dialogue(d) => {
            let player = d.speaker == Speaker::Player;
            match (player, idx) {
                (_, 0) => {
                    d.speaker = if forward {
                        d.speaker.next()
                    } else {
                        d.speaker.prev()
                    };
                    true
                }
                (true, 2) => {
                    d.stable_end = !d.stable_end;
                    true
                }
                (true, 4) => {
                    d.fragmented_end = !d.fragmented_end;
                    true
                }
                (true, 6) => {
                    d.ghostly_end = !d.ghostly_end;
                    true
                }
                _ => false,
            }
        }
        NodeData::Key(k) => match idx {
            0 => {
                k.social = if forward { k.social.next() } else { k.social.prev() };
                true
            }
            1 => {
                k.gender = if forward { k.gender.next() } else { k.gender.prev() };
                true
            }
            2 => {
                k.ideology = if forward {
                    k.ideology.next()
                } else {
                    k.ideology.prev()
                };
                true
            }
            3 => {
                k.purpose = if forward {
                    k.purpose.next()
                } else {
                    k.purpose.prev()
                };
                true
            }
            _ => false,
        },
        NodeData::Ego(e) => {
            if idx == 0 {
                e.ego = if forward { e.ego.next() } else { e.ego.prev() };
                true
            } else {
                false
            }
        }
        NodeData::Condition(_) => false,
        NodeData::Outcome(o) => {
            let reward_fields = o.rewards.len() * 3;
            if idx == 0 {
                false
            } else if idx <= reward_fields {
                let reward = &mut o.rewards[(idx - 1) / 3];
                match (idx - 1) % 3 {
                    0 => reward.stable_success = !reward.stable_success,
                    1 => reward.fragmented_success = !reward.fragmented_success,
                    _ => reward.ghostly_success = !reward.ghostly_success,
                }
                true
            } else if idx == reward_fields + 1 {
                o.is_remove_player = !o.is_remove_player;
                true
            } else if idx == reward_fields + 2 {
                o.is_dialogue_consumed = !o.is_dialogue_consumed;
                true
            } else {
                false
            }
        }
    }
}

/// Title and current content when the field is text-editable.
fn text_field(node: &Node, idx: usize) -> Option<(String, String)> {
    match &node.data {
        NodeData::Dialogue(d) => {
            let player = d.speaker == Speaker::Player;
            match (player, idx) {
                (false, 1) => Some(("text".to_string(), d.text.clone())),
                (true, 1) => Some(("stable text".to_string(), d.stable_text.clone())),
                (true, 3) => Some(("fragmented text".to_string(), d.fragmented_text.clone())),
                (true, 5) => Some(("ghostly text".to_string(), d.ghostly_text.clone())),
                _ => None,
            }
        }
        NodeData::Key(k) => (idx == 4).then(|| ("label".to_string(), k.label.clone())),
        NodeData::Ego(_) => None,
        NodeData::Condition(c) => (idx == 0).then(|| {
            (
                "target ids (comma separated)".to_string(),
                c.target_ids.join(", "),
            )
        }),
        NodeData::Outcome(o) => (idx == 0).then(|| {
            (
                "reward ids (comma separated)".to_string(),
                o.reward_ids().join(", "),
            )
        }),
    }
}

fn set_text_field(data: &mut NodeData, idx: usize, text: &str) {
    match data {
        NodeData::Dialogue(d) => {
            let player = d.speaker == Speaker::Player;
            match (player, idx) {
                (false, 1) => d.text = text.to_string(),
                (true, 1) => d.stable_text = text.to_string(),
                (true, 3) => d.fragmented_text = text.to_string(),
                (true, 5) => d.ghostly_text = text.to_string(),
                _ => {}
            }
        }
        NodeData::Key(k) => {
            if idx == 4 {
                k.label = text.to_string();
            }
        }
        NodeData::Ego(_) => {}
        NodeData::Condition(c) => {
            if idx == 0 {
                c.target_ids = parse_id_list(text);
            }
        }
        NodeData::Outcome(o) => {
            if idx == 0 {
                // Keep the flags of rewards that survive the edit; new ids
                // start from the reward defaults.
                let ids = parse_id_list(text);
                let old = std::mem::take(&mut o.rewards);
                o.rewards = ids
                    .into_iter()
                    .map(|id| match old.iter().find(|r| r.reward_id == id) {
                        Some(existing) => existing.clone(),
                        None => Reward::new(id),
                    })
                    .collect();
            }
        }
    }
}

fn parse_id_list(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    text.split(',').map(|s| s.trim().to_string()).collect()
}
