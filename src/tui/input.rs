use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::graph::model::NodeKind;

/// Which key table is active. Text entry and the add-node menu capture the
/// keyboard wholesale; everything else uses the normal table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Text,
    AddNode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    ToggleHelp,
    Save,
    AddNodeMenu,
    AddNode(NodeKind),
    DeleteSelected,
    SetStart,
    NextNode,
    Pan(Direction),
    ZoomIn,
    ZoomOut,
    FieldUp,
    FieldDown,
    FieldPrev,
    FieldNext,
    Activate,
    OpenSettings,
    Cancel,
    SubmitText,
    Backspace,
    InputChar(char),
    Noop,
}

pub fn action_for_key(key: KeyEvent, mode: InputMode) -> Action {
    match mode {
        InputMode::Text => match key.code {
            KeyCode::Enter => Action::SubmitText,
            KeyCode::Esc => Action::Cancel,
            KeyCode::Backspace => Action::Backspace,
            KeyCode::Char(c) => Action::InputChar(c),
            _ => Action::Noop,
        },
        InputMode::AddNode => match key.code {
            KeyCode::Char('d') => Action::AddNode(NodeKind::Dialogue),
            KeyCode::Char('k') => Action::AddNode(NodeKind::Key),
            KeyCode::Char('e') => Action::AddNode(NodeKind::Ego),
            KeyCode::Char('c') => Action::AddNode(NodeKind::Condition),
            KeyCode::Char('o') => Action::AddNode(NodeKind::Outcome),
            KeyCode::Esc => Action::Cancel,
            _ => Action::Noop,
        },
        InputMode::Normal => match key.code {
            KeyCode::Up => Action::Pan(Direction::Up),
            KeyCode::Down => Action::Pan(Direction::Down),
            KeyCode::Left => Action::Pan(Direction::Left),
            KeyCode::Right => Action::Pan(Direction::Right),
            KeyCode::Enter => Action::Activate,
            KeyCode::Tab => Action::NextNode,
            KeyCode::Esc => Action::Cancel,
            KeyCode::Char('+') => Action::ZoomIn,
            KeyCode::Char('=') if key.modifiers.contains(KeyModifiers::SHIFT) => Action::ZoomIn,
            KeyCode::Char('-') => Action::ZoomOut,
            KeyCode::Char('?') => Action::ToggleHelp,
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Char('w') => Action::Save,
            KeyCode::Char('a') => Action::AddNodeMenu,
            KeyCode::Char('D') => Action::DeleteSelected,
            KeyCode::Char('s') => Action::SetStart,
            KeyCode::Char('o') => Action::OpenSettings,
            KeyCode::Char('k') => Action::FieldUp,
            KeyCode::Char('j') => Action::FieldDown,
            KeyCode::Char('h') => Action::FieldPrev,
            KeyCode::Char('l') => Action::FieldNext,
            _ => Action::Noop,
        },
    }
}
