use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph};

use crate::config::Config;
use crate::tui::render::centered_rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsEvent {
    None,
    Changed,
    Close,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SettingsPanelState {
    pub selected_row: usize,
}

const SETTINGS_ROW_COUNT: usize = 2;

pub fn handle_key(
    key: KeyEvent,
    state: &mut SettingsPanelState,
    config: &mut Config,
) -> SettingsEvent {
    match key.code {
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('q') => SettingsEvent::Close,
        KeyCode::Up | KeyCode::Char('k') => {
            state.selected_row = state.selected_row.saturating_sub(1);
            SettingsEvent::None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            state.selected_row = (state.selected_row + 1).min(SETTINGS_ROW_COUNT - 1);
            SettingsEvent::None
        }
        KeyCode::Left
        | KeyCode::Right
        | KeyCode::Char('h')
        | KeyCode::Char('l')
        | KeyCode::Enter
        | KeyCode::Char(' ') => toggle(config, state.selected_row),
        _ => SettingsEvent::None,
    }
}

fn toggle(config: &mut Config, row: usize) -> SettingsEvent {
    match row {
        0 => config.autosave = !config.autosave,
        1 => config.confirm_delete = !config.confirm_delete,
        _ => return SettingsEvent::None,
    }
    SettingsEvent::Changed
}

pub fn draw(frame: &mut Frame, area: Rect, state: &SettingsPanelState, config: &Config) {
    let area = centered_rect(area, 48, 30);
    frame.render_widget(Clear, area);

    let title = Line::from(vec![
        Span::styled(
            "Settings",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("[Esc] close", Style::default().fg(Color::Gray)),
    ]);

    let rows = [
        ("Autosave on quit", on_off(config.autosave)),
        ("Confirm before delete", on_off(config.confirm_delete)),
    ];

    let mut lines = Vec::new();
    for (idx, (label, value)) in rows.iter().enumerate() {
        let style = if idx == state.selected_row {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{:<24}", label), style),
            Span::styled(*value, style),
        ]));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .padding(Padding::new(2, 2, 1, 1))
        .title(title);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}
