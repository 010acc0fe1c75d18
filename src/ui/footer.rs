use crate::app::{App, Focus};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

pub fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let footer = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let confirming = app.active().pending_delete.is_some();
    let (nav_text, action_text) = if app.new_session.is_some() {
        ("[Enter] Connect  [Esc] Cancel", "")
    } else if confirming {
        ("[y] Delete  [any key] Cancel", "")
    } else {
        match app.focus {
            Focus::Terminal => (
                "↑/↓: History  [Enter] Run  [Tab] Files",
                "[Ctrl+T] New [Ctrl+W] Close [Ctrl+N/P] Switch [Ctrl+Q] Quit",
            ),
            Focus::Local => (
                "↑/k ↓/j  [Enter] Open  [Backspace] Back  [Tab] Remote",
                "[u] Upload [r] Refresh [Esc] Terminal",
            ),
            Focus::Remote => (
                "↑/k ↓/j  [Enter] Open  [Backspace] Up  [Tab] Terminal",
                "[d] Download [D] Delete [r] Refresh",
            ),
        }
    };

    let nav_help = Paragraph::new(nav_text).style(Style::default().fg(if confirming || app.new_session.is_some() {
        Color::Yellow
    } else {
        Color::Gray
    }));

    let action_help = Paragraph::new(action_text)
        .style(Style::default().fg(Color::Gray))
        .alignment(ratatui::layout::Alignment::Right);

    f.render_widget(nav_help, footer[0]);
    f.render_widget(action_help, footer[1]);
}
