use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, Focus};

pub fn draw_terminal(f: &mut Frame, app: &App, area: Rect) {
    let is_active = app.focus == Focus::Terminal;
    let tab = app.active();
    let border_style = if is_active {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Gray)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(format!(
            "Terminal: {} [{}]",
            tab.title(),
            tab.controller.phase().label()
        ))
        .title_style(border_style.add_modifier(Modifier::BOLD));
    let inner = block.inner(area);

    // Keep the tail of the scrollback in view
    let height = inner.height as usize;
    let skip = tab.console.line_count().saturating_sub(height);
    let lines: Vec<Line> = tab.console.lines().skip(skip).map(Line::from).collect();
    let visible = lines.len();

    f.render_widget(Paragraph::new(lines).block(block), area);

    if !is_active || visible == 0 {
        return;
    }
    if let Some(column) = tab.console.cursor_column() {
        let max_x = inner.width.saturating_sub(1) as usize;
        let x = inner.x + column.min(max_x) as u16;
        let y = inner.y + (visible - 1) as u16;
        f.set_cursor(x, y);
    }
}
