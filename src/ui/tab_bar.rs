use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;
use crate::session::SessionPhase;

pub fn draw_tab_bar(f: &mut Frame, app: &App, area: Rect) {
    let mut spans = Vec::new();
    for (index, tab) in app.tabs.iter().enumerate() {
        let marker = match tab.controller.phase() {
            SessionPhase::Ready => Color::Green,
            SessionPhase::Connecting | SessionPhase::Connected => Color::Cyan,
            SessionPhase::Errored => Color::Red,
            SessionPhase::Disconnected | SessionPhase::Closed => Color::Gray,
        };
        let style = if index == app.active_tab {
            Style::default()
                .bg(Color::DarkGray)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };

        spans.push(Span::styled(" ● ", style.fg(marker)));
        spans.push(Span::styled(format!("{}:{} ", index + 1, tab.title()), style));
        spans.push(Span::raw(" "));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
