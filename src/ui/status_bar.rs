use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;
use crate::session::SessionPhase;

pub fn draw_status_bar(f: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(14), Constraint::Min(1)])
        .split(area);

    let tab = app.active();
    let phase = tab.controller.phase();
    let waiting_on = tab.controller.pending_request().map(|request| request.kind());
    let confirming = tab.pending_delete.is_some();
    let phase_color = match phase {
        SessionPhase::Ready => Color::Green,
        SessionPhase::Connecting | SessionPhase::Connected => Color::Cyan,
        SessionPhase::Errored => Color::Red,
        SessionPhase::Disconnected | SessionPhase::Closed => Color::Gray,
    };
    f.render_widget(
        Paragraph::new(format!(" ● {}", phase.label()))
            .style(Style::default().fg(phase_color).add_modifier(Modifier::BOLD)),
        chunks[0],
    );

    if let Some((message, timestamp)) = &app.status_message {
        // Clear messages older than 5 seconds (except while a question is open)
        let should_show = confirming
            || app.is_connecting()
            || timestamp.elapsed().as_secs() < 5;

        if should_show {
            let lower = message.to_lowercase();
            let style = if lower.contains("error") || lower.contains("failed") {
                Style::default().fg(Color::Red)
            } else if lower.contains("success") || lower.contains("ended") {
                Style::default().fg(Color::Green)
            } else if lower.contains("connecting") {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default().fg(Color::Yellow)
            };

            let paragraph = Paragraph::new(message.as_str())
                .style(style)
                .alignment(ratatui::layout::Alignment::Center);
            f.render_widget(paragraph, chunks[1]);
        } else {
            // Clear the status message if it's expired
            app.clear_status_message();
        }
    } else if let Some(kind) = waiting_on {
        f.render_widget(
            Paragraph::new(format!("Waiting for {}...", kind))
                .style(Style::default().fg(Color::DarkGray))
                .alignment(ratatui::layout::Alignment::Center),
            chunks[1],
        );
    }
}
