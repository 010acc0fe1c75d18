mod file_panels;
mod footer;
mod status_bar;
mod tab_bar;
mod terminal_pane;

use crate::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(1), // Session tabs
                Constraint::Min(3),    // Main content
                Constraint::Length(1), // Status bar
                Constraint::Length(1), // Footer
            ]
            .as_ref(),
        )
        .split(f.size());

    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);

    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(main[1]);

    tab_bar::draw_tab_bar(f, app, chunks[0]);
    terminal_pane::draw_terminal(f, app, main[0]);
    file_panels::draw_local_panel(f, app, panels[0]);
    file_panels::draw_remote_panel(f, app, panels[1]);
    status_bar::draw_status_bar(f, app, chunks[2]);
    footer::draw_footer(f, app, chunks[3]);

    if let Some(input) = &app.new_session {
        draw_new_session_popup(f, input);
    } else if app.is_connecting() {
        draw_loading_overlay(f, app);
    }
}

/// Helper function to center a rectangle with given width and height
fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length((r.height.saturating_sub(height)) / 2),
                Constraint::Length(height),
                Constraint::Length((r.height.saturating_sub(height)) / 2),
            ]
            .as_ref(),
        )
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(popup_layout[1])[1]
}

fn draw_loading_overlay(f: &mut Frame, app: &App) {
    let area = centered_rect(50, 7, f.size());

    let loading_text = format!(
        "🔗 Connecting to {}...\n\n⏳ Please wait...",
        app.active().title()
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .title("SSH Connection")
        .title_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .border_style(Style::default().fg(Color::Yellow));

    let paragraph = Paragraph::new(loading_text)
        .block(block)
        .alignment(ratatui::layout::Alignment::Center)
        .style(Style::default().fg(Color::White));

    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}

fn draw_new_session_popup(f: &mut Frame, input: &str) {
    let area = centered_rect(50, 3, f.size());

    let block = Block::default()
        .borders(Borders::ALL)
        .title("New session (user@host[:port])")
        .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);

    f.render_widget(Clear, area);
    f.render_widget(Paragraph::new(input).block(block), area);

    let column = (input.chars().count() as u16).min(inner.width.saturating_sub(1));
    f.set_cursor(inner.x + column, inner.y);
}
