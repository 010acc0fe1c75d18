use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, List, ListItem, Row, Table},
    Frame,
};

use crate::app::{App, Focus};
use crate::session::listing::format_file_size;
use crate::sftp_logic::FileItem;

fn panel_block(title: String, is_active: bool) -> Block<'static> {
    let border_style = if is_active {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Gray)
    };

    Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title)
        .title_style(border_style.add_modifier(Modifier::BOLD))
}

pub fn draw_local_panel(f: &mut Frame, app: &mut App, area: Rect) {
    let is_active = app.focus == Focus::Local;
    let state = &mut app.active_mut().sftp_state;

    let list_items: Vec<ListItem> = state
        .local_files
        .iter()
        .map(|file| {
            let mut spans = vec![];

            let (icon, name_color) = match file {
                FileItem::Directory { name } if name == ".." => ("↰ ", Color::Cyan),
                FileItem::Directory { .. } => ("📁 ", Color::Blue),
                FileItem::File { .. } => ("📄 ", Color::White),
            };
            spans.push(Span::styled(icon, Style::default().fg(Color::Yellow)));
            spans.push(Span::styled(
                file.name().to_string(),
                Style::default().fg(name_color),
            ));

            if let FileItem::File { size, .. } = file {
                spans.push(Span::styled(
                    format!(" ({})", format_file_size(*size)),
                    Style::default().fg(Color::Gray),
                ));
            }

            ListItem::new(Line::from(spans))
        })
        .collect();

    let highlight = if is_active {
        Style::default()
            .bg(Color::Green)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };

    let list = List::new(list_items)
        .block(panel_block(
            format!("Local: {}", state.local_current_path.display()),
            is_active,
        ))
        .highlight_symbol("> ")
        .highlight_style(highlight);

    f.render_stateful_widget(list, area, &mut state.local_list_state);
}

pub fn draw_remote_panel(f: &mut Frame, app: &mut App, area: Rect) {
    let is_active = app.focus == Focus::Remote;
    let state = &mut app.active_mut().sftp_state;

    let title = match state.remote_path() {
        Some(path) => format!("Remote: {}", path),
        None => "Remote: (not connected)".to_string(),
    };

    let rows: Vec<Row> = state
        .remote_listing
        .iter()
        .flat_map(|listing| listing.rows.iter())
        .map(|row| {
            let (icon, name_color) = if row.is_parent_link() {
                ("↰ ", Color::Cyan)
            } else if row.is_dir {
                ("📁 ", Color::Blue)
            } else {
                ("📄 ", Color::White)
            };

            Row::new(vec![
                Cell::from(Line::from(vec![
                    Span::styled(icon, Style::default().fg(Color::Yellow)),
                    Span::styled(row.name.clone(), Style::default().fg(name_color)),
                ])),
                Cell::from(row.size.clone()),
                Cell::from(row.kind),
                Cell::from(row.modified.clone()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Min(16),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(19),
    ];

    let highlight = if is_active {
        Style::default()
            .bg(Color::Green)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["Name", "Size", "Type", "Modified"])
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        )
        .block(panel_block(title, is_active))
        .highlight_symbol("> ")
        .highlight_style(highlight);

    f.render_stateful_widget(table, area, &mut state.remote_table_state);
}
