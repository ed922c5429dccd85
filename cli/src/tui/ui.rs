use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Row, Table, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;
use weightlog_core::model::record::format_weight;
use weightlog_core::{format_date, RecordRepository};

use crate::chart::{draw_chart, panel, THEME};
use crate::tui::app::{App, InputMode, StatusKind, View};

pub fn draw<R: RecordRepository>(f: &mut Frame, app: &mut App<R>) {
    let size = f.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(1),    // Content
            Constraint::Length(3), // Input
            Constraint::Length(1), // Status
            Constraint::Length(1), // Footer/Help
        ])
        .split(size);

    draw_header(f, app, main_chunks[0]);

    match app.view {
        View::List => {
            let content_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
                .split(main_chunks[1]);
            draw_record_list(f, app, content_chunks[0]);
            draw_detail_view(f, app, content_chunks[1]);
        }
        View::Chart => draw_chart(f, &app.chart, main_chunks[1]),
    }

    draw_input(f, app, main_chunks[2]);
    draw_status(f, app, main_chunks[3]);

    let help = match app.input_mode {
        InputMode::Normal => {
            "a: Add | e: Edit | d: Delete | r: Range | ←/→: Period | g: Chart | s: Save | q: Quit"
        }
        InputMode::ConfirmDelete => "y: Delete | n: Cancel",
        _ => "Enter: Submit | Esc: Cancel",
    };
    let footer = Paragraph::new(help)
        .style(Style::default().fg(THEME.muted))
        .alignment(Alignment::Center);
    f.render_widget(footer, main_chunks[4]);
}

fn draw_header<R: RecordRepository>(f: &mut Frame, app: &App<R>, area: Rect) {
    let mut spans = vec![
        Span::styled(
            "WEIGHTLOG",
            Style::default().fg(THEME.primary).add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
        Span::styled(
            format!("{} - {}", format_date(app.range.start), format_date(app.range.end)),
            Style::default().fg(THEME.text),
        ),
    ];
    if app.journal.is_dirty() {
        spans.push(Span::styled(
            "   [unsaved]",
            Style::default().fg(THEME.error).add_modifier(Modifier::BOLD),
        ));
    }
    let header = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(panel(""));
    f.render_widget(header, area);
}

fn draw_record_list<R: RecordRepository>(f: &mut Frame, app: &mut App<R>, area: Rect) {
    if app.records.is_empty() {
        let text = app
            .range_error
            .as_deref()
            .unwrap_or("No entries in this range.");
        let empty = Paragraph::new(text)
            .style(Style::default().fg(THEME.muted))
            .alignment(Alignment::Center)
            .block(panel(" Entries "));
        f.render_widget(empty, area);
        return;
    }

    let rows: Vec<Row> = app
        .records
        .iter()
        .map(|record| {
            let photo = if record.has_picture() { "📷" } else { "" };
            Row::new(vec![
                Span::raw(format_date(record.date)),
                Span::styled(
                    format!("{} kg", format_weight(record.weight)),
                    Style::default().fg(THEME.weight),
                ),
                Span::styled(
                    format!("{} cal", record.calories),
                    Style::default().fg(THEME.calories),
                ),
                Span::raw(photo),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(10), // Date
            Constraint::Length(10), // Weight
            Constraint::Length(9),  // Calories
            Constraint::Min(2),     // Photo
        ],
    )
    .header(Row::new(vec!["Date", "Weight", "Calories", ""]).style(Style::default().fg(THEME.primary)))
    .block(panel(" Entries "))
    .row_highlight_style(Style::default().bg(THEME.muted).add_modifier(Modifier::BOLD))
    .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn draw_detail_view<R: RecordRepository>(f: &mut Frame, app: &App<R>, area: Rect) {
    let Some(record) = app.selected() else {
        f.render_widget(panel(" Detail "), area);
        return;
    };

    let label = Style::default().fg(THEME.primary);
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Date: ", label),
            Span::styled(format_date(record.date), Style::default().add_modifier(Modifier::BOLD)),
        ]),
        Line::from(vec![
            Span::styled("Weight: ", label),
            Span::raw(format!("{} kg", format_weight(record.weight))),
        ]),
        Line::from(vec![
            Span::styled("Calories: ", label),
            Span::raw(record.calories.to_string()),
        ]),
        Line::from(""),
    ];
    if let Some(path) = &record.picture_path {
        lines.push(Line::from(vec![
            Span::styled("Photo: ", label),
            Span::raw(path.display().to_string()),
        ]));
    }
    if let Some(info) = &app.photo_info {
        lines.push(Line::from(Span::styled(info.as_str(), Style::default().fg(THEME.muted))));
    }

    let detail = Paragraph::new(lines)
        .block(panel(" Detail "))
        .wrap(Wrap { trim: true });
    f.render_widget(detail, area);
}

fn draw_input<R: RecordRepository>(f: &mut Frame, app: &App<R>, area: Rect) {
    let title = match app.input_mode {
        InputMode::Adding => " Add: weight calories [date:] [photo:] ",
        InputMode::Editing => " Edit: [date:] [weight:] [calories:] [photo:|photo:none] ",
        InputMode::Range => " Range: start end ",
        InputMode::Normal | InputMode::ConfirmDelete => " Input ",
    };
    let input = Paragraph::new(app.input.as_str())
        .style(Style::default().fg(THEME.text))
        .block(panel(title));
    f.render_widget(input, area);

    if matches!(
        app.input_mode,
        InputMode::Adding | InputMode::Editing | InputMode::Range
    ) {
        let before = &app.input[..app.byte_index(app.cursor_position)];
        let column = u16::try_from(before.width()).unwrap_or(u16::MAX);
        f.set_cursor_position((area.x.saturating_add(1).saturating_add(column), area.y + 1));
    }
}

fn draw_status<R: RecordRepository>(f: &mut Frame, app: &App<R>, area: Rect) {
    let Some(status) = &app.status else {
        return;
    };
    let color = match status.kind {
        StatusKind::Info => THEME.primary,
        StatusKind::Warning => THEME.calories,
        StatusKind::Error => THEME.error,
    };
    let line = Paragraph::new(status.text.as_str()).style(Style::default().fg(color));
    f.render_widget(line, area);
}
