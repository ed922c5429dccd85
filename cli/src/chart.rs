use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    symbols::Marker,
    widgets::{Axis, Bar, BarChart, BarGroup, Block, BorderType, Borders, Chart, Dataset, GraphType, Padding, Paragraph},
};
use weightlog_core::{format_date, ChartData, DateRange, Journal, RecordRepository};

// --- THEME ---
pub struct Theme {
    pub primary: Color,
    pub muted: Color,
    pub text: Color,
    pub weight: Color,
    pub calories: Color,
    pub error: Color,
}

pub const THEME: Theme = Theme {
    primary: Color::Cyan,
    muted: Color::DarkGray,
    text: Color::White,
    weight: Color::Blue,
    calories: Color::Red,
    error: Color::LightRed,
};

pub struct ChartApp<'a, R: RecordRepository> {
    journal: &'a Journal<R>,
    pub range: DateRange,
    pub data: ChartData,
}

impl<'a, R: RecordRepository> ChartApp<'a, R> {
    pub fn new(journal: &'a Journal<R>, range: DateRange) -> Self {
        let data = journal.chart(&range);
        Self { journal, range, data }
    }

    /// Slide the window by its own length.
    pub fn previous_period(&mut self) {
        self.shift(-self.range.num_days());
    }

    pub fn next_period(&mut self) {
        self.shift(self.range.num_days());
    }

    fn shift(&mut self, days: i64) {
        self.range = self.range.shifted(days);
        self.data = self.journal.chart(&self.range);
    }
}

pub fn run<R: RecordRepository>(journal: &Journal<R>, range: DateRange) -> Result<()> {
    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = ChartApp::new(journal, range);
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app<R: RecordRepository>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut ChartApp<R>,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                        KeyCode::Left | KeyCode::Char('h') => app.previous_period(),
                        KeyCode::Right | KeyCode::Char('l') => app.next_period(),
                        _ => {}
                    }
                }
            }
        }
    }
}

fn ui<R: RecordRepository>(frame: &mut Frame, app: &ChartApp<R>) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Charts
            Constraint::Length(1), // Footer / Help
        ])
        .split(frame.area());

    let header_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(24), Constraint::Min(1), Constraint::Length(32)])
        .split(main_layout[0]);

    let app_title = Paragraph::new(Span::styled(
        "WEIGHT & CALORIES",
        Style::default().fg(THEME.primary).add_modifier(Modifier::BOLD),
    ))
    .block(Block::default().padding(Padding::new(0, 0, 1, 0)));
    frame.render_widget(app_title, header_layout[0]);

    let nav_text = Line::from(vec![
        Span::styled(" < ", Style::default().fg(THEME.text)),
        Span::styled(
            format!("{} - {}", format_date(app.range.start), format_date(app.range.end)),
            Style::default().fg(THEME.text).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" > ", Style::default().fg(THEME.text)),
    ]);
    let nav = Paragraph::new(nav_text)
        .alignment(Alignment::Right)
        .block(Block::default().padding(Padding::new(0, 0, 1, 0)));
    frame.render_widget(nav, header_layout[2]);

    draw_chart(frame, &app.data, main_layout[1]);

    let help = Line::from(vec![
        Span::styled("PERIOD: ", Style::default().fg(THEME.muted)),
        Span::styled("←/→ ", Style::default().fg(THEME.text)),
        Span::raw("  "),
        Span::styled("QUIT: ", Style::default().fg(THEME.muted)),
        Span::styled("q", Style::default().fg(THEME.text)),
    ]);
    frame.render_widget(Paragraph::new(help).alignment(Alignment::Center), main_layout[2]);
}

/// Weight as a line over the range, calories as bars underneath.
pub fn draw_chart(frame: &mut Frame, data: &ChartData, area: Rect) {
    if data.is_empty() {
        let empty = Paragraph::new("No data available for the selected date range.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(THEME.muted))
            .block(panel(" Chart "));
        frame.render_widget(empty, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    draw_weight(frame, data, chunks[0]);
    draw_calories(frame, data, chunks[1]);
}

fn draw_weight(frame: &mut Frame, data: &ChartData, area: Rect) {
    let series = data.weight_series();
    let (x_min, x_max) = data.x_bounds();
    let (y_min, y_max) = data.weight_bounds().unwrap_or((0.0, 1.0));

    let datasets = vec![
        Dataset::default()
            .name("Weight (kg)")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(THEME.weight))
            .data(&series),
        Dataset::default()
            .marker(Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(THEME.text))
            .data(&series),
    ];

    let x_labels = vec![
        Span::raw(format_date(data.range.start)),
        Span::raw(format_date(data.range.end)),
    ];
    let y_labels = vec![
        Span::raw(format!("{:.1}", y_min)),
        Span::raw(format!("{:.1}", (y_min + y_max) / 2.0)),
        Span::raw(format!("{:.1}", y_max)),
    ];

    let chart = Chart::new(datasets)
        .block(panel(" Weight "))
        .x_axis(
            Axis::default()
                .title("Date")
                .style(Style::default().fg(THEME.muted))
                .bounds([x_min, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title("kg")
                .style(Style::default().fg(THEME.weight))
                .bounds([y_min, y_max])
                .labels(y_labels),
        );

    frame.render_widget(chart, area);
}

fn draw_calories(frame: &mut Frame, data: &ChartData, area: Rect) {
    let bars: Vec<Bar> = data
        .points
        .iter()
        .map(|p| {
            Bar::default()
                .label(p.date.format("%m-%d").to_string())
                .value(u64::from(p.calories))
                .style(Style::default().fg(THEME.calories))
                .text_value(p.calories.to_string())
        })
        .collect();

    let chart = BarChart::default()
        .block(panel(" Calories "))
        .bar_width(6)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars))
        .max(u64::from(data.max_calories()).max(1));

    frame.render_widget(chart, area);
}

pub fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(THEME.muted))
        .title(title)
}
