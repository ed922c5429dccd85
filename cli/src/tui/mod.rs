pub mod app;
pub mod ui;

use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use weightlog_core::{DateRange, Journal, LoadReport, RecordRepository};

use crate::tui::app::{App, InputMode};

pub fn run<R: RecordRepository>(
    journal: Journal<R>,
    report: LoadReport,
    range: DateRange,
    today: NaiveDate,
) -> Result<()> {
    for skipped in &report.skipped {
        info!(position = skipped.position, error = %skipped.error, "entry left out of this session");
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(journal, &report, range, today);
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if app.journal.is_dirty() {
        eprintln!("Warning: the last change could not be saved.");
    }
    res
}

fn run_app<R: RecordRepository>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App<R>,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        if handle_key(app, key) {
            return Ok(());
        }
    }
}

/// Returns true when the app should quit.
fn handle_key<R: RecordRepository>(app: &mut App<R>, key: KeyEvent) -> bool {
    match app.input_mode {
        InputMode::Normal => match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Down | KeyCode::Char('j') => app.next(),
            KeyCode::Up | KeyCode::Char('k') => app.previous(),
            KeyCode::Left | KeyCode::Char('h') => app.previous_period(),
            KeyCode::Right | KeyCode::Char('l') => app.next_period(),
            KeyCode::Char('a') => app.enter_add_mode(),
            KeyCode::Char('e') | KeyCode::Enter => app.enter_edit_mode(),
            KeyCode::Char('d') | KeyCode::Delete => app.request_delete(),
            KeyCode::Char('r') => app.enter_range_mode(),
            KeyCode::Char('g') => app.toggle_view(),
            KeyCode::Char('s') => app.save(),
            _ => {}
        },
        InputMode::ConfirmDelete => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_delete(),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_delete(),
            _ => {}
        },
        InputMode::Adding | InputMode::Editing | InputMode::Range => match key.code {
            KeyCode::Enter => app.submit_input(),
            KeyCode::Esc => app.exit_input_mode(),
            KeyCode::Char(c) => app.input_char(c),
            KeyCode::Backspace => app.delete_char(),
            KeyCode::Left => app.move_cursor_left(),
            KeyCode::Right => app.move_cursor_right(),
            _ => {}
        },
    }
    false
}
